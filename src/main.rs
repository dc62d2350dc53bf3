use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, trace, warn};
use tracing_subscriber::EnvFilter;

use ballwatch::config::EngineConfig;
use ballwatch::engine::sink::TracingSink;
use ballwatch::engine::Engine;
use ballwatch::replay::{self, ScriptedMatch};
use ballwatch::telemetry::snapshot::Snapshot;

/// Length of the synthetic match when no recording is supplied
const SCRIPTED_MATCH_SECS: f32 = 60.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Ballwatch v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = EngineConfig::load_or_default();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    info!(
        "Configuration loaded: possession={:.0}, report_interval={:?}, tick_rate={}",
        config.possession_distance, config.report_interval, config.tick_rate
    );

    let snapshots: Box<dyn Iterator<Item = Snapshot> + Send> = match &config.replay_path {
        Some(path) => {
            let recorded = replay::load_jsonl(path)
                .with_context(|| format!("Failed to load replay {}", path.display()))?;
            info!("Replaying {} snapshots from {}", recorded.len(), path.display());
            Box::new(recorded.into_iter())
        }
        None => {
            info!("No replay file set, playing a scripted match");
            Box::new(ScriptedMatch::new(
                rand::random(),
                config.tick_rate,
                SCRIPTED_MATCH_SECS,
            ))
        }
    };

    let tick = config.tick_duration();
    let engine = Arc::new(Engine::new(config, Arc::new(TracingSink)));
    engine.initialize();
    engine.on_match_start();

    let driver = {
        let engine = engine.clone();
        async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            for snapshot in snapshots {
                ticker.tick().await;
                engine.on_tick(&snapshot);
                engine.dispatch_hooks(&snapshot);
                let command = engine.filter_command(replay::chase_command(&snapshot));
                trace!("{}", command);
            }
        }
    };

    // Shutdown signal handler
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    tokio::select! {
        _ = driver => info!("Replay finished"),
        _ = shutdown => warn!("Replay interrupted"),
    }

    engine.on_match_destroyed();
    engine.shutdown();

    // Let the reporter print its exit line
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    Ok(())
}
