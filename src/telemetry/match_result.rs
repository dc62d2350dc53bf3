//! End-of-match summary
//!
//! Collects final totals, the winner, ball records and the goal log into a
//! single value the engine renders line by line.

use uuid::Uuid;

use crate::telemetry::goals::GoalEvent;
use crate::telemetry::state::TrackerState;
use crate::telemetry::status::{team_name, MatchOutcome};

/// Final statistics for one match
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub team_totals: [i32; 2],
    pub outcome: MatchOutcome,
    pub max_height: f32,
    pub max_speed: f32,
    /// Goals in the order they were detected
    pub goals: Vec<GoalEvent>,
    pub match_duration: f32,
}

/// Build the summary from the tracker's current state
pub fn summarize(state: &TrackerState) -> MatchSummary {
    let team_totals = state.team_totals();

    MatchSummary {
        match_id: state.match_id(),
        team_totals,
        outcome: MatchOutcome::from_totals(team_totals),
        max_height: state.extrema().max_height(),
        max_speed: state.extrema().max_speed(),
        goals: state.goal_log().to_vec(),
        match_duration: state.last_match_time(),
    }
}

impl MatchSummary {
    /// Render the summary as log lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(8 + self.goals.len());

        lines.push(format!("=== MATCH SUMMARY ({}) ===", self.match_id));
        lines.push(format!(
            "Final Score: Blue {} - {} Orange",
            self.team_totals[0], self.team_totals[1]
        ));
        lines.push(match self.outcome {
            MatchOutcome::Winner(team) => format!("Winner: {} (Team {})", team_name(team), team),
            MatchOutcome::Draw => "Result: Draw".to_string(),
        });
        lines.push(format!("Match time: {:.0}s", self.match_duration));
        lines.push(format!("Highest ball height this match: {:.0}", self.max_height));
        lines.push(format!("Fastest ball speed this match: {:.0}", self.max_speed));
        lines.push(format!("Goals Scored ({}):", self.goals.len()));
        for goal in &self.goals {
            lines.push(format!("  - {}", goal.description()));
        }
        lines.push("====================".to_string());

        lines
    }
}
