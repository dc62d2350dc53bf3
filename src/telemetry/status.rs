//! Win/lose/tie classification from the local team's point of view

use std::cmp::Ordering;
use std::fmt;

use crate::telemetry::snapshot::TeamId;

/// Standing of the local team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStatus {
    Winning,
    Losing,
    Tied,
    /// Local team not known yet
    #[default]
    Unknown,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MatchStatus::Winning => "WE ARE WINNING!",
            MatchStatus::Losing => "WE ARE LOSING!",
            MatchStatus::Tied => "WE ARE TIED!",
            MatchStatus::Unknown => "Team unknown",
        };
        f.write_str(text)
    }
}

/// Classify the local team's standing from both team totals
pub fn classify(team_totals: [i32; 2], local_team: Option<TeamId>) -> MatchStatus {
    let Some(team) = local_team else {
        return MatchStatus::Unknown;
    };
    let own = (team as usize).min(1);
    let other = 1 - own;

    match team_totals[own].cmp(&team_totals[other]) {
        Ordering::Greater => MatchStatus::Winning,
        Ordering::Less => MatchStatus::Losing,
        Ordering::Equal => MatchStatus::Tied,
    }
}

/// Final match outcome, independent of the local team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Winner(TeamId),
    Draw,
}

impl MatchOutcome {
    pub fn from_totals(team_totals: [i32; 2]) -> Self {
        match team_totals[0].cmp(&team_totals[1]) {
            Ordering::Greater => MatchOutcome::Winner(0),
            Ordering::Less => MatchOutcome::Winner(1),
            Ordering::Equal => MatchOutcome::Draw,
        }
    }
}

/// Human-readable team name
pub fn team_name(team: TeamId) -> &'static str {
    match team {
        0 => "Blue",
        _ => "Orange",
    }
}
