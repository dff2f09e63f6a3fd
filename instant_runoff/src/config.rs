// ********* Identifiers ***********

use snafu::Snafu;
use std::fmt::Display;

/// The identifier of a candidate, fixed when the election is loaded.
///
/// Identifiers follow the order of the candidate columns in the header.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub(crate) u32);

impl CandidateId {
    /// The position of the candidate in the header, starting at 0.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

// ********* Configuration **********

/// The rule used to pick the candidate removed in a round without a majority.
///
/// - StrongestLoser starts from the last rank and removes the candidate that
/// the most voters placed last. Ties move one rank up, among the tied
/// candidates only.
///
/// - WeakestWinner is the usual instant-runoff rule: the candidate with the
/// fewest first preferences is removed. Ties move one rank down, among the
/// tied candidates only.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum EliminationPolicy {
    StrongestLoser,
    WeakestWinner,
}

impl Display for EliminationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EliminationPolicy::StrongestLoser => write!(f, "strongest loser"),
            EliminationPolicy::WeakestWinner => write!(f, "weakest winner"),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub elimination_policy: EliminationPolicy,
    /// Turn headers such as `Who should win? [Alice]` into `Alice`.
    pub strip_label_prefix: bool,
}

impl TallyRules {
    pub const DEFAULT_RULES: TallyRules = TallyRules {
        elimination_policy: EliminationPolicy::StrongestLoser,
        strip_label_prefix: true,
    };
}

/// Column widths for the round-by-round trace.
///
/// Computed once per election from the candidate names and the number of
/// ballots, then handed to whatever prints the trace.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TraceFormat {
    pub name_width: usize,
    pub count_width: usize,
}

impl TraceFormat {
    pub fn new(names: &[String], num_ballots: usize) -> TraceFormat {
        TraceFormat {
            name_width: names.iter().map(|n| n.chars().count()).max().unwrap_or(0),
            count_width: num_ballots.to_string().len(),
        }
    }

    /// One line of a tally: the count right-aligned, then the name.
    pub fn tally_line(&self, name: &str, count: u64) -> String {
        format!(
            "{:>cw$} {:<nw$}",
            count,
            name,
            cw = self.count_width,
            nw = self.name_width
        )
    }

    /// A compact, single line rendering of the counts at one rank.
    pub fn counts_line(&self, counts: &[(String, u64)]) -> String {
        counts
            .iter()
            .map(|(name, count)| format!("{:>nw$}:{}", name, count, nw = self.name_width))
            .collect::<Vec<String>>()
            .join(" ")
    }
}

// ******** Output data structures *********

/// The counts at one rank, restricted to the candidates still contending
/// for elimination at that point.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankStats {
    /// 0-based rank.
    pub rank: usize,
    pub counts: Vec<(String, u64)>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats {
    pub name: String,
    pub examined: Vec<RankStats>,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// First preferences of the standing candidates, in decreasing order.
    pub tally: Vec<(String, u64)>,
    pub elected: Option<String>,
    pub eliminated: Option<EliminationStats>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResult {
    pub winner: String,
    /// Number of first preferences needed to win outright.
    pub threshold: u64,
    pub round_stats: Vec<RoundStats>,
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    #[snafu(display("Invalid table: {reason}"))]
    InvalidTable { reason: String },

    #[snafu(display("Malformed ballot on line {lineno}: {reason}"))]
    MalformedBallot { lineno: usize, reason: String },

    #[snafu(display("Unresolvable tie between {}", candidates.join(", ")))]
    UnresolvableTie { candidates: Vec<String> },

    #[snafu(display("Candidate {name:?} is not standing"))]
    UnknownCandidate { name: String },

    #[snafu(display(
        "Internal error: candidate {candidate:?} is missing from the ballot on line {lineno}"
    ))]
    CandidateNotOnBallot {
        candidate: CandidateId,
        lineno: usize,
    },

    #[snafu(display("Rank {rank} is out of range with {standing} standing candidates"))]
    RankOutOfRange { rank: usize, standing: usize },

    #[snafu(display("{name} is the last standing candidate and cannot be eliminated"))]
    SoleCandidate { name: String },

    #[snafu(display("The election has no ballots"))]
    EmptyElection {},

    #[snafu(display("No winner found after eliminating every candidate"))]
    NoConvergence {},
}

pub type TallyResult<T> = Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_widths_follow_longest_name_and_ballot_count() {
        let names = vec!["Al".to_string(), "Beatrice".to_string()];
        let format = TraceFormat::new(&names, 120);
        assert_eq!(format.name_width, 8);
        assert_eq!(format.count_width, 3);
        assert_eq!(format.tally_line("Al", 7), "  7 Al      ");
        assert_eq!(
            format.counts_line(&[("Al".to_string(), 2), ("Beatrice".to_string(), 0)]),
            "      Al:2 Beatrice:0"
        );
    }

    #[test]
    fn tie_error_lists_candidates() {
        let e = TallyError::UnresolvableTie {
            candidates: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(e.to_string(), "Unresolvable tie between A, B");
    }
}
