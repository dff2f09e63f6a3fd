use snafu::prelude::*;

use crate::config::*;

/// One voter's complete ranking of the standing candidates, most preferred
/// first.
///
/// Invariant: every standing candidate appears exactly once.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    timestamp: String,
    // Line of the source table, 1-based and counting the header.
    lineno: usize,
    preference: Vec<CandidateId>,
}

impl Ballot {
    /// Reads a ballot from a row of the form `[timestamp, rank_1, ..., rank_n]`.
    ///
    /// `rank_i` is the 1-based rank given to `candidates[i - 1]`. The ranks
    /// must use every value of `1..=n` exactly once.
    pub(crate) fn from_row(
        row: &[String],
        candidates: &[CandidateId],
        lineno: usize,
    ) -> TallyResult<Ballot> {
        let num_candidates = candidates.len();
        let (timestamp, ranks) = row.split_first().context(MalformedBallotSnafu {
            lineno,
            reason: "the row is empty",
        })?;
        ensure!(
            ranks.len() == num_candidates,
            MalformedBallotSnafu {
                lineno,
                reason: format!(
                    "expected {} ranks, found {}",
                    num_candidates,
                    ranks.len()
                ),
            }
        );

        let mut slots: Vec<Option<CandidateId>> = vec![None; num_candidates];
        for (cid, cell) in candidates.iter().zip(ranks.iter()) {
            let rank = match cell.trim().parse::<usize>() {
                Ok(r) if (1..=num_candidates).contains(&r) => r,
                Ok(r) => {
                    return MalformedBallotSnafu {
                        lineno,
                        reason: format!("rank {} is not between 1 and {}", r, num_candidates),
                    }
                    .fail();
                }
                Err(_) => {
                    return MalformedBallotSnafu {
                        lineno,
                        reason: format!("{:?} is not a rank", cell),
                    }
                    .fail();
                }
            };
            let slot = &mut slots[rank - 1];
            ensure!(
                slot.is_none(),
                MalformedBallotSnafu {
                    lineno,
                    reason: format!("rank {} is used more than once", rank),
                }
            );
            *slot = Some(*cid);
        }

        // n distinct ranks in 1..=n fill every slot.
        let preference: Vec<CandidateId> = slots.into_iter().flatten().collect();
        Ok(Ballot {
            timestamp: timestamp.clone(),
            lineno,
            preference,
        })
    }

    /// Builds a ballot from an already validated ranking.
    pub(crate) fn from_preference(preference: Vec<CandidateId>, lineno: usize) -> Ballot {
        Ballot {
            timestamp: String::new(),
            lineno,
            preference,
        }
    }

    /// Removes an eliminated candidate. Later choices move up by one rank.
    pub(crate) fn remove_candidate(&mut self, candidate: CandidateId) -> TallyResult<()> {
        let pos = self
            .preference
            .iter()
            .position(|cid| *cid == candidate)
            .context(CandidateNotOnBallotSnafu {
                candidate,
                lineno: self.lineno,
            })?;
        self.preference.remove(pos);
        Ok(())
    }

    pub fn preference(&self) -> &[CandidateId] {
        &self.preference
    }

    /// The candidate at the given 0-based rank.
    pub fn at_rank(&self, rank: usize) -> Option<CandidateId> {
        self.preference.get(rank).copied()
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn lineno(&self) -> usize {
        self.lineno
    }

    pub fn len(&self) -> usize {
        self.preference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preference.is_empty()
    }
}
