use snafu::prelude::*;
use std::collections::HashMap;

pub use crate::config::*;
use crate::{Ballot, Election};

/// A builder for elections that are not read from a table.
///
/// Each ranking lists every candidate once, most preferred first.
///
/// ```
/// use instant_runoff::builder::Builder;
/// # use instant_runoff::TallyError;
///
/// let mut builder = Builder::new(&["Anna", "Bob"])?;
/// builder.add_ranking(&["Bob", "Anna"])?;
/// builder.add_ranking(&["Bob", "Anna"])?;
/// let election = builder.build()?;
///
/// assert_eq!(election.candidates(), vec!["Anna", "Bob"]);
/// # Ok::<(), TallyError>(())
/// ```
pub struct Builder {
    pub(crate) _candidates: Vec<String>,
    pub(crate) _ballots: Vec<Ballot>,
}

impl Builder {
    pub fn new<S: AsRef<str>>(candidates: &[S]) -> TallyResult<Builder> {
        ensure!(
            !candidates.is_empty(),
            InvalidTableSnafu {
                reason: "no candidates",
            }
        );
        Ok(Builder {
            _candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
            _ballots: Vec::new(),
        })
    }

    /// Adds the ranking of one voter.
    pub fn add_ranking<S: AsRef<str>>(&mut self, ranking: &[S]) -> TallyResult<()> {
        let lineno = self._ballots.len() + 1;
        let num_candidates = self._candidates.len();
        ensure!(
            ranking.len() == num_candidates,
            MalformedBallotSnafu {
                lineno,
                reason: format!(
                    "expected {} candidates, found {}",
                    num_candidates,
                    ranking.len()
                ),
            }
        );

        let ids: HashMap<&str, CandidateId> = self
            ._candidates
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), CandidateId(idx as u32)))
            .collect();
        let mut preference: Vec<CandidateId> = Vec::with_capacity(num_candidates);
        for name in ranking.iter().map(|n| n.as_ref()) {
            let cid = *ids.get(name).context(MalformedBallotSnafu {
                lineno,
                reason: format!("unknown candidate {:?}", name),
            })?;
            ensure!(
                !preference.contains(&cid),
                MalformedBallotSnafu {
                    lineno,
                    reason: format!("{:?} is ranked more than once", name),
                }
            );
            preference.push(cid);
        }
        self._ballots.push(Ballot::from_preference(preference, lineno));
        Ok(())
    }

    pub fn build(self) -> TallyResult<Election> {
        Election::assemble(self._candidates, self._ballots)
    }
}
