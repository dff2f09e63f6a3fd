mod ballot;
pub mod builder;
mod config;
mod labels;

use log::{debug, info};
use snafu::prelude::*;

use std::collections::{HashMap, HashSet};

pub use crate::ballot::Ballot;
pub use crate::config::*;

/// The first cell of the header row.
pub const TIMESTAMP_MARKER: &str = "Timestamp";

/// The outcome of one elimination: the removed candidate, and the counts
/// that were examined rank by rank to select it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Elimination {
    pub candidate: CandidateId,
    pub examined: Vec<(usize, Vec<(CandidateId, u64)>)>,
}

// **** Private structures ****

// Result of looking at the counts of a single rank.
#[derive(Eq, PartialEq, Debug, Clone)]
enum Contest {
    Decided(CandidateId),
    Tied(Vec<CandidateId>),
}

/// An election being tabulated.
///
/// The election owns the standing candidates and all the ballots. Each
/// ballot ranks exactly the standing candidates, so eliminating a candidate
/// removes it everywhere at once.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    // All the candidate names, indexed by CandidateId.
    names: Vec<String>,
    // The candidates still running, in header order.
    standing: Vec<CandidateId>,
    ballots: Vec<Ballot>,
    format: TraceFormat,
}

impl Election {
    /// Loads an election from a table of strings, using the default rules.
    ///
    /// The first row is the header: `Timestamp` followed by one label per
    /// candidate. Every other row is a ballot: a timestamp followed by the
    /// rank given to each candidate.
    pub fn from_table(table: &[Vec<String>]) -> TallyResult<Election> {
        Election::from_table_with_rules(table, &TallyRules::DEFAULT_RULES)
    }

    pub fn from_table_with_rules(
        table: &[Vec<String>],
        rules: &TallyRules,
    ) -> TallyResult<Election> {
        let (header, rows) = table.split_first().context(InvalidTableSnafu {
            reason: "the table is empty",
        })?;
        let (marker, labels) = header.split_first().context(InvalidTableSnafu {
            reason: "the header row is empty",
        })?;
        ensure!(
            marker == TIMESTAMP_MARKER,
            InvalidTableSnafu {
                reason: format!(
                    "the header should start with {:?}, found {:?}",
                    TIMESTAMP_MARKER, marker
                ),
            }
        );
        ensure!(
            !labels.is_empty(),
            InvalidTableSnafu {
                reason: "the header names no candidates",
            }
        );

        let names: Vec<String> = if rules.strip_label_prefix {
            labels::decode_labels(labels)
        } else {
            labels.to_vec()
        };
        let ids: Vec<CandidateId> = (0..names.len())
            .map(|idx| CandidateId(idx as u32))
            .collect();

        let mut ballots: Vec<Ballot> = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            // The header is on line 1.
            ballots.push(Ballot::from_row(row, &ids, idx + 2)?);
        }
        Election::assemble(names, ballots)
    }

    // Candidates are numbered in the order of the names.
    pub(crate) fn assemble(names: Vec<String>, ballots: Vec<Ballot>) -> TallyResult<Election> {
        let mut seen: HashSet<&str> = HashSet::new();
        for name in names.iter() {
            ensure!(
                seen.insert(name.as_str()),
                InvalidTableSnafu {
                    reason: format!("candidate {:?} appears more than once", name),
                }
            );
        }

        info!("Processing {:?} ballots", ballots.len());
        for (idx, name) in names.iter().enumerate() {
            info!("Candidate: {}: {}", idx + 1, name);
        }

        let format = TraceFormat::new(&names, ballots.len());
        let mut election = Election {
            standing: (0..names.len())
                .map(|idx| CandidateId(idx as u32))
                .collect(),
            names,
            ballots,
            format,
        };
        election.sort_ballots();
        Ok(election)
    }

    /// The name of a candidate, eliminated or not.
    pub fn name(&self, cid: CandidateId) -> &str {
        self.names
            .get(cid.index())
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    /// The identifier of a standing candidate.
    pub fn candidate_id(&self, name: &str) -> Option<CandidateId> {
        self.standing
            .iter()
            .find(|cid| self.name(**cid) == name)
            .copied()
    }

    /// The standing candidates, in the order of the header.
    pub fn candidates(&self) -> Vec<&str> {
        self.standing.iter().map(|cid| self.name(*cid)).collect()
    }

    pub fn standing(&self) -> &[CandidateId] {
        &self.standing
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn trace_format(&self) -> TraceFormat {
        self.format
    }

    /// Smallest number of first preferences that is a strict majority.
    pub fn majority_threshold(&self) -> u64 {
        self.ballots.len() as u64 / 2 + 1
    }

    /// The names on a ballot, most preferred first.
    pub fn ballot_names(&self, ballot: &Ballot) -> Vec<&str> {
        ballot
            .preference()
            .iter()
            .map(|cid| self.name(*cid))
            .collect()
    }

    /// The distinct rankings still in play, with the number of ballots
    /// casting each of them.
    pub fn ballot_summary(&self) -> Vec<(Vec<String>, u64)> {
        let mut summary: Vec<(Vec<String>, u64)> = Vec::new();
        // Ballots are sorted, identical rankings are next to each other.
        for ballot in self.ballots.iter() {
            let names: Vec<String> = self
                .ballot_names(ballot)
                .into_iter()
                .map(String::from)
                .collect();
            match summary.last_mut() {
                Some((last, count)) if *last == names => *count += 1,
                _ => summary.push((names, 1)),
            }
        }
        summary
    }

    pub fn named_counts(&self, counts: &[(CandidateId, u64)]) -> Vec<(String, u64)> {
        counts
            .iter()
            .map(|(cid, c)| (self.name(*cid).to_string(), *c))
            .collect()
    }

    /// Counts, for every standing candidate, the ballots that place it at
    /// the given 0-based rank. Sorted by decreasing count.
    pub fn count_at_rank(&self, rank: usize) -> TallyResult<Vec<(CandidateId, u64)>> {
        self.count_among(rank, &self.standing)
    }

    // Candidates with the same count keep their relative order in `contenders`.
    fn count_among(
        &self,
        rank: usize,
        contenders: &[CandidateId],
    ) -> TallyResult<Vec<(CandidateId, u64)>> {
        ensure!(
            rank < self.standing.len(),
            RankOutOfRangeSnafu {
                rank,
                standing: self.standing.len(),
            }
        );
        let mut tally: HashMap<CandidateId, u64> =
            contenders.iter().map(|cid| (*cid, 0)).collect();
        for ballot in self.ballots.iter() {
            if let Some(cid) = ballot.at_rank(rank) {
                if let Some(count) = tally.get_mut(&cid) {
                    *count += 1;
                }
            }
        }
        let mut counts: Vec<(CandidateId, u64)> = contenders
            .iter()
            .map(|cid| (*cid, tally.get(cid).copied().unwrap_or(0)))
            .collect();
        counts.sort_by(|(_, c1), (_, c2)| c2.cmp(c1));
        Ok(counts)
    }

    /// The candidate holding a strict majority of the first preferences,
    /// if any.
    pub fn clear_winner(&self) -> Option<CandidateId> {
        let counts = self.count_at_rank(0).ok()?;
        let (cid, top) = counts.first().copied()?;
        if 2 * top > self.ballots.len() as u64 {
            Some(cid)
        } else {
            None
        }
    }

    /// Removes a standing candidate from the election and from every ballot.
    pub fn remove_candidate(&mut self, name: &str) -> TallyResult<()> {
        let cid = self
            .candidate_id(name)
            .context(UnknownCandidateSnafu { name })?;
        self.remove_candidate_id(cid)
    }

    pub fn remove_candidate_id(&mut self, cid: CandidateId) -> TallyResult<()> {
        let pos = self
            .standing
            .iter()
            .position(|c| *c == cid)
            .context(UnknownCandidateSnafu {
                name: self.name(cid),
            })?;
        ensure!(
            self.standing.len() > 1,
            SoleCandidateSnafu {
                name: self.name(cid),
            }
        );
        // Nothing is modified unless every ballot ranks the candidate.
        if let Some(ballot) = self
            .ballots
            .iter()
            .find(|b| !b.preference().contains(&cid))
        {
            return CandidateNotOnBallotSnafu {
                candidate: cid,
                lineno: ballot.lineno(),
            }
            .fail();
        }
        self.standing.remove(pos);
        for ballot in self.ballots.iter_mut() {
            ballot.remove_candidate(cid)?;
        }
        self.sort_ballots();
        Ok(())
    }

    /// Eliminates, among the candidates placed last most often, the one
    /// placed last most strongly.
    ///
    /// The search starts at the last rank. If several candidates share the
    /// highest count there, only those are kept and the previous rank is
    /// examined, and so on up to the first rank.
    pub fn eliminate_strongest_loser(&mut self) -> TallyResult<CandidateId> {
        self.eliminate(EliminationPolicy::StrongestLoser)
    }

    /// Eliminates the candidate with the fewest first preferences.
    ///
    /// Ties on the lowest count are broken by looking at the next ranks,
    /// among the tied candidates only.
    pub fn eliminate_weakest_winner(&mut self) -> TallyResult<CandidateId> {
        self.eliminate(EliminationPolicy::WeakestWinner)
    }

    pub fn eliminate(&mut self, policy: EliminationPolicy) -> TallyResult<CandidateId> {
        self.eliminate_traced(policy).map(|e| e.candidate)
    }

    /// Same as `eliminate`, but also returns the counts examined on the way.
    pub fn eliminate_traced(&mut self, policy: EliminationPolicy) -> TallyResult<Elimination> {
        if let [last] = self.standing.as_slice() {
            return SoleCandidateSnafu {
                name: self.name(*last),
            }
            .fail();
        }
        let elimination = self.find_loser(policy)?;
        info!(
            "eliminate: {} -> eliminated ({})",
            self.name(elimination.candidate),
            policy
        );
        self.remove_candidate_id(elimination.candidate)?;
        Ok(elimination)
    }

    fn find_loser(&self, policy: EliminationPolicy) -> TallyResult<Elimination> {
        let num_ranks = self.standing.len();
        let ranks: Vec<usize> = match policy {
            EliminationPolicy::StrongestLoser => (0..num_ranks).rev().collect(),
            EliminationPolicy::WeakestWinner => (0..num_ranks).collect(),
        };

        let mut contenders: Vec<CandidateId> = self.standing.clone();
        let mut examined: Vec<(usize, Vec<(CandidateId, u64)>)> = Vec::new();
        for rank in ranks {
            let counts = self.count_among(rank, &contenders)?;
            debug!(
                "find_loser: {}: rank {}: {}",
                policy,
                rank + 1,
                self.format.counts_line(&self.named_counts(&counts))
            );
            let contest = settle(&counts, policy);
            examined.push((rank, counts));
            match contest {
                Contest::Decided(cid) => {
                    return Ok(Elimination {
                        candidate: cid,
                        examined,
                    })
                }
                Contest::Tied(tied) => {
                    debug!(
                        "find_loser: tie between {:?}",
                        tied.iter().map(|cid| self.name(*cid)).collect::<Vec<&str>>()
                    );
                    contenders = tied;
                }
            }
        }

        UnresolvableTieSnafu {
            candidates: contenders
                .iter()
                .map(|cid| self.name(*cid).to_string())
                .collect::<Vec<String>>(),
        }
        .fail()
    }

    // Sorted by the names on the ballots. Only makes the traces stable.
    fn sort_ballots(&mut self) {
        let names = &self.names;
        self.ballots.sort_by(|b1, b2| {
            let n1 = b1.preference().iter().map(|cid| names[cid.index()].as_str());
            let n2 = b2.preference().iter().map(|cid| names[cid.index()].as_str());
            n1.cmp(n2)
        });
    }
}

// Looks at the counts of one rank, sorted in decreasing order.
// The strongest loser has the highest count, the weakest winner the lowest.
fn settle(counts: &[(CandidateId, u64)], policy: EliminationPolicy) -> Contest {
    let (edge, next) = match policy {
        EliminationPolicy::StrongestLoser => (counts.first(), counts.get(1)),
        EliminationPolicy::WeakestWinner => (
            counts.last(),
            counts.len().checked_sub(2).and_then(|idx| counts.get(idx)),
        ),
    };
    match (edge, next) {
        (Some(&(cid, _)), None) => Contest::Decided(cid),
        (Some(&(cid, count)), Some(&(_, next_count))) if count != next_count => {
            Contest::Decided(cid)
        }
        (Some(&(_, count)), Some(_)) => Contest::Tied(
            counts
                .iter()
                .filter(|(_, c)| *c == count)
                .map(|(cid, _)| *cid)
                .collect(),
        ),
        (None, _) => Contest::Tied(Vec::new()),
    }
}

/// Runs rounds until a candidate holds a strict majority of the first
/// preferences.
///
/// Every round without a winner eliminates one candidate with the policy of
/// the rules, so the count ends after at most `candidates - 1` eliminations,
/// unless a tie cannot be broken.
pub fn tabulate(election: &mut Election, rules: &TallyRules) -> TallyResult<ElectionResult> {
    info!(
        "Tabulating {:?} ballots, {:?} candidates, elimination policy: {}",
        election.ballots.len(),
        election.standing.len(),
        rules.elimination_policy
    );
    ensure!(!election.ballots.is_empty(), EmptyElectionSnafu {});

    let threshold = election.majority_threshold();
    let format = election.trace_format();
    let max_rounds = election.standing.len() as u32;
    let mut round_stats: Vec<RoundStats> = Vec::new();

    for round in 1..=max_rounds {
        let tally = election.named_counts(&election.count_at_rank(0)?);
        info!("Round {} (winning threshold: {})", round, threshold);
        for (name, count) in tally.iter() {
            info!("  {}", format.tally_line(name, *count));
        }

        if let Some(winner) = election.clear_winner() {
            let winner = election.name(winner).to_string();
            info!("Round {}: {} -> elected", round, winner);
            round_stats.push(RoundStats {
                round,
                tally,
                elected: Some(winner.clone()),
                eliminated: None,
            });
            return Ok(ElectionResult {
                winner,
                threshold,
                round_stats,
            });
        }

        let elimination = election.eliminate_traced(rules.elimination_policy)?;
        let examined: Vec<RankStats> = elimination
            .examined
            .iter()
            .map(|(rank, counts)| RankStats {
                rank: *rank,
                counts: election.named_counts(counts),
            })
            .collect();
        let name = election.name(elimination.candidate).to_string();
        info!("Round {}: removed {}", round, name);
        for (names, count) in election.ballot_summary() {
            debug!("  remaining: {:>3} x {}", count, names.join(" > "));
        }
        round_stats.push(RoundStats {
            round,
            tally,
            elected: None,
            eliminated: Some(EliminationStats { name, examined }),
        });
    }
    NoConvergenceSnafu {}.fail()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // Builds a table from preference lists: each ballot lists names from most
    // to least preferred.
    fn table(candidates: &[&str], ballots: &[&[&str]]) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut header = vec![TIMESTAMP_MARKER.to_string()];
        header.extend(candidates.iter().map(|c| c.to_string()));
        rows.push(header);
        for (idx, prefs) in ballots.iter().enumerate() {
            let mut row = vec![format!("2022-10-21 09:{:02}:00", idx)];
            for c in candidates {
                let rank = prefs.iter().position(|p| p == c).unwrap() + 1;
                row.push(rank.to_string());
            }
            rows.push(row);
        }
        rows
    }

    fn election(candidates: &[&str], ballots: &[&[&str]]) -> Election {
        init_logs();
        Election::from_table(&table(candidates, ballots)).unwrap()
    }

    fn names(e: &Election, counts: &[(CandidateId, u64)]) -> Vec<(String, u64)> {
        e.named_counts(counts)
    }

    fn s(x: &str) -> String {
        x.to_string()
    }

    #[test]
    fn clear_majority() {
        let e = election(&["X", "Y"], &[&["X", "Y"], &["X", "Y"], &["Y", "X"]]);
        let winner = e.clear_winner().unwrap();
        assert_eq!(e.name(winner), "X");
    }

    #[test]
    fn exactly_half_is_not_a_majority() {
        let e = election(
            &["X", "Y"],
            &[&["X", "Y"], &["X", "Y"], &["Y", "X"], &["Y", "X"]],
        );
        assert_eq!(e.clear_winner(), None);
        assert_eq!(e.majority_threshold(), 3);
    }

    #[test]
    fn counts_cover_every_standing_candidate() {
        let e = election(
            &["A", "B", "C"],
            &[&["A", "B", "C"], &["A", "C", "B"], &["B", "A", "C"]],
        );
        let first = e.count_at_rank(0).unwrap();
        assert_eq!(names(&e, &first), vec![(s("A"), 2), (s("B"), 1), (s("C"), 0)]);
        for rank in 0..3 {
            let total: u64 = e.count_at_rank(rank).unwrap().iter().map(|p| p.1).sum();
            assert_eq!(total, 3);
        }
        assert_eq!(
            e.count_at_rank(3),
            Err(TallyError::RankOutOfRange {
                rank: 3,
                standing: 3
            })
        );
    }

    #[test]
    fn strongest_loser_escalates_to_break_tie() {
        // Last rank: D:2 C:2. One rank up, among C and D: C:2 D:1.
        let mut e = election(
            &["A", "B", "C", "D"],
            &[
                &["A", "B", "C", "D"],
                &["A", "B", "C", "D"],
                &["B", "A", "D", "C"],
                &["D", "B", "A", "C"],
            ],
        );
        assert_eq!(e.clear_winner(), None);
        let cid = e.eliminate_strongest_loser().unwrap();
        assert_eq!(e.name(cid), "C");
        assert_eq!(e.candidates(), vec!["A", "B", "D"]);
    }

    #[test]
    fn strongest_loser_trace_shows_narrowing() {
        let mut e = election(
            &["A", "B", "C", "D"],
            &[
                &["A", "B", "C", "D"],
                &["A", "B", "C", "D"],
                &["B", "A", "D", "C"],
                &["D", "B", "A", "C"],
            ],
        );
        let elim = e.eliminate_traced(EliminationPolicy::StrongestLoser).unwrap();
        assert_eq!(elim.examined.len(), 2);
        let (rank, counts) = &elim.examined[0];
        assert_eq!(*rank, 3);
        assert_eq!(
            names(&e, counts),
            vec![(s("C"), 2), (s("D"), 2), (s("A"), 0), (s("B"), 0)]
        );
        let (rank, counts) = &elim.examined[1];
        assert_eq!(*rank, 2);
        assert_eq!(names(&e, counts), vec![(s("C"), 2), (s("D"), 1)]);
    }

    #[test]
    fn cyclic_preferences_cannot_be_broken() {
        let ballots: &[&[&str]] = &[&["A", "B", "C"], &["B", "C", "A"], &["C", "A", "B"]];
        let mut e = election(&["A", "B", "C"], ballots);
        assert_eq!(e.clear_winner(), None);
        assert_eq!(
            e.eliminate_strongest_loser(),
            Err(TallyError::UnresolvableTie {
                candidates: vec![s("A"), s("B"), s("C")]
            })
        );
        // Nothing was removed.
        assert_eq!(e.candidates(), vec!["A", "B", "C"]);

        let mut e = election(&["A", "B", "C"], ballots);
        assert!(matches!(
            e.eliminate_weakest_winner(),
            Err(TallyError::UnresolvableTie { .. })
        ));
    }

    #[test]
    fn runoff_needed_with_three_candidates() {
        let ballots: &[&[&str]] = &[&["A", "B", "C"], &["B", "A", "C"], &["C", "A", "B"]];
        let mut e = election(&["A", "B", "C"], ballots);
        assert_eq!(e.clear_winner(), None);
        // Last rank: C:2 B:1.
        let cid = e.eliminate_strongest_loser().unwrap();
        assert_eq!(e.name(cid), "C");
        let winner = e.clear_winner().unwrap();
        assert_eq!(e.name(winner), "A");

        let mut e = election(&["A", "B", "C"], ballots);
        // First rank is a three-way tie, second rank: A:2 B:1 C:0.
        let cid = e.eliminate_weakest_winner().unwrap();
        assert_eq!(e.name(cid), "C");
    }

    #[test]
    fn policies_can_disagree() {
        let ballots: &[&[&str]] = &[
            &["A", "B", "C"],
            &["A", "C", "B"],
            &["B", "C", "A"],
            &["C", "B", "A"],
        ];
        let mut e = election(&["A", "B", "C"], ballots);
        let cid = e.eliminate_strongest_loser().unwrap();
        assert_eq!(e.name(cid), "A");

        // B and C tie on the first two ranks, and again on the last one.
        let mut e = election(&["A", "B", "C"], ballots);
        assert_eq!(
            e.eliminate_weakest_winner(),
            Err(TallyError::UnresolvableTie {
                candidates: vec![s("B"), s("C")]
            })
        );
    }

    #[test]
    fn weakest_winner_removes_fewest_first_preferences() {
        let mut e = election(
            &["A", "B", "C", "D"],
            &[
                &["A", "B", "C", "D"],
                &["A", "B", "C", "D"],
                &["B", "A", "D", "C"],
                &["D", "B", "A", "C"],
            ],
        );
        let cid = e.eliminate_weakest_winner().unwrap();
        assert_eq!(e.name(cid), "C");
        // Now B and D tie with one first preference each. Second rank among
        // them: B:3 D:0, so D goes.
        let cid = e.eliminate_weakest_winner().unwrap();
        assert_eq!(e.name(cid), "D");
    }

    #[test]
    fn elimination_preserves_relative_order() {
        let ballots: &[&[&str]] = &[
            &["A", "B", "C", "D"],
            &["D", "C", "B", "A"],
            &["B", "D", "A", "C"],
            &["C", "A", "D", "B"],
            &["A", "C", "B", "D"],
        ];
        for policy in [EliminationPolicy::StrongestLoser, EliminationPolicy::WeakestWinner] {
            let mut e = election(&["A", "B", "C", "D"], ballots);
            let before: Vec<Vec<String>> = e
                .ballots()
                .iter()
                .map(|b| e.ballot_names(b).into_iter().map(String::from).collect())
                .collect();
            let cid = e.eliminate(policy).unwrap();
            let gone = e.name(cid).to_string();
            assert_eq!(e.candidates().len(), 3);
            let mut expected: Vec<Vec<String>> = before
                .into_iter()
                .map(|b| b.into_iter().filter(|n| *n != gone).collect())
                .collect();
            expected.sort();
            let after: Vec<Vec<String>> = e
                .ballots()
                .iter()
                .map(|b| e.ballot_names(b).into_iter().map(String::from).collect())
                .collect();
            assert_eq!(after, expected);
            assert!(e.ballots().iter().all(|b| b.len() == 3));
        }
    }

    #[test]
    fn last_candidate_is_never_eliminated() {
        let mut e = election(&["A", "B"], &[&["A", "B"], &["B", "A"], &["B", "A"]]);
        let cid = e.eliminate_strongest_loser().unwrap();
        assert_eq!(e.name(cid), "A");
        assert_eq!(
            e.eliminate_weakest_winner(),
            Err(TallyError::SoleCandidate { name: s("B") })
        );
        assert_eq!(e.name(e.clear_winner().unwrap()), "B");
    }

    #[test]
    fn remove_candidate_by_name() {
        let mut e = election(&["A", "B", "C"], &[&["C", "B", "A"], &["A", "C", "B"]]);
        e.remove_candidate("C").unwrap();
        assert_eq!(e.candidates(), vec!["A", "B"]);
        assert_eq!(
            e.ballot_summary(),
            vec![(vec![s("A"), s("B")], 1), (vec![s("B"), s("A")], 1)]
        );
        assert_eq!(
            e.remove_candidate("C"),
            Err(TallyError::UnknownCandidate { name: s("C") })
        );

        e.remove_candidate("A").unwrap();
        assert_eq!(e.standing().len(), 1);
        assert_eq!(
            e.remove_candidate("B"),
            Err(TallyError::SoleCandidate { name: s("B") })
        );
        assert_eq!(e.candidates(), vec!["B"]);
        assert_eq!(e.ballots().len(), 2);
        assert!(e.ballots().iter().all(|b| b.len() == 1));
        assert_eq!(e.name(e.clear_winner().unwrap()), "B");
    }

    #[test]
    fn inconsistent_ballot_leaves_election_untouched() {
        let mut e = election(&["A", "B", "C"], &[&["A", "B", "C"], &["C", "B", "A"]]);
        let b_id = e.candidate_id("B").unwrap();
        e.ballots
            .push(Ballot::from_preference(vec![CandidateId(0), CandidateId(2)], 9));
        let before = e.clone();
        assert_eq!(
            e.remove_candidate("B"),
            Err(TallyError::CandidateNotOnBallot {
                candidate: b_id,
                lineno: 9
            })
        );
        assert_eq!(e, before);
        assert_eq!(e.ballots()[2].lineno(), 9);
    }

    #[test]
    fn ballots_sorted_by_names() {
        let e = election(
            &["A", "B"],
            &[&["B", "A"], &["A", "B"], &["B", "A"], &["A", "B"]],
        );
        assert_eq!(
            e.ballot_summary(),
            vec![(vec![s("A"), s("B")], 2), (vec![s("B"), s("A")], 2)]
        );
    }

    #[test]
    fn header_must_start_with_timestamp() {
        let t = vec![vec![s("Name"), s("A"), s("B")], vec![s("t"), s("1"), s("2")]];
        assert!(matches!(
            Election::from_table(&t),
            Err(TallyError::InvalidTable { .. })
        ));
        assert!(matches!(
            Election::from_table(&[]),
            Err(TallyError::InvalidTable { .. })
        ));
        assert!(matches!(
            Election::from_table(&[vec![s(TIMESTAMP_MARKER)]]),
            Err(TallyError::InvalidTable { .. })
        ));
    }

    #[test]
    fn duplicate_candidate_names_are_rejected() {
        let t = vec![vec![s(TIMESTAMP_MARKER), s("Q [A]"), s("Q [A]")]];
        assert!(matches!(
            Election::from_table(&t),
            Err(TallyError::InvalidTable { .. })
        ));
    }

    #[test]
    fn malformed_row_aborts_the_load() {
        let t = vec![
            vec![s(TIMESTAMP_MARKER), s("A"), s("B")],
            vec![s("t"), s("1"), s("2")],
            vec![s("t"), s("1"), s("1")],
        ];
        assert!(matches!(
            Election::from_table(&t),
            Err(TallyError::MalformedBallot { lineno: 3, .. })
        ));
    }

    #[test]
    fn decorated_labels_are_stripped_unless_disabled() {
        let t = vec![
            vec![s(TIMESTAMP_MARKER), s("Vote [Ann]"), s("Vote [Bo]")],
            vec![s("t"), s("2"), s("1")],
        ];
        let e = Election::from_table(&t).unwrap();
        assert_eq!(e.candidates(), vec!["Ann", "Bo"]);
        assert_eq!(e.ballot_names(&e.ballots()[0]), vec!["Bo", "Ann"]);

        let rules = TallyRules {
            strip_label_prefix: false,
            ..TallyRules::DEFAULT_RULES
        };
        let e = Election::from_table_with_rules(&t, &rules).unwrap();
        assert_eq!(e.candidates(), vec!["Vote [Ann]", "Vote [Bo]"]);
    }

    #[test]
    fn tabulate_records_rounds() {
        let mut e = election(
            &["A", "B", "C", "D"],
            &[
                &["A", "B", "C", "D"],
                &["A", "B", "C", "D"],
                &["B", "A", "D", "C"],
                &["D", "B", "A", "C"],
                &["C", "D", "B", "A"],
            ],
        );
        let res = tabulate(&mut e, &TallyRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.winner, "B");
        assert_eq!(res.threshold, 3);
        assert_eq!(res.round_stats.len(), 3);

        let first = &res.round_stats[0];
        assert_eq!(first.round, 1);
        assert_eq!(
            first.tally,
            vec![(s("A"), 2), (s("B"), 1), (s("C"), 1), (s("D"), 1)]
        );
        let elim = first.eliminated.as_ref().unwrap();
        assert_eq!(elim.name, "C");
        assert_eq!(
            elim.examined,
            vec![
                RankStats {
                    rank: 3,
                    counts: vec![(s("C"), 2), (s("D"), 2), (s("A"), 1), (s("B"), 0)]
                },
                RankStats {
                    rank: 2,
                    counts: vec![(s("C"), 2), (s("D"), 1)]
                },
            ]
        );

        // Without C, D is last on three ballots.
        let second = &res.round_stats[1];
        assert_eq!(second.tally, vec![(s("A"), 2), (s("D"), 2), (s("B"), 1)]);
        assert_eq!(second.eliminated.as_ref().unwrap().name, "D");

        let last = &res.round_stats[2];
        assert_eq!(last.elected, Some(s("B")));
        assert_eq!(last.eliminated, None);
        assert_eq!(last.tally, vec![(s("B"), 3), (s("A"), 2)]);
        assert_eq!(e.candidates(), vec!["A", "B"]);
    }

    #[test]
    fn tabulate_terminates_within_candidate_count() {
        let ballots: &[&[&str]] = &[
            &["A", "B", "C", "D", "E"],
            &["B", "C", "D", "E", "A"],
            &["C", "D", "E", "A", "B"],
            &["D", "E", "A", "B", "C"],
            &["E", "A", "B", "C", "D"],
            &["A", "C", "E", "B", "D"],
            &["B", "D", "A", "C", "E"],
        ];
        for policy in [EliminationPolicy::StrongestLoser, EliminationPolicy::WeakestWinner] {
            let mut e = election(&["A", "B", "C", "D", "E"], ballots);
            let rules = TallyRules {
                elimination_policy: policy,
                ..TallyRules::DEFAULT_RULES
            };
            match tabulate(&mut e, &rules) {
                Ok(res) => {
                    assert!(res.round_stats.len() <= 5);
                    let eliminations = res
                        .round_stats
                        .iter()
                        .filter(|r| r.eliminated.is_some())
                        .count();
                    assert!(eliminations <= 4);
                }
                Err(err) => assert!(matches!(err, TallyError::UnresolvableTie { .. })),
            }
        }
    }

    #[test]
    fn tabulate_surfaces_unresolvable_tie() {
        let mut e = election(
            &["A", "B", "C"],
            &[&["A", "B", "C"], &["B", "C", "A"], &["C", "A", "B"]],
        );
        assert!(matches!(
            tabulate(&mut e, &TallyRules::DEFAULT_RULES),
            Err(TallyError::UnresolvableTie { .. })
        ));
    }

    #[test]
    fn tabulate_needs_ballots() {
        let mut e = election(&["A", "B"], &[]);
        assert_eq!(
            tabulate(&mut e, &TallyRules::DEFAULT_RULES),
            Err(TallyError::EmptyElection {})
        );
    }

    #[test]
    fn single_candidate_wins_immediately() {
        let mut e = election(&["A"], &[&["A"]]);
        let res = tabulate(&mut e, &TallyRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.winner, "A");
        assert_eq!(res.round_stats.len(), 1);
    }
}
