use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::VoteError;
use crate::model::ballot::{Candidate, Voter};
use crate::model::{AccountId, ElectionId, Timestamp};

/// Scale factor between API-level milliseconds and stored nanoseconds.
pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// Current wall-clock time in the internal nanosecond unit.
pub fn time_now() -> Timestamp {
    Utc::now()
        .timestamp_nanos_opt()
        .expect("nanosecond timestamps are in range until the year 2262")
}

/// Phases of the election lifecycle.
///
/// The phase is never stored. It is derived from the stored window and the
/// current time at each call, so there is no second source of truth that
/// could drift from the timestamps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionState {
    /// The voting window has not opened yet.
    Pending,
    /// Candidate registration and voting are permitted.
    Active,
    /// The voting window has passed.
    Closed,
}

/// An election, as stored in the database.
///
/// The embedded `candidates` and `voters` lists are the source of truth;
/// the per-election ledger collections are secondary indexes derived from
/// them (see [`crate::model::ledger`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    /// Unique ID, assigned sequentially from zero.
    #[serde(rename = "_id")]
    pub id: ElectionId,
    /// Display name.
    pub name: String,
    /// Start of the voting window, in nanoseconds.
    pub starts_at: Timestamp,
    /// End of the voting window, in nanoseconds.
    pub ends_at: Timestamp,
    /// Registered candidates, in registration order.
    pub candidates: Vec<Candidate>,
    /// Accounts that have already cast a ballot.
    pub voters: Vec<AccountId>,
    /// Total ballots cast. Always equals `voters.len()` and the sum of the
    /// candidates' own counts.
    pub total_votes: u64,
}

impl Election {
    /// Create a new, empty election. The window endpoints arrive in
    /// milliseconds and are stored in nanoseconds.
    ///
    /// `starts_at >= ends_at` is deliberately not rejected; such an election
    /// simply never enters the `Active` phase.
    pub fn new(id: ElectionId, name: String, starts_at_ms: i64, ends_at_ms: i64) -> Self {
        Self {
            id,
            name,
            starts_at: starts_at_ms.saturating_mul(NANOS_PER_MILLI),
            ends_at: ends_at_ms.saturating_mul(NANOS_PER_MILLI),
            candidates: Vec::new(),
            voters: Vec::new(),
            total_votes: 0,
        }
    }

    /// Derive the phase of this election at the given instant.
    pub fn state(&self, now: Timestamp) -> ElectionState {
        if now <= self.starts_at {
            ElectionState::Pending
        } else if now < self.ends_at {
            ElectionState::Active
        } else {
            ElectionState::Closed
        }
    }

    /// True iff candidate registration and voting are permitted at `now`.
    /// The comparison is strict on both ends: `starts_at < now < ends_at`.
    pub fn is_happening(&self, now: Timestamp) -> bool {
        self.state(now) == ElectionState::Active
    }

    /// Look up a registered candidate by account ID.
    pub fn candidate(&self, account_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.account_id == account_id)
    }

    /// Register a candidate.
    ///
    /// Fails if the election is not in its active window, or if the account
    /// is already registered. Returns the new candidate record so the caller
    /// can mirror it into the candidate ledger.
    pub fn add_candidate(
        &mut self,
        account_id: AccountId,
        now: Timestamp,
    ) -> Result<Candidate, VoteError> {
        if !self.is_happening(now) {
            return Err(VoteError::ElectionNotActive);
        }
        if self.candidate(&account_id).is_some() {
            return Err(VoteError::DuplicateCandidate);
        }
        let candidate = Candidate::new(account_id);
        self.candidates.push(candidate.clone());
        Ok(candidate)
    }

    /// Cast a ballot on behalf of `voter`.
    ///
    /// Preconditions are checked in a fixed order and the first failure
    /// aborts the call: active window, then double-vote, then candidate
    /// existence. On success the tally, the voter set, and the chosen
    /// candidate's count all move together, so the totals invariant holds.
    pub fn cast_vote(
        &mut self,
        voter: AccountId,
        candidate_id: &str,
        now: Timestamp,
    ) -> Result<Voter, VoteError> {
        if !self.is_happening(now) {
            return Err(VoteError::ElectionNotActive);
        }
        if self.voters.contains(&voter) {
            return Err(VoteError::DuplicateVote);
        }
        let candidate = self
            .candidates
            .iter_mut()
            .find(|c| c.account_id == candidate_id)
            .ok_or(VoteError::CandidateNotFound)?;
        candidate.total_votes += 1;
        let ballot = Voter::new(voter, candidate.account_id.clone(), now);
        self.voters.push(ballot.account_id.clone());
        self.total_votes += 1;
        Ok(ballot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One hour, in internal units.
    const HOUR: Timestamp = 3_600_000 * NANOS_PER_MILLI;

    /// An election whose window is `[T, T + 1h]` in milliseconds, with `now`
    /// placed in the middle of it.
    fn active_election() -> (Election, Timestamp) {
        let election = Election::new(0, "Test Election".to_string(), 1_000_000, 1_000_000 + 3_600_000);
        let now = election.starts_at + HOUR / 2;
        (election, now)
    }

    /// The tally invariant: `total_votes == |voters| == Σ candidate votes`.
    fn assert_tally_consistent(election: &Election) {
        assert_eq!(election.total_votes, election.voters.len() as u64);
        assert_eq!(
            election.total_votes,
            election.candidates.iter().map(|c| c.total_votes).sum::<u64>()
        );
    }

    #[test]
    fn new_election_converts_millis_to_nanos() {
        let election = Election::new(3, "Conversion".to_string(), 1_000, 2_000);
        assert_eq!(election.id, 3);
        assert_eq!(election.starts_at, 1_000 * NANOS_PER_MILLI);
        assert_eq!(election.ends_at, 2_000 * NANOS_PER_MILLI);
        assert!(election.candidates.is_empty());
        assert!(election.voters.is_empty());
        assert_eq!(election.total_votes, 0);
    }

    #[test]
    fn state_is_derived_from_the_window() {
        let (election, now) = active_election();
        assert_eq!(election.state(election.starts_at - 1), ElectionState::Pending);
        assert_eq!(election.state(now), ElectionState::Active);
        assert_eq!(election.state(election.ends_at + 1), ElectionState::Closed);
    }

    #[test]
    fn window_bounds_are_strict() {
        let (election, _) = active_election();
        // Exactly at the endpoints the election is not happening.
        assert!(!election.is_happening(election.starts_at));
        assert!(!election.is_happening(election.ends_at));
        assert!(election.is_happening(election.starts_at + 1));
        assert!(election.is_happening(election.ends_at - 1));
    }

    #[test]
    fn inverted_window_is_never_active() {
        // `starts_at >= ends_at` is accepted at creation but freezes the
        // election out of every phase transition.
        let election = Election::new(0, "Frozen".to_string(), 2_000, 1_000);
        for now in [0, election.ends_at, election.starts_at, election.starts_at + HOUR] {
            assert!(!election.is_happening(now));
        }
    }

    #[test]
    fn add_candidate_appends_with_zero_votes() {
        let (mut election, now) = active_election();
        let candidate = election.add_candidate("a.near".to_string(), now).unwrap();
        assert_eq!(candidate.account_id, "a.near");
        assert_eq!(candidate.total_votes, 0);
        assert_eq!(election.candidates, vec![candidate]);
    }

    #[test]
    fn add_candidate_preserves_registration_order() {
        let (mut election, now) = active_election();
        for account in ["c.near", "a.near", "b.near"] {
            election.add_candidate(account.to_string(), now).unwrap();
        }
        let order: Vec<&str> = election.candidates.iter().map(|c| c.account_id.as_str()).collect();
        assert_eq!(order, vec!["c.near", "a.near", "b.near"]);
    }

    #[test]
    fn add_candidate_outside_window_is_rejected() {
        let (mut election, _) = active_election();
        let before = election.starts_at - 1;
        let after = election.ends_at;
        assert_eq!(
            election.add_candidate("a.near".to_string(), before),
            Err(VoteError::ElectionNotActive)
        );
        assert_eq!(
            election.add_candidate("a.near".to_string(), after),
            Err(VoteError::ElectionNotActive)
        );
        assert!(election.candidates.is_empty());
    }

    #[test]
    fn duplicate_candidate_is_rejected() {
        let (mut election, now) = active_election();
        election.add_candidate("a.near".to_string(), now).unwrap();
        assert_eq!(
            election.add_candidate("a.near".to_string(), now),
            Err(VoteError::DuplicateCandidate)
        );
        assert_eq!(election.candidates.len(), 1);
    }

    #[test]
    fn same_account_may_run_in_two_elections() {
        let (mut first, now) = active_election();
        let mut second = Election::new(1, "Other".to_string(), 1_000_000, 1_000_000 + 3_600_000);
        first.add_candidate("a.near".to_string(), now).unwrap();
        second.add_candidate("a.near".to_string(), now).unwrap();
        assert_eq!(first.candidates.len(), 1);
        assert_eq!(second.candidates.len(), 1);
    }

    #[test]
    fn cast_vote_updates_every_copy_of_the_tally() {
        let (mut election, now) = active_election();
        election.add_candidate("a.near".to_string(), now).unwrap();
        election.add_candidate("b.near".to_string(), now).unwrap();

        let ballot = election.cast_vote("a.near".to_string(), "a.near", now).unwrap();
        assert_eq!(ballot.account_id, "a.near");
        assert_eq!(ballot.voted_candidate_account_id, "a.near");
        assert_eq!(ballot.voted_at, now);

        assert_eq!(election.voters, vec!["a.near".to_string()]);
        assert_eq!(election.candidate("a.near").unwrap().total_votes, 1);
        assert_eq!(election.candidate("b.near").unwrap().total_votes, 0);
        assert_tally_consistent(&election);
    }

    #[test]
    fn tally_invariant_holds_over_a_sequence_of_votes() {
        let (mut election, now) = active_election();
        election.add_candidate("a.near".to_string(), now).unwrap();
        election.add_candidate("b.near".to_string(), now).unwrap();

        for (voter, choice) in [
            ("v1.near", "a.near"),
            ("v2.near", "b.near"),
            ("v3.near", "a.near"),
            ("v4.near", "a.near"),
        ] {
            election.cast_vote(voter.to_string(), choice, now).unwrap();
            assert_tally_consistent(&election);
        }
        assert_eq!(election.total_votes, 4);
        assert_eq!(election.candidate("a.near").unwrap().total_votes, 3);
        assert_eq!(election.candidate("b.near").unwrap().total_votes, 1);
    }

    #[test]
    fn double_vote_is_rejected_and_changes_nothing() {
        let (mut election, now) = active_election();
        election.add_candidate("a.near".to_string(), now).unwrap();
        election.add_candidate("b.near".to_string(), now).unwrap();
        election.cast_vote("v.near".to_string(), "a.near", now).unwrap();

        let before = election.clone();
        // Even switching candidates does not grant a second ballot.
        assert_eq!(
            election.cast_vote("v.near".to_string(), "b.near", now),
            Err(VoteError::DuplicateVote)
        );
        assert_eq!(election, before);
    }

    #[test]
    fn vote_for_unknown_candidate_is_rejected_and_changes_nothing() {
        let (mut election, now) = active_election();
        election.add_candidate("a.near".to_string(), now).unwrap();

        let before = election.clone();
        assert_eq!(
            election.cast_vote("v.near".to_string(), "nobody.near", now),
            Err(VoteError::CandidateNotFound)
        );
        assert_eq!(election, before);
    }

    #[test]
    fn vote_outside_window_is_rejected() {
        let (mut election, now) = active_election();
        election.add_candidate("a.near".to_string(), now).unwrap();
        assert_eq!(
            election.cast_vote("v.near".to_string(), "a.near", election.ends_at),
            Err(VoteError::ElectionNotActive)
        );
        assert_eq!(election.total_votes, 0);
    }

    #[test]
    fn window_check_precedes_the_other_vote_checks() {
        let (mut election, now) = active_election();
        election.add_candidate("a.near".to_string(), now).unwrap();
        election.cast_vote("v.near".to_string(), "a.near", now).unwrap();

        // After the window closes, a repeat voter gets the inactive error,
        // not the duplicate-vote one.
        let closed = election.ends_at + 1;
        assert_eq!(
            election.cast_vote("v.near".to_string(), "a.near", closed),
            Err(VoteError::ElectionNotActive)
        );
        // Same for an unknown candidate.
        assert_eq!(
            election.cast_vote("w.near".to_string(), "nobody.near", closed),
            Err(VoteError::ElectionNotActive)
        );
    }

    #[test]
    fn double_vote_check_precedes_candidate_lookup() {
        let (mut election, now) = active_election();
        election.add_candidate("a.near".to_string(), now).unwrap();
        election.cast_vote("v.near".to_string(), "a.near", now).unwrap();

        // A repeat voter naming an unknown candidate sees the duplicate-vote
        // error, matching the documented precondition order.
        assert_eq!(
            election.cast_vote("v.near".to_string(), "nobody.near", now),
            Err(VoteError::DuplicateVote)
        );
    }
}
