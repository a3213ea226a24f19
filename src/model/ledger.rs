//! Per-election secondary collections.
//!
//! The election aggregate embeds its own candidate and voter lists; these
//! ledgers duplicate that data keyed by election ID so the lists can be read
//! without deserialising the full election record. Every mutating operation
//! writes the aggregate first and then refreshes the ledger, so a lost ledger
//! write can always be repaired from the aggregate.

use serde::{Deserialize, Serialize};

use crate::model::ballot::{Candidate, Voter};
use crate::model::election::Election;
use crate::model::ElectionId;

/// The candidate roster of one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLedger {
    #[serde(rename = "_id")]
    pub election_id: ElectionId,
    /// Candidates in registration order, with their vote counts.
    pub candidates: Vec<Candidate>,
}

impl CandidateLedger {
    /// Rebuild the roster from the source-of-truth aggregate.
    pub fn from_election(election: &Election) -> Self {
        Self {
            election_id: election.id,
            candidates: election.candidates.clone(),
        }
    }
}

/// The cast ballots of one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterLedger {
    #[serde(rename = "_id")]
    pub election_id: ElectionId,
    /// Ballots in casting order.
    pub voters: Vec<Voter>,
}
