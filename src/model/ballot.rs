use serde::{Deserialize, Serialize};

use crate::model::{AccountId, Timestamp};

/// A registered contestant within one election, carrying its own vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Identity of the contestant; unique within its election.
    pub account_id: AccountId,
    /// Votes received so far.
    pub total_votes: u64,
}

impl Candidate {
    /// A freshly-registered candidate with no votes.
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            total_votes: 0,
        }
    }
}

/// A record of one account's single ballot cast for one candidate.
///
/// Created exactly once per (election, account) pair; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    /// Identity of the caster.
    pub account_id: AccountId,
    /// The chosen candidate; refers to a candidate registered in the same
    /// election at vote time.
    pub voted_candidate_account_id: AccountId,
    /// When the ballot was cast.
    pub voted_at: Timestamp,
}

impl Voter {
    pub fn new(account_id: AccountId, voted_candidate_account_id: AccountId, voted_at: Timestamp) -> Self {
        Self {
            account_id,
            voted_candidate_account_id,
            voted_at,
        }
    }
}
