use mongodb::{
    bson::{doc, to_bson},
    options::{ReplaceOptions, UpdateOptions},
};
use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoteError};
use crate::model::{
    auth::AuthToken,
    ballot::{Candidate, Voter},
    election::{time_now, Election},
    ledger::{CandidateLedger, VoterLedger},
    mongodb::{election_id_filter, Coll},
    AccountId, CandidateId, ElectionId,
};

pub fn routes() -> Vec<Route> {
    routes![
        add_candidate_to_election,
        vote,
        get_candidates_by_election,
        get_voters_by_election,
    ]
}

#[post("/elections/<election_id>/candidates", data = "<request>", format = "json")]
async fn add_candidate_to_election(
    _token: AuthToken,
    election_id: ElectionId,
    request: Json<AddCandidateRequest>,
    elections: Coll<Election>,
    candidates: Coll<CandidateLedger>,
) -> Result<()> {
    let mut election = elections
        .find_one(election_id_filter(election_id), None)
        .await?
        .ok_or(VoteError::ElectionNotFound)?;

    let candidate = election.add_candidate(request.0.account_id, time_now())?;

    // The aggregate is the source of truth and must land first; the roster
    // is a secondary index that can be rebuilt from it.
    elections
        .replace_one(election_id_filter(election_id), &election, None)
        .await?;
    candidates
        .update_one(
            election_id_filter(election_id),
            doc! { "$push": { "candidates": to_bson(&candidate)? } },
            UpdateOptions::builder().upsert(true).build(),
        )
        .await?;

    info!(
        "Added candidate '{}' to election {election_id}",
        candidate.account_id
    );
    Ok(())
}

/// Record one ballot for the calling account.
#[post("/elections/<election_id>/vote", data = "<request>", format = "json")]
async fn vote(
    token: AuthToken,
    election_id: ElectionId,
    request: Json<VoteRequest>,
    elections: Coll<Election>,
    candidates: Coll<CandidateLedger>,
    voters: Coll<VoterLedger>,
) -> Result<()> {
    let mut election = elections
        .find_one(election_id_filter(election_id), None)
        .await?
        .ok_or(VoteError::ElectionNotFound)?;

    let ballot = election.cast_vote(token.account_id, &request.0.candidate_id, time_now())?;

    // Source-of-truth aggregate first.
    elections
        .replace_one(election_id_filter(election_id), &election, None)
        .await?;

    // Then refresh the secondary indexes from it. The roster is replaced
    // wholesale so its per-candidate tallies match the embedded copy.
    candidates
        .replace_one(
            election_id_filter(election_id),
            CandidateLedger::from_election(&election),
            ReplaceOptions::builder().upsert(true).build(),
        )
        .await?;
    voters
        .update_one(
            election_id_filter(election_id),
            doc! { "$push": { "voters": to_bson(&ballot)? } },
            UpdateOptions::builder().upsert(true).build(),
        )
        .await?;

    info!(
        "Recorded vote by '{}' for '{}' in election {election_id}",
        ballot.account_id, ballot.voted_candidate_account_id
    );
    Ok(())
}

/// The candidate roster of an election, in registration order. An election
/// with no candidates (or no record at all) yields an empty list.
#[get("/elections/<election_id>/candidates")]
async fn get_candidates_by_election(
    election_id: ElectionId,
    candidates: Coll<CandidateLedger>,
) -> Result<Json<Vec<Candidate>>> {
    let roster = candidates
        .find_one(election_id_filter(election_id), None)
        .await?;
    Ok(Json(roster.map(|r| r.candidates).unwrap_or_default()))
}

/// The ballots cast in an election, in casting order.
#[get("/elections/<election_id>/voters")]
async fn get_voters_by_election(
    election_id: ElectionId,
    voters: Coll<VoterLedger>,
) -> Result<Json<Vec<Voter>>> {
    let ledger = voters
        .find_one(election_id_filter(election_id), None)
        .await?;
    Ok(Json(ledger.map(|l| l.voters).unwrap_or_default()))
}

/// A candidate registration request.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCandidateRequest {
    pub account_id: AccountId,
}

/// A ballot for a specific candidate.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteRequest {
    pub candidate_id: CandidateId,
}
