use mongodb::{bson::doc, options::FindOptions, Client};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    auth::AuthToken,
    ballot::Candidate,
    election::Election,
    mongodb::{election_id_filter, Coll, Counter, ELECTION_ID_COUNTER},
    AccountId, ElectionId, Timestamp,
};

pub fn routes() -> Vec<Route> {
    routes![create_election, get_election, get_all_elections]
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    _token: AuthToken,
    spec: Json<ElectionSpec>,
    elections: Coll<Election>,
    counters: Coll<Counter>,
    db_client: &State<Client>,
) -> Result<()> {
    let spec = spec.0;

    // Allocate the ID and insert the record in one transaction, so that a
    // failed insert cannot waste an ID and IDs stay dense.
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;
    let id = Counter::next(&counters, ELECTION_ID_COUNTER, &mut session).await?;
    let election = Election::new(id, spec.name, spec.starts_at, spec.ends_at);
    elections
        .insert_one_with_session(&election, None, &mut session)
        .await?;
    session.commit_transaction().await?;

    info!("Created election {} '{}'", election.id, election.name);
    Ok(())
}

/// Look up a single election. A missing election is not an error: the
/// response body is `null`.
#[get("/elections/<election_id>")]
async fn get_election(
    election_id: ElectionId,
    elections: Coll<Election>,
) -> Result<Json<Option<ElectionView>>> {
    let election = elections
        .find_one(election_id_filter(election_id), None)
        .await?;
    Ok(Json(election.map(ElectionView::from)))
}

/// List every election, newest first.
#[get("/elections")]
async fn get_all_elections(elections: Coll<Election>) -> Result<Json<Vec<ElectionView>>> {
    let options = FindOptions::builder().sort(doc! { "_id": -1 }).build();
    let elections = elections
        .find(None, options)
        .await?
        .map_ok(ElectionView::from)
        .try_collect()
        .await?;
    Ok(Json(elections))
}

/// An election creation request. The window endpoints are in milliseconds;
/// they are stored with nanosecond precision.
///
/// An inverted window (`startsAt >= endsAt`) is accepted as-is: the
/// resulting election never opens.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElectionSpec {
    pub name: String,
    pub starts_at: i64,
    pub ends_at: i64,
}

/// An API-friendly view of an election.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionView {
    pub id: ElectionId,
    pub name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub candidates: Vec<Candidate>,
    pub voters: Vec<AccountId>,
    pub total_votes: u64,
}

impl From<Election> for ElectionView {
    fn from(election: Election) -> Self {
        Self {
            id: election.id,
            name: election.name,
            starts_at: election.starts_at,
            ends_at: election.ends_at,
            candidates: election.candidates,
            voters: election.voters,
            total_votes: election.total_votes,
        }
    }
}
