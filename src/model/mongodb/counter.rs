use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
    ClientSession,
};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Coll;

/// The ID of the counter that allocates election IDs.
pub const ELECTION_ID_COUNTER: &str = "electionId";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Atomically retrieve the next value of the counter with the given ID.
    ///
    /// This runs inside the caller's session so the allocation and the write
    /// that consumes it commit or abort together; an aborted transaction
    /// never burns an ID.
    pub async fn next(
        counters: &Coll<Counter>,
        id: &str,
        session: &mut ClientSession,
    ) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update_with_session(doc! { "_id": id }, update, options, session)
            .await?
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    format!("Failed to find counter with ID {id}"),
                )
            })?;
        Ok(counter.next)
    }
}

/// Ensure the election ID counter exists, starting at zero.
///
/// This operation is idempotent: an existing counter is left untouched.
pub async fn ensure_election_id_counter_exists(counters: &Coll<Counter>) -> Result<()> {
    let update = doc! {
        "$setOnInsert": { "next": 0 }
    };
    let options = UpdateOptions::builder().upsert(true).build();
    counters
        .update_one(doc! { "_id": ELECTION_ID_COUNTER }, update, options)
        .await?;
    Ok(())
}
