use std::ops::Deref;

use mongodb::{Collection, Database};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::election::Election;
use crate::model::ledger::{CandidateLedger, VoterLedger};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a
    /// collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

// The election aggregate: the source of truth for all per-election data.
impl MongoCollection for Election {
    const NAME: &'static str = "elections";
}

// Per-election secondary indexes, keyed by election ID.
impl MongoCollection for CandidateLedger {
    const NAME: &'static str = "candidates";
}
impl MongoCollection for VoterLedger {
    const NAME: &'static str = "voters";
}

// Counter collection.
impl MongoCollection for Counter {
    const NAME: &'static str = "counters";
}
