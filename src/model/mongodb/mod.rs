mod bson;
mod collection;
mod counter;

pub use bson::election_id_filter;
pub use collection::{Coll, MongoCollection};
pub use counter::{ensure_election_id_counter_exists, Counter, ELECTION_ID_COUNTER};
