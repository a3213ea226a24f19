pub mod auth;
pub mod ballot;
pub mod election;
pub mod ledger;
pub mod mongodb;

/// Caller and candidate identities are plain account ID strings.
pub type AccountId = String;
/// Our election IDs are integers, assigned sequentially from zero.
pub type ElectionId = u32;
/// Candidates are identified by their account ID.
pub type CandidateId = String;
/// Timestamps are nanoseconds since the Unix epoch.
pub type Timestamp = i64;
