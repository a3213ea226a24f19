use mongodb::bson::{doc, Document};

use crate::model::ElectionId;

/// Build an `_id` filter for a collection keyed by election ID.
/// BSON has no unsigned integer type, so widen to `i64`; MongoDB matches
/// numerically across integer widths.
pub fn election_id_filter(id: ElectionId) -> Document {
    doc! { "_id": i64::from(id) }
}
