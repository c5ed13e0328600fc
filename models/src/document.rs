// models/src/document.rs

use serde::Serialize;

use crate::identifiers::RecordId;

/// A record paired with its identifier in external string form.
///
/// The identifier is emitted twice, as `_id` and `id`, because existing
/// clients read either key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identified<T> {
    #[serde(rename = "_id")]
    pub key: String,
    pub id: String,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Identified<T> {
    pub fn new(id: RecordId, record: T) -> Self {
        let id = id.to_string();
        Self {
            key: id.clone(),
            id,
            record,
        }
    }
}
