//! Entity extraction
//!
//! Maps a raw `EntityRecord` to the caller-facing `CanonicalEntity`. Total over
//! the record: every absent field, including the nested image and detailed
//! description objects, becomes the `NOT_AVAILABLE` sentinel.

use super::types::{CanonicalEntity, DebugCandidate, EntityRecord, RawCandidate, NOT_AVAILABLE};

impl From<&EntityRecord> for CanonicalEntity {
    fn from(entity: &EntityRecord) -> Self {
        let detailed = entity.detailed_description.as_ref();

        Self {
            kg_id: or_sentinel(entity.id.as_deref()),
            name: or_sentinel(entity.name.as_deref()),
            description: or_sentinel(entity.description.as_deref()),
            types: entity.types.clone(),
            url: or_sentinel(entity.url.as_deref()),
            image_url: or_sentinel(
                entity
                    .image
                    .as_ref()
                    .and_then(|image| image.content_url.as_deref()),
            ),
            detailed_description: or_sentinel(detailed.and_then(|d| d.article_body.as_deref())),
            detailed_description_url: or_sentinel(detailed.and_then(|d| d.url.as_deref())),
        }
    }
}

impl DebugCandidate {
    /// Row for the diagnostic listing; `rank` is 1-based.
    pub fn from_candidate(rank: usize, candidate: &RawCandidate) -> Self {
        let entity = &candidate.result;
        Self {
            rank,
            name: entity.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            description: entity
                .description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
            kg_id: entity.id.clone().unwrap_or_else(|| "No ID".to_string()),
            types: entity.types.clone(),
            result_score: candidate.result_score,
            url: entity.url.clone().unwrap_or_else(|| "No URL".to_string()),
        }
    }
}

fn or_sentinel(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}
