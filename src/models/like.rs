use serde::Deserialize;

use crate::listing::mutation::{Acknowledgement, LikeState};

/// Answer of `POST /posts/{id}/like`.
///
/// Both fields are optional so that a truncated answer still decodes and can
/// be told apart from a transport failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: Option<bool>,
    pub like_count: Option<i64>,
}

impl LikeResponse {
    pub fn into_acknowledgement(self) -> Acknowledgement<LikeState> {
        match (self.liked, self.like_count) {
            (Some(liked), Some(count)) if count >= 0 => {
                Acknowledgement::Confirmed(LikeState::new(liked, count as u64))
            }
            _ => Acknowledgement::Ambiguous,
        }
    }
}
