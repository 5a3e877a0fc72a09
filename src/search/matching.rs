//! Match generation from a set of favorite dogs

use crate::core::error::{AdoptError, AdoptResult, FetchError, ValidationError};
use crate::core::model::Dog;
use crate::core::service::DogApi;
use indexmap::IndexSet;
use std::sync::Arc;

/// Asks the backend to pick one dog among the favorites, then hydrates it
pub struct MatchMaker {
    api: Arc<dyn DogApi>,
}

impl MatchMaker {
    pub fn new(api: Arc<dyn DogApi>) -> Self {
        Self { api }
    }

    /// Generate a match from `favorite_ids`
    ///
    /// Duplicates are collapsed. An empty list is rejected before any request.
    pub async fn generate(&self, favorite_ids: &[String]) -> AdoptResult<Dog> {
        let candidates: Vec<String> = favorite_ids
            .iter()
            .cloned()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        if candidates.is_empty() {
            return Err(ValidationError::EmptyFavorites.into());
        }

        let matched = self.api.match_dogs(&candidates).await?;
        tracing::info!(matched = %matched, candidates = candidates.len(), "match generated");

        self.api
            .dogs(std::slice::from_ref(&matched))
            .await?
            .into_iter()
            .find(|dog| dog.id == matched)
            .ok_or_else(|| {
                AdoptError::Fetch(FetchError::Decode {
                    endpoint: "/dogs".to_string(),
                    message: format!("matched dog '{}' missing from response", matched),
                })
            })
    }
}
