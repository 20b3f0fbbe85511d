use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{
    error::ClientResult,
    models::{QueryResult, RecommendationQuery},
    services::{normalizer, query_client::RecommendationSource},
};

/// Fetches and normalizes recommendations for an anime title
///
/// Errors from the source pass through unchanged; normalization never fails.
/// Clones share the same source and the same query generation counter.
#[derive(Clone)]
pub struct RecommendationService {
    source: Arc<dyn RecommendationSource>,
    generation: Arc<AtomicU64>,
}

impl RecommendationService {
    pub fn new(source: Arc<dyn RecommendationSource>) -> Self {
        Self {
            source,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Validates the input, fetches from the source and normalizes the payload
    pub async fn fetch_recommendations(
        &self,
        anime_name: &str,
        top_n: u32,
    ) -> ClientResult<QueryResult> {
        let query = RecommendationQuery::new(anime_name, top_n)?;
        let raw = self.source.fetch(&query).await?;
        let result = normalizer::normalize(&raw, query.anime_name());

        tracing::info!(
            anime = %query.anime_name(),
            top_n = query.top_n(),
            results = result.total_recommendations,
            source = self.source.name(),
            "Recommendations fetched"
        );

        Ok(result)
    }

    /// Like [`fetch_recommendations`](Self::fetch_recommendations), but resolves to
    /// `Ok(None)` when a newer call started before this one finished.
    ///
    /// The generation is taken when this method is called, not when the future is
    /// first polled, so call order decides which query is current.
    pub fn fetch_latest(
        &self,
        anime_name: &str,
        top_n: u32,
    ) -> impl Future<Output = ClientResult<Option<QueryResult>>> + Send + 'static {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let service = self.clone();
        let anime_name = anime_name.to_string();

        async move {
            let outcome = service.fetch_recommendations(&anime_name, top_n).await;

            if !service.is_current(generation) {
                tracing::debug!(
                    anime = %anime_name,
                    generation,
                    "Discarding response for superseded query"
                );
                return Ok(None);
            }

            outcome.map(Some)
        }
    }

    /// Generation of the most recent [`fetch_latest`](Self::fetch_latest) call
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }
}
