use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a recommendation: the backend's own id, or its position in the response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecommendationId {
    Source(String),
    Position(usize),
}

impl Display for RecommendationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationId::Source(id) => write!(f, "{}", id),
            RecommendationId::Position(index) => write!(f, "{}", index),
        }
    }
}

/// Coarse rating bucket used to style recommendation cards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RatingCategory {
    Excellent,
    High,
    Medium,
    Low,
}

impl RatingCategory {
    /// Buckets an already normalized rating
    pub fn from_rating(rating: f64) -> Self {
        if rating >= 8.5 {
            RatingCategory::Excellent
        } else if rating >= 7.0 {
            RatingCategory::High
        } else if rating >= 5.0 {
            RatingCategory::Medium
        } else {
            RatingCategory::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingCategory::Excellent => "Excellent",
            RatingCategory::High => "Very good",
            RatingCategory::Medium => "Good",
            RatingCategory::Low => "Fair",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RatingCategory::Excellent => "Masterpiece",
            RatingCategory::High => "Highly recommended",
            RatingCategory::Medium => "Worth watching",
            RatingCategory::Low => "Consider other options",
        }
    }
}

// ============================================================================
// Backend payload types
// ============================================================================

/// Response body of the recommendation endpoint, kept uninterpreted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(pub Value);

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One untrusted entry of `recommendations`; every field may be missing or mistyped
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecommendation {
    pub id: Option<Value>,
    pub anime_name: Option<Value>,
    pub name: Option<Value>,
    pub title: Option<Value>,
    pub similarity_score: Option<Value>,
    pub rating: Option<Value>,
    pub genres: Option<Value>,
    pub year: Option<Value>,
    pub episodes: Option<Value>,
    pub status: Option<Value>,
    pub synopsis: Option<Value>,
    pub image_url: Option<Value>,
    #[serde(rename = "imageUrl")]
    pub image_url_camel: Option<Value>,
    pub rank: Option<Value>,
}

// ============================================================================
// Canonical types
// ============================================================================

/// A normalized recommendation, ready to render as a card
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub name: String,
    /// Integer percentage in `0..=100`
    pub similarity: u8,
    /// `0.0..=10.0` with one decimal
    pub rating: f64,
    pub rating_category: RatingCategory,
    pub genres: Vec<String>,
    pub year: Option<i32>,
    pub episodes: Option<u32>,
    pub status: String,
    pub synopsis: String,
    pub image_url: Option<String>,
    /// 1-based
    pub rank: u32,
    /// True for the first three entries in arrival order
    pub is_highlighted: bool,
}

/// Outcome of one successful recommendation fetch
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryResult {
    pub original_anime: String,
    pub recommendations: Vec<Recommendation>,
    pub total_recommendations: usize,
    pub timestamp: DateTime<Utc>,
}

impl QueryResult {
    pub fn empty(original_anime: &str) -> Self {
        Self::new(original_anime, Vec::new())
    }

    pub fn new(original_anime: &str, recommendations: Vec<Recommendation>) -> Self {
        Self {
            original_anime: original_anime.to_string(),
            total_recommendations: recommendations.len(),
            recommendations,
            timestamp: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &Recommendation> {
        self.recommendations.iter().filter(|r| r.is_highlighted)
    }
}
