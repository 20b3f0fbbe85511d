mod query;
mod recommendation;

pub use query::{RecommendationQuery, MAX_TOP_N, MIN_TOP_N};
pub use recommendation::{
    QueryResult, RatingCategory, RawPayload, RawRecommendation, Recommendation, RecommendationId,
};
