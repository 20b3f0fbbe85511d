use serde::Serialize;

use crate::error::{ClientResult, QueryError};

/// Smallest number of recommendations a query may ask for
pub const MIN_TOP_N: u32 = 1;
/// Largest number of recommendations a query may ask for
pub const MAX_TOP_N: u32 = 50;

/// A validated request for recommendations.
///
/// Only constructible through [`RecommendationQuery::new`], so holding one
/// means the name is non-blank and `top_n` is within range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationQuery {
    anime_name: String,
    top_n: u32,
}

impl RecommendationQuery {
    pub fn new(anime_name: &str, top_n: u32) -> ClientResult<Self> {
        let anime_name = anime_name.trim();
        if anime_name.is_empty() {
            return Err(QueryError::invalid_parameter(
                "An anime name is required and must not be blank",
            ));
        }

        if !(MIN_TOP_N..=MAX_TOP_N).contains(&top_n) {
            return Err(QueryError::invalid_parameter(format!(
                "The number of recommendations must be between {} and {} (got {})",
                MIN_TOP_N, MAX_TOP_N, top_n
            )));
        }

        Ok(Self {
            anime_name: anime_name.to_string(),
            top_n,
        })
    }

    /// Trimmed anime name
    pub fn anime_name(&self) -> &str {
        &self.anime_name
    }

    pub fn top_n(&self) -> u32 {
        self.top_n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_trims_name() {
        let query = RecommendationQuery::new("  Naruto \n", 10).unwrap();
        assert_eq!(query.anime_name(), "Naruto");
        assert_eq!(query.top_n(), 10);
    }

    #[test]
    fn test_blank_name_rejected() {
        for name in ["", "   ", "\t\n"] {
            let err = RecommendationQuery::new(name, 10).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        }
    }

    #[test]
    fn test_top_n_bounds() {
        assert!(RecommendationQuery::new("Naruto", 1).is_ok());
        assert!(RecommendationQuery::new("Naruto", 50).is_ok());

        let err = RecommendationQuery::new("Naruto", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let err = RecommendationQuery::new("Naruto", 51).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(err.message().contains("51"));
    }
}
