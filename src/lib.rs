//! Client-side query pipeline for anime recommendations.
//!
//! Input is debounced with [`services::DebounceScheduler`] or
//! [`services::DebouncedCallback`], fetched through [`services::QueryClient`],
//! and normalized into a [`models::QueryResult`] by
//! [`services::RecommendationService`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{ClientResult, ErrorKind, QueryError};
pub use models::{QueryResult, RatingCategory, Recommendation, RecommendationQuery};
pub use services::{QueryClient, RecommendationService};
