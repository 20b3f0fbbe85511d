pub mod debounce;
pub mod normalizer;
pub mod query_client;
pub mod recommendations;

pub use debounce::{DebounceScheduler, DebouncedCallback, TimerHandle};
pub use query_client::{QueryClient, RecommendationSource};
pub use recommendations::RecommendationService;
