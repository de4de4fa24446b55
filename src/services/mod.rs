pub mod offline;
pub mod recommendations;

pub use offline::OfflineManager;
pub use recommendations::RecommendationService;
