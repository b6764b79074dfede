pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod filter;
pub mod locator;
pub mod models;
pub mod pacing;
pub mod page;
pub mod patterns;
pub mod reader;
pub mod search;
pub mod status;
pub mod strategy;
pub mod structure;
pub mod text;
pub mod traits;

#[cfg(test)]
mod testutil;

pub use config::SearchConfig;
pub use error::AppError;
pub use extractor::ListingExtractor;
pub use filter::KeywordFilter;
pub use locator::{CareerPageLocator, LocateStrategy};
pub use models::{
    CandidateSource, CandidateUrl, JobListing, ModelInfo, ModelSelection, SUPPORTED_MODELS,
    SearchOutcome, SearchRequest,
};
pub use search::JobSearchService;
pub use status::{SearchEvent, StatusLog};
pub use traits::{ModelClient, PageFetcher, WebSearch};
