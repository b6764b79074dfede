pub mod fetcher;
pub mod llm;
pub mod search;

pub use fetcher::ReqwestFetcher;
pub use llm::{AnyModelClient, ModelEndpoints, OllamaClient, OpenAiClient, query_model};
pub use search::DuckDuckGoSearch;
