pub mod chart_response;
pub mod completion_response;
pub mod llm_client;
pub mod news_response;
pub mod yahoo_client;

pub use chart_response::ChartResponse;
pub use completion_response::ChatCompletionResponse;
pub use llm_client::LlmClient;
pub use news_response::SearchResponse;
pub use yahoo_client::YahooClient;
