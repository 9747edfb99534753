pub mod error;
pub mod remote;
pub mod traits;

pub use error::RemoteError;
pub use traits::{
    CompletionProvider, CompletionRequest, HistoryWindow, MarketDataProvider, NewsProvider,
};
