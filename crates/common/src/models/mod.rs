pub mod analysis;
pub mod bar;
pub mod news;
pub mod signal;
pub mod snapshot;

pub use analysis::AnalysisResult;
pub use bar::OhlcvBar;
pub use news::{NewsItem, RawNewsRecord};
pub use signal::{InvalidField, LoggedSignal, SignalKind, TradeSignal};
pub use snapshot::MarketSnapshot;
