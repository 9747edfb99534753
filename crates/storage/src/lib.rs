pub mod db;
pub mod repositories;
pub mod signal_store;

pub use signal_store::SignalStore;
