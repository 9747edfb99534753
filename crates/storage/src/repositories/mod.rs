pub mod signal_repo;

pub use signal_repo::SignalRepository;
