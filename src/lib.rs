pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};
pub use config::LedgerConfig;

pub use adapters::{http::HttpExtractor, storage::LocalStorage, storage::MemoryStorage};
pub use app::{DraftEdits, LedgerApp};
pub use core::{ledger::LedgerStore, workflow::Draft};
pub use domain::model::{OrderRecord, Weight};
pub use utils::error::{LedgerError, Result};
