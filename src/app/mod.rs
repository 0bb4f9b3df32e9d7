// Application layer: the commands the CLI runs against a ledger.

pub mod commands;

pub use commands::{DraftEdits, LedgerApp};
