pub mod aggregate;
pub mod export;
pub mod intake;
pub mod ledger;
pub mod selection;
pub mod workflow;

pub use crate::domain::model::{OrderRecord, Weight};
pub use crate::domain::ports::{ConfirmPrompt, ExtractionRequest, Extractor, Storage};
pub use crate::utils::error::Result;
