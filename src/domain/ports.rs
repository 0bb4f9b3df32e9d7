use crate::domain::model::OrderRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Named blob store holding the serialized ledger.
pub trait Storage {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn read_blob(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write_blob(&self, key: &str, data: &[u8]) -> Result<()>;
}

/// What the operator submits for one order.
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    pub service_name: String,
    pub weight_photo: Vec<u8>,
    pub customer_photo: Vec<u8>,
    /// Opaque references kept on the record for display.
    pub weight_photo_ref: Option<String>,
    pub customer_photo_ref: Option<String>,
}

/// Reads the two photos and returns a fully populated draft record.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<OrderRecord>;
}

/// Yes/no gate shown before a batch deletion.
pub trait ConfirmPrompt {
    fn confirm(&mut self, count: usize) -> bool;
}
