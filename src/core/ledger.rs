use crate::domain::model::OrderRecord;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

pub const DEFAULT_LEDGER_KEY: &str = "laundry-ledger.json";

/// In-memory ledger mirrored to a blob store after every mutation.
///
/// Records are kept newest first. Memory is authoritative for the life of the process;
/// a failed write is logged and remembered but never rolls the ledger back.
pub struct LedgerStore<S: Storage> {
    storage: S,
    key: String,
    records: Vec<OrderRecord>,
    last_persist_error: Option<String>,
}

impl<S: Storage> LedgerStore<S> {
    /// 啟動時載入，任何讀取或解析失敗都當作沒有歷史資料
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let records = match Self::read_records(&storage, &key) {
            Ok(records) => {
                tracing::debug!("Loaded {} records from '{}'", records.len(), key);
                records
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Stored ledger '{}' could not be read, starting empty: {}",
                    key,
                    e
                );
                Vec::new()
            }
        };

        Self {
            storage,
            key,
            records,
            last_persist_error: None,
        }
    }

    fn read_records(storage: &S, key: &str) -> Result<Vec<OrderRecord>> {
        match storage.read_blob(key)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, timestamp: i64) -> Option<&OrderRecord> {
        self.records.iter().find(|r| r.timestamp == timestamp)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Error text of the most recent failed write, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    pub fn append(&mut self, record: OrderRecord) {
        tracing::debug!(
            "Appending order {} ({})",
            record.timestamp,
            record.service_name
        );
        self.records.insert(0, record);
        self.persist();
    }

    /// Removes every record matching `predicate` and returns how many went.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&OrderRecord) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|record| !predicate(record));
        let removed = before - self.records.len();

        if removed > 0 {
            tracing::info!("🗑️ Removed {} records", removed);
            self.persist();
        }
        removed
    }

    /// Swaps in a whole new version of the record with the same timestamp.
    pub fn replace(&mut self, record: OrderRecord) -> bool {
        match self
            .records
            .iter_mut()
            .find(|r| r.timestamp == record.timestamp)
        {
            Some(slot) => {
                *slot = record;
                self.persist();
                true
            }
            None => false,
        }
    }

    fn persist(&mut self) {
        let result = serde_json::to_vec_pretty(&self.records)
            .map_err(Into::into)
            .and_then(|bytes| self.storage.write_blob(&self.key, &bytes));

        match result {
            Ok(()) => {
                self.last_persist_error = None;
            }
            Err(e) => {
                tracing::error!("❌ Failed to persist ledger '{}': {}", self.key, e);
                self.last_persist_error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::domain::model::Weight;
    use crate::utils::error::LedgerError;

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn read_blob(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(LedgerError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read denied",
            )))
        }

        fn write_blob(&self, _key: &str, _data: &[u8]) -> Result<()> {
            Err(LedgerError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "write denied",
            )))
        }
    }

    fn record(timestamp: i64, service: &str) -> OrderRecord {
        OrderRecord {
            service_name: service.to_string(),
            order_number: format!("ORD-{}", timestamp),
            customer_name: "Dana".to_string(),
            delivery_address: "1 Main St".to_string(),
            weight: Weight::Kg(3.0),
            price: Some(7.5),
            confidence: 0.9,
            timestamp,
            weight_photo: None,
            customer_photo: None,
        }
    }

    #[test]
    fn test_load_missing_blob_is_empty() {
        let store = LedgerStore::load(MemoryStorage::new(), DEFAULT_LEDGER_KEY);
        assert!(store.is_empty());
        assert!(store.last_persist_error().is_none());
    }

    #[test]
    fn test_load_corrupt_blob_is_empty() {
        let storage = MemoryStorage::new();
        storage
            .write_blob(DEFAULT_LEDGER_KEY, b"{not json")
            .unwrap();

        let store = LedgerStore::load(storage, DEFAULT_LEDGER_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_read_failure_is_empty() {
        let store = LedgerStore::load(FailingStorage, DEFAULT_LEDGER_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_prepends_and_persists() {
        let storage = MemoryStorage::new();
        let mut store = LedgerStore::load(storage.clone(), DEFAULT_LEDGER_KEY);

        store.append(record(1, "Acme"));
        store.append(record(2, "Acme"));

        assert_eq!(store.records()[0].timestamp, 2);
        assert_eq!(store.records()[1].timestamp, 1);

        let reloaded = LedgerStore::load(storage, DEFAULT_LEDGER_KEY);
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let mut store = LedgerStore::load(FailingStorage, DEFAULT_LEDGER_KEY);
        store.append(record(1, "Acme"));

        assert_eq!(store.len(), 1);
        assert!(store
            .last_persist_error()
            .unwrap()
            .contains("write denied"));
    }

    #[test]
    fn test_remove_where_counts_and_persists() {
        let storage = MemoryStorage::new();
        let mut store = LedgerStore::load(storage.clone(), DEFAULT_LEDGER_KEY);
        for ts in 1..=4 {
            store.append(record(ts, "Acme"));
        }

        let removed = store.remove_where(|r| r.timestamp % 2 == 0);
        assert_eq!(removed, 2);

        let reloaded = LedgerStore::load(storage, DEFAULT_LEDGER_KEY);
        let remaining: Vec<i64> = reloaded.records().iter().map(|r| r.timestamp).collect();
        assert_eq!(remaining, vec![3, 1]);
    }

    #[test]
    fn test_replace_swaps_whole_record() {
        let mut store = LedgerStore::load(MemoryStorage::new(), DEFAULT_LEDGER_KEY);
        store.append(record(10, "Acme"));

        let mut updated = record(10, "Acme");
        updated.customer_name = "Robin".to_string();
        assert!(store.replace(updated));
        assert_eq!(store.get(10).unwrap().customer_name, "Robin");

        assert!(!store.replace(record(99, "Acme")));
    }
}
