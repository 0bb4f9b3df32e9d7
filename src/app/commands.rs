use crate::adapters::storage::LocalStorage;
use crate::config::toml_config::LedgerConfig;
use crate::core::aggregate;
use crate::core::export::export_filename;
use crate::core::intake::Intake;
use crate::core::ledger::LedgerStore;
use crate::core::selection::Selection;
use crate::core::workflow::{Draft, EditableField};
use crate::domain::model::{OrderRecord, ReviewUrgency};
use crate::domain::ports::{ConfirmPrompt, ExtractionRequest, Extractor, Storage};
use crate::utils::error::Result;
use chrono::{Local, NaiveDate, TimeZone};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Corrections the operator supplies before confirming a draft.
#[derive(Debug, Clone, Default)]
pub struct DraftEdits {
    pub weight: Option<String>,
    pub customer_name: Option<String>,
    pub delivery_address: Option<String>,
}

impl DraftEdits {
    fn apply(&self, draft: &mut Draft) {
        let edits = [
            (EditableField::Weight, &self.weight),
            (EditableField::CustomerName, &self.customer_name),
            (EditableField::DeliveryAddress, &self.delivery_address),
        ];

        for (field, value) in edits {
            if let Some(text) = value {
                draft.begin_edit(field);
                draft.input(field, text);
                draft.finish_edit(field);
            }
        }
    }
}

/// The ledger plus the settings every command needs.
pub struct LedgerApp<S: Storage> {
    config: LedgerConfig,
    store: LedgerStore<S>,
}

impl<S: Storage> LedgerApp<S> {
    pub fn new(config: LedgerConfig, storage: S) -> Self {
        let store = LedgerStore::load(storage, config.storage.ledger_key.clone());
        Self { config, store }
    }

    pub fn store(&self) -> &LedgerStore<S> {
        &self.store
    }

    /// Runs one extraction, applies edits, then saves or drops the draft.
    /// Returns the saved order's timestamp.
    pub async fn record<E, W>(
        &mut self,
        extractor: &E,
        request: &ExtractionRequest,
        edits: &DraftEdits,
        discard: bool,
        out: &mut W,
    ) -> Result<Option<i64>>
    where
        E: Extractor + ?Sized,
        W: Write,
    {
        let mut intake = Intake::new(self.config.price_schedule());
        intake.run(extractor, request).await?;

        let thresholds = self.config.review_thresholds();
        if let Some(draft) = intake.draft_mut() {
            let urgency = draft.urgency(&thresholds);
            writeln!(out, "Extracted order ({}):", urgency.label())?;
            write_record(out, draft.original())?;
            if urgency == ReviewUrgency::Urgent {
                tracing::warn!(
                    "⚠️ Low confidence extraction ({:.2}), check the fields",
                    draft.original().confidence
                );
            }

            edits.apply(draft);
            writeln!(
                out,
                "Reviewed: weight {} kg, price {:.2}, customer '{}', address '{}'",
                draft.value(EditableField::Weight),
                draft.price(),
                draft.value(EditableField::CustomerName),
                draft.value(EditableField::DeliveryAddress),
            )?;
        }

        if discard {
            intake.discard()?;
            writeln!(out, "Draft discarded, nothing saved.")?;
            return Ok(None);
        }

        let timestamp = intake.confirm(&mut self.store)?;
        writeln!(out, "Saved order {}", timestamp)?;
        Ok(Some(timestamp))
    }

    pub fn list<W: Write>(&self, out: &mut W) -> Result<()> {
        let months = aggregate::group(self.store.records());
        if months.is_empty() {
            writeln!(out, "No orders recorded yet.")?;
            return Ok(());
        }

        for month in &months {
            writeln!(
                out,
                "{}  ({} orders, {} kg, {:.2})",
                month.display_label,
                month.order_count(),
                month.total_weight(),
                month.total_price()
            )?;
            for service in &month.services {
                writeln!(
                    out,
                    "  {}: {} orders, {} kg, {:.2}",
                    service.display_name.trim(),
                    service.records.len(),
                    service.total_weight,
                    service.total_price
                )?;
                for record in &service.records {
                    writeln!(
                        out,
                        "    [{}] {}  #{}  {}  {} kg  {:.2}",
                        record.timestamp,
                        local_time(record.timestamp),
                        record.order_number,
                        record.customer_name,
                        record.weight,
                        record.price_or_zero()
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Applies corrections to a saved order and stores the repriced record in its place.
    /// Returns `false` when no order has that timestamp.
    pub fn amend<W: Write>(
        &mut self,
        timestamp: i64,
        edits: &DraftEdits,
        out: &mut W,
    ) -> Result<bool> {
        let Some(saved) = self.store.get(timestamp).cloned() else {
            writeln!(out, "No order with timestamp {}", timestamp)?;
            return Ok(false);
        };

        let mut draft = Draft::new(saved, self.config.price_schedule());
        edits.apply(&mut draft);
        let updated = draft.confirm();

        self.store.replace(updated);
        if let Some(error) = self.store.last_persist_error() {
            tracing::warn!("⚠️ Amended order {} kept in memory only: {}", timestamp, error);
        }
        writeln!(out, "Amended order {}", timestamp)?;
        if let Some(record) = self.store.get(timestamp) {
            write_record(out, record)?;
        }
        Ok(true)
    }

    /// Detail view. Returns `false` when no order has that timestamp.
    pub fn show<W: Write>(&self, timestamp: i64, out: &mut W) -> Result<bool> {
        match self.store.get(timestamp) {
            Some(record) => {
                write_record(out, record)?;
                let urgency =
                    ReviewUrgency::from_confidence(record.confidence, &self.config.review_thresholds());
                writeln!(out, "  Review:     {}", urgency.label())?;
                Ok(true)
            }
            None => {
                writeln!(out, "No order with timestamp {}", timestamp)?;
                Ok(false)
            }
        }
    }

    /// Selects the given orders and deletes them behind `prompt`.
    pub fn delete<P, W>(&mut self, timestamps: &[i64], prompt: &mut P, out: &mut W) -> Result<usize>
    where
        P: ConfirmPrompt + ?Sized,
        W: Write,
    {
        let mut selection = Selection::new();
        selection.enter_selecting();

        let unique: BTreeSet<i64> = timestamps.iter().copied().collect();
        for timestamp in unique {
            if self.store.get(timestamp).is_none() {
                tracing::warn!("No order with timestamp {}, skipping", timestamp);
                continue;
            }
            selection.toggle(timestamp);
        }

        let removed = selection.commit_delete(&mut self.store, prompt);
        writeln!(out, "Deleted {} orders", removed)?;
        Ok(removed)
    }

    /// Writes the CSV artifact into `out_dir` (or the configured directory).
    /// Returns `None` when the ledger is empty and nothing was written.
    pub fn export<W: Write>(
        &self,
        out_dir: Option<&Path>,
        today: NaiveDate,
        out: &mut W,
    ) -> Result<Option<PathBuf>> {
        let Some(bytes) = self.config.exporter().export(self.store.records())? else {
            writeln!(out, "Nothing to export.")?;
            return Ok(None);
        };

        let dir = out_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.export.output_dir));
        let filename = export_filename(today);
        let target = LocalStorage::new(&dir);
        target.write_blob(&filename, &bytes)?;

        let path = target.path_for(&filename);
        tracing::info!("📁 Exported {} orders to {}", self.store.len(), path.display());
        writeln!(out, "Exported {} orders to {}", self.store.len(), path.display())?;
        Ok(Some(path))
    }
}

fn local_time(timestamp: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp)
        .earliest()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn write_record<W: Write>(out: &mut W, record: &OrderRecord) -> Result<()> {
    writeln!(out, "  Service:    {}", record.service_name)?;
    writeln!(out, "  Order:      {}", record.order_number)?;
    writeln!(out, "  Customer:   {}", record.customer_name)?;
    writeln!(out, "  Address:    {}", record.delivery_address)?;
    writeln!(out, "  Weight:     {}", record.weight)?;
    writeln!(out, "  Price:      {:.2}", record.price_or_zero())?;
    writeln!(out, "  Confidence: {:.0}%", record.confidence * 100.0)?;
    writeln!(out, "  Recorded:   {}", local_time(record.timestamp))?;
    Ok(())
}
