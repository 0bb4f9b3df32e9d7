use crate::domain::model::OrderRecord;
use crate::utils::error::{LedgerError, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::fmt::{self, Write as _};

pub const EXPORT_MIME_TYPE: &str = "text/csv";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

const HEADERS: [&str; 8] = [
    "Date",
    "Time",
    "Laundry Service",
    "Order Number",
    "Customer Name",
    "Delivery Address",
    "Weight",
    "Price",
];

/// `laundry-tracker-export-2024-03-01.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("laundry-tracker-export-{}.csv", date.format("%Y-%m-%d"))
}

/// Serializes the ledger in storage order, one row per record.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    date_format: String,
    time_format: String,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT)
    }
}

impl CsvExporter {
    pub fn new(date_format: impl Into<String>, time_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
            time_format: time_format.into(),
        }
    }

    /// `None` for an empty ledger: there is nothing to write out.
    pub fn export(&self, records: &[OrderRecord]) -> Result<Option<Vec<u8>>> {
        self.export_in(records, &Local)
    }

    pub fn export_in<Tz: TimeZone>(
        &self,
        records: &[OrderRecord],
        tz: &Tz,
    ) -> Result<Option<Vec<u8>>>
    where
        Tz::Offset: fmt::Display,
    {
        if records.is_empty() {
            tracing::info!("Ledger is empty, nothing to export");
            return Ok(None);
        }

        // 字串欄位自行加引號，數字欄位保持原樣，所以關閉 csv 的自動引號
        // (QuoteStyle::NonNumeric would also quote the header row and the "unclear" weight)
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());

        writer.write_record(HEADERS)?;

        for record in records {
            let (date, time) = self.date_time(record.timestamp, tz)?;
            writer.write_record([
                quote(&date),
                quote(&time),
                quote(&record.service_name),
                quote(&record.order_number),
                quote(&record.customer_name),
                quote(&collapse_newlines(&record.delivery_address)),
                record.weight.to_string(),
                format!("{:.2}", record.price_or_zero()),
            ])?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        tracing::debug!("Exported {} rows ({} bytes)", records.len(), bytes.len());
        Ok(Some(bytes))
    }

    fn date_time<Tz: TimeZone>(&self, timestamp: i64, tz: &Tz) -> Result<(String, String)>
    where
        Tz::Offset: fmt::Display,
    {
        match tz.timestamp_millis_opt(timestamp).earliest() {
            Some(dt) => Ok((
                render(&dt, &self.date_format)?,
                render(&dt, &self.time_format)?,
            )),
            None => Ok((String::new(), String::new())),
        }
    }
}

// chrono 的 Display 遇到無效格式會讓 to_string() panic，改用 write! 接住錯誤
fn render<Tz: TimeZone>(dt: &DateTime<Tz>, format: &str) -> Result<String>
where
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).map_err(|_| LedgerError::ValidationError {
        message: format!("invalid date/time format '{}'", format),
    })?;
    Ok(out)
}

/// Default formats, local time.
pub fn export(records: &[OrderRecord]) -> Result<Option<Vec<u8>>> {
    CsvExporter::default().export(records)
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
