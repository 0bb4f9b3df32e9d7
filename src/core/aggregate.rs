//! Month → service hierarchy derived from the ledger.
//!
//! The view is rebuilt from a ledger snapshot on every call; nothing is cached.

use crate::domain::model::OrderRecord;
use chrono::{Datelike, Local, TimeZone};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceGroup {
    /// Casing of the first record seen for this service within the month.
    pub display_name: String,
    pub records: Vec<OrderRecord>,
    pub total_weight: f64,
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    /// `YYYY-MM`, zero padded.
    pub sort_key: String,
    pub display_label: String,
    pub services: Vec<ServiceGroup>,
}

impl MonthGroup {
    pub fn order_count(&self) -> usize {
        self.services.iter().map(|s| s.records.len()).sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.services.iter().map(|s| s.total_weight).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.services.iter().map(|s| s.total_price).sum()
    }
}

struct MonthBucket {
    sort_key: String,
    display_label: String,
    services: Vec<ServiceGroup>,
    seen_services: HashMap<String, usize>,
}

/// Groups in the machine's local time zone.
pub fn group(records: &[OrderRecord]) -> Vec<MonthGroup> {
    group_in(records, &Local)
}

pub fn group_in<Tz: TimeZone>(records: &[OrderRecord], tz: &Tz) -> Vec<MonthGroup>
where
    Tz::Offset: fmt::Display,
{
    let mut buckets: Vec<MonthBucket> = Vec::new();
    let mut month_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let (sort_key, display_label) = month_key(record.timestamp, tz);

        let bucket_idx = *month_index.entry(sort_key.clone()).or_insert_with(|| {
            buckets.push(MonthBucket {
                sort_key,
                display_label,
                services: Vec::new(),
                seen_services: HashMap::new(),
            });
            buckets.len() - 1
        });
        let bucket = &mut buckets[bucket_idx];

        // 以第一次出現的寫法當作顯示名稱
        let service_idx = *bucket
            .seen_services
            .entry(record.service_key())
            .or_insert_with(|| {
                bucket.services.push(ServiceGroup {
                    display_name: record.service_name.clone(),
                    records: Vec::new(),
                    total_weight: 0.0,
                    total_price: 0.0,
                });
                bucket.services.len() - 1
            });

        let service = &mut bucket.services[service_idx];
        service.total_weight += record.weight.kg_or_zero();
        service.total_price += record.price_or_zero();
        service.records.push(record.clone());
    }

    // sort_by is stable; keys are unique anyway
    buckets.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));

    buckets
        .into_iter()
        .map(|bucket| MonthGroup {
            sort_key: bucket.sort_key,
            display_label: bucket.display_label,
            services: bucket.services,
        })
        .collect()
}

fn month_key<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> (String, String)
where
    Tz::Offset: fmt::Display,
{
    match tz.timestamp_millis_opt(timestamp).earliest() {
        Some(dt) => (
            format!("{:04}-{:02}", dt.year(), dt.month()),
            dt.format("%B %Y").to_string(),
        ),
        None => {
            tracing::warn!("Timestamp {} is out of range, grouping as unknown", timestamp);
            ("0000-00".to_string(), "Unknown date".to_string())
        }
    }
}
