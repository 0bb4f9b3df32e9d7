use crate::core::export::{CsvExporter, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT};
use crate::core::ledger::DEFAULT_LEDGER_KEY;
use crate::domain::model::ReviewThresholds;
use crate::domain::pricing::{PriceSchedule, DEFAULT_MINIMUM_CHARGE, DEFAULT_RATE_PER_KG};
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_strftime, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub storage: StorageConfig,
    pub extraction: ExtractionConfig,
    pub pricing: PricingConfig,
    pub review: ReviewConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub ledger_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            ledger_key: DEFAULT_LEDGER_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub rate_per_kg: f64,
    pub minimum_charge: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            rate_per_kg: DEFAULT_RATE_PER_KG,
            minimum_charge: DEFAULT_MINIMUM_CHARGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub routine_threshold: f64,
    pub urgent_threshold: f64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        let thresholds = ReviewThresholds::default();
        Self {
            routine_threshold: thresholds.routine,
            urgent_threshold: thresholds.urgent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: String,
    pub date_format: String,
    pub time_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl LedgerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Like [`from_file`](Self::from_file), but a missing file means defaults.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LedgerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${EXTRACTION_API_KEY})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn price_schedule(&self) -> PriceSchedule {
        PriceSchedule {
            rate_per_kg: self.pricing.rate_per_kg,
            minimum_charge: self.pricing.minimum_charge,
        }
    }

    pub fn review_thresholds(&self) -> ReviewThresholds {
        ReviewThresholds {
            routine: self.review.routine_threshold,
            urgent: self.review.urgent_threshold,
        }
    }

    pub fn exporter(&self) -> CsvExporter {
        CsvExporter::new(&self.export.date_format, &self.export.time_format)
    }
}

impl Validate for LedgerConfig {
    fn validate(&self) -> Result<()> {
        validate_path("storage.data_dir", &self.storage.data_dir)?;
        validate_non_empty_string("storage.ledger_key", &self.storage.ledger_key)?;

        if let Some(endpoint) = &self.extraction.endpoint {
            validate_url("extraction.endpoint", endpoint)?;
        }

        validate_range("pricing.rate_per_kg", self.pricing.rate_per_kg, 0.0, f64::MAX)?;
        validate_range(
            "pricing.minimum_charge",
            self.pricing.minimum_charge,
            0.0,
            f64::MAX,
        )?;

        validate_range(
            "review.routine_threshold",
            self.review.routine_threshold,
            0.0,
            1.0,
        )?;
        validate_range(
            "review.urgent_threshold",
            self.review.urgent_threshold,
            0.0,
            self.review.routine_threshold,
        )?;

        validate_path("export.output_dir", &self.export.output_dir)?;
        validate_strftime("export.date_format", &self.export.date_format)?;
        validate_strftime("export.time_format", &self.export.time_format)?;

        Ok(())
    }
}
