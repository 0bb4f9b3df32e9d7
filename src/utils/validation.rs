use crate::utils::error::{LedgerError, Result};
use chrono::format::{Item, StrftimeItems};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LedgerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| LedgerError::MissingConfigError {
        field: field_name.to_string(),
    })
}

/// Rejects strftime patterns chrono cannot render, such as `%Q`.
pub fn validate_strftime(field_name: &str, format: &str) -> Result<()> {
    validate_non_empty_string(field_name, format)?;
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format.to_string(),
            reason: "Not a valid strftime format".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 不滿足任何比較，也一併擋下
    if !(value >= min && value <= max) {
        return Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_strftime() {
        assert!(validate_strftime("export.date_format", "%Y-%m-%d").is_ok());
        assert!(validate_strftime("export.time_format", "%H:%M").is_ok());
        assert!(validate_strftime("export.date_format", "%Q").is_err());
        assert!(validate_strftime("export.date_format", "  ").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("extraction.endpoint", "https://example.com/extract").is_ok());
        assert!(validate_url("extraction.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("extraction.endpoint", "").is_err());
        assert!(validate_url("extraction.endpoint", "invalid-url").is_err());
        assert!(validate_url("extraction.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("pricing.rate_per_kg", 2.5, 0.0, f64::MAX).is_ok());
        assert!(validate_range("pricing.rate_per_kg", -1.0, 0.0, f64::MAX).is_err());
        assert!(validate_range("pricing.rate_per_kg", f64::NAN, 0.0, f64::MAX).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("extraction.endpoint", &missing),
            Err(LedgerError::MissingConfigError { .. })
        ));
        let present = Some("x".to_string());
        assert_eq!(validate_required_field("f", &present).unwrap(), "x");
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("storage.ledger_key", "ledger.json").is_ok());
        assert!(validate_non_empty_string("storage.ledger_key", "   ").is_err());
    }
}
