use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNCLEAR_WEIGHT: &str = "unclear";

/// Weight of an order in kilograms, or the marker left when extraction could not read one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "WeightRepr", into = "WeightRepr")]
pub enum Weight {
    Kg(f64),
    Unclear,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WeightRepr {
    Number(f64),
    Text(String),
}

impl Weight {
    /// Parses operator or extractor text. Anything that is not a finite, non-negative
    /// number yields `None`.
    pub fn parse_kg(text: &str) -> Option<f64> {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|kg| kg.is_finite() && *kg >= 0.0)
    }

    pub fn from_text(text: &str) -> Self {
        Self::parse_kg(text).map_or(Weight::Unclear, Weight::Kg)
    }

    pub fn kg(&self) -> Option<f64> {
        match self {
            Weight::Kg(kg) => Some(*kg),
            Weight::Unclear => None,
        }
    }

    /// 加總時 unclear 視為 0
    pub fn kg_or_zero(&self) -> f64 {
        self.kg().unwrap_or(0.0)
    }

    pub fn is_unclear(&self) -> bool {
        matches!(self, Weight::Unclear)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Kg(kg) => write!(f, "{}", kg),
            Weight::Unclear => f.write_str(UNCLEAR_WEIGHT),
        }
    }
}

impl From<WeightRepr> for Weight {
    fn from(repr: WeightRepr) -> Self {
        match repr {
            WeightRepr::Number(kg) if kg.is_finite() && kg >= 0.0 => Weight::Kg(kg),
            WeightRepr::Number(_) => Weight::Unclear,
            WeightRepr::Text(text) => Weight::from_text(&text),
        }
    }
}

impl From<Weight> for WeightRepr {
    fn from(weight: Weight) -> Self {
        match weight {
            Weight::Kg(kg) => WeightRepr::Number(kg),
            Weight::Unclear => WeightRepr::Text(UNCLEAR_WEIGHT.to_string()),
        }
    }
}

/// A confirmed (or draft) laundry order. The timestamp doubles as its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub service_name: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub delivery_address: String,
    pub weight: Weight,
    #[serde(default)]
    pub price: Option<f64>,
    pub confidence: f64,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_photo: Option<String>,
}

impl OrderRecord {
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    /// Grouping identity of the service: trimmed and lower-cased.
    pub fn service_key(&self) -> String {
        self.service_name.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewThresholds {
    pub routine: f64,
    pub urgent: f64,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            routine: 0.8,
            urgent: 0.5,
        }
    }
}

/// How closely the operator should check an extraction before confirming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewUrgency {
    Routine,
    Check,
    Urgent,
}

impl ReviewUrgency {
    pub fn from_confidence(confidence: f64, thresholds: &ReviewThresholds) -> Self {
        if confidence >= thresholds.routine {
            ReviewUrgency::Routine
        } else if confidence >= thresholds.urgent {
            ReviewUrgency::Check
        } else {
            ReviewUrgency::Urgent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewUrgency::Routine => "high confidence",
            ReviewUrgency::Check => "please double-check",
            ReviewUrgency::Urgent => "low confidence, review carefully",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_serializes_number_or_marker() {
        assert_eq!(serde_json::to_string(&Weight::Kg(3.5)).unwrap(), "3.5");
        assert_eq!(serde_json::to_string(&Weight::Unclear).unwrap(), "\"unclear\"");

        let parsed: Weight = serde_json::from_str("\"unclear\"").unwrap();
        assert_eq!(parsed, Weight::Unclear);
        let parsed: Weight = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, Weight::Kg(4.0));
        let parsed: Weight = serde_json::from_str("\"6.25\"").unwrap();
        assert_eq!(parsed, Weight::Kg(6.25));
        let parsed: Weight = serde_json::from_str("-2").unwrap();
        assert_eq!(parsed, Weight::Unclear);
    }

    #[test]
    fn test_weight_parse_rejects_garbage() {
        assert_eq!(Weight::parse_kg(" 12.5 "), Some(12.5));
        assert_eq!(Weight::parse_kg("abc"), None);
        assert_eq!(Weight::parse_kg(""), None);
        assert_eq!(Weight::parse_kg("inf"), None);
        assert_eq!(Weight::parse_kg("-1"), None);
    }

    #[test]
    fn test_weight_display() {
        assert_eq!(Weight::Kg(3.0).to_string(), "3");
        assert_eq!(Weight::Kg(7.25).to_string(), "7.25");
        assert_eq!(Weight::Unclear.to_string(), "unclear");
    }

    #[test]
    fn test_record_deserializes_without_optional_fields() {
        let json = r#"{"service_name":"Acme","weight":"unclear","confidence":0.4,"timestamp":1}"#;
        let record: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.order_number, "");
        assert_eq!(record.price, None);
        assert_eq!(record.price_or_zero(), 0.0);
        assert!(record.weight.is_unclear());
        assert!(record.weight_photo.is_none());
    }

    #[test]
    fn test_service_key_normalizes() {
        let record = OrderRecord {
            service_name: "  Acme Wash ".to_string(),
            order_number: String::new(),
            customer_name: String::new(),
            delivery_address: String::new(),
            weight: Weight::Kg(1.0),
            price: None,
            confidence: 1.0,
            timestamp: 0,
            weight_photo: None,
            customer_photo: None,
        };
        assert_eq!(record.service_key(), "acme wash");
    }

    #[test]
    fn test_review_urgency_tiers() {
        let thresholds = ReviewThresholds::default();
        assert_eq!(
            ReviewUrgency::from_confidence(0.95, &thresholds),
            ReviewUrgency::Routine
        );
        assert_eq!(
            ReviewUrgency::from_confidence(0.8, &thresholds),
            ReviewUrgency::Routine
        );
        assert_eq!(
            ReviewUrgency::from_confidence(0.6, &thresholds),
            ReviewUrgency::Check
        );
        assert_eq!(
            ReviewUrgency::from_confidence(0.1, &thresholds),
            ReviewUrgency::Urgent
        );
        assert_eq!(
            ReviewUrgency::from_confidence(f64::NAN, &thresholds),
            ReviewUrgency::Urgent
        );
    }
}
