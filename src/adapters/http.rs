use crate::domain::model::{OrderRecord, Weight};
use crate::domain::ports::{ExtractionRequest, Extractor};
use crate::domain::pricing::PriceSchedule;
use crate::utils::error::{LedgerError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Body returned by the extraction service.
#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    order_number: String,
    #[serde(default)]
    customer_name: String,
    #[serde(default)]
    delivery_address: String,
    #[serde(default = "unclear_weight")]
    weight: Weight,
    #[serde(default)]
    confidence: f64,
}

fn unclear_weight() -> Weight {
    Weight::Unclear
}

/// Posts both photos as a multipart form to the extraction endpoint.
pub struct HttpExtractor {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
    schedule: PriceSchedule,
}

impl HttpExtractor {
    pub fn new(endpoint: impl Into<String>, schedule: PriceSchedule) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
            headers: HashMap::new(),
            schedule,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    fn build_record(&self, request: &ExtractionRequest, body: ExtractionResponse) -> OrderRecord {
        let confidence = if body.confidence.is_finite() {
            body.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        OrderRecord {
            service_name: request.service_name.trim().to_string(),
            order_number: body.order_number,
            customer_name: body.customer_name,
            delivery_address: body.delivery_address,
            price: Some(self.schedule.price_for_weight(&body.weight)),
            weight: body.weight,
            confidence,
            timestamp: chrono::Utc::now().timestamp_millis(),
            weight_photo: request.weight_photo_ref.clone(),
            customer_photo: request.customer_photo_ref.clone(),
        }
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<OrderRecord> {
        let form = Form::new()
            .text("service_name", request.service_name.trim().to_string())
            .part(
                "weight_photo",
                Part::bytes(request.weight_photo.clone()).file_name("weight_photo"),
            )
            .part(
                "customer_photo",
                Part::bytes(request.customer_photo.clone()).file_name("customer_photo"),
            );

        let mut http_request = self.client.post(&self.endpoint).multipart(form);

        for (key, value) in &self.headers {
            http_request = http_request.header(key, value);
        }

        if let Some(timeout) = self.timeout {
            http_request = http_request.timeout(timeout);
        }

        tracing::debug!("Sending extraction request to: {}", self.endpoint);
        let response = http_request.send().await?;
        let status = response.status();
        tracing::debug!("Extraction response status: {}", status);

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LedgerError::Extraction {
                message: format!("service answered {} {}", status, detail.trim()),
            });
        }

        let text = response.text().await?;
        let body: ExtractionResponse =
            serde_json::from_str(&text).map_err(|e| LedgerError::Extraction {
                message: format!("unreadable extraction result: {}", e),
            })?;

        Ok(self.build_record(request, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn request() -> ExtractionRequest {
        ExtractionRequest {
            service_name: " Acme ".to_string(),
            weight_photo: b"scale-bytes".to_vec(),
            customer_photo: b"label-bytes".to_vec(),
            weight_photo_ref: Some("photos/scale.jpg".to_string()),
            customer_photo_ref: Some("photos/label.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_extract_populates_draft() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/extract")
                .header("x-api-key", "secret")
                .body_contains("scale-bytes");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "order_number": "A-42",
                    "customer_name": "Dana",
                    "delivery_address": "1 Main St",
                    "weight": 4.0,
                    "confidence": 0.93
                }));
        });

        let mut headers = HashMap::new();
        headers.insert("x-api-key".to_string(), "secret".to_string());
        let extractor = HttpExtractor::new(server.url("/extract"), PriceSchedule::default())
            .with_headers(headers)
            .with_timeout(Duration::from_secs(5));

        let record = extractor.extract(&request()).await.unwrap();

        api_mock.assert();
        assert_eq!(record.service_name, "Acme");
        assert_eq!(record.order_number, "A-42");
        assert_eq!(record.weight, Weight::Kg(4.0));
        assert_eq!(record.price, Some(10.0));
        assert_eq!(record.confidence, 0.93);
        assert_eq!(record.weight_photo.as_deref(), Some("photos/scale.jpg"));
        assert!(record.timestamp > 0);
    }

    #[tokio::test]
    async fn test_unclear_weight_and_out_of_range_confidence() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/extract");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "weight": "unclear",
                    "confidence": 1.7
                }));
        });

        let extractor = HttpExtractor::new(server.url("/extract"), PriceSchedule::default());
        let record = extractor.extract(&request()).await.unwrap();

        assert_eq!(record.weight, Weight::Unclear);
        assert_eq!(record.price, Some(0.0));
        assert_eq!(record.confidence, 1.0);
        assert_eq!(record.customer_name, "");
    }

    #[tokio::test]
    async fn test_server_error_is_extraction_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/extract");
            then.status(502).body("upstream model timeout");
        });

        let extractor = HttpExtractor::new(server.url("/extract"), PriceSchedule::default());
        let err = extractor.extract(&request()).await.unwrap_err();

        api_mock.assert();
        match err {
            LedgerError::Extraction { message } => {
                assert!(message.contains("502"));
                assert!(message.contains("upstream model timeout"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_extraction_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/extract");
            then.status(200).body("<html>not json</html>");
        });

        let extractor = HttpExtractor::new(server.url("/extract"), PriceSchedule::default());
        assert!(matches!(
            extractor.extract(&request()).await,
            Err(LedgerError::Extraction { .. })
        ));
    }
}
