use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{PredictionClient, PredictionResult};
use crate::features::PredictionRequest;
use crate::prelude::Result;
use crate::req::HttpClient;
use crate::PredictionError;

/// Client for the remote what-if prediction endpoint.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: HttpClient,
    path: String,
}

impl HttpPredictionClient {
    pub fn new(
        base_url: impl Into<String>,
        path: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Ok(Self {
            http: HttpClient::new(base_url, timeout)?,
            path,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.http.base_url, self.path)
    }
}

/// Pull a numeric `probability` out of a response body.
fn parse_probability(text: &str) -> std::result::Result<PredictionResult, PredictionError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| PredictionError::malformed(format!("invalid JSON: {e}")))?;

    match value.get("probability") {
        Some(Value::Number(n)) => {
            let p = n
                .as_f64()
                .ok_or_else(|| PredictionError::malformed("probability not representable"))?;
            PredictionResult::from_probability(p)
        }
        Some(other) => Err(PredictionError::malformed(format!(
            "probability is not a number: {other}"
        ))),
        None => match value.get("error").and_then(Value::as_str) {
            Some(err) => Err(PredictionError::malformed(format!(
                "no probability in response, service error: {err}"
            ))),
            None => Err(PredictionError::malformed("no probability in response")),
        },
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn request_prediction(
        &self,
        request: &PredictionRequest,
    ) -> std::result::Result<PredictionResult, PredictionError> {
        let body = serde_json::to_string(&request.body())
            .map_err(|e| PredictionError::transport(format!("encode request: {e}")))?;
        debug!(path = %self.path, body = %body, "Sending what-if prediction request");

        let text = self.http.post(&self.path, body).await?;
        parse_probability(&text)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probability_ok() {
        let result = parse_probability(r#"{"probability": 0.42, "prediction": 0}"#).unwrap();
        assert_eq!(result.probability, 0.42);
    }

    #[test]
    fn test_parse_probability_integer_value() {
        let result = parse_probability(r#"{"probability": 1}"#).unwrap();
        assert_eq!(result.probability, 1.0);
    }

    #[test]
    fn test_parse_probability_missing() {
        let err = parse_probability(r#"{"prediction": 1}"#).unwrap_err();
        assert!(matches!(err, PredictionError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_probability_string_rejected() {
        let err = parse_probability(r#"{"probability": "0.4"}"#).unwrap_err();
        assert!(matches!(err, PredictionError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_probability_service_error_surfaced() {
        let err = parse_probability(r#"{"error": "could not convert"}"#).unwrap_err();
        assert!(err.to_string().contains("could not convert"));
    }

    #[test]
    fn test_parse_probability_not_json() {
        let err = parse_probability("<html>oops</html>").unwrap_err();
        assert!(matches!(err, PredictionError::MalformedResponse(_)));
    }

    #[test]
    fn test_path_normalised() {
        let client =
            HttpPredictionClient::new("http://127.0.0.1:5000/", "whatif_predict", None).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:5000/whatif_predict");
    }
}
