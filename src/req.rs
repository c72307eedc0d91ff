use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;

use crate::{prelude::Result, Error, PredictionError};

/// Error body returned by the prediction service on a rejected request
#[derive(Deserialize, Debug)]
struct ErrorData {
    error: String,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    pub client: Client,
    pub base_url: String,
}

async fn parse_response(response: Response) -> std::result::Result<String, PredictionError> {
    let status_code = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| PredictionError::transport(e.to_string()))?;

    if status_code < 400 {
        return Ok(text);
    }
    let message = match serde_json::from_str::<ErrorData>(&text) {
        Ok(error_data) => error_data.error,
        Err(_) => text,
    };
    Err(PredictionError::http(status_code, message))
}

impl HttpClient {
    /// Build a client. `timeout` of `None` lets a request hang indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Send a single JSON POST. No retry: one attempt per call.
    pub async fn post(
        &self,
        url_path: &str,
        data: String,
    ) -> std::result::Result<String, PredictionError> {
        let full_url = format!("{}{url_path}", self.base_url);

        let request = self
            .client
            .post(&full_url)
            .header("Content-Type", "application/json")
            .body(data)
            .build()
            .map_err(|e| PredictionError::transport(e.to_string()))?;

        let result = self
            .client
            .execute(request)
            .await
            .map_err(|e| PredictionError::transport(e.to_string()))?;

        parse_response(result).await
    }
}
