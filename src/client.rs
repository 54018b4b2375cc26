use std::time::Duration;

use log::{info, warn};
use serde_json::Value;

use crate::form::FlightQuery;
use crate::heuristic;
use crate::outcome::{Prediction, PredictionOutcome};
use crate::payload::{build_payload, PayloadError};
use crate::variants::{FallbackPolicy, FormVariant};

#[derive(thiserror::Error, Debug)]
pub enum PredictError {
    #[error(
        "Cannot connect to the API. The server might be starting up. Please wait 60 seconds and try again."
    )]
    Unreachable(#[source] reqwest::Error),
    #[error("Server error: {status} - {body}")]
    Server { status: u16, body: String },
    #[error("unexpected response from prediction service: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl PredictError {
    /// Failures of the remote round trip, as opposed to local rejections.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            PredictError::Unreachable(_)
                | PredictError::Server { .. }
                | PredictError::InvalidResponse(_)
        )
    }
}

/// Client for the external prediction model.
///
/// One POST per call; nothing is retried.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
}

impl PredictionClient {
    /// `timeout` of `None` waits until the transport itself gives up.
    pub fn new(timeout: Option<Duration>) -> Result<Self, PredictError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(PredictError::Client)?;
        Ok(Self { http })
    }

    /// Ask the variant's endpoint for a prediction.
    ///
    /// For variants with [`FallbackPolicy::Heuristic`] a failed round trip
    /// is replaced by the local heuristic. That result carries
    /// `source: fallback` and is demo output, not a model inference.
    pub async fn predict(
        &self,
        variant: &FormVariant,
        query: &FlightQuery,
    ) -> Result<Prediction, PredictError> {
        match self.request(variant, query).await {
            Ok(outcome) => {
                info!("{} prediction: {:?}", variant.name, outcome);
                Ok(Prediction::remote(outcome, &variant.labels))
            }
            Err(e) if e.is_remote() && variant.fallback == FallbackPolicy::Heuristic => {
                warn!(
                    "{} prediction failed ({}), using local heuristic",
                    variant.name, e
                );
                Ok(heuristic::predict(query, &variant.labels))
            }
            Err(e) => Err(e),
        }
    }

    async fn request(
        &self,
        variant: &FormVariant,
        query: &FlightQuery,
    ) -> Result<PredictionOutcome, PredictError> {
        let payload = build_payload(variant, query)?;

        let response = self
            .http
            .post(&variant.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(PredictError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PredictError::InvalidResponse(format!("body is not json: {e}")))?;

        let label = body
            .get(variant.discriminant)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PredictError::InvalidResponse(format!("missing '{}' field", variant.discriminant))
            })?;

        PredictionOutcome::from_label(&variant.labels, label)
            .ok_or_else(|| PredictError::InvalidResponse(format!("unknown label '{label}'")))
    }
}
