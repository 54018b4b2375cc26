use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::client::PredictError;
use crate::form::FormError;
use crate::models::{ApiResponse, Notification};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("unknown form variant '{0}'")]
    UnknownVariant(String),
    #[error("form {0} not found")]
    FormNotFound(Uuid),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownVariant(_) | AppError::FormNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Form(FormError::SubmissionPending) => StatusCode::CONFLICT,
            AppError::Form(_) => StatusCode::BAD_REQUEST,
            AppError::Predict(e) => match e {
                PredictError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
                PredictError::Server { .. } | PredictError::InvalidResponse(_) => {
                    StatusCode::BAD_GATEWAY
                }
                PredictError::Payload(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PredictError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn notification(&self) -> Notification {
        match self {
            AppError::Form(FormError::MissingFields(_)) => Notification::destructive(
                "Missing Information",
                "Please fill in all fields to get a prediction.",
            ),
            AppError::Form(FormError::SubmissionPending) => Notification::info(
                "Analyzing Flight Data...",
                "A prediction is already in progress.",
            ),
            AppError::Predict(e) => {
                Notification::destructive("❌ Prediction Failed", e.to_string())
            }
            other => Notification::destructive("Invalid Request", other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("rejected request: {}", self);
        }
        let body = ApiResponse::error(self.to_string(), self.notification());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Form(FormError::MissingFields(vec!["tailNumber"])).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Form(FormError::SubmissionPending).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Predict(PredictError::Server {
                status: 500,
                body: String::new()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::UnknownVariant("x".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_missing_fields_notification() {
        let n = AppError::Form(FormError::MissingFields(vec!["day"])).notification();
        assert_eq!(n.title, "Missing Information");
        assert_eq!(n.variant, crate::models::NotificationVariant::Destructive);
    }
}
