use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::FlightQuery;
use crate::outcome::{Prediction, ResultView};

/// Request to open a form session
#[derive(Debug, Deserialize)]
pub struct CreateFormInput {
    pub variant: String,
}

/// Request to set one field
#[derive(Debug, Deserialize)]
pub struct FieldInput {
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Info,
    Destructive,
}

/// User-facing notice attached to a response
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

/// API Response
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub notification: Option<Notification>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: serde_json::to_value(data).ok(),
            notification: None,
        }
    }

    pub fn error(message: impl Into<String>, notification: Notification) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
            notification: Some(notification),
        }
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }
}

/// Snapshot of a form session
#[derive(Debug, Serialize)]
pub struct FormView {
    pub id: Uuid,
    pub variant: &'static str,
    pub query: FlightQuery,
    pub missing_fields: Vec<&'static str>,
    pub ready: bool,
    pub pending: bool,
    pub prediction: Option<Prediction>,
    pub result: Option<ResultView>,
    pub created_at: String,
}
