use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

use crate::models::FormView;
use crate::outcome::Prediction;
use crate::variants::FormVariant;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FormError {
    #[error("form '{variant}' has no field named '{field}'")]
    UnknownField { variant: String, field: String },
    #[error("'{value}' is not an option for {field}{}", suggestion_hint(.suggestion))]
    InvalidChoice {
        field: String,
        value: String,
        suggestion: Option<String>,
    },
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("a prediction is already in progress for this form")]
    SubmissionPending,
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

/// The user's selections, one string per field of the variant.
/// An empty string means "not selected".
#[derive(Debug, Clone, PartialEq)]
pub struct FlightQuery {
    fields: Vec<(&'static str, String)>,
}

impl FlightQuery {
    pub fn empty(variant: &FormVariant) -> Self {
        Self {
            fields: variant
                .fields
                .iter()
                .map(|f| (f.name, String::new()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns false if the query has no such field.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(n, _)| *n)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.fields.iter().all(|(_, v)| !v.is_empty())
    }
}

impl Serialize for FlightQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Snapshot handed to the prediction client
#[derive(Debug, Clone)]
pub struct Submission {
    pub variant: Arc<FormVariant>,
    pub query: FlightQuery,
    pub revision: u64,
}

/// Form state holder: one user's selections and the current result
#[derive(Debug)]
pub struct FlightForm {
    variant: Arc<FormVariant>,
    query: FlightQuery,
    prediction: Option<Prediction>,
    pending: bool,
    // bumped on every edit
    revision: u64,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl FlightForm {
    pub fn new(variant: Arc<FormVariant>) -> Self {
        let now = Utc::now();
        Self {
            query: FlightQuery::empty(&variant),
            variant,
            prediction: None,
            pending: false,
            revision: 0,
            created_at: now,
            last_active: now,
        }
    }

    pub fn query(&self) -> &FlightQuery {
        &self.query
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Time of the last edit or submission
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Update one field. Any displayed prediction is cleared.
    /// An empty value clears the selection.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let spec = self
            .variant
            .field(field)
            .ok_or_else(|| FormError::UnknownField {
                variant: self.variant.name.to_string(),
                field: field.to_string(),
            })?;

        if !value.is_empty() && !spec.accepts(value) {
            return Err(FormError::InvalidChoice {
                field: field.to_string(),
                value: value.to_string(),
                suggestion: spec.suggest(value).map(str::to_string),
            });
        }

        self.query.set(field, value);
        self.revision += 1;
        self.last_active = Utc::now();
        if self.prediction.take().is_some() {
            log::debug!("cleared prediction after edit of {field}");
        }
        Ok(())
    }

    pub fn validate(&self) -> bool {
        self.query.is_complete()
    }

    /// Gate a submission: all fields set and nothing in flight.
    pub fn begin_submit(&mut self) -> Result<Submission, FormError> {
        if self.pending {
            return Err(FormError::SubmissionPending);
        }
        if !self.validate() {
            return Err(FormError::MissingFields(self.query.missing_fields()));
        }

        self.pending = true;
        self.last_active = Utc::now();
        Ok(Submission {
            variant: self.variant.clone(),
            query: self.query.clone(),
            revision: self.revision,
        })
    }

    /// Close the in-flight submission. The prediction is kept only if the
    /// inputs have not changed since the submission began; returns whether
    /// it was kept.
    pub fn finish_submit(&mut self, revision: u64, prediction: Option<Prediction>) -> bool {
        self.pending = false;
        self.last_active = Utc::now();
        match prediction {
            Some(prediction) if revision == self.revision => {
                self.prediction = Some(prediction);
                true
            }
            Some(_) => {
                log::info!("discarding prediction for edited form");
                false
            }
            None => false,
        }
    }

    pub fn view(&self, id: Uuid) -> FormView {
        FormView {
            id,
            variant: self.variant.name,
            query: self.query().clone(),
            missing_fields: self.query.missing_fields(),
            ready: self.validate(),
            pending: self.is_pending(),
            result: self.prediction().map(Prediction::view),
            prediction: self.prediction().cloned(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
