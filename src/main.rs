use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use log::{error, info};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

mod client;
mod config;
mod error;
mod form;
mod heuristic;
mod models;
mod outcome;
mod payload;
mod store;
mod variants;

#[cfg(test)]
mod testing;

use client::PredictionClient;
use config::AppConfig;
use error::AppError;
use models::{ApiResponse, CreateFormInput, FieldInput, Notification};
use outcome::PredictionSource;
use store::FormStore;
use variants::Catalog;

/// Flight delay prediction form service.
/// Holds form sessions in memory and forwards submissions to the external model.
#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    forms: FormStore,
    client: PredictionClient,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let client = match PredictionClient::new(config.request_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        catalog: Arc::new(Catalog::new(&config.render_url, &config.local_url)),
        forms: FormStore::with_idle_ttl(config.form_idle_ttl),
        client,
    };

    let app = app(state);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("could not bind {}: {}", config.bind, e);
            std::process::exit(1);
        }
    };
    info!("flight delay form listening on http://{}", config.bind);
    info!("render-cloud model: {}", config.render_url);
    info!("local model: {}", config.local_url);

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {}", e);
        std::process::exit(1);
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/variants", get(list_variants))
        .route("/variants/:name", get(get_variant))
        .route("/forms", post(create_form))
        .route("/forms/:id", get(get_form).delete(delete_form))
        .route("/forms/:id/fields/:field", put(set_field))
        .route("/forms/:id/submit", post(submit_form))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Flight Delay Form v0.1.0"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn list_variants(State(state): State<AppState>) -> Json<serde_json::Value> {
    let variants = state.catalog.summaries();
    Json(serde_json::json!({
        "count": variants.len(),
        "variants": variants,
    }))
}

/// Fields and option tables of one variant
async fn get_variant(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse>, AppError> {
    let variant = state
        .catalog
        .find(&name)
        .ok_or(AppError::UnknownVariant(name))?;
    Ok(Json(ApiResponse::success(variant.title, &*variant)))
}

/// Open a form session with every field empty
async fn create_form(
    State(state): State<AppState>,
    Json(input): Json<CreateFormInput>,
) -> Result<Json<ApiResponse>, AppError> {
    let variant = state
        .catalog
        .find(&input.variant)
        .ok_or(AppError::UnknownVariant(input.variant))?;

    let view = state.forms.create(variant);
    info!(
        "opened {} form {} ({} live)",
        view.variant,
        view.id,
        state.forms.len()
    );
    Ok(Json(ApiResponse::success("Form created", view)))
}

async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse>, AppError> {
    let view = state.forms.view(id).ok_or(AppError::FormNotFound(id))?;
    Ok(Json(ApiResponse::success("Form", view)))
}

async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse>, AppError> {
    if !state.forms.remove(id) {
        return Err(AppError::FormNotFound(id));
    }
    Ok(Json(ApiResponse::success(
        "Form discarded",
        serde_json::json!({ "id": id }),
    )))
}

/// Set one field. Clears any prediction on the form.
async fn set_field(
    State(state): State<AppState>,
    Path((id, field)): Path<(Uuid, String)>,
    Json(input): Json<FieldInput>,
) -> Result<Json<ApiResponse>, AppError> {
    let view = state
        .forms
        .with_form(id, |form| form.set_field(&field, &input.value).map(|_| form.view(id)))
        .ok_or(AppError::FormNotFound(id))??;

    Ok(Json(ApiResponse::success(format!("{} updated", field), view)))
}

/// Validate the form and ask the model for a prediction.
/// One submission per form at a time; a second one is refused, not queued.
async fn submit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse>, AppError> {
    let submission = state
        .forms
        .with_form(id, |form| form.begin_submit())
        .ok_or(AppError::FormNotFound(id))??;

    info!("submitting {} form {}", submission.variant.name, id);
    let revision = submission.revision;

    // The round trip runs in its own task so the form is released even if
    // this request is dropped mid-flight.
    let forms = state.forms.clone();
    let client = state.client.clone();
    let task = tokio::spawn(async move {
        let result = client
            .predict(&submission.variant, &submission.query)
            .await;
        let finished = forms.with_form(id, |form| {
            let kept = form.finish_submit(submission.revision, result.as_ref().ok().cloned());
            (kept, form.view(id))
        });
        (result, finished)
    });

    let (result, finished) = match task.await {
        Ok(done) => done,
        Err(e) => {
            state.forms.with_form(id, |form| form.finish_submit(revision, None));
            return Err(AppError::Internal(format!("prediction task failed: {e}")));
        }
    };

    let prediction = result?;
    let (kept, view) = finished.ok_or(AppError::FormNotFound(id))?;

    let notification = if !kept {
        Notification::info(
            "Inputs changed",
            "The form was edited while the prediction ran; submit again for a fresh result.",
        )
    } else if prediction.source == PredictionSource::Fallback {
        Notification::info(
            "✈️ Prediction Complete!",
            format!(
                "Flight status: {} (offline estimate, prediction service unavailable)",
                prediction.label
            ),
        )
    } else {
        Notification::info(
            "✈️ Prediction Complete!",
            format!("Flight status: {}", prediction.label),
        )
    };

    Ok(Json(
        ApiResponse::success(
            prediction.label,
            serde_json::json!({
                "form": view,
                "prediction": prediction,
                "applied": kept,
            }),
        )
        .with_notification(notification),
    ))
}
