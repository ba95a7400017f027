//! HTTP surface: the harvest trigger and the maintenance endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use harvest_logging::{harvest_error, harvest_warn};
use serde_json::json;
use tokio::sync::Mutex;

use harvest_engine::{
    find_empty_invoices, prune_empty_artifacts, save_empty_invoice_index, DeviceClient,
    DeviceSettings, DirectoryArtifactWriter, HarvestController, HarvestError, JsonFileLedger,
    PinAuthenticator,
};

use crate::config::AppConfig;

/// Shared handler state. The mutex serializes harvest and maintenance
/// triggers: the ledger and the output directories assume a single writer.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    run_guard: Arc<Mutex<()>>,
}

pub fn router(config: AppConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        run_guard: Arc::new(Mutex::new(())),
    };
    Router::new()
        .route("/health", get(health))
        .route("/harvest", post(run_harvest))
        .route("/maintenance/empty-invoices", get(empty_invoices))
        .route("/maintenance/prune-empty", post(prune_empty))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn run_harvest(State(state): State<AppState>) -> Response {
    let _guard = state.run_guard.lock().await;
    let storage = &state.config.storage;

    let settings = DeviceSettings::new(state.config.device.base_url());
    let mut controller = HarvestController::new(
        PinAuthenticator::new(settings.clone()),
        DeviceClient::new(settings),
        JsonFileLedger::open(storage.ledger_path()),
        DirectoryArtifactWriter::new(storage.invoices_dir(), storage.credit_notes_dir()),
        state.config.device.pin.clone(),
    );

    match controller.run_from_document(&storage.candidates_path()).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "message": "Invoices and credit notes processed",
                "report": report,
            })),
        )
            .into_response(),
        Err(err) => {
            harvest_error!("Harvest run failed: {}", err);
            let status = match &err {
                HarvestError::PinRejected { .. } | HarvestError::Candidates(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_body(status, &err.to_string())
        }
    }
}

async fn empty_invoices(State(state): State<AppState>) -> Response {
    let _guard = state.run_guard.lock().await;
    let storage = &state.config.storage;

    match find_empty_invoices(&storage.invoices_dir()) {
        Ok(empty) => {
            if let Err(err) = save_empty_invoice_index(&storage.data_dir, &empty) {
                harvest_warn!("Could not write empty-invoice index: {}", err);
            }
            Json(json!({ "emptyInvoices": empty })).into_response()
        }
        Err(err) => {
            harvest_error!("Empty-invoice scan failed: {}", err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

async fn prune_empty(State(state): State<AppState>) -> Response {
    let _guard = state.run_guard.lock().await;
    let storage = &state.config.storage;

    match prune_empty_artifacts(
        &storage.invoices_dir(),
        &storage.credit_notes_dir(),
        &storage.ledger_path(),
    ) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => {
            harvest_error!("Prune failed: {}", err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
