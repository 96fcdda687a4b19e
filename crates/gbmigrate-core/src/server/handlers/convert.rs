//! Single-file conversion endpoint

use crate::convert::ConversionOutcome;
use crate::engine::convert_path;
use crate::server::ServerState;
use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub file_path: String,
}

/// POST /convert
///
/// Form field `file_path`. Always 200 with `{success, message}`; every
/// rejection and failure is reported in the body. A body that is not a
/// urlencoded form carries no path.
pub async fn convert_file(
    State(state): State<Arc<ServerState>>,
    form: Result<Form<ConvertRequest>, FormRejection>,
) -> Json<ConversionOutcome> {
    let request = match form {
        Ok(Form(request)) => request,
        Err(rejection) => {
            debug!("Unreadable conversion request: {}", rejection);
            return Json(ConversionOutcome::failed(
                "no file path provided".to_string(),
            ));
        }
    };

    let result = tokio::task::spawn_blocking(move || {
        convert_path(&state.classifier, &state.converter, &request.file_path)
    })
    .await;

    match result {
        Ok(outcome) => Json(outcome),
        Err(err) => {
            error!("Conversion task failed: {}", err);
            Json(ConversionOutcome::failed(format!(
                "conversion task failed: {}",
                err
            )))
        }
    }
}
