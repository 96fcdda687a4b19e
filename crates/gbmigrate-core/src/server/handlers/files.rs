//! Listing and download of the storage directory

use crate::format::{format_file_size, format_timestamp};
use crate::server::ServerState;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub size_display: String,
    pub created: Option<String>,
    pub modified: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub name: Option<String>,
}

impl UploadResponse {
    fn rejected(message: impl Into<String>) -> Response {
        let body = UploadResponse {
            success: false,
            message: message.into(),
            name: None,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// GET /files
pub async fn list_files(State(state): State<Arc<ServerState>>) -> Response {
    match read_entries(&state.storage_dir).await {
        Ok(mut entries) => {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Json(entries).into_response()
        }
        Err(err) => {
            error!(
                "Failed to list {}: {}",
                state.storage_dir.display(),
                err
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list files").into_response()
        }
    }
}

async fn read_entries(dir: &std::path::Path) -> io::Result<Vec<FileEntry>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }

        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            size_display: format_file_size(metadata.len(), 2),
            created: metadata.created().ok().map(format_timestamp),
            modified: metadata.modified().ok().map(format_timestamp),
        });
    }

    Ok(entries)
}

/// A bare file name: no separators and no `..` anywhere.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
}

/// Quoted-string form of `name` for `Content-Disposition`.
fn quote_header_value(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars().filter(|c| !c.is_control()) {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Reduce an uploaded name to its last component made of ASCII letters,
/// digits, `.`, `_` and `-`; whitespace becomes `_`. `None` if nothing
/// usable is left.
pub fn secure_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = last
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() || !is_plain_file_name(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// POST /upload
///
/// Stores the multipart field `file` in the storage directory under its
/// sanitised name, replacing any file of the same name.
///
/// - 200 with the stored name
/// - 400 if the field is missing or its name sanitises to nothing
pub async fn upload_file(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return UploadResponse::rejected("no file part"),
            Err(err) => {
                warn!("Malformed upload: {}", err);
                return UploadResponse::rejected("malformed upload");
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let Some(name) = secure_file_name(&original) else {
            return UploadResponse::rejected("no selected file");
        };

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(err) => {
                warn!("Failed to read upload {}: {}", original, err);
                return UploadResponse::rejected("malformed upload");
            }
        };

        let path = state.storage_dir.join(&name);
        if let Err(err) = tokio::fs::write(&path, &data).await {
            error!("Failed to store {}: {}", path.display(), err);
            let body = UploadResponse {
                success: false,
                message: "failed to store file".to_string(),
                name: None,
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }

        info!("Stored upload {} ({} bytes)", path.display(), data.len());
        return Json(UploadResponse {
            success: true,
            message: format!("file uploaded: {}", name),
            name: Some(name),
        })
        .into_response();
    }
}

/// GET /download/:filename
///
/// - 200 with the file as an attachment
/// - 400 if the name would leave the storage directory
/// - 404 if there is no such file
pub async fn download_file(
    State(state): State<Arc<ServerState>>,
    Path(filename): Path<String>,
) -> Response {
    if !is_plain_file_name(&filename) {
        return (StatusCode::BAD_REQUEST, "Invalid file name").into_response();
    }

    let path = state.storage_dir.join(&filename);
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {}
        _ => return (StatusCode::NOT_FOUND, "File not found.").into_response(),
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", quote_header_value(&filename)),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => {
            error!("Failed to read {}: {}", path.display(), err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file").into_response()
        }
    }
}
