//! Record listing and detail endpoints
//!
//! `POST /api/games_basic` builds (or reuses) the cache for a folder and returns
//! every record. `GET /api/game_details/:id` reads one record from the current
//! cache generation without re-parsing.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use gdx_common::{DurationTier, Error, Record};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Request body for `POST /api/games_basic`
#[derive(Debug, Deserialize)]
pub struct GamesBasicRequest {
    pub folder_path: Option<String>,
}

/// Response body for `POST /api/games_basic`
#[derive(Debug, Serialize)]
pub struct GamesBasicResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub games: Vec<RecordView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A record as served to clients, with display fields lifted to the top level
#[derive(Debug, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    pub title_display: String,
    pub developer: Option<String>,
    pub release_date: Option<String>,
    pub duration_tier: DurationTier,
    pub duration_hours: Option<f64>,
}

impl From<Record> for RecordView {
    fn from(record: Record) -> Self {
        Self {
            title_display: record.display_title(),
            developer: record.info.developer.clone(),
            release_date: record.info.release_date.clone(),
            duration_tier: record.info.duration_tier,
            duration_hours: record.info.duration_hours,
            record,
        }
    }
}

/// Reject empty, relative, and parent-traversing folder paths
fn validate_folder(folder: Option<String>) -> gdx_common::Result<String> {
    match folder {
        Some(folder)
            if !folder.is_empty()
                && !folder.contains("..")
                && std::path::Path::new(&folder).is_absolute() =>
        {
            Ok(folder)
        }
        Some(_) => Err(Error::InvalidInput(
            "Invalid or relative folder path provided.".to_string(),
        )),
        None => Err(Error::InvalidInput(
            "Request body must be JSON and include 'folder_path'".to_string(),
        )),
    }
}

/// POST /api/games_basic
pub async fn games_basic(
    State(state): State<AppState>,
    body: Result<Json<GamesBasicRequest>, JsonRejection>,
) -> ApiResult<Json<GamesBasicResponse>> {
    let folder = validate_folder(body.ok().and_then(|Json(req)| req.folder_path))?;
    info!("Request for game info from: {}", folder);

    let cache = Arc::clone(&state.cache);
    let snapshot = tokio::task::spawn_blocking(move || cache.rebuild(&folder))
        .await
        .map_err(|e| ApiError::Internal(format!("Cache rebuild task failed: {}", e)))?
        .map_err(|e| {
            error!("Folder listing failed: {}", e);
            Error::from(e)
        })?;

    if snapshot.is_empty() {
        return Ok(Json(GamesBasicResponse {
            message: Some("No .md files found in the specified directory.".to_string()),
            games: Vec::new(),
            warnings: Vec::new(),
        }));
    }

    let games: Vec<RecordView> = snapshot
        .records
        .values()
        .cloned()
        .map(RecordView::from)
        .collect();
    info!("Returning full data for {} games", games.len());

    Ok(Json(GamesBasicResponse {
        message: None,
        games,
        warnings: snapshot.warnings.clone(),
    }))
}

/// GET /api/game_details/:id
pub async fn game_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordView>> {
    info!("Request for details of game_id: {}", id);
    match state.cache.get(&id) {
        Some(record) => Ok(Json(RecordView::from(record))),
        None => {
            warn!("Game ID {} not in cache", id);
            Err(ApiError::NotFound(format!("Game with ID '{}' not found.", id)))
        }
    }
}

/// Build record routes
pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/api/games_basic", post(games_basic))
        .route("/api/game_details/:id", get(game_details))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_folder() {
        assert!(validate_folder(Some("/srv/games".into())).is_ok());
        assert!(matches!(validate_folder(None), Err(Error::InvalidInput(_))));
        assert!(matches!(validate_folder(Some(String::new())), Err(Error::InvalidInput(_))));
        assert!(matches!(validate_folder(Some("games".into())), Err(Error::InvalidInput(_))));
        assert!(matches!(
            validate_folder(Some("/srv/../etc".into())),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_record_view_lifts_info_fields() {
        let mut record = Record::new("sp".into(), "sp.md".into(), "Summer Pockets".into());
        record.info.developer = Some("Key".into());
        record.info.set_duration("40h".into());
        record.names.chinese = Some("夏日口袋".into());

        let json = serde_json::to_value(RecordView::from(record)).unwrap();
        assert_eq!(json["id"], "sp");
        assert_eq!(json["title_display"], "夏日口袋");
        assert_eq!(json["developer"], "Key");
        assert_eq!(json["duration_hours"], 40.0);
        assert_eq!(json["duration_tier"], "长篇");
        assert_eq!(json["info"]["developer"], "Key");
    }
}
