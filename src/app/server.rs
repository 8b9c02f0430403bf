// LogPeek - app/server.rs
//
// HTTP surface: the entry point (`/`) with its query selectors and the
// polling endpoint (`/get_last_logs`).
//
// Handlers run the synchronous view pipeline on the blocking pool; the only
// shared state is the immutable `Viewer`.

use crate::app::api::{self, ApiResponse, PageResponse, PollResponse, STATUS_INTERNAL};
use crate::app::viewer::Viewer;
use crate::util::error::{LogPeekError, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Query selectors accepted by the entry point, checked in field order.
#[derive(Debug, Default, Deserialize)]
pub struct EntryQuery {
    pub del: Option<String>,
    pub dl: Option<String>,
    pub api: Option<String>,
    pub f: Option<String>,
    pub auto_refresh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PollQuery {
    pub f: Option<String>,
    pub t: Option<String>,
}

pub fn router(viewer: Arc<Viewer>) -> Router {
    Router::new()
        .route("/", get(entry))
        .route("/get_last_logs", get(last_logs))
        .with_state(viewer)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(viewer: Viewer, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| LogPeekError::Server {
            addr: addr.to_string(),
            source,
        })?;

    tracing::info!(
        addr = %addr,
        dir = %viewer.log_dir().display(),
        "HTTP server listening"
    );

    axum::serve(listener, router(Arc::new(viewer)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| LogPeekError::Server {
            addr: addr.to_string(),
            source,
        })?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::warn!(error = %e, "Cannot listen for shutdown signal"),
    }
}

/// Run `work` against the viewer on the blocking pool.
async fn blocking<T, F>(viewer: Arc<Viewer>, work: F) -> std::result::Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&Viewer) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&viewer))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Request worker failed");
            api_response(ApiResponse::failure(STATUS_INTERNAL, "Internal error"))
        })
}

fn api_response(response: ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(response.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response)).into_response()
}

fn attachment(name: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", name.replace('"', ""));
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

pub async fn entry(State(viewer): State<Arc<Viewer>>, Query(query): Query<EntryQuery>) -> Response {
    if let Some(reference) = query.del.clone() {
        let deleted = blocking(viewer.clone(), move |v| {
            if api::is_delete_all_reference(&reference) {
                v.catalog().delete_all().map(|_| ())
            } else {
                v.catalog().delete(&reference).map(|_| ())
            }
        })
        .await;
        match deleted {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Delete request failed"),
            Err(resp) => return resp,
        }
        return Redirect::to("/").into_response();
    }

    if let Some(reference) = query.dl.clone() {
        let download = blocking(viewer.clone(), move |v| {
            let file = v.catalog().resolve(&reference)?;
            let bytes = v.read_raw(&file)?;
            Ok::<_, crate::util::error::CatalogError>((file.display_name, bytes))
        })
        .await;
        match download {
            Ok(Ok((name, bytes))) => {
                tracing::info!(file = %name, bytes = bytes.len(), "Download served");
                return attachment(&name, bytes);
            }
            // Unknown files fall through to the page.
            Ok(Err(e)) => tracing::debug!(error = %e, "Download request ignored"),
            Err(resp) => return resp,
        }
    }

    if let Some(command) = query.api.clone() {
        let file = query.f.clone();
        return match blocking(viewer, move |v| api::dispatch(v, &command, file.as_deref())).await
        {
            Ok(response) => api_response(response),
            Err(resp) => resp,
        };
    }

    let auto_refresh = query.auto_refresh.as_deref() == Some("on");
    let file = query.f.clone();
    match blocking(viewer, move |v| v.page(file.as_deref())).await {
        Ok(Ok(state)) => Json(PageResponse::new(state, auto_refresh)).into_response(),
        Ok(Err(e)) => api_response(ApiResponse::from_catalog_error(&e)),
        Err(resp) => resp,
    }
}

pub async fn last_logs(State(viewer): State<Arc<Viewer>>, Query(query): Query<PollQuery>) -> Response {
    let since = query
        .t
        .as_deref()
        .and_then(|t| t.trim().parse::<i64>().ok())
        .unwrap_or(0);
    let file = query.f;

    match blocking(viewer, move |v| v.poll(file.as_deref(), since)).await {
        Ok(Ok(result)) => Json(PollResponse::from(result)).into_response(),
        Ok(Err(e)) => api_response(ApiResponse::from_catalog_error(&e)),
        Err(resp) => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::{encode_reference, CatalogConfig, FileCatalog};
    use crate::core::parser::ParseConfig;
    use crate::core::size_guard::SizeGuard;
    use std::path::Path;

    fn shared(dir: &Path) -> Arc<Viewer> {
        Arc::new(Viewer::new(
            FileCatalog::new(CatalogConfig {
                log_dir: dir.to_path_buf(),
                ..CatalogConfig::default()
            }),
            SizeGuard::default(),
            ParseConfig::default(),
        ))
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn seed(dir: &Path) {
        std::fs::write(
            dir.join("log-2024-01-01.php"),
            "<?php defined('BASEPATH') OR exit('No direct script access allowed'); ?>\n\
             INFO - 2024-01-01 08:00:00 --> started\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_page_state() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let query = EntryQuery {
            auto_refresh: Some("on".into()),
            ..EntryQuery::default()
        };
        let resp = entry(State(shared(dir.path())), Query(query)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["currentFile"], "log-2024-01-01.php");
        assert_eq!(json["autoRefresh"], true);
        assert_eq!(json["logs"][0]["message"], "started");
        assert_eq!(json["logs"][0]["displayClass"], "info");
    }

    #[tokio::test]
    async fn test_api_status_mirrors_error_code() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let query = EntryQuery {
            api: Some("view".into()),
            ..EntryQuery::default()
        };
        let resp = entry(State(shared(dir.path())), Query(query)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], 400);
    }

    #[tokio::test]
    async fn test_download() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let query = EntryQuery {
            dl: Some(encode_reference("log-2024-01-01.php")),
            ..EntryQuery::default()
        };
        let resp = entry(State(shared(dir.path())), Query(query)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"log-2024-01-01.php\""
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"<?php"));
    }

    #[tokio::test]
    async fn test_unknown_download_falls_through_to_page() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let query = EntryQuery {
            dl: Some(encode_reference("log-1999-01-01.php")),
            ..EntryQuery::default()
        };
        let resp = entry(State(shared(dir.path())), Query(query)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json.get("files").is_some());
    }

    #[tokio::test]
    async fn test_delete_redirects() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let query = EntryQuery {
            del: Some(encode_reference("all")),
            ..EntryQuery::default()
        };
        let resp = entry(State(shared(dir.path())), Query(query)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/");
        assert!(!dir.path().join("log-2024-01-01.php").exists());
    }

    #[tokio::test]
    async fn test_poll_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let viewer = shared(dir.path());

        let first = last_logs(
            State(viewer.clone()),
            Query(PollQuery {
                f: None,
                t: Some("not-a-number".into()),
            }),
        )
        .await;
        let json = body_json(first).await;
        assert_eq!(json["isModified"], true);
        assert_eq!(json["logs"].as_array().unwrap().len(), 1);

        let latest = json["lastModifiedTime"].as_i64().unwrap();
        let second = last_logs(
            State(viewer),
            Query(PollQuery {
                f: None,
                t: Some(latest.to_string()),
            }),
        )
        .await;
        let json = body_json(second).await;
        assert_eq!(json["isModified"], false);
        assert!(json["logs"].is_null());
        assert_eq!(json["lastModifiedTime"], latest);
    }
}
