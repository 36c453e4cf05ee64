//! HTTP surface for the admin-promotion function. One route, CORS open to
//! any origin, bearer-token authentication against profile API tokens.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::admin;
use crate::db::Database;
use crate::error::Result;
use crate::models::Actor;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
}

#[derive(Deserialize)]
struct PromoteRequest {
    email: Option<String>,
}

#[derive(Serialize)]
struct PromoteResponse {
    success: bool,
    message: String,
    user_id: i64,
}

pub fn router(db: Database) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ]);

    Router::new()
        .route("/functions/add-admin", post(add_admin_handler))
        .layer(cors)
        .with_state(AppState {
            db: Arc::new(Mutex::new(db)),
        })
}

pub async fn serve(db: Database, port: u16) -> Result<()> {
    let app = router(db);

    let address = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&address).await?;
    info!("Admin API listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Admin API shut down");
    Ok(())
}

async fn add_admin_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<PromoteRequest>>,
) -> Response {
    let db = match state.db.lock() {
        Ok(db) => db,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    };

    let actor = match authenticate(&db, &headers) {
        Ok(Some(actor)) => actor,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response()
        }
        Err(err) => return err.into_response(),
    };

    let email = payload
        .and_then(|Json(body)| body.email)
        .unwrap_or_default();

    match admin::promote(&db, &actor, &email) {
        Ok((user_id, message)) => (
            StatusCode::OK,
            Json(
                serde_json::to_value(PromoteResponse {
                    success: true,
                    message,
                    user_id,
                })
                .unwrap_or_else(|_| json!({ "success": true })),
            ),
        )
            .into_response(),
        Err(err) => {
            warn!("add-admin rejected: {}", err);
            err.into_response()
        }
    }
}

/// Resolve the caller from the Authorization header. `None` means the
/// request carried no usable credential.
fn authenticate(db: &Database, headers: &HeaderMap) -> Result<Option<Actor>> {
    let token = match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) => bearer_token(value),
        None => return Ok(None),
    };

    match token {
        Some(token) => db.resolve_actor_by_token(token),
        None => Ok(None),
    }
}

fn bearer_token(header_value: &str) -> Option<&str> {
    let trimmed = header_value.trim();
    let token = match trimmed.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        // A bare token is accepted too; some clients skip the scheme.
        None => trimmed,
    };
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use axum::http::HeaderValue;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("abc123"), Some("abc123"));
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_authenticate_known_token() {
        let (db, _dir) = setup_test_db();
        let id = db
            .create_profile("a@campus.edu", None, "secret-token")
            .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer secret-token"),
        );

        let actor = authenticate(&db, &headers).unwrap().unwrap();
        assert_eq!(actor.id, id);
    }

    #[test]
    fn test_authenticate_missing_or_unknown() {
        let (db, _dir) = setup_test_db();

        let headers = HeaderMap::new();
        assert!(authenticate(&db, &headers).unwrap().is_none());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(authenticate(&db, &headers).unwrap().is_none());
    }

    #[test]
    fn test_authenticate_suspended_account() {
        let (db, _dir) = setup_test_db();
        let id = db
            .create_profile("a@campus.edu", None, "secret-token")
            .unwrap();
        db.set_profile_active(id, false).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer secret-token"),
        );

        let result = authenticate(&db, &headers);
        assert!(matches!(result, Err(TrackerError::SuspendedAccount)));
    }
}
