//! Anar Trade Calculator - Backend Server
//!
//! Profit/loss calculations for pomegranate traders, with per-user history,
//! real trade records and saved average-price calculations.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod middleware;
mod routes;
mod services;

pub use crate::config::Config;

use crate::config::StorageBackend;
use error::{AppError, AppResult};
use services::{LocalHistoryStore, PostgresHistoryStore, SharedHistoryStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Absent when running on local storage only
    pub db: Option<sqlx::PgPool>,
    pub history: SharedHistoryStore,
    pub config: Arc<Config>,
}

impl AppState {
    /// Pool for features that only exist on PostgreSQL
    pub fn require_db(&self) -> AppResult<sqlx::PgPool> {
        self.db.clone().ok_or_else(|| {
            AppError::Configuration("this feature requires a PostgreSQL database".to_string())
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anar_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Anar Trade Calculator Server");
    tracing::info!("Environment: {}", config.environment);

    let db = match &config.database.url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;
            tracing::info!("Database connection established");

            // Run migrations in development
            if config.is_development() {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Migrations completed");
            }
            Some(pool)
        }
        None => None,
    };

    let history: SharedHistoryStore = match (config.storage.backend, &db) {
        (StorageBackend::Postgres, Some(pool)) => Arc::new(PostgresHistoryStore::new(pool.clone())),
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("storage.backend is postgres but no database is configured")
        }
        (StorageBackend::Local, _) => {
            tracing::info!("Keeping history in {}", config.storage.local_path.display());
            Arc::new(LocalHistoryStore::new(config.storage.local_path.clone()))
        }
    };
    tracing::info!("History storage: {}", history.backend());

    // Create application state
    let state = AppState {
        db,
        history,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Anar Trade Calculator API v1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use jsonwebtoken::{encode, EncodingKey, Header};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::{AdvisorConfig, AuthConfig, DatabaseConfig, ServerConfig, StorageConfig};
    use crate::middleware::auth::Claims;

    const SECRET: &str = "router-test-secret";

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        let path = dir.path().join("history.json");
        let config = Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 1,
                min_connections: 1,
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                local_path: path.clone(),
            },
            auth: AuthConfig {
                jwt_secret: SECRET.to_string(),
                audience: "authenticated".to_string(),
            },
            advisor: AdvisorConfig {
                safe_buy_factor: shared::default_safe_buy_factor(),
            },
        };

        AppState {
            db: None,
            history: Arc::new(LocalHistoryStore::new(path)),
            config: Arc::new(config),
        }
    }

    fn bearer(user_id: Uuid) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            email: None,
            aud: "authenticated".to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
        format!("Bearer {}", token)
    }

    fn json_request(method: &str, uri: &str, body: Value, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn num(value: &Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    fn scenario_one() -> Value {
        json!({
            "grades": [
                {"note": "4 dana", "boxes": 1, "rate": 1890},
                {"note": "10 dana", "boxes": 1, "rate": 1700}
            ],
            "settings": {"commission": 6, "transport": 75, "packing": 75, "labour": 0,
                         "miscellaneous": 0, "farmer_rate_kg": 131, "kg_per_box": 10},
            "context": {"farmer_name": "Ramesh", "buyer_name": "  "}
        })
    }

    #[tokio::test]
    async fn test_health_reports_storage() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(&dir));

        let response = app
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["storage"], "local");
        assert_eq!(body["database"], "not_configured");
    }

    #[tokio::test]
    async fn test_compute_is_public() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(&dir));

        let response = app
            .oneshot(json_request("POST", "/api/v1/calculator/compute", scenario_one(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(num(&body["profit"]), Decimal::new(4546, 1));
        assert_eq!(num(&body["commission_amt"]), Decimal::new(2154, 1));
        assert_eq!(body["farmer_name"], "Ramesh");
        assert!(body["buyer_name"].is_null());
    }

    #[tokio::test]
    async fn test_history_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(&dir));

        let response = app
            .oneshot(Request::builder().uri("/api/v1/calculations").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_compute_save_and_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(&dir));
        let auth = bearer(Uuid::new_v4());

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/calculations/compute", scenario_one(), Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let saved = body_json(response).await;
        let id = saved["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/calculations/{}", id))
                    .header(header::AUTHORIZATION, &auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, saved);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/calculations?search=rAmEsH")
                    .header(header::AUTHORIZATION, &auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let list = body_json(response).await;
        assert_eq!(list["calculations"].as_array().unwrap().len(), 1);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/calculations/{}", id))
                    .header(header::AUTHORIZATION, &auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await["deleted"], true);
    }

    #[tokio::test]
    async fn test_saving_a_taken_id_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(&dir));
        let owner = bearer(Uuid::new_v4());
        let intruder = bearer(Uuid::new_v4());

        let mut posted = serde_json::to_value(shared::compute_result(
            &shared::default_grades(),
            &shared::CostSettings::default(),
            &shared::CalculationContext::default(),
        ))
        .unwrap();
        posted["timestamp"] = json!("2024-06-30T12:00:00.123456789Z");
        let id = posted["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/calculations", posted.clone(), Some(&owner)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/calculations", posted, Some(&intruder)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["code"], "CONFLICT");

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/calculations/{}", id))
                    .header(header::AUTHORIZATION, &owner)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stored: shared::CalculationResult = serde_json::from_value(body_json(response).await).unwrap();
        let expected: chrono::DateTime<chrono::Utc> = "2024-06-30T12:00:00.123456Z".parse().unwrap();
        assert_eq!(stored.timestamp, expected);
    }

    #[tokio::test]
    async fn test_export_sets_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(&dir));
        let result = shared::compute_result(
            &shared::default_grades(),
            &shared::CostSettings::default(),
            &shared::CalculationContext::default(),
        );

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/calculator/export",
                serde_json::to_value(&result).unwrap(),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains("anar-calculation-"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Grade,Boxes,Rate_per_box,Gross,Profit_per_box"));
        assert_eq!(text.lines().count(), 6);
    }

    #[tokio::test]
    async fn test_trades_need_database() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(&dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/trades")
                    .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_average_rejects_empty_entries() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_app(test_state(&dir));

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/averages/compute",
                json!({"entries": [{"price": 0, "weight": 5}]}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["field"], "entries");
    }
}
