use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use almersal_shared::qr::png_from_data_url;
use almersal_shared::receipt::Receipt;
use almersal_shared::validation::RemittanceForm;
use almersal_shared::{Action, DashboardSummary, Remittance, Settings};
use almersal_store::{Database, StoreError, User};

use crate::auth::{authenticate, resolve_locale, AuthUser};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub rate_limiter: RateLimiter,
    pub signin_limiter: RateLimiter<String>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signout", post(sign_out))
        .route("/remittances", get(list_remittances).post(create_remittance))
        .route("/remittances/:internal_id", get(get_remittance))
        .route("/remittances/:internal_id/receipt", get(get_receipt))
        .route("/remittances/:internal_id/qr.png", get(get_qr_png))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/dashboard", get(dashboard))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── Authentication ───

#[derive(Deserialize)]
struct SignInRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    token: String,
    expires_at: chrono::DateTime<Utc>,
    user: User,
}

async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ServerError> {
    let key = req.email.trim().to_lowercase();
    if !state.signin_limiter.check(key.clone()).await {
        tracing::warn!(email = %key, "Too many sign-in attempts");
        return Err(ServerError::RateLimited);
    }

    let session =
        authenticate(&state.db, &req.email, &req.password, state.config.session_ttl()).await?;

    let Some(session) = session else {
        info!(email = %key, "Sign-in rejected");
        return Err(ServerError::Unauthorized);
    };

    info!(user = %session.user.email, "Signed in");
    Ok(Json(SignInResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: session.user,
    }))
}

async fn sign_out(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, ServerError> {
    state.db.lock().await.revoke_session(&auth.token)?;
    info!(user = %auth.user.email, "Signed out");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Remittances ───

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedResponse {
    internal_id: i64,
    receipt: String,
    remittance: Remittance,
}

async fn create_remittance(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(form): Json<RemittanceForm>,
) -> Result<(StatusCode, Json<CreatedResponse>), ServerError> {
    auth.require(Action::CreateRemittance)?;
    let new = form.validate(state.config.allow_non_positive_amounts)?;

    let remittance = state
        .db
        .lock()
        .await
        .create_remittance(&new, auth.user.id)?;

    info!(
        internal_id = remittance.internal_id,
        user = %auth.user.email,
        "Remittance submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            internal_id: remittance.internal_id,
            receipt: format!("/remittances/{}/receipt", remittance.internal_id),
            remittance,
        }),
    ))
}

#[derive(Deserialize)]
struct ListQuery {
    q: Option<String>,
}

async fn list_remittances(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Remittance>>, ServerError> {
    auth.require(Action::ViewRemittances)?;
    let list = state.db.lock().await.list_remittances(query.q.as_deref())?;
    Ok(Json(list))
}

fn lookup_remittance(db: &Database, internal_id: i64) -> Result<Remittance, ServerError> {
    db.get_remittance(internal_id).map_err(|e| match e {
        StoreError::NotFound => ServerError::RemittanceNotFound(internal_id),
        other => other.into(),
    })
}

async fn get_remittance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(internal_id): Path<i64>,
) -> Result<Json<Remittance>, ServerError> {
    auth.require(Action::ViewRemittances)?;
    let db = state.db.lock().await;
    Ok(Json(lookup_remittance(&db, internal_id)?))
}

#[derive(Deserialize)]
struct ReceiptQuery {
    lang: Option<String>,
    format: Option<String>,
}

async fn get_receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(internal_id): Path<i64>,
    Query(query): Query<ReceiptQuery>,
) -> Result<Response, ServerError> {
    auth.require(Action::ViewRemittances)?;
    let locale = resolve_locale(query.lang.as_deref(), &headers);

    let (remittance, settings) = {
        let db = state.db.lock().await;
        (lookup_remittance(&db, internal_id)?, db.settings_or_default()?)
    };
    let receipt = Receipt::build(&remittance, &settings, locale);

    match query.format.as_deref().unwrap_or("text") {
        "text" => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            receipt.render_text(),
        )
            .into_response()),
        "json" => Ok(Json(receipt).into_response()),
        other => Err(ServerError::BadRequest(format!(
            "Unsupported receipt format: {other}"
        ))),
    }
}

async fn get_qr_png(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(internal_id): Path<i64>,
) -> Result<Response, ServerError> {
    auth.require(Action::ViewRemittances)?;
    let remittance = {
        let db = state.db.lock().await;
        lookup_remittance(&db, internal_id)?
    };

    let png = png_from_data_url(&remittance.qr)
        .ok_or_else(|| ServerError::Internal(format!("Corrupt QR for {internal_id}")))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

// ─── Settings & dashboard ───

async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Settings>, ServerError> {
    auth.require(Action::ViewSettings)?;
    Ok(Json(state.db.lock().await.settings_or_default()?))
}

async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ServerError> {
    auth.require(Action::ManageSettings)?;

    let db = state.db.lock().await;
    db.upsert_settings(&settings)?;
    info!(user = %auth.user.email, "Settings updated");

    Ok(Json(db.settings_or_default()?))
}

async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardSummary>, ServerError> {
    auth.require(Action::ViewDashboard)?;
    Ok(Json(state.db.lock().await.dashboard_summary(Utc::now())?))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use almersal_shared::constants::INTERNAL_ID_SEED;
    use almersal_shared::Role;
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        db.create_user("admin@almersal.local", Some("Admin"), "Admin@12345", Role::Admin)
            .unwrap();
        db.create_user("sawda@almersal.local", Some("Sawda"), "Sawda@12345", Role::Employee)
            .unwrap();
        db.seed_settings(&Settings::default()).unwrap();

        AppState {
            db: Arc::new(Mutex::new(db)),
            rate_limiter: RateLimiter::new(1000.0, 1000.0),
            signin_limiter: RateLimiter::new(1000.0, 1000.0),
            config: Arc::new(ServerConfig::default()),
        }
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn sign_in_as(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/auth/signin",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["token"].as_str().unwrap().to_string()
    }

    fn json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let (status, body) = call(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "ok");
    }

    #[tokio::test]
    async fn test_bad_credentials_rejected() {
        let app = build_router(test_state());
        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/signin",
            None,
            Some(serde_json::json!({ "email": "admin@almersal.local", "password": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json(&body)["error"], "Authentication failed");
    }

    #[tokio::test]
    async fn test_throttled_sign_in_is_429_not_401() {
        let mut state = test_state();
        state.signin_limiter = RateLimiter::new(0.001, 1.0);
        let app = build_router(state);

        sign_in_as(&app, "admin@almersal.local", "Admin@12345").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/signin",
            None,
            Some(serde_json::json!({ "email": "admin@almersal.local", "password": "Admin@12345" })),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json(&body)["error"], "Too many requests, try again later");
    }

    #[tokio::test]
    async fn test_per_ip_limit_returns_json_429() {
        let mut state = test_state();
        state.rate_limiter = RateLimiter::new(0.001, 2.0);
        let app = build_router(state);

        let health = |ip: &'static str| {
            Request::builder()
                .uri("/health")
                .header("x-forwarded-for", ip)
                .body(Body::empty())
                .unwrap()
        };

        for _ in 0..2 {
            let resp = app.clone().oneshot(health("198.51.100.4")).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let resp = app.clone().oneshot(health("198.51.100.4")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(json(&body)["error"], "Too many requests, try again later");

        let resp = app.clone().oneshot(health("198.51.100.5")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_requests_without_session_rejected() {
        let app = build_router(test_state());
        let (status, _) = call(&app, Method::GET, "/remittances", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::GET, "/dashboard", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_submit_and_fetch_remittances() {
        let app = build_router(test_state());
        let token = sign_in_as(&app, "sawda@almersal.local", "Sawda@12345").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/remittances",
            Some(&token),
            Some(serde_json::json!({
                "provider": "WU", "channel": "CASH", "amount": 50,
                "destCountry": "Mali", "destCurrency": "XOF", "tracking": "MTCN-1"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created = json(&body);
        assert_eq!(created["internalId"], INTERNAL_ID_SEED);
        assert_eq!(
            created["receipt"],
            format!("/remittances/{INTERNAL_ID_SEED}/receipt")
        );

        let (status, body) = call(
            &app,
            Method::POST,
            "/remittances",
            Some(&token),
            Some(serde_json::json!({
                "provider": "RIA", "channel": "MOBILE", "amount": "2000",
                "destCountry": "France", "destCurrency": "EUR", "tracking": "R-2"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let second: Remittance = serde_json::from_value(json(&body)["remittance"].clone()).unwrap();
        assert_eq!(second.internal_id, INTERNAL_ID_SEED + 1);
        assert_eq!(second.fee, dec!(80));
        assert_eq!(second.total, dec!(2080));

        let uri = format!("/remittances/{INTERNAL_ID_SEED}");
        let (status, body) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let first: Remittance = serde_json::from_slice(&body).unwrap();
        assert_eq!(first.fee, dec!(5.5));
        assert_eq!(first.total, dec!(55.5));

        let (status, body) = call(&app, Method::GET, "/remittances?q=R-2", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let found: Vec<Remittance> = serde_json::from_slice(&body).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].internal_id, INTERNAL_ID_SEED + 1);
    }

    #[tokio::test]
    async fn test_invalid_submission_rejected() {
        let app = build_router(test_state());
        let token = sign_in_as(&app, "sawda@almersal.local", "Sawda@12345").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/remittances",
            Some(&token),
            Some(serde_json::json!({
                "provider": "WU", "channel": "CASH", "amount": 0, "tracking": "T"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "Amount must be greater than zero");

        let (status, body) = call(
            &app,
            Method::POST,
            "/remittances",
            Some(&token),
            Some(serde_json::json!({
                "provider": "WU", "channel": "CASH",
                "amount": "77000000000000000000000000000", "tracking": "T"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "Amount is too large to price");

        let (status, _) = call(
            &app,
            Method::POST,
            "/remittances",
            Some(&token),
            Some(serde_json::json!({
                "provider": "XX", "channel": "CASH", "amount": 10, "tracking": "T"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_receipt_rendering_and_not_found() {
        let app = build_router(test_state());
        let token = sign_in_as(&app, "sawda@almersal.local", "Sawda@12345").await;

        let (status, _) = call(
            &app,
            Method::GET,
            "/remittances/1/receipt",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        call(
            &app,
            Method::POST,
            "/remittances",
            Some(&token),
            Some(serde_json::json!({
                "provider": "MG", "channel": "CASH", "amount": 100, "tracking": "MG-77"
            })),
        )
        .await;

        let uri = format!("/remittances/{INTERNAL_ID_SEED}/receipt?lang=ar");
        let (status, body) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("نسخة الزبون"));
        assert!(text.contains("موني غرام"));

        let uri = format!("/remittances/{INTERNAL_ID_SEED}/receipt?format=json");
        let (status, body) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let receipt = json(&body);
        assert_eq!(receipt["copies"].as_array().unwrap().len(), 2);
        assert!(receipt["copies"][1]["policies"].is_null());

        let uri = format!("/remittances/{INTERNAL_ID_SEED}/qr.png");
        let (status, body) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..4], b"\x89PNG");
    }

    #[tokio::test]
    async fn test_only_admin_updates_settings() {
        let app = build_router(test_state());
        let employee = sign_in_as(&app, "sawda@almersal.local", "Sawda@12345").await;
        let admin = sign_in_as(&app, "admin@almersal.local", "Admin@12345").await;

        let update = serde_json::json!({
            "officeName": "Al Mersal Ksar",
            "address": "Ksar",
            "phone": "+222 11 22 33 44",
            "logoUrl": null,
            "policies": "Fees are not refundable.",
            "monthlyExpense": "1000"
        });

        let (status, _) = call(&app, Method::PUT, "/settings", Some(&employee), Some(update.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app, Method::PUT, "/settings", Some(&admin), Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        let saved: Settings = serde_json::from_slice(&body).unwrap();
        assert_eq!(saved.office_name, "Al Mersal Ksar");
        assert_eq!(saved.monthly_expense, dec!(1000));

        let (status, body) = call(&app, Method::GET, "/settings", Some(&employee), None).await;
        assert_eq!(status, StatusCode::OK);
        let read: Settings = serde_json::from_slice(&body).unwrap();
        assert_eq!(read, saved);
    }

    #[tokio::test]
    async fn test_dashboard_net() {
        let state = test_state();
        let app = build_router(state.clone());
        let admin = sign_in_as(&app, "admin@almersal.local", "Admin@12345").await;

        for amount in [50, 2000] {
            call(
                &app,
                Method::POST,
                "/remittances",
                Some(&admin),
                Some(serde_json::json!({
                    "provider": "WAVE", "channel": "MOBILE", "amount": amount, "tracking": "W"
                })),
            )
            .await;
        }

        {
            let db = state.db.lock().await;
            let mut settings = db.settings_or_default().unwrap();
            settings.monthly_expense = dec!(30);
            db.upsert_settings(&settings).unwrap();
        }

        let (status, body) = call(&app, Method::GET, "/dashboard", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let summary: DashboardSummary = serde_json::from_slice(&body).unwrap();
        assert_eq!(summary.today, 2);
        assert_eq!(summary.this_month, 2);
        assert_eq!(summary.total_commission, dec!(85.5));
        assert_eq!(summary.net, dec!(55.5));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let app = build_router(test_state());
        let token = sign_in_as(&app, "sawda@almersal.local", "Sawda@12345").await;

        let (status, _) = call(&app, Method::POST, "/auth/signout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(&app, Method::GET, "/dashboard", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
