//! HTTP routes.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/auth/send-otp-signup` | request a signup passcode |
//! | POST | `/auth/verify-otp-signup` | verify it, create the identity, get a token |
//! | POST | `/auth/send-otp-login` | request a login passcode |
//! | POST | `/auth/verify-otp-login` | verify it, get a token |
//! | GET | `/auth/me` | the caller's identity |
//! | GET | `/auth/google` | redirect to Google |
//! | GET | `/auth/google/callback` | finish Google sign-in, redirect to the frontend with a token |
//! | POST, GET | `/notes` | create / list the caller's notes |
//! | DELETE | `/notes/{id}` | delete one of the caller's notes |

use std::collections::HashMap;

use api::auth::{AuthSuccess, LoginCodeRequest, SignupCodeRequest, VerifyRequest};
use api::notes::CreateNoteRequest;
use api::{AuthError, Identity, Note};
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::gate::CurrentUser;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/send-otp-signup", post(send_otp_signup))
        .route("/auth/verify-otp-signup", post(verify_otp_signup))
        .route("/auth/send-otp-login", post(send_otp_login))
        .route("/auth/verify-otp-login", post(verify_otp_login))
        .route("/auth/me", get(me))
        .route("/auth/google", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        .route("/notes", post(create_note).get(list_notes))
        .route("/notes/{id}", delete(delete_note))
        .with_state(state)
}

fn sent() -> Json<Value> {
    Json(json!({ "message": "OTP sent successfully" }))
}

async fn send_otp_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupCodeRequest>,
) -> ApiResult<Value> {
    state.auth.request_signup_code(req).await?;
    Ok(sent())
}

async fn verify_otp_signup(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<AuthSuccess> {
    Ok(Json(state.auth.verify_signup(req).await?))
}

async fn send_otp_login(
    State(state): State<AppState>,
    Json(req): Json<LoginCodeRequest>,
) -> ApiResult<Value> {
    state.auth.request_login_code(req).await?;
    Ok(sent())
}

async fn verify_otp_login(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<AuthSuccess> {
    Ok(Json(state.auth.verify_login(req).await?))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<Identity> {
    Json(user)
}

async fn google_login(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let url = state.auth.federated_authorization_url().await?;
    Ok(Redirect::to(&url))
}

async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Redirect {
    let failed = |reason: &str| Redirect::to(&format!("{}/signin?error={reason}", state.frontend_url));

    if state.auth.provider().is_none() {
        tracing::error!("google callback hit but google sign-in is not configured");
        return failed("config_error");
    }
    let Some(code) = params.get("code") else {
        tracing::error!("Google callback missing code");
        return failed("missing_code");
    };
    let Some(oauth_state) = params.get("state") else {
        tracing::error!("Google callback missing state");
        return failed("missing_state");
    };

    match state.auth.federated_callback(code, oauth_state).await {
        Ok(success) => Redirect::to(&format!(
            "{}/auth?token={}",
            state.frontend_url, success.token
        )),
        Err(AuthError::Conflict) => {
            tracing::warn!("google account email already belongs to a passcode identity");
            failed("account_exists")
        }
        Err(e) => {
            tracing::error!("Google OAuth error: {}", e);
            failed("oauth_error")
        }
    }
}

async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<Note> {
    Ok(Json(state.notes.create(user.id, req).await?))
}

async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<Note>> {
    Ok(Json(state.notes.list(user.id).await?))
}

async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = Uuid::parse_str(&id).map_err(|_| AuthError::NotFound("Note not found"))?;
    state.notes.delete(user.id, id).await?;
    Ok(Json(json!({ "message": "Note deleted" })))
}
