use axum::{
    Extension, Json, Router,
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse, Json as ResponseJson},
    routing::{get, post},
};
use db::models::{
    team::{CreateTeam, Team, TeamError},
    user::{CreateUser, User, UserError},
};
use serde::{Deserialize, Serialize};
use services::services::auth::{AuthError, generate_invite_code};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, http::auth::{CurrentUser, SESSION_COOKIE}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum TeamOption {
    Create,
    Join,
}

#[derive(Debug, Deserialize, TS)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub team_option: TeamOption,
    pub team_name_or_code: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub invite_code: String,
}

#[derive(Debug, Serialize, TS)]
pub struct SessionPayload {
    pub user: User,
    pub team: Option<TeamSummary>,
    pub team_members: Vec<User>,
    pub token: String,
}

#[derive(Debug, Serialize, TS)]
pub struct MePayload {
    pub user: User,
    pub team: Option<TeamSummary>,
    pub team_members: Vec<User>,
}

fn team_summary(team: &Team) -> TeamSummary {
    TeamSummary {
        id: team.id,
        name: team.name.clone(),
        invite_code: team.invite_code.clone(),
    }
}

async fn session_cookie(state: &AppState, token: &str) -> String {
    let secure = state.config().read().await.secure_cookies;
    let max_age = state.auth().token_ttl().num_seconds();
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.team_name_or_code.trim().is_empty()
    {
        return Err(ApiError::BadRequest("All fields are required".to_string()));
    }

    let pool = &state.db().pool;

    if User::find_by_email(pool, &payload.email).await?.is_some() {
        return Err(UserError::EmailTaken.into());
    }

    let team = match payload.team_option {
        TeamOption::Create => {
            Team::create(
                pool,
                &CreateTeam {
                    name: payload.team_name_or_code.trim().to_string(),
                    invite_code: generate_invite_code(),
                },
                Uuid::new_v4(),
            )
            .await?
        }
        TeamOption::Join => Team::find_by_invite_code(pool, payload.team_name_or_code.trim())
            .await?
            .ok_or_else(|| {
                TeamError::InviteCodeNotFound(payload.team_name_or_code.trim().to_uppercase())
            })?,
    };

    let password_hash = state.auth().hash_password(&payload.password)?;
    let user = User::create(
        pool,
        &CreateUser {
            name: payload.name.trim().to_string(),
            email: payload.email.clone(),
            password_hash,
            team_id: team.id,
        },
        Uuid::new_v4(),
    )
    .await?;

    if payload.team_option == TeamOption::Create {
        Team::set_created_by(pool, team.id, user.id).await?;
    }

    let token = state.auth().sign_token(user.id, &user.email)?;
    let team_members = User::find_by_team_id(pool, team.id).await?;

    tracing::info!(user_id = %user.id, team_id = %team.id, "New signup");

    let cookie = session_cookie(&state, &token).await;
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ResponseJson(ApiResponse::success(SessionPayload {
            team: Some(team_summary(&team)),
            team_members,
            user,
            token,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let pool = &state.db().pool;

    let (user, password_hash) = User::credentials_by_email(pool, &payload.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.auth().verify_password(&payload.password, &password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let team = Team::find_by_id(pool, user.team_id).await?;
    let team_members = User::find_by_team_id(pool, user.team_id).await?;
    let token = state.auth().sign_token(user.id, &user.email)?;

    let cookie = session_cookie(&state, &token).await;
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ResponseJson(ApiResponse::success(SessionPayload {
            team: team.as_ref().map(team_summary),
            team_members,
            user,
            token,
        })),
    ))
}

pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        ResponseJson(ApiResponse::success(())),
    )
}

pub async fn me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<MePayload>>, ApiError> {
    let pool = &state.db().pool;
    let team = Team::find_by_id(pool, user.team_id).await?;
    let team_members = User::find_by_team_id(pool, user.team_id).await?;

    Ok(ResponseJson(ApiResponse::success(MePayload {
        team: team.as_ref().map(team_summary),
        team_members,
        user,
    })))
}

/// Routes reachable without a session.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Routes behind the auth middleware.
pub fn session_router() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}
