use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use chrono::Utc;
use db::TransactionTrait;
use db::models::{
    chore::{Chore, ChoreError, CompletionRecord, CreateChore, UpdateChore},
    user::{Badge, User, UserError, UserStats},
};
use serde::{Deserialize, Serialize};
use services::services::{gamification, schedule};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    http::auth::CurrentUser,
    middleware::load_chore_middleware,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct ChoreQuery {
    pub all: Option<bool>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ChoreWithHistory {
    #[serde(flatten)]
    #[ts(flatten)]
    pub chore: Chore,
    pub completion_history: Vec<CompletionRecord>,
}

impl std::ops::Deref for ChoreWithHistory {
    type Target = Chore;
    fn deref(&self) -> &Self::Target {
        &self.chore
    }
}

#[derive(Debug, Serialize, TS)]
pub struct ToggleResponse {
    pub chore: ChoreWithHistory,
    pub points_earned: i64,
    pub new_badges: Vec<Badge>,
    pub user_stats: UserStats,
}

#[derive(Debug, Deserialize, TS)]
pub struct SetPositionRequest {
    pub position: i32,
}

fn ensure_same_team(chore: &Chore, user: &User) -> Result<(), ApiError> {
    if chore.team_id != user.team_id {
        return Err(ApiError::Forbidden(
            "This chore belongs to another team".to_string(),
        ));
    }
    Ok(())
}

async fn with_history(
    state: &AppState,
    chore: Chore,
) -> Result<ChoreWithHistory, ApiError> {
    let completion_history = Chore::completion_history(&state.db().pool, chore.id).await?;
    Ok(ChoreWithHistory {
        chore,
        completion_history,
    })
}

pub async fn get_chores(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ChoreQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ChoreWithHistory>>>, ApiError> {
    let pool = &state.db().pool;
    let now = Utc::now();
    let today = now.date_naive();
    let fetch_all = query.all.unwrap_or(false);

    let chores = Chore::find_by_team_id(pool, user.team_id).await?;

    let mut due = Vec::with_capacity(chores.len());
    for mut chore in chores {
        // Completion-reset rule: a stale completion flag is cleared on
        // fetch; history stays.
        if chore.is_completed
            && let Some(last_completed) = chore.last_completed
            && schedule::completion_expired(chore.frequency, last_completed, now)
        {
            Chore::clear_completed(pool, chore.id).await?;
            chore.is_completed = false;
        }

        if !fetch_all && !schedule::is_due_on(&chore, today) {
            continue;
        }

        due.push(with_history(&state, chore).await?);
    }

    Ok(ResponseJson(ApiResponse::success(due)))
}

pub async fn get_chore(
    Extension(chore): Extension<Chore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<ChoreWithHistory>>, ApiError> {
    ensure_same_team(&chore, &user)?;
    Ok(ResponseJson(ApiResponse::success(
        with_history(&state, chore).await?,
    )))
}

pub async fn create_chore(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<CreateChore>,
) -> Result<ResponseJson<ApiResponse<ChoreWithHistory>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ChoreError::ValidationError("Title is required".to_string()).into());
    }

    let points = gamification::points_for_frequency(payload.frequency);
    let chore = Chore::create(
        &state.db().pool,
        &payload,
        points,
        user.team_id,
        user.id,
        Uuid::new_v4(),
    )
    .await?;

    tracing::debug!(chore_id = %chore.id, team_id = %user.team_id, "Created chore");

    Ok(ResponseJson(ApiResponse::success(ChoreWithHistory {
        chore,
        completion_history: Vec::new(),
    })))
}

pub async fn update_chore(
    Extension(existing): Extension<Chore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateChore>,
) -> Result<ResponseJson<ApiResponse<ChoreWithHistory>>, ApiError> {
    ensure_same_team(&existing, &user)?;

    let chore = Chore::update(&state.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(
        with_history(&state, chore).await?,
    )))
}

pub async fn set_chore_position(
    Extension(chore): Extension<Chore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<SetPositionRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ensure_same_team(&chore, &user)?;

    Chore::set_position(&state.db().pool, chore.id, payload.position).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn delete_chore(
    Extension(chore): Extension<Chore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ensure_same_team(&chore, &user)?;

    Chore::delete(&state.db().pool, chore.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Flips completion state and applies the points/streak/badge rules.
///
/// Completing awards points only when today's completion record did not
/// exist yet; the unique index on completion records decides that
/// atomically. Un-completing reverses points only when today's record by
/// this user existed. The streak is never decremented on un-completion.
pub async fn toggle_chore(
    Extension(chore): Extension<Chore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<ToggleResponse>>, ApiError> {
    ensure_same_team(&chore, &user)?;

    // Only the assignee, or the creator when unassigned, may toggle.
    let responsible = chore.assigned_to.unwrap_or(chore.created_by);
    if responsible != user.id {
        return Err(ApiError::Forbidden(
            "Only the assigned member can mark this chore as complete".to_string(),
        ));
    }

    let pool = &state.db().pool;
    let now = Utc::now();
    let today = now.date_naive().format("%Y-%m-%d").to_string();
    let completing = !chore.is_completed;

    let tx = pool.begin().await?;

    let (points_earned, new_badges) = if completing {
        let inserted = Chore::record_completion(&tx, chore.id, user.id, &today, now).await?;
        Chore::mark_completed(&tx, chore.id, now).await?;

        if inserted {
            let fresh = User::find_by_id(&tx, user.id)
                .await?
                .ok_or(UserError::UserNotFound)?;
            let team_size = User::count_by_team_id(&tx, user.team_id).await?;

            let mut stats = fresh.stats;
            let newly_earned = gamification::apply_completion(&mut stats, chore.points, now, team_size);

            User::update_stats(&tx, user.id, &stats).await?;
            let badges: Vec<Badge> = newly_earned
                .iter()
                .map(|spec| spec.to_badge(now))
                .collect();
            for badge in &badges {
                User::add_badge(&tx, user.id, badge).await?;
            }

            (chore.points, badges)
        } else {
            // Already completed today; set the flag, award nothing.
            (0, Vec::new())
        }
    } else {
        let removed = Chore::remove_completion(&tx, chore.id, user.id, &today).await?;
        Chore::clear_completed(&tx, chore.id).await?;

        if removed {
            let fresh = User::find_by_id(&tx, user.id)
                .await?
                .ok_or(UserError::UserNotFound)?;

            let mut stats = fresh.stats;
            gamification::revert_completion(&mut stats, chore.points, now);
            User::update_stats(&tx, user.id, &stats).await?;

            (-chore.points, Vec::new())
        } else {
            (0, Vec::new())
        }
    };

    tx.commit().await?;

    if points_earned != 0 {
        tracing::info!(
            chore_id = %chore.id,
            user_id = %user.id,
            points = points_earned,
            "Chore toggled"
        );
    }

    let chore = Chore::find_by_id(pool, chore.id)
        .await?
        .ok_or(ChoreError::ChoreNotFound)?;
    let chore = with_history(&state, chore).await?;
    let user_stats = User::find_by_id(pool, user.id)
        .await?
        .ok_or(UserError::UserNotFound)?
        .stats;

    Ok(ResponseJson(ApiResponse::success(ToggleResponse {
        chore,
        points_earned,
        new_badges,
        user_stats,
    })))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let chore_actions_router = Router::new()
        .route("/", put(update_chore).delete(delete_chore))
        .route("/toggle", post(toggle_chore))
        .route("/position", post(set_chore_position));

    let chore_id_router = Router::new()
        .route("/", get(get_chore))
        .merge(chore_actions_router)
        .layer(from_fn_with_state(state.clone(), load_chore_middleware::<AppState>));

    let inner = Router::new()
        .route("/", get(get_chores).post(create_chore))
        .nest("/{chore_id}", chore_id_router);

    Router::new().nest("/chores", inner)
}
