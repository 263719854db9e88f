use std::collections::BTreeMap;

use axum::{
    Extension, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{chore::Chore, user::User};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, http::auth::CurrentUser};

#[derive(Debug, Serialize, TS)]
pub struct CompletionHistoryEntry {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize, TS)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub user_name: String,
    pub total_points: i64,
    pub level: i32,
    pub current_streak: i32,
    pub rank: usize,
}

/// Per-day completion counts for the current user, oldest first. Feeds the
/// contribution graph.
pub async fn completion_history(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<CompletionHistoryEntry>>>, ApiError> {
    let dates = Chore::completion_dates_for_user(&state.db().pool, user.id).await?;

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for date in dates {
        *counts.entry(date).or_insert(0) += 1;
    }

    let history = counts
        .into_iter()
        .map(|(date, count)| CompletionHistoryEntry { date, count })
        .collect();

    Ok(ResponseJson(ApiResponse::success(history)))
}

/// Team members ranked by total points.
pub async fn leaderboard(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<LeaderboardEntry>>>, ApiError> {
    let mut members = User::find_by_team_id(&state.db().pool, user.team_id).await?;
    members.sort_by(|a, b| b.stats.total_points.cmp(&a.stats.total_points));

    let entries = members
        .into_iter()
        .enumerate()
        .map(|(index, member)| LeaderboardEntry {
            user_id: member.id,
            user_name: member.name,
            total_points: member.stats.total_points,
            level: member.stats.level,
            current_streak: member.stats.current_streak,
            rank: index + 1,
        })
        .collect();

    Ok(ResponseJson(ApiResponse::success(entries)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats/history", get(completion_history))
        .route("/stats/leaderboard", get(leaderboard))
}
