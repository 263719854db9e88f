use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, put},
};
use chrono::{Duration, NaiveDate, Utc};
use db::models::{
    exercise::{CreateExercise, Exercise, ExerciseError, UpdateExercise},
    user::User,
};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    http::auth::CurrentUser,
    middleware::load_exercise_middleware,
};

#[derive(Debug, Deserialize)]
pub struct ExerciseQuery {
    /// Day to list entries for; defaults to today.
    pub date: Option<NaiveDate>,
}

fn ensure_owner(exercise: &Exercise, user: &User) -> Result<(), ApiError> {
    if exercise.user_id != user.id {
        return Err(ApiError::Forbidden(
            "This exercise belongs to another member".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_exercises(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ExerciseQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Exercise>>>, ApiError> {
    let day = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let start = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid date".to_string()))?
        .and_utc();
    let end = start + Duration::days(1);

    let exercises =
        Exercise::find_by_user_in_range(&state.db().pool, user.id, start, end).await?;
    Ok(ResponseJson(ApiResponse::success(exercises)))
}

pub async fn create_exercise(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<CreateExercise>,
) -> Result<ResponseJson<ApiResponse<Exercise>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Name, sets, and reps are required".to_string(),
        ));
    }
    if payload.sets < 1 || payload.reps < 1 {
        return Err(ApiError::BadRequest(
            "Sets and reps must be at least 1".to_string(),
        ));
    }

    let exercise = Exercise::create(
        &state.db().pool,
        &payload,
        user.id,
        user.team_id,
        Uuid::new_v4(),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(exercise)))
}

pub async fn update_exercise(
    Extension(existing): Extension<Exercise>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateExercise>,
) -> Result<ResponseJson<ApiResponse<Exercise>>, ApiError> {
    ensure_owner(&existing, &user)?;

    let exercise = Exercise::update(&state.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(exercise)))
}

pub async fn delete_exercise(
    Extension(exercise): Extension<Exercise>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ensure_owner(&exercise, &user)?;

    let deleted = Exercise::delete(&state.db().pool, exercise.id).await?;
    if deleted == 0 {
        return Err(ExerciseError::NotFound.into());
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let exercise_id_router = Router::new()
        .route("/", put(update_exercise).delete(delete_exercise))
        .layer(from_fn_with_state(state.clone(), load_exercise_middleware::<AppState>));

    let inner = Router::new()
        .route("/", get(get_exercises).post(create_exercise))
        .nest("/{exercise_id}", exercise_id_router);

    Router::new().nest("/exercises", inner)
}
