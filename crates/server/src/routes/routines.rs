use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use chrono::{Duration, Utc};
use db::models::{
    exercise::Exercise,
    user::User,
    workout_routine::{
        CreateWorkoutRoutine, UpdateWorkoutRoutine, WorkoutRoutine, WorkoutRoutineError,
    },
};
use services::services::routines;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    http::auth::CurrentUser,
    middleware::load_workout_routine_middleware,
};

fn ensure_owner(routine: &WorkoutRoutine, user: &User) -> Result<(), ApiError> {
    if routine.user_id != user.id {
        return Err(ApiError::Forbidden(
            "This routine belongs to another member".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_routines(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<WorkoutRoutine>>>, ApiError> {
    let routines = WorkoutRoutine::find_by_user_id(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(routines)))
}

pub async fn create_routine(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkoutRoutine>,
) -> Result<ResponseJson<ApiResponse<WorkoutRoutine>>, ApiError> {
    if payload.name.trim().is_empty() || payload.category.trim().is_empty() {
        return Err(WorkoutRoutineError::ValidationError(
            "Name and category are required".to_string(),
        )
        .into());
    }
    if payload.exercises.is_empty() {
        return Err(WorkoutRoutineError::ValidationError(
            "At least one exercise is required".to_string(),
        )
        .into());
    }

    let routine = WorkoutRoutine::create(
        &state.db().pool,
        &payload,
        user.id,
        user.team_id,
        Uuid::new_v4(),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(routine)))
}

pub async fn update_routine(
    Extension(existing): Extension<WorkoutRoutine>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateWorkoutRoutine>,
) -> Result<ResponseJson<ApiResponse<WorkoutRoutine>>, ApiError> {
    ensure_owner(&existing, &user)?;

    let routine = WorkoutRoutine::update(&state.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(routine)))
}

/// Stamps a routine as used now; the suggestion endpoint rotates away from
/// recently used categories.
pub async fn use_routine(
    Extension(existing): Extension<WorkoutRoutine>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<WorkoutRoutine>>, ApiError> {
    ensure_owner(&existing, &user)?;

    let routine = WorkoutRoutine::mark_used(&state.db().pool, existing.id, Utc::now()).await?;
    Ok(ResponseJson(ApiResponse::success(routine)))
}

pub async fn delete_routine(
    Extension(routine): Extension<WorkoutRoutine>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ensure_owner(&routine, &user)?;

    let deleted = WorkoutRoutine::delete(&state.db().pool, routine.id).await?;
    if deleted == 0 {
        return Err(WorkoutRoutineError::NotFound.into());
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn suggest_routine(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Option<WorkoutRoutine>>>, ApiError> {
    let pool = &state.db().pool;
    let routines = WorkoutRoutine::find_by_user_id(pool, user.id).await?;

    if routines.is_empty() {
        return Ok(ResponseJson(ApiResponse::success_with_message(
            None,
            "No routines available. Create your first routine to get started!",
        )));
    }

    let now = Utc::now();
    let today = now.date_naive();
    let start = today.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
    let end = start + Duration::days(1);
    let todays_exercises = Exercise::find_by_user_in_range(pool, user.id, start, end).await?;

    let suggestion =
        routines::suggest_routine(&routines, !todays_exercises.is_empty(), today).cloned();
    Ok(ResponseJson(ApiResponse::success(suggestion)))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let routine_id_router = Router::new()
        .route("/", put(update_routine).delete(delete_routine))
        .route("/use", post(use_routine))
        .layer(from_fn_with_state(
            state.clone(),
            load_workout_routine_middleware::<AppState>,
        ));

    let inner = Router::new()
        .route("/", get(get_routines).post(create_routine))
        .route("/suggest", get(suggest_routine))
        .nest("/{routine_id}", routine_id_router);

    Router::new().nest("/routines", inner)
}
