use std::{fmt::Display, future::Future};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use db::{
    DBService,
    models::{
        chore::Chore, exercise::Exercise, grocery_item::GroceryItem,
        workout_routine::WorkoutRoutine,
    },
};
use uuid::Uuid;

use crate::AppState;

pub trait ModelLoaderDeps {
    fn db_service(&self) -> &DBService;
}

impl ModelLoaderDeps for AppState {
    fn db_service(&self) -> &DBService {
        self.db()
    }
}

async fn fetch_model_or_status<M, E, Fut>(
    model_name: &'static str,
    model_id: Uuid,
    load_future: Fut,
) -> Result<M, StatusCode>
where
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    match load_future.await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            tracing::warn!("{model_name} {model_id} not found");
            Err(StatusCode::NOT_FOUND)
        }
        Err(error) => {
            tracing::error!("Failed to fetch {model_name} {model_id}: {error}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn load_request_extension<M, E, Fut>(
    request: Request,
    next: Next,
    model_name: &'static str,
    model_id: Uuid,
    load_future: Fut,
) -> Result<Response, StatusCode>
where
    M: Clone + Send + Sync + 'static,
    E: Display,
    Fut: Future<Output = Result<Option<M>, E>>,
{
    let model = fetch_model_or_status(model_name, model_id, load_future).await?;
    let mut request = request;
    request.extensions_mut().insert(model);
    Ok(next.run(request).await)
}

pub async fn load_chore_middleware<S>(
    State(state): State<S>,
    Path(chore_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    S: ModelLoaderDeps,
{
    load_request_extension(
        request,
        next,
        "Chore",
        chore_id,
        Chore::find_by_id(&state.db_service().pool, chore_id),
    )
    .await
}

pub async fn load_grocery_item_middleware<S>(
    State(state): State<S>,
    Path(item_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    S: ModelLoaderDeps,
{
    load_request_extension(
        request,
        next,
        "GroceryItem",
        item_id,
        GroceryItem::find_by_id(&state.db_service().pool, item_id),
    )
    .await
}

pub async fn load_exercise_middleware<S>(
    State(state): State<S>,
    Path(exercise_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    S: ModelLoaderDeps,
{
    load_request_extension(
        request,
        next,
        "Exercise",
        exercise_id,
        Exercise::find_by_id(&state.db_service().pool, exercise_id),
    )
    .await
}

pub async fn load_workout_routine_middleware<S>(
    State(state): State<S>,
    Path(routine_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    S: ModelLoaderDeps,
{
    load_request_extension(
        request,
        next,
        "WorkoutRoutine",
        routine_id,
        WorkoutRoutine::find_by_id(&state.db_service().pool, routine_id),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::fetch_model_or_status;

    #[tokio::test]
    async fn fetch_model_or_status_returns_not_found_on_missing_model() {
        let result = fetch_model_or_status::<String, &'static str, _>(
            "Chore",
            uuid::Uuid::new_v4(),
            async { Ok(None) },
        )
        .await;

        assert_eq!(result.unwrap_err(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fetch_model_or_status_returns_internal_error_on_fetch_failure() {
        let result = fetch_model_or_status::<String, &'static str, _>(
            "Chore",
            uuid::Uuid::new_v4(),
            async { Err("db unavailable") },
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
