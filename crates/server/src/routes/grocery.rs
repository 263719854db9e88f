use std::collections::HashMap;

use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::{
    grocery_item::{CreateGroceryItem, GroceryItem, GroceryItemError, UpdateGroceryItem},
    user::User,
};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    http::auth::CurrentUser,
    middleware::load_grocery_item_middleware,
};

#[derive(Debug, Clone, Serialize, TS)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, TS)]
pub struct GroceryItemResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub item: GroceryItem,
    pub added_by_user: Option<UserRef>,
    pub purchased_by_user: Option<UserRef>,
}

async fn member_names(
    state: &AppState,
    team_id: Uuid,
) -> Result<HashMap<Uuid, String>, ApiError> {
    let members = User::find_by_team_id(&state.db().pool, team_id).await?;
    Ok(members
        .into_iter()
        .map(|member| (member.id, member.name))
        .collect())
}

fn to_response(item: GroceryItem, names: &HashMap<Uuid, String>) -> GroceryItemResponse {
    let user_ref = |id: Uuid| {
        names.get(&id).map(|name| UserRef {
            id,
            name: name.clone(),
        })
    };

    GroceryItemResponse {
        added_by_user: user_ref(item.added_by),
        purchased_by_user: item.purchased_by.and_then(user_ref),
        item,
    }
}

fn ensure_same_team(item: &GroceryItem, user: &User) -> Result<(), ApiError> {
    if item.team_id != user.team_id {
        return Err(ApiError::Forbidden(
            "This item belongs to another team".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_grocery_items(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<GroceryItemResponse>>>, ApiError> {
    let items = GroceryItem::find_by_team_id(&state.db().pool, user.team_id).await?;
    let names = member_names(&state, user.team_id).await?;

    Ok(ResponseJson(ApiResponse::success(
        items
            .into_iter()
            .map(|item| to_response(item, &names))
            .collect(),
    )))
}

pub async fn create_grocery_item(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<CreateGroceryItem>,
) -> Result<ResponseJson<ApiResponse<GroceryItemResponse>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Item name is required".to_string()));
    }

    let item = GroceryItem::create(
        &state.db().pool,
        &payload,
        user.team_id,
        user.id,
        Uuid::new_v4(),
    )
    .await?;
    let names = member_names(&state, user.team_id).await?;

    Ok(ResponseJson(ApiResponse::success(to_response(item, &names))))
}

pub async fn update_grocery_item(
    Extension(existing): Extension<GroceryItem>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateGroceryItem>,
) -> Result<ResponseJson<ApiResponse<GroceryItemResponse>>, ApiError> {
    ensure_same_team(&existing, &user)?;

    let item = GroceryItem::update(&state.db().pool, existing.id, &payload).await?;
    let names = member_names(&state, user.team_id).await?;

    Ok(ResponseJson(ApiResponse::success(to_response(item, &names))))
}

pub async fn toggle_purchased(
    Extension(existing): Extension<GroceryItem>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<GroceryItemResponse>>, ApiError> {
    ensure_same_team(&existing, &user)?;

    let item = GroceryItem::toggle_purchased(&state.db().pool, existing.id, user.id).await?;
    let names = member_names(&state, user.team_id).await?;

    Ok(ResponseJson(ApiResponse::success(to_response(item, &names))))
}

pub async fn delete_grocery_item(
    Extension(item): Extension<GroceryItem>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ensure_same_team(&item, &user)?;

    let deleted = GroceryItem::delete(&state.db().pool, item.id).await?;
    if deleted == 0 {
        return Err(GroceryItemError::NotFound.into());
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let item_id_router = Router::new()
        .route("/", put(update_grocery_item).delete(delete_grocery_item))
        .route("/purchase", post(toggle_purchased))
        .layer(from_fn_with_state(
            state.clone(),
            load_grocery_item_middleware::<AppState>,
        ));

    let inner = Router::new()
        .route("/", get(get_grocery_items).post(create_grocery_item))
        .nest("/{item_id}", item_id_router);

    Router::new().nest("/grocery", inner)
}
