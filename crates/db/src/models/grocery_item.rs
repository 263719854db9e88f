use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{entities::grocery_item, models::ids};

#[derive(Debug, Error)]
pub enum GroceryItemError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Grocery item not found")]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct GroceryItem {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub is_purchased: bool,
    pub added_by: Uuid,
    pub purchased_by: Option<Uuid>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateGroceryItem {
    pub name: String,
    pub quantity: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateGroceryItem {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
}

impl GroceryItem {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: grocery_item::Model,
    ) -> Result<Self, DbErr> {
        let team_id = ids::team_uuid_by_id(db, model.team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;
        let added_by = ids::user_uuid_by_id(db, model.added_by)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let purchased_by = match model.purchased_by {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };

        Ok(Self {
            id: model.uuid,
            team_id,
            name: model.name,
            quantity: model.quantity,
            category: model.category,
            is_purchased: model.is_purchased,
            added_by,
            purchased_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateGroceryItem,
        team_id: Uuid,
        added_by: Uuid,
        item_id: Uuid,
    ) -> Result<Self, DbErr> {
        let team_row_id = ids::team_id_by_uuid(db, team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;
        let added_by_row_id = ids::user_id_by_uuid(db, added_by)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let now = Utc::now();
        let active = grocery_item::ActiveModel {
            uuid: Set(item_id),
            team_id: Set(team_row_id),
            name: Set(data.name.trim().to_string()),
            quantity: Set(data.quantity.as_deref().map(|s| s.trim().to_string())),
            category: Set(data.category.as_deref().map(|s| s.trim().to_string())),
            is_purchased: Set(false),
            added_by: Set(added_by_row_id),
            purchased_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = grocery_item::Entity::find()
            .filter(grocery_item::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Team list: unpurchased first, newest first within each group.
    pub async fn find_by_team_id<C: ConnectionTrait>(
        db: &C,
        team_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let team_row_id = match ids::team_id_by_uuid(db, team_id).await? {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let models = grocery_item::Entity::find()
            .filter(grocery_item::Column::TeamId.eq(team_row_id))
            .order_by_asc(grocery_item::Column::IsPurchased)
            .order_by_desc(grocery_item::Column::CreatedAt)
            .all(db)
            .await?;

        let mut items = Vec::with_capacity(models.len());
        for model in models {
            items.push(Self::from_model(db, model).await?);
        }
        Ok(items)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateGroceryItem,
    ) -> Result<Self, DbErr> {
        let record = grocery_item::Entity::find()
            .filter(grocery_item::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Grocery item not found".to_string()))?;

        let mut active: grocery_item::ActiveModel = record.into();
        if let Some(name) = &data.name {
            active.name = Set(name.trim().to_string());
        }
        if data.quantity.is_some() {
            active.quantity = Set(data.quantity.as_deref().map(|s| s.trim().to_string()));
        }
        if data.category.is_some() {
            active.category = Set(data.category.as_deref().map(|s| s.trim().to_string()));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    /// Flips the purchased flag; records who purchased when set, clears it
    /// when unset.
    pub async fn toggle_purchased<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, DbErr> {
        let record = grocery_item::Entity::find()
            .filter(grocery_item::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Grocery item not found".to_string()))?;

        let purchasing = !record.is_purchased;
        let purchased_by = if purchasing {
            Some(
                ids::user_id_by_uuid(db, user_id)
                    .await?
                    .ok_or(DbErr::RecordNotFound("User not found".to_string()))?,
            )
        } else {
            None
        };

        let mut active: grocery_item::ActiveModel = record.into();
        active.is_purchased = Set(purchasing);
        active.purchased_by = Set(purchased_by);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = grocery_item::Entity::delete_many()
            .filter(grocery_item::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
