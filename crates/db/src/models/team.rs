use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{entities::team, models::ids};

#[derive(Debug, Error)]
pub enum TeamError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Team not found")]
    TeamNotFound,
    #[error("No team found with invite code \"{0}\"")]
    InviteCodeNotFound(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub invite_code: String,
    pub created_by: Option<Uuid>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTeam {
    pub name: String,
    pub invite_code: String,
}

impl Team {
    async fn from_model<C: ConnectionTrait>(db: &C, model: team::Model) -> Result<Self, DbErr> {
        let created_by = match model.created_by {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };

        Ok(Self {
            id: model.uuid,
            name: model.name,
            invite_code: model.invite_code,
            created_by,
            created_at: model.created_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTeam,
        team_id: Uuid,
    ) -> Result<Self, DbErr> {
        let active = team::ActiveModel {
            uuid: Set(team_id),
            name: Set(data.name.clone()),
            invite_code: Set(data.invite_code.to_uppercase()),
            created_by: Set(None),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = team::Entity::find()
            .filter(team::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_invite_code<C: ConnectionTrait>(
        db: &C,
        invite_code: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = team::Entity::find()
            .filter(team::Column::InviteCode.eq(invite_code.to_uppercase()))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn set_created_by<C: ConnectionTrait>(
        db: &C,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), DbErr> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let record = team::Entity::find()
            .filter(team::Column::Uuid.eq(team_id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;

        let mut active: team::ActiveModel = record.into();
        active.created_by = Set(Some(user_row_id));
        active.update(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn invite_code_lookup_is_case_insensitive() {
        let db = setup_db().await;

        let team = Team::create(
            &db,
            &CreateTeam {
                name: "Household".to_string(),
                invite_code: "ab12cd".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert_eq!(team.invite_code, "AB12CD");

        let found = Team::find_by_invite_code(&db, "ab12cd").await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(team.id));

        let missing = Team::find_by_invite_code(&db, "ZZZZZZ").await.unwrap();
        assert!(missing.is_none());
    }
}
