use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{entities::exercise, models::ids};

#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Exercise not found")]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Exercise {
    pub id: Uuid,
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub duration: Option<i32>,
    pub notes: Option<String>,
    #[ts(type = "Date")]
    pub completed_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateExercise {
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub duration: Option<i32>,
    pub notes: Option<String>,
    #[ts(type = "Date | null")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateExercise {
    pub name: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration: Option<i32>,
    pub notes: Option<String>,
}

impl Exercise {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: exercise::Model,
    ) -> Result<Self, DbErr> {
        let user_id = ids::user_uuid_by_id(db, model.user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let team_id = ids::team_uuid_by_id(db, model.team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;

        Ok(Self {
            id: model.uuid,
            user_id,
            team_id,
            name: model.name,
            sets: model.sets,
            reps: model.reps,
            duration: model.duration,
            notes: model.notes,
            completed_at: model.completed_at.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateExercise,
        user_id: Uuid,
        team_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Self, DbErr> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let team_row_id = ids::team_id_by_uuid(db, team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;

        let now = Utc::now();
        let active = exercise::ActiveModel {
            uuid: Set(exercise_id),
            user_id: Set(user_row_id),
            team_id: Set(team_row_id),
            name: Set(data.name.trim().to_string()),
            sets: Set(data.sets),
            reps: Set(data.reps),
            duration: Set(data.duration),
            notes: Set(data.notes.as_deref().map(|s| s.trim().to_string())),
            completed_at: Set(data.completed_at.unwrap_or(now).into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = exercise::Entity::find()
            .filter(exercise::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Entries a user logged inside [start, end), newest first.
    pub async fn find_by_user_in_range<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Self>, DbErr> {
        let user_row_id = match ids::user_id_by_uuid(db, user_id).await? {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let models = exercise::Entity::find()
            .filter(exercise::Column::UserId.eq(user_row_id))
            .filter(exercise::Column::CompletedAt.gte(start))
            .filter(exercise::Column::CompletedAt.lt(end))
            .order_by_desc(exercise::Column::CompletedAt)
            .all(db)
            .await?;

        let mut exercises = Vec::with_capacity(models.len());
        for model in models {
            exercises.push(Self::from_model(db, model).await?);
        }
        Ok(exercises)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateExercise,
    ) -> Result<Self, DbErr> {
        let record = exercise::Entity::find()
            .filter(exercise::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Exercise not found".to_string()))?;

        let mut active: exercise::ActiveModel = record.into();
        if let Some(name) = &data.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(sets) = data.sets {
            active.sets = Set(sets);
        }
        if let Some(reps) = data.reps {
            active.reps = Set(reps);
        }
        if data.duration.is_some() {
            active.duration = Set(data.duration);
        }
        if data.notes.is_some() {
            active.notes = Set(data.notes.as_deref().map(|s| s.trim().to_string()));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = exercise::Entity::delete_many()
            .filter(exercise::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use crate::models::team::{CreateTeam, Team};
    use crate::models::user::{CreateUser, User};

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn range_query_excludes_other_days() {
        let db = setup_db().await;
        let team = Team::create(
            &db,
            &CreateTeam {
                name: "Household".to_string(),
                invite_code: "AB12CD".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let user = User::create(
            &db,
            &CreateUser {
                name: "Alex".to_string(),
                email: "alex@example.com".to_string(),
                password_hash: "argon2-hash".to_string(),
                team_id: team.id,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let today = Utc::now();
        let yesterday = today - Duration::days(1);

        for (name, completed_at) in [("Squats", today), ("Push-ups", yesterday)] {
            Exercise::create(
                &db,
                &CreateExercise {
                    name: name.to_string(),
                    sets: 3,
                    reps: 10,
                    duration: None,
                    notes: None,
                    completed_at: Some(completed_at),
                },
                user.id,
                team.id,
                Uuid::new_v4(),
            )
            .await
            .unwrap();
        }

        let start = today
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let end = start + Duration::days(1);

        let todays = Exercise::find_by_user_in_range(&db, user.id, start, end)
            .await
            .unwrap();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].name, "Squats");
    }
}
