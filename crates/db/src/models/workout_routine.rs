use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{entities::workout_routine, models::ids, types::RoutineDifficulty};

#[derive(Debug, Error)]
pub enum WorkoutRoutineError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Workout routine not found")]
    NotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RoutineExercise {
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub rest_time: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct WorkoutRoutine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty: RoutineDifficulty,
    pub exercises: Vec<RoutineExercise>,
    pub is_template: bool,
    #[ts(type = "Date | null")]
    pub last_used: Option<DateTime<Utc>>,
    pub times_used: i32,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateWorkoutRoutine {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty: Option<RoutineDifficulty>,
    pub exercises: Vec<RoutineExercise>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateWorkoutRoutine {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<RoutineDifficulty>,
    pub exercises: Option<Vec<RoutineExercise>>,
}

impl WorkoutRoutine {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: workout_routine::Model,
    ) -> Result<Self, DbErr> {
        let user_id = ids::user_uuid_by_id(db, model.user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let team_id = ids::team_uuid_by_id(db, model.team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;

        let exercises = serde_json::from_value(model.exercises)
            .map_err(|err| DbErr::Custom(format!("Invalid routine exercises: {err}")))?;

        Ok(Self {
            id: model.uuid,
            user_id,
            team_id,
            name: model.name,
            description: model.description,
            category: model.category,
            difficulty: model.difficulty,
            exercises,
            is_template: model.is_template,
            last_used: model.last_used.map(Into::into),
            times_used: model.times_used,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateWorkoutRoutine,
        user_id: Uuid,
        team_id: Uuid,
        routine_id: Uuid,
    ) -> Result<Self, DbErr> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let team_row_id = ids::team_id_by_uuid(db, team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;

        let exercises = serde_json::to_value(&data.exercises)
            .map_err(|err| DbErr::Custom(err.to_string()))?;

        let now = Utc::now();
        let active = workout_routine::ActiveModel {
            uuid: Set(routine_id),
            user_id: Set(user_row_id),
            team_id: Set(team_row_id),
            name: Set(data.name.trim().to_string()),
            description: Set(data.description.as_deref().map(|s| s.trim().to_string())),
            category: Set(data.category.clone()),
            difficulty: Set(data.difficulty.unwrap_or_default()),
            exercises: Set(exercises),
            is_template: Set(false),
            last_used: Set(None),
            times_used: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = workout_routine::Entity::find()
            .filter(workout_routine::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// A user's routines, most-used first, newest first among unused ones.
    pub async fn find_by_user_id<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let user_row_id = match ids::user_id_by_uuid(db, user_id).await? {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let models = workout_routine::Entity::find()
            .filter(workout_routine::Column::UserId.eq(user_row_id))
            .order_by_desc(workout_routine::Column::TimesUsed)
            .order_by_desc(workout_routine::Column::CreatedAt)
            .all(db)
            .await?;

        let mut routines = Vec::with_capacity(models.len());
        for model in models {
            routines.push(Self::from_model(db, model).await?);
        }
        Ok(routines)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateWorkoutRoutine,
    ) -> Result<Self, DbErr> {
        let record = workout_routine::Entity::find()
            .filter(workout_routine::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Workout routine not found".to_string()))?;

        let mut active: workout_routine::ActiveModel = record.into();
        if let Some(name) = &data.name {
            active.name = Set(name.trim().to_string());
        }
        if data.description.is_some() {
            active.description = Set(data.description.as_deref().map(|s| s.trim().to_string()));
        }
        if let Some(category) = &data.category {
            active.category = Set(category.clone());
        }
        if let Some(difficulty) = data.difficulty {
            active.difficulty = Set(difficulty);
        }
        if let Some(exercises) = &data.exercises {
            let value = serde_json::to_value(exercises)
                .map_err(|err| DbErr::Custom(err.to_string()))?;
            active.exercises = Set(value);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    /// Bumps usage: stamps last-used and increments the counter.
    pub async fn mark_used<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let record = workout_routine::Entity::find()
            .filter(workout_routine::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Workout routine not found".to_string()))?;

        let times_used = record.times_used + 1;
        let mut active: workout_routine::ActiveModel = record.into();
        active.last_used = Set(Some(now.into()));
        active.times_used = Set(times_used);
        active.updated_at = Set(now.into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = workout_routine::Entity::delete_many()
            .filter(workout_routine::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
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
    async fn exercises_roundtrip_through_json_and_usage_bumps() {
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

        let routine = WorkoutRoutine::create(
            &db,
            &CreateWorkoutRoutine {
                name: "Upper day".to_string(),
                description: None,
                category: "Upper Body".to_string(),
                difficulty: None,
                exercises: vec![RoutineExercise {
                    name: "Bench press".to_string(),
                    sets: 3,
                    reps: 8,
                    rest_time: Some(90),
                    notes: None,
                }],
            },
            user.id,
            team.id,
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert_eq!(routine.difficulty, RoutineDifficulty::Intermediate);
        assert_eq!(routine.exercises.len(), 1);
        assert_eq!(routine.exercises[0].name, "Bench press");
        assert_eq!(routine.times_used, 0);

        let used = WorkoutRoutine::mark_used(&db, routine.id, Utc::now())
            .await
            .unwrap();
        assert_eq!(used.times_used, 1);
        assert!(used.last_used.is_some());
    }
}
