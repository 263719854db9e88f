use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::{chore, completion_record},
    models::ids,
    types::ChoreFrequency,
};

#[derive(Debug, Error)]
pub enum ChoreError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Chore not found")]
    ChoreNotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Chore {
    pub id: Uuid,
    pub team_id: Uuid,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub frequency: ChoreFrequency,
    pub day_of_week: Option<i32>,
    pub days_of_week: Option<Vec<i32>>,
    pub day_of_month: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub is_completed: bool,
    #[ts(type = "Date | null")]
    pub last_completed: Option<DateTime<Utc>>,
    pub points: i64,
    pub position: i32,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CompletionRecord {
    pub date: String,
    #[ts(type = "Date")]
    pub completed_at: DateTime<Utc>,
    pub completed_by: Uuid,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateChore {
    pub title: String,
    pub description: Option<String>,
    pub frequency: ChoreFrequency,
    pub day_of_week: Option<i32>,
    pub days_of_week: Option<Vec<i32>>,
    pub day_of_month: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateChore {
    pub title: Option<String>,
    pub description: Option<String>,
    pub day_of_week: Option<i32>,
    pub days_of_week: Option<Vec<i32>>,
    pub day_of_month: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

fn days_of_week_to_json(days: &Option<Vec<i32>>) -> Option<serde_json::Value> {
    days.as_ref()
        .filter(|days| !days.is_empty())
        .map(|days| serde_json::json!(days))
}

impl Chore {
    async fn from_model<C: ConnectionTrait>(db: &C, model: chore::Model) -> Result<Self, DbErr> {
        let team_id = ids::team_uuid_by_id(db, model.team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;
        let created_by = ids::user_uuid_by_id(db, model.created_by)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let assigned_to = match model.assigned_to {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };

        let days_of_week = model
            .days_of_week
            .and_then(|value| serde_json::from_value::<Vec<i32>>(value).ok())
            .filter(|days| !days.is_empty());

        Ok(Self {
            id: model.uuid,
            team_id,
            created_by,
            assigned_to,
            title: model.title,
            description: model.description,
            frequency: model.frequency,
            day_of_week: model.day_of_week,
            days_of_week,
            day_of_month: model.day_of_month,
            start_date: model.start_date,
            is_completed: model.is_completed,
            last_completed: model.last_completed.map(Into::into),
            points: model.points,
            position: model.position,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateChore,
        points: i64,
        team_id: Uuid,
        created_by: Uuid,
        chore_id: Uuid,
    ) -> Result<Self, DbErr> {
        let team_row_id = ids::team_id_by_uuid(db, team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;
        let creator_row_id = ids::user_id_by_uuid(db, created_by)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let assigned_row_id = match data.assigned_to {
            Some(id) => ids::user_id_by_uuid(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("Assignee not found".to_string()))
                .map(Some)?,
            None => None,
        };

        let now = Utc::now();
        let active = chore::ActiveModel {
            uuid: Set(chore_id),
            team_id: Set(team_row_id),
            created_by: Set(creator_row_id),
            assigned_to: Set(assigned_row_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            frequency: Set(data.frequency),
            day_of_week: Set(data.day_of_week),
            days_of_week: Set(days_of_week_to_json(&data.days_of_week)),
            day_of_month: Set(data.day_of_month),
            start_date: Set(data.start_date),
            is_completed: Set(false),
            last_completed: Set(None),
            points: Set(points),
            position: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = chore::Entity::find()
            .filter(chore::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_team_id<C: ConnectionTrait>(
        db: &C,
        team_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let team_row_id = match ids::team_id_by_uuid(db, team_id).await? {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let models = chore::Entity::find()
            .filter(chore::Column::TeamId.eq(team_row_id))
            .order_by_desc(chore::Column::CreatedAt)
            .all(db)
            .await?;

        let mut chores = Vec::with_capacity(models.len());
        for model in models {
            chores.push(Self::from_model(db, model).await?);
        }
        Ok(chores)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateChore,
    ) -> Result<Self, DbErr> {
        let record = chore::Entity::find()
            .filter(chore::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Chore not found".to_string()))?;

        let assigned_row_id = match data.assigned_to {
            Some(user_id) => ids::user_id_by_uuid(db, user_id)
                .await?
                .ok_or(DbErr::RecordNotFound("Assignee not found".to_string()))
                .map(Some)?,
            None => record.assigned_to,
        };

        let mut active: chore::ActiveModel = record.into();
        if let Some(title) = &data.title {
            active.title = Set(title.clone());
        }
        if data.description.is_some() {
            active.description = Set(data.description.clone());
        }
        if data.day_of_week.is_some() {
            active.day_of_week = Set(data.day_of_week);
        }
        if data.days_of_week.is_some() {
            active.days_of_week = Set(days_of_week_to_json(&data.days_of_week));
        }
        if data.day_of_month.is_some() {
            active.day_of_month = Set(data.day_of_month);
        }
        if data.start_date.is_some() {
            active.start_date = Set(data.start_date);
        }
        active.assigned_to = Set(assigned_row_id);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    pub async fn set_position<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        position: i32,
    ) -> Result<(), DbErr> {
        let record = chore::Entity::find()
            .filter(chore::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Chore not found".to_string()))?;

        let mut active: chore::ActiveModel = record.into();
        active.position = Set(position);
        active.updated_at = Set(Utc::now().into());
        active.update(db).await?;
        Ok(())
    }

    pub async fn mark_completed<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let record = chore::Entity::find()
            .filter(chore::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Chore not found".to_string()))?;

        let mut active: chore::ActiveModel = record.into();
        active.is_completed = Set(true);
        active.last_completed = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        active.update(db).await?;
        Ok(())
    }

    /// Clears the completion flag. The last-completed timestamp and the
    /// completion history are retained.
    pub async fn clear_completed<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), DbErr> {
        let record = chore::Entity::find()
            .filter(chore::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Chore not found".to_string()))?;

        let mut active: chore::ActiveModel = record.into();
        active.is_completed = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(db).await?;
        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = chore::Entity::delete_many()
            .filter(chore::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Appends a completion record for (chore, user, date). Returns false
    /// when a record for that day already exists — the unique index is the
    /// authority, so two racing toggles cannot both award points.
    pub async fn record_completion<C: ConnectionTrait>(
        db: &C,
        chore_id: Uuid,
        user_id: Uuid,
        date: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let chore_row_id = ids::chore_id_by_uuid(db, chore_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Chore not found".to_string()))?;
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let active = completion_record::ActiveModel {
            chore_id: Set(chore_row_id),
            user_id: Set(user_row_id),
            date: Set(date.to_string()),
            completed_at: Set(now.into()),
            ..Default::default()
        };

        match active.insert(db).await {
            Ok(_) => Ok(true),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Removes the completion record for (chore, user, date). Returns
    /// whether a record existed.
    pub async fn remove_completion<C: ConnectionTrait>(
        db: &C,
        chore_id: Uuid,
        user_id: Uuid,
        date: &str,
    ) -> Result<bool, DbErr> {
        let chore_row_id = ids::chore_id_by_uuid(db, chore_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Chore not found".to_string()))?;
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let result = completion_record::Entity::delete_many()
            .filter(completion_record::Column::ChoreId.eq(chore_row_id))
            .filter(completion_record::Column::UserId.eq(user_row_id))
            .filter(completion_record::Column::Date.eq(date))
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn completion_history<C: ConnectionTrait>(
        db: &C,
        chore_id: Uuid,
    ) -> Result<Vec<CompletionRecord>, DbErr> {
        let chore_row_id = match ids::chore_id_by_uuid(db, chore_id).await? {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let models = completion_record::Entity::find()
            .filter(completion_record::Column::ChoreId.eq(chore_row_id))
            .order_by_asc(completion_record::Column::CompletedAt)
            .all(db)
            .await?;

        let mut records = Vec::with_capacity(models.len());
        for model in models {
            let completed_by = ids::user_uuid_by_id(db, model.user_id)
                .await?
                .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
            records.push(CompletionRecord {
                date: model.date,
                completed_at: model.completed_at.into(),
                completed_by,
            });
        }
        Ok(records)
    }

    /// All completion dates recorded by a user, one entry per record,
    /// unsorted. Callers aggregate counts per day.
    pub async fn completion_dates_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<String>, DbErr> {
        let user_row_id = match ids::user_id_by_uuid(db, user_id).await? {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let models = completion_record::Entity::find()
            .filter(completion_record::Column::UserId.eq(user_row_id))
            .all(db)
            .await?;

        Ok(models.into_iter().map(|model| model.date).collect())
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

    async fn setup_team_and_user(db: &sea_orm::DatabaseConnection) -> (Team, User) {
        let team = Team::create(
            db,
            &CreateTeam {
                name: "Household".to_string(),
                invite_code: "AB12CD".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let user = User::create(
            db,
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

        (team, user)
    }

    fn weekly_chore(days: Vec<i32>) -> CreateChore {
        CreateChore {
            title: "Take out trash".to_string(),
            description: None,
            frequency: ChoreFrequency::Weekly,
            day_of_week: None,
            days_of_week: Some(days),
            day_of_month: None,
            start_date: None,
            assigned_to: None,
        }
    }

    #[tokio::test]
    async fn create_and_fetch_roundtrip() {
        let db = setup_db().await;
        let (team, user) = setup_team_and_user(&db).await;

        let chore_id = Uuid::new_v4();
        let chore = Chore::create(&db, &weekly_chore(vec![1, 3, 5]), 25, team.id, user.id, chore_id)
            .await
            .unwrap();

        assert_eq!(chore.id, chore_id);
        assert_eq!(chore.points, 25);
        assert_eq!(chore.days_of_week.as_deref(), Some(&[1, 3, 5][..]));
        assert!(!chore.is_completed);

        let listed = Chore::find_by_team_id(&db, team.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, chore_id);
    }

    #[tokio::test]
    async fn completion_record_is_unique_per_day() {
        let db = setup_db().await;
        let (team, user) = setup_team_and_user(&db).await;
        let chore = Chore::create(
            &db,
            &weekly_chore(vec![1]),
            25,
            team.id,
            user.id,
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let now = Utc::now();
        let inserted = Chore::record_completion(&db, chore.id, user.id, "2025-06-02", now)
            .await
            .unwrap();
        assert!(inserted);

        let inserted_again = Chore::record_completion(&db, chore.id, user.id, "2025-06-02", now)
            .await
            .unwrap();
        assert!(!inserted_again);

        let history = Chore::completion_history(&db, chore.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, "2025-06-02");
        assert_eq!(history[0].completed_by, user.id);

        let removed = Chore::remove_completion(&db, chore.id, user.id, "2025-06-02")
            .await
            .unwrap();
        assert!(removed);
        let removed_again = Chore::remove_completion(&db, chore.id, user.id, "2025-06-02")
            .await
            .unwrap();
        assert!(!removed_again);
    }

    #[tokio::test]
    async fn completion_flag_reset_retains_history() {
        let db = setup_db().await;
        let (team, user) = setup_team_and_user(&db).await;
        let chore = Chore::create(
            &db,
            &weekly_chore(vec![1]),
            25,
            team.id,
            user.id,
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let now = Utc::now();
        Chore::record_completion(&db, chore.id, user.id, "2025-06-02", now)
            .await
            .unwrap();
        Chore::mark_completed(&db, chore.id, now).await.unwrap();

        let chore = Chore::find_by_id(&db, chore.id).await.unwrap().unwrap();
        assert!(chore.is_completed);
        assert!(chore.last_completed.is_some());

        Chore::clear_completed(&db, chore.id).await.unwrap();
        let chore = Chore::find_by_id(&db, chore.id).await.unwrap().unwrap();
        assert!(!chore.is_completed);
        assert!(chore.last_completed.is_some());
        assert_eq!(
            Chore::completion_history(&db, chore.id).await.unwrap().len(),
            1
        );
    }
}
