use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::{user, user_badge},
    models::ids,
    types::BadgeTier,
};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("User not found")]
    UserNotFound,
    #[error("An account with this email already exists")]
    EmailTaken,
}

/// A badge copied into the user's earned list. Catalog fields are stored
/// alongside the id so earned badges survive catalog edits unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub tier: BadgeTier,
    #[ts(type = "Date")]
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UserStats {
    pub total_points: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_completed: i64,
    pub weekly_points: i64,
    pub monthly_points: i64,
    #[ts(type = "Date | null")]
    pub last_completed_date: Option<DateTime<Utc>>,
    pub weekly_anchor: Option<String>,
    pub monthly_anchor: Option<String>,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub team_id: Uuid,
    pub stats: UserStats,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub team_id: Uuid,
}

impl User {
    async fn from_model<C: ConnectionTrait>(db: &C, model: user::Model) -> Result<Self, DbErr> {
        let team_id = ids::team_uuid_by_id(db, model.team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;

        let badges = user_badge::Entity::find()
            .filter(user_badge::Column::UserId.eq(model.id))
            .order_by_asc(user_badge::Column::EarnedAt)
            .all(db)
            .await?
            .into_iter()
            .map(|badge| Badge {
                id: badge.badge_id,
                name: badge.name,
                description: badge.description,
                icon: badge.icon,
                tier: badge.tier,
                earned_at: badge.earned_at.into(),
            })
            .collect();

        Ok(Self {
            id: model.uuid,
            name: model.name,
            email: model.email,
            team_id,
            stats: UserStats {
                total_points: model.total_points,
                level: model.level,
                current_streak: model.current_streak,
                longest_streak: model.longest_streak,
                total_completed: model.total_completed,
                weekly_points: model.weekly_points,
                monthly_points: model.monthly_points,
                last_completed_date: model.last_completed_date.map(Into::into),
                weekly_anchor: model.weekly_anchor,
                monthly_anchor: model.monthly_anchor,
                badges,
            },
            created_at: model.created_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateUser,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        let team_row_id = ids::team_id_by_uuid(db, data.team_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;

        let active = user::ActiveModel {
            uuid: Set(user_id),
            name: Set(data.name.clone()),
            email: Set(data.email.to_lowercase()),
            password_hash: Set(data.password_hash.clone()),
            team_id: Set(team_row_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = match active.insert(db).await {
            Ok(model) => model,
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(UserError::EmailTaken);
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self::from_model(db, model).await?)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Returns the user together with the stored password hash, for login.
    pub async fn credentials_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<(Self, String)>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(db)
            .await?;

        match record {
            Some(model) => {
                let password_hash = model.password_hash.clone();
                Ok(Some((Self::from_model(db, model).await?, password_hash)))
            }
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

        let models = user::Entity::find()
            .filter(user::Column::TeamId.eq(team_row_id))
            .order_by_asc(user::Column::CreatedAt)
            .all(db)
            .await?;

        let mut users = Vec::with_capacity(models.len());
        for model in models {
            users.push(Self::from_model(db, model).await?);
        }
        Ok(users)
    }

    pub async fn count_by_team_id<C: ConnectionTrait>(
        db: &C,
        team_id: Uuid,
    ) -> Result<i64, DbErr> {
        let team_row_id = match ids::team_id_by_uuid(db, team_id).await? {
            Some(id) => id,
            None => return Ok(0),
        };

        let count = user::Entity::find()
            .filter(user::Column::TeamId.eq(team_row_id))
            .count(db)
            .await?;
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    /// Persists the scalar stat columns. Badges are written separately via
    /// [`User::add_badge`].
    pub async fn update_stats<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        stats: &UserStats,
    ) -> Result<(), DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(user_id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let mut active: user::ActiveModel = record.into();
        active.total_points = Set(stats.total_points);
        active.level = Set(stats.level);
        active.current_streak = Set(stats.current_streak);
        active.longest_streak = Set(stats.longest_streak);
        active.total_completed = Set(stats.total_completed);
        active.weekly_points = Set(stats.weekly_points);
        active.monthly_points = Set(stats.monthly_points);
        active.last_completed_date = Set(stats.last_completed_date.map(Into::into));
        active.weekly_anchor = Set(stats.weekly_anchor.clone());
        active.monthly_anchor = Set(stats.monthly_anchor.clone());
        active.update(db).await?;
        Ok(())
    }

    /// Inserts an earned badge. Returns false when the badge was already
    /// present (unique index on user + badge id).
    pub async fn add_badge<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        badge: &Badge,
    ) -> Result<bool, DbErr> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let active = user_badge::ActiveModel {
            user_id: Set(user_row_id),
            badge_id: Set(badge.id.clone()),
            name: Set(badge.name.clone()),
            description: Set(badge.description.clone()),
            icon: Set(badge.icon.clone()),
            tier: Set(badge.tier),
            earned_at: Set(badge.earned_at.into()),
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

    /// Zeroes weekly/monthly accumulators whose anchor label is stale.
    /// Returns how many rows were reset per accumulator.
    pub async fn rollover_accumulators<C: ConnectionTrait>(
        db: &C,
        weekly_anchor: &str,
        monthly_anchor: &str,
    ) -> Result<(u64, u64), DbErr> {
        let weekly = user::Entity::update_many()
            .col_expr(user::Column::WeeklyPoints, Expr::value(0i64))
            .col_expr(user::Column::WeeklyAnchor, Expr::value(weekly_anchor))
            .filter(
                Condition::any()
                    .add(user::Column::WeeklyAnchor.is_null())
                    .add(user::Column::WeeklyAnchor.ne(weekly_anchor)),
            )
            .exec(db)
            .await?;

        let monthly = user::Entity::update_many()
            .col_expr(user::Column::MonthlyPoints, Expr::value(0i64))
            .col_expr(user::Column::MonthlyAnchor, Expr::value(monthly_anchor))
            .filter(
                Condition::any()
                    .add(user::Column::MonthlyAnchor.is_null())
                    .add(user::Column::MonthlyAnchor.ne(monthly_anchor)),
            )
            .exec(db)
            .await?;

        Ok((weekly.rows_affected, monthly.rows_affected))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use crate::models::team::{CreateTeam, Team};

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn setup_user(db: &sea_orm::DatabaseConnection, email: &str) -> User {
        let team = Team::create(
            db,
            &CreateTeam {
                name: "Household".to_string(),
                invite_code: Uuid::new_v4().to_string()[..6].to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        User::create(
            db,
            &CreateUser {
                name: "Alex".to_string(),
                email: email.to_string(),
                password_hash: "argon2-hash".to_string(),
                team_id: team.id,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = setup_db().await;
        let user = setup_user(&db, "Alex@Example.com").await;
        assert_eq!(user.email, "alex@example.com");

        let err = User::create(
            &db,
            &CreateUser {
                name: "Other".to_string(),
                email: "alex@example.com".to_string(),
                password_hash: "argon2-hash".to_string(),
                team_id: user.team_id,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, UserError::EmailTaken));
    }

    #[tokio::test]
    async fn stats_roundtrip_and_badge_dedup() {
        let db = setup_db().await;
        let user = setup_user(&db, "alex@example.com").await;
        assert_eq!(user.stats.total_points, 0);
        assert_eq!(user.stats.level, 0);

        let mut stats = user.stats.clone();
        stats.total_points = 120;
        stats.level = 1;
        stats.total_completed = 3;
        User::update_stats(&db, user.id, &stats).await.unwrap();

        let badge = Badge {
            id: "first_chore".to_string(),
            name: "First Step".to_string(),
            description: "Complete your first chore".to_string(),
            icon: "🎯".to_string(),
            tier: BadgeTier::Bronze,
            earned_at: Utc::now(),
        };
        assert!(User::add_badge(&db, user.id, &badge).await.unwrap());
        assert!(!User::add_badge(&db, user.id, &badge).await.unwrap());

        let reloaded = User::find_by_id(&db, user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.stats.total_points, 120);
        assert_eq!(reloaded.stats.badges.len(), 1);
        assert_eq!(reloaded.stats.badges[0].id, "first_chore");
    }

    #[tokio::test]
    async fn stale_accumulators_are_reset() {
        let db = setup_db().await;
        let user = setup_user(&db, "alex@example.com").await;

        let mut stats = user.stats.clone();
        stats.weekly_points = 50;
        stats.monthly_points = 75;
        stats.weekly_anchor = Some("2025-W01".to_string());
        stats.monthly_anchor = Some("2025-01".to_string());
        User::update_stats(&db, user.id, &stats).await.unwrap();

        let (weekly, monthly) = User::rollover_accumulators(&db, "2025-W02", "2025-02")
            .await
            .unwrap();
        assert_eq!(weekly, 1);
        assert_eq!(monthly, 1);

        let reloaded = User::find_by_id(&db, user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.stats.weekly_points, 0);
        assert_eq!(reloaded.stats.monthly_points, 0);
        assert_eq!(reloaded.stats.weekly_anchor.as_deref(), Some("2025-W02"));

        // A second pass with the same labels is a no-op.
        let (weekly, monthly) = User::rollover_accumulators(&db, "2025-W02", "2025-02")
            .await
            .unwrap();
        assert_eq!(weekly, 0);
        assert_eq!(monthly, 0);
    }
}
