use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{chore, exercise, grocery_item, team, user, workout_routine};

pub async fn team_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    team::Entity::find()
        .select_only()
        .column(team::Column::Id)
        .filter(team::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn team_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    team::Entity::find()
        .select_only()
        .column(team::Column::Uuid)
        .filter(team::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn user_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .filter(user::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn user_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    user::Entity::find()
        .select_only()
        .column(user::Column::Uuid)
        .filter(user::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn chore_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    chore::Entity::find()
        .select_only()
        .column(chore::Column::Id)
        .filter(chore::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn chore_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    chore::Entity::find()
        .select_only()
        .column(chore::Column::Uuid)
        .filter(chore::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn grocery_item_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    grocery_item::Entity::find()
        .select_only()
        .column(grocery_item::Column::Id)
        .filter(grocery_item::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn exercise_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    exercise::Entity::find()
        .select_only()
        .column(exercise::Column::Id)
        .filter(exercise::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn workout_routine_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    workout_routine::Entity::find()
        .select_only()
        .column(workout_routine::Column::Id)
        .filter(workout_routine::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
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
    async fn ids_roundtrip_and_uuid_resolution() {
        let db = setup_db().await;

        let team_id = Uuid::new_v4();
        let team = Team::create(
            &db,
            &CreateTeam {
                name: "Household".to_string(),
                invite_code: "AB12CD".to_string(),
            },
            team_id,
        )
        .await
        .unwrap();
        assert_eq!(team.id, team_id);

        let team_row_id = team_id_by_uuid(&db, team_id)
            .await
            .unwrap()
            .expect("team row id");
        assert_eq!(
            team_uuid_by_id(&db, team_row_id).await.unwrap(),
            Some(team_id)
        );

        let user_id = Uuid::new_v4();
        let user = User::create(
            &db,
            &CreateUser {
                name: "Alex".to_string(),
                email: "alex@example.com".to_string(),
                password_hash: "argon2-hash".to_string(),
                team_id,
            },
            user_id,
        )
        .await
        .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.team_id, team_id);

        let user_row_id = user_id_by_uuid(&db, user_id)
            .await
            .unwrap()
            .expect("user row id");
        assert_eq!(
            user_uuid_by_id(&db, user_row_id).await.unwrap(),
            Some(user_id)
        );
    }
}
