use sea_orm::entity::prelude::*;

use crate::types::RoutineDifficulty;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "workout_routines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub user_id: i64,
    pub team_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty: RoutineDifficulty,
    pub exercises: Json,
    pub is_template: bool,
    pub last_used: Option<DateTimeUtc>,
    pub times_used: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
