use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub team_id: i64,
    pub total_points: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_completed: i64,
    pub weekly_points: i64,
    pub monthly_points: i64,
    pub last_completed_date: Option<DateTimeUtc>,
    pub weekly_anchor: Option<String>,
    pub monthly_anchor: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
