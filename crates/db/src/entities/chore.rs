use sea_orm::entity::prelude::*;

use crate::types::ChoreFrequency;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub team_id: i64,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub frequency: ChoreFrequency,
    pub day_of_week: Option<i32>,
    pub days_of_week: Option<Json>,
    pub day_of_month: Option<i32>,
    pub start_date: Option<Date>,
    pub is_completed: bool,
    pub last_completed: Option<DateTimeUtc>,
    pub points: i64,
    pub position: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
