use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Teams::Table)
                    .col(pk_id_col(manager, Teams::Id))
                    .col(uuid_col(Teams::Uuid))
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(ColumnDef::new(Teams::InviteCode).string_len(16).not_null())
                    .col(fk_id_nullable_col(manager, Teams::CreatedBy))
                    .col(timestamp_col(Teams::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_teams_uuid")
                    .table(Teams::Table)
                    .col(Teams::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_teams_invite_code")
                    .table(Teams::Table)
                    .col(Teams::InviteCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(uuid_col(Users::Uuid))
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(fk_id_col(manager, Users::TeamId))
                    .col(
                        ColumnDef::new(Users::TotalPoints)
                            .big_integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Users::Level)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Users::CurrentStreak)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Users::LongestStreak)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Users::TotalCompleted)
                            .big_integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Users::WeeklyPoints)
                            .big_integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Users::MonthlyPoints)
                            .big_integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(ColumnDef::new(Users::LastCompletedDate).timestamp())
                    .col(ColumnDef::new(Users::WeeklyAnchor).string_len(16))
                    .col(ColumnDef::new(Users::MonthlyAnchor).string_len(16))
                    .col(timestamp_col(Users::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_team_id")
                            .from(Users::Table, Users::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_uuid")
                    .table(Users::Table)
                    .col(Users::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_team_id")
                    .table(Users::Table)
                    .col(Users::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(UserBadges::Table)
                    .col(pk_id_col(manager, UserBadges::Id))
                    .col(fk_id_col(manager, UserBadges::UserId))
                    .col(ColumnDef::new(UserBadges::BadgeId).string_len(64).not_null())
                    .col(ColumnDef::new(UserBadges::Name).string().not_null())
                    .col(ColumnDef::new(UserBadges::Description).string().not_null())
                    .col(ColumnDef::new(UserBadges::Icon).string_len(16).not_null())
                    .col(ColumnDef::new(UserBadges::Tier).string_len(16).not_null())
                    .col(timestamp_col(UserBadges::EarnedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_badges_user_id")
                            .from(UserBadges::Table, UserBadges::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_user_badges_user_badge_unique")
                    .table(UserBadges::Table)
                    .col(UserBadges::UserId)
                    .col(UserBadges::BadgeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Chores::Table)
                    .col(pk_id_col(manager, Chores::Id))
                    .col(uuid_col(Chores::Uuid))
                    .col(fk_id_col(manager, Chores::TeamId))
                    .col(fk_id_col(manager, Chores::CreatedBy))
                    .col(fk_id_nullable_col(manager, Chores::AssignedTo))
                    .col(ColumnDef::new(Chores::Title).string().not_null())
                    .col(ColumnDef::new(Chores::Description).text())
                    .col(
                        ColumnDef::new(Chores::Frequency)
                            .string_len(16)
                            .not_null()
                            .default(Expr::val("daily")),
                    )
                    .col(ColumnDef::new(Chores::DayOfWeek).integer())
                    .col(ColumnDef::new(Chores::DaysOfWeek).json())
                    .col(ColumnDef::new(Chores::DayOfMonth).integer())
                    .col(ColumnDef::new(Chores::StartDate).date())
                    .col(
                        ColumnDef::new(Chores::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(ColumnDef::new(Chores::LastCompleted).timestamp())
                    .col(ColumnDef::new(Chores::Points).big_integer().not_null())
                    .col(
                        ColumnDef::new(Chores::Position)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(timestamp_col(Chores::CreatedAt))
                    .col(timestamp_col(Chores::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chores_team_id")
                            .from(Chores::Table, Chores::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chores_created_by")
                            .from(Chores::Table, Chores::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_chores_uuid")
                    .table(Chores::Table)
                    .col(Chores::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_chores_team_id")
                    .table(Chores::Table)
                    .col(Chores::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(CompletionRecords::Table)
                    .col(pk_id_col(manager, CompletionRecords::Id))
                    .col(fk_id_col(manager, CompletionRecords::ChoreId))
                    .col(fk_id_col(manager, CompletionRecords::UserId))
                    .col(ColumnDef::new(CompletionRecords::Date).string_len(10).not_null())
                    .col(timestamp_col(CompletionRecords::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_completion_records_chore_id")
                            .from(CompletionRecords::Table, CompletionRecords::ChoreId)
                            .to(Chores::Table, Chores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_completion_records_user_id")
                            .from(CompletionRecords::Table, CompletionRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_completion_records_chore_id")
                    .table(CompletionRecords::Table)
                    .col(CompletionRecords::ChoreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_completion_records_user_date")
                    .table(CompletionRecords::Table)
                    .col(CompletionRecords::UserId)
                    .col(CompletionRecords::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(GroceryItems::Table)
                    .col(pk_id_col(manager, GroceryItems::Id))
                    .col(uuid_col(GroceryItems::Uuid))
                    .col(fk_id_col(manager, GroceryItems::TeamId))
                    .col(ColumnDef::new(GroceryItems::Name).string().not_null())
                    .col(ColumnDef::new(GroceryItems::Quantity).string())
                    .col(ColumnDef::new(GroceryItems::Category).string())
                    .col(
                        ColumnDef::new(GroceryItems::IsPurchased)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(fk_id_col(manager, GroceryItems::AddedBy))
                    .col(fk_id_nullable_col(manager, GroceryItems::PurchasedBy))
                    .col(timestamp_col(GroceryItems::CreatedAt))
                    .col(timestamp_col(GroceryItems::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_grocery_items_team_id")
                            .from(GroceryItems::Table, GroceryItems::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_grocery_items_uuid")
                    .table(GroceryItems::Table)
                    .col(GroceryItems::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_grocery_items_team_id")
                    .table(GroceryItems::Table)
                    .col(GroceryItems::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Exercises::Table)
                    .col(pk_id_col(manager, Exercises::Id))
                    .col(uuid_col(Exercises::Uuid))
                    .col(fk_id_col(manager, Exercises::UserId))
                    .col(fk_id_col(manager, Exercises::TeamId))
                    .col(ColumnDef::new(Exercises::Name).string().not_null())
                    .col(
                        ColumnDef::new(Exercises::Sets)
                            .integer()
                            .not_null()
                            .default(Expr::val(1)),
                    )
                    .col(
                        ColumnDef::new(Exercises::Reps)
                            .integer()
                            .not_null()
                            .default(Expr::val(1)),
                    )
                    .col(ColumnDef::new(Exercises::Duration).integer())
                    .col(ColumnDef::new(Exercises::Notes).text())
                    .col(timestamp_col(Exercises::CompletedAt))
                    .col(timestamp_col(Exercises::CreatedAt))
                    .col(timestamp_col(Exercises::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exercises_user_id")
                            .from(Exercises::Table, Exercises::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_exercises_uuid")
                    .table(Exercises::Table)
                    .col(Exercises::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_exercises_user_completed_at")
                    .table(Exercises::Table)
                    .col(Exercises::UserId)
                    .col(Exercises::CompletedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(WorkoutRoutines::Table)
                    .col(pk_id_col(manager, WorkoutRoutines::Id))
                    .col(uuid_col(WorkoutRoutines::Uuid))
                    .col(fk_id_col(manager, WorkoutRoutines::UserId))
                    .col(fk_id_col(manager, WorkoutRoutines::TeamId))
                    .col(ColumnDef::new(WorkoutRoutines::Name).string().not_null())
                    .col(ColumnDef::new(WorkoutRoutines::Description).text())
                    .col(ColumnDef::new(WorkoutRoutines::Category).string().not_null())
                    .col(
                        ColumnDef::new(WorkoutRoutines::Difficulty)
                            .string_len(16)
                            .not_null()
                            .default(Expr::val("intermediate")),
                    )
                    .col(ColumnDef::new(WorkoutRoutines::Exercises).json().not_null())
                    .col(
                        ColumnDef::new(WorkoutRoutines::IsTemplate)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(ColumnDef::new(WorkoutRoutines::LastUsed).timestamp())
                    .col(
                        ColumnDef::new(WorkoutRoutines::TimesUsed)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(timestamp_col(WorkoutRoutines::CreatedAt))
                    .col(timestamp_col(WorkoutRoutines::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workout_routines_user_id")
                            .from(WorkoutRoutines::Table, WorkoutRoutines::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_workout_routines_uuid")
                    .table(WorkoutRoutines::Table)
                    .col(WorkoutRoutines::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_workout_routines_user_id")
                    .table(WorkoutRoutines::Table)
                    .col(WorkoutRoutines::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkoutRoutines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exercises::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroceryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompletionRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Chores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserBadges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn fk_id_nullable_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    Uuid,
    Name,
    InviteCode,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    Name,
    Email,
    PasswordHash,
    TeamId,
    TotalPoints,
    Level,
    CurrentStreak,
    LongestStreak,
    TotalCompleted,
    WeeklyPoints,
    MonthlyPoints,
    LastCompletedDate,
    WeeklyAnchor,
    MonthlyAnchor,
    CreatedAt,
}

#[derive(Iden)]
enum UserBadges {
    Table,
    Id,
    UserId,
    BadgeId,
    Name,
    Description,
    Icon,
    Tier,
    EarnedAt,
}

#[derive(Iden)]
enum Chores {
    Table,
    Id,
    Uuid,
    TeamId,
    CreatedBy,
    AssignedTo,
    Title,
    Description,
    Frequency,
    DayOfWeek,
    DaysOfWeek,
    DayOfMonth,
    StartDate,
    IsCompleted,
    LastCompleted,
    Points,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CompletionRecords {
    Table,
    Id,
    ChoreId,
    UserId,
    Date,
    CompletedAt,
}

#[derive(Iden)]
enum GroceryItems {
    Table,
    Id,
    Uuid,
    TeamId,
    Name,
    Quantity,
    Category,
    IsPurchased,
    AddedBy,
    PurchasedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Exercises {
    Table,
    Id,
    Uuid,
    UserId,
    TeamId,
    Name,
    Sets,
    Reps,
    Duration,
    Notes,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WorkoutRoutines {
    Table,
    Id,
    Uuid,
    UserId,
    TeamId,
    Name,
    Description,
    Category,
    Difficulty,
    Exercises,
    IsTemplate,
    LastUsed,
    TimesUsed,
    CreatedAt,
    UpdatedAt,
}
