use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Likes {
    Table,
    Id,
    UserId,
    TargetId,
    TargetType,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Likes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Likes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Likes::UserId).integer().not_null())
                    .col(ColumnDef::new(Likes::TargetId).integer().not_null())
                    .col(ColumnDef::new(Likes::TargetType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Likes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // The toggle's idempotence rests on this index
        manager
            .create_index(
                Index::create()
                    .name("idx_likes_unique")
                    .table(Likes::Table)
                    .col(Likes::UserId)
                    .col(Likes::TargetId)
                    .col(Likes::TargetType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_likes_target")
                    .table(Likes::Table)
                    .col(Likes::TargetType)
                    .col(Likes::TargetId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Likes::Table).to_owned())
            .await
    }
}
