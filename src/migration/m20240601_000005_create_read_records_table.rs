use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ReadRecords {
    Table,
    Id,
    UserId,
    PostId,
    ReadAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReadRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReadRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReadRecords::UserId).integer().not_null())
                    .col(ColumnDef::new(ReadRecords::PostId).integer().not_null())
                    .col(
                        ColumnDef::new(ReadRecords::ReadAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_read_records_post_id")
                            .from(ReadRecords::Table, ReadRecords::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per reader per post; repeat reads only touch read_at
        manager
            .create_index(
                Index::create()
                    .name("idx_read_records_unique")
                    .table(ReadRecords::Table)
                    .col(ReadRecords::UserId)
                    .col(ReadRecords::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_read_records_post_id")
                    .table(ReadRecords::Table)
                    .col(ReadRecords::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReadRecords::Table).to_owned())
            .await
    }
}
