use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Replies {
    Table,
    Id,
    PostId,
    ParentId,
    AuthorId,
    AuthorName,
    AuthorAvatar,
    AuthorRole,
    Content,
    LikeCount,
    IsAuthor,
    Status,
    CreatedAt,
    UpdatedAt,
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
                    .table(Replies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Replies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Replies::PostId).integer().not_null())
                    // NULL means top-level; children of a deleted parent keep
                    // their edge (no cascade on soft delete)
                    .col(ColumnDef::new(Replies::ParentId).integer())
                    .col(ColumnDef::new(Replies::AuthorId).integer().not_null())
                    .col(
                        ColumnDef::new(Replies::AuthorName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Replies::AuthorAvatar).string_len(255))
                    .col(
                        ColumnDef::new(Replies::AuthorRole)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Replies::Content).text().not_null())
                    .col(
                        ColumnDef::new(Replies::LikeCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Replies::IsAuthor)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Replies::Status)
                            .string_len(16)
                            .not_null()
                            .default("published"),
                    )
                    .col(
                        ColumnDef::new(Replies::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Replies::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_replies_post_id")
                            .from(Replies::Table, Replies::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_replies_parent_id")
                            .from(Replies::Table, Replies::ParentId)
                            .to(Replies::Table, Replies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_replies_post_id")
                    .table(Replies::Table)
                    .col(Replies::PostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_replies_parent_id")
                    .table(Replies::Table)
                    .col(Replies::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Replies::Table).to_owned())
            .await
    }
}
