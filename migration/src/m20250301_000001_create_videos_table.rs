use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Videos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Videos::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Videos::UserId).uuid().not_null())
                    .col(ColumnDef::new(Videos::Title).string().not_null())
                    .col(ColumnDef::new(Videos::Description).text())
                    .col(ColumnDef::new(Videos::ThumbnailUrl).string())
                    .col(ColumnDef::new(Videos::VideoUrl).string())
                    .col(ColumnDef::new(Videos::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Videos::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_videos_user_id")
                    .table(Videos::Table)
                    .col(Videos::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Videos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Videos {
    Table,
    Id,
    UserId,
    Title,
    Description,
    ThumbnailUrl,
    VideoUrl,
    CreatedAt,
    UpdatedAt,
}
