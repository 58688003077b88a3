// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LocalPictureStore::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LocalPictureStore::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LocalPictureStore::LocalPath).text().not_null())
                    .col(
                        ColumnDef::new(LocalPictureStore::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LocalPictureStore::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum LocalPictureStore {
    Table,
    Id,
    LocalPath,
    CreatedAt,
}
