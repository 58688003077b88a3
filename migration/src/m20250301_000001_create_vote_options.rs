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
                    .table(VoteOptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoteOptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VoteOptions::VoteId).big_integer().not_null())
                    .col(ColumnDef::new(VoteOptions::Label).string().not_null())
                    .col(ColumnDef::new(VoteOptions::Data).json())
                    .col(
                        ColumnDef::new(VoteOptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vote_options_vote_id")
                    .table(VoteOptions::Table)
                    .col(VoteOptions::VoteId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoteOptions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VoteOptions {
    Table,
    Id,
    VoteId,
    Label,
    Data,
    CreatedAt,
}
