// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use crate::m20250301_000002_create_local_picture_store::LocalPictureStore;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VoteOptionExternalData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoteOptionExternalData::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // One row per vote option; upserts conflict on this column
                    .col(
                        ColumnDef::new(VoteOptionExternalData::VoteOptionId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(VoteOptionExternalData::SourceUrl).text().not_null())
                    .col(ColumnDef::new(VoteOptionExternalData::Title).text().not_null())
                    .col(
                        ColumnDef::new(VoteOptionExternalData::ReviewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VoteOptionExternalData::StarRating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(VoteOptionExternalData::PictureUrl).text().not_null())
                    .col(ColumnDef::new(VoteOptionExternalData::PictureLocalId).big_integer())
                    .col(ColumnDef::new(VoteOptionExternalData::RawPayload).json())
                    .col(
                        ColumnDef::new(VoteOptionExternalData::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_external_data_picture_local")
                            .from(
                                VoteOptionExternalData::Table,
                                VoteOptionExternalData::PictureLocalId,
                            )
                            .to(LocalPictureStore::Table, LocalPictureStore::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoteOptionExternalData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VoteOptionExternalData {
    Table,
    Id,
    VoteOptionId,
    SourceUrl,
    Title,
    ReviewCount,
    StarRating,
    PictureUrl,
    PictureLocalId,
    RawPayload,
    UpdatedAt,
}
