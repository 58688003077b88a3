// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vote_option_external_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub vote_option_id: i64,
    pub source_url: String,
    pub title: String,
    pub review_count: i32,
    #[sea_orm(column_type = "Double")]
    pub star_rating: f64,
    pub picture_url: String,
    pub picture_local_id: Option<i64>,
    pub raw_payload: Option<Json>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::local_picture_store::Entity",
        from = "Column::PictureLocalId",
        to = "super::local_picture_store::Column::Id",
        on_delete = "SetNull"
    )]
    LocalPicture,
}

impl Related<super::local_picture_store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LocalPicture.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
