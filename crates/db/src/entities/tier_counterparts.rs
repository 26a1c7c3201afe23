//! `SeaORM` Entity for tier_counterparts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tier_counterparts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tier_id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sponsorship_tiers::Entity",
        from = "Column::TierId",
        to = "super::sponsorship_tiers::Column::Id",
        on_delete = "Cascade"
    )]
    SponsorshipTiers,
}

impl Related<super::sponsorship_tiers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SponsorshipTiers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
