//! `SeaORM` Entity for the bank_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub offerer_id: Uuid,
    pub label: String,
    pub iban: String,
    /// Soft-deleted accounts keep their history but never receive new
    /// cashflows.
    pub deactivated_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::venue_bank_links::Entity")]
    VenueBankLinks,
    #[sea_orm(has_many = "super::cashflows::Entity")]
    Cashflows,
}

impl Related<super::venue_bank_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VenueBankLinks.def()
    }
}

impl Related<super::cashflows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashflows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
