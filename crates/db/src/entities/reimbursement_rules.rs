//! `SeaORM` Entity for the reimbursement_rules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RuleScopeKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reimbursement_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub label: String,
    pub scope_kind: RuleScopeKind,
    /// Standard scope only: restricts the rule to one offer subcategory.
    pub subcategory: Option<String>,
    /// CustomOffer scope only.
    pub offer_id: Option<Uuid>,
    /// CustomOfferer scope only.
    pub offerer_id: Option<Uuid>,
    /// Exactly one of rate / fixed_amount is set.
    pub rate: Option<Decimal>,
    pub fixed_amount: Option<Decimal>,
    pub valid_from: Date,
    pub valid_until: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pricings::Entity")]
    Pricings,
}

impl Related<super::pricings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pricings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
