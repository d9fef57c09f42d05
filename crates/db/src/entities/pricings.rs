//! `SeaORM` Entity for the pricings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PricingStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pricings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub booking_id: Uuid,
    pub venue_id: Uuid,
    pub rule_id: Uuid,
    pub amount: Decimal,
    pub pricing_date: Date,
    pub status: PricingStatus,
    /// Set when this pricing supersedes a cancelled one.
    pub parent_pricing_id: Option<Uuid>,
    /// Set when the pricing is picked up by a cashflow batch.
    pub cashflow_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::finance_events::Entity",
        from = "Column::EventId",
        to = "super::finance_events::Column::Id"
    )]
    FinanceEvents,
    #[sea_orm(
        belongs_to = "super::reimbursement_rules::Entity",
        from = "Column::RuleId",
        to = "super::reimbursement_rules::Column::Id"
    )]
    ReimbursementRules,
    #[sea_orm(
        belongs_to = "super::cashflows::Entity",
        from = "Column::CashflowId",
        to = "super::cashflows::Column::Id"
    )]
    Cashflows,
}

impl Related<super::finance_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinanceEvents.def()
    }
}

impl Related<super::reimbursement_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReimbursementRules.def()
    }
}

impl Related<super::cashflows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashflows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
