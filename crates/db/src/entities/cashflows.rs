//! `SeaORM` Entity for the cashflows table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CashflowStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cashflows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub batch_id: Uuid,
    pub bank_account_id: Uuid,
    pub amount: Decimal,
    pub status: CashflowStatus,
    /// Set once the cashflow is billed.
    pub invoice_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cashflow_batches::Entity",
        from = "Column::BatchId",
        to = "super::cashflow_batches::Column::Id"
    )]
    CashflowBatches,
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id"
    )]
    BankAccounts,
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
    #[sea_orm(has_many = "super::pricings::Entity")]
    Pricings,
}

impl Related<super::cashflow_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashflowBatches.def()
    }
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::pricings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pricings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
