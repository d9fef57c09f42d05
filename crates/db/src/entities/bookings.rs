//! `SeaORM` Entity for the bookings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BookingStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub offer_id: Uuid,
    pub offerer_id: Uuid,
    pub venue_id: Uuid,
    pub subcategory: Option<String>,
    pub amount: Decimal,
    pub quantity: i32,
    pub status: BookingStatus,
    pub used_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::finance_events::Entity")]
    FinanceEvents,
}

impl Related<super::finance_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinanceEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
