//! Bank account repository for database operations.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use cachet_core::cashflow::BankDirectory;
use cachet_shared::types::{BankAccountId, OffererId, VenueId};

use crate::entities::{bank_accounts, venue_bank_links};

/// Bank account repository.
#[derive(Debug, Clone)]
pub struct BankAccountRepository;

impl BankAccountRepository {
    /// Creates a bank account for an offerer.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        offerer_id: OffererId,
        label: &str,
        iban: &str,
    ) -> Result<bank_accounts::Model, DbErr> {
        let account = bank_accounts::ActiveModel {
            id: Set(BankAccountId::new().into_inner()),
            offerer_id: Set(offerer_id.into_inner()),
            label: Set(label.to_string()),
            iban: Set(iban.to_string()),
            deactivated_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };
        account.insert(conn).await
    }

    /// Links a venue to a bank account from `valid_from` onward.
    ///
    /// The exclusion constraint rejects a second link overlapping an
    /// existing one for the same venue.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn link_venue<C: ConnectionTrait>(
        conn: &C,
        venue_id: VenueId,
        bank_account_id: BankAccountId,
        valid_from: NaiveDate,
    ) -> Result<venue_bank_links::Model, DbErr> {
        let link = venue_bank_links::ActiveModel {
            id: Set(Uuid::new_v4()),
            venue_id: Set(venue_id.into_inner()),
            bank_account_id: Set(bank_account_id.into_inner()),
            valid_from: Set(valid_from),
            valid_until: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };
        link.insert(conn).await
    }

    /// Materializes the bank directory for a batch run dated `on`.
    ///
    /// Venue links are filtered to those valid on the batch date;
    /// offerer-level accounts (for the fallback flag) take the oldest
    /// active account per offerer so the fallback is stable across runs.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn directory<C: ConnectionTrait>(
        conn: &C,
        on: NaiveDate,
    ) -> Result<BankDirectory, DbErr> {
        let links = venue_bank_links::Entity::find()
            .filter(venue_bank_links::Column::ValidFrom.lte(on))
            .filter(
                Condition::any()
                    .add(venue_bank_links::Column::ValidUntil.is_null())
                    .add(venue_bank_links::Column::ValidUntil.gt(on)),
            )
            .all(conn)
            .await?;

        let venue_accounts: HashMap<VenueId, BankAccountId> = links
            .into_iter()
            .map(|link| {
                (
                    VenueId::from_uuid(link.venue_id),
                    BankAccountId::from_uuid(link.bank_account_id),
                )
            })
            .collect();

        let accounts = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::DeactivatedAt.is_null())
            .order_by_desc(bank_accounts::Column::CreatedAt)
            .all(conn)
            .await?;

        // Later inserts overwrite, so the oldest account per offerer wins.
        let offerer_accounts: HashMap<OffererId, BankAccountId> = accounts
            .into_iter()
            .map(|account| {
                (
                    OffererId::from_uuid(account.offerer_id),
                    BankAccountId::from_uuid(account.id),
                )
            })
            .collect();

        Ok(BankDirectory::new(venue_accounts, offerer_accounts))
    }
}
