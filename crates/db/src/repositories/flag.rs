//! Feature flag repository.

use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

use cachet_core::flags::FlagSnapshot;

use crate::entities::feature_flags;

/// Feature flag repository.
#[derive(Debug, Clone)]
pub struct FlagRepository;

impl FlagRepository {
    /// Reads all flags into a frozen snapshot for one batch run.
    ///
    /// Unknown rows are ignored; missing rows keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn snapshot<C: ConnectionTrait>(conn: &C) -> Result<FlagSnapshot, DbErr> {
        let rows = feature_flags::Entity::find().all(conn).await?;

        let mut flags = FlagSnapshot::default();
        for row in rows {
            match row.name.as_str() {
                "custom_rules_enabled" => flags.custom_rules_enabled = row.enabled,
                "offerer_bank_fallback" => flags.offerer_bank_fallback = row.enabled,
                _ => {}
            }
        }
        Ok(flags)
    }
}
