//! Seeds the feature flags with their launch defaults.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SEED_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DELETE FROM feature_flags WHERE name IN ('custom_rules_enabled', 'offerer_bank_fallback');",
        )
        .await?;
        Ok(())
    }
}

const SEED_SQL: &str = r"
INSERT INTO feature_flags (name, enabled) VALUES
    ('custom_rules_enabled', TRUE),
    ('offerer_bank_fallback', FALSE)
ON CONFLICT (name) DO NOTHING;
";
