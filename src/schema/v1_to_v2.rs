pub const UPGRADE_1_TO_2_SQL: &str = r#"
--
-- Schema Upgrade: Version 1 → 2
--
-- Adds the "last turned" care timestamp and indexes the specimen sort column
-- so offset pagination stays cheap as collections grow.
--

ALTER TABLE specimen ADD COLUMN last_turning_at INTEGER;

CREATE INDEX IF NOT EXISTS idx_specimen_last_update ON specimen (last_update);
"#;
