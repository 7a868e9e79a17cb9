mod v0_to_v1;
mod v1_to_v2;
mod v2_to_v3;

use v0_to_v1::{SEED_0_TO_1_SQL, UPGRADE_0_TO_1_SQL};
use v1_to_v2::UPGRADE_1_TO_2_SQL;
use v2_to_v3::SEED_2_TO_3_SQL;

/// Schema version the code is compiled against. A database whose stored
/// `user_version` is below this gets upgraded at open; one above it is from a
/// newer release and is refused.
pub const SCHEMA_VERSION: i32 = 3;

/// Migration step targeting one schema version:
/// - upgrade_sql: DDL/DML altering the schema (optional)
/// - seed_sql: reference-data insertion/update, run after the upgrade script
///   inside the same transaction (optional)
///
/// At least one of the two must exist for every version step; a gap in the
/// chain is a release defect, detected by the migration engine.
#[derive(Clone, Copy)]
pub struct MigrationStep {
    pub upgrade_sql: Option<&'static str>,
    pub seed_sql: Option<&'static str>,
}

pub const MIGRATION_0_TO_1: MigrationStep = MigrationStep {
    upgrade_sql: Some(UPGRADE_0_TO_1_SQL),
    seed_sql: Some(SEED_0_TO_1_SQL),
};

pub const MIGRATION_1_TO_2: MigrationStep = MigrationStep {
    upgrade_sql: Some(UPGRADE_1_TO_2_SQL),
    seed_sql: None,
};

pub const MIGRATION_2_TO_3: MigrationStep = MigrationStep {
    upgrade_sql: None,
    seed_sql: Some(SEED_2_TO_3_SQL),
};

/// Resolve the step targeting `version` by convention. `None` means the chain
/// has a gap at that version.
pub fn step_for(version: i32) -> Option<MigrationStep> {
    match version {
        1 => Some(MIGRATION_0_TO_1),
        2 => Some(MIGRATION_1_TO_2),
        3 => Some(MIGRATION_2_TO_3),
        _ => None,
    }
}
