// gzsurvey-core/src/tasks/mod.rs

pub mod backfill;
pub mod rate_limit_maintenance;

pub use backfill::{run_brand_branch_backfill, BackfillReport};
pub use rate_limit_maintenance::spawn_rate_limit_purge_task;
