//! The three detectors: stale projects, orphaned data, duplicated config.
//!
//! Detection is side-effect free. Each candidate type implements
//! [`CleanupItem`](crate::envelope::CleanupItem) so the envelope can apply it.

pub mod dedup;
pub mod orphans;
pub mod stale;

pub use dedup::{
    apply_dedup, build_dedup_preview, deduplicate_config, find_local_configs,
    scan_local_configs, DedupOutcome, DedupResult, DedupScan,
};
pub use orphans::{build_orphan_preview, clean_orphan, find_orphans, OrphanCategory, OrphanItem};
pub use stale::{
    build_stale_preview, clean_stale_project, find_stale_projects, partition_stale,
    StaleCandidate, StaleOutcome,
};
