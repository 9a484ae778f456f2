//! Mastering chain, built-in profiles and post-master metrics

mod chain;
mod metrics;
mod profile;

pub use chain::{master, master_with_metrics, EQ_HIGH_CUTOFF_HZ, EQ_LOW_CUTOFF_HZ};
pub use metrics::{loudness_lufs, peak_db, MasterMetrics, MasterResult, SILENCE_LUFS};
pub use profile::{MasteringProfile, ProfileName};
