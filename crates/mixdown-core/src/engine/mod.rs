//! Mixing engine
//!
//! Combines decoded stems according to per-channel settings and blends the
//! combined vocal takes on top. Everything here is a pure transform over
//! [`AudioBuffer`](crate::types::AudioBuffer) values.

mod mixer;
mod vocals;

pub use mixer::{mix, MixChannelSetting};
pub use vocals::{combine_vocals, overlay_vocals, VocalTakeSetting};
