//! Mixdown Core - stem mixing and mastering pipeline
//!
//! Decoded stems are mixed with per-channel volume/pan/mute/solo, vocal takes
//! are blended on top, and the result runs through a mastering chain (shelf
//! EQ, compression, normalization, limiting) before being measured, encoded
//! and stored.

pub mod audio_file;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod mastering;
pub mod services;
pub mod storage;
pub mod types;

pub use error::{MixdownError, Result};
pub use types::*;
