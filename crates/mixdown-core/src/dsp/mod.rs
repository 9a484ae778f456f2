//! Buffer-level DSP primitives shared by the mixer and the mastering chain
//!
//! - Gain/pan: dB conversions, volume faders, stereo pan law
//! - Overlay: additive combination aligned at frame 0
//! - Filters: one-pole low/high-pass
//! - Dynamics: static compressor, peak normalizer, uniform limiter
//! - Resample: sinc sample rate conversion for the pipeline edges
//!
//! Every function here takes `&AudioBuffer` and returns a new buffer.

mod dynamics;
mod filter;
mod gain;
mod overlay;
mod resample;

pub use dynamics::{compress, limit, normalize};
pub use filter::{filter_buffer, high_pass, low_pass, FilterMode, OnePoleFilter};
pub use gain::{
    apply_gain_db, apply_pan, apply_volume, db_to_linear, linear_to_db, pan_gains, volume_to_db,
    MIN_VOLUME,
};
pub use overlay::overlay;
pub use resample::resample;
