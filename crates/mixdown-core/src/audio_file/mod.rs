//! Audio file I/O
//!
//! - Decode: any container/codec symphonia can probe, to an [`AudioBuffer`]
//! - Encode: WAV (hound) or FLAC (flacenc) at a chosen rate and bit depth
//! - Tags: title/artist/album/year/genre embedded with lofty
//!
//! [`AudioBuffer`]: crate::types::AudioBuffer

mod decode;
mod encode;
mod tags;

pub use decode::{decode_bytes, decode_file, extension_hint};
pub use encode::{encode, EncodeFormat, EncodeTarget};
pub use tags::{write_tags, TrackMetadata};
