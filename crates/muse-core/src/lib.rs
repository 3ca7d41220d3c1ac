#![deny(missing_docs)]
#![doc = "Core types, structured errors and randomness for the MUSE survey engine."]

pub mod errors;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, MuseError};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{Condition, ContentId, ResponseValue};

/// Fixed number of rounds within each task block.
pub const ROUNDS_PER_BLOCK: usize = 3;

/// Substream identifier for the text-headline block.
pub const SUBSTREAM_TEXT: u64 = 1;

/// Substream identifier for the image-caption block.
pub const SUBSTREAM_IMAGES: u64 = 2;
