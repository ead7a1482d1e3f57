//! Image decoding for the editor.
//!
//! The source image is decoded once when the user picks a file. Its natural
//! dimensions drive the export canvas size, and its pixels are what the
//! export compositor draws.
//!
//! # Examples
//!
//! ```ignore
//! use retouch_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod raster;
mod types;

pub use raster::decode_image;
pub use types::{DecodeError, DecodedImage, Orientation, CHANNELS};
