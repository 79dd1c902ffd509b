//! Core library for packing sprites into texture atlas sheets.
//!
//! - Pipeline: `pack_sprites` takes a prepared sprite list and returns
//!   per-sheet packed-texture records; `render_packed_texture` composites a
//!   record into an RGBA image; `describe` builds the description tree.
//! - Packing: multi-sheet MAXRECTS with optional rotation, power-of-two
//!   sizing and deterministic tie-breaks.
//! - Preparation: trimming, divisor alignment and pivot resolution.
//!
//! Quick example:
//! ```ignore
//! use std::sync::Arc;
//! use spritepack_core::prelude::*;
//! # fn main() -> spritepack_core::Result<()> {
//! let texture = Arc::new(Texture { max_width: 1024, max_height: 1024, ..Default::default() });
//! let source = Arc::new(SourceImage::from_rgba("hero.png", image::RgbaImage::new(64, 64)));
//! let mut sprites = vec![Sprite::new(0, source, texture)];
//! let packed = pack_sprites(&mut sprites)?;
//! println!("sheets: {}", packed.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod filename;
pub mod geometry;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod prepare;

pub use config::*;
pub use error::*;
pub use filename::*;
pub use model::*;
pub use pipeline::pack_sprites;

/// Convenience prelude for common types and functions.
pub mod prelude {
    pub use crate::compositing::render_packed_texture;
    pub use crate::config::{Alpha, PivotX, PivotY, Settings, Texture, Trim};
    pub use crate::error::{Result, SpritePackError};
    pub use crate::export::describe;
    pub use crate::filename::FilenameSequence;
    pub use crate::geometry::{Point, PointF, Rect, Size};
    pub use crate::model::{PackedTexture, SourceImage, Sprite};
    pub use crate::pipeline::pack_sprites;
}
