use crate::config::{Alpha, PivotX, PivotY, Texture, Trim};
use crate::geometry::{PointF, Rect, Size};
use image::{Rgba, RgbaImage};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An owned RGBA raster with a filename and logical path. Immutable after
/// load and shared by all sprites that reference it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    path: PathBuf,
    filename: PathBuf,
    rgba: RgbaImage,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, filename: impl Into<PathBuf>, rgba: RgbaImage) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
            rgba,
        }
    }

    /// Builds a source without a directory component, mainly for tests.
    pub fn from_rgba(filename: impl Into<PathBuf>, rgba: RgbaImage) -> Self {
        Self::new(PathBuf::new(), filename, rgba)
    }

    pub fn width(&self) -> i32 {
        self.rgba.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.rgba.height() as i32
    }

    /// The full image extent as a rect at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }
}

/// A request to place a sub-rectangle of a source image onto some sheet of
/// some texture. The upstream parser fills the input attributes; packing
/// fills the derived placement fields.
#[derive(Debug, Clone)]
pub struct Sprite {
    // input attributes
    pub id: String,
    pub index: i32,
    /// Set of (key, value) pairs; one key may carry several values.
    pub tags: Vec<(String, String)>,
    pub texture: Arc<Texture>,
    pub source: Arc<SourceImage>,
    pub source_rect: Rect,
    pub trim: Trim,
    pub trim_threshold: u8,
    pub trim_margin: i32,
    pub pivot_x: PivotX,
    pub pivot_y: PivotY,
    pub pivot_point: PointF,
    pub integral_pivot_point: bool,
    pub common_divisor: Size,
    pub extrude: i32,
    /// Convex polygon in source-rect-local coordinates masking the copied
    /// pixels; empty means the whole rect.
    pub vertices: Vec<PointF>,

    // derived during preparation and packing
    pub trimmed_source_rect: Rect,
    pub common_divisor_margin: Size,
    pub common_divisor_offset: Size,
    pub rect: Rect,
    pub trimmed_rect: Rect,
    pub trimmed_pivot_point: PointF,
    pub rotated: bool,
    pub texture_index: i32,
}

impl Sprite {
    /// A sprite covering the whole source image, with defaults for
    /// everything else.
    pub fn new(index: i32, source: Arc<SourceImage>, texture: Arc<Texture>) -> Self {
        let source_rect = source.bounds();
        Self {
            id: String::new(),
            index,
            tags: Vec::new(),
            texture,
            source,
            source_rect,
            trim: Trim::None,
            trim_threshold: 1,
            trim_margin: 0,
            pivot_x: PivotX::Center,
            pivot_y: PivotY::Middle,
            pivot_point: PointF::default(),
            integral_pivot_point: false,
            common_divisor: Size::new(1, 1),
            extrude: 0,
            vertices: Vec::new(),
            trimmed_source_rect: Rect::default(),
            common_divisor_margin: Size::default(),
            common_divisor_offset: Size::default(),
            rect: Rect::default(),
            trimmed_rect: Rect::default(),
            trimmed_pivot_point: PointF::default(),
            rotated: false,
            texture_index: 0,
        }
    }
}

/// One emitted sheet: output location, final dimensions and the contiguous
/// run of sprites placed on it (a range into the packed sprite sequence).
#[derive(Debug, Clone)]
pub struct PackedTexture {
    pub path: PathBuf,
    pub filename: String,
    pub width: i32,
    pub height: i32,
    pub sprites: Range<usize>,
    pub alpha: Alpha,
    pub colorkey: Rgba<u8>,
}
