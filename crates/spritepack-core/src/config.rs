use crate::error::{Result, SpritePackError};
use crate::filename::FilenameSequence;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Trim modes for sprite preparation.
///
/// `Trim` keeps the declared rect size and records the tight opaque bounds;
/// `Crop` shrinks the reported rect to those bounds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trim {
    #[default]
    None,
    Trim,
    Crop,
}

impl FromStr for Trim {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "trim" => Ok(Self::Trim),
            "crop" => Ok(Self::Crop),
            _ => Err(()),
        }
    }
}

/// Alpha post-processing applied to a finished sheet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alpha {
    #[default]
    Keep,
    Clear,
    Bleed,
    Premultiply,
    Colorkey,
}

impl FromStr for Alpha {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "clear" => Ok(Self::Clear),
            "bleed" => Ok(Self::Bleed),
            "premultiply" => Ok(Self::Premultiply),
            "colorkey" => Ok(Self::Colorkey),
            _ => Err(()),
        }
    }
}

/// Horizontal pivot mode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PivotX {
    Left,
    #[default]
    Center,
    Right,
    Custom,
}

impl FromStr for PivotX {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "custom" => Ok(Self::Custom),
            _ => Err(()),
        }
    }
}

/// Vertical pivot mode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PivotY {
    Top,
    #[default]
    Middle,
    Bottom,
    Custom,
}

impl FromStr for PivotY {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            "custom" => Ok(Self::Custom),
            _ => Err(()),
        }
    }
}

/// Target-atlas configuration, shared read-only by many sprites.
///
/// A zero for `width`/`height`/`max_width`/`max_height` means the dimension
/// is unconstrained on that side.
#[derive(Debug, Clone)]
pub struct Texture {
    /// Minimum output width in pixels.
    pub width: i32,
    /// Minimum output height in pixels.
    pub height: i32,
    /// Maximum output width in pixels.
    pub max_width: i32,
    /// Maximum output height in pixels.
    pub max_height: i32,
    /// Round output dimensions up (and maximums down) to powers of two.
    pub power_of_two: bool,
    /// Allow 90 degree clockwise rotation during packing.
    pub allow_rotate: bool,
    /// Pixels of empty margin around the sheet.
    pub border_padding: i32,
    /// Pixels between adjacent sprites.
    pub shape_padding: i32,
    /// Let pixel-identical sprites share one placement.
    pub deduplicate: bool,
    /// Alpha post-processing for finished sheets.
    pub alpha: Alpha,
    /// Color treated as transparent when `alpha` is `Colorkey`.
    pub colorkey: Rgba<u8>,
    /// Sheet filename sequence.
    pub filename: FilenameSequence,
    /// Output directory.
    pub path: PathBuf,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            max_width: 0,
            max_height: 0,
            power_of_two: false,
            allow_rotate: false,
            border_padding: 0,
            shape_padding: 0,
            deduplicate: false,
            alpha: Alpha::Keep,
            colorkey: Rgba([0, 0, 0, 0]),
            filename: FilenameSequence::default(),
            path: PathBuf::new(),
        }
    }
}

impl Texture {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.width < 0
            || self.height < 0
            || self.max_width < 0
            || self.max_height < 0
            || self.border_padding < 0
            || self.shape_padding < 0
        {
            return Err(SpritePackError::InvalidInput(format!(
                "texture '{}' has negative dimensions or padding",
                self.filename.filename()
            )));
        }
        if self.max_width > 0 && self.width > self.max_width {
            return Err(SpritePackError::InvalidInput(format!(
                "texture '{}': width {} exceeds max-width {}",
                self.filename.filename(),
                self.width,
                self.max_width
            )));
        }
        if self.max_height > 0 && self.height > self.max_height {
            return Err(SpritePackError::InvalidInput(format!(
                "texture '{}': height {} exceeds max-height {}",
                self.filename.filename(),
                self.height,
                self.max_height
            )));
        }
        Ok(())
    }
}

/// Run-wide settings supplied by the front end.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Description output file; `None` skips the description.
    pub output_file: Option<PathBuf>,
    /// Directory the description is written into.
    pub output_path: PathBuf,
    /// Optional template used to render the description.
    pub template_file: Option<PathBuf>,
    /// Draw placement overlays onto the output sheets.
    pub debug: bool,
    /// Autocomplete incomplete input definitions (consumed by the
    /// definition parser, carried here for its contract).
    pub autocomplete: bool,
}
