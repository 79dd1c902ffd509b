use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpritePackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("sprite '{id}' ({width}x{height}) can not fit in texture ({max_width}x{max_height})")]
    SpriteDoesNotFit {
        id: String,
        width: i32,
        height: i32,
        max_width: i32,
        max_height: i32,
    },

    #[error("not all sprites fit on texture '{texture}': {sheets} sheet(s) needed, {available} filename(s) available")]
    TooManySheets {
        texture: String,
        sheets: usize,
        available: usize,
    },

    #[error("sprite source can not be inspected for trimming")]
    InvalidTrim,

    #[error("rectangle ({width}x{height}) exceeds maximum sheet bounds ({max_width}x{max_height})")]
    PackRectTooLarge {
        width: i32,
        height: i32,
        max_width: i32,
        max_height: i32,
    },
}

pub type Result<T> = std::result::Result<T, SpritePackError>;
