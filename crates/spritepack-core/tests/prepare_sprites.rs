use image::{Rgba, RgbaImage};
use spritepack_core::geometry::{PointF, Rect, Size};
use spritepack_core::prepare::{complete_sprite_info, prepare_sprites};
use spritepack_core::{PivotX, PivotY, SourceImage, Sprite, SpritePackError, Texture, Trim};
use std::sync::Arc;

fn block_source() -> Arc<SourceImage> {
    // 8x8 transparent with an opaque block spanning (2,3)..(5,6)
    let mut img = RgbaImage::new(8, 8);
    for y in 3..7 {
        for x in 2..6 {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    Arc::new(SourceImage::from_rgba("block.png", img))
}

fn sprite(source: &Arc<SourceImage>) -> Sprite {
    Sprite::new(0, source.clone(), Arc::new(Texture::default()))
}

#[test]
fn trim_finds_opaque_bounds() {
    let source = block_source();
    let mut sprites = vec![sprite(&source)];
    sprites[0].trim = Trim::Trim;
    prepare_sprites(&mut sprites).expect("prepare");
    assert_eq!(sprites[0].trimmed_source_rect, Rect::new(2, 3, 4, 4));
}

#[test]
fn trim_margin_expands_within_source_rect() {
    let source = block_source();
    let mut sprites = vec![sprite(&source)];
    sprites[0].trim = Trim::Trim;
    sprites[0].trim_margin = 2;
    prepare_sprites(&mut sprites).expect("prepare");
    assert_eq!(sprites[0].trimmed_source_rect, Rect::new(0, 1, 8, 7));
}

#[test]
fn trim_threshold_cuts_faint_pixels() {
    let mut img = RgbaImage::new(8, 8);
    img.put_pixel(0, 0, Rgba([255, 255, 255, 5]));
    for y in 3..7 {
        for x in 2..6 {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    let source = Arc::new(SourceImage::from_rgba("faint.png", img));

    let mut sprites = vec![sprite(&source)];
    sprites[0].trim = Trim::Trim;
    sprites[0].trim_threshold = 5;
    prepare_sprites(&mut sprites).expect("prepare");
    assert_eq!(sprites[0].trimmed_source_rect, Rect::new(2, 3, 4, 4));

    sprites[0].trim_threshold = 4;
    prepare_sprites(&mut sprites).expect("prepare");
    assert_eq!(sprites[0].trimmed_source_rect, Rect::new(0, 0, 6, 7));
}

#[test]
fn trim_none_keeps_source_rect() {
    let source = block_source();
    let mut sprites = vec![sprite(&source)];
    prepare_sprites(&mut sprites).expect("prepare");
    assert_eq!(sprites[0].trimmed_source_rect, Rect::new(0, 0, 8, 8));
}

#[test]
fn fully_transparent_sprite_trims_to_zero_area() {
    let img = RgbaImage::new(8, 8);
    let source = Arc::new(SourceImage::from_rgba("empty.png", img));
    let mut sprites = vec![sprite(&source)];
    sprites[0].trim = Trim::Trim;
    prepare_sprites(&mut sprites).expect("prepare");
    assert_eq!(sprites[0].trimmed_source_rect, Rect::new(0, 0, 0, 0));
    assert_eq!(sprites[0].common_divisor_margin, Size::new(0, 0));
}

#[test]
fn divisor_margins_and_offsets() {
    let img = RgbaImage::from_pixel(5, 3, Rgba([255, 0, 0, 255]));
    let source = Arc::new(SourceImage::from_rgba("tile.png", img));
    let mut sprites = vec![sprite(&source)];
    sprites[0].common_divisor = Size::new(4, 4);
    prepare_sprites(&mut sprites).expect("prepare");
    assert_eq!(sprites[0].common_divisor_margin, Size::new(3, 1));
    assert_eq!(sprites[0].common_divisor_offset, Size::new(1, 0));
}

#[test]
fn preparation_is_idempotent() {
    let source = block_source();
    let mut sprites = vec![sprite(&source)];
    sprites[0].trim = Trim::Trim;
    sprites[0].trim_margin = 1;
    sprites[0].common_divisor = Size::new(8, 8);
    prepare_sprites(&mut sprites).expect("prepare");
    let first = (
        sprites[0].trimmed_source_rect,
        sprites[0].common_divisor_margin,
        sprites[0].common_divisor_offset,
    );
    prepare_sprites(&mut sprites).expect("prepare");
    let second = (
        sprites[0].trimmed_source_rect,
        sprites[0].common_divisor_margin,
        sprites[0].common_divisor_offset,
    );
    assert_eq!(first, second);
}

#[test]
fn trim_outside_source_bounds_is_invalid() {
    let source = block_source();
    let mut sprites = vec![sprite(&source)];
    sprites[0].trim = Trim::Trim;
    sprites[0].source_rect = Rect::new(0, 0, 20, 20);
    let err = prepare_sprites(&mut sprites).unwrap_err();
    assert!(matches!(err, SpritePackError::InvalidTrim));
}

#[test]
fn post_pack_positions_untrimmed_rect() {
    let source = block_source();
    let mut sprites = vec![sprite(&source)];
    sprites[0].trim = Trim::Trim;
    prepare_sprites(&mut sprites).expect("prepare");

    // pretend the packer placed the trimmed content at (10, 12)
    sprites[0].trimmed_rect = Rect::new(10, 12, 4, 4);
    complete_sprite_info(&mut sprites);

    assert_eq!(sprites[0].rect, Rect::new(8, 9, 8, 8));
    assert_eq!(sprites[0].pivot_point, PointF::new(4.0, 4.0));
    assert_eq!(sprites[0].trimmed_pivot_point, PointF::new(2.0, 1.0));
}

#[test]
fn post_pack_crop_uses_trimmed_rect() {
    let source = block_source();
    let mut sprites = vec![sprite(&source)];
    sprites[0].trim = Trim::Crop;
    prepare_sprites(&mut sprites).expect("prepare");

    sprites[0].trimmed_rect = Rect::new(10, 12, 4, 4);
    complete_sprite_info(&mut sprites);

    assert_eq!(sprites[0].rect, Rect::new(10, 12, 4, 4));
    assert_eq!(sprites[0].pivot_point, PointF::new(2.0, 2.0));
}

#[test]
fn custom_pivot_keeps_value_and_floors_when_integral() {
    let source = block_source();
    let mut sprites = vec![sprite(&source)];
    sprites[0].pivot_x = PivotX::Custom;
    sprites[0].pivot_y = PivotY::Custom;
    sprites[0].pivot_point = PointF::new(1.7, 2.5);
    prepare_sprites(&mut sprites).expect("prepare");
    sprites[0].trimmed_rect = Rect::new(0, 0, 8, 8);
    complete_sprite_info(&mut sprites);
    assert_eq!(sprites[0].pivot_point, PointF::new(1.7, 2.5));

    sprites[0].integral_pivot_point = true;
    complete_sprite_info(&mut sprites);
    assert_eq!(sprites[0].pivot_point, PointF::new(1.0, 2.0));
}
