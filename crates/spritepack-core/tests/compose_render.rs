use image::{Rgba, RgbaImage};
use spritepack_core::compositing::render_packed_texture;
use spritepack_core::prelude::*;
use std::sync::Arc;

fn solid_source(name: &str, w: u32, h: u32, color: [u8; 4]) -> Arc<SourceImage> {
    Arc::new(SourceImage::from_rgba(
        name,
        RgbaImage::from_pixel(w, h, Rgba(color)),
    ))
}

#[test]
fn renders_sprites_at_their_trimmed_rects() {
    let texture = Arc::new(Texture {
        border_padding: 1,
        ..Default::default()
    });
    let red = solid_source("red.png", 4, 4, [255, 0, 0, 255]);
    let green = solid_source("green.png", 6, 6, [0, 255, 0, 255]);
    let mut sprites = vec![
        Sprite::new(0, red, texture.clone()),
        Sprite::new(1, green, texture.clone()),
    ];
    let packed = pack_sprites(&mut sprites).expect("pack");
    assert_eq!(packed.len(), 1);

    let canvas = render_packed_texture(&Settings::default(), &packed[0], &sprites);
    assert_eq!(canvas.width() as i32, packed[0].width);
    assert_eq!(canvas.height() as i32, packed[0].height);

    // the border ring stays transparent
    assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    for sprite in &sprites {
        let expected = *sprite.source.rgba().get_pixel(0, 0);
        let r = sprite.trimmed_rect;
        assert!(r.x >= 1 && r.y >= 1);
        assert_eq!(*canvas.get_pixel(r.x as u32, r.y as u32), expected);
    }
}

#[test]
fn extrusion_repeats_uncut_edges() {
    let texture = Arc::new(Texture {
        border_padding: 2,
        ..Default::default()
    });
    let red = solid_source("red.png", 4, 4, [255, 0, 0, 255]);
    let mut sprites = vec![Sprite::new(0, red, texture)];
    sprites[0].extrude = 1;
    let packed = pack_sprites(&mut sprites).expect("pack");

    let canvas = render_packed_texture(&Settings::default(), &packed[0], &sprites);
    let r = sprites[0].trimmed_rect;
    // untrimmed sprite: every edge extrudes one pixel outward
    assert_eq!(
        *canvas.get_pixel(r.x as u32 - 1, r.y as u32),
        Rgba([255, 0, 0, 255])
    );
    assert_eq!(
        *canvas.get_pixel(r.x as u32, r.y as u32 - 1),
        Rgba([255, 0, 0, 255])
    );
    assert_eq!(
        *canvas.get_pixel(r.x1() as u32, r.y as u32),
        Rgba([255, 0, 0, 255])
    );
}

#[test]
fn debug_overlay_marks_placements() {
    let texture = Arc::new(Texture::default());
    let red = solid_source("red.png", 4, 4, [255, 0, 0, 255]);
    let mut sprites = vec![Sprite::new(0, red, texture)];
    let packed = pack_sprites(&mut sprites).expect("pack");

    let settings = Settings {
        debug: true,
        ..Default::default()
    };
    let canvas = render_packed_texture(&settings, &packed[0], &sprites);
    // rect and trimmed rect coincide here; the trimmed outline wins
    let r = sprites[0].trimmed_rect;
    assert_eq!(
        *canvas.get_pixel(r.x as u32, r.y as u32),
        Rgba([255, 255, 0, 128])
    );
}

#[test]
fn alpha_policy_is_applied_to_the_sheet() {
    let texture = Arc::new(Texture {
        alpha: Alpha::Clear,
        ..Default::default()
    });
    let red = solid_source("red.png", 4, 4, [255, 0, 0, 255]);
    let mut sprites = vec![Sprite::new(0, red, texture)];
    let packed = pack_sprites(&mut sprites).expect("pack");

    let canvas = render_packed_texture(&Settings::default(), &packed[0], &sprites);
    assert!(canvas.pixels().all(|p| p[3] == 0));
    let r = sprites[0].trimmed_rect;
    assert_eq!(
        *canvas.get_pixel(r.x as u32, r.y as u32),
        Rgba([255, 0, 0, 0])
    );
}
