use image::{Rgba, RgbaImage};
use spritepack_core::compositing::{bleed_alpha, clear_alpha, make_opaque, premultiply_alpha};

#[test]
fn clear_zeroes_alpha_and_keeps_rgb() {
    let mut img = RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 200]));
    clear_alpha(&mut img);
    for px in img.pixels() {
        assert_eq!(*px, Rgba([10, 20, 30, 0]));
    }
}

#[test]
fn premultiply_leaves_opaque_pixels_unchanged() {
    let mut img = RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 255]));
    premultiply_alpha(&mut img);
    for px in img.pixels() {
        assert_eq!(*px, Rgba([10, 20, 30, 255]));
    }
}

#[test]
fn premultiply_scales_by_alpha() {
    let mut img = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 128]));
    premultiply_alpha(&mut img);
    assert_eq!(*img.get_pixel(0, 0), Rgba([100, 50, 25, 128]));
}

#[test]
fn bleed_fills_rgb_without_touching_alpha() {
    let mut img = RgbaImage::new(3, 1);
    img.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
    bleed_alpha(&mut img);

    assert_eq!(*img.get_pixel(0, 0), Rgba([255, 0, 0, 0]));
    assert_eq!(*img.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*img.get_pixel(2, 0), Rgba([255, 0, 0, 0]));
}

#[test]
fn bleed_reaches_distant_pixels() {
    let mut img = RgbaImage::new(5, 1);
    img.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
    bleed_alpha(&mut img);
    assert_eq!(*img.get_pixel(4, 0), Rgba([0, 255, 0, 0]));
}

#[test]
fn colorkey_pixels_become_transparent() {
    let key = Rgba([255, 0, 255, 255]);
    let mut img = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 0]));
    img.put_pixel(1, 0, key);
    make_opaque(&mut img, key);

    assert_eq!(img.get_pixel(0, 0)[3], 255);
    assert_eq!(img.get_pixel(1, 0)[3], 0);
}
