use image::{Rgba, RgbaImage};
use spritepack_core::compositing::{
    copy_rect, copy_rect_rotated_cw, draw_line, draw_rect, extrude_rect, get_used_bounds,
    is_identical,
};
use spritepack_core::geometry::{expand, PointF, Rect};

fn gradient(w: u32, h: u32) -> RgbaImage {
    let mut img = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            img.put_pixel(x, y, Rgba([x as u8 * 10, y as u8 * 10, 0, 255]));
        }
    }
    img
}

#[test]
fn copy_rect_copies_a_sub_rect() {
    let src = gradient(4, 4);
    let mut dst = RgbaImage::new(4, 4);
    copy_rect(&src, Rect::new(1, 1, 2, 2), &mut dst, 0, 0, None);
    assert_eq!(dst.get_pixel(0, 0), src.get_pixel(1, 1));
    assert_eq!(dst.get_pixel(1, 1), src.get_pixel(2, 2));
    assert_eq!(*dst.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
}

#[test]
fn copy_rect_clips_both_sides() {
    let src = gradient(4, 4);
    let mut dst = RgbaImage::new(4, 4);
    // negative destination clips the first row/column
    copy_rect(&src, Rect::new(0, 0, 4, 4), &mut dst, -1, -1, None);
    assert_eq!(dst.get_pixel(0, 0), src.get_pixel(1, 1));
    // a source rect beyond the image clips silently
    let mut dst = RgbaImage::new(12, 12);
    copy_rect(&src, Rect::new(0, 0, 10, 10), &mut dst, 0, 0, None);
    assert_eq!(dst.get_pixel(3, 3), src.get_pixel(3, 3));
    assert_eq!(*dst.get_pixel(5, 5), Rgba([0, 0, 0, 0]));
}

#[test]
fn rotated_copy_maps_clockwise() {
    let src = gradient(3, 2);
    let mut dst = RgbaImage::new(2, 3);
    copy_rect_rotated_cw(&src, Rect::new(0, 0, 3, 2), &mut dst, 0, 0, None);
    // the left source column becomes the top destination row, reversed
    assert_eq!(dst.get_pixel(0, 0), src.get_pixel(0, 1));
    assert_eq!(dst.get_pixel(1, 0), src.get_pixel(0, 0));
    assert_eq!(dst.get_pixel(0, 1), src.get_pixel(1, 1));
    assert_eq!(dst.get_pixel(1, 1), src.get_pixel(1, 0));
    assert_eq!(dst.get_pixel(0, 2), src.get_pixel(2, 1));
    assert_eq!(dst.get_pixel(1, 2), src.get_pixel(2, 0));
}

#[test]
fn polygon_mask_limits_the_copy() {
    let src = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let mut dst = RgbaImage::new(4, 4);
    let triangle = [
        PointF::new(0.0, 0.0),
        PointF::new(4.0, 0.0),
        PointF::new(0.0, 4.0),
    ];
    copy_rect(&src, Rect::new(0, 0, 4, 4), &mut dst, 0, 0, Some(&triangle));
    assert_eq!(*dst.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    assert_eq!(*dst.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
    assert_eq!(*dst.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
    assert_eq!(*dst.get_pixel(3, 3), Rgba([0, 0, 0, 0]));
}

#[test]
fn degenerate_polygon_copies_nothing() {
    let src = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let mut dst = RgbaImage::new(4, 4);
    let line = [PointF::new(0.0, 0.0), PointF::new(4.0, 0.0)];
    copy_rect(&src, Rect::new(0, 0, 4, 4), &mut dst, 0, 0, Some(&line));
    assert!(dst.pixels().all(|p| p[3] == 0));
}

#[test]
fn used_bounds_and_identity() {
    let mut img = RgbaImage::new(8, 8);
    for y in 3..7 {
        for x in 2..6 {
            img.put_pixel(x, y, Rgba([9, 9, 9, 255]));
        }
    }
    assert_eq!(
        get_used_bounds(&img, Rect::new(0, 0, 8, 8), 0),
        Rect::new(2, 3, 4, 4)
    );
    // everything below threshold collapses to a zero-area rect at the origin
    assert_eq!(
        get_used_bounds(&img, Rect::new(0, 0, 2, 2), 0),
        Rect::new(0, 0, 0, 0)
    );

    let other = img.clone();
    assert!(is_identical(
        &img,
        Rect::new(2, 3, 4, 4),
        &other,
        Rect::new(2, 3, 4, 4)
    ));
    assert!(!is_identical(
        &img,
        Rect::new(2, 3, 4, 4),
        &other,
        Rect::new(2, 3, 4, 3)
    ));
    assert!(!is_identical(
        &img,
        Rect::new(2, 3, 4, 4),
        &other,
        Rect::new(1, 3, 4, 4)
    ));
}

#[test]
fn extrude_copies_edges_outward() {
    let mut img = RgbaImage::new(6, 6);
    let red = Rgba([255, 0, 0, 255]);
    for y in 2..4 {
        for x in 2..4 {
            img.put_pixel(x, y, red);
        }
    }
    let rect = expand(Rect::new(2, 2, 2, 2), 1);
    extrude_rect(&mut img, rect, true, true, true, true);

    assert_eq!(*img.get_pixel(2, 1), red);
    assert_eq!(*img.get_pixel(1, 2), red);
    assert_eq!(*img.get_pixel(1, 1), red);
    assert_eq!(*img.get_pixel(4, 4), red);
    assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
}

#[test]
fn extrude_skips_disabled_sides() {
    let mut img = RgbaImage::new(6, 6);
    let red = Rgba([255, 0, 0, 255]);
    for y in 2..4 {
        for x in 2..4 {
            img.put_pixel(x, y, red);
        }
    }
    let rect = expand(Rect::new(2, 2, 2, 2), 1);
    extrude_rect(&mut img, rect, false, true, false, false);

    assert_eq!(*img.get_pixel(2, 1), red);
    assert_eq!(*img.get_pixel(1, 2), Rgba([0, 0, 0, 0]));
    assert_eq!(*img.get_pixel(2, 4), Rgba([0, 0, 0, 0]));
}

#[test]
fn debug_strokes_stay_in_bounds() {
    let mut img = RgbaImage::new(8, 8);
    let color = Rgba([255, 0, 255, 128]);
    draw_rect(&mut img, Rect::new(2, 2, 4, 4), color);
    assert_eq!(*img.get_pixel(2, 2), color);
    assert_eq!(*img.get_pixel(5, 5), color);
    assert_eq!(*img.get_pixel(3, 3), Rgba([0, 0, 0, 0]));

    // rect partly outside the image clips without panicking
    draw_rect(&mut img, Rect::new(6, 6, 8, 8), color);
    assert_eq!(*img.get_pixel(7, 6), color);

    let mut img = RgbaImage::new(4, 4);
    draw_line(&mut img, 0, 0, 3, 3, color);
    for i in 0..4 {
        assert_eq!(*img.get_pixel(i, i), color);
    }
}
