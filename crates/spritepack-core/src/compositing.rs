//! Pixel-level operations on RGBA rasters and the sheet compositor.
//!
//! All copies clip to both images, so degenerate rects and out-of-bounds
//! destinations turn into empty blits rather than failures.

use crate::config::{Alpha, Settings};
use crate::geometry::{expand, intersect, PointF, Rect};
use crate::model::{PackedTexture, Sprite};
use image::{Rgba, RgbaImage};
use std::collections::VecDeque;
use tracing::debug;

fn in_bounds(img: &RgbaImage, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height()
}

fn get(img: &RgbaImage, x: i32, y: i32) -> Rgba<u8> {
    *img.get_pixel(x as u32, y as u32)
}

fn put(img: &mut RgbaImage, x: i32, y: i32, px: Rgba<u8>) {
    if in_bounds(img, x, y) {
        img.put_pixel(x as u32, y as u32, px);
    }
}

fn image_bounds(img: &RgbaImage) -> Rect {
    Rect::new(0, 0, img.width() as i32, img.height() as i32)
}

/// Even-odd test of a point against a polygon; for the convex polygons this
/// system accepts it matches the non-zero rule.
fn point_in_polygon(px: f32, py: f32, vertices: &[PointF]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[j];
        if (a.y > py) != (b.y > py) {
            let t = (py - a.y) / (b.y - a.y);
            if px < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Copies `src_rect` from `src` to `(dx, dy)` in `target`, clipping to both
/// images. A mask restricts the copy to pixels whose centers lie inside the
/// polygon (vertices in source-rect-local coordinates).
pub fn copy_rect(
    src: &RgbaImage,
    src_rect: Rect,
    target: &mut RgbaImage,
    dx: i32,
    dy: i32,
    mask: Option<&[PointF]>,
) {
    let clipped = intersect(src_rect, image_bounds(src));
    for yy in 0..clipped.h {
        for xx in 0..clipped.w {
            let lx = clipped.x - src_rect.x + xx;
            let ly = clipped.y - src_rect.y + yy;
            if let Some(vertices) = mask {
                if !point_in_polygon(lx as f32 + 0.5, ly as f32 + 0.5, vertices) {
                    continue;
                }
            }
            let px = get(src, clipped.x + xx, clipped.y + yy);
            put(target, dx + lx, dy + ly, px);
        }
    }
}

/// Like `copy_rect`, but the source is rotated 90 degrees clockwise; the
/// destination covers `(dx, dy, src_rect.h, src_rect.w)`.
pub fn copy_rect_rotated_cw(
    src: &RgbaImage,
    src_rect: Rect,
    target: &mut RgbaImage,
    dx: i32,
    dy: i32,
    mask: Option<&[PointF]>,
) {
    let clipped = intersect(src_rect, image_bounds(src));
    for yy in 0..clipped.h {
        for xx in 0..clipped.w {
            let lx = clipped.x - src_rect.x + xx;
            let ly = clipped.y - src_rect.y + yy;
            if let Some(vertices) = mask {
                if !point_in_polygon(lx as f32 + 0.5, ly as f32 + 0.5, vertices) {
                    continue;
                }
            }
            let px = get(src, clipped.x + xx, clipped.y + yy);
            put(target, dx + src_rect.h - 1 - ly, dy + lx, px);
        }
    }
}

/// The tight sub-rect of `rect` holding all pixels with alpha above
/// `threshold`. When every pixel is at or below the threshold, a zero-area
/// rect at `rect`'s origin is returned.
pub fn get_used_bounds(src: &RgbaImage, rect: Rect, threshold: u8) -> Rect {
    let clipped = intersect(rect, image_bounds(src));
    let mut x0 = i32::MAX;
    let mut y0 = i32::MAX;
    let mut x1 = i32::MIN;
    let mut y1 = i32::MIN;
    for y in clipped.y..clipped.y1() {
        for x in clipped.x..clipped.x1() {
            if get(src, x, y)[3] > threshold {
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x);
                y1 = y1.max(y);
            }
        }
    }
    if x0 > x1 {
        return Rect::new(rect.x, rect.y, 0, 0);
    }
    Rect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
}

/// Pixel-exact equality of two sub-rects; false when the sizes differ or a
/// rect escapes its image.
pub fn is_identical(a: &RgbaImage, a_rect: Rect, b: &RgbaImage, b_rect: Rect) -> bool {
    if a_rect.w != b_rect.w || a_rect.h != b_rect.h {
        return false;
    }
    if !image_bounds(a).contains(&a_rect) || !image_bounds(b).contains(&b_rect) {
        return false;
    }
    for y in 0..a_rect.h {
        for x in 0..a_rect.w {
            if get(a, a_rect.x + x, a_rect.y + y) != get(b, b_rect.x + x, b_rect.y + y) {
                return false;
            }
        }
    }
    true
}

/// Copies the 1-pixel inner edge of `rect` outward onto its border ring,
/// for each enabled side. `rect` is expected to already enclose the content
/// by one pixel.
pub fn extrude_rect(
    target: &mut RgbaImage,
    rect: Rect,
    left: bool,
    top: bool,
    right: bool,
    bottom: bool,
) {
    let inner = expand(rect, -1);
    if inner.is_empty() {
        return;
    }
    let clamp_x = |x: i32| x.clamp(inner.x, inner.x1() - 1);
    let clamp_y = |y: i32| y.clamp(inner.y, inner.y1() - 1);
    if top {
        for x in rect.x..rect.x1() {
            if in_bounds(target, clamp_x(x), inner.y) {
                let px = get(target, clamp_x(x), inner.y);
                put(target, x, rect.y, px);
            }
        }
    }
    if bottom {
        for x in rect.x..rect.x1() {
            if in_bounds(target, clamp_x(x), inner.y1() - 1) {
                let px = get(target, clamp_x(x), inner.y1() - 1);
                put(target, x, rect.y1() - 1, px);
            }
        }
    }
    if left {
        for y in rect.y..rect.y1() {
            if in_bounds(target, inner.x, clamp_y(y)) {
                let px = get(target, inner.x, clamp_y(y));
                put(target, rect.x, y, px);
            }
        }
    }
    if right {
        for y in rect.y..rect.y1() {
            if in_bounds(target, inner.x1() - 1, clamp_y(y)) {
                let px = get(target, inner.x1() - 1, clamp_y(y));
                put(target, rect.x1() - 1, y, px);
            }
        }
    }
}

/// 1-pixel outline stroke.
pub fn draw_rect(target: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    if rect.is_empty() {
        return;
    }
    for x in rect.x..rect.x1() {
        put(target, x, rect.y, color);
        put(target, x, rect.y1() - 1, color);
    }
    for y in rect.y..rect.y1() {
        put(target, rect.x, y, color);
        put(target, rect.x1() - 1, y, color);
    }
}

/// 1-pixel line stroke, endpoints inclusive.
pub fn draw_line(target: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        put(target, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = err * 2;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Sets every alpha value to zero, keeping RGB.
pub fn clear_alpha(target: &mut RgbaImage) {
    for px in target.pixels_mut() {
        px[3] = 0;
    }
}

/// Fills the RGB of fully transparent pixels from the nearest
/// non-transparent neighbor, leaving alpha untouched. Prevents bilinear
/// filtering from sampling stray colors at sprite seams.
pub fn bleed_alpha(target: &mut RgbaImage) {
    let w = target.width() as i32;
    let h = target.height() as i32;
    if w == 0 || h == 0 {
        return;
    }
    let mut filled = vec![false; (w * h) as usize];
    let mut queue = VecDeque::new();
    for y in 0..h {
        for x in 0..w {
            if get(target, x, y)[3] > 0 {
                filled[(y * w + x) as usize] = true;
                queue.push_back((x, y));
            }
        }
    }
    const NEIGHBORS: [(i32, i32); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];
    while let Some((x, y)) = queue.pop_front() {
        let rgb = get(target, x, y);
        for (ox, oy) in NEIGHBORS {
            let (nx, ny) = (x + ox, y + oy);
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            let idx = (ny * w + nx) as usize;
            if !filled[idx] {
                filled[idx] = true;
                put(target, nx, ny, Rgba([rgb[0], rgb[1], rgb[2], 0]));
                queue.push_back((nx, ny));
            }
        }
    }
}

/// Multiplies RGB by alpha.
pub fn premultiply_alpha(target: &mut RgbaImage) {
    for px in target.pixels_mut() {
        let a = px[3] as u16;
        px[0] = (px[0] as u16 * a / 255) as u8;
        px[1] = (px[1] as u16 * a / 255) as u8;
        px[2] = (px[2] as u16 * a / 255) as u8;
    }
}

/// Pixels matching `colorkey` exactly become fully transparent; all others
/// become fully opaque.
pub fn make_opaque(target: &mut RgbaImage, colorkey: Rgba<u8>) {
    for px in target.pixels_mut() {
        px[3] = if *px == colorkey { 0 } else { 255 };
    }
}

fn copy_sprite(target: &mut RgbaImage, sprite: &Sprite) {
    let mask = if sprite.vertices.is_empty() {
        None
    } else {
        Some(sprite.vertices.as_slice())
    };
    if sprite.rotated {
        copy_rect_rotated_cw(
            sprite.source.rgba(),
            sprite.trimmed_source_rect,
            target,
            sprite.trimmed_rect.x,
            sprite.trimmed_rect.y,
            mask,
        );
    } else {
        copy_rect(
            sprite.source.rgba(),
            sprite.trimmed_source_rect,
            target,
            sprite.trimmed_rect.x,
            sprite.trimmed_rect.y,
            mask,
        );
    }

    if sprite.extrude > 0 {
        // only edges the trim did not cut participate
        let left = sprite.source_rect.x0() == sprite.trimmed_source_rect.x0();
        let top = sprite.source_rect.y0() == sprite.trimmed_source_rect.y0();
        let right = sprite.source_rect.x1() == sprite.trimmed_source_rect.x1();
        let bottom = sprite.source_rect.y1() == sprite.trimmed_source_rect.y1();
        if left || top || right || bottom {
            let mut rect = sprite.trimmed_rect;
            if sprite.rotated {
                std::mem::swap(&mut rect.w, &mut rect.h);
            }
            for _ in 0..sprite.extrude {
                rect = expand(rect, 1);
                extrude_rect(target, rect, left, top, right, bottom);
            }
        }
    }
}

fn process_alpha(target: &mut RgbaImage, texture: &PackedTexture) {
    match texture.alpha {
        Alpha::Keep => {}
        Alpha::Clear => clear_alpha(target),
        Alpha::Bleed => bleed_alpha(target),
        Alpha::Premultiply => premultiply_alpha(target),
        Alpha::Colorkey => make_opaque(target, texture.colorkey),
    }
}

fn draw_debug_info(target: &mut RgbaImage, sprite: &Sprite) {
    let mut rect = sprite.rect;
    let mut trimmed_rect = sprite.trimmed_rect;
    let mut pivot_point = sprite.pivot_point;
    if sprite.rotated {
        std::mem::swap(&mut rect.w, &mut rect.h);
        std::mem::swap(&mut trimmed_rect.w, &mut trimmed_rect.h);
        std::mem::swap(&mut pivot_point.x, &mut pivot_point.y);
        pivot_point.x = (rect.w - 1) as f32 - pivot_point.x;
    }
    let pivot_rect = Rect::new(
        rect.x + (pivot_point.x - 0.25) as i32,
        rect.y + (pivot_point.y - 0.25) as i32,
        if pivot_point.x == pivot_point.x.floor() { 2 } else { 1 },
        if pivot_point.y == pivot_point.y.floor() { 2 } else { 1 },
    );
    draw_rect(target, rect, Rgba([255, 0, 255, 128]));
    draw_rect(target, trimmed_rect, Rgba([255, 255, 0, 128]));
    draw_rect(target, pivot_rect, Rgba([255, 0, 0, 255]));

    if !sprite.vertices.is_empty() {
        let x = sprite.trimmed_rect.x as f32;
        let y = sprite.trimmed_rect.y as f32;
        for i in 0..sprite.vertices.len() {
            let v0 = sprite.vertices[i];
            let v1 = sprite.vertices[(i + 1) % sprite.vertices.len()];
            draw_line(
                target,
                (x + v0.x) as i32,
                (y + v0.y) as i32,
                (x + v1.x) as i32,
                (y + v1.y) as i32,
                Rgba([0, 255, 255, 128]),
            );
        }
    }
}

/// Renders one packed texture: blits every sprite of the sheet onto a
/// transparent canvas, applies the texture's alpha policy and optionally
/// draws the placement overlay.
pub fn render_packed_texture(
    settings: &Settings,
    texture: &PackedTexture,
    sprites: &[Sprite],
) -> RgbaImage {
    let mut target = RgbaImage::new(texture.width.max(0) as u32, texture.height.max(0) as u32);
    let sheet = &sprites[texture.sprites.clone()];
    for sprite in sheet {
        copy_sprite(&mut target, sprite);
    }
    process_alpha(&mut target, texture);
    if settings.debug {
        for sprite in sheet {
            draw_debug_info(&mut target, sprite);
        }
    }
    debug!(
        filename = %texture.filename,
        width = texture.width,
        height = texture.height,
        sprites = sheet.len(),
        "composited sheet"
    );
    target
}
