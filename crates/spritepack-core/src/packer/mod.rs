//! Multi-sheet rectangle packing.
//!
//! The packer consumes plain `{id, w, h}` rectangles and distributes them
//! over as many sheets as needed. `padding` reserves a left/top margin
//! inside each sheet; inter-rect gaps are the caller's concern (it inflates
//! the submitted sizes).

mod maxrects;

use crate::error::{Result, SpritePackError};
use crate::geometry::{ceil_to_pot, floor_to_pot};
use maxrects::MaxRects;
use tracing::trace;

/// Unconstrained dimensions are clamped to this bound.
const MAX_SHEET_SIZE: i32 = 1 << 30;

#[derive(Debug, Clone)]
pub struct Params {
    pub power_of_two: bool,
    pub allow_rotate: bool,
    /// Left/top sheet margin in pixels.
    pub padding: i32,
    pub max_width: i32,
    pub max_height: i32,
    /// When set, per-sheet dimensions are chosen below the maximum,
    /// minimizing area; otherwise every sheet targets the maximum exactly.
    pub pack_max_size: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct InputRect {
    pub id: usize,
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct PackedRect {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub rotated: bool,
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub width: i32,
    pub height: i32,
    pub rects: Vec<PackedRect>,
}

/// Packs every input rectangle onto exactly one sheet, spilling to
/// additional sheets when a sheet fills up. Fails only when a rectangle
/// exceeds the maximum sheet bounds in both orientations.
pub fn pack(params: &Params, mut inputs: Vec<InputRect>) -> Result<Vec<Sheet>> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    let cap_w = clamp_dimension(params.max_width, params.power_of_two);
    let cap_h = clamp_dimension(params.max_height, params.power_of_two);
    let avail_w = cap_w - params.padding;
    let avail_h = cap_h - params.padding;
    for rect in &inputs {
        let fits = (rect.w <= avail_w && rect.h <= avail_h)
            || (params.allow_rotate && rect.h <= avail_w && rect.w <= avail_h);
        if !fits {
            return Err(SpritePackError::PackRectTooLarge {
                width: rect.w,
                height: rect.h,
                max_width: avail_w,
                max_height: avail_h,
            });
        }
    }

    // feed in descending max(w,h); the stable sort keeps submission order
    // on ties
    inputs.sort_by(|a, b| b.w.max(b.h).cmp(&a.w.max(a.h)));

    let mut sheets = Vec::new();
    let mut remaining = inputs;
    while !remaining.is_empty() {
        let (sheet, rest) = open_sheet(params, cap_w, cap_h, &remaining);
        trace!(
            sheet = sheets.len(),
            width = sheet.width,
            height = sheet.height,
            placed = sheet.rects.len(),
            spilled = rest.len(),
            "packed sheet"
        );
        debug_assert!(!sheet.rects.is_empty());
        sheets.push(sheet);
        remaining = rest;
    }
    Ok(sheets)
}

fn clamp_dimension(max: i32, power_of_two: bool) -> i32 {
    let capped = max.clamp(1, MAX_SHEET_SIZE);
    if power_of_two {
        floor_to_pot(capped)
    } else {
        capped
    }
}

/// Packs as many of `rects` as possible onto one sheet. With
/// `pack_max_size` the sheet dimensions start at an area estimate and grow
/// until everything left fits or the maximum is reached.
fn open_sheet(
    params: &Params,
    cap_w: i32,
    cap_h: i32,
    rects: &[InputRect],
) -> (Sheet, Vec<InputRect>) {
    let (mut w, mut h) = if params.pack_max_size {
        initial_size(params, cap_w, cap_h, rects)
    } else {
        (cap_w, cap_h)
    };
    loop {
        let (placed, unplaced) = try_pack(params, w, h, rects);
        if unplaced.is_empty() || (w >= cap_w && h >= cap_h) {
            return (
                Sheet {
                    width: w,
                    height: h,
                    rects: placed,
                },
                unplaced,
            );
        }
        grow(&mut w, &mut h, cap_w, cap_h, params.power_of_two);
    }
}

fn initial_size(params: &Params, cap_w: i32, cap_h: i32, rects: &[InputRect]) -> (i32, i32) {
    let total_area: i64 = rects.iter().map(|r| r.w as i64 * r.h as i64).sum();
    let side = (isqrt(total_area).max(1) as i32).min(MAX_SHEET_SIZE);
    let mut w = side.min(cap_w);
    let mut h = side.min(cap_h);
    if params.power_of_two {
        w = ceil_to_pot(w).min(cap_w);
        h = ceil_to_pot(h).min(cap_h);
    }
    (w, h)
}

/// Grows the smaller dimension; doubling keeps power-of-two candidates
/// aligned, otherwise the step is a quarter of the current size.
fn grow(w: &mut i32, h: &mut i32, cap_w: i32, cap_h: i32, power_of_two: bool) {
    let step = |v: i32| {
        if power_of_two {
            v * 2
        } else {
            v + (v / 4).max(1)
        }
    };
    let grow_width = (*w <= *h && *w < cap_w) || *h >= cap_h;
    if grow_width && *w < cap_w {
        *w = step(*w).min(cap_w);
    } else if *h < cap_h {
        *h = step(*h).min(cap_h);
    }
}

fn try_pack(
    params: &Params,
    width: i32,
    height: i32,
    rects: &[InputRect],
) -> (Vec<PackedRect>, Vec<InputRect>) {
    let mut maxrects = MaxRects::new(width, height, params.padding);
    let mut placed = Vec::new();
    let mut unplaced = Vec::new();
    for rect in rects {
        match maxrects.insert(rect.w, rect.h, params.allow_rotate) {
            Some((x, y, rotated)) => placed.push(PackedRect {
                id: rect.id,
                x,
                y,
                rotated,
            }),
            None => unplaced.push(*rect),
        }
    }
    (placed, unplaced)
}

fn isqrt(value: i64) -> i64 {
    if value <= 0 {
        return 0;
    }
    let mut x = value;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + value / x) / 2;
    }
    x
}
