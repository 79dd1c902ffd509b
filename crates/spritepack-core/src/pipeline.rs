//! The pack driver: groups sprites by target texture, deduplicates, runs
//! the rectangle packer, writes placements back and splits each group into
//! per-sheet packed textures.

use crate::compositing::is_identical;
use crate::config::Texture;
use crate::error::{Result, SpritePackError};
use crate::geometry::{ceil_to_pot, floor_to_pot, Point, Rect, Size};
use crate::model::{PackedTexture, Sprite};
use crate::packer;
use crate::prepare;
use std::ops::Range;
use tracing::{debug, instrument};

fn get_max_size(size: i32, max_size: i32, power_of_two: bool) -> i32 {
    let mut size = size;
    let mut max_size = max_size;
    if power_of_two && size > 0 {
        size = ceil_to_pot(size);
    }
    if power_of_two && max_size > 0 {
        max_size = floor_to_pot(max_size);
    }
    if size > 0 && max_size > 0 {
        size.min(max_size)
    } else if size > 0 {
        size
    } else if max_size > 0 {
        max_size
    } else {
        i32::MAX
    }
}

fn get_max_texture_size(texture: &Texture) -> (i32, i32) {
    (
        get_max_size(texture.width, texture.max_width, texture.power_of_two),
        get_max_size(texture.height, texture.max_height, texture.power_of_two),
    )
}

fn get_sprite_size(sprite: &Sprite) -> Size {
    Size::new(
        sprite.trimmed_source_rect.w + sprite.common_divisor_margin.x + sprite.extrude * 2,
        sprite.trimmed_source_rect.h + sprite.common_divisor_margin.y + sprite.extrude * 2,
    )
}

fn get_sprite_indent(sprite: &Sprite) -> Size {
    Size::new(
        sprite.common_divisor_offset.x + sprite.extrude,
        sprite.common_divisor_offset.y + sprite.extrude,
    )
}

fn get_sprite_right_bottom(sprite: &Sprite) -> Point {
    let w = if sprite.rotated {
        sprite.trimmed_rect.h
    } else {
        sprite.trimmed_rect.w
    };
    let h = if sprite.rotated {
        sprite.trimmed_rect.w
    } else {
        sprite.trimmed_rect.h
    };
    Point::new(
        sprite.trimmed_rect.x + w + sprite.common_divisor_margin.x
            - sprite.common_divisor_offset.x
            + sprite.extrude,
        sprite.trimmed_rect.y + h + sprite.common_divisor_margin.y
            - sprite.common_divisor_offset.y
            + sprite.extrude,
    )
}

fn fits_in_texture(sprite: &Sprite, max_width: i32, max_height: i32, allow_rotate: bool) -> bool {
    let size = get_sprite_size(sprite);
    (size.x <= max_width && size.y <= max_height)
        || (allow_rotate && size.x <= max_height && size.y <= max_width)
}

fn display_id(sprite: &Sprite) -> String {
    if sprite.id.is_empty() {
        format!("sprite_{}", sprite.index)
    } else {
        sprite.id.clone()
    }
}

fn pack_texture_group(
    sprites: &mut [Sprite],
    range: Range<usize>,
    packed_textures: &mut Vec<PackedTexture>,
) -> Result<()> {
    let texture = sprites[range.start].texture.clone();
    let group = &mut sprites[range.clone()];

    let (pack_width, pack_height) = get_max_texture_size(&texture);
    let max_width = pack_width.saturating_sub(texture.border_padding * 2);
    let max_height = pack_height.saturating_sub(texture.border_padding * 2);
    for sprite in group.iter() {
        if !fits_in_texture(sprite, max_width, max_height, texture.allow_rotate) {
            let size = get_sprite_size(sprite);
            return Err(SpritePackError::SpriteDoesNotFit {
                id: display_id(sprite),
                width: size.x,
                height: size.y,
                max_width,
                max_height,
            });
        }
    }

    // deduplicate and build the packer input
    let mut inputs = Vec::with_capacity(group.len());
    let mut duplicates: Vec<(usize, usize)> = Vec::new();
    for i in 0..group.len() {
        let mut duplicate_of = None;
        if texture.deduplicate {
            for j in 0..i {
                if is_identical(
                    group[i].source.rgba(),
                    group[i].trimmed_source_rect,
                    group[j].source.rgba(),
                    group[j].trimmed_source_rect,
                ) {
                    duplicate_of = Some(j);
                    break;
                }
            }
        }
        if let Some(j) = duplicate_of {
            duplicates.push((i, j));
        } else {
            // only expand by shape padding when the sprite does not fill a
            // whole row/column
            let mut size = get_sprite_size(&group[i]);
            if size.x < max_width {
                size.x += texture.shape_padding;
            }
            if size.y < max_height {
                size.y += texture.shape_padding;
            }
            inputs.push(packer::InputRect {
                id: i,
                w: size.x,
                h: size.y,
            });
        }
    }

    let pack_max_size = pack_width > texture.width;
    let sheets = packer::pack(
        &packer::Params {
            power_of_two: texture.power_of_two,
            allow_rotate: texture.allow_rotate,
            padding: texture.border_padding * 2,
            max_width: pack_width,
            max_height: pack_height,
            pack_max_size,
        },
        inputs,
    )?;

    if sheets.len() > texture.filename.count() {
        return Err(SpritePackError::TooManySheets {
            texture: texture.filename.filename(),
            sheets: sheets.len(),
            available: texture.filename.count(),
        });
    }
    debug!(
        texture = %texture.filename.filename(),
        sprites = group.len(),
        duplicates = duplicates.len(),
        sheets = sheets.len(),
        "packed texture group"
    );

    // write placements back
    for (texture_index, sheet) in sheets.iter().enumerate() {
        for packed in &sheet.rects {
            let sprite = &mut group[packed.id];
            let indent = get_sprite_indent(sprite);
            sprite.rotated = packed.rotated;
            sprite.texture_index = texture_index as i32;
            sprite.trimmed_rect = Rect::new(
                packed.x + indent.x - texture.border_padding,
                packed.y + indent.y - texture.border_padding,
                sprite.trimmed_source_rect.w,
                sprite.trimmed_source_rect.h,
            );
        }
    }

    // propagate placements to duplicates
    for (i, j) in duplicates {
        let (rotated, texture_index, trimmed_rect) = {
            let original = &group[j];
            (original.rotated, original.texture_index, original.trimmed_rect)
        };
        let sprite = &mut group[i];
        sprite.rotated = rotated;
        sprite.texture_index = texture_index;
        sprite.trimmed_rect = trimmed_rect;
    }

    prepare::complete_sprite_info(group);

    // sort sprites by sheet; stable, so input order survives per sheet
    if sheets.len() > 1 {
        group.sort_by_key(|sprite| sprite.texture_index);
    }

    // one packed texture per contiguous sheet run
    let mut run_start = 0;
    while run_start < group.len() {
        let sheet_index = group[run_start].texture_index;
        let mut run_end = run_start + 1;
        while run_end < group.len() && group[run_end].texture_index == sheet_index {
            run_end += 1;
        }

        let mut width = texture.width;
        let mut height = texture.height;
        for sprite in &group[run_start..run_end] {
            let right_bottom = get_sprite_right_bottom(sprite);
            width = width.max(right_bottom.x + texture.border_padding);
            height = height.max(right_bottom.y + texture.border_padding);
        }
        if texture.power_of_two {
            width = ceil_to_pot(width);
            height = ceil_to_pot(height);
        }

        packed_textures.push(PackedTexture {
            path: texture.path.clone(),
            filename: texture.filename.get_nth_filename(sheet_index as usize),
            width,
            height,
            sprites: range.start + run_start..range.start + run_end,
            alpha: texture.alpha,
            colorkey: texture.colorkey,
        });
        run_start = run_end;
    }
    Ok(())
}

/// Packs a sprite sequence onto its target textures.
///
/// On return the sequence is reordered (stable) by texture, then by sheet,
/// and every derived placement field is filled in. The returned records
/// partition the sequence into per-sheet runs. Errors abort the whole call;
/// no partial placements are reported.
#[instrument(skip_all)]
pub fn pack_sprites(sprites: &mut Vec<Sprite>) -> Result<Vec<PackedTexture>> {
    let mut packed_textures = Vec::new();
    if sprites.is_empty() {
        return Ok(packed_textures);
    }

    prepare::prepare_sprites(sprites)?;

    // stable sort groups sprites by texture while keeping input order
    // within each group
    sprites.sort_by_key(|sprite| sprite.texture.filename.pattern());

    let mut begin = 0;
    while begin < sprites.len() {
        let key = sprites[begin].texture.filename.pattern();
        let end = sprites[begin..]
            .iter()
            .position(|sprite| sprite.texture.filename.pattern() != key)
            .map_or(sprites.len(), |offset| begin + offset);
        pack_texture_group(sprites, begin..end, &mut packed_textures)?;
        begin = end;
    }
    Ok(packed_textures)
}
