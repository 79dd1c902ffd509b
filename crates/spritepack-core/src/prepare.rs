//! Sprite preparation: the pre-pack pass derives the trimmed source rect
//! and divisor margins, the post-pack pass derives the final rect and
//! pivot. Both passes are idempotent.

use crate::compositing::get_used_bounds;
use crate::config::{PivotX, PivotY, Trim};
use crate::error::{Result, SpritePackError};
use crate::geometry::{ceil, expand, intersect, PointF, Rect, Size};
use crate::model::Sprite;

/// Fills `trimmed_source_rect`, `common_divisor_margin` and
/// `common_divisor_offset` for every sprite.
pub fn prepare_sprites(sprites: &mut [Sprite]) -> Result<()> {
    for sprite in sprites.iter_mut() {
        if sprite.trim != Trim::None {
            if !sprite.source.bounds().contains(&sprite.source_rect) {
                return Err(SpritePackError::InvalidTrim);
            }
            sprite.trimmed_source_rect = get_used_bounds(
                sprite.source.rgba(),
                sprite.source_rect,
                sprite.trim_threshold,
            );
            if sprite.trim_margin > 0 {
                sprite.trimmed_source_rect = intersect(
                    expand(sprite.trimmed_source_rect, sprite.trim_margin),
                    sprite.source_rect,
                );
            }
        } else {
            sprite.trimmed_source_rect = sprite.source_rect;
        }

        let distance_to_next_multiple = |value: i32, divisor: i32| ceil(value, divisor) - value;
        sprite.common_divisor_margin = Size::new(
            distance_to_next_multiple(sprite.trimmed_source_rect.w, sprite.common_divisor.x),
            distance_to_next_multiple(sprite.trimmed_source_rect.h, sprite.common_divisor.y),
        );
        sprite.common_divisor_offset = Size::new(
            sprite.common_divisor_margin.x / 2,
            sprite.common_divisor_margin.y / 2,
        );
    }
    Ok(())
}

/// Fills `rect`, `pivot_point` and `trimmed_pivot_point` from the placed
/// `trimmed_rect`.
pub fn complete_sprite_info(sprites: &mut [Sprite]) {
    for sprite in sprites.iter_mut() {
        if sprite.trim == Trim::Crop {
            sprite.rect = sprite.trimmed_rect;
        } else {
            // position the untrimmed rect so its trimmed content lands on
            // the placed trimmed rect
            sprite.rect = Rect::new(
                sprite.trimmed_rect.x - (sprite.trimmed_source_rect.x - sprite.source_rect.x),
                sprite.trimmed_rect.y - (sprite.trimmed_source_rect.y - sprite.source_rect.y),
                sprite.source_rect.w,
                sprite.source_rect.h,
            );
        }

        sprite.rect.x -= sprite.common_divisor_offset.x;
        sprite.rect.y -= sprite.common_divisor_offset.y;
        sprite.rect.w += sprite.common_divisor_margin.x;
        sprite.rect.h += sprite.common_divisor_margin.y;

        let mut pivot_point = sprite.pivot_point;
        match sprite.pivot_x {
            PivotX::Left => pivot_point.x = 0.0,
            PivotX::Center => pivot_point.x = sprite.rect.w as f32 / 2.0,
            PivotX::Right => pivot_point.x = sprite.rect.w as f32,
            PivotX::Custom => {}
        }
        match sprite.pivot_y {
            PivotY::Top => pivot_point.y = 0.0,
            PivotY::Middle => pivot_point.y = sprite.rect.h as f32 / 2.0,
            PivotY::Bottom => pivot_point.y = sprite.rect.h as f32,
            PivotY::Custom => {}
        }
        if sprite.integral_pivot_point {
            pivot_point.x = pivot_point.x.floor();
            pivot_point.y = pivot_point.y.floor();
        }
        sprite.pivot_point = pivot_point;
        sprite.trimmed_pivot_point = PointF::new(
            pivot_point.x + (sprite.rect.x - sprite.trimmed_rect.x) as f32,
            pivot_point.y + (sprite.rect.y - sprite.trimmed_rect.y) as f32,
        );
    }
}
