//! Builds the machine-readable description of a pack run: a JSON-shaped
//! tree with `sprites`, `tags` and `textures` lists. Front ends dump it as
//! JSON or feed it to a template engine.

use crate::geometry::{PointF, Rect};
use crate::model::{PackedTexture, Sprite};
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn json_rect(rect: Rect) -> Value {
    json!({"x": rect.x, "y": rect.y, "w": rect.w, "h": rect.h})
}

fn json_point(point: PointF) -> Value {
    json!({"x": point.x, "y": point.y})
}

fn json_point_list(points: &[PointF]) -> Value {
    Value::Array(points.iter().map(|p| json_point(*p)).collect())
}

fn json_tag_list(tags: &[(String, String)]) -> Value {
    Value::Array(
        tags.iter()
            .map(|(key, value)| {
                let mut json_tag = json!({"key": key});
                if !value.is_empty() {
                    json_tag["value"] = json!(value);
                }
                json_tag
            })
            .collect(),
    )
}

/// The description tree for a packed sprite sequence.
///
/// `sprites` follow the packed order. `tags` groups sprites by (key, value)
/// pairs in sorted order; `textures` embeds the sprites of each sheet.
/// Sprites that occupy only part of their source carry a
/// `sourceSpriteIndex`, their ordinal among the sprites of their sheet.
pub fn describe(sprites: &[Sprite], textures: &[PackedTexture]) -> Value {
    let mut json_sprites: Vec<Value> = Vec::new();
    let mut tags: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    let mut texture_sprites: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for sprite in sprites {
        let index = json_sprites.len();
        let texture_filename = sprite
            .texture
            .filename
            .get_nth_filename(sprite.texture_index.max(0) as usize);

        let mut json_sprite = json!({
            "index": sprite.index,
            "id": sprite.id,
            "rect": json_rect(sprite.rect),
            "trimmedRect": json_rect(sprite.trimmed_rect),
            "sourceFilename": sprite.source.filename().to_string_lossy(),
            "sourcePath": sprite.source.path().to_string_lossy(),
            "sourceRect": json_rect(sprite.source_rect),
            "trimmedSourceRect": json_rect(sprite.trimmed_source_rect),
            "pivot": json_point(sprite.pivot_point),
            "filename": texture_filename,
            "rotated": sprite.rotated,
            "tags": json_tag_list(&sprite.tags),
        });
        if sprite.source.width() != sprite.source_rect.w
            || sprite.source.height() != sprite.source_rect.h
        {
            let ordinal = texture_sprites
                .get(&texture_filename)
                .map_or(0, |list| list.len());
            json_sprite["sourceSpriteIndex"] = json!(ordinal);
        }
        if !sprite.vertices.is_empty() {
            json_sprite["vertices"] = json_point_list(&sprite.vertices);
        }

        for (key, value) in &sprite.tags {
            tags.entry((key.clone(), value.clone()))
                .or_default()
                .push(index);
        }
        texture_sprites.entry(texture_filename).or_default().push(index);
        json_sprites.push(json_sprite);
    }

    let mut json_tags: Vec<Value> = Vec::new();
    for ((key, value), indices) in &tags {
        let mut json_tag = json!({"key": key});
        if !value.is_empty() {
            json_tag["value"] = json!(value);
        }
        json_tag["sprites"] = Value::Array(
            indices.iter().map(|&i| json_sprites[i].clone()).collect(),
        );
        json_tags.push(json_tag);
    }

    let mut json_textures: Vec<Value> = Vec::new();
    for texture in textures {
        let embedded: Vec<Value> = texture_sprites
            .get(&texture.filename)
            .map(|indices| indices.iter().map(|&i| json_sprites[i].clone()).collect())
            .unwrap_or_default();
        json_textures.push(json!({
            "filename": texture.filename,
            "width": texture.width,
            "height": texture.height,
            "sprites": embedded,
        }));
    }

    json!({
        "sprites": json_sprites,
        "tags": json_tags,
        "textures": json_textures,
    })
}
