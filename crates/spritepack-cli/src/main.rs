use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{ArgAction, Parser};
use globset::{Glob, GlobSetBuilder};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use image::{ImageReader, Rgba, RgbaImage};
use serde::Deserialize;
use spritepack_core::export::describe;
use spritepack_core::geometry::Size;
use spritepack_core::prelude::*;
use tracing::{error, info};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "spritepack",
    about = "Pack sprites into texture atlas sheets",
    version,
    author
)]
struct Cli {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Sheet filename pattern; a brace digit run like atlas{0-9}.png names
    /// multiple sheets
    #[arg(short, long, default_value = "atlas{0-}.png", help_heading = "Input/Output")]
    sheet: String,
    /// Description file ("stdout" prints it, "none" skips it)
    #[arg(long, default_value = "atlas.json", help_heading = "Input/Output")]
    output_file: String,
    /// Handlebars template used to render the description
    #[arg(long, help_heading = "Input/Output")]
    template: Option<PathBuf>,
    /// YAML config file; set fields override the flags
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only matching files are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob)
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Minimum sheet width (0 = unconstrained)
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    width: i32,
    /// Minimum sheet height (0 = unconstrained)
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    height: i32,
    /// Maximum sheet width (0 = unconstrained)
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    max_width: i32,
    /// Maximum sheet height (0 = unconstrained)
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    max_height: i32,
    /// Round sheet dimensions to powers of two
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    power_of_two: bool,
    /// Allow 90 degree rotation during packing
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    allow_rotate: bool,
    /// Share one placement between pixel-identical sprites
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    deduplicate: bool,
    /// Empty margin around each sheet
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    border_padding: i32,
    /// Empty space between sprites
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    shape_padding: i32,

    // Image Processing
    /// Trim mode: none | trim | crop
    #[arg(long, default_value = "none", help_heading = "Image Processing")]
    trim: String,
    /// Alpha threshold for trimming (0..=255)
    #[arg(long, default_value_t = 1, help_heading = "Image Processing")]
    trim_threshold: u8,
    /// Pixels kept around the trimmed bounds
    #[arg(long, default_value_t = 0, help_heading = "Image Processing")]
    trim_margin: i32,
    /// Required multiple for slot sizes, e.g. 16 or 16x24
    #[arg(long, default_value = "1", help_heading = "Image Processing")]
    common_divisor: String,
    /// Extrude sprite edges by this many pixels
    #[arg(long, default_value_t = 0, help_heading = "Image Processing")]
    extrude: i32,
    /// Alpha policy: keep | clear | bleed | premultiply | colorkey
    #[arg(long, default_value = "keep", help_heading = "Image Processing")]
    alpha: String,
    /// Colorkey as RRGGBB or RRGGBBAA hex
    #[arg(long, help_heading = "Image Processing")]
    colorkey: Option<String>,
    /// Horizontal pivot: left | center | right
    #[arg(long, default_value = "center", help_heading = "Image Processing")]
    pivot_x: String,
    /// Vertical pivot: top | middle | bottom
    #[arg(long, default_value = "middle", help_heading = "Image Processing")]
    pivot_y: String,
    /// Draw placement overlays onto the sheets
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    debug: bool,

    // Logging/UX
    /// Show a progress bar while loading (disable with --progress false)
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let texture = Arc::new(build_texture(cli)?);
    texture.validate()?;

    let settings = Settings {
        output_file: match cli.output_file.as_str() {
            "none" => None,
            other => Some(PathBuf::from(other)),
        },
        output_path: cli.out_dir.clone(),
        template_file: cli.template.clone(),
        debug: cli.debug,
        autocomplete: false,
    };

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no input images found in {}", cli.input.display());
    }
    let images = load_images(&paths, cli.progress && !cli.quiet);
    info!(count = images.len(), "loaded input images");

    let trim: Trim = cli
        .trim
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown trim mode: {}", cli.trim))?;
    let pivot_x: PivotX = cli
        .pivot_x
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown pivot: {}", cli.pivot_x))?;
    let pivot_y: PivotY = cli
        .pivot_y
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown pivot: {}", cli.pivot_y))?;
    let common_divisor = parse_common_divisor(&cli.common_divisor)?;

    let mut sprites: Vec<Sprite> = Vec::with_capacity(images.len());
    for (index, (path, rgba)) in images.into_iter().enumerate() {
        let source = Arc::new(SourceImage::new(
            path.parent().unwrap_or(Path::new("")),
            path.file_name().map(PathBuf::from).unwrap_or_default(),
            rgba,
        ));
        let mut sprite = Sprite::new(index as i32, source, texture.clone());
        sprite.id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        sprite.trim = trim;
        sprite.trim_threshold = cli.trim_threshold;
        sprite.trim_margin = cli.trim_margin;
        sprite.pivot_x = pivot_x;
        sprite.pivot_y = pivot_y;
        sprite.common_divisor = common_divisor;
        sprite.extrude = cli.extrude;
        sprites.push(sprite);
    }

    let packed = pack_sprites(&mut sprites)?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    for texture in &packed {
        let sheet = render_packed_texture(&settings, texture, &sprites);
        let path = texture.path.join(&texture.filename);
        sheet
            .save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        info!(?path, width = texture.width, height = texture.height, "wrote sheet");
    }

    let (used_area, total_area) = compute_stats(&sprites, &packed);
    let occupancy = if total_area > 0 {
        used_area as f64 / total_area as f64
    } else {
        0.0
    };
    info!(
        sheets = packed.len(),
        used_area,
        total_area,
        occupancy = format!("{:.2}%", occupancy * 100.0),
        "stats"
    );

    write_description(&settings, &sprites, &packed)
}

fn build_texture(cli: &Cli) -> anyhow::Result<Texture> {
    let mut texture = Texture {
        width: cli.width,
        height: cli.height,
        max_width: cli.max_width,
        max_height: cli.max_height,
        power_of_two: cli.power_of_two,
        allow_rotate: cli.allow_rotate,
        deduplicate: cli.deduplicate,
        border_padding: cli.border_padding,
        shape_padding: cli.shape_padding,
        alpha: cli
            .alpha
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown alpha policy: {}", cli.alpha))?,
        colorkey: match &cli.colorkey {
            Some(hex) => parse_colorkey(hex)?,
            None => Rgba([0, 0, 0, 0]),
        },
        filename: FilenameSequence::new(&cli.sheet),
        path: cli.out_dir.clone(),
    };
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let overlay: YamlConfig = serde_yaml::from_str(&file)?;
        overlay.apply(&mut texture)?;
    }
    Ok(texture)
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    width: Option<i32>,
    height: Option<i32>,
    max_width: Option<i32>,
    max_height: Option<i32>,
    power_of_two: Option<bool>,
    allow_rotate: Option<bool>,
    deduplicate: Option<bool>,
    border_padding: Option<i32>,
    shape_padding: Option<i32>,
    alpha: Option<String>,
    colorkey: Option<String>,
    sheet: Option<String>,
}

impl YamlConfig {
    fn apply(self, texture: &mut Texture) -> anyhow::Result<()> {
        if let Some(v) = self.width {
            texture.width = v;
        }
        if let Some(v) = self.height {
            texture.height = v;
        }
        if let Some(v) = self.max_width {
            texture.max_width = v;
        }
        if let Some(v) = self.max_height {
            texture.max_height = v;
        }
        if let Some(v) = self.power_of_two {
            texture.power_of_two = v;
        }
        if let Some(v) = self.allow_rotate {
            texture.allow_rotate = v;
        }
        if let Some(v) = self.deduplicate {
            texture.deduplicate = v;
        }
        if let Some(v) = self.border_padding {
            texture.border_padding = v;
        }
        if let Some(v) = self.shape_padding {
            texture.shape_padding = v;
        }
        if let Some(v) = self.alpha {
            texture.alpha = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown alpha policy: {v}"))?;
        }
        if let Some(v) = self.colorkey {
            texture.colorkey = parse_colorkey(&v)?;
        }
        if let Some(v) = self.sheet {
            texture.filename = FilenameSequence::new(&v);
        }
        Ok(())
    }
}

fn parse_common_divisor(s: &str) -> anyhow::Result<Size> {
    let parse = |v: &str| {
        v.trim()
            .parse::<i32>()
            .ok()
            .filter(|v| *v >= 1)
            .ok_or_else(|| anyhow::anyhow!("invalid common divisor: {s}"))
    };
    match s.split_once('x') {
        Some((x, y)) => Ok(Size::new(parse(x)?, parse(y)?)),
        None => {
            let v = parse(s)?;
            Ok(Size::new(v, v))
        }
    }
}

fn parse_colorkey(s: &str) -> anyhow::Result<Rgba<u8>> {
    let hex = s.trim_start_matches('#');
    let value = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| anyhow::anyhow!("invalid colorkey: {s}"))
    };
    match hex.len() {
        6 => Ok(Rgba([value(0..2)?, value(2..4)?, value(4..6)?, 255])),
        8 => Ok(Rgba([value(0..2)?, value(2..4)?, value(4..6)?, value(6..8)?])),
        _ => anyhow::bail!("invalid colorkey: {s}"),
    }
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    // walk order is filesystem-dependent; sort for deterministic output
    list.sort();
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

fn load_images(paths: &[PathBuf], progress: bool) -> Vec<(PathBuf, RgbaImage)> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )
            .unwrap(),
        );
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(rgba) => list.push((p.clone(), rgba)),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    list
}

fn load_image(p: &Path) -> anyhow::Result<RgbaImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

fn compute_stats(sprites: &[Sprite], packed: &[PackedTexture]) -> (u64, u64) {
    let mut used: u64 = 0;
    let mut total: u64 = 0;
    for texture in packed {
        total += texture.width as u64 * texture.height as u64;
        for sprite in &sprites[texture.sprites.clone()] {
            used += sprite.trimmed_rect.w as u64 * sprite.trimmed_rect.h as u64;
        }
    }
    (used, total)
}

fn write_description(
    settings: &Settings,
    sprites: &[Sprite],
    packed: &[PackedTexture],
) -> anyhow::Result<()> {
    let Some(output_file) = &settings.output_file else {
        return Ok(());
    };
    let json = describe(sprites, packed);
    let text = if let Some(template_path) = &settings.template_file {
        let source = fs::read_to_string(template_path)
            .with_context(|| format!("read template {}", template_path.display()))?;
        let mut reg = Handlebars::new();
        register_template_helpers(&mut reg);
        reg.register_template_string("description", source)?;
        reg.render("description", &json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };

    if output_file.to_str() == Some("stdout") {
        println!("{text}");
        return Ok(());
    }
    let path = settings.output_path.join(output_file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    info!(?path, "description written");
    Ok(())
}

fn register_template_helpers(reg: &mut Handlebars) {
    reg.register_helper(
        "getId",
        Box::new(
            |h: &Helper,
             _: &Handlebars,
             _: &Context,
             _: &mut RenderContext,
             out: &mut dyn Output|
             -> HelperResult {
                let sprite = h.param(0).map(|p| p.value().clone()).unwrap_or_default();
                match sprite["id"].as_str() {
                    Some(id) if !id.is_empty() => out.write(id)?,
                    _ => out.write(&format!("sprite_{}", sprite["index"]))?,
                }
                Ok(())
            },
        ),
    );
    reg.register_helper(
        "getIdOrFilename",
        Box::new(
            |h: &Helper,
             _: &Handlebars,
             _: &Context,
             _: &mut RenderContext,
             out: &mut dyn Output|
             -> HelperResult {
                let sprite = h.param(0).map(|p| p.value().clone()).unwrap_or_default();
                match sprite["id"].as_str() {
                    Some(id) if !id.is_empty() => out.write(id)?,
                    _ => out.write(sprite["sourceFilename"].as_str().unwrap_or(""))?,
                }
                Ok(())
            },
        ),
    );
    reg.register_helper(
        "removeExtension",
        Box::new(
            |h: &Helper,
             _: &Handlebars,
             _: &Context,
             _: &mut RenderContext,
             out: &mut dyn Output|
             -> HelperResult {
                let name = h.param(0).and_then(|p| p.value().as_str()).unwrap_or("");
                let stem = name.rfind('.').map(|dot| &name[..dot]).unwrap_or(name);
                out.write(stem)?;
                Ok(())
            },
        ),
    );
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
