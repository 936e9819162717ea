//! r1edit CLI - inspect, export and resave Rayman 1 (PC) levels.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use r1edit::core::{EditorConfig, Ray1Settings, World};
use r1edit::editor::{export_layers, EditorSession, Layer, MemoryTextureManager, TextureManager};

const LOG_ENV: &str = "R1EDIT_LOG";
const CONFIG_ENV: &str = "R1EDIT_CONFIG";

/// Verbosity selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Info => "info",
            Verbosity::Debug => "r1edit=debug,info",
            Verbosity::Trace => "r1edit=trace,info",
        }
    }
}

struct Options {
    verbosity: Option<Verbosity>,
    config: Option<PathBuf>,
    no_mmap: bool,
    json: bool,
    args: Vec<String>,
}

fn parse_args() -> Result<Options> {
    let mut opts = Options {
        verbosity: None,
        config: env::var_os(CONFIG_ENV).map(PathBuf::from),
        no_mmap: false,
        json: false,
        args: Vec::new(),
    };
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => opts.verbosity = Some(Verbosity::Debug),
            "-vv" | "--trace" => opts.verbosity = Some(Verbosity::Trace),
            "-q" | "--quiet" => opts.verbosity = Some(Verbosity::Quiet),
            "--json" => opts.json = true,
            "--no-mmap" => opts.no_mmap = true,
            "-c" | "--config" => {
                let Some(path) = iter.next() else { bail!("--config needs a path") };
                opts.config = Some(PathBuf::from(path));
            }
            _ => opts.args.push(arg),
        }
    }
    Ok(opts)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let opts = parse_args()?;

    // -v/-vv/-q win over the environment
    let spec = match opts.verbosity {
        Some(v) => v.filter().to_string(),
        None => env::var(LOG_ENV).unwrap_or_else(|_| Verbosity::Info.filter().to_string()),
    };
    let (filter, filter_handle) = reload::Layer::new(EnvFilter::new(&spec));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let mut config = opts.config.as_deref().map(EditorConfig::load).unwrap_or_default();
    if opts.no_mmap {
        config.use_mmap = false;
    }
    if config.serializer_log && opts.verbosity != Some(Verbosity::Quiet) {
        filter_handle
            .reload(EnvFilter::new(format!("{},r1edit::format=trace", spec)))
            .context("failed to raise serializer logging")?;
    }

    let args: Vec<&str> = opts.args.iter().map(String::as_str).collect();
    let Some((&command, rest)) = args.split_first() else {
        print_help();
        return Ok(());
    };

    match command {
        "levels" | "l" => {
            let dir = game_dir(rest.first().copied(), &config)?;
            cmd_levels(&dir, &config)
        }
        "info" | "i" => {
            let (dir, settings) = level_args(rest, &config)?;
            cmd_info(&dir, settings, &mut config, opts.json)?;
            save_config(&opts, &config)
        }
        "objects" | "o" => {
            let (dir, settings) = level_args(rest, &config)?;
            cmd_objects(&dir, settings, &mut config)?;
            save_config(&opts, &config)
        }
        "export" | "e" => {
            let (dir, settings) = level_args(rest, &config)?;
            let Some(out) = rest.get(3) else {
                bail!("usage: r1edit export <dir> <world> <level> <out>");
            };
            cmd_export(&dir, settings, &mut config, Path::new(out))?;
            save_config(&opts, &config)
        }
        "resave" | "r" => {
            let (dir, settings) = level_args(rest, &config)?;
            cmd_resave(&dir, settings, &mut config)?;
            save_config(&opts, &config)
        }
        "version" | "-V" | "--version" => {
            println!("r1edit {} ({})", env!("CARGO_PKG_VERSION"), env!("R1EDIT_BUILD_DATE"));
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            print_help();
            bail!("unknown command: {}", other)
        }
    }
}

fn print_help() {
    println!(
        "r1edit {} ({}) - Rayman 1 (PC) level toolkit",
        env!("CARGO_PKG_VERSION"),
        env!("R1EDIT_BUILD_DATE")
    );
    println!();
    println!("Usage: r1edit [options] <command> [args]");
    println!();
    println!("Commands:");
    println!("  l, levels  <dir>                        List levels in a game directory");
    println!("  i, info    <dir> <world> <level>        Show level summary");
    println!("  o, objects <dir> <world> <level>        List placed objects");
    println!("  e, export  <dir> <world> <level> <out>  Write every layer as PNG");
    println!("  r, resave  <dir> <world> <level>        Load and save the level file");
    println!("  h, help                                 Show this help");
    println!();
    println!("Worlds are given by name (Jungle) or number (1).");
    println!();
    println!("Options:");
    println!("  -v, --verbose        Debug output");
    println!("  -vv, --trace         Trace output (very verbose)");
    println!("  -q, --quiet          Errors only");
    println!("  -c, --config <path>  Editor config file (also ${})", CONFIG_ENV);
    println!("  --no-mmap            Read files into memory instead of mapping them");
    println!("  --json               Machine-readable output for info");
    println!();
    println!("Log filter: ${} (e.g. r1edit=debug)", LOG_ENV);
}

fn save_config(opts: &Options, config: &EditorConfig) -> Result<()> {
    if let Some(path) = &opts.config {
        config
            .save(path)
            .with_context(|| format!("failed to save config {}", path.display()))?;
    }
    Ok(())
}

fn game_dir(arg: Option<&str>, config: &EditorConfig) -> Result<PathBuf> {
    match (arg, &config.game_dir) {
        (Some(dir), _) => Ok(PathBuf::from(dir)),
        (None, Some(dir)) => Ok(dir.clone()),
        (None, None) => bail!("no game directory given"),
    }
}

fn level_args(args: &[&str], config: &EditorConfig) -> Result<(PathBuf, Ray1Settings)> {
    let [dir, world, level, ..] = args else {
        bail!("expected <dir> <world> <level>");
    };
    let world: World = world.parse()?;
    let level: u32 = level
        .parse()
        .with_context(|| format!("invalid level number '{}'", level))?;
    let settings = Ray1Settings {
        version: config.version,
        ..Ray1Settings::new(world, level)
    };
    Ok((game_dir(Some(*dir), config)?, settings))
}

fn open_level(
    session: &mut EditorSession<MemoryTextureManager>,
    settings: Ray1Settings,
    config: &mut EditorConfig,
) -> Result<()> {
    let dir = session.game_dir().display().to_string();
    session
        .load(settings)
        .with_context(|| format!("failed to load {} from {}", settings, dir))?;
    config.add_recent(settings);
    Ok(())
}

fn new_session(dir: &Path, config: &EditorConfig) -> EditorSession<MemoryTextureManager> {
    EditorSession::new(dir, MemoryTextureManager::new()).with_mmap(config.use_mmap)
}

fn cmd_levels(dir: &Path, config: &EditorConfig) -> Result<()> {
    let session = new_session(dir, config);
    let levels = session
        .levels()
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    if levels.is_empty() {
        println!("No levels found in {}", dir.display());
        return Ok(());
    }
    let mut current = None;
    for settings in levels {
        if current != Some(settings.world) {
            println!("{} ({})", settings.world, settings.world.number());
            current = Some(settings.world);
        }
        println!("  {}", settings.level);
    }
    Ok(())
}

fn cmd_info(dir: &Path, settings: Ray1Settings, config: &mut EditorConfig, json: bool) -> Result<()> {
    let mut session = new_session(dir, config);
    open_level(&mut session, settings, config)?;
    let Some(data) = session.data() else { bail!("level not loaded") };
    let size = data.map_size();
    let linked = data.objects.iter().filter(|o| o.link_group != 0).count();
    let textures = session.textures();

    if json {
        let layers: Vec<_> = data
            .layers
            .iter()
            .map(|layer| {
                let rect = layer.rect();
                serde_json::json!({
                    "name": layer.name(),
                    "kind": match layer { Layer::TileMap(_) => "tilemap", Layer::Background(_) => "background" },
                    "width": rect.size.x,
                    "height": rect.size.y,
                    "visible": layer.is_visible(),
                })
            })
            .collect();
        let info = serde_json::json!({
            "level": settings,
            "map_size": [size.x, size.y],
            "layers": layers,
            "des": data.des.len().saturating_sub(1),
            "eta": data.eta.len(),
            "objects": data.objects.len(),
            "linked_objects": linked,
            "textures": textures.texture_count(),
            "texture_pixels": textures.pixel_count(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Level: {}", settings);
    println!("Map size: {}x{} px", size.x, size.y);
    println!("Layers:");
    for (i, layer) in data.layers.iter().enumerate() {
        let rect = layer.rect();
        let kind = match layer {
            Layer::TileMap(map) => format!("tile map {}x{} cells", map.map_size.x, map.map_size.y),
            Layer::Background(_) => "background".to_string(),
        };
        println!(
            "  [{}] {} {}x{} {}{}",
            i,
            layer.name().unwrap_or("-"),
            rect.size.x,
            rect.size.y,
            kind,
            if layer.is_visible() { "" } else { " (hidden)" }
        );
    }
    println!("Descriptor sets: {}", data.des.len().saturating_sub(1));
    println!("State tables: {}", data.eta.len());
    println!("Objects: {} ({} linked)", data.objects.len(), linked);
    println!("Textures: {} ({} px)", textures.texture_count(), textures.pixel_count());
    Ok(())
}

fn cmd_objects(dir: &Path, settings: Ray1Settings, config: &mut EditorConfig) -> Result<()> {
    let mut session = new_session(dir, config);
    open_level(&mut session, settings, config)?;
    let Some(data) = session.data() else { bail!("level not loaded") };

    println!("{:>5} {:>6} {:>6} {:>6} {:>9} {:>4} {:>4} {:>5} {:>6}", "#", "x", "y", "type", "state", "des", "eta", "hp", "link");
    for (i, obj) in data.objects.iter().enumerate() {
        let d = &obj.data;
        let link = match obj.link_group {
            0 => "-".to_string(),
            g => g.to_string(),
        };
        println!(
            "{:>5} {:>6} {:>6} {:>6} {:>9} {:>4} {:>4} {:>5} {:>6}",
            i,
            d.x,
            d.y,
            d.obj_type,
            format!("{}-{}", d.etat, d.sub_etat),
            d.des_index,
            d.eta_index,
            d.hit_points,
            link
        );
    }
    Ok(())
}

fn cmd_export(dir: &Path, settings: Ray1Settings, config: &mut EditorConfig, out: &Path) -> Result<()> {
    let mut session = new_session(dir, config);
    open_level(&mut session, settings, config)?;
    let Some(data) = session.data() else { bail!("level not loaded") };
    let written = export_layers(session.textures(), data, out)
        .with_context(|| format!("failed to export to {}", out.display()))?;
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_resave(dir: &Path, settings: Ray1Settings, config: &mut EditorConfig) -> Result<()> {
    let mut session = new_session(dir, config);
    open_level(&mut session, settings, config)?;
    session
        .save()
        .with_context(|| format!("failed to save {}", settings))?;
    println!("Saved {}", settings);
    Ok(())
}
