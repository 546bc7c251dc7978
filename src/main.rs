//! settings-tree CLI
//!
//! Manages the stores and presets of a configurator from the shell.

use anyhow::{Result, anyhow};
use clap::Parser;
use settings_tree::cli::{Cli, Command, parse_selection};
use settings_tree::config::EngineConfig;
use settings_tree::error::ParseError;
use settings_tree::format::{OutputFormat, format_presets, format_store};
use settings_tree::logging::{self, LogTarget};
use settings_tree::paths::{ConfigLayout, store_stem};
use settings_tree::presets::{PresetIndex, PresetSeed};
use settings_tree::store::Store;
use settings_tree::Configurator;
use std::path::Path;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut config = EngineConfig::resolve(cli.config.as_deref())?;
    if let Some(dir) = &cli.config_dir {
        config.paths.config_dir = dir.clone();
    }
    let format = OutputFormat::from_str(&cli.format)
        .ok_or_else(|| anyhow!("Unknown output format '{}'", cli.format))?;
    debug!(dir = %config.paths.config_dir.display(), "Using config dir");

    match cli.command {
        Command::Check(target) => run_check(&config, &target.guid),
        command => run_command(&config, command, format),
    }
}

/// Run a command against an opened configurator.
fn run_command(config: &EngineConfig, command: Command, format: OutputFormat) -> Result<()> {
    let guid = command.target().guid.clone();
    let mut cfg = Configurator::open(&guid, &guid, config)?;

    match command {
        Command::Presets(_) => {
            println!("{}", format_presets(&cfg.presets(), cfg.active_preset(), format));
        }
        Command::Show { preset, .. } => {
            let (title, store) = match preset.as_deref().and_then(parse_selection) {
                Some(id) => {
                    if !cfg.preset_exists(id) {
                        return Err(anyhow!("Preset '{}' not found", id));
                    }
                    (id.to_string(), Store::load(&cfg.layout().preset_store(id)))
                }
                None if preset.is_some() => (
                    "default".to_string(),
                    Store::load(&cfg.layout().default_store()),
                ),
                None => (
                    cfg.active_preset().unwrap_or("default").to_string(),
                    cfg.store().clone(),
                ),
            };
            println!("{}", format_store(&title, &store, format));
        }
        Command::Switch { preset, .. } => {
            let selection = parse_selection(&preset);
            cfg.switch_preset(selection)?;
            eprintln!("Active preset: {}", selection.unwrap_or("default"));
        }
        Command::Add { name, copy, .. } => {
            let seed = if copy {
                PresetSeed::CopyActive
            } else {
                PresetSeed::Empty
            };
            let file_id = cfg.add_preset(&name, seed)?;
            println!("{}", file_id);
        }
        Command::Rename { preset, name, .. } => {
            cfg.rename_preset(&preset, &name)?;
            eprintln!("Renamed {} to {}", preset, name);
        }
        Command::Move {
            preset, position, ..
        } => {
            cfg.move_preset(&preset, position)?;
            println!("{}", format_presets(&cfg.presets(), cfg.active_preset(), format));
        }
        Command::Delete { preset, .. } => {
            cfg.delete_preset(&preset)?;
            eprintln!("Deleted {}", preset);
        }
        Command::Export { name, .. } => {
            let name = match name {
                Some(name) => name,
                None => cfg
                    .active_preset()
                    .and_then(|id| cfg.preset(id))
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| cfg.guid().to_string()),
            };
            let path = cfg.export_active(&name)?;
            eprintln!("Exported to {}", path.display());
        }
        Command::Import { path, .. } => {
            let file_id = cfg.import_preset(&path)?;
            println!("{}", file_id);
        }
        Command::Discover(_) => {
            for file_id in cfg.discover_presets()? {
                println!("{}", file_id);
            }
        }
        // Runs without opening, see main.
        Command::Check(_) => {}
    }

    cfg.flush()?;
    Ok(())
}

/// Report problems in every store and the preset index without modifying
/// anything on disk.
fn run_check(config: &EngineConfig, guid: &str) -> Result<()> {
    let layout = ConfigLayout::new(&config.paths.config_dir, guid);
    let mut problems = 0;

    problems += report(&layout.default_store(), Store::check)?;
    let index_path = layout.index_file();
    problems += report(&index_path, PresetIndex::check)?;

    let index = PresetIndex::load(&index_path);
    for preset in index.ordered() {
        let path = layout.preset_store(&preset.file_id);
        if !path.exists() {
            println!("{}: preset '{}' has no store file", path.display(), preset.file_id);
            problems += 1;
            continue;
        }
        problems += report(&path, Store::check)?;
    }

    if let Ok(entries) = std::fs::read_dir(layout.presets_dir()) {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(stem) = store_stem(&path)
                && !index.contains(stem)
            {
                println!("{}: not listed in the preset index", path.display());
                problems += 1;
            }
        }
    }

    if problems > 0 {
        return Err(anyhow!("{} problem(s) found", problems));
    }
    eprintln!("No problems found");
    Ok(())
}

/// Print problems in one file. Missing files are fine.
fn report(path: &Path, check: fn(&str) -> Vec<ParseError>) -> Result<usize> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let problems = check(&content);
    for problem in &problems {
        println!("{}: {}", path.display(), problem);
    }
    Ok(problems.len())
}
