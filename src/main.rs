pub mod config;
pub mod display;
pub mod frontend;
pub mod keycodes;
pub mod lang;
pub mod launcher;
pub mod noop_frontend;
pub mod panel;
pub mod session;
pub mod settings;
// Front end implementations
#[cfg(feature = "raylib")]
mod raylib_frontend;
use std::path::PathBuf;

// External crate uses
use anyhow::Result;
use clap::Parser;
use colog::basic_builder;
use log::{LevelFilter, debug, error, info, warn};

// Internal crate uses
use crate::config::LauncherConfig;
use crate::frontend::{Frontend, WINDOW_TITLE};
use crate::launcher::{EXIT_FAILURE, LaunchPaths, LaunchSequencer, Mode};
use crate::noop_frontend::NoOpFrontend;

const APP_NAME: &str = "s4launcher";

// CLI struct
#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Settings panel and launcher for SONIC THE HEDGEHOG 4 Episode I
///
/// Without arguments the settings panel is shown, and the game is started
/// once the settings are saved. Passing the quick boot marker (`-QuickBoot`
/// by default) skips the panel and starts the game with the saved settings,
/// creating default settings first if there are none.
struct Cli {
    /// Quick boot marker
    #[arg(value_name = "MARKER", allow_hyphen_values = true)]
    marker: Option<String>,

    /// Sets a custom launcher configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Turn on logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    logging: u8,
}

fn main() -> Result<()> {
    // Get command line arguments
    let args = Cli::parse();

    // Setup logging
    let level_filter = match args.logging {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    basic_builder()
        .default_format()
        .filter_level(level_filter)
        .init();

    // Get configuration
    info!("Getting launcher configuration from file");
    let loaded = match &args.config {
        Some(path) => confy::load_path(path),
        None => confy::load(APP_NAME, None),
    };
    let launcher_config: LauncherConfig = loaded.unwrap_or_else(|err| {
        warn!("Failed to load launcher configuration, using defaults: {err}");
        LauncherConfig::default()
    });
    debug!("Launcher configuration: {launcher_config:?}");

    let paths = match launcher::resolve_paths(std::env::current_exe(), &launcher_config) {
        Ok(paths) => paths,
        Err(err) => {
            error!("{err:#}");
            // No window exists yet, the error goes to the console
            NoOpFrontend::new().show_error(WINDOW_TITLE, "Failed to locate the launcher's install directory.");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let mode = launcher::select_mode(args.marker.as_deref(), &launcher_config);
    let code = match mode {
        Mode::Quiet => run_quiet(paths, &launcher_config),
        Mode::Interactive => run_interactive(paths, &launcher_config)?,
    };
    info!("Exiting with code {code}");
    std::process::exit(code);
}

cfg_if::cfg_if! {
    if #[cfg(feature = "raylib")] {
        /// Launch without the panel, defaults still follow the real display
        fn run_quiet(paths: LaunchPaths, launcher_config: &LauncherConfig) -> i32 {
            let mut console = NoOpFrontend::with_probe(raylib_frontend::MonitorProbe::new());
            LaunchSequencer::new(paths, launcher_config, &mut console).run(Mode::Quiet)
        }

        /// Show the settings panel in a raylib window, then launch
        fn run_interactive(paths: LaunchPaths, launcher_config: &LauncherConfig) -> Result<i32> {
            info!("Setting up raylib");
            let texts = lang::TextTable::builtin()?;
            let font_file = paths.install_dir.join(&launcher_config.font_file);
            let mut frontend = raylib_frontend::RaylibFrontend::new(texts, &font_file);
            Ok(LaunchSequencer::new(paths, launcher_config, &mut frontend).run(Mode::Interactive))
        }
    } else {
        /// Launch without the panel, there is no display to ask for defaults
        fn run_quiet(paths: LaunchPaths, launcher_config: &LauncherConfig) -> i32 {
            let mut console = NoOpFrontend::new();
            LaunchSequencer::new(paths, launcher_config, &mut console).run(Mode::Quiet)
        }

        /// Without a frontend the panel can't be shown, nothing gets launched
        fn run_interactive(paths: LaunchPaths, launcher_config: &LauncherConfig) -> Result<i32> {
            warn!("No available frontends, exiting");
            println!("No Available Frontends!");
            let mut console = NoOpFrontend::new();
            Ok(LaunchSequencer::new(paths, launcher_config, &mut console).run(Mode::Interactive))
        }
    }
}
