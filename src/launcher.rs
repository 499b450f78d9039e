// Std uses
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

// External uses
use anyhow::{Context, Result};
use log::{debug, error, info, warn};

// Internal uses
use crate::config::{LauncherConfig, QuietRule};
use crate::frontend::{Frontend, SettingsHandler, UiOutcome, WINDOW_TITLE};
use crate::session::SettingsSession;
use crate::settings::GameSettings;

// Exit codes
pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
// Win32 wait results, reported as the exit code when the wait goes wrong
pub const WAIT_ABANDONED: i32 = 0x80;
pub const WAIT_TIMEOUT: i32 = 0x102;
pub const WAIT_FAILED: i32 = -1;

// Polling interval for a bounded wait
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Files the launcher works with, all next to its own executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPaths {
    pub install_dir: PathBuf,
    pub settings_file: PathBuf,
    pub game_executable: PathBuf,
}

impl LaunchPaths {
    /// Derive every path from the install directory
    pub fn new<P: AsRef<Path>>(install_dir: P, config: &LauncherConfig) -> Self {
        let install_dir = install_dir.as_ref().to_path_buf();
        Self {
            settings_file: install_dir.join(&config.settings_file),
            game_executable: install_dir.join(&config.game_executable),
            install_dir,
        }
    }
}

/// Work out the install directory from the path of the running executable
///
/// Takes the result of [std::env::current_exe] so callers can't get past a
/// failed lookup.
pub fn resolve_paths(current_exe: io::Result<PathBuf>, config: &LauncherConfig) -> Result<LaunchPaths> {
    let exe = current_exe.context("Failed to locate the launcher executable")?;
    let dir = exe
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .with_context(|| format!("Executable path {} has no directory", exe.display()))?;
    debug!("Install directory: {}", dir.display());
    Ok(LaunchPaths::new(dir, config))
}

/// Which path the launcher takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Load or create the settings, then start the game straight away
    Quiet,
    /// Show the settings panel first
    Interactive,
}

/// Pick the mode from the optional command line argument
pub fn select_mode(arg: Option<&str>, config: &LauncherConfig) -> Mode {
    let quiet = match (config.quiet_rule, arg) {
        (_, None) => false,
        (QuietRule::MarkerPresent, Some(arg)) => arg == config.quiet_marker,
        (QuietRule::AnyOtherArgument, Some(arg)) => arg != config.quiet_marker,
    };
    if quiet { Mode::Quiet } else { Mode::Interactive }
}

/// How waiting on the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// Game exited with this code
    Exited(i32),
    /// Game was terminated without an exit code (killed by a signal)
    Abandoned,
    /// Bounded wait ran out, the game was stopped
    TimedOut,
    /// Waiting itself failed
    Failed,
}

impl WaitResult {
    /// Exit code the launcher passes on
    pub fn exit_code(self) -> i32 {
        match self {
            WaitResult::Exited(code) => code,
            WaitResult::Abandoned => WAIT_ABANDONED,
            WaitResult::TimedOut => WAIT_TIMEOUT,
            WaitResult::Failed => WAIT_FAILED,
        }
    }

    /// Message shown to the user, none for a normal exit
    pub fn message(self) -> Option<&'static str> {
        match self {
            WaitResult::Exited(_) => None,
            WaitResult::Abandoned => Some("Process abandoned."),
            WaitResult::TimedOut => Some("Process time-out error."),
            WaitResult::Failed => Some("Process failed"),
        }
    }
}

/// Start the game with no arguments and the launcher's own streams
pub fn spawn_game(executable: &Path, working_dir: &Path) -> Result<Child> {
    info!("Starting {}", executable.display());
    Command::new(executable)
        .current_dir(working_dir)
        .spawn()
        .with_context(|| format!("Failed to start {}", executable.display()))
}

/// Block until the child exits, or until `timeout` passes if one is given
///
/// A game still running when the timeout passes is killed and reaped.
pub fn wait_for(child: &mut Child, timeout: Option<Duration>) -> WaitResult {
    let status = match timeout {
        None => child.wait(),
        Some(timeout) => {
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break Ok(status),
                    Ok(None) if start.elapsed() >= timeout => {
                        warn!("Game still running after {timeout:?}, stopping it");
                        if let Err(err) = child.kill().and_then(|()| child.wait()) {
                            error!("Failed to stop the game: {err}");
                        }
                        return WaitResult::TimedOut;
                    }
                    Ok(None) => thread::sleep(POLL_INTERVAL),
                    Err(err) => break Err(err),
                }
            }
        }
    };
    match status {
        Ok(status) => match status.code() {
            Some(code) => WaitResult::Exited(code),
            None => WaitResult::Abandoned,
        },
        Err(err) => {
            error!("Waiting on the game failed: {err}");
            WaitResult::Failed
        }
    }
}

/// Drives one run of the launcher: settings, then the game
pub struct LaunchSequencer<'a> {
    paths: LaunchPaths,
    wait_timeout: Option<Duration>,
    frontend: &'a mut dyn Frontend,
}

impl<'a> LaunchSequencer<'a> {
    pub fn new(paths: LaunchPaths, config: &LauncherConfig, frontend: &'a mut dyn Frontend) -> Self {
        let wait_timeout = match config.wait_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self {
            paths,
            wait_timeout,
            frontend,
        }
    }

    /// Run the launcher in the given mode, returning the process exit code
    pub fn run(&mut self, mode: Mode) -> i32 {
        info!("Running in {mode:?} mode");
        let launch = match mode {
            Mode::Quiet => {
                self.prepare_quiet();
                true
            }
            Mode::Interactive => match self.edit_interactive() {
                Ok(launch) => launch,
                Err(err) => {
                    error!("{err:#}");
                    self.frontend
                        .show_error(WINDOW_TITLE, &format!("Settings window failed: {err}"));
                    return EXIT_FAILURE;
                }
            },
        };
        if !launch {
            info!("Settings closed without saving, not starting the game");
            return EXIT_OK;
        }
        self.launch_game()
    }

    /// Make sure a settings file exists, without asking the user anything
    fn prepare_quiet(&mut self) {
        let mut settings = GameSettings::new(&self.paths.settings_file);
        if let Err(err) = settings.load() {
            warn!("{err:#}, writing defaults");
            settings.load_defaults(&*self.frontend);
            if let Err(err) = settings.save() {
                error!("{err:#}");
                self.frontend
                    .show_error(WINDOW_TITLE, "Failed to save configuration.");
            }
        }
    }

    /// Show the settings panel, returns whether the game should be started
    fn edit_interactive(&mut self) -> Result<bool> {
        let mut settings = GameSettings::new(&self.paths.settings_file);
        if let Err(err) = settings.load() {
            warn!("{err:#}, using defaults");
            settings.load_defaults(&*self.frontend);
        }
        let mut session = SettingsSession::new(settings);

        loop {
            match self.frontend.run(&mut session)? {
                UiOutcome::Launch => {
                    if !session.saved() {
                        warn!(
                            "Starting the game without saving {}",
                            session.settings().path().display()
                        );
                    }
                    return Ok(true);
                }
                UiOutcome::Closed => return Ok(false),
                UiOutcome::Restart => {
                    // Keep the in-memory settings, only the panel is rebuilt
                    let settings = session.into_settings();
                    debug!("Restarting settings panel, language {}", settings.language());
                    session = SettingsSession::new(settings);
                }
            }
        }
    }

    /// Start the game and wait for it, returning the exit code to pass on
    fn launch_game(&mut self) -> i32 {
        let title = format!("Error: {}", file_name(&self.paths.game_executable));
        let mut child = match spawn_game(&self.paths.game_executable, &self.paths.install_dir) {
            Ok(child) => child,
            Err(err) => {
                error!("{err:#}");
                self.frontend.show_error(&title, "Failed to start the game process.");
                return EXIT_FAILURE;
            }
        };

        let result = wait_for(&mut child, self.wait_timeout);
        info!("Game finished: {result:?}");
        if let Some(message) = result.message() {
            self.frontend.show_error(&title, message);
        }
        result.exit_code()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
