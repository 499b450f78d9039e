use serde::{Deserialize, Serialize};

/// How the optional command line argument selects quiet mode
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuietRule {
    /// Quiet when the argument equals the marker (`launcher -QuickBoot`)
    MarkerPresent,
    /// Quiet when an argument is given that is anything *but* the marker.
    ///
    /// Legacy rule, for shortcuts that pass some other argument to skip the
    /// settings panel.
    AnyOtherArgument,
}

/// Configuration of the launcher itself
///
/// Separate from the game settings in `main.conf`, these only change how the
/// launcher finds and starts the game.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LauncherConfig {
    /// Game executable, relative to the launcher's directory
    pub game_executable: String,
    /// Game settings file, relative to the launcher's directory
    pub settings_file: String,
    /// Argument that asks for a quiet launch
    pub quiet_marker: String,
    pub quiet_rule: QuietRule,
    /// Give up waiting on the game after this many seconds, 0 waits forever
    pub wait_timeout_secs: u64,
    /// TrueType font for the settings window, relative to the launcher's
    /// directory. It needs glyphs for every panel language.
    pub font_file: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            game_executable: "Sonic_vis.exe".to_string(),
            settings_file: "main.conf".to_string(),
            quiet_marker: "-QuickBoot".to_string(),
            quiet_rule: QuietRule::MarkerPresent,
            wait_timeout_secs: 0,
            font_file: "launcher.ttf".to_string(),
        }
    }
}
