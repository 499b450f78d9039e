use anyhow::Result;

use crate::display::DisplayProbe;
use crate::keycodes::Action;
use crate::settings::{ControllerMode, GameSettings};

/// Title used for the settings window and every message box
pub const WINDOW_TITLE: &str = "SONIC THE HEDGEHOG 4 Episode I";

/// How a run of the settings panel ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiOutcome {
    /// User pressed the save button, start the game
    Launch,
    /// Window was closed without saving, don't start anything
    Closed,
    /// Language changed, show the panel again with the in-memory settings
    Restart,
}

/// A single edit made through the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    Display(u8),
    Resolution(usize),
    Fullscreen(bool),
    Language(usize),
    Controls(ControllerMode),
    Vibration(bool),
    DefaultKeys,
}

/// What the settings panel is allowed to do with the settings
///
/// Implemented by the launch session, the panel only ever talks to the
/// settings through this.
pub trait SettingsHandler {
    /// Current settings, for drawing
    fn settings(&self) -> &GameSettings;
    /// Apply one edit
    fn on_field_change(&mut self, change: FieldChange);
    /// Rebind an action to the key with the given native code
    ///
    /// Returns false (and keeps the old binding) for keys that can't be bound.
    fn on_remap_requested(&mut self, action: Action, native: u32) -> bool;
    /// Persist the settings
    fn on_save_requested(&mut self) -> Result<()>;
}

/// Trait for implementing the settings UI
///
/// A frontend shows the panel, reports errors to the user, and answers
/// display queries (number of screens, size of the primary one).
pub trait Frontend: DisplayProbe {
    /// Show the settings panel until the user saves, closes the window, or
    /// picks another language.
    fn run(&mut self, handler: &mut dyn SettingsHandler) -> Result<UiOutcome>;
    /// Show an error and wait for the user to acknowledge it
    fn show_error(&mut self, title: &str, message: &str);
}
