use anyhow::Result;
use log::{debug, info};

use crate::frontend::{FieldChange, SettingsHandler};
use crate::keycodes::{Action, DIK_IGNORE};
use crate::settings::GameSettings;

/// State shared between the launcher and the settings panel for one run
pub struct SettingsSession {
    settings: GameSettings,
    /// Set once the settings were written successfully
    saved: bool,
}

impl SettingsSession {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings,
            saved: false,
        }
    }

    /// Whether the last save request succeeded
    pub fn saved(&self) -> bool {
        self.saved
    }

    pub fn into_settings(self) -> GameSettings {
        self.settings
    }
}

impl SettingsHandler for SettingsSession {
    fn settings(&self) -> &GameSettings {
        &self.settings
    }

    fn on_field_change(&mut self, change: FieldChange) {
        debug!("Settings change: {change:?}");
        let settings = &mut self.settings;
        match change {
            FieldChange::Display(display) => settings.set_display(display),
            FieldChange::Resolution(index) => settings.set_resolution(index),
            FieldChange::Fullscreen(on) => settings.set_fullscreen(on),
            FieldChange::Language(index) => settings.set_language(index),
            FieldChange::Controls(mode) => settings.set_controls(mode),
            FieldChange::Vibration(on) => settings.set_vibration(on),
            FieldChange::DefaultKeys => settings.set_default_keys(),
        }
    }

    fn on_remap_requested(&mut self, action: Action, native: u32) -> bool {
        let dik = GameSettings::dx_key(native);
        if dik == DIK_IGNORE {
            debug!("Ignoring unbindable key {native} for {action:?}");
            return false;
        }
        info!("Binding {action:?} to {}", GameSettings::dx_name(dik));
        self.settings.set_key(action, dik);
        true
    }

    fn on_save_requested(&mut self) -> Result<()> {
        self.saved = false;
        self.settings.save()?;
        self.saved = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ControllerMode;

    #[test]
    fn field_changes_reach_the_settings() {
        let mut session = SettingsSession::new(GameSettings::new("main.conf"));
        session.on_field_change(FieldChange::Controls(ControllerMode::Gamepad));
        session.on_field_change(FieldChange::Language(9));
        session.on_field_change(FieldChange::Fullscreen(false));
        let settings = session.settings();
        assert_eq!(settings.controls(), ControllerMode::Gamepad);
        assert_eq!(settings.language(), 0);
        assert!(!settings.fullscreen());
    }

    #[test]
    fn remap_ignores_unbindable_keys() {
        let mut session = SettingsSession::new(GameSettings::new("main.conf"));
        let before = session.settings().key(Action::Up);
        // escape
        assert!(!session.on_remap_requested(Action::Up, 256));
        assert_eq!(session.settings().key(Action::Up), before);
        // W
        assert!(session.on_remap_requested(Action::Up, 87));
        assert_eq!(session.settings().key(Action::Up), 0x11);
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SettingsSession::new(GameSettings::new(
            dir.path().join("nope").join("main.conf"),
        ));
        assert!(session.on_save_requested().is_err());
        assert!(!session.saved());

        let mut session = SettingsSession::new(GameSettings::new(dir.path().join("main.conf")));
        session.on_save_requested().unwrap();
        assert!(session.saved());
    }
}
