use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};

use crate::display::{self, DisplayProbe};
use crate::keycodes::{self, Action, DEFAULT_BINDINGS};
use crate::lang;

// On-disk layout constants
const MAGIC: [u8; 4] = *b"S4LC";
const LAYOUT_VERSION: u8 = 1;
const KEY_COUNT: usize = Action::ALL.len();
/// Total size of a settings file in bytes
pub const RECORD_SIZE: usize = MAGIC.len() + 1 + 6 + KEY_COUNT;

// Field offsets
const OFF_VERSION: usize = 4;
const OFF_DISPLAY: usize = 5;
const OFF_RESOLUTION: usize = 6;
const OFF_FULLSCREEN: usize = 7;
const OFF_LANGUAGE: usize = 8;
const OFF_CONTROLS: usize = 9;
const OFF_VIBRATION: usize = 10;
const OFF_KEYS: usize = 11;

/// Which input scheme the game uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerMode {
    #[default]
    Keyboard = 0,
    Gamepad = 1,
}

impl ControllerMode {
    /// Convert a raw value, anything past the last variant clamps to it
    pub fn from_raw(raw: u8) -> Self {
        if raw == 0 {
            ControllerMode::Keyboard
        } else {
            ControllerMode::Gamepad
        }
    }
}

/// Settings the game reads from `main.conf`
///
/// Mutators clamp their input instead of failing, so the record always holds
/// values the game can use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// File the settings are loaded from and saved to
    path: PathBuf,
    display: u8,
    resolution: u8,
    fullscreen: bool,
    language: u8,
    controls: ControllerMode,
    vibration: bool,
    /// Stored key ids indexed like [Action::ALL]
    keys: [u8; KEY_COUNT],
}

impl GameSettings {
    /// Create a record for the given file, holding defaults for an unknown display
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            display: 0,
            resolution: 0,
            fullscreen: true,
            language: 0,
            controls: ControllerMode::Keyboard,
            vibration: true,
            keys: DEFAULT_BINDINGS,
        }
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file
    ///
    /// On error the record is left exactly as it was.
    pub fn load(&mut self) -> Result<()> {
        // One byte past the record is enough to tell an oversized file apart
        let mut contents = Vec::with_capacity(RECORD_SIZE + 1);
        fs::File::open(&self.path)
            .and_then(|file| file.take(RECORD_SIZE as u64 + 1).read_to_end(&mut contents))
            .with_context(|| format!("Failed to read settings file {}", self.path.display()))?;
        self.apply_bytes(&contents)
            .with_context(|| format!("Invalid settings file {}", self.path.display()))?;
        info!("Loaded settings from {}", self.path.display());
        Ok(())
    }

    /// Decode a full record and apply it, validating before touching any field
    fn apply_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        validate(bytes)?;

        self.display = bytes[OFF_DISPLAY];
        self.set_resolution(bytes[OFF_RESOLUTION] as usize);
        self.fullscreen = bytes[OFF_FULLSCREEN] != 0;
        self.set_language(bytes[OFF_LANGUAGE] as usize);
        self.controls = ControllerMode::from_raw(bytes[OFF_CONTROLS]);
        self.vibration = bytes[OFF_VIBRATION] != 0;
        for (action, &dik) in Action::ALL.iter().zip(&bytes[OFF_KEYS..OFF_KEYS + KEY_COUNT]) {
            if !keycodes::is_known_dx(dik) {
                warn!("Unknown key id {dik:#04x} for {action:?}, using the default");
            }
            self.set_key(*action, dik);
        }
        Ok(())
    }

    /// Reset every field to its default
    ///
    /// The resolution is the largest one the primary display can show.
    pub fn load_defaults<P: DisplayProbe + ?Sized>(&mut self, probe: &P) {
        let mode = probe.primary_mode();
        debug!("Primary display mode: {mode:?}");
        self.display = 0;
        self.resolution = display::default_resolution_index(mode) as u8;
        self.fullscreen = true;
        self.language = 0;
        self.controls = ControllerMode::Keyboard;
        self.vibration = true;
        self.set_default_keys();
        info!("Using default settings");
    }

    /// Encode the record in its on-disk layout
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[..MAGIC.len()].copy_from_slice(&MAGIC);
        bytes[OFF_VERSION] = LAYOUT_VERSION;
        bytes[OFF_DISPLAY] = self.display;
        bytes[OFF_RESOLUTION] = self.resolution;
        bytes[OFF_FULLSCREEN] = self.fullscreen as u8;
        bytes[OFF_LANGUAGE] = self.language;
        bytes[OFF_CONTROLS] = self.controls as u8;
        bytes[OFF_VIBRATION] = self.vibration as u8;
        bytes[OFF_KEYS..].copy_from_slice(&self.keys);
        bytes
    }

    /// Write the settings file
    ///
    /// The record goes to a sibling temp file first which then replaces the
    /// target, so a failed write never leaves a half-written `main.conf`.
    pub fn save(&self) -> Result<()> {
        let tmp_path = temp_path(&self.path);
        let write_tmp = || -> Result<()> {
            let mut file = fs::File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            file.write_all(&self.to_bytes())
                .context("Failed to write settings")?;
            file.sync_all().context("Failed to flush settings")?;
            Ok(())
        };
        if let Err(err) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err)
                .with_context(|| format!("Failed to replace {}", self.path.display()));
        }
        info!("Saved settings to {}", self.path.display());
        Ok(())
    }

    // Field accessors

    pub fn display(&self) -> u8 {
        self.display
    }

    pub fn set_display(&mut self, display: u8) {
        self.display = display;
    }

    /// Index into [display::RESOLUTIONS]
    pub fn resolution(&self) -> usize {
        self.resolution as usize
    }

    pub fn set_resolution(&mut self, index: usize) {
        self.resolution = display::clamp_resolution_index(index) as u8;
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    /// Index into [lang::LANGUAGES]
    pub fn language(&self) -> usize {
        self.language as usize
    }

    pub fn set_language(&mut self, index: usize) {
        self.language = lang::clamp_language_index(index) as u8;
    }

    pub fn controls(&self) -> ControllerMode {
        self.controls
    }

    pub fn set_controls(&mut self, controls: ControllerMode) {
        self.controls = controls;
    }

    pub fn vibration(&self) -> bool {
        self.vibration
    }

    pub fn set_vibration(&mut self, vibration: bool) {
        self.vibration = vibration;
    }

    /// Stored key id bound to an action
    pub fn key(&self, action: Action) -> u8 {
        self.keys[action.index()]
    }

    /// Bind an action to a stored key id
    ///
    /// Ids the key table doesn't know are replaced with the action's default,
    /// so every action always has a usable binding.
    pub fn set_key(&mut self, action: Action, dik: u8) {
        self.keys[action.index()] = if keycodes::is_known_dx(dik) {
            dik
        } else {
            DEFAULT_BINDINGS[action.index()]
        };
    }

    /// Reset only the key bindings
    pub fn set_default_keys(&mut self) {
        self.keys = DEFAULT_BINDINGS;
    }

    /// Translate a native key code into a stored key id
    pub fn dx_key(native: u32) -> u8 {
        keycodes::dx_key(native)
    }

    /// Caption for a stored key id
    pub fn dx_name(dik: u8) -> &'static str {
        keycodes::dx_name(dik)
    }
}

/// Structural check shared by load and the tests of save
pub fn validate(bytes: &[u8]) -> Result<()> {
    if bytes.len() != RECORD_SIZE {
        bail!("Expected {RECORD_SIZE} bytes, found {}", bytes.len());
    }
    if bytes[..MAGIC.len()] != MAGIC {
        bail!("Bad magic marker");
    }
    if bytes[OFF_VERSION] != LAYOUT_VERSION {
        bail!("Unsupported layout version {}", bytes[OFF_VERSION]);
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{HeadlessProbe, RESOLUTIONS};
    use crate::keycodes::DIK_IGNORE;
    use tempfile::tempdir;

    struct FixedProbe(u32, u32);

    impl DisplayProbe for FixedProbe {
        fn screen_count(&self) -> usize {
            2
        }

        fn primary_mode(&self) -> Option<(u32, u32)> {
            Some((self.0, self.1))
        }
    }

    fn customized(path: &Path) -> GameSettings {
        let mut settings = GameSettings::new(path);
        settings.set_display(1);
        settings.set_resolution(9);
        settings.set_fullscreen(false);
        settings.set_language(3);
        settings.set_controls(ControllerMode::Gamepad);
        settings.set_vibration(false);
        settings.set_key(Action::ButtonA, 0x39);
        settings.set_key(Action::Start, 0x0F);
        settings
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.conf");
        let saved = customized(&path);
        saved.save().unwrap();

        let mut loaded = GameSettings::new(&path);
        loaded.load().unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn missing_file_then_defaults_then_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.conf");
        let mut settings = GameSettings::new(&path);
        assert!(settings.load().is_err());

        settings.load_defaults(&FixedProbe(1920, 1080));
        assert_eq!(RESOLUTIONS[settings.resolution()].width, 1920);
        settings.save().unwrap();

        let mut reloaded = GameSettings::new(&path);
        reloaded.load().unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn defaults_pass_validation() {
        let mut settings = GameSettings::new("main.conf");
        settings.load_defaults(&HeadlessProbe);
        validate(&settings.to_bytes()).unwrap();
        assert_eq!(settings.resolution(), 0);
        assert!(settings.fullscreen());
        assert!(settings.vibration());
        assert_eq!(settings.controls(), ControllerMode::Keyboard);
    }

    #[test]
    fn empty_file_leaves_record_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.conf");
        fs::write(&path, b"").unwrap();
        let mut settings = customized(&path);
        let before = settings.clone();
        assert!(settings.load().is_err());
        assert_eq!(settings, before);
    }

    #[test]
    fn foreign_files_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.conf");
        let good = customized(&path).to_bytes();

        let mut bad_magic = good;
        bad_magic[0] = b'X';
        let mut bad_version = good;
        bad_version[OFF_VERSION] = 9;
        let truncated = &good[..RECORD_SIZE - 1];

        for bytes in [&bad_magic[..], &bad_version[..], truncated] {
            fs::write(&path, bytes).unwrap();
            let mut settings = GameSettings::new(&path);
            let before = settings.clone();
            assert!(settings.load().is_err());
            assert_eq!(settings, before);
        }
    }

    #[test]
    fn oversized_file_is_rejected_after_a_bounded_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.conf");
        let mut bytes = customized(&path).to_bytes().to_vec();
        bytes.resize(1 << 20, 0xAA);
        fs::write(&path, &bytes).unwrap();

        let mut settings = GameSettings::new(&path);
        let before = settings.clone();
        let err = settings.load().unwrap_err();
        assert!(format!("{err:#}").contains(&format!("found {}", RECORD_SIZE + 1)));
        assert_eq!(settings, before);
    }

    #[test]
    fn out_of_range_fields_are_clamped_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.conf");
        let mut bytes = GameSettings::new(&path).to_bytes();
        bytes[OFF_LANGUAGE] = 6;
        bytes[OFF_RESOLUTION] = 200;
        bytes[OFF_CONTROLS] = 7;
        bytes[OFF_KEYS] = DIK_IGNORE;
        fs::write(&path, bytes).unwrap();

        let mut settings = GameSettings::new(&path);
        settings.load().unwrap();
        assert_eq!(settings.language(), 0);
        assert_eq!(settings.resolution(), RESOLUTIONS.len() - 1);
        assert_eq!(settings.controls(), ControllerMode::Gamepad);
        assert_eq!(settings.key(Action::Up), DEFAULT_BINDINGS[0]);
    }

    #[test]
    fn mutators_clamp() {
        let mut settings = GameSettings::new("main.conf");
        settings.set_language(255);
        assert_eq!(settings.language(), 0);
        settings.set_resolution(usize::MAX);
        assert_eq!(settings.resolution(), RESOLUTIONS.len() - 1);
        settings.set_key(Action::Left, 0xFF);
        assert_eq!(settings.key(Action::Left), 0xCB);
    }

    #[test]
    fn shared_keys_persist_independently() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.conf");
        let mut settings = GameSettings::new(&path);
        let down = settings.key(Action::Down);
        settings.set_key(Action::Up, down);
        settings.save().unwrap();

        let mut loaded = GameSettings::new(&path);
        loaded.load().unwrap();
        assert_eq!(loaded.key(Action::Up), down);
        assert_eq!(loaded.key(Action::Down), down);
    }

    #[test]
    fn default_keys_reset_only_bindings() {
        let mut settings = customized(Path::new("main.conf"));
        settings.set_default_keys();
        assert_eq!(settings.key(Action::ButtonA), DEFAULT_BINDINGS[Action::ButtonA.index()]);
        assert_eq!(settings.language(), 3);
        assert!(!settings.vibration());
    }

    #[test]
    fn failed_save_keeps_existing_file() {
        let dir = tempdir().unwrap();
        // Saving into a directory that does not exist can't create the temp file
        let path = dir.path().join("missing").join("main.conf");
        assert!(GameSettings::new(&path).save().is_err());

        // A directory sitting at the target path makes the final rename fail
        let blocked = dir.path().join("blocked.conf");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), b"x").unwrap();
        assert!(GameSettings::new(&blocked).save().is_err());
        assert!(blocked.join("keep").exists());
        assert!(!dir.path().join("blocked.conf.tmp").exists());
    }
}
