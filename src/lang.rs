use anyhow::{Context, Result, bail};

/// Names of the supported UI languages, in stored index order
pub const LANGUAGES: [&str; 6] = [
    "English",
    "Deutsch",
    "Español",
    "Français",
    "Italiano",
    "日本語",
];

/// Number of supported languages
pub const LANGUAGE_COUNT: usize = LANGUAGES.len();

/// Localized strings, built into the binary
const LANG_SOURCE: &str = include_str!("../resources/lang.txt");

/// Clamp a stored language index, unknown languages fall back to English
pub fn clamp_language_index(index: usize) -> usize {
    if index < LANGUAGE_COUNT { index } else { 0 }
}

/// Every string the settings panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiText {
    Settings,
    GraphicsDevice,
    Resolution,
    Fullscreen,
    Language,
    ControllerSelection,
    Movement,
    Action,
    Up,
    Down,
    Left,
    Right,
    Jump,
    Start,
    SaveSettings,
    Player,
    Select,
    Back,
    Keyboard,
    Gamepad,
    ScoreAttack,
    Press,
    ResetToDefault,
    SuperSonic,
    Vibrate,
}

impl UiText {
    pub const ALL: [UiText; 25] = [
        UiText::Settings,
        UiText::GraphicsDevice,
        UiText::Resolution,
        UiText::Fullscreen,
        UiText::Language,
        UiText::ControllerSelection,
        UiText::Movement,
        UiText::Action,
        UiText::Up,
        UiText::Down,
        UiText::Left,
        UiText::Right,
        UiText::Jump,
        UiText::Start,
        UiText::SaveSettings,
        UiText::Player,
        UiText::Select,
        UiText::Back,
        UiText::Keyboard,
        UiText::Gamepad,
        UiText::ScoreAttack,
        UiText::Press,
        UiText::ResetToDefault,
        UiText::SuperSonic,
        UiText::Vibrate,
    ];

    /// Key used for the entry in the language file
    pub fn key(self) -> &'static str {
        match self {
            UiText::Settings => "Settings",
            UiText::GraphicsDevice => "GraphicsDevice",
            UiText::Resolution => "Resolution",
            UiText::Fullscreen => "Fullscreen",
            UiText::Language => "Language",
            UiText::ControllerSelection => "ControllerSelection",
            UiText::Movement => "Movement",
            UiText::Action => "Action",
            UiText::Up => "Up",
            UiText::Down => "Down",
            UiText::Left => "Left",
            UiText::Right => "Right",
            UiText::Jump => "Jump",
            UiText::Start => "Start",
            UiText::SaveSettings => "SaveSettings",
            UiText::Player => "Player",
            UiText::Select => "Select",
            UiText::Back => "Back",
            UiText::Keyboard => "Keyboard",
            UiText::Gamepad => "Gamepad",
            UiText::ScoreAttack => "ScoreAttack",
            UiText::Press => "Press",
            UiText::ResetToDefault => "ResetToDefault",
            UiText::SuperSonic => "SuperSonic",
            UiText::Vibrate => "Vibrate",
        }
    }

    fn from_key(key: &str) -> Option<UiText> {
        UiText::ALL.into_iter().find(|text| text.key() == key)
    }
}

/// Table of UI strings, one row per [UiText], one column per language
#[derive(Debug)]
pub struct TextTable {
    rows: Vec<[String; LANGUAGE_COUNT]>,
}

impl TextTable {
    /// Parse the table built into the binary
    pub fn builtin() -> Result<Self> {
        Self::parse(LANG_SOURCE).context("Parsing built-in language table")
    }

    /// Parse a language file
    ///
    /// Each non-empty line not starting with `#` is `Key|text|text|...` with
    /// exactly one text per language. Every [UiText] must appear once.
    pub fn parse(source: &str) -> Result<Self> {
        let mut rows: Vec<Option<[String; LANGUAGE_COUNT]>> = vec![None; UiText::ALL.len()];

        for (line_no, line) in source.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split('|');
            let key = fields.next().unwrap_or_default().trim();
            let text = UiText::from_key(key)
                .with_context(|| format!("Unknown text key {key:?} on line {}", line_no + 1))?;
            let columns: Vec<String> = fields.map(str::to_string).collect();
            let Ok(columns) = <[String; LANGUAGE_COUNT]>::try_from(columns) else {
                bail!(
                    "Expected {LANGUAGE_COUNT} translations for {key:?} on line {}",
                    line_no + 1
                );
            };
            let slot = &mut rows[text as usize];
            if slot.is_some() {
                bail!("Text key {key:?} defined twice (line {})", line_no + 1);
            }
            *slot = Some(columns);
        }

        let rows = rows
            .into_iter()
            .zip(UiText::ALL)
            .map(|(row, text)| row.with_context(|| format!("Missing text key {:?}", text.key())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    /// Every character the panel can show, sorted and without repeats
    ///
    /// Printable ASCII is always included for key names and numbers.
    pub fn glyphs(&self) -> String {
        let mut chars: Vec<char> = (' '..='~')
            .chain(LANGUAGES.concat().chars())
            .chain(self.rows.iter().flatten().flat_map(|text| text.chars()))
            .collect();
        chars.sort_unstable();
        chars.dedup();
        chars.into_iter().collect()
    }

    /// Get a string in the given language, out of range languages use English
    pub fn get(&self, language: usize, text: UiText) -> &str {
        &self.rows[text as usize][clamp_language_index(language)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_complete() {
        let table = TextTable::builtin().unwrap();
        for text in UiText::ALL {
            for language in 0..LANGUAGE_COUNT {
                assert!(!table.get(language, text).is_empty(), "{text:?}/{language}");
            }
        }
        assert_eq!(table.get(0, UiText::Resolution), "Resolution");
        assert_eq!(table.get(1, UiText::Resolution), "Auflösung");
        assert_eq!(table.get(5, UiText::Language), "言語");
    }

    #[test]
    fn out_of_range_language_uses_english() {
        let table = TextTable::builtin().unwrap();
        assert_eq!(table.get(42, UiText::Up), "Up");
        assert_eq!(clamp_language_index(6), 0);
        assert_eq!(clamp_language_index(5), 5);
    }

    #[test]
    fn glyphs_cover_every_language() {
        let table = TextTable::builtin().unwrap();
        let glyphs = table.glyphs();
        for ch in ['A', '?', '0', 'ö', 'ñ', 'ç', '言', '語'] {
            assert!(glyphs.contains(ch), "{ch}");
        }
        let mut sorted: Vec<char> = glyphs.chars().collect();
        sorted.dedup();
        assert_eq!(sorted.len(), glyphs.chars().count());
    }

    #[test]
    fn parse_rejects_short_rows() {
        let err = TextTable::parse("Settings|a|b|c\n").unwrap_err();
        assert!(err.to_string().contains("Expected 6 translations"));
    }

    #[test]
    fn parse_rejects_unknown_and_duplicate_keys() {
        assert!(TextTable::parse("Bogus|a|b|c|d|e|f\n").is_err());
        let twice = format!("{0}\n{0}\n", "Up|a|b|c|d|e|f");
        let err = TextTable::parse(&twice).unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn parse_reports_missing_keys() {
        let err = TextTable::parse("# only a comment\n").unwrap_err();
        assert!(err.to_string().contains("Missing text key"));
    }
}
