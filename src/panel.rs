//! Settings panel model
//!
//! Lays out the panel as a flat list of widgets and turns clicks and key
//! presses into calls on a [SettingsHandler]. Drawing is left to the frontend,
//! which keeps this part usable (and testable) without a window.

use anyhow::Result;

use crate::display::{self, RESOLUTIONS};
use crate::frontend::{FieldChange, SettingsHandler};
use crate::keycodes::Action;
use crate::lang::{LANGUAGES, TextTable, UiText};
use crate::settings::{ControllerMode, GameSettings};

// Window size defaults
pub const PANEL_WIDTH: i32 = 762;
pub const PANEL_HEIGHT: i32 = 656;

// Choice widget geometry
const CHOICE_X: i32 = 42;
const CHOICE_W: i32 = 328;
const ROW_H: i32 = 24;
const ARROW_W: i32 = 24;

// Key binding button size
const KEY_W: i32 = 89;
const KEY_H: i32 = 38;

/// Axis aligned rectangle in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Settings,
    Player,
}

/// Settings edited with a previous/next pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Display,
    Resolution,
    Language,
    Controls,
}

/// What happens when a widget is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Tab(Tab),
    Previous(Choice),
    Next(Choice),
    ToggleFullscreen,
    ToggleVibration,
    Bind(Action),
    ResetKeys,
    Save,
}

/// How a widget should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Caption,
    Frame,
    Tab { active: bool },
    Button,
    Value,
    Checkbox { checked: bool },
    KeyButton { waiting: bool },
    BigButton,
    PadLabel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub rect: Rect,
    pub label: String,
    pub style: Style,
    pub control: Option<Control>,
}

impl Widget {
    fn new(rect: Rect, label: impl Into<String>, style: Style, control: Option<Control>) -> Self {
        Self {
            rect,
            label: label.into(),
            style,
            control,
        }
    }
}

/// Result of feeding an input event to the panel
#[derive(Debug)]
pub enum PanelEvent {
    None,
    /// Language changed, the frontend should rebuild itself
    Restart,
    /// Save was requested, carries the outcome of the save
    Launch(Result<()>),
}

/// UI state not stored in the settings themselves
pub struct Panel {
    tab: Tab,
    /// Action waiting for a key press after its button was clicked
    waiting: Option<Action>,
    screen_count: usize,
}

impl Panel {
    pub fn new(screen_count: usize) -> Self {
        Self {
            tab: Tab::Settings,
            waiting: None,
            screen_count: screen_count.max(1),
        }
    }

    #[cfg(test)]
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Action currently waiting for a key, if any
    #[cfg(test)]
    pub fn waiting(&self) -> Option<Action> {
        self.waiting
    }

    /// Build the widget list for the current state, back to front
    pub fn layout(&self, settings: &GameSettings, texts: &TextTable) -> Vec<Widget> {
        let lang = settings.language();
        let t = |text| texts.get(lang, text).to_string();
        let mut widgets = Vec::new();

        // Tabs and body frame
        widgets.push(Widget::new(
            Rect::new(32, 36, 698, 512),
            "",
            Style::Frame,
            None,
        ));
        widgets.push(Widget::new(
            Rect::new(32, 16, 140, 20),
            t(UiText::Settings),
            Style::Tab {
                active: self.tab == Tab::Settings,
            },
            Some(Control::Tab(Tab::Settings)),
        ));
        widgets.push(Widget::new(
            Rect::new(172, 16, 140, 20),
            format!("{} 1", t(UiText::Player)),
            Style::Tab {
                active: self.tab == Tab::Player,
            },
            Some(Control::Tab(Tab::Player)),
        ));

        match self.tab {
            Tab::Settings => {
                let device = format!("Display {}", settings.display());
                push_choice(&mut widgets, t(UiText::GraphicsDevice), 64, Choice::Display, device);
                let resolution = display::resolution(settings.resolution()).map_or("?", |r| r.label);
                push_choice(&mut widgets, t(UiText::Resolution), 112, Choice::Resolution, resolution);
                push_checkbox(
                    &mut widgets,
                    t(UiText::Fullscreen),
                    150,
                    settings.fullscreen(),
                    Control::ToggleFullscreen,
                );
                push_choice(&mut widgets, t(UiText::Language), 228, Choice::Language, LANGUAGES[lang]);
            }
            Tab::Player => {
                let controls = match settings.controls() {
                    ControllerMode::Keyboard => t(UiText::Keyboard),
                    ControllerMode::Gamepad => t(UiText::Gamepad),
                };
                push_choice(
                    &mut widgets,
                    t(UiText::ControllerSelection),
                    64,
                    Choice::Controls,
                    controls,
                );
                match settings.controls() {
                    ControllerMode::Keyboard => self.keyboard_widgets(&mut widgets, settings, texts),
                    ControllerMode::Gamepad => gamepad_widgets(&mut widgets, settings, texts),
                }
            }
        }

        widgets.push(Widget::new(
            Rect::new(62, 564, 642, 68),
            t(UiText::SaveSettings),
            Style::BigButton,
            Some(Control::Save),
        ));
        widgets
    }

    fn keyboard_widgets(&self, widgets: &mut Vec<Widget>, settings: &GameSettings, texts: &TextTable) {
        let lang = settings.language();
        let t = |text| texts.get(lang, text).to_string();
        let jump_back = format!("{} / {}", t(UiText::Jump), t(UiText::Back));
        let jump_select = format!("{} / {}", t(UiText::Jump), t(UiText::Select));

        widgets.push(Widget::new(
            Rect::new(CHOICE_X, 102, CHOICE_W, ROW_H),
            t(UiText::ResetToDefault),
            Style::Button,
            Some(Control::ResetKeys),
        ));
        widgets.push(Widget::new(
            Rect::new(59, 192, 312, 277),
            t(UiText::Movement),
            Style::Frame,
            None,
        ));
        widgets.push(Widget::new(
            Rect::new(407, 192, 294, 277),
            t(UiText::Action),
            Style::Frame,
            None,
        ));

        // (action, button x, button y, caption, caption below the button)
        let buttons = [
            (Action::Up, 174, 241, t(UiText::Up), false),
            (Action::Left, 70, 311, t(UiText::Left), false),
            (Action::Right, 274, 311, t(UiText::Right), false),
            (Action::Down, 174, 381, t(UiText::Down), true),
            (Action::ButtonX, 432, 243, t(UiText::ScoreAttack), false),
            (Action::ButtonY, 432, 329, t(UiText::SuperSonic), false),
            (Action::ButtonB, 432, 411, jump_back, false),
            (Action::Start, 590, 329, t(UiText::Start), false),
            (Action::ButtonA, 590, 411, jump_select, false),
        ];
        for (action, x, y, caption, below) in buttons {
            let caption_y = if below { y + KEY_H + 4 } else { y - 20 };
            widgets.push(Widget::new(
                Rect::new(x, caption_y, 200, 16),
                caption,
                Style::Caption,
                None,
            ));
            let waiting = self.waiting == Some(action);
            let label = if waiting {
                t(UiText::Press)
            } else {
                GameSettings::dx_name(settings.key(action)).to_string()
            };
            widgets.push(Widget::new(
                Rect::new(x, y, KEY_W, KEY_H),
                label,
                Style::KeyButton { waiting },
                Some(Control::Bind(action)),
            ));
        }
    }

    /// Handle a left click at window coordinates
    pub fn click(&mut self, x: i32, y: i32, handler: &mut dyn SettingsHandler, texts: &TextTable) -> PanelEvent {
        let control = self
            .layout(handler.settings(), texts)
            .into_iter()
            .rev()
            .find(|widget| widget.control.is_some() && widget.rect.contains(x, y))
            .and_then(|widget| widget.control);
        // Clicking anywhere stops waiting for a key
        self.waiting = None;

        let Some(control) = control else {
            return PanelEvent::None;
        };
        self.apply(control, handler)
    }

    /// Trigger a control directly, as a click on it would
    pub fn apply(&mut self, control: Control, handler: &mut dyn SettingsHandler) -> PanelEvent {
        let settings = handler.settings();
        match control {
            Control::Tab(tab) => self.tab = tab,
            Control::Previous(choice) | Control::Next(choice) => {
                let forward = matches!(control, Control::Next(_));
                let count = self.choice_count(choice);
                let current = choice_value(choice, settings);
                let value = if forward {
                    (current + 1) % count
                } else {
                    (current + count - 1) % count
                };
                if value == current {
                    return PanelEvent::None;
                }
                let change = match choice {
                    Choice::Display => FieldChange::Display(value as u8),
                    Choice::Resolution => FieldChange::Resolution(value),
                    Choice::Language => FieldChange::Language(value),
                    Choice::Controls => FieldChange::Controls(ControllerMode::from_raw(value as u8)),
                };
                handler.on_field_change(change);
                if choice == Choice::Language {
                    return PanelEvent::Restart;
                }
            }
            Control::ToggleFullscreen => {
                let on = !settings.fullscreen();
                handler.on_field_change(FieldChange::Fullscreen(on));
            }
            Control::ToggleVibration => {
                let on = !settings.vibration();
                handler.on_field_change(FieldChange::Vibration(on));
            }
            Control::Bind(action) => self.waiting = Some(action),
            Control::ResetKeys => handler.on_field_change(FieldChange::DefaultKeys),
            Control::Save => return PanelEvent::Launch(handler.on_save_requested()),
        }
        PanelEvent::None
    }

    /// Handle a key press, only used while a binding button waits for a key
    pub fn key_pressed(&mut self, native: u32, handler: &mut dyn SettingsHandler) -> PanelEvent {
        if let Some(action) = self.waiting.take() {
            handler.on_remap_requested(action, native);
        }
        PanelEvent::None
    }

    fn choice_count(&self, choice: Choice) -> usize {
        match choice {
            Choice::Display => self.screen_count,
            Choice::Resolution => RESOLUTIONS.len(),
            Choice::Language => LANGUAGES.len(),
            Choice::Controls => 2,
        }
    }
}

fn choice_value(choice: Choice, settings: &GameSettings) -> usize {
    match choice {
        Choice::Display => settings.display() as usize,
        Choice::Resolution => settings.resolution(),
        Choice::Language => settings.language(),
        Choice::Controls => settings.controls() as usize,
    }
}

fn push_choice(widgets: &mut Vec<Widget>, caption: String, y: i32, choice: Choice, value: impl Into<String>) {
    widgets.push(Widget::new(
        Rect::new(CHOICE_X, y - 18, CHOICE_W, 16),
        caption,
        Style::Caption,
        None,
    ));
    widgets.push(Widget::new(
        Rect::new(CHOICE_X, y, ARROW_W, ROW_H),
        "<",
        Style::Button,
        Some(Control::Previous(choice)),
    ));
    widgets.push(Widget::new(
        Rect::new(CHOICE_X + ARROW_W, y, CHOICE_W - 2 * ARROW_W, ROW_H),
        value,
        Style::Value,
        None,
    ));
    widgets.push(Widget::new(
        Rect::new(CHOICE_X + CHOICE_W - ARROW_W, y, ARROW_W, ROW_H),
        ">",
        Style::Button,
        Some(Control::Next(choice)),
    ));
}

fn push_checkbox(widgets: &mut Vec<Widget>, caption: String, y: i32, checked: bool, control: Control) {
    widgets.push(Widget::new(
        Rect::new(CHOICE_X, y, ROW_H, ROW_H),
        "",
        Style::Checkbox { checked },
        Some(control),
    ));
    widgets.push(Widget::new(
        Rect::new(CHOICE_X + ROW_H + 6, y, CHOICE_W - ROW_H - 6, ROW_H),
        caption,
        Style::Caption,
        Some(control),
    ));
}

fn gamepad_widgets(widgets: &mut Vec<Widget>, settings: &GameSettings, texts: &TextTable) {
    let lang = settings.language();
    let t = |text| texts.get(lang, text).to_string();
    push_checkbox(
        widgets,
        t(UiText::Vibrate),
        102,
        settings.vibration(),
        Control::ToggleVibration,
    );

    let left = [UiText::Back, UiText::Up, UiText::Right, UiText::Left, UiText::Down];
    for (row, text) in left.into_iter().enumerate() {
        widgets.push(Widget::new(
            Rect::new(144, 207 + row as i32 * 28, 180, 18),
            t(text),
            Style::PadLabel,
            None,
        ));
    }
    let right = [
        t(UiText::Start),
        t(UiText::SuperSonic),
        t(UiText::ScoreAttack),
        format!("{} / {}", t(UiText::Jump), t(UiText::Back)),
        format!("{} / {}", t(UiText::Jump), t(UiText::Select)),
    ];
    for (row, label) in right.into_iter().enumerate() {
        widgets.push(Widget::new(
            Rect::new(442, 207 + row as i32 * 28, 250, 18),
            label,
            Style::PadLabel,
            None,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SettingsSession;
    use tempfile::tempdir;

    fn setup(path: &std::path::Path) -> (Panel, SettingsSession, TextTable) {
        let session = SettingsSession::new(GameSettings::new(path));
        (Panel::new(2), session, TextTable::builtin().unwrap())
    }

    fn click_on(panel: &mut Panel, session: &mut SettingsSession, texts: &TextTable, control: Control) -> PanelEvent {
        let widget = panel
            .layout(session.settings(), texts)
            .into_iter()
            .rev()
            .find(|widget| widget.control == Some(control))
            .unwrap_or_else(|| panic!("{control:?} not on screen"));
        let (x, y) = widget.rect.center();
        panel.click(x, y, session, texts)
    }

    #[test]
    fn save_button_saves() {
        let dir = tempdir().unwrap();
        let (mut panel, mut session, texts) = setup(&dir.path().join("main.conf"));
        let event = click_on(&mut panel, &mut session, &texts, Control::Save);
        assert!(matches!(event, PanelEvent::Launch(Ok(()))));
        assert!(session.saved());
        assert!(dir.path().join("main.conf").exists());
    }

    #[test]
    fn save_failure_is_returned() {
        let dir = tempdir().unwrap();
        let (mut panel, mut session, texts) = setup(&dir.path().join("gone").join("main.conf"));
        let event = click_on(&mut panel, &mut session, &texts, Control::Save);
        assert!(matches!(event, PanelEvent::Launch(Err(_))));
    }

    #[test]
    fn binding_button_waits_for_key() {
        let (mut panel, mut session, texts) = setup(std::path::Path::new("main.conf"));
        click_on(&mut panel, &mut session, &texts, Control::Tab(Tab::Player));
        assert_eq!(panel.tab(), Tab::Player);

        click_on(&mut panel, &mut session, &texts, Control::Bind(Action::Up));
        assert_eq!(panel.waiting(), Some(Action::Up));
        let labels: Vec<_> = panel.layout(session.settings(), &texts).into_iter().map(|w| w.label).collect();
        assert!(labels.iter().any(|label| label == "Press a key"));

        // W
        panel.key_pressed(87, &mut session);
        assert_eq!(panel.waiting(), None);
        assert_eq!(session.settings().key(Action::Up), 0x11);
    }

    #[test]
    fn unbindable_key_keeps_binding() {
        let (mut panel, mut session, texts) = setup(std::path::Path::new("main.conf"));
        panel.apply(Control::Tab(Tab::Player), &mut session);
        click_on(&mut panel, &mut session, &texts, Control::Bind(Action::Start));
        let before = session.settings().key(Action::Start);
        // escape
        panel.key_pressed(256, &mut session);
        assert_eq!(session.settings().key(Action::Start), before);
        assert_eq!(panel.waiting(), None);
    }

    #[test]
    fn key_press_without_waiting_does_nothing() {
        let (mut panel, mut session, _) = setup(std::path::Path::new("main.conf"));
        let before = session.settings().clone();
        panel.key_pressed(87, &mut session);
        assert_eq!(session.settings(), &before);
    }

    #[test]
    fn language_change_restarts() {
        let (mut panel, mut session, texts) = setup(std::path::Path::new("main.conf"));
        let event = click_on(&mut panel, &mut session, &texts, Control::Next(Choice::Language));
        assert!(matches!(event, PanelEvent::Restart));
        assert_eq!(session.settings().language(), 1);
        let labels: Vec<_> = panel.layout(session.settings(), &texts).into_iter().map(|w| w.label).collect();
        assert!(labels.iter().any(|label| label == "Auflösung"));
    }

    #[test]
    fn choices_wrap_around() {
        let (mut panel, mut session, texts) = setup(std::path::Path::new("main.conf"));
        click_on(&mut panel, &mut session, &texts, Control::Previous(Choice::Resolution));
        assert_eq!(session.settings().resolution(), RESOLUTIONS.len() - 1);
        click_on(&mut panel, &mut session, &texts, Control::Next(Choice::Display));
        click_on(&mut panel, &mut session, &texts, Control::Next(Choice::Display));
        assert_eq!(session.settings().display(), 0);
    }

    #[test]
    fn single_screen_display_choice_is_noop() {
        let mut panel = Panel::new(0);
        let mut session = SettingsSession::new(GameSettings::new("main.conf"));
        assert!(matches!(
            panel.apply(Control::Next(Choice::Display), &mut session),
            PanelEvent::None
        ));
        assert_eq!(session.settings().display(), 0);
    }

    #[test]
    fn gamepad_mode_shows_vibration() {
        let (mut panel, mut session, texts) = setup(std::path::Path::new("main.conf"));
        panel.apply(Control::Tab(Tab::Player), &mut session);
        click_on(&mut panel, &mut session, &texts, Control::Next(Choice::Controls));
        assert_eq!(session.settings().controls(), ControllerMode::Gamepad);

        let widgets = panel.layout(session.settings(), &texts);
        assert!(widgets.iter().all(|w| !matches!(w.control, Some(Control::Bind(_)))));
        click_on(&mut panel, &mut session, &texts, Control::ToggleVibration);
        assert!(!session.settings().vibration());
    }

    #[test]
    fn reset_restores_default_keys() {
        let (mut panel, mut session, texts) = setup(std::path::Path::new("main.conf"));
        panel.apply(Control::Tab(Tab::Player), &mut session);
        session.on_remap_requested(Action::ButtonA, 87);
        click_on(&mut panel, &mut session, &texts, Control::ResetKeys);
        assert_eq!(session.settings().key(Action::ButtonA), 0x2C);
    }

    #[test]
    fn fullscreen_caption_toggles_too() {
        let (mut panel, mut session, texts) = setup(std::path::Path::new("main.conf"));
        let caption = panel
            .layout(session.settings(), &texts)
            .into_iter()
            .find(|w| w.style == Style::Caption && w.control == Some(Control::ToggleFullscreen))
            .unwrap();
        let (x, y) = caption.rect.center();
        panel.click(x, y, &mut session, &texts);
        assert!(!session.settings().fullscreen());
    }
}
