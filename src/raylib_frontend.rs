use std::cell::OnceCell;
use std::path::Path;

use raylib::{
    RaylibHandle, RaylibThread,
    color::Color,
    core::window::{get_monitor_count, get_monitor_height, get_monitor_width},
    ffi::{KeyboardKey, MouseButton},
    prelude::{Font, RaylibDraw, Vector2, WindowState},
};

use anyhow::{Result, anyhow};
use log::{debug, error, info, warn};

use crate::display::DisplayProbe;
use crate::frontend::{Frontend, SettingsHandler, UiOutcome, WINDOW_TITLE};
use crate::lang::TextTable;
use crate::panel::{PANEL_HEIGHT, PANEL_WIDTH, Panel, PanelEvent, Rect, Style, Widget};

// Font sizes
const LABEL_SIZE: i32 = 14;
const BIG_LABEL_SIZE: i32 = 20;
// Size the font atlas is rendered at, scaled down when drawing
const ATLAS_SIZE: i32 = 32;
const TEXT_SPACING: f32 = 1.0;

// Error dialog OK button
const OK_BUTTON: Rect = Rect::new(PANEL_WIDTH / 2 - 50, PANEL_HEIGHT / 2 + 40, 100, 32);

/// Settings panel drawn with raylib
pub struct RaylibFrontend {
    // Unloaded before the window closes
    font: Option<Font>,
    handle: RaylibHandle,
    thread: RaylibThread,
    texts: TextTable,
}

impl RaylibFrontend {
    /// Open the settings window
    ///
    /// Text is drawn with the font at `font_file` when it loads, raylib's
    /// built in font only has ASCII glyphs.
    pub fn new(texts: TextTable, font_file: &Path) -> Self {
        let (mut handle, thread) = raylib::init()
            .size(PANEL_WIDTH, PANEL_HEIGHT)
            .title(WINDOW_TITLE)
            .build();
        handle.set_target_fps(60);
        // Escape is a bindable-looking key, it must not close the window
        handle.set_exit_key(None);

        let font = match load_font(&mut handle, &thread, font_file, &texts.glyphs()) {
            Ok(font) => {
                info!("Loaded font {}", font_file.display());
                Some(font)
            }
            Err(err) => {
                warn!("{err:#}, non-ASCII text won't render");
                None
            }
        };
        Self {
            font,
            handle,
            thread,
            texts,
        }
    }

    /// Position of a fresh left click, if there was one this frame
    fn clicked_at(&self) -> Option<(i32, i32)> {
        if !self
            .handle
            .is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT)
        {
            return None;
        }
        let position = self.handle.get_mouse_position();
        Some((position.x as i32, position.y as i32))
    }

    fn draw(&mut self, widgets: &[Widget]) {
        let font = self.font.as_ref();
        let mut drawhandle = self.handle.begin_drawing(&self.thread);
        drawhandle.clear_background(Color::RAYWHITE);
        for widget in widgets {
            draw_widget(&mut drawhandle, font, widget);
        }
    }
}

fn load_font(handle: &mut RaylibHandle, thread: &RaylibThread, path: &Path, glyphs: &str) -> Result<Font> {
    let name = path
        .to_str()
        .ok_or_else(|| anyhow!("Font path {} is not valid UTF-8", path.display()))?;
    if !path.is_file() {
        return Err(anyhow!("Font {} not found", path.display()));
    }
    handle
        .load_font_ex(thread, name, ATLAS_SIZE, Some(glyphs))
        .map_err(|err| anyhow!("Failed to load font {}: {err:?}", path.display()))
}

/// Query the monitors the way the settings window sees them
fn monitor_info() -> (usize, Option<(u32, u32)>) {
    let screens = get_monitor_count().max(1) as usize;
    let width = get_monitor_width(0);
    let height = get_monitor_height(0);
    let primary = (width > 0 && height > 0).then_some((width as u32, height as u32));
    (screens, primary)
}

impl DisplayProbe for RaylibFrontend {
    fn screen_count(&self) -> usize {
        monitor_info().0
    }

    fn primary_mode(&self) -> Option<(u32, u32)> {
        monitor_info().1
    }
}

/// Display probe for runs that never show the settings window
///
/// raylib only answers monitor queries once a window exists, so the first
/// query opens a hidden one, reads the monitors and closes it again.
#[derive(Default)]
pub struct MonitorProbe {
    info: OnceCell<(usize, Option<(u32, u32)>)>,
}

impl MonitorProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn info(&self) -> (usize, Option<(u32, u32)>) {
        *self.info.get_or_init(|| {
            debug!("Opening a hidden window to query the displays");
            let (mut handle, _thread) = raylib::init()
                .size(1, 1)
                .title(WINDOW_TITLE)
                .undecorated()
                .build();
            handle.set_window_state(WindowState::default().set_window_hidden(true));
            let info = monitor_info();
            // Closes the window
            drop(handle);
            debug!("Displays: {info:?}");
            info
        })
    }
}

impl DisplayProbe for MonitorProbe {
    fn screen_count(&self) -> usize {
        self.info().0
    }

    fn primary_mode(&self) -> Option<(u32, u32)> {
        self.info().1
    }
}

impl Frontend for RaylibFrontend {
    fn run(&mut self, handler: &mut dyn SettingsHandler) -> Result<UiOutcome> {
        let mut panel = Panel::new(self.screen_count());
        debug!("Showing settings panel");

        while !self.handle.window_should_close() {
            if let Some(key) = self.handle.get_key_pressed() {
                panel.key_pressed(key as u32, handler);
            }
            if let Some((x, y)) = self.clicked_at() {
                match panel.click(x, y, handler, &self.texts) {
                    PanelEvent::None => {}
                    PanelEvent::Restart => return Ok(UiOutcome::Restart),
                    PanelEvent::Launch(result) => {
                        if let Err(err) = result {
                            error!("{err:#}");
                            self.show_error(WINDOW_TITLE, "Failed to save configuration.");
                        }
                        // Out of the way while the game runs
                        self.handle.minimize_window();
                        return Ok(UiOutcome::Launch);
                    }
                }
            }
            let widgets = panel.layout(handler.settings(), &self.texts);
            self.draw(&widgets);
        }
        Ok(UiOutcome::Closed)
    }

    fn show_error(&mut self, title: &str, message: &str) {
        error!("{title}: {message}");
        self.handle.restore_window();

        while !self.handle.window_should_close() {
            let acknowledged = self
                .clicked_at()
                .is_some_and(|(x, y)| OK_BUTTON.contains(x, y))
                || self.handle.is_key_pressed(KeyboardKey::KEY_ENTER);
            if acknowledged {
                break;
            }

            let font = self.font.as_ref();
            let mut drawhandle = self.handle.begin_drawing(&self.thread);
            drawhandle.clear_background(Color::RAYWHITE);
            drawhandle.draw_rectangle(60, PANEL_HEIGHT / 2 - 80, PANEL_WIDTH - 120, 180, Color::WHITE);
            drawhandle.draw_rectangle_lines(60, PANEL_HEIGHT / 2 - 80, PANEL_WIDTH - 120, 180, Color::MAROON);
            draw_label(&mut drawhandle, font, title, 80, PANEL_HEIGHT / 2 - 64, BIG_LABEL_SIZE, Color::MAROON);
            draw_label(&mut drawhandle, font, message, 80, PANEL_HEIGHT / 2 - 20, LABEL_SIZE, Color::BLACK);
            draw_widget(
                &mut drawhandle,
                font,
                &Widget {
                    rect: OK_BUTTON,
                    label: "OK".to_string(),
                    style: Style::Button,
                    control: None,
                },
            );
        }
    }
}

/// Rough text width for centering, glyphs are about half as wide as tall
fn text_width(text: &str, size: i32) -> i32 {
    text.chars().count() as i32 * size / 2
}

fn draw_label(d: &mut impl RaylibDraw, font: Option<&Font>, text: &str, x: i32, y: i32, size: i32, color: Color) {
    match font {
        Some(font) => d.draw_text_ex(
            font,
            text,
            Vector2::new(x as f32, y as f32),
            size as f32,
            TEXT_SPACING,
            color,
        ),
        None => d.draw_text(text, x, y, size, color),
    }
}

fn draw_centered(d: &mut impl RaylibDraw, font: Option<&Font>, rect: &Rect, text: &str, size: i32, color: Color) {
    let (cx, cy) = rect.center();
    draw_label(d, font, text, cx - text_width(text, size) / 2, cy - size / 2, size, color);
}

fn draw_widget(d: &mut impl RaylibDraw, font: Option<&Font>, widget: &Widget) {
    let Rect { x, y, w, h } = widget.rect;
    let label = widget.label.as_str();
    match widget.style {
        Style::Caption => draw_label(d, font, label, x, y, LABEL_SIZE, Color::DARKGRAY),
        Style::Frame => {
            d.draw_rectangle_lines(x, y, w, h, Color::GRAY);
            if !label.is_empty() {
                draw_label(d, font, label, x + 4, y - LABEL_SIZE - 2, LABEL_SIZE, Color::DARKGRAY);
            }
        }
        Style::Tab { active } => {
            let fill = if active { Color::RAYWHITE } else { Color::LIGHTGRAY };
            d.draw_rectangle(x, y, w, h, fill);
            d.draw_rectangle_lines(x, y, w, h, Color::GRAY);
            draw_centered(d, font, &widget.rect, label, LABEL_SIZE, Color::BLACK);
        }
        Style::Button => {
            d.draw_rectangle(x, y, w, h, Color::LIGHTGRAY);
            d.draw_rectangle_lines(x, y, w, h, Color::DARKGRAY);
            draw_centered(d, font, &widget.rect, label, LABEL_SIZE, Color::BLACK);
        }
        Style::Value => {
            d.draw_rectangle(x, y, w, h, Color::WHITE);
            d.draw_rectangle_lines(x, y, w, h, Color::GRAY);
            draw_label(d, font, label, x + 6, y + (h - LABEL_SIZE) / 2, LABEL_SIZE, Color::BLACK);
        }
        Style::Checkbox { checked } => {
            d.draw_rectangle(x, y, w, h, Color::WHITE);
            d.draw_rectangle_lines(x, y, w, h, Color::DARKGRAY);
            if checked {
                d.draw_rectangle(x + 5, y + 5, w - 10, h - 10, Color::DARKBLUE);
            }
        }
        Style::KeyButton { waiting } => {
            let fill = if waiting { Color::SKYBLUE } else { Color::LIGHTGRAY };
            d.draw_rectangle(x, y, w, h, fill);
            d.draw_rectangle_lines(x, y, w, h, Color::DARKGRAY);
            draw_centered(d, font, &widget.rect, label, LABEL_SIZE, Color::BLACK);
        }
        Style::BigButton => {
            d.draw_rectangle(x, y, w, h, Color::DARKBLUE);
            draw_centered(d, font, &widget.rect, label, BIG_LABEL_SIZE, Color::WHITE);
        }
        Style::PadLabel => {
            d.draw_rectangle(x, y, w, h, Color::WHITE);
            d.draw_rectangle_lines(x, y, w, h, Color::BLACK);
            draw_label(d, font, label, x + 4, y + 2, LABEL_SIZE, Color::BLACK);
        }
    }
}
