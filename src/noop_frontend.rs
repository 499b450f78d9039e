use anyhow::Result;
use log::{error, warn};

use crate::display::{DisplayProbe, HeadlessProbe};
use crate::frontend::{Frontend, SettingsHandler, UiOutcome};

/// Frontend without a window
///
/// Used for quiet launches and for reporting errors before any window exists.
/// Errors go to the log and stderr, and the settings panel can't be shown.
/// Display queries are answered by the probe it was built with.
pub struct NoOpFrontend<P = HeadlessProbe> {
    probe: P,
}

impl NoOpFrontend {
    pub fn new() -> Self {
        Self {
            probe: HeadlessProbe,
        }
    }
}

impl<P: DisplayProbe> NoOpFrontend<P> {
    /// Console frontend that still knows about the real displays
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }
}

impl<P: DisplayProbe> DisplayProbe for NoOpFrontend<P> {
    fn screen_count(&self) -> usize {
        self.probe.screen_count()
    }

    fn primary_mode(&self) -> Option<(u32, u32)> {
        self.probe.primary_mode()
    }
}

impl<P: DisplayProbe> Frontend for NoOpFrontend<P> {
    fn run(&mut self, _handler: &mut dyn SettingsHandler) -> Result<UiOutcome> {
        warn!("No settings panel available, closing without launching");
        Ok(UiOutcome::Closed)
    }

    fn show_error(&mut self, title: &str, message: &str) {
        error!("{title}: {message}");
        eprintln!("{title}: {message}");
    }
}
