use anyhow::{Context, Result};

/// A display mode the game can be started in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    /// Label shown in the resolution choice
    pub label: &'static str,
}

const fn res(width: u32, height: u32, label: &'static str) -> Resolution {
    Resolution {
        width,
        height,
        label,
    }
}

/// Resolutions offered to the user, smallest first
pub const RESOLUTIONS: [Resolution; 16] = [
    res(640, 480, "640 x 480"),
    res(800, 600, "800 x 600"),
    res(1024, 768, "1024 x 768"),
    res(1280, 720, "1280 x 720"),
    res(1280, 768, "1280 x 768"),
    res(1280, 800, "1280 x 800"),
    res(1280, 960, "1280 x 960"),
    res(1280, 1024, "1280 x 1024"),
    res(1360, 768, "1360 x 768"),
    res(1366, 768, "1366 x 768"),
    res(1440, 900, "1440 x 900"),
    res(1600, 900, "1600 x 900"),
    res(1600, 1200, "1600 x 1200"),
    res(1680, 1050, "1680 x 1050"),
    res(1920, 1080, "1920 x 1080"),
    res(1920, 1200, "1920 x 1200"),
];

/// Look up a resolution by its index in [RESOLUTIONS]
pub fn resolution(index: usize) -> Result<&'static Resolution> {
    RESOLUTIONS
        .get(index)
        .context("Tried to index past resolution list!")
}

/// Clamp a stored resolution index into the list bounds
///
/// Values past the end snap to the largest resolution, the nearest valid entry.
pub fn clamp_resolution_index(index: usize) -> usize {
    index.min(RESOLUTIONS.len() - 1)
}

/// Pick the default resolution for a display of the given size
///
/// Walks the list from the largest entry down and takes the first one that
/// fits. With no display information the smallest entry is used.
pub fn default_resolution_index(native: Option<(u32, u32)>) -> usize {
    let Some((width, height)) = native else {
        return 0;
    };
    RESOLUTIONS
        .iter()
        .rposition(|r| r.width <= width && r.height <= height)
        .unwrap_or(0)
}

/// Queries about the attached displays
///
/// Only available once a windowing backend is up, so headless runs answer
/// with a single screen of unknown size.
pub trait DisplayProbe {
    /// Number of attached screens, at least 1
    fn screen_count(&self) -> usize;
    /// Current mode (width, height) of the primary display, if known
    fn primary_mode(&self) -> Option<(u32, u32)>;
}

/// Probe used when there is no window system to ask
pub struct HeadlessProbe;

impl DisplayProbe for HeadlessProbe {
    fn screen_count(&self) -> usize {
        1
    }

    fn primary_mode(&self) -> Option<(u32, u32)> {
        None
    }
}
