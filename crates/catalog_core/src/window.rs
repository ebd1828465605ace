use serde::{Deserialize, Serialize};

/// Scroll container geometry reported by the front-end, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub client_height: u32,
    pub scroll_height: u32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: u32, client_height: u32, scroll_height: u32) -> Self {
        Self {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    /// `scrollTop + clientHeight >= scrollHeight - threshold`
    pub fn is_near_end(&self, threshold: u32) -> bool {
        let bottom = u64::from(self.scroll_top) + u64::from(self.client_height);
        bottom >= u64::from(self.scroll_height.saturating_sub(threshold))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAdvance {
    /// Revealed more already-loaded records; no network needed.
    Grew { from: usize, to: usize },
    /// Every loaded record is already visible.
    CaughtUp,
}

/// Number of leading working-set records currently revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    target: usize,
    step: usize,
    show_all: bool,
}

impl DisplayWindow {
    pub fn new(step: usize) -> Self {
        Self {
            target: step,
            step,
            show_all: false,
        }
    }

    /// Reveals everything regardless of size (search mode).
    pub fn unbounded(step: usize) -> Self {
        Self {
            target: step,
            step,
            show_all: true,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.show_all
    }

    pub fn visible_len(&self, total: usize) -> usize {
        if self.show_all {
            total
        } else {
            self.target.min(total)
        }
    }

    /// Grows the window by one step, capped at `total`.
    pub fn advance(&mut self, total: usize) -> WindowAdvance {
        let shown = self.visible_len(total);
        if shown >= total {
            return WindowAdvance::CaughtUp;
        }
        let to = (shown + self.step).min(total);
        self.target = to;
        WindowAdvance::Grew { from: shown, to }
    }

    /// Restores a window covering at least `len` records.
    pub fn cover(&mut self, len: usize) {
        self.target = self.target.max(len);
    }
}
