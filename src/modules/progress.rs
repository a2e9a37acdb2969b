// Progress animator: maps navigation lifecycle timestamps to an eased fill
// value for the toolbar progress bar.
//
// The bar is split in three zones. Zone A fills while the engine is
// connecting to the server, zone B while the document is downloading, and
// zone C once the load has ended. Zones A and B approach their limits
// asymptotically and never reach them, zone C fills the remainder linearly
// and fast.

use serde::{Deserialize, Serialize};

/// Upper bound of zone A, as a fraction of the full bar.
const LIMIT_A: f64 = 0.2;
/// Upper bound of zones A + B.
const LIMIT_B: f64 = 0.7;
/// After this many ms, zone A stops accelerating and slowly approaches its limit.
const INFLECTION_A_MS: f64 = 1_000.0;
const INFLECTION_B_MS: f64 = 2_000.0;
/// Time it takes zone C to fill once the page has loaded.
const DURATION_C_MS: f64 = 200.0;
/// Fill fraction at which the bar starts fading out.
const FADE_START: f64 = 0.8;

const TAU: f64 = std::f64::consts::FRAC_PI_2;

/// Inverse tangent easing: [0, inf) -> [0, 1). The inflection point is
/// roughly where the animation seriously starts to slow down.
fn approach(elapsed_ms: f64, inflection_ms: f64) -> f64 {
    ((TAU / 2.0) * (elapsed_ms / inflection_ms)).atan() / TAU
}

/// Load lifecycle timeline of one frame. Timestamps are milliseconds on any
/// monotonic clock supplied by the caller; only differences matter.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LoadProgress {
    load_start: Option<u64>,
    connect_time: Option<u64>,
    load_end: Option<u64>,
    update_time: u64,
}

impl LoadProgress {
    /// Begin a new cycle. Clears the connect and end marks from the
    /// previous load.
    pub fn start(&mut self, now_ms: u64) {
        self.load_start = Some(now_ms);
        self.connect_time = None;
        self.load_end = None;
        self.update_time = now_ms;
    }

    pub fn connect(&mut self, now_ms: u64) {
        if self.load_start.is_some() && self.connect_time.is_none() {
            self.connect_time = Some(now_ms);
            self.update_time = now_ms;
        }
    }

    pub fn finish(&mut self, now_ms: u64) {
        if self.load_start.is_some() && self.load_end.is_none() {
            // A load may end without a connect mark (cache hits, aborts).
            if self.connect_time.is_none() {
                self.connect_time = Some(now_ms);
            }
            self.load_end = Some(now_ms);
            self.update_time = now_ms;
        }
    }

    /// Advance the animation clock. Call once per animation frame while
    /// `is_animating` returns true.
    pub fn tick(&mut self, now_ms: u64) {
        if now_ms > self.update_time {
            self.update_time = now_ms;
        }
    }

    fn elapsed_since(&self, mark: Option<u64>) -> f64 {
        match mark {
            Some(t) => self.update_time.saturating_sub(t) as f64,
            None => 0.0,
        }
    }

    fn connecting_fill(&self) -> f64 {
        LIMIT_A * approach(self.elapsed_since(self.load_start), INFLECTION_A_MS)
    }

    fn loading_fill(&self) -> f64 {
        let padding = self.connecting_fill();
        padding + (LIMIT_B - padding) * approach(self.elapsed_since(self.connect_time), INFLECTION_B_MS)
    }

    fn loaded_fill(&self) -> f64 {
        let elapsed = self.elapsed_since(self.load_end);
        if elapsed >= DURATION_C_MS {
            return 1.0;
        }
        let padding = self.loading_fill();
        padding + (1.0 - padding) * (elapsed / DURATION_C_MS)
    }

    /// Current fill value in [0, 1].
    pub fn value(&self) -> f64 {
        let fill = if self.load_end.is_some() {
            self.loaded_fill()
        } else if self.connect_time.is_some() {
            self.loading_fill()
        } else if self.load_start.is_some() {
            self.connecting_fill()
        } else {
            0.0
        };
        fill.min(1.0)
    }

    /// Bar opacity: fully visible until `FADE_START`, then fades linearly
    /// to 0 as the fill completes.
    pub fn opacity(&self) -> f64 {
        let value = self.value();
        if value < FADE_START {
            1.0
        } else {
            1.0 - (value - FADE_START) / (1.0 - FADE_START)
        }
    }

    /// Whether the animation still needs ticks. Idle before the first load
    /// and once zone C has completed.
    pub fn is_animating(&self) -> bool {
        self.load_start.is_some() && self.value() < 1.0
    }
}
