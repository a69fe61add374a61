use serde::{Deserialize, Serialize};

/// How far through the full animation the presentation currently is, as a
/// fraction clamped to [0, 1]. Keyframe tracks live in the [0, 100] percent
/// domain; `as_percent` is the only conversion between the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Progress(f64);

impl Progress {
    pub const ZERO: Progress = Progress(0.0);
    pub const END: Progress = Progress(1.0);

    pub fn from_fraction(fraction: f64) -> Self {
        if fraction.is_nan() {
            Progress(0.0)
        } else {
            Progress(fraction.clamp(0.0, 1.0))
        }
    }

    pub fn fraction(self) -> f64 {
        self.0
    }

    pub fn as_percent(self) -> f64 {
        self.0 * 100.0
    }

    pub fn is_complete(self) -> bool {
        self.0 >= 1.0
    }
}

/// Who currently owns the authoritative progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    Idle,
    ExternallyDriven,
    DragDriven,
    Seeking,
}

/// Advance per auto-play tick. At a 60 Hz repaint this plays the full
/// sequence in just over three seconds, matching the original page's
/// auto-scroll pace.
pub const DEFAULT_PLAY_STEP: f64 = 0.005;

/// External signals within this distance of the current value are echoes
/// of our own outward pushes, which round-trip through the scroll source's
/// f32 pixel offsets.
pub const EXTERNAL_EPSILON: f64 = 1e-4;

/// Single authoritative progress value with write arbitration between the
/// external scroll signal, playhead drags, and auto-play. At most one
/// driver is active per tick; the others are treated as feedback and
/// suppressed, so a scrub can never be overwritten by its own echo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    progress: Progress,
    driver: Driver,
    step: f64,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            progress: Progress::ZERO,
            driver: Driver::Idle,
            step: DEFAULT_PLAY_STEP,
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub fn is_playing(&self) -> bool {
        self.driver == Driver::Seeking
    }

    pub fn is_dragging(&self) -> bool {
        self.driver == Driver::DragDriven
    }

    /// Feeds the external scroll signal. Returns `true` when the value was
    /// accepted and actually changed, i.e. when downstream writes are due.
    /// Ignored entirely while a drag owns the value; a repeat of the
    /// current value (within [`EXTERNAL_EPSILON`]) is a no-op that never
    /// steals the driver from an active seek.
    pub fn set_external(&mut self, fraction: f64) -> bool {
        if self.driver == Driver::DragDriven {
            return false;
        }
        let next = Progress::from_fraction(fraction);
        if (next.fraction() - self.progress.fraction()).abs() < EXTERNAL_EPSILON {
            if self.driver == Driver::Idle {
                self.driver = Driver::ExternallyDriven;
            }
            return false;
        }
        self.progress = next;
        self.driver = Driver::ExternallyDriven;
        true
    }

    pub fn begin_drag(&mut self) {
        self.driver = Driver::DragDriven;
    }

    /// Drag move: updates the authoritative value and returns it so the
    /// caller can push it outward to the scroll source.
    pub fn drag_to(&mut self, fraction: f64) -> Progress {
        self.driver = Driver::DragDriven;
        self.progress = Progress::from_fraction(fraction);
        self.progress
    }

    pub fn end_drag(&mut self) {
        if self.driver == Driver::DragDriven {
            self.driver = Driver::ExternallyDriven;
        }
    }

    /// Starts auto-play toward the end; playing from the end rewinds first.
    pub fn play(&mut self) {
        if self.progress.is_complete() {
            self.progress = Progress::ZERO;
        }
        self.driver = Driver::Seeking;
    }

    pub fn pause(&mut self) {
        if self.driver == Driver::Seeking {
            self.driver = Driver::ExternallyDriven;
        }
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// One auto-play step. Returns the value to push outward to the scroll
    /// source while seeking, `None` otherwise. Reaching the end hands the
    /// value back to the external driver.
    pub fn tick(&mut self) -> Option<Progress> {
        if self.driver != Driver::Seeking {
            return None;
        }
        self.progress = Progress::from_fraction(self.progress.fraction() + self.step);
        if self.progress.is_complete() {
            self.driver = Driver::ExternallyDriven;
        }
        Some(self.progress)
    }

    /// Sequence reload: progress returns to zero under external control.
    pub fn reset(&mut self) {
        self.progress = Progress::ZERO;
        self.driver = Driver::ExternallyDriven;
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
