/// Frames skipped after startup to mask renderer-initialization artifacts.
pub const WARMUP_FRAMES: u32 = 5;

/// Overlay lifecycle stage. Transitions are monotonic; nothing ever moves
/// back to an earlier stage during an instance's lifetime.
///
/// # Example
/// ```
/// use am_ascii::validity::{Stage, ValidityState};
/// let mut v = ValidityState::new();
/// assert_eq!(v.stage(), Stage::Uninitialized);
/// v.begin_frame();
/// assert_eq!(v.stage(), Stage::WarmingUp);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// No frame has been rendered yet.
    Uninitialized,
    /// Frames 0–4: rendering, never sampling.
    WarmingUp,
    /// Warm-up done, waiting for the content heuristic to pass.
    Sampling,
    /// Content seen at least once. One-way: never leaves this stage.
    Visible,
}

/// Frame counters and the one-way "has ever produced visible content"
/// latch that triggers the fade-in.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidityState {
    frame_count: u32,
    consecutive_valid: u32,
    has_valid_content: bool,
}

impl ValidityState {
    /// Fresh state for a new instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a rendered frame. Returns true while still warming up.
    pub fn begin_frame(&mut self) -> bool {
        self.frame_count = self.frame_count.saturating_add(1);
        self.frame_count < WARMUP_FRAMES
    }

    /// Record a frame that passed the content heuristic. Returns true
    /// exactly once, on the transition into `Visible` — the caller's cue
    /// to start the fade-in.
    pub fn record_valid(&mut self) -> bool {
        self.consecutive_valid = self.consecutive_valid.saturating_add(1);
        let first = !self.has_valid_content;
        self.has_valid_content = true;
        first
    }

    /// Record a dropped frame. Resets the consecutive streak; the
    /// visibility latch is untouched.
    pub fn record_invalid(&mut self) {
        self.consecutive_valid = 0;
    }

    /// Current stage, derived from the counters.
    #[must_use]
    pub fn stage(&self) -> Stage {
        if self.frame_count == 0 {
            Stage::Uninitialized
        } else if self.frame_count < WARMUP_FRAMES {
            Stage::WarmingUp
        } else if self.has_valid_content {
            Stage::Visible
        } else {
            Stage::Sampling
        }
    }

    /// Total frames rendered by this instance.
    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// True once any frame has passed the content heuristic.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.has_valid_content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_covers_first_four_frames() {
        let mut v = ValidityState::new();
        for expected in [true, true, true, true, false, false] {
            assert_eq!(v.begin_frame(), expected, "frame {}", v.frame_count());
        }
    }

    #[test]
    fn visibility_latch_is_one_way() {
        let mut v = ValidityState::new();
        for _ in 0..WARMUP_FRAMES {
            v.begin_frame();
        }
        assert_eq!(v.stage(), Stage::Sampling);
        assert!(v.record_valid(), "first valid frame fires the latch");
        assert!(!v.record_valid(), "latch fires only once");
        v.record_invalid();
        assert_eq!(v.stage(), Stage::Visible, "invalid frames never revert");
    }

    #[test]
    fn stages_progress_monotonically() {
        let mut v = ValidityState::new();
        assert_eq!(v.stage(), Stage::Uninitialized);
        v.begin_frame();
        assert_eq!(v.stage(), Stage::WarmingUp);
        for _ in 0..WARMUP_FRAMES {
            v.begin_frame();
        }
        assert_eq!(v.stage(), Stage::Sampling);
        v.record_valid();
        assert_eq!(v.stage(), Stage::Visible);
    }
}
