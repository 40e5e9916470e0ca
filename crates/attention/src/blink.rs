//! Blink vs. sustained eye closure

/// Result of feeding one EAR sample to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureUpdate {
    /// Eyes have been closed for at least the blink frame threshold
    pub truly_closed: bool,
    /// A short closed run just ended and was counted as a blink
    pub blink_completed: bool,
}

/// Counts consecutive closed-eye frames and completed blinks
#[derive(Debug, Clone)]
pub struct EyeClosureTracker {
    closed_frames: u32,
    blink_count: u64,
    blink_frames_threshold: u32,
}

impl EyeClosureTracker {
    pub fn new(blink_frames_threshold: u32) -> Self {
        Self {
            closed_frames: 0,
            blink_count: 0,
            blink_frames_threshold,
        }
    }

    /// Feed one smoothed EAR sample against the active threshold
    pub fn observe(&mut self, ear: f64, threshold: f64) -> ClosureUpdate {
        let mut blink_completed = false;

        if ear < threshold {
            self.closed_frames += 1;
        } else {
            if self.closed_frames > 0 && self.closed_frames < self.blink_frames_threshold {
                self.blink_count += 1;
                blink_completed = true;
            }
            self.closed_frames = 0;
        }

        ClosureUpdate {
            truly_closed: self.closed_frames >= self.blink_frames_threshold,
            blink_completed,
        }
    }

    pub fn closed_frames(&self) -> u32 {
        self.closed_frames
    }

    pub fn blink_count(&self) -> u64 {
        self.blink_count
    }

    /// Forget the current closed run
    pub fn reset_run(&mut self) {
        self.closed_frames = 0;
    }

    pub fn reset_blinks(&mut self) {
        self.blink_count = 0;
    }
}
