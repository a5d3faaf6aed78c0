//! Anti-replay protection
//!
//! Sliding-window sequence-number validator in the style of RFC 4303
//! Section 3.4.3. Each SA tracks the highest sequence number accepted so
//! far plus a bitmap of the most recent sequence numbers below it.
//!
//! ```text
//! Bitmap, window width W (here 64):
//!
//!   bit 0 (LSB)  = highest_seq
//!   bit 1        = highest_seq - 1
//!   bit W-1      = highest_seq - (W-1)
//!
//! A window of width W accepts [highest_seq - (W-1), highest_seq] plus
//! anything above highest_seq.
//! ```
//!
//! The window is consulted strictly *after* ICV verification, so replay
//! state is never mutated or probed by unauthenticated input.

use crate::{Error, Result};

/// Default anti-replay window width
///
/// RFC 4303 recommends a minimum of 32; 64 fits a single bitmap word and
/// is what common implementations ship.
pub const DEFAULT_WINDOW_SIZE: u32 = 64;

/// Minimum allowed window width
pub const MIN_WINDOW_SIZE: u32 = 32;

/// Maximum window width (limited by the single-word bitmap)
pub const MAX_WINDOW_SIZE: u32 = 64;

/// Sliding anti-replay window for one SA's receive direction
#[derive(Debug, Clone)]
pub struct ReplayWindow {
    /// Highest sequence number accepted so far (0 = nothing received)
    highest_seq: u64,

    /// Bitmap of accepted packets at and below `highest_seq`
    bitmap: u64,

    /// Window width W
    width: u32,
}

impl Default for ReplayWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl ReplayWindow {
    /// Create a new window of the given width
    ///
    /// # Panics
    ///
    /// Panics if `width` is outside `MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE`.
    /// [`crate::EngineConfig::validate`] rejects out-of-range widths before
    /// any window is built from configuration.
    pub fn new(width: u32) -> Self {
        assert!(
            (MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&width),
            "Window width must be between {} and {}",
            MIN_WINDOW_SIZE,
            MAX_WINDOW_SIZE
        );

        ReplayWindow {
            highest_seq: 0,
            bitmap: 0,
            width,
        }
    }

    /// Validate a sequence number and record it as seen
    ///
    /// # Errors
    ///
    /// - `InvalidSequence` for sequence 0 (reserved by ESP, never sent)
    /// - `ReplayDetected` for a duplicate or for anything older than
    ///   `highest_seq - (W-1)`
    pub fn check_and_update(&mut self, seq: u64) -> Result<()> {
        if seq == 0 {
            return Err(Error::InvalidSequence(seq));
        }

        // Nothing accepted yet: any nonzero sequence starts the window.
        if self.highest_seq == 0 {
            self.highest_seq = seq;
            self.bitmap = 1;
            return Ok(());
        }

        if seq > self.highest_seq {
            let shift = seq - self.highest_seq;
            self.bitmap = if shift < 64 { self.bitmap << shift } else { 0 };
            self.bitmap |= 1;
            self.highest_seq = seq;
            return Ok(());
        }

        let diff = self.highest_seq - seq;
        if diff >= u64::from(self.width) {
            // Fell off the left edge of the window.
            return Err(Error::ReplayDetected(seq));
        }

        let mask = 1u64 << diff;
        if self.bitmap & mask != 0 {
            return Err(Error::ReplayDetected(seq));
        }

        self.bitmap |= mask;
        Ok(())
    }

    /// Highest sequence number accepted so far
    pub fn highest_seq(&self) -> u64 {
        self.highest_seq
    }

    /// Window width W
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current bitmap (testing/diagnostics)
    pub fn bitmap(&self) -> u64 {
        self.bitmap
    }

    /// Reset to the initial (nothing-received) state
    pub fn reset(&mut self) {
        self.highest_seq = 0;
        self.bitmap = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_window_is_empty() {
        let window = ReplayWindow::new(64);
        assert_eq!(window.highest_seq(), 0);
        assert_eq!(window.bitmap(), 0);
        assert_eq!(window.width(), 64);
    }

    #[test]
    fn test_default_width() {
        assert_eq!(ReplayWindow::default().width(), DEFAULT_WINDOW_SIZE);
    }

    #[test]
    #[should_panic(expected = "Window width must be between")]
    fn test_width_below_minimum_panics() {
        ReplayWindow::new(31);
    }

    #[test]
    #[should_panic(expected = "Window width must be between")]
    fn test_width_above_maximum_panics() {
        ReplayWindow::new(65);
    }

    #[test]
    fn test_sequence_zero_always_rejected() {
        let mut window = ReplayWindow::new(64);
        assert_eq!(window.check_and_update(0), Err(Error::InvalidSequence(0)));

        // Still rejected once the window has state.
        window.check_and_update(100).unwrap();
        assert_eq!(window.check_and_update(0), Err(Error::InvalidSequence(0)));
    }

    #[test]
    fn test_first_packet_any_sequence() {
        let mut window = ReplayWindow::new(64);
        window.check_and_update(1000).unwrap();
        assert_eq!(window.highest_seq(), 1000);
        assert_eq!(window.bitmap() & 1, 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut window = ReplayWindow::new(64);
        window.check_and_update(1).unwrap();
        assert_eq!(window.check_and_update(1), Err(Error::ReplayDetected(1)));
    }

    #[test]
    fn test_sequential_accepted() {
        let mut window = ReplayWindow::new(64);
        for seq in 1..=100 {
            window.check_and_update(seq).unwrap();
        }
        assert_eq!(window.highest_seq(), 100);
    }

    #[test]
    fn test_out_of_order_within_window() {
        let mut window = ReplayWindow::new(64);
        window.check_and_update(5).unwrap();
        window.check_and_update(3).unwrap();
        window.check_and_update(4).unwrap();

        // Each accepted exactly once.
        assert_eq!(window.check_and_update(3), Err(Error::ReplayDetected(3)));
        assert_eq!(window.check_and_update(4), Err(Error::ReplayDetected(4)));
        assert_eq!(window.check_and_update(5), Err(Error::ReplayDetected(5)));
    }

    #[test]
    fn test_window_boundary_offsets() {
        // Exercise W-1, W, and W+1 behind the highest sequence, W = 64.
        let mut window = ReplayWindow::new(64);
        window.check_and_update(1000).unwrap();

        // diff = W-1 = 63: inside the window.
        window.check_and_update(1000 - 63).unwrap();

        // diff = W = 64: just outside.
        assert_eq!(
            window.check_and_update(1000 - 64),
            Err(Error::ReplayDetected(936))
        );

        // diff = W+1 = 65: outside.
        assert_eq!(
            window.check_and_update(1000 - 65),
            Err(Error::ReplayDetected(935))
        );
    }

    #[test]
    fn test_window_boundary_offsets_width_32() {
        let mut window = ReplayWindow::new(32);
        window.check_and_update(100).unwrap();

        window.check_and_update(100 - 31).unwrap();
        assert_eq!(
            window.check_and_update(100 - 32),
            Err(Error::ReplayDetected(68))
        );
        assert_eq!(
            window.check_and_update(100 - 33),
            Err(Error::ReplayDetected(67))
        );
    }

    #[test]
    fn test_window_slides_forward() {
        let mut window = ReplayWindow::new(64);
        window.check_and_update(100).unwrap();
        window.check_and_update(90).unwrap();

        // Advance by 50; the mark for 90 shifts with the window.
        window.check_and_update(150).unwrap();
        assert_eq!(window.highest_seq(), 150);

        assert_eq!(window.check_and_update(90), Err(Error::ReplayDetected(90)));

        // 87 is inside the new window and not yet seen.
        window.check_and_update(87).unwrap();

        // 85 fell off the edge (150 - 85 = 65 >= 64).
        assert_eq!(window.check_and_update(85), Err(Error::ReplayDetected(85)));
    }

    #[test]
    fn test_large_jump_clears_bitmap() {
        let mut window = ReplayWindow::new(64);
        window.check_and_update(10).unwrap();
        window.check_and_update(500).unwrap();

        assert_eq!(window.bitmap(), 1);
        assert_eq!(window.check_and_update(10), Err(Error::ReplayDetected(10)));
    }

    #[test]
    fn test_reset() {
        let mut window = ReplayWindow::new(64);
        window.check_and_update(42).unwrap();
        window.reset();

        assert_eq!(window.highest_seq(), 0);
        window.check_and_update(1).unwrap();
    }
}
