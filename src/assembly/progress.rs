//! Progress reporting and cooperative cancellation
//!
//! Listeners take `&self` so one tracker can be shared through an `Arc`
//! between the thread running an assembly and a thread polling it.

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use crate::io::error::{Result, invalid_parameter};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

/// Receiver of percent updates that may also request cancellation
pub trait ProgressListener {
    /// Report progress in `0..=100`
    fn on_progress_update(&self, percent: u8);

    /// Whether the run should stop at its next checkpoint
    fn is_cancelled(&self) -> bool;
}

impl<L: ProgressListener + ?Sized> ProgressListener for &L {
    fn on_progress_update(&self, percent: u8) {
        (**self).on_progress_update(percent);
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Listener that ignores updates and never cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressListener for SilentProgress {
    fn on_progress_update(&self, _percent: u8) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Lock-free monotonic percent counter with a cancellation flag
#[derive(Debug, Default)]
pub struct ProgressTracker {
    percent: AtomicU8,
    cancelled: AtomicBool,
}

impl ProgressTracker {
    /// Create a tracker at 0% that is not cancelled
    pub const fn new() -> Self {
        Self {
            percent: AtomicU8::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Highest percent reported so far
    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Acquire)
    }

    /// Ask the run to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl ProgressListener for ProgressTracker {
    fn on_progress_update(&self, percent: u8) {
        self.percent.fetch_max(percent.min(100), Ordering::AcqRel);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Maps the 0..100 reports of consecutive phases onto weighted sub-ranges
/// of an outer listener
///
/// With weights `[0.1, 0.9]`, 50% of the first phase is reported as 5% and
/// 50% of the second as 55%. Reports never move backwards.
#[derive(Debug)]
pub struct MultiStepProgress<L> {
    outer: L,
    starts: Vec<f64>,
    weights: Vec<f64>,
    phase: AtomicUsize,
    reported: AtomicU8,
}

impl<L: ProgressListener> MultiStepProgress<L> {
    /// Wrap a listener with one phase per weight
    ///
    /// # Errors
    ///
    /// Returns an error if the weights are empty, negative, not finite, or
    /// sum to zero.
    pub fn new(outer: L, weights: &[f64]) -> Result<Self> {
        if weights.is_empty() {
            return Err(invalid_parameter(
                "weights",
                &"[]",
                &"at least one phase is required",
            ));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(invalid_parameter(
                "weights",
                bad,
                &"phase weights must be finite and non-negative",
            ));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(invalid_parameter(
                "weights",
                &total,
                &"phase weights must have a positive sum",
            ));
        }

        let weights: Vec<f64> = weights.iter().map(|w| w / total).collect();
        let starts = weights
            .iter()
            .scan(0.0, |start, weight| {
                let current = *start;
                *start += weight;
                Some(current)
            })
            .collect();

        Ok(Self {
            outer,
            starts,
            weights,
            phase: AtomicUsize::new(0),
            reported: AtomicU8::new(0),
        })
    }

    /// Index of the phase currently reporting
    pub fn phase(&self) -> usize {
        self.phase.load(Ordering::Acquire)
    }

    /// Number of phases
    pub fn phase_count(&self) -> usize {
        self.weights.len()
    }

    /// Close the current phase and start the next one; the last phase stays open
    pub fn next_phase(&self) {
        self.on_progress_update(100);
        let last = self.weights.len().saturating_sub(1);
        let _ = self
            .phase
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |phase| {
                (phase < last).then_some(phase + 1)
            });
    }

    /// The wrapped listener
    pub const fn outer(&self) -> &L {
        &self.outer
    }
}

impl<L: ProgressListener> ProgressListener for MultiStepProgress<L> {
    fn on_progress_update(&self, percent: u8) {
        let phase = self.phase();
        let start = self.starts.get(phase).copied().unwrap_or(1.0);
        let weight = self.weights.get(phase).copied().unwrap_or(0.0);
        let local = f64::from(percent.min(100)) / 100.0;
        let overall = ((start + weight * local) * 100.0).round().clamp(0.0, 100.0) as u8;

        let previous = self.reported.fetch_max(overall, Ordering::AcqRel);
        if overall > previous {
            self.outer.on_progress_update(overall);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.outer.is_cancelled()
    }
}

static BAR_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{msg}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos:>3}}%"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Terminal progress bar for the command-line binary
#[derive(Debug)]
pub struct TerminalProgress {
    bar: ProgressBar,
    cancelled: AtomicBool,
}

impl TerminalProgress {
    /// Create a bar labelled with `message`
    pub fn new(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(BAR_STYLE.clone());
        bar.set_message(message.into());
        Self {
            bar,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Ask the run to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Finish the bar, leaving it on screen with a closing message
    pub fn finish(&self, message: impl Into<String>) {
        self.bar.finish_with_message(message.into());
    }

    /// Remove the bar from the terminal
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressListener for TerminalProgress {
    fn on_progress_update(&self, percent: u8) {
        let percent = u64::from(percent.min(100));
        if percent > self.bar.position() {
            self.bar.set_position(percent);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
