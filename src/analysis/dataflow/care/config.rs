//! Configuration for the don't-care analysis.

use crate::ir::Overflow;

/// Configuration for a [`CareAnalysis`](super::CareAnalysis) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CareConfig {
    /// Overflow policy of the mask arithmetic (default: [`Overflow::Wrap`]).
    ///
    /// The analysis only supports `Wrap` and refuses to start otherwise.
    pub overflow: Overflow,

    /// Suppress worklist entries for nodes that are already queued (default: true).
    ///
    /// Results are identical either way; only the amount of work differs.
    pub deduplicate: bool,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            overflow: Overflow::Wrap,
            deduplicate: true,
        }
    }
}

impl CareConfig {
    /// Creates a new configuration with default settings.
    ///
    /// # Returns
    ///
    /// A new `CareConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overflow policy of the mask arithmetic.
    ///
    /// # Arguments
    ///
    /// * `overflow` - The policy; anything but [`Overflow::Wrap`] is rejected when the analysis is created.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Enables or disables worklist deduplication.
    ///
    /// # Arguments
    ///
    /// * `enabled` - Whether already queued nodes are skipped on push.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_deduplicate(mut self, enabled: bool) -> Self {
        self.deduplicate = enabled;
        self
    }
}
