use rand::Rng;
use std::time::Duration;

/// Range of whole seconds to wait before an automatic move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl DelayRange {
    pub const fn new(min_secs: u64, max_secs: u64) -> Self {
        DelayRange { min_secs, max_secs }
    }

    /// Picks a delay uniformly from the range, bounds included. An inverted
    /// range always gives its minimum.
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let secs = if self.max_secs <= self.min_secs {
            self.min_secs
        } else {
            rng.gen_range(self.min_secs..=self.max_secs)
        };
        Duration::from_secs(secs)
    }
}
