use std::time::Duration;

/// Timing parameters for the autonomous decision cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Delay between decision cycles of an autonomous actor.
    pub decision_interval: Duration,
    /// Longer delay used when no candidate target is alive.
    pub idle_backoff: Duration,
}

impl CombatConfig {
    pub const DEFAULT_DECISION_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_secs(5);
    /// Shortest delay a decision loop may re-arm with. A zero delay would
    /// keep re-firing at the same instant.
    pub const MIN_DELAY: Duration = Duration::from_millis(1);

    pub fn new() -> Self {
        Self {
            decision_interval: Self::DEFAULT_DECISION_INTERVAL,
            idle_backoff: Self::DEFAULT_IDLE_BACKOFF,
        }
    }

    pub fn with_decision_interval(mut self, interval: Duration) -> Self {
        self.decision_interval = interval.max(Self::MIN_DELAY);
        self
    }

    pub fn with_idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff = backoff.max(Self::MIN_DELAY);
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_clamp_zero_delays() {
        let config = CombatConfig::new()
            .with_decision_interval(Duration::ZERO)
            .with_idle_backoff(Duration::ZERO);

        assert_eq!(config.decision_interval, CombatConfig::MIN_DELAY);
        assert_eq!(config.idle_backoff, CombatConfig::MIN_DELAY);
    }
}
