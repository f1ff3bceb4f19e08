//! Flavor text sampled before each transition.

use crate::random::{RandomSource, choose};

/// Coarse health band used to pick flavor lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum HealthBracket {
    /// At least half health.
    Healthy,
    /// Below half health.
    Wounded,
    /// Below a quarter of max health.
    Critical,
}

impl HealthBracket {
    pub fn of(health: u32, max_health: u32) -> Self {
        let health = u64::from(health);
        let max_health = u64::from(max_health.max(1));
        if health * 4 < max_health {
            HealthBracket::Critical
        } else if health * 2 < max_health {
            HealthBracket::Wounded
        } else {
            HealthBracket::Healthy
        }
    }
}

/// Candidate flavor lines: a general pool plus one pool per bracket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbientLines {
    pub general: Vec<String>,
    pub healthy: Vec<String>,
    pub wounded: Vec<String>,
    pub critical: Vec<String>,
}

impl AmbientLines {
    /// No lines at all; sampling always yields nothing.
    pub fn silent() -> Self {
        Self {
            general: Vec::new(),
            healthy: Vec::new(),
            wounded: Vec::new(),
            critical: Vec::new(),
        }
    }

    fn bracket_pool(&self, bracket: HealthBracket) -> &[String] {
        match bracket {
            HealthBracket::Healthy => &self.healthy,
            HealthBracket::Wounded => &self.wounded,
            HealthBracket::Critical => &self.critical,
        }
    }

    /// Picks one line from the general pool and the bracket's pool combined.
    pub fn sample<R>(&self, bracket: HealthBracket, rng: &mut R) -> Option<&str>
    where
        R: RandomSource + ?Sized,
    {
        let candidates: Vec<&String> = self
            .general
            .iter()
            .chain(self.bracket_pool(bracket))
            .collect();
        choose(rng, &candidates).map(|line| line.as_str())
    }
}

impl Default for AmbientLines {
    fn default() -> Self {
        Self {
            general: Vec::new(),
            healthy: vec!["looks pretty healthy".to_owned()],
            wounded: vec!["has not much hp".to_owned()],
            critical: vec!["is almost dead".to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    #[test]
    fn brackets_split_at_half_and_quarter() {
        assert_eq!(HealthBracket::of(100, 100), HealthBracket::Healthy);
        assert_eq!(HealthBracket::of(50, 100), HealthBracket::Healthy);
        assert_eq!(HealthBracket::of(49, 100), HealthBracket::Wounded);
        assert_eq!(HealthBracket::of(25, 100), HealthBracket::Wounded);
        assert_eq!(HealthBracket::of(24, 100), HealthBracket::Critical);
        assert_eq!(HealthBracket::of(0, 100), HealthBracket::Critical);
    }

    #[test]
    fn empty_pool_samples_nothing() {
        let mut rng = SequenceRandom::default();
        assert!(AmbientLines::silent().sample(HealthBracket::Wounded, &mut rng).is_none());
    }

    #[test]
    fn samples_from_general_and_bracket_pools() {
        let lines = AmbientLines {
            general: vec!["rattles".to_owned()],
            ..AmbientLines::default()
        };
        let mut rng = SequenceRandom::new([0, 1]);

        assert_eq!(lines.sample(HealthBracket::Critical, &mut rng), Some("rattles"));
        assert_eq!(lines.sample(HealthBracket::Critical, &mut rng), Some("is almost dead"));
    }
}
