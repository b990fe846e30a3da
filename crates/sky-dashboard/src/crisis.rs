//! Edge detection over the polled health status.

use sky_core::HealthStatus;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CrisisPhase {
    #[default]
    Nominal,
    Crisis(HealthStatus),
}

impl CrisisPhase {
    pub fn is_crisis(&self) -> bool {
        matches!(self, Self::Crisis(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    EnteredCrisis,
    Recovered,
    KindChanged,
}

/// Next phase for an observed status. Entering a crisis and switching crisis
/// kind both ask for remediation; staying in the same kind reports `Unchanged`.
pub fn observe(phase: &CrisisPhase, status: HealthStatus) -> (CrisisPhase, Transition) {
    match (phase, status.is_nominal()) {
        (CrisisPhase::Nominal, true) => (CrisisPhase::Nominal, Transition::Unchanged),
        (CrisisPhase::Nominal, false) => (CrisisPhase::Crisis(status), Transition::EnteredCrisis),
        (CrisisPhase::Crisis(_), true) => (CrisisPhase::Nominal, Transition::Recovered),
        (CrisisPhase::Crisis(current), false) if *current == status => {
            (CrisisPhase::Crisis(status), Transition::Unchanged)
        }
        (CrisisPhase::Crisis(_), false) => (CrisisPhase::Crisis(status), Transition::KindChanged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_edge() {
        let (phase, transition) = observe(&CrisisPhase::Nominal, HealthStatus::Crisis);
        assert_eq!(transition, Transition::EnteredCrisis);
        let (phase, transition) = observe(&phase, HealthStatus::Crisis);
        assert_eq!(transition, Transition::Unchanged);
        let (phase, transition) = observe(&phase, HealthStatus::Infeasible);
        assert_eq!(transition, Transition::KindChanged);
        assert_eq!(phase, CrisisPhase::Crisis(HealthStatus::Infeasible));
        let (phase, transition) = observe(&phase, HealthStatus::Valid);
        assert_eq!(transition, Transition::Recovered);
        assert_eq!(phase, CrisisPhase::Nominal);
        let (_, transition) = observe(&phase, HealthStatus::Valid);
        assert_eq!(transition, Transition::Unchanged);
    }

    #[test]
    fn unknown_status_counts_as_crisis() {
        let status = HealthStatus::Other("DEGRADED".to_string());
        let (phase, transition) = observe(&CrisisPhase::Nominal, status);
        assert!(phase.is_crisis());
        assert_eq!(transition, Transition::EnteredCrisis);
    }
}
