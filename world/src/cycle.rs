//! Authoritative day/night phase, lighting and wave counters.

use std::time::Duration;

use town_defence_core::{Lighting, Outcome, Phase, PhaseChangeError, SpawnError, WaveIndex};

#[derive(Clone, Copy, Debug)]
struct Transition {
    from: Lighting,
    to: Lighting,
    elapsed: Duration,
}

/// Day/night state machine owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct Cycle {
    phase: Phase,
    day_active: bool,
    transition: Option<Transition>,
    transition_duration: Duration,
    lighting: Lighting,
    wave: Option<WaveIndex>,
    wave_completed: bool,
    quota: u32,
    spawned: u32,
    spawning_enabled: bool,
    outcome: Option<Outcome>,
}

impl Cycle {
    pub(crate) fn new(transition_duration: Duration) -> Self {
        Self {
            phase: Phase::Day,
            day_active: false,
            transition: None,
            transition_duration,
            lighting: Lighting::DAY,
            wave: None,
            wave_completed: false,
            quota: 0,
            spawned: 0,
            spawning_enabled: false,
            outcome: None,
        }
    }

    pub(crate) fn set_transition_duration(&mut self, duration: Duration) {
        self.transition_duration = duration;
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn day_active(&self) -> bool {
        self.day_active
    }

    pub(crate) fn transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub(crate) fn lighting(&self) -> Lighting {
        self.lighting
    }

    pub(crate) fn wave(&self) -> Option<WaveIndex> {
        self.wave
    }

    pub(crate) fn quota(&self) -> u32 {
        self.quota
    }

    pub(crate) fn spawned(&self) -> u32 {
        self.spawned
    }

    pub(crate) fn spawning_enabled(&self) -> bool {
        self.spawning_enabled
    }

    pub(crate) fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    fn check_phase_change(&self) -> Result<(), PhaseChangeError> {
        if self.transition.is_some() {
            return Err(PhaseChangeError::Transitioning);
        }
        if self.outcome.is_some() {
            return Err(PhaseChangeError::OutcomeLatched);
        }
        Ok(())
    }

    pub(crate) fn start_day(&mut self) -> Result<(), PhaseChangeError> {
        self.check_phase_change()?;
        if self.day_active {
            return Err(PhaseChangeError::AlreadyDay);
        }
        self.day_active = true;
        self.phase = Phase::Day;
        self.spawning_enabled = false;
        self.begin_transition(Lighting::DAY);
        Ok(())
    }

    pub(crate) fn start_night(&mut self, wave: WaveIndex, quota: u32) -> Result<(), PhaseChangeError> {
        self.check_phase_change()?;
        self.day_active = false;
        self.phase = Phase::Night;
        self.wave = Some(wave);
        self.wave_completed = false;
        self.quota = quota;
        self.spawned = 0;
        self.spawning_enabled = true;
        self.begin_transition(Lighting::NIGHT);
        Ok(())
    }

    /// Marks the active wave complete, returning it the first time only.
    pub(crate) fn complete_wave(&mut self) -> Option<WaveIndex> {
        if self.wave_completed {
            return None;
        }
        let wave = self.wave?;
        self.wave_completed = true;
        Some(wave)
    }

    /// Counts a spawn attempt against the active quota.
    pub(crate) fn claim_spawn(&mut self) -> Result<(), SpawnError> {
        if !self.spawning_enabled || self.outcome.is_some() {
            return Err(SpawnError::SpawningDisabled);
        }
        if self.spawned >= self.quota {
            return Err(SpawnError::QuotaReached);
        }
        self.spawned += 1;
        Ok(())
    }

    /// Latches an outcome, returning `false` when one was already latched.
    pub(crate) fn latch(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        self.spawning_enabled = false;
        true
    }

    /// Advances an in-flight transition, returning the phase once it settles.
    pub(crate) fn advance(&mut self, dt: Duration) -> Option<Phase> {
        let transition = self.transition.as_mut()?;
        transition.elapsed = transition.elapsed.saturating_add(dt);
        if transition.elapsed < self.transition_duration {
            let t = transition.elapsed.as_secs_f32() / self.transition_duration.as_secs_f32();
            self.lighting = transition.from.lerp(transition.to, t);
            return None;
        }
        self.settle()
    }

    /// Finishes any in-flight transition immediately.
    pub(crate) fn settle(&mut self) -> Option<Phase> {
        let transition = self.transition.take()?;
        self.lighting = transition.to;
        Some(self.phase)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.transition_duration);
    }

    fn begin_transition(&mut self, to: Lighting) {
        if self.transition_duration.is_zero() {
            self.lighting = to;
            return;
        }
        self.transition = Some(Transition {
            from: self.lighting,
            to,
            elapsed: Duration::ZERO,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn phase_requests_are_rejected_while_transitioning() {
        let mut cycle = Cycle::new(SECOND);
        assert_eq!(cycle.start_day(), Ok(()));
        assert!(cycle.transitioning());
        assert_eq!(
            cycle.start_night(WaveIndex::FIRST, 3),
            Err(PhaseChangeError::Transitioning)
        );

        assert_eq!(cycle.advance(SECOND), Some(Phase::Day));
        assert_eq!(cycle.lighting(), Lighting::DAY);
        assert_eq!(cycle.start_day(), Err(PhaseChangeError::AlreadyDay));
        assert_eq!(cycle.start_night(WaveIndex::FIRST, 3), Ok(()));
        assert_eq!(cycle.phase(), Phase::Night);
    }

    #[test]
    fn lighting_interpolates_toward_night() {
        let mut cycle = Cycle::new(SECOND);
        assert_eq!(cycle.start_night(WaveIndex::FIRST, 1), Ok(()));

        assert_eq!(cycle.advance(Duration::from_millis(500)), None);
        assert!((cycle.lighting().intensity - 0.65).abs() < 1e-5);

        assert_eq!(cycle.advance(Duration::from_millis(500)), Some(Phase::Night));
        assert_eq!(cycle.lighting(), Lighting::NIGHT);
    }

    #[test]
    fn spawn_claims_stop_at_quota() {
        let mut cycle = Cycle::new(Duration::ZERO);
        assert_eq!(cycle.claim_spawn(), Err(SpawnError::SpawningDisabled));
        assert_eq!(cycle.start_night(WaveIndex::FIRST, 2), Ok(()));

        assert_eq!(cycle.claim_spawn(), Ok(()));
        assert_eq!(cycle.claim_spawn(), Ok(()));
        assert_eq!(cycle.claim_spawn(), Err(SpawnError::QuotaReached));
        assert_eq!(cycle.spawned(), 2);
    }

    #[test]
    fn first_outcome_wins_and_disables_spawning() {
        let mut cycle = Cycle::new(Duration::ZERO);
        assert_eq!(cycle.start_night(WaveIndex::FIRST, 5), Ok(()));
        let _ = cycle.settle();

        assert!(cycle.latch(Outcome::Victory));
        assert!(!cycle.latch(Outcome::GameOver));
        assert_eq!(cycle.outcome(), Some(Outcome::Victory));
        assert_eq!(cycle.claim_spawn(), Err(SpawnError::SpawningDisabled));
        assert_eq!(cycle.start_day(), Err(PhaseChangeError::OutcomeLatched));
    }

    #[test]
    fn wave_completion_is_reported_once() {
        let mut cycle = Cycle::new(Duration::ZERO);
        assert_eq!(cycle.complete_wave(), None);
        assert_eq!(cycle.start_night(WaveIndex::new(1), 0), Ok(()));
        assert_eq!(cycle.complete_wave(), Some(WaveIndex::new(1)));
        assert_eq!(cycle.complete_wave(), None);
    }
}
