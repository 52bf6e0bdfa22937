#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Day/night director that paces waves and decides how a session ends.
//!
//! The world owns the authoritative phase. The director only issues requests:
//! it schedules the next night once a day begins, polls the cycle snapshot
//! for wave completion and defeat, and latches the terminal outcome.

use std::time::Duration;

use town_defence_core::{
    timers::{TimerHandle, TimerQueue},
    Command, CycleSnapshot, Event, Outcome, Phase, PhaseChangeError, WaveIndex, WaveTable,
};

/// Scene requested once a terminal outcome has played out.
pub const MENU_SCENE: &str = "MainMenu";

/// Configuration parameters required to construct the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    day_duration: Duration,
    outcome_delay: Duration,
}

impl Config {
    /// Creates a new configuration using the provided day length and menu delay.
    #[must_use]
    pub const fn new(day_duration: Duration, outcome_delay: Duration) -> Self {
        Self {
            day_duration,
            outcome_delay,
        }
    }

    /// Time between the start of a day and the next night.
    #[must_use]
    pub const fn day_duration(&self) -> Duration {
        self.day_duration
    }

    /// Time between a terminal outcome and the menu scene request.
    #[must_use]
    pub const fn outcome_delay(&self) -> Duration {
        self.outcome_delay
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(2))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DirectorTimer {
    NextWave(WaveIndex),
    MenuScene,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PhaseRequest {
    Day,
    Night { wave: WaveIndex, quota: u32 },
}

impl PhaseRequest {
    fn phase(self) -> Phase {
        match self {
            Self::Day => Phase::Day,
            Self::Night { .. } => Phase::Night,
        }
    }

    fn into_command(self) -> Command {
        match self {
            Self::Day => Command::StartDay,
            Self::Night { wave, quota } => Command::StartNight { wave, quota },
        }
    }
}

/// Director that drives the day/night cycle through world commands.
#[derive(Debug)]
pub struct DayNightDirector {
    config: Config,
    waves: WaveTable,
    timers: TimerQueue<DirectorTimer>,
    next_wave_timer: Option<TimerHandle>,
    menu_timer: Option<TimerHandle>,
    issued: Vec<PhaseRequest>,
    pending: Option<PhaseRequest>,
    completed: Option<WaveIndex>,
    outcome_requested: bool,
    latched: Option<Outcome>,
    triggered: bool,
}

impl DayNightDirector {
    /// Creates a director pacing the provided waves.
    #[must_use]
    pub fn new(config: Config, waves: WaveTable) -> Self {
        Self {
            config,
            waves,
            timers: TimerQueue::new(),
            next_wave_timer: None,
            menu_timer: None,
            issued: Vec::new(),
            pending: None,
            completed: None,
            outcome_requested: false,
            latched: None,
            triggered: false,
        }
    }

    /// Outcome the director observed, if the session ended.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.latched
    }

    /// Reports whether a night is scheduled to begin.
    #[must_use]
    pub fn night_scheduled(&self) -> bool {
        self.next_wave_timer
            .is_some_and(|handle| self.timers.is_pending(handle))
    }

    /// Starts the first day. Only the first call has any effect.
    pub fn trigger_waves(&mut self, out: &mut Vec<Command>) -> bool {
        if self.triggered {
            log::debug!("wave trigger already fired");
            return false;
        }
        self.triggered = true;
        log::info!("wave trigger fired");
        self.request(PhaseRequest::Day, out);
        true
    }

    /// Consumes the events of the previous step and the post-tick cycle
    /// snapshot, emitting phase, wave and outcome commands.
    pub fn handle(&mut self, events: &[Event], cycle: &CycleSnapshot, out: &mut Vec<Command>) {
        for event in events {
            self.observe(event, cycle, out);
        }

        for timer in self.timers.drain_due(cycle.clock) {
            match timer {
                DirectorTimer::NextWave(wave) => {
                    self.next_wave_timer = None;
                    self.start_night(wave, out);
                }
                DirectorTimer::MenuScene => {
                    self.menu_timer = None;
                    log::info!("returning to {MENU_SCENE}");
                    out.push(Command::RequestScene {
                        name: MENU_SCENE.to_owned(),
                    });
                }
            }
        }

        if self.latched.is_some() || self.outcome_requested || cycle.outcome.is_some() {
            return;
        }

        let Some(wave) = cycle.wave else {
            return;
        };

        if cycle.town_fallen() {
            log::info!("town fell during wave {}", wave.number());
            self.request_outcome(Outcome::GameOver, out);
            return;
        }

        if cycle.phase == Phase::Night && self.completed != Some(wave) && cycle.wave_cleared() {
            self.finish_wave(wave, out);
        }
    }

    /// Starts a day immediately, bypassing the wave cadence.
    pub fn force_day(&mut self, out: &mut Vec<Command>) {
        log::debug!("forcing day");
        self.request(PhaseRequest::Day, out);
    }

    /// Starts the next night immediately, bypassing the day timer.
    pub fn force_night(&mut self, cycle: &CycleSnapshot, out: &mut Vec<Command>) {
        log::debug!("forcing night");
        self.cancel_next_wave();
        self.start_night(next_wave(cycle), out);
    }

    /// Removes every enemy and completes the active wave.
    pub fn skip_wave(&mut self, cycle: &CycleSnapshot, out: &mut Vec<Command>) {
        let Some(wave) = cycle.wave else {
            log::warn!("no wave has started; nothing to skip");
            return;
        };
        if self.latched.is_some() || self.completed == Some(wave) {
            return;
        }
        log::debug!("skipping wave {}", wave.number());
        out.push(Command::ClearEnemies);
        self.finish_wave(wave, out);
    }

    /// Ends the session with the provided outcome.
    pub fn force_outcome(&mut self, outcome: Outcome, out: &mut Vec<Command>) {
        if self.latched.is_some() || self.outcome_requested {
            return;
        }
        self.request_outcome(outcome, out);
    }

    /// Rewinds the session and starts a fresh day.
    pub fn reset(&mut self, out: &mut Vec<Command>) {
        log::info!("resetting session");
        self.timers.clear();
        self.next_wave_timer = None;
        self.menu_timer = None;
        self.issued.clear();
        self.pending = None;
        self.completed = None;
        self.outcome_requested = false;
        self.latched = None;
        out.push(Command::ResetGame);
        self.request(PhaseRequest::Day, out);
    }

    fn observe(&mut self, event: &Event, cycle: &CycleSnapshot, out: &mut Vec<Command>) {
        match event {
            Event::DayStarted => {
                let _ = self.issued_matching(Phase::Day);
                if self.latched.is_none() {
                    self.schedule_next_wave(next_wave(cycle), cycle.clock);
                }
            }
            Event::NightStarted => {
                let _ = self.issued_matching(Phase::Night);
            }
            Event::PhaseChangeRejected { requested, reason } => {
                let request = self.issued_matching(*requested);
                match reason {
                    PhaseChangeError::Transitioning => {
                        log::debug!("{requested:?} request deferred until the transition settles");
                        self.pending = request;
                    }
                    PhaseChangeError::OutcomeLatched | PhaseChangeError::AlreadyDay => {
                        log::debug!("{requested:?} request dropped: {reason}");
                    }
                }
            }
            Event::TransitionSettled { .. } => {
                if let Some(request) = self.pending.take() {
                    log::debug!("re-issuing deferred {:?} request", request.phase());
                    self.request(request, out);
                }
            }
            Event::GameOver => self.latch(Outcome::GameOver, cycle.clock),
            Event::Victory => self.latch(Outcome::Victory, cycle.clock),
            _ => {}
        }
    }

    fn issued_matching(&mut self, phase: Phase) -> Option<PhaseRequest> {
        let index = self
            .issued
            .iter()
            .position(|request| request.phase() == phase)?;
        Some(self.issued.remove(index))
    }

    fn request(&mut self, request: PhaseRequest, out: &mut Vec<Command>) {
        self.issued.push(request);
        out.push(request.into_command());
    }

    fn start_night(&mut self, wave: WaveIndex, out: &mut Vec<Command>) {
        let Some(definition) = self.waves.wave(wave) else {
            log::warn!("wave {} is not configured; night skipped", wave.number());
            return;
        };
        let quota = definition.quota();
        self.request(PhaseRequest::Night { wave, quota }, out);
    }

    fn finish_wave(&mut self, wave: WaveIndex, out: &mut Vec<Command>) {
        self.completed = Some(wave);
        out.push(Command::CompleteWave);
        if self.waves.is_final(wave) {
            log::info!("final wave {} cleared", wave.number());
            self.request_outcome(Outcome::Victory, out);
        } else {
            self.request(PhaseRequest::Day, out);
        }
    }

    fn request_outcome(&mut self, outcome: Outcome, out: &mut Vec<Command>) {
        self.outcome_requested = true;
        out.push(Command::LatchOutcome { outcome });
    }

    fn schedule_next_wave(&mut self, wave: WaveIndex, now: Duration) {
        self.cancel_next_wave();
        let at = now.saturating_add(self.config.day_duration);
        log::debug!("wave {} scheduled at {:.2}s", wave.number(), at.as_secs_f32());
        self.next_wave_timer = Some(self.timers.schedule(at, DirectorTimer::NextWave(wave)));
    }

    fn cancel_next_wave(&mut self) {
        if let Some(handle) = self.next_wave_timer.take() {
            let _ = self.timers.cancel(handle);
        }
    }

    fn latch(&mut self, outcome: Outcome, now: Duration) {
        if self.latched.is_some() {
            return;
        }
        self.latched = Some(outcome);
        self.outcome_requested = true;
        self.cancel_next_wave();
        if let Some(handle) = self.menu_timer.take() {
            let _ = self.timers.cancel(handle);
        }
        self.pending = None;
        self.issued.clear();
        let at = now.saturating_add(self.config.outcome_delay);
        self.menu_timer = Some(self.timers.schedule(at, DirectorTimer::MenuScene));
    }
}

fn next_wave(cycle: &CycleSnapshot) -> WaveIndex {
    cycle.wave.map_or(WaveIndex::FIRST, |wave| wave.next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle_at(clock: Duration) -> CycleSnapshot {
        CycleSnapshot {
            phase: Phase::Day,
            day_active: true,
            transitioning: false,
            wave: None,
            quota: 0,
            spawned_this_wave: 0,
            enemies_alive: 0,
            spawning_enabled: false,
            outcome: None,
            town_health: Some(10),
            clock,
        }
    }

    #[test]
    fn default_config_matches_tuning() {
        let config = Config::default();
        assert_eq!(config.day_duration(), Duration::from_secs(3));
        assert_eq!(config.outcome_delay(), Duration::from_secs(2));
    }

    #[test]
    fn next_wave_starts_after_the_day() {
        let mut director = DayNightDirector::new(Config::default(), WaveTable::default());
        let mut out = Vec::new();

        director.handle(&[Event::DayStarted], &cycle_at(Duration::from_secs(1)), &mut out);
        assert!(out.is_empty());

        director.handle(&[], &cycle_at(Duration::from_millis(3_999)), &mut out);
        assert!(out.is_empty());

        director.handle(&[], &cycle_at(Duration::from_secs(4)), &mut out);
        assert_eq!(
            out,
            vec![Command::StartNight {
                wave: WaveIndex::FIRST,
                quota: 3,
            }]
        );
    }

    #[test]
    fn repeated_day_start_replaces_the_scheduled_night() {
        let mut director = DayNightDirector::new(Config::default(), WaveTable::default());
        let mut out = Vec::new();

        director.handle(&[Event::DayStarted], &cycle_at(Duration::ZERO), &mut out);
        director.handle(&[Event::DayStarted], &cycle_at(Duration::from_secs(2)), &mut out);
        director.handle(&[], &cycle_at(Duration::from_secs(3)), &mut out);
        assert!(out.is_empty());

        director.handle(&[], &cycle_at(Duration::from_secs(5)), &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn latch_cancels_the_night_and_requests_the_menu_once() {
        let mut director = DayNightDirector::new(Config::default(), WaveTable::default());
        let mut out = Vec::new();

        director.handle(&[Event::DayStarted], &cycle_at(Duration::ZERO), &mut out);
        director.handle(
            &[Event::GameOver, Event::Victory],
            &cycle_at(Duration::from_secs(1)),
            &mut out,
        );
        assert_eq!(director.outcome(), Some(Outcome::GameOver));
        assert!(!director.night_scheduled());

        director.handle(&[], &cycle_at(Duration::from_secs(10)), &mut out);
        director.handle(&[], &cycle_at(Duration::from_secs(20)), &mut out);
        assert_eq!(
            out,
            vec![Command::RequestScene {
                name: MENU_SCENE.to_owned(),
            }]
        );
    }
}
