//! Sound cues and the presentation seams the simulation reports to.

use town_defence_core::Event;

/// Sound effects the simulation asks the presentation layer to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// A resource deposit yielded a unit.
    Gather,
    /// A resource deposit was exhausted.
    Deplete,
    /// A tower was built.
    Build,
    /// A tower was upgraded.
    Upgrade,
    /// A tower fired a projectile.
    Shoot,
    /// A projectile struck an enemy.
    Hit,
    /// An enemy was killed.
    EnemyDeath,
    /// The town took a fireball.
    TownHit,
    /// The player started the waves.
    WaveTrigger,
    /// The day phase began.
    Day,
    /// The night phase began.
    Night,
    /// The town fell.
    GameOver,
    /// The final wave was cleared.
    Victory,
}

impl AudioCue {
    /// Maps a simulation event to the cue it should play, if any.
    #[must_use]
    pub fn for_event(event: &Event) -> Option<Self> {
        let cue = match event {
            Event::ResourceHarvested { .. } => Self::Gather,
            Event::ResourceDepleted { .. } => Self::Deplete,
            Event::TowerPlaced { .. } => Self::Build,
            Event::TowerUpgraded { .. } => Self::Upgrade,
            Event::ProjectileFired { .. } => Self::Shoot,
            Event::EnemyDamaged { .. } => Self::Hit,
            Event::EnemyKilled { .. } => Self::EnemyDeath,
            Event::TownDamaged { .. } => Self::TownHit,
            Event::DayStarted => Self::Day,
            Event::NightStarted => Self::Night,
            Event::GameOver => Self::GameOver,
            Event::Victory => Self::Victory,
            _ => return None,
        };
        Some(cue)
    }
}

/// Receives sound cues.
pub trait AudioSink {
    /// Plays the provided cue.
    fn play(&mut self, cue: AudioCue);
}

/// Receives scene change requests.
pub trait SceneLoader {
    /// Loads the named scene.
    fn load(&mut self, scene: &str);
}

/// Presentation stand-in that logs cues and scene requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, cue: AudioCue) {
        log::trace!("audio cue {cue:?}");
    }
}

impl SceneLoader for Silent {
    fn load(&mut self, scene: &str) {
        log::info!("scene `{scene}` requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use town_defence_core::{EnemyId, Vec2};

    #[test]
    fn routine_events_have_no_cue() {
        assert_eq!(
            AudioCue::for_event(&Event::TimeAdvanced {
                dt: std::time::Duration::from_millis(16),
            }),
            None
        );
        assert_eq!(
            AudioCue::for_event(&Event::EnemySpawned {
                enemy: EnemyId::new(0),
                position: Vec2::ZERO,
            }),
            None
        );
    }

    #[test]
    fn outcome_events_map_to_their_cues() {
        assert_eq!(AudioCue::for_event(&Event::GameOver), Some(AudioCue::GameOver));
        assert_eq!(AudioCue::for_event(&Event::Victory), Some(AudioCue::Victory));
        assert_eq!(AudioCue::for_event(&Event::NightStarted), Some(AudioCue::Night));
    }
}
