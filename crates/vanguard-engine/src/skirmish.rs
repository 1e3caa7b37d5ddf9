//! Scripted headless fight.
//!
//! Builds a [`Stage`] from a [`SandboxConfig`] and runs it on the fixed-step
//! clock. There is no AI: the player swings through its configured pattern
//! and each mob lunges on its own cadence. Bus events are drained once per
//! outer frame and tallied into a [`SkirmishReport`].

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};
use vanguard_common::{EntityId, FrameId, VanguardError};
use vanguard_gameplay::{
    AnimationDriver, AnimationError, AttackSignal, AttackTable, AttackType, CombatError, GameEvent,
    Image, Sprite, SpriteKind, SpriteStore, Stage,
};

use crate::config::{MobSetup, SandboxConfig};
use crate::timing::FrameTiming;

/// Errors that stop a skirmish.
#[derive(Debug, Error)]
pub enum SkirmishError {
    /// The stage could not be assembled
    #[error("setup failed: {0}")]
    Setup(#[from] VanguardError),
    /// An animation in the config is unusable
    #[error("bad animation: {0}")]
    Animation(#[from] AnimationError),
    /// The combat core reported a failure
    #[error("combat failed at tick {tick}: {source}")]
    Combat {
        /// Tick the failure happened on
        tick: u64,
        /// Underlying combat error
        #[source]
        source: CombatError,
    },
}

/// Result type for skirmish operations.
pub type SkirmishResult<T> = Result<T, SkirmishError>;

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkirmishReport {
    /// Fixed ticks run
    pub ticks: u64,
    /// Outer frames run
    pub frames: u64,
    /// Player swings started
    pub swings: u64,
    /// Damage events
    pub hits: u64,
    /// Knockback events
    pub knockbacks: u64,
    /// Defeats
    pub defeats: u64,
    /// Player life at the end, if the player survived
    pub player_life: Option<i32>,
    /// Mobs still standing
    pub surviving_mobs: usize,
}

impl SkirmishReport {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PlayerAttack {
                state: AttackSignal::Start,
            } => self.swings += 1,
            GameEvent::EntityDamaged { .. } => self.hits += 1,
            GameEvent::EntityKnockedBack { .. } => self.knockbacks += 1,
            GameEvent::EntityDefeated { .. } => self.defeats += 1,
            GameEvent::PlayerAttack { .. } | GameEvent::EntityDestroyed { .. } => {},
        }
    }
}

impl fmt::Display for SkirmishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, {} swings, {} hits, {} defeats, {} mobs left, player ",
            self.ticks, self.swings, self.hits, self.defeats, self.surviving_mobs
        )?;
        match self.player_life {
            Some(life) => write!(f, "at {life} life"),
            None => write!(f, "down"),
        }
    }
}

/// Scripted attack cadence for one mob.
#[derive(Debug)]
struct MobScript {
    id: EntityId,
    every: Option<u64>,
}

/// A configured fight, ready to run.
#[derive(Debug)]
pub struct Skirmish {
    stage: Stage,
    timing: FrameTiming,
    total_ticks: u64,
    swing_every: Option<u64>,
    swing_pattern: Vec<AttackType>,
    mob_scripts: Vec<MobScript>,
    log_events: bool,
}

impl Skirmish {
    /// Loads the configured attack table and builds the stage.
    pub fn from_config(config: &SandboxConfig) -> SkirmishResult<Self> {
        let table = config.load_attack_table()?;
        Self::new(config, table)
    }

    /// Builds the stage described by `config`.
    ///
    /// Unknown attack numbers in the swing pattern are rejected here, before
    /// the first tick.
    pub fn new(config: &SandboxConfig, table: AttackTable) -> SkirmishResult<Self> {
        let swing_pattern = config
            .player
            .swing_pattern
            .iter()
            .map(|raw| AttackType::from_raw(*raw))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| SkirmishError::Combat { tick: 0, source })?;

        let mut stage = Stage::new(table);

        let setup = &config.player;
        let image = |frame: u32| Image::new(FrameId::new(frame), setup.width, setup.height);
        let idle: Vec<Image> = setup.idle_frames.iter().map(|f| image(*f)).collect();
        let first = idle.first().copied().unwrap_or_else(|| image(0));
        let player = stage
            .spawn_player(
                Sprite::new(SpriteKind::Player, first, (setup.x, setup.y), setup.life)
                    .with_facing(setup.facing),
                setup.attack.clone(),
            )
            .map_err(|source| SkirmishError::Combat { tick: 0, source })?;
        stage.attach_animation(player, AnimationDriver::new(idle, setup.animation_speed)?);

        let mut mob_scripts = Vec::with_capacity(config.mobs.len());
        for mob in &config.mobs {
            let id = spawn_mob(&mut stage, mob)?;
            mob_scripts.push(MobScript {
                id,
                every: config.interval_ticks(mob.attack_interval),
            });
        }

        info!(
            mobs = mob_scripts.len(),
            ticks = config.total_ticks(),
            "Skirmish ready"
        );

        Ok(Self {
            stage,
            timing: FrameTiming::new(config.frame_rate, config.tick_rate)
                .with_realtime(config.realtime),
            total_ticks: config.total_ticks(),
            swing_every: config.interval_ticks(config.player.swing_interval),
            swing_pattern,
            mob_scripts,
            log_events: config.log_events,
        })
    }

    /// Runs until the configured duration elapses or one side is wiped out.
    pub fn run(&mut self) -> SkirmishResult<SkirmishReport> {
        let mut report = SkirmishReport::default();
        let mut swings_issued = 0usize;
        self.timing.reset();

        'frames: while report.ticks < self.total_ticks {
            let dt = self.timing.delta_time();
            let updates = self.timing.accumulate(dt);
            report.frames += 1;

            for _ in 0..updates {
                if report.ticks >= self.total_ticks || self.is_decided() {
                    break 'frames;
                }
                self.run_script(report.ticks, &mut swings_issued)
                    .map_err(|source| SkirmishError::Combat {
                        tick: report.ticks,
                        source,
                    })?;
                self.stage
                    .tick(self.timing.fixed_dt())
                    .map_err(|source| SkirmishError::Combat {
                        tick: report.ticks,
                        source,
                    })?;
                report.ticks += 1;
            }

            for event in self.stage.drain_events() {
                if self.log_events {
                    debug!(?event, "bus event");
                }
                report.record(&event);
            }
            self.timing.sleep_remainder();
        }

        for event in self.stage.drain_events() {
            report.record(&event);
        }
        report.player_life = self
            .stage
            .player_id()
            .and_then(|id| self.stage.world().sprite(id))
            .map(Sprite::life);
        report.surviving_mobs = self.stage.count(SpriteKind::Mob);

        info!(
            frames = report.frames,
            avg_frame_ms = self.timing.average_frame_time_ms(),
            "Skirmish finished: {report}"
        );
        Ok(report)
    }

    fn is_decided(&self) -> bool {
        self.stage.player_id().is_none() || self.stage.count(SpriteKind::Mob) == 0
    }

    fn run_script(&mut self, tick: u64, swings_issued: &mut usize) -> Result<(), CombatError> {
        if let Some(every) = self.swing_every {
            if tick % every == 0 && !self.swing_pattern.is_empty() {
                let attack_type = self.swing_pattern[*swings_issued % self.swing_pattern.len()];
                if self.stage.player_attack(attack_type)? {
                    *swings_issued += 1;
                }
            }
        }

        for script in &self.mob_scripts {
            if let Some(every) = script.every {
                if tick % every == 0 {
                    self.stage.mob_attack(script.id)?;
                }
            }
        }
        Ok(())
    }
}

fn spawn_mob(stage: &mut Stage, mob: &MobSetup) -> SkirmishResult<EntityId> {
    let walk: Vec<Image> = mob.walk_frames.iter().map(|f| mob.image(*f)).collect();
    let first = walk.first().copied().unwrap_or_else(|| mob.image(0));

    let mut sprite = Sprite::new(SpriteKind::Mob, first, (mob.x, mob.y), mob.life).with_facing(mob.facing);
    if let Some(frame) = mob.attacking_frame {
        sprite = sprite.with_attacking_image(mob.image(frame));
    }

    let driver = AnimationDriver::new(walk, mob.animation_speed)?;
    let id = stage.spawn_mob(sprite, &mob.attack_config());
    stage.attach_animation(id, driver);
    Ok(id)
}
