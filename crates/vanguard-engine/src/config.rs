//! Sandbox configuration.
//!
//! Describes the fight the binary runs: timing, the player, the mobs and the
//! scripted attack cadence. Loaded from and saved to TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vanguard_common::{AssetError, FrameId, SoundId, VanguardResult};
use vanguard_gameplay::{AttackTable, Facing, Image, PlayerAttackConfig, SimpleAttackConfig};

/// Configuration file name.
pub const CONFIG_FILE: &str = "vanguard.toml";

/// Player setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSetup {
    /// Spawn x (center)
    pub x: i32,
    /// Spawn y (center)
    pub y: i32,
    /// Starting life
    pub life: i32,
    /// Sprite width
    pub width: i32,
    /// Sprite height
    pub height: i32,
    /// Initial facing
    pub facing: Facing,
    /// Idle animation frames
    pub idle_frames: Vec<u32>,
    /// Idle animation speed (frames per second)
    pub animation_speed: f32,
    /// Seconds between scripted swings (0 = never)
    pub swing_interval: f32,
    /// Raw attack numbers swung in order, then repeated
    pub swing_pattern: Vec<u8>,
    /// Attack tuning
    pub attack: PlayerAttackConfig,
}

impl Default for PlayerSetup {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            life: 100,
            width: 32,
            height: 48,
            facing: Facing::Right,
            idle_frames: vec![1, 2, 3, 4],
            animation_speed: 8.0,
            swing_interval: 0.75,
            swing_pattern: vec![1, 1, 2],
            attack: PlayerAttackConfig::default(),
        }
    }
}

/// One mob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobSetup {
    /// Spawn x (center)
    pub x: i32,
    /// Spawn y (center)
    pub y: i32,
    /// Starting life
    pub life: i32,
    /// Sprite width
    pub width: i32,
    /// Sprite height
    pub height: i32,
    /// Initial facing
    pub facing: Facing,
    /// Walk animation frames
    pub walk_frames: Vec<u32>,
    /// Frame shown while a lunge connects
    pub attacking_frame: Option<u32>,
    /// Walk animation speed (frames per second)
    pub animation_speed: f32,
    /// Lunge damage
    pub damage: i32,
    /// Lunge length in ticks
    pub duration: u32,
    /// Lunge distance in pixels
    pub range: i32,
    /// Lunge sound handle
    pub sound: Option<u32>,
    /// Seconds between scripted lunges (0 = never)
    pub attack_interval: f32,
}

impl Default for MobSetup {
    fn default() -> Self {
        Self {
            x: 120,
            y: 0,
            life: 60,
            width: 28,
            height: 28,
            facing: Facing::Left,
            walk_frames: vec![10, 11, 12],
            attacking_frame: Some(13),
            animation_speed: 6.0,
            damage: 10,
            duration: 20,
            range: 80,
            sound: None,
            attack_interval: 1.5,
        }
    }
}

impl MobSetup {
    /// Lunge tuning for this mob.
    #[must_use]
    pub fn attack_config(&self) -> SimpleAttackConfig {
        SimpleAttackConfig {
            damage: self.damage,
            duration: self.duration,
            range: self.range,
            sound: self.sound.map(SoundId::new),
        }
    }

    /// Image for a frame at this mob's size.
    #[must_use]
    pub fn image(&self, frame: u32) -> Image {
        Image::new(FrameId::new(frame), self.width, self.height)
    }
}

/// Sandbox configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    // === Timing ===
    /// Fixed stage ticks per second
    pub tick_rate: u32,
    /// Outer frames per second
    pub frame_rate: u32,
    /// Simulated seconds to run
    pub duration_secs: f32,
    /// Pace frames against the wall clock
    pub realtime: bool,

    // === Debug ===
    /// Log every bus event at debug level
    pub log_events: bool,

    // === Content ===
    /// RON attack table (None = built-in table)
    pub attack_table: Option<PathBuf>,
    /// Player setup
    pub player: PlayerSetup,
    /// Mob roster
    pub mobs: Vec<MobSetup>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            frame_rate: 60,
            duration_secs: 10.0,
            realtime: false,

            log_events: false,

            attack_table: None,
            player: PlayerSetup::default(),
            mobs: vec![
                MobSetup::default(),
                MobSetup {
                    x: -140,
                    facing: Facing::Right,
                    life: 40,
                    attack_interval: 2.0,
                    ..MobSetup::default()
                },
            ],
        }
    }
}

impl SandboxConfig {
    /// Load configuration from the working directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Timing
        self.tick_rate = self.tick_rate.clamp(10, 240);
        self.frame_rate = self.frame_rate.clamp(10, 240);
        self.duration_secs = self.duration_secs.clamp(0.0, 3600.0);

        // Player
        let player = &mut self.player;
        player.width = player.width.clamp(1, 1024);
        player.height = player.height.clamp(1, 1024);
        player.animation_speed = player.animation_speed.clamp(0.0, 120.0);
        player.swing_interval = player.swing_interval.clamp(0.0, 60.0);
        if player.idle_frames.is_empty() {
            player.idle_frames.push(1);
        }

        // Mobs
        for mob in &mut self.mobs {
            mob.width = mob.width.clamp(1, 1024);
            mob.height = mob.height.clamp(1, 1024);
            mob.animation_speed = mob.animation_speed.clamp(0.0, 120.0);
            mob.duration = mob.duration.clamp(1, 600);
            mob.attack_interval = mob.attack_interval.clamp(0.0, 60.0);
            if mob.walk_frames.is_empty() {
                mob.walk_frames.push(10);
            }
        }
    }

    /// Total fixed ticks in the run.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        (f64::from(self.duration_secs) * f64::from(self.tick_rate)).round() as u64
    }

    /// Converts a period in seconds to whole ticks; `None` for "never".
    #[must_use]
    pub fn interval_ticks(&self, seconds: f32) -> Option<u64> {
        let ticks = (f64::from(seconds) * f64::from(self.tick_rate)).round() as u64;
        (ticks > 0).then_some(ticks)
    }

    /// Resolves the attack table: the configured RON file, or the built-in one.
    pub fn load_attack_table(&self) -> VanguardResult<AttackTable> {
        let Some(path) = &self.attack_table else {
            return Ok(AttackTable::standard());
        };
        if !path.exists() {
            return Err(AssetError::NotFound(path.clone()).into());
        }

        let text = fs::read_to_string(path)?;
        let table = AttackTable::from_ron_str(&text).map_err(|e| AssetError::Invalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        info!("Loaded attack table from {}", path.display());
        Ok(table)
    }
}
