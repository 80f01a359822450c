//! Tuning Configuration
//!
//! Flat, named numeric tuning values supplied at actor-construction time.
//! Defaults reproduce the shipped game's feel. Every struct deserializes with
//! `#[serde(default)]`, so a JSON file only needs the values it overrides.
//!
//! ```json
//! { "movement": { "max_bunny_speed": 40.0 }, "enemy": { "accuracy": 0.2 } }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Serialize, Deserialize};

/// RGB color of a beam, each channel in `[0, 1]`.
pub type BeamColor = [f32; 3];

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid JSON for this schema.
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

// =============================================================================
// MOVEMENT
// =============================================================================

/// Kinematic tuning for one class of actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Ground wish speed (units/s)
    pub move_speed: f32,
    /// Wish speed multiplier while sprint is held
    pub sprint_multiplier: f32,
    /// Vertical velocity set by a jump
    pub jump_force: f32,
    /// Gravity while rising (units/s²)
    pub gravity: f32,
    /// Air acceleration rate (units/s²)
    pub air_acceleration: f32,
    /// Air wish-speed cap, relative to `move_speed`
    pub air_max_speed: f32,
    /// Ground friction coefficient (1/s)
    pub ground_friction: f32,
    /// Hard cap on horizontal speed
    pub max_bunny_speed: f32,
    /// Gravity multiplier while falling
    pub fall_gravity_multiplier: f32,
    /// Air control multiplier while falling
    pub fall_air_control_multiplier: f32,
    /// Distance covered by one dash
    pub dash_distance: f32,
    /// Duration of one dash (s)
    pub dash_duration: f32,
    /// Time between dashes (s)
    pub dash_cooldown: f32,
    /// Max gap between two sprint presses that counts as a double tap (s)
    pub double_tap_window: f32,
    /// Ground jump plus air jumps
    pub max_jumps: u8,
    /// Downward speed kept while grounded
    pub ground_stick_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 12.0,
            sprint_multiplier: 1.5,
            jump_force: 8.0,
            gravity: 20.0,
            air_acceleration: 100.0,
            air_max_speed: 1.5,
            ground_friction: 6.0,
            max_bunny_speed: 30.0,
            fall_gravity_multiplier: 2.5,
            fall_air_control_multiplier: 0.1,
            dash_distance: 8.0,
            dash_duration: 0.1,
            dash_cooldown: 1.0,
            double_tap_window: 0.3,
            max_jumps: 2,
            ground_stick_speed: 2.0,
        }
    }
}

impl MovementConfig {
    /// Constant speed held during a dash.
    #[inline]
    pub fn dash_speed(&self) -> f32 {
        self.dash_distance / self.dash_duration
    }

    /// Air wish-speed cap in units/s.
    #[inline]
    pub fn max_air_speed(&self) -> f32 {
        self.move_speed * self.air_max_speed
    }
}

/// Mouse-look tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Degrees of rotation per unit of look delta
    pub mouse_sensitivity: f32,
    /// Pitch limit in degrees (symmetric)
    pub max_look_angle: f32,
    /// Flip vertical look
    pub invert_y: bool,
    /// Camera height above the feet
    pub eye_height: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 2.0,
            max_look_angle: 89.0,
            invert_y: false,
            eye_height: 1.6,
        }
    }
}

// =============================================================================
// WEAPONS
// =============================================================================

/// Railgun tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailgunConfig {
    /// Seconds between shots
    pub cooldown: f32,
    /// Ray length
    pub range: f32,
    /// Max distance from shooter to hit point that grants a rail jump
    pub rail_jump_radius: f32,
    /// Push away from the hit point
    pub rail_jump_force: f32,
    /// Upward boost at ground level
    pub rail_jump_base_up_force: f32,
    /// Height above ground where the boost reaches zero
    pub max_effective_height: f32,
    /// Up-force multiplier for a jump+shoot combo
    pub jump_combo_bonus: f32,
    /// Trailing window after a jump press that counts as a combo (s)
    pub combo_window: f32,
    /// Beam color sent to presentation
    pub beam_color: BeamColor,
    /// Beam lifetime sent to presentation (s)
    pub beam_duration: f32,
    /// Beam start offset along the aim direction
    pub muzzle_offset: f32,
}

impl Default for RailgunConfig {
    fn default() -> Self {
        Self {
            cooldown: 1.5,
            range: 500.0,
            rail_jump_radius: 5.0,
            rail_jump_force: 10.0,
            rail_jump_base_up_force: 6.0,
            max_effective_height: 1.5,
            jump_combo_bonus: 1.3,
            combo_window: 0.15,
            beam_color: [0.0, 1.0, 1.0],
            beam_duration: 0.15,
            muzzle_offset: 0.5,
        }
    }
}

// =============================================================================
// ENEMIES
// =============================================================================

/// Bot AI tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Approach/retreat speed
    pub move_speed: f32,
    /// Yaw interpolation rate (1/s)
    pub rotation_speed: f32,
    /// Max distance for an attack
    pub attack_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    /// Probability that a shot is aimed exactly at the target
    pub accuracy: f32,
    /// Bots ignore targets farther than this
    pub detection_range: f32,
    /// Shots may kill other bots
    pub friendly_fire: bool,
    /// Lateral speed at full strafe
    pub strafe_speed: f32,
    /// Mean time between strafe changes (s)
    pub strafe_change_interval: f32,
    /// Uniform jitter added to the strafe interval (± s)
    pub strafe_jitter: f32,
    /// Back away when closer than this
    pub min_distance: f32,
    /// Close in when farther than this
    pub max_distance: f32,
    /// Radius of the random miss offset
    pub miss_radius: f32,
    /// Shot origin height above the feet
    pub muzzle_height: f32,
    /// Aim point height above the target's feet
    pub aim_height: f32,
    /// Constant fall speed applied to bots with a physics body
    pub fall_speed: f32,
    /// Move through the world's collision-aware move; false translates directly
    pub physics_body: bool,
    /// Beam color sent to presentation
    pub beam_color: BeamColor,
    /// Beam lifetime sent to presentation (s)
    pub beam_duration: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotation_speed: 4.0,
            attack_range: 25.0,
            attack_cooldown: 4.0,
            accuracy: 0.08,
            detection_range: 40.0,
            friendly_fire: true,
            strafe_speed: 5.0,
            strafe_change_interval: 1.5,
            strafe_jitter: 0.5,
            min_distance: 8.0,
            max_distance: 25.0,
            miss_radius: 8.0,
            muzzle_height: 0.5,
            aim_height: 0.5,
            fall_speed: 9.8,
            physics_body: true,
            beam_color: [1.0, 0.0, 0.0],
            beam_duration: 0.15,
        }
    }
}

// =============================================================================
// SPAWNING
// =============================================================================

/// Population and respawn tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Population cap for living bots
    pub max_enemies: u32,
    /// Delay before a dead bot comes back (s)
    pub bot_respawn_delay: f32,
    /// Delay before the player comes back (s)
    pub player_respawn_delay: f32,
    /// Bots prefer spawn points at least this far from the player
    pub min_spawn_distance: f32,
    /// Half extent of the square used when no spawn point is registered
    pub fallback_half_extent: f32,
    /// Height of fallback bot spawns
    pub fallback_height: f32,
    /// Tries to find a fallback position far enough from the player
    pub fallback_attempts: u32,
    /// Player spawn when no spawn point is registered
    pub fallback_player_spawn: Vec3,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_enemies: 5,
            bot_respawn_delay: 2.0,
            player_respawn_delay: 1.5,
            min_spawn_distance: 15.0,
            fallback_half_extent: 20.0,
            fallback_height: 1.0,
            fallback_attempts: 10,
            fallback_player_spawn: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

// =============================================================================
// AGGREGATE
// =============================================================================

/// Everything the simulation needs, in one deserializable document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Player movement
    pub movement: MovementConfig,
    /// Player look
    pub look: LookConfig,
    /// Player weapon
    pub railgun: RailgunConfig,
    /// Bot behaviour
    pub enemy: EnemyConfig,
    /// Spawning and respawns
    pub spawn: SpawnConfig,
}

impl SimConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject values that would break the integration rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        positive("movement.move_speed", m.move_speed)?;
        positive("movement.dash_duration", m.dash_duration)?;
        non_negative("movement.dash_distance", m.dash_distance)?;
        non_negative("movement.dash_cooldown", m.dash_cooldown)?;
        non_negative("movement.gravity", m.gravity)?;
        non_negative("movement.ground_friction", m.ground_friction)?;
        positive("movement.max_bunny_speed", m.max_bunny_speed)?;
        if m.max_jumps == 0 {
            return Err(ConfigError::Invalid {
                field: "movement.max_jumps",
                reason: "must allow at least the ground jump".into(),
            });
        }

        let r = &self.railgun;
        non_negative("railgun.cooldown", r.cooldown)?;
        positive("railgun.range", r.range)?;
        positive("railgun.max_effective_height", r.max_effective_height)?;

        let e = &self.enemy;
        unit_interval("enemy.accuracy", e.accuracy)?;
        positive("enemy.attack_range", e.attack_range)?;
        non_negative("enemy.attack_cooldown", e.attack_cooldown)?;
        if e.min_distance > e.max_distance {
            return Err(ConfigError::Invalid {
                field: "enemy.min_distance",
                reason: format!("{} exceeds max_distance {}", e.min_distance, e.max_distance),
            });
        }

        let s = &self.spawn;
        non_negative("spawn.bot_respawn_delay", s.bot_respawn_delay)?;
        non_negative("spawn.player_respawn_delay", s.player_respawn_delay)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("{} must be > 0", value) })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("{} must be >= 0", value) })
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("{} must be within [0, 1]", value) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_dash_speed() {
        let m = MovementConfig::default();
        assert!((m.dash_speed() - 80.0).abs() < 1e-3);
        assert!((m.max_air_speed() - 18.0).abs() < 1e-5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "movement": { "max_bunny_speed": 40.0 }, "enemy": { "accuracy": 0.5 } }"#,
        )
        .unwrap();

        assert_eq!(config.movement.max_bunny_speed, 40.0);
        assert_eq!(config.movement.jump_force, 8.0);
        assert_eq!(config.enemy.accuracy, 0.5);
        assert_eq!(config.railgun, RailgunConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = SimConfig::from_json_str(r#"{ "enemy": { "accuracy": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "enemy.accuracy", .. }));

        let err = SimConfig::from_json_str(r#"{ "movement": { "dash_duration": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "movement.dash_duration", .. }));

        let err = SimConfig::from_json_str(r#"{ "movement": { "max_jumps": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "movement.max_jumps", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SimConfig::from_json_str("{ movement: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
