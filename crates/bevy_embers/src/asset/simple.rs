use serde::{Deserialize, Serialize};

use super::serde_helpers::*;

/// A pixel rectangle inside a texture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FrameRect {
    /// Left edge, in pixels.
    pub x: i32,
    /// Top edge, in pixels.
    pub y: i32,
    /// Width, in pixels.
    pub w: i32,
    /// Height, in pixels.
    pub h: i32,
}

impl FrameRect {
    /// Creates a rectangle from its position and size.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge, in pixels.
    pub fn x2(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge, in pixels.
    pub fn y2(&self) -> i32 {
        self.y + self.h
    }
}

/// One sprite-sheet animation a simple emitter can assign to its particles.
///
/// The base region is either given as [`rect`](Self::rect) or through the separate
/// `x`/`y`/`w`/`h` fields, where a missing width or height falls back to the
/// texture's own size. Frames are cut from the texture row-major, starting at the
/// base region and stepping by the region size plus [`pad`](Self::pad).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationConfig {
    /// Identifier used in diagnostics.
    #[serde(default)]
    pub id: String,
    /// Path of the sprite-sheet image, relative to the asset root.
    pub image: String,
    /// Base region of the first frame. Takes precedence over `x`/`y`/`w`/`h`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<FrameRect>,
    /// Left edge of the first frame when `rect` is not set.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub x: i32,
    /// Top edge of the first frame when `rect` is not set.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub y: i32,
    /// Frame width when `rect` is not set. Defaults to the texture width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    /// Frame height when `rect` is not set. Defaults to the texture height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
    /// Number of frames. Values below `1` are treated as `1`.
    #[serde(default = "default_frames")]
    pub frames: i32,
    /// Frames per sprite-sheet row. When unset the frames never wrap to a new row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_per_row: Option<u32>,
    /// Gap between neighbouring frames, in pixels.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub pad: i32,
    /// How many ticks each frame stays on screen.
    #[serde(default = "default_duration")]
    pub duration: i32,
}

fn default_frames() -> i32 {
    1
}

fn default_duration() -> i32 {
    1
}

impl AnimationConfig {
    /// Creates a single-frame animation covering the whole image.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            image: image.into(),
            rect: None,
            x: 0,
            y: 0,
            w: None,
            h: None,
            frames: 1,
            frames_per_row: None,
            pad: 0,
            duration: 1,
        }
    }
}

/// Configuration of the generation-batched sprite emitter.
///
/// Rates, velocities and accelerations are integers in per-mille units so a
/// configuration can express sub-unit-per-tick values: a `spawn_rate` of `250`
/// spawns one particle every four ticks, a `velocity_x` of `1500` moves
/// particles one and a half units per tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleEmitterConfig {
    /// Particles spawned per tick, in per-mille. Defaults to `1`.
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: i32,
    /// Exclusive upper bound of the random amount added to `spawn_rate` every tick.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub spawn_rate_random: i32,
    /// Number of ticks after which the whole emitter is destroyed. Unset means forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_time_to_live: Option<u32>,
    /// Number of ticks each generation of particles lives. Defaults to `50`.
    #[serde(default = "default_time_to_live")]
    pub time_to_live: u32,
    /// Minimum spawn offset from the owner, x axis.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub min_x: i32,
    /// Maximum spawn offset from the owner, x axis.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub max_x: i32,
    /// Minimum spawn offset from the owner, y axis.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub min_y: i32,
    /// Maximum spawn offset from the owner, y axis.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub max_y: i32,
    /// Base x velocity, per-mille units per tick.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_x: i32,
    /// Base y velocity, per-mille units per tick.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_y: i32,
    /// Exclusive upper bound of the random x velocity jitter.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_x_random: i32,
    /// Exclusive upper bound of the random y velocity jitter.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_y_random: i32,
    /// Length of the rotated velocity component, per-mille units per tick.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_magnitude: i32,
    /// Exclusive upper bound of the random magnitude jitter.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_magnitude_random: i32,
    /// Direction of the rotated velocity component, in degrees.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_rotate: i32,
    /// Exclusive upper bound of the random rotation jitter, in degrees.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_rotate_random: i32,
    /// Velocity change per tick on the x axis, in per-mille.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub accel_x: i32,
    /// Velocity change per tick on the y axis, in per-mille.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub accel_y: i32,
    /// Red channel change per tick of age. Currently not rendered.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub delta_r: i32,
    /// Green channel change per tick of age. Currently not rendered.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub delta_g: i32,
    /// Blue channel change per tick of age. Currently not rendered.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub delta_b: i32,
    /// Alpha lost per tick of age. When non-zero the batch carries vertex colors.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub delta_a: i32,
    /// Rotate velocities with the historical `3.14` approximation of pi.
    ///
    /// Older effects were tuned against it; new effects should leave it off.
    #[serde(default, skip_serializing_if = "is_false")]
    pub legacy_angle_pi: bool,
    /// Seed for the emitter's random generator. Unset seeds from the clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_seed: Option<u64>,
    /// Animations particles pick from at random. Must not be empty.
    pub animations: Vec<AnimationConfig>,
}

fn default_spawn_rate() -> i32 {
    1
}

fn default_time_to_live() -> u32 {
    50
}

impl Default for SimpleEmitterConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 1,
            spawn_rate_random: 0,
            system_time_to_live: None,
            time_to_live: 50,
            min_x: 0,
            max_x: 0,
            min_y: 0,
            max_y: 0,
            velocity_x: 0,
            velocity_y: 0,
            velocity_x_random: 0,
            velocity_y_random: 0,
            velocity_magnitude: 0,
            velocity_magnitude_random: 0,
            velocity_rotate: 0,
            velocity_rotate_random: 0,
            accel_x: 0,
            accel_y: 0,
            delta_r: 0,
            delta_g: 0,
            delta_b: 0,
            delta_a: 0,
            legacy_angle_pi: false,
            fixed_seed: None,
            animations: Vec::new(),
        }
    }
}
