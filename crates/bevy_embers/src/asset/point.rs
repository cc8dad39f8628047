use serde::{Deserialize, Serialize};

use super::serde_helpers::*;

/// Configuration of the per-particle point emitter.
///
/// Positions are simulated in fixed point with 1024 subunits per world unit.
/// `pos_*` values are given in world units and scaled at spawn; velocities are
/// given directly in subunits per tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointEmitterConfig {
    /// Particles spawned per tick, in per-mille.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub generation_rate_millis: i32,
    /// Spawn offset from the owner, x axis, in world units.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub pos_x: i32,
    /// Spawn offset from the owner, y axis, in world units.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub pos_y: i32,
    /// Exclusive upper bound of the random x offset, in world units.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub pos_x_rand: i32,
    /// Exclusive upper bound of the random y offset, in world units.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub pos_y_rand: i32,
    /// Base x velocity, in subunits per tick.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_x: i32,
    /// Base y velocity, in subunits per tick.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_y: i32,
    /// Exclusive upper bound of the random x velocity jitter.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_x_rand: i32,
    /// Exclusive upper bound of the random y velocity jitter.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub velocity_y_rand: i32,
    /// Minimum lifetime of a particle, in ticks.
    #[serde(default)]
    pub time_to_live: u32,
    /// Exclusive upper bound of the random lifetime added to `time_to_live`.
    #[serde(default)]
    pub time_to_live_rand: u32,
    /// Color gradient as `RRGGBBAA` (or `RRGGBB`) hex strings, from birth to death.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Initial red channel.
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub red: u8,
    /// Initial green channel.
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub green: u8,
    /// Initial blue channel.
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub blue: u8,
    /// Initial alpha channel. Defaults to `255`.
    #[serde(default = "default_alpha")]
    pub alpha: u8,
    /// Exclusive upper bound of the random red added at spawn.
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub red_rand: u8,
    /// Exclusive upper bound of the random green added at spawn.
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub green_rand: u8,
    /// Exclusive upper bound of the random blue added at spawn.
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub blue_rand: u8,
    /// Exclusive upper bound of the random alpha added at spawn.
    #[serde(default, skip_serializing_if = "is_zero_u8")]
    pub alpha_rand: u8,
    /// Red change per tick. Channels wrap around.
    #[serde(default, skip_serializing_if = "is_zero_i8")]
    pub red_delta: i8,
    /// Green change per tick. Channels wrap around.
    #[serde(default, skip_serializing_if = "is_zero_i8")]
    pub green_delta: i8,
    /// Blue change per tick. Channels wrap around.
    #[serde(default, skip_serializing_if = "is_zero_i8")]
    pub blue_delta: i8,
    /// Alpha change per tick. Channels wrap around.
    #[serde(default, skip_serializing_if = "is_zero_i8")]
    pub alpha_delta: i8,
    /// Rendered point size, in pixels. Defaults to `4.0`.
    ///
    /// Carried on the [`DrawBatch`](crate::DrawBatch) for custom renderers. The
    /// built-in `Mesh2d` output ignores it: wgpu point primitives are always 1px.
    #[serde(default = "default_point_size")]
    pub point_size: f32,
    /// Seed for the emitter's random generator. Unset seeds from the clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_seed: Option<u64>,
}

fn default_alpha() -> u8 {
    255
}

fn default_point_size() -> f32 {
    4.0
}

impl Default for PointEmitterConfig {
    fn default() -> Self {
        Self {
            generation_rate_millis: 0,
            pos_x: 0,
            pos_y: 0,
            pos_x_rand: 0,
            pos_y_rand: 0,
            velocity_x: 0,
            velocity_y: 0,
            velocity_x_rand: 0,
            velocity_y_rand: 0,
            time_to_live: 0,
            time_to_live_rand: 0,
            colors: Vec::new(),
            red: 0,
            green: 0,
            blue: 0,
            alpha: 255,
            red_rand: 0,
            green_rand: 0,
            blue_rand: 0,
            alpha_rand: 0,
            red_delta: 0,
            green_delta: 0,
            blue_delta: 0,
            alpha_delta: 0,
            point_size: 4.0,
            fixed_seed: None,
        }
    }
}

impl PointEmitterConfig {
    /// Longest lifetime a particle can be spawned with.
    pub fn max_time_to_live(&self) -> u32 {
        self.time_to_live.saturating_add(self.time_to_live_rand)
    }
}
