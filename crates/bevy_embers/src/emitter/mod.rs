mod point;
mod simple;

pub use point::{ColorGradient, PointEmitter, PointFactory};
pub use simple::{SimpleEmitter, SimpleFactory};

use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::batch::DrawBatch;

/// Parameters that other systems may read or change while an emitter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitterProperty {
    /// Simple emitters: particles per tick, in per-mille.
    SpawnRate,
    /// Simple emitters: minimum spawn offset, x axis.
    MinX,
    /// Simple emitters: maximum spawn offset, x axis.
    MaxX,
    /// Simple emitters: minimum spawn offset, y axis.
    MinY,
    /// Simple emitters: maximum spawn offset, y axis.
    MaxY,
    /// Simple emitters: base x velocity, in per-mille.
    VelocityX,
    /// Simple emitters: base y velocity, in per-mille.
    VelocityY,
    /// Point emitters: particles per tick, in per-mille.
    GenerationRate,
}

impl EmitterProperty {
    /// Looks up a property by its runtime key. The point emitter rate also answers
    /// to its configuration name, `generation_rate_millis`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "spawn_rate" => Some(Self::SpawnRate),
            "min_x" => Some(Self::MinX),
            "max_x" => Some(Self::MaxX),
            "min_y" => Some(Self::MinY),
            "max_y" => Some(Self::MaxY),
            "velocity_x" => Some(Self::VelocityX),
            "velocity_y" => Some(Self::VelocityY),
            "generation_rate" | "generation_rate_millis" => Some(Self::GenerationRate),
            _ => None,
        }
    }

    /// The runtime key of this property.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SpawnRate => "spawn_rate",
            Self::MinX => "min_x",
            Self::MaxX => "max_x",
            Self::MinY => "min_y",
            Self::MaxY => "max_y",
            Self::VelocityX => "velocity_x",
            Self::VelocityY => "velocity_y",
            Self::GenerationRate => "generation_rate",
        }
    }
}

/// A live particle emitter bound to one owner entity.
///
/// Emitters are advanced once per simulation tick with [`process`](Self::process)
/// and render by appending geometry to a [`DrawBatch`]. Implementations are
/// created by a [`ParticleSystemFactory`](crate::ParticleSystemFactory).
pub trait ParticleSystem: Send + Sync {
    /// The entity this emitter follows.
    fn owner(&self) -> Entity;

    /// Advances the simulation by one tick, spawning relative to `owner_position`.
    fn process(&mut self, owner_position: Vec2);

    /// Appends this emitter's current particles to `batch`. Appends nothing when
    /// there are no particles.
    fn draw(&self, batch: &mut DrawBatch);

    /// Whether the emitter has run its course and should be removed.
    fn is_destroyed(&self) -> bool {
        false
    }

    /// Number of live particles.
    fn particle_count(&self) -> usize;

    /// Reads a runtime property. Properties this emitter does not expose return `None`.
    fn get_value(&self, _property: EmitterProperty) -> Option<i32> {
        None
    }

    /// Changes a runtime property. Properties this emitter does not expose are ignored.
    fn set_value(&mut self, _property: EmitterProperty, _value: i32) {}
}

pub(crate) fn rand_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_nanos() as u64
}

pub(crate) fn emitter_rng(fixed_seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(fixed_seed.unwrap_or_else(rand_seed))
}

/// Uniform value in `[0, bound)`, or `0` when the bound is not positive.
pub(crate) fn jitter(rng: &mut StdRng, bound: i32) -> i32 {
    if bound > 0 {
        rng.random_range(0..bound)
    } else {
        0
    }
}
