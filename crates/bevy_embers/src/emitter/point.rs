use std::sync::Arc;

use bevy::{color::ColorToPacked, prelude::*};
use rand::{Rng, rngs::StdRng};

use super::{EmitterProperty, ParticleSystem, emitter_rng, jitter};
use crate::{
    asset::PointEmitterConfig,
    batch::{BatchTopology, DrawBatch},
    factory::{FactoryError, ParticleSystemFactory},
};

/// Fixed-point subunits per world unit for point particle positions.
pub const POSITION_SUBUNITS: i32 = 1024;

const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Colors a point particle takes on as its lifetime runs out.
///
/// Stored death-first: index `0` is the color of a particle about to expire.
/// Looked up with `ttl / divisor`. The divisor is rounded up, so every lifetime
/// up to the maximum the gradient was built for stays in bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGradient {
    colors: Vec<[u8; 4]>,
    divisor: u32,
}

impl ColorGradient {
    /// Builds a gradient from `RRGGBBAA` or `RRGGBB` hex strings listed from
    /// birth to death. Fewer than two colors are padded with opaque white.
    pub fn new(hex_colors: &[String], max_time_to_live: u32) -> Result<Self, FactoryError> {
        let mut colors = hex_colors
            .iter()
            .map(|hex| parse_color(hex))
            .collect::<Result<Vec<_>, _>>()?;
        colors.reverse();
        while colors.len() < 2 {
            colors.push(WHITE);
        }

        let steps = (colors.len() - 1) as u32;
        let divisor = max_time_to_live.div_ceil(steps).max(1);
        let gradient = Self { colors, divisor };
        debug_assert!(gradient.index(max_time_to_live) < gradient.colors.len());
        Ok(gradient)
    }

    /// Divisor mapping a remaining lifetime to a gradient index.
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Colors, death first.
    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    fn index(&self, ttl: u32) -> usize {
        (ttl / self.divisor) as usize
    }

    /// Color of a particle with `ttl` ticks left to live.
    pub fn color(&self, ttl: u32) -> [u8; 4] {
        let index = self.index(ttl).min(self.colors.len() - 1);
        self.colors[index]
    }
}

fn parse_color(hex: &str) -> Result<[u8; 4], FactoryError> {
    let digits = hex.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    Srgba::hex(digits)
        .map(|color| color.to_u8_array())
        .map_err(|_| FactoryError::InvalidColor(hex.to_string()))
}

/// Builds [`PointEmitter`]s.
#[derive(Debug)]
pub struct PointFactory {
    config: Arc<PointEmitterConfig>,
    gradient: Arc<ColorGradient>,
}

impl PointFactory {
    /// Validates `config` and precomputes its color gradient.
    pub fn new(config: PointEmitterConfig) -> Result<Self, FactoryError> {
        let gradient = ColorGradient::new(&config.colors, config.max_time_to_live())?;
        Ok(Self {
            config: Arc::new(config),
            gradient: Arc::new(gradient),
        })
    }

    pub fn config(&self) -> &PointEmitterConfig {
        &self.config
    }

    pub fn gradient(&self) -> &ColorGradient {
        &self.gradient
    }

    /// Creates an emitter with its concrete type.
    pub fn emitter(&self, owner: Entity) -> PointEmitter {
        PointEmitter {
            owner,
            generation_rate_millis: self.config.generation_rate_millis,
            rng: emitter_rng(self.config.fixed_seed),
            config: Arc::clone(&self.config),
            gradient: Arc::clone(&self.gradient),
            particles: Vec::new(),
            generation_timer: 0,
        }
    }
}

impl ParticleSystemFactory for PointFactory {
    fn create(&self, owner: Entity) -> Box<dyn ParticleSystem> {
        Box::new(self.emitter(owner))
    }
}

#[derive(Debug, Clone, Copy)]
struct PointParticle {
    position: IVec2,
    velocity: IVec2,
    ttl: u32,
    rgba: [u8; 4],
}

/// Emitter of single-pixel points, each with its own lifetime and color.
///
/// Simulated in integer fixed point: positions carry [`POSITION_SUBUNITS`] per
/// world unit. The emitter never destroys itself.
pub struct PointEmitter {
    owner: Entity,
    config: Arc<PointEmitterConfig>,
    gradient: Arc<ColorGradient>,
    generation_rate_millis: i32,
    particles: Vec<PointParticle>,
    generation_timer: i32,
    rng: StdRng,
}

impl PointEmitter {
    /// Spawn carry-over in per-mille, always below `1000` after a tick.
    pub fn generation_timer(&self) -> i32 {
        self.generation_timer
    }

    /// Remaining lifetime of every live particle, in spawn order.
    pub fn lifetimes(&self) -> impl Iterator<Item = u32> + '_ {
        self.particles.iter().map(|p| p.ttl)
    }

    /// Fixed-point positions of every live particle, in spawn order.
    pub fn raw_positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    /// Per-particle color channels, in spawn order. These drift by the configured
    /// deltas; the drawn color comes from the gradient.
    pub fn rgba(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.particles.iter().map(|p| p.rgba)
    }

    fn spawn_particle(&mut self, owner_position: Vec2) -> PointParticle {
        let config = &self.config;

        let ttl = config
            .time_to_live
            .saturating_add(jitter_u32(&mut self.rng, config.time_to_live_rand));
        debug_assert!(
            (ttl / self.gradient.divisor()) < self.gradient.colors().len() as u32,
            "lifetime {ttl} falls outside the color gradient"
        );

        let velocity = IVec2::new(
            config
                .velocity_x
                .saturating_add(jitter(&mut self.rng, config.velocity_x_rand)),
            config
                .velocity_y
                .saturating_add(jitter(&mut self.rng, config.velocity_y_rand)),
        );

        // float to int casts saturate
        let offset =
            IVec2::new(config.pos_x, config.pos_y).saturating_mul(IVec2::splat(POSITION_SUBUNITS));
        let spread = IVec2::new(
            jitter(
                &mut self.rng,
                config.pos_x_rand.saturating_mul(POSITION_SUBUNITS),
            ),
            jitter(
                &mut self.rng,
                config.pos_y_rand.saturating_mul(POSITION_SUBUNITS),
            ),
        );
        let position = (owner_position * POSITION_SUBUNITS as f32)
            .as_ivec2()
            .saturating_add(offset)
            .saturating_add(spread);

        let base = [config.red, config.green, config.blue, config.alpha];
        let bounds = [
            config.red_rand,
            config.green_rand,
            config.blue_rand,
            config.alpha_rand,
        ];
        let mut rgba = [0; 4];
        for (channel, (value, bound)) in rgba.iter_mut().zip(base.into_iter().zip(bounds)) {
            *channel = value.wrapping_add(jitter_u8(&mut self.rng, bound));
        }

        PointParticle {
            position,
            velocity,
            ttl,
            rgba,
        }
    }
}

fn jitter_u32(rng: &mut StdRng, bound: u32) -> u32 {
    if bound > 0 { rng.random_range(0..bound) } else { 0 }
}

fn jitter_u8(rng: &mut StdRng, bound: u8) -> u8 {
    if bound > 0 { rng.random_range(0..bound) } else { 0 }
}

impl ParticleSystem for PointEmitter {
    fn owner(&self) -> Entity {
        self.owner
    }

    fn process(&mut self, owner_position: Vec2) {
        self.generation_timer = self
            .generation_timer
            .saturating_add(self.generation_rate_millis)
            .max(0);

        let delta = [
            self.config.red_delta,
            self.config.green_delta,
            self.config.blue_delta,
            self.config.alpha_delta,
        ];
        for particle in &mut self.particles {
            particle.position = particle.position.saturating_add(particle.velocity);
            for (channel, delta) in particle.rgba.iter_mut().zip(delta) {
                *channel = channel.wrapping_add_signed(delta);
            }
            particle.ttl = particle.ttl.saturating_sub(1);
        }
        self.particles.retain(|particle| particle.ttl > 0);

        while self.generation_timer >= 1000 {
            let particle = self.spawn_particle(owner_position);
            self.particles.push(particle);
            self.generation_timer -= 1000;
        }
    }

    fn draw(&self, batch: &mut DrawBatch) {
        if self.particles.is_empty() {
            return;
        }

        batch.topology = BatchTopology::PointList;
        batch.texture = None;
        batch.point_size = self.config.point_size;
        batch.vertices.reserve(self.particles.len());
        batch.colors.reserve(self.particles.len());

        for particle in &self.particles {
            let position = particle.position / POSITION_SUBUNITS;
            batch
                .vertices
                .push([position.x as f32, position.y as f32]);
            batch.colors.push(self.gradient.color(particle.ttl));
        }
    }

    fn particle_count(&self) -> usize {
        self.particles.len()
    }

    fn get_value(&self, property: EmitterProperty) -> Option<i32> {
        match property {
            EmitterProperty::GenerationRate => Some(self.generation_rate_millis),
            _ => None,
        }
    }

    fn set_value(&mut self, property: EmitterProperty, value: i32) {
        if property == EmitterProperty::GenerationRate {
            self.generation_rate_millis = value;
        }
    }
}
