use std::{collections::VecDeque, f32::consts::PI, sync::Arc};

use bevy::prelude::*;
use rand::{Rng, rngs::StdRng};

use super::{EmitterProperty, ParticleSystem, emitter_rng, jitter};
use crate::{
    asset::SimpleEmitterConfig,
    atlas::{ParticleAnimation, TextureSource},
    batch::{BatchTopology, DrawBatch},
    factory::{FactoryError, ParticleSystemFactory},
};

#[allow(clippy::approx_constant)]
const LEGACY_PI: f32 = 3.14;

const VERTICES_PER_PARTICLE: usize = 6;

/// Builds [`SimpleEmitter`]s that share one set of animations.
#[derive(Debug)]
pub struct SimpleFactory {
    config: Arc<SimpleEmitterConfig>,
    animations: Arc<[ParticleAnimation]>,
    texture: Handle<Image>,
}

impl SimpleFactory {
    /// Resolves every animation of `config` against `textures`.
    pub fn new(
        config: SimpleEmitterConfig,
        textures: &dyn TextureSource,
    ) -> Result<Self, FactoryError> {
        let animations = config
            .animations
            .iter()
            .map(|animation| ParticleAnimation::new(animation, textures))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(first) = animations.first() else {
            return Err(FactoryError::NoAnimations);
        };
        let texture = first.texture().clone();
        if animations.iter().any(|a| a.texture() != &texture) {
            warn!(
                "simple emitter animations use more than one image, every particle will be drawn with \"{}\"",
                config.animations[0].image
            );
        }

        Ok(Self {
            config: Arc::new(config),
            animations: animations.into(),
            texture,
        })
    }

    pub fn config(&self) -> &SimpleEmitterConfig {
        &self.config
    }

    pub fn animations(&self) -> &[ParticleAnimation] {
        &self.animations
    }

    /// Creates an emitter with its concrete type, for callers that need
    /// generation-level access.
    pub fn emitter(&self, owner: Entity) -> SimpleEmitter {
        SimpleEmitter::new(owner, self)
    }
}

impl ParticleSystemFactory for SimpleFactory {
    fn create(&self, owner: Entity) -> Box<dyn ParticleSystem> {
        Box::new(self.emitter(owner))
    }

    fn texture(&self) -> Option<Handle<Image>> {
        Some(self.texture.clone())
    }
}

#[derive(Debug, Clone, Copy)]
struct Particle {
    position: Vec2,
    velocity: Vec2,
    animation: usize,
}

/// Particles spawned in the same tick. They occupy a contiguous run of the
/// particle buffer and expire together.
#[derive(Debug, Clone, Copy)]
struct Generation {
    members: usize,
    created_at: u64,
}

/// Configuration values that can be changed while the emitter runs.
#[derive(Debug, Clone, Copy)]
struct LiveParams {
    spawn_rate: i32,
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
    velocity_x: i32,
    velocity_y: i32,
}

impl From<&SimpleEmitterConfig> for LiveParams {
    fn from(config: &SimpleEmitterConfig) -> Self {
        Self {
            spawn_rate: config.spawn_rate,
            min_x: config.min_x,
            max_x: config.max_x,
            min_y: config.min_y,
            max_y: config.max_y,
            velocity_x: config.velocity_x,
            velocity_y: config.velocity_y,
        }
    }
}

/// Emitter of animated sprites whose lifetime is tracked per generation.
///
/// The particle buffer always equals the concatenation of the generation queue:
/// the oldest generation is the leading slice of the buffer.
pub struct SimpleEmitter {
    owner: Entity,
    config: Arc<SimpleEmitterConfig>,
    animations: Arc<[ParticleAnimation]>,
    texture: Handle<Image>,
    live: LiveParams,
    particles: VecDeque<Particle>,
    generations: VecDeque<Generation>,
    tick: u64,
    system_time_to_live: Option<u32>,
    spawn_buildup: i32,
    rng: StdRng,
}

impl SimpleEmitter {
    fn new(owner: Entity, factory: &SimpleFactory) -> Self {
        let config = Arc::clone(&factory.config);
        Self {
            owner,
            live: LiveParams::from(config.as_ref()),
            system_time_to_live: config.system_time_to_live,
            rng: emitter_rng(config.fixed_seed),
            animations: Arc::clone(&factory.animations),
            texture: factory.texture.clone(),
            config,
            particles: VecDeque::new(),
            generations: VecDeque::new(),
            tick: 0,
            spawn_buildup: 0,
        }
    }

    /// Number of ticks processed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Spawn carry-over in per-mille, always below `1000`.
    pub fn spawn_buildup(&self) -> i32 {
        self.spawn_buildup
    }

    /// Remaining ticks before the emitter destroys itself, if it has a lifetime.
    pub fn system_time_to_live(&self) -> Option<u32> {
        self.system_time_to_live
    }

    /// `(members, spawn tick)` of every live generation, oldest first.
    pub fn generations(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.generations.iter().map(|g| (g.members, g.created_at))
    }

    /// Positions of every live particle, oldest first.
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    fn expire_generations(&mut self) {
        let time_to_live = u64::from(self.config.time_to_live);
        while let Some(front) = self.generations.front() {
            if self.tick - front.created_at != time_to_live {
                break;
            }
            let members = front.members.min(self.particles.len());
            self.particles.drain(..members);
            self.generations.pop_front();
        }
    }

    fn spawn_count(&mut self) -> usize {
        let total = i64::from(self.live.spawn_rate)
            + i64::from(jitter(&mut self.rng, self.config.spawn_rate_random))
            + i64::from(self.spawn_buildup);
        if total <= 0 {
            self.spawn_buildup = 0;
            return 0;
        }
        self.spawn_buildup = (total % 1000) as i32;
        (total / 1000) as usize
    }

    fn spawn_particle(&mut self, owner_position: Vec2) -> Particle {
        let config = &self.config;
        let live = self.live;

        let mut position = owner_position + Vec2::new(live.min_x as f32, live.min_y as f32);
        let spread_x = i64::from(live.max_x) - i64::from(live.min_x);
        if spread_x > 0 {
            position.x += self.rng.random_range(0..spread_x * 1000) as f32 / 1000.0;
        }
        let spread_y = i64::from(live.max_y) - i64::from(live.min_y);
        if spread_y > 0 {
            position.y += self.rng.random_range(0..spread_y * 1000) as f32 / 1000.0;
        }

        let mut velocity = Vec2::new(
            live.velocity_x
                .saturating_add(jitter(&mut self.rng, config.velocity_x_random)) as f32,
            live.velocity_y
                .saturating_add(jitter(&mut self.rng, config.velocity_y_random)) as f32,
        ) / 1000.0;

        let magnitude = config
            .velocity_magnitude
            .saturating_add(jitter(&mut self.rng, config.velocity_magnitude_random));
        if magnitude != 0 {
            let degrees = config
                .velocity_rotate
                .saturating_add(jitter(&mut self.rng, config.velocity_rotate_random));
            let pi = if config.legacy_angle_pi { LEGACY_PI } else { PI };
            let theta = degrees as f32 / 360.0 * 2.0 * pi;
            velocity += Vec2::new(theta.sin(), theta.cos()) * (magnitude as f32 / 1000.0);
        }

        Particle {
            position,
            velocity,
            animation: self.rng.random_range(0..self.animations.len()),
        }
    }
}

impl ParticleSystem for SimpleEmitter {
    fn owner(&self) -> Entity {
        self.owner
    }

    fn process(&mut self, owner_position: Vec2) {
        if let Some(remaining) = self.system_time_to_live.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.tick += 1;

        self.expire_generations();

        let accel = Vec2::new(self.config.accel_x as f32, self.config.accel_y as f32) / 1000.0;
        for particle in &mut self.particles {
            particle.position += particle.velocity;
            particle.velocity += accel;
        }

        let count = self.spawn_count();
        self.generations.push_back(Generation {
            members: count,
            created_at: self.tick,
        });
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = self.spawn_particle(owner_position);
            self.particles.push_back(particle);
        }
    }

    fn draw(&self, batch: &mut DrawBatch) {
        if self.particles.is_empty() {
            return;
        }

        batch.topology = BatchTopology::TriangleStrip;
        batch.texture = Some(self.texture.clone());

        let vertex_count = self.particles.len() * VERTICES_PER_PARTICLE;
        batch.vertices.reserve(vertex_count);
        batch.uvs.reserve(vertex_count);
        let fade = self.config.delta_a != 0;
        if fade {
            batch.colors.reserve(vertex_count);
        }

        let mut particles = self.particles.iter();
        for generation in &self.generations {
            let age = self.tick - generation.created_at;
            let alpha = (256 - i64::from(self.config.delta_a) * age as i64).clamp(0, 255) as u8;

            for particle in particles.by_ref().take(generation.members) {
                let animation = &self.animations[particle.animation];
                let frame = animation.frame(age);
                let Vec2 { x, y } = particle.position;
                let (w, h) = (animation.width(), animation.height());

                batch.vertices.extend_from_slice(&[
                    [x, y],
                    [x, y],
                    [x + w, y],
                    [x, y + h],
                    [x + w, y + h],
                    [x + w, y + h],
                ]);
                // y points up, texture rows point down
                batch.uvs.extend_from_slice(&[
                    [frame.u1, frame.v2],
                    [frame.u1, frame.v2],
                    [frame.u2, frame.v2],
                    [frame.u1, frame.v1],
                    [frame.u2, frame.v1],
                    [frame.u2, frame.v1],
                ]);
                if fade {
                    batch
                        .colors
                        .extend(std::iter::repeat_n([255, 255, 255, alpha], VERTICES_PER_PARTICLE));
                }
            }
        }
    }

    fn is_destroyed(&self) -> bool {
        self.system_time_to_live == Some(0)
            || (self.live.spawn_rate == 0 && self.particles.is_empty())
    }

    fn particle_count(&self) -> usize {
        self.particles.len()
    }

    fn get_value(&self, property: EmitterProperty) -> Option<i32> {
        match property {
            EmitterProperty::SpawnRate => Some(self.live.spawn_rate),
            _ => None,
        }
    }

    fn set_value(&mut self, property: EmitterProperty, value: i32) {
        match property {
            EmitterProperty::SpawnRate => self.live.spawn_rate = value,
            EmitterProperty::MinX => self.live.min_x = value,
            EmitterProperty::MaxX => self.live.max_x = value,
            EmitterProperty::MinY => self.live.min_y = value,
            EmitterProperty::MaxY => self.live.max_y = value,
            EmitterProperty::VelocityX => self.live.velocity_x = value,
            EmitterProperty::VelocityY => self.live.velocity_y = value,
            EmitterProperty::GenerationRate => {}
        }
    }
}
