use super::helpers::*;

use bevy::prelude::*;
use bevy_embers::{
    BatchTopology, ColorGradient, DrawBatch, EmitterProperty, FactoryError, ParticleSystem,
    PointEmitter, PointFactory, asset::PointEmitterConfig,
};

fn emitter(config: PointEmitterConfig) -> PointEmitter {
    PointFactory::new(config)
        .unwrap()
        .emitter(Entity::PLACEHOLDER)
}

fn colors(hex: &[&str]) -> Vec<String> {
    hex.iter().map(|c| c.to_string()).collect()
}

#[test]
fn two_color_gradient_maps_birth_and_death() {
    let gradient = ColorGradient::new(&colors(&["FF0000FF", "00FF00FF"]), 10).unwrap();

    assert_eq!(gradient.divisor(), 10);
    assert_eq!(gradient.color(10), [255, 0, 0, 255]);
    assert_eq!(gradient.color(0), [0, 255, 0, 255]);
    assert_eq!(gradient.color(9), [0, 255, 0, 255]);
}

#[test]
fn gradient_index_stays_in_bounds_for_every_lifetime() {
    let palette = ["FF0000FF", "00FF00FF", "0000FFFF", "FFFFFF00", "102030", "A0B0C0D0"];
    for count in 0..=palette.len() {
        for max_ttl in 0..=200 {
            let gradient = ColorGradient::new(&colors(&palette[..count]), max_ttl).unwrap();
            let len = gradient.colors().len() as u32;
            for ttl in 0..=max_ttl {
                assert!(
                    ttl / gradient.divisor() < len,
                    "ttl {ttl} escapes a gradient of {len} colors (max {max_ttl})"
                );
            }
        }
    }
}

#[test]
fn short_gradients_are_padded_with_white() {
    let empty = ColorGradient::new(&[], 5).unwrap();
    assert_eq!(empty.colors(), &[[255, 255, 255, 255], [255, 255, 255, 255]]);

    let single = ColorGradient::new(&colors(&["102030"]), 5).unwrap();
    assert_eq!(single.colors(), &[[16, 32, 48, 255], [255, 255, 255, 255]]);
}

#[test]
fn hex_prefixes_are_accepted() {
    let gradient = ColorGradient::new(&colors(&["0xFF000080", "#00FF00"]), 4).unwrap();

    assert_eq!(gradient.colors()[1], [255, 0, 0, 128]);
    assert_eq!(gradient.colors()[0], [0, 255, 0, 255]);
}

#[test]
fn invalid_color_is_rejected() {
    let result = PointFactory::new(PointEmitterConfig {
        colors: colors(&["FF0000FF", "not a color"]),
        ..point_config()
    });

    assert!(matches!(result, Err(FactoryError::InvalidColor(c)) if c == "not a color"));
}

#[test]
fn generation_timer_accumulates_fractions() {
    let mut emitter = emitter(PointEmitterConfig {
        generation_rate_millis: 250,
        time_to_live: 1000,
        ..point_config()
    });

    for _ in 0..8 {
        emitter.process(Vec2::ZERO);
    }

    assert_eq!(emitter.particle_count(), 2);
    assert_eq!(emitter.generation_timer(), 0);
}

#[test]
fn several_particles_spawn_in_one_tick() {
    let mut emitter = emitter(PointEmitterConfig {
        generation_rate_millis: 3500,
        ..point_config()
    });

    emitter.process(Vec2::ZERO);
    assert_eq!(emitter.particle_count(), 3);
    assert_eq!(emitter.generation_timer(), 500);

    emitter.process(Vec2::ZERO);
    assert_eq!(emitter.particle_count(), 7);
}

#[test]
fn expired_particles_are_compacted_in_order() {
    let mut emitter = emitter(PointEmitterConfig {
        time_to_live: 3,
        ..point_config()
    });

    for _ in 0..3 {
        emitter.process(Vec2::ZERO);
    }
    assert_eq!(emitter.lifetimes().collect::<Vec<_>>(), vec![1, 2, 3]);

    emitter.process(Vec2::ZERO);
    assert_eq!(emitter.lifetimes().collect::<Vec<_>>(), vec![1, 2, 3]);

    emitter.set_value(EmitterProperty::GenerationRate, 0);
    for _ in 0..3 {
        emitter.process(Vec2::ZERO);
    }
    assert_eq!(emitter.particle_count(), 0);
}

#[test]
fn lifetime_jitter_stays_within_range() {
    let mut emitter = emitter(PointEmitterConfig {
        generation_rate_millis: 4000,
        time_to_live: 20,
        time_to_live_rand: 15,
        ..point_config()
    });

    emitter.process(Vec2::ZERO);

    assert_eq!(emitter.particle_count(), 4);
    assert!(emitter.lifetimes().all(|ttl| (20..35).contains(&ttl)));
}

#[test]
fn positions_use_fixed_point_subunits() {
    let mut emitter = emitter(PointEmitterConfig {
        pos_x: 1,
        velocity_x: 512,
        ..point_config()
    });

    emitter.process(Vec2::new(2.0, 3.0));
    assert_eq!(emitter.raw_positions().next(), Some(IVec2::new(3072, 3072)));

    emitter.process(Vec2::new(2.0, 3.0));
    assert_eq!(emitter.raw_positions().next(), Some(IVec2::new(3584, 3072)));

    let mut batch = DrawBatch::default();
    emitter.draw(&mut batch);
    assert_eq!(batch.vertices[0], [3.0, 3.0]);
}

#[test]
fn position_jitter_is_scaled_to_subunits() {
    let mut emitter = emitter(PointEmitterConfig {
        generation_rate_millis: 10_000,
        pos_x_rand: 4,
        ..point_config()
    });

    emitter.process(Vec2::ZERO);

    assert!(
        emitter
            .raw_positions()
            .all(|p| (0..4 * 1024).contains(&p.x) && p.y == 0)
    );
}

#[test]
fn channels_wrap_around() {
    let mut emitter = emitter(PointEmitterConfig {
        red: 250,
        red_delta: 10,
        alpha: 3,
        alpha_delta: -5,
        ..point_config()
    });

    emitter.process(Vec2::ZERO);
    emitter.process(Vec2::ZERO);

    assert_eq!(emitter.rgba().next(), Some([4, 0, 0, 254]));
}

#[test]
fn draw_emits_one_colored_point_per_particle() {
    let mut emitter = emitter(PointEmitterConfig {
        colors: colors(&["FF0000FF", "00FF00FF"]),
        ..point_config()
    });
    for _ in 0..3 {
        emitter.process(Vec2::ZERO);
    }

    let mut batch = DrawBatch::default();
    emitter.draw(&mut batch);

    assert_eq!(batch.topology, BatchTopology::PointList);
    assert!(batch.texture.is_none());
    assert!(batch.uvs.is_empty());
    assert_eq!(batch.point_size, 4.0);
    assert_eq!(batch.vertices.len(), 3);
    // lifetimes are 8, 9 and 10 with a divisor of 10
    assert_eq!(
        batch.colors,
        vec![[0, 255, 0, 255], [0, 255, 0, 255], [255, 0, 0, 255]]
    );
}

#[test]
fn empty_emitter_draws_nothing() {
    let emitter = emitter(point_config());

    let mut batch = DrawBatch::default();
    emitter.draw(&mut batch);

    assert!(batch.is_empty());
    assert!(batch.colors.is_empty());
}

#[test]
fn generation_rate_is_the_only_property() {
    let mut emitter = emitter(point_config());

    assert_eq!(emitter.get_value(EmitterProperty::GenerationRate), Some(1000));
    assert_eq!(emitter.get_value(EmitterProperty::SpawnRate), None);

    emitter.set_value(EmitterProperty::SpawnRate, 5000);
    emitter.set_value(EmitterProperty::GenerationRate, 2000);
    assert_eq!(emitter.get_value(EmitterProperty::GenerationRate), Some(2000));

    emitter.process(Vec2::ZERO);
    assert_eq!(emitter.particle_count(), 2);
}

#[test]
fn point_emitters_never_destroy_themselves() {
    let mut emitter = emitter(PointEmitterConfig {
        generation_rate_millis: 0,
        ..point_config()
    });

    for _ in 0..20 {
        emitter.process(Vec2::ZERO);
    }

    assert_eq!(emitter.particle_count(), 0);
    assert!(!emitter.is_destroyed());
}

#[test]
fn extreme_values_saturate() {
    let mut emitter = emitter(PointEmitterConfig {
        generation_rate_millis: 1000,
        pos_x: i32::MAX,
        pos_x_rand: 5,
        velocity_x: i32::MAX,
        velocity_x_rand: 10,
        velocity_y: i32::MIN,
        time_to_live: u32::MAX - 1,
        time_to_live_rand: 5,
        ..point_config()
    });

    for _ in 0..3 {
        emitter.process(Vec2::new(1e12, -1e12));
    }

    assert_eq!(emitter.particle_count(), 3);
    assert!(
        emitter
            .raw_positions()
            .all(|p| p == IVec2::new(i32::MAX, i32::MIN))
    );
    assert!(emitter.lifetimes().all(|ttl| ttl > u32::MAX - 10));
}

#[test]
fn negative_rates_build_no_spawn_debt() {
    let mut emitter = emitter(point_config());
    emitter.set_value(EmitterProperty::GenerationRate, -5000);
    for _ in 0..10 {
        emitter.process(Vec2::ZERO);
    }
    assert_eq!(emitter.generation_timer(), 0);
    assert_eq!(emitter.particle_count(), 0);

    emitter.set_value(EmitterProperty::GenerationRate, 1000);
    emitter.process(Vec2::ZERO);
    assert_eq!(emitter.particle_count(), 1);
}
