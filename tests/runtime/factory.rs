use super::helpers::*;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use bevy::prelude::*;
use bevy_embers::{
    EmitterProperty, ExternalFactories, FactoryError, ParticleSystem, ParticleSystemFactory,
    PointFactory, TextureError, UnknownEmitterType, create_factory,
    asset::{EmitterDefinition, EmitterKind, PointEmitterConfig, SimpleEmitterConfig},
};

fn weather_config() -> ron::Value {
    ron::from_str("{\"density\": 3}").unwrap()
}

#[test]
fn point_definitions_build_untextured_factories() {
    let definition = EmitterDefinition::Point(point_config());
    let factory =
        create_factory(&definition, &spark_textures(), &ExternalFactories::default()).unwrap();

    assert!(factory.texture().is_none());
    let emitter = factory.create(Entity::PLACEHOLDER);
    assert_eq!(emitter.particle_count(), 0);
    assert_eq!(emitter.owner(), Entity::PLACEHOLDER);
}

#[test]
fn simple_definitions_build_textured_factories() {
    let definition = EmitterDefinition::Simple(simple_config());
    let factory =
        create_factory(&definition, &spark_textures(), &ExternalFactories::default()).unwrap();

    assert!(factory.texture().is_some());
    let emitter = factory.create(Entity::PLACEHOLDER);
    assert_eq!(emitter.get_value(EmitterProperty::SpawnRate), Some(1000));
}

#[test]
fn emitters_from_one_factory_are_independent() {
    let factory = create_factory(
        &EmitterDefinition::Simple(simple_config()),
        &spark_textures(),
        &ExternalFactories::default(),
    )
    .unwrap();

    let mut first = factory.create(Entity::PLACEHOLDER);
    let second = factory.create(Entity::PLACEHOLDER);
    for _ in 0..5 {
        first.process(Vec2::ZERO);
    }
    first.set_value(EmitterProperty::SpawnRate, 0);

    assert_eq!(first.particle_count(), 5);
    assert_eq!(second.particle_count(), 0);
    assert_eq!(second.get_value(EmitterProperty::SpawnRate), Some(1000));
}

#[test]
fn simple_definition_without_animations_is_rejected() {
    let definition = EmitterDefinition::Simple(SimpleEmitterConfig {
        animations: vec![],
        ..simple_config()
    });
    let result = create_factory(&definition, &spark_textures(), &ExternalFactories::default());

    assert!(matches!(result, Err(FactoryError::NoAnimations)));
}

#[test]
fn unresolvable_texture_is_a_factory_error() {
    let definition = EmitterDefinition::Simple(simple_config());
    let result = create_factory(
        &definition,
        &test_textures(&[]),
        &ExternalFactories::default(),
    );

    assert!(matches!(
        result,
        Err(FactoryError::Texture(TextureError::Missing(path))) if path == "spark.png"
    ));
}

#[test]
fn unregistered_external_kind_is_a_factory_error() {
    let definition = EmitterDefinition::Weather(weather_config());
    let result = create_factory(&definition, &spark_textures(), &ExternalFactories::default());

    assert!(matches!(
        result,
        Err(FactoryError::UnregisteredKind(EmitterKind::Weather))
    ));
}

#[test]
fn registered_external_builder_receives_its_configuration() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let mut externals = ExternalFactories::default();
    externals
        .register("weather", move |config, _textures| {
            assert_eq!(config, &weather_config());
            seen.fetch_add(1, Ordering::SeqCst);
            let factory: Arc<dyn ParticleSystemFactory> =
                Arc::new(PointFactory::new(PointEmitterConfig::default())?);
            Ok(factory)
        })
        .unwrap();

    assert!(externals.contains(EmitterKind::Weather));
    assert!(!externals.contains(EmitterKind::Water));

    let definition = EmitterDefinition::Weather(weather_config());
    let factory = create_factory(&definition, &spark_textures(), &externals).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(factory.create(Entity::PLACEHOLDER).particle_count(), 0);

    let water = create_factory(
        &EmitterDefinition::Water(weather_config()),
        &spark_textures(),
        &externals,
    );
    assert!(matches!(
        water,
        Err(FactoryError::UnregisteredKind(EmitterKind::Water))
    ));
}

#[test]
fn builtin_and_unknown_kinds_cannot_be_registered() {
    let mut externals = ExternalFactories::default();

    let builtin = externals
        .register("point", |_, _| Err(FactoryError::NoAnimations))
        .map(|_| ());
    assert!(matches!(
        builtin,
        Err(FactoryError::BuiltinKind(EmitterKind::Point))
    ));

    let unknown = externals
        .register("smoke", |_, _| Err(FactoryError::NoAnimations))
        .map(|_| ());
    assert!(matches!(
        unknown,
        Err(FactoryError::UnknownEmitterType(UnknownEmitterType(tag))) if tag == "smoke"
    ));
}

#[test]
fn type_tags_parse_into_kinds() {
    for kind in [
        EmitterKind::Simple,
        EmitterKind::Point,
        EmitterKind::Weather,
        EmitterKind::Water,
    ] {
        assert_eq!(kind.as_str().parse::<EmitterKind>(), Ok(kind));
        assert_eq!(kind.to_string(), kind.as_str());
    }

    assert_eq!(
        "fountain".parse::<EmitterKind>(),
        Err(UnknownEmitterType("fountain".to_string()))
    );
    assert!(EmitterKind::Water.is_external());
    assert!(!EmitterKind::Simple.is_external());
}

#[test]
fn property_keys_map_to_properties() {
    for key in [
        "spawn_rate",
        "min_x",
        "max_x",
        "min_y",
        "max_y",
        "velocity_x",
        "velocity_y",
        "generation_rate",
    ] {
        let property = EmitterProperty::from_key(key).unwrap();
        assert_eq!(property.key(), key);
    }

    assert_eq!(
        EmitterProperty::from_key("generation_rate_millis"),
        Some(EmitterProperty::GenerationRate)
    );

    assert_eq!(EmitterProperty::from_key("accel_x"), None);
    assert_eq!(EmitterProperty::from_key(""), None);
}
