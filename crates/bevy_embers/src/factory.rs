use std::{collections::HashMap, sync::Arc};

use bevy::prelude::*;
use thiserror::Error;

use crate::{
    asset::{EmitterDefinition, EmitterKind, UnknownEmitterType},
    atlas::{TextureError, TextureSource},
    emitter::{ParticleSystem, PointFactory, SimpleFactory},
};

/// Shared blueprint that creates emitters of one kind.
///
/// Factories are immutable once built and may be used from any thread; every
/// emitter they create is independent of the others.
pub trait ParticleSystemFactory: Send + Sync {
    /// Creates a fresh emitter bound to `owner`.
    fn create(&self, owner: Entity) -> Box<dyn ParticleSystem>;

    /// Texture every emitter of this factory draws with, if any.
    fn texture(&self) -> Option<Handle<Image>> {
        None
    }
}

/// Errors raised while turning an [`EmitterDefinition`] into a factory.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The type tag does not name any emitter kind.
    #[error(transparent)]
    UnknownEmitterType(#[from] UnknownEmitterType),
    /// An animation texture could not be resolved.
    #[error("Could not build animation: {0}")]
    Texture(#[from] TextureError),
    /// A simple emitter was configured without animations.
    #[error("Simple emitter needs at least one animation")]
    NoAnimations,
    /// A gradient color is not valid hex.
    #[error("Invalid color \"{0}\", expected RRGGBBAA or RRGGBB hex digits")]
    InvalidColor(String),
    /// No builder is registered for an external emitter kind.
    #[error("No factory registered for \"{0}\" emitters")]
    UnregisteredKind(EmitterKind),
    /// A builder was registered for a kind this crate implements itself.
    #[error("\"{0}\" emitters are built in and cannot be registered")]
    BuiltinKind(EmitterKind),
    /// An external builder rejected its configuration.
    #[error("Invalid {kind} configuration: {message}")]
    External {
        /// Kind whose builder failed.
        kind: EmitterKind,
        /// What the builder reported.
        message: String,
    },
}

type ExternalBuilder = Box<
    dyn Fn(&ron::Value, &dyn TextureSource) -> Result<Arc<dyn ParticleSystemFactory>, FactoryError>
        + Send
        + Sync,
>;

/// Builders for emitter kinds implemented outside this crate.
///
/// Weather and water effects are owned by the systems that simulate them. Those
/// systems register a builder here; definitions of a kind with no builder fail
/// with [`FactoryError::UnregisteredKind`].
#[derive(Resource, Default)]
pub struct ExternalFactories {
    builders: HashMap<EmitterKind, ExternalBuilder>,
}

impl ExternalFactories {
    /// Registers the builder for the kind named `tag`, replacing any earlier one.
    pub fn register<F>(&mut self, tag: &str, builder: F) -> Result<&mut Self, FactoryError>
    where
        F: Fn(&ron::Value, &dyn TextureSource) -> Result<Arc<dyn ParticleSystemFactory>, FactoryError>
            + Send
            + Sync
            + 'static,
    {
        let kind: EmitterKind = tag.parse()?;
        if !kind.is_external() {
            return Err(FactoryError::BuiltinKind(kind));
        }
        self.builders.insert(kind, Box::new(builder));
        Ok(self)
    }

    /// Whether a builder is registered for `kind`.
    pub fn contains(&self, kind: EmitterKind) -> bool {
        self.builders.contains_key(&kind)
    }

    fn build(
        &self,
        kind: EmitterKind,
        config: &ron::Value,
        textures: &dyn TextureSource,
    ) -> Result<Arc<dyn ParticleSystemFactory>, FactoryError> {
        let builder = self
            .builders
            .get(&kind)
            .ok_or(FactoryError::UnregisteredKind(kind))?;
        builder(config, textures)
    }
}

/// Builds the factory for `definition`, dispatching on its type tag.
///
/// Animation textures are resolved through `textures`; weather and water
/// definitions are handed to the builder registered in `externals`.
pub fn create_factory(
    definition: &EmitterDefinition,
    textures: &dyn TextureSource,
    externals: &ExternalFactories,
) -> Result<Arc<dyn ParticleSystemFactory>, FactoryError> {
    match definition {
        EmitterDefinition::Simple(config) => {
            Ok(Arc::new(SimpleFactory::new(config.clone(), textures)?))
        }
        EmitterDefinition::Point(config) => Ok(Arc::new(PointFactory::new(config.clone())?)),
        EmitterDefinition::Weather(config) | EmitterDefinition::Water(config) => {
            externals.build(definition.kind(), config, textures)
        }
    }
}
