use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use bevy::prelude::*;

use crate::{
    asset::ParticleSystemAsset,
    batch::DrawBatch,
    emitter::{EmitterProperty, ParticleSystem},
    factory::ParticleSystemFactory,
};

/// Attaches a particle effect to an entity.
///
/// The entity's world position (`GlobalTransform`) is the emitter origin. Once the effect's
/// factory is ready an [`EmitterRuntime`] is inserted next to this component.
#[derive(Component, Debug, Clone)]
pub struct ParticleEmitter {
    pub handle: Handle<ParticleSystemAsset>,
}

/// The live emitter of a [`ParticleEmitter`] entity.
#[derive(Component)]
pub struct EmitterRuntime {
    pub paused: bool,
    emitter: Box<dyn ParticleSystem>,
}

impl EmitterRuntime {
    pub fn new(emitter: Box<dyn ParticleSystem>) -> Self {
        Self {
            paused: false,
            emitter,
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle(&mut self) {
        self.paused = !self.paused;
    }

    pub fn emitter(&self) -> &dyn ParticleSystem {
        self.emitter.as_ref()
    }

    pub fn emitter_mut(&mut self) -> &mut dyn ParticleSystem {
        self.emitter.as_mut()
    }

    pub fn particle_count(&self) -> usize {
        self.emitter.particle_count()
    }

    /// Reads a runtime property of the emitter.
    pub fn get_property(&self, property: EmitterProperty) -> Option<i32> {
        self.emitter.get_value(property)
    }

    /// Changes a runtime property of the emitter. Unsupported properties are ignored.
    pub fn set_property(&mut self, property: EmitterProperty, value: i32) {
        self.emitter.set_value(property, value);
    }

    /// Like [`set_property`](Self::set_property), addressed by configuration
    /// attribute name. Unknown names are ignored.
    pub fn set_property_by_key(&mut self, key: &str, value: i32) {
        if let Some(property) = EmitterProperty::from_key(key) {
            self.set_property(property, value);
        }
    }
}

/// Marks the entity that renders the particles of `owner`.
#[derive(Component, Debug, Clone, Copy)]
pub struct EmitterMeshEntity {
    pub owner: Entity,
}

/// Scratch batch every emitter draws into before its mesh is written.
#[derive(Resource, Default)]
pub struct ParticleDrawBuffers {
    pub batch: DrawBatch,
}

/// Factories built from loaded [`ParticleSystemAsset`]s.
#[derive(Resource, Default)]
pub struct EmitterFactories {
    ready: HashMap<AssetId<ParticleSystemAsset>, Arc<dyn ParticleSystemFactory>>,
    pub(crate) pending: HashMap<AssetId<ParticleSystemAsset>, Vec<Handle<Image>>>,
    failed: HashSet<AssetId<ParticleSystemAsset>>,
}

impl EmitterFactories {
    pub fn get(&self, id: AssetId<ParticleSystemAsset>) -> Option<&Arc<dyn ParticleSystemFactory>> {
        self.ready.get(&id)
    }

    /// Registers a factory for `id`, bypassing asset resolution.
    pub fn insert(
        &mut self,
        id: AssetId<ParticleSystemAsset>,
        factory: Arc<dyn ParticleSystemFactory>,
    ) {
        self.pending.remove(&id);
        self.failed.remove(&id);
        self.ready.insert(id, factory);
    }

    pub fn is_ready(&self, id: AssetId<ParticleSystemAsset>) -> bool {
        self.ready.contains_key(&id)
    }

    /// Whether building the factory for `id` failed. Failed assets are not retried.
    pub fn is_failed(&self, id: AssetId<ParticleSystemAsset>) -> bool {
        self.failed.contains(&id)
    }

    pub(crate) fn mark_failed(&mut self, id: AssetId<ParticleSystemAsset>) {
        self.pending.remove(&id);
        self.failed.insert(id);
    }
}
