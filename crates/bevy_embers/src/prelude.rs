pub use crate::EmbersPlugin;

pub use crate::asset::{
    AnimationConfig, EmitterDefinition, EmitterKind, FrameRect, ParticleSystemAsset,
    PointEmitterConfig, SimpleEmitterConfig,
};
pub use crate::batch::{BatchTopology, DrawBatch};
pub use crate::emitter::{EmitterProperty, ParticleSystem};
pub use crate::factory::{ExternalFactories, FactoryError, ParticleSystemFactory};

pub use crate::runtime::{EmitterMeshEntity, EmitterRuntime, ParticleEmitter};
