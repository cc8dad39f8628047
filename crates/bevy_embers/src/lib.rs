//! **Embers** is a declarative 2D particle emitter library for the
//! [Bevy game engine](https://bevyengine.org/).
//!
//! Effects are described in RON files and simulated on the CPU in fixed
//! ticks, one draw batch per emitter.
//!
//! # Getting started
//!
//! Add [`EmbersPlugin`] to your Bevy app:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_embers::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, EmbersPlugin))
//!         .run();
//! }
//! ```
//!
//! Then attach an effect to any entity with a `Transform`:
//!
//! ```
//! use bevy::prelude::*;
//! use bevy_embers::prelude::*;
//!
//! fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn((
//!         ParticleEmitter {
//!             handle: asset_server.load("torch_sparks.ron"),
//!         },
//!         Transform::from_xyz(120.0, 40.0, 1.0),
//!     ));
//! }
//! ```
//!
//! # Emitter kinds
//!
//! An effect file holds one [`EmitterDefinition`], whose variant selects the model:
//!
//! - `Simple`: animated sprites spawned in generations that expire together,
//!   see [`SimpleEmitterConfig`]
//! - `Point`: single points with their own lifetime and a color gradient,
//!   see [`PointEmitterConfig`]
//! - `Weather` and `Water`: provided by other systems through
//!   [`ExternalFactories`]
//!
//! ```ron
//! (
//!     embers_version: "0.2",
//!     name: "Torch sparks",
//!     emitter: Point((
//!         generation_rate_millis: 500,
//!         velocity_y: -300,
//!         velocity_x_rand: 200,
//!         time_to_live: 40,
//!         time_to_live_rand: 20,
//!         colors: ["FFD040FF", "FF400000"],
//!     )),
//! )
//! ```
//!
//! # Simulation
//!
//! Emitters advance once per `FixedUpdate` run and are drawn in `PostUpdate`
//! into a mesh entity tagged with [`EmitterMeshEntity`]. Emitters that run out
//! are removed from their entity. Other systems can tune a running emitter
//! through [`EmitterRuntime::set_property`].

/// Particle system asset definitions and the RON loader.
pub mod asset;
/// Sprite-sheet animations and texture resolution.
pub mod atlas;
/// Draw batches and their conversion to meshes.
pub mod batch;
/// The emitter trait and the built-in emitter models.
pub mod emitter;
/// Polymorphic factory creation.
pub mod factory;
/// Convenience re-exports for common particle system types.
pub mod prelude;
/// Runtime components and resources for live emitters.
pub mod runtime;
mod spawning;

use bevy::prelude::*;

use asset::{ParticleSystemAsset, ParticleSystemAssetLoader};
use spawning::{
    attach_emitters, build_emitter_factories, cleanup_orphaned_meshes, process_emitters,
    sync_emitter_meshes,
};

/// Plugin that adds particle emitter support to a Bevy app.
///
/// Registers the asset loader, the factory and draw-buffer resources, and the
/// systems that build, simulate and draw emitters. Expects the image, mesh and
/// `ColorMaterial` asset types to be registered, as `DefaultPlugins` does.
pub struct EmbersPlugin;

impl Plugin for EmbersPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<ParticleSystemAsset>()
            .init_asset_loader::<ParticleSystemAssetLoader>();

        app.init_resource::<EmitterFactories>()
            .init_resource::<ExternalFactories>()
            .init_resource::<ParticleDrawBuffers>();

        app.add_systems(
            Update,
            (
                build_emitter_factories,
                attach_emitters,
                cleanup_orphaned_meshes,
            )
                .chain(),
        )
        .add_systems(FixedUpdate, process_emitters)
        .add_systems(PostUpdate, sync_emitter_meshes);
    }
}

pub use asset::{
    AnimationConfig, EmitterDefinition, EmitterKind, FrameRect, PointEmitterConfig,
    SimpleEmitterConfig, UnknownEmitterType,
};
pub use atlas::{AtlasTexture, FrameArea, LoadedTextures, ParticleAnimation, TextureError, TextureSource};
pub use batch::{BatchFlags, BatchTopology, BatchVertex, DrawBatch};
pub use emitter::{
    ColorGradient, EmitterProperty, ParticleSystem, PointEmitter, PointFactory, SimpleEmitter,
    SimpleFactory,
};
pub use factory::{ExternalFactories, FactoryError, ParticleSystemFactory, create_factory};
pub use runtime::{
    EmitterFactories, EmitterMeshEntity, EmitterRuntime, ParticleDrawBuffers, ParticleEmitter,
};
