use bevy::{asset::LoadState, prelude::*};

use crate::{
    asset::ParticleSystemAsset,
    atlas::LoadedTextures,
    batch::DrawBatch,
    factory::{ExternalFactories, create_factory},
    runtime::{
        EmitterFactories, EmitterMeshEntity, EmitterRuntime, ParticleDrawBuffers, ParticleEmitter,
    },
};

enum ImageStatus {
    Ready,
    Loading,
    Failed(String),
}

pub fn build_emitter_factories(
    emitters: Query<&ParticleEmitter>,
    assets: Res<Assets<ParticleSystemAsset>>,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
    externals: Res<ExternalFactories>,
    mut factories: ResMut<EmitterFactories>,
) {
    for emitter in emitters.iter() {
        let id = emitter.handle.id();
        if factories.is_ready(id) || factories.is_failed(id) {
            continue;
        }

        let Some(asset) = assets.get(id) else {
            continue;
        };

        let pending = factories.pending.entry(id).or_insert_with(|| {
            asset
                .emitter
                .image_paths()
                .into_iter()
                .map(|path| asset_server.load(path.to_string()))
                .collect()
        });

        let status = pending
            .iter()
            .find_map(|image| match asset_server.load_state(image) {
                LoadState::Failed(err) => Some(ImageStatus::Failed(err.to_string())),
                _ if !images.contains(image) => Some(ImageStatus::Loading),
                _ => None,
            })
            .unwrap_or(ImageStatus::Ready);

        match status {
            ImageStatus::Loading => continue,
            ImageStatus::Failed(err) => {
                error!("Particle system \"{}\" is missing an image: {err}", asset.name);
                factories.mark_failed(id);
                continue;
            }
            ImageStatus::Ready => {}
        }

        let textures = LoadedTextures::new(&asset_server, &images);
        match create_factory(&asset.emitter, &textures, &externals) {
            Ok(factory) => {
                debug!(
                    "Built {} particle system factory \"{}\"",
                    asset.emitter.kind(),
                    asset.name
                );
                factories.insert(id, factory);
            }
            Err(err) => {
                error!("Could not build particle system \"{}\": {err}", asset.name);
                factories.mark_failed(id);
            }
        }
    }
}

pub fn attach_emitters(
    mut commands: Commands,
    query: Query<(Entity, &ParticleEmitter, Option<&GlobalTransform>), Without<EmitterRuntime>>,
    factories: Res<EmitterFactories>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (owner, emitter, transform) in query.iter() {
        let Some(factory) = factories.get(emitter.handle.id()) else {
            continue;
        };

        let mesh = meshes.add(DrawBatch::default().to_mesh());
        let material = materials.add(ColorMaterial {
            texture: factory.texture(),
            ..default()
        });
        let depth = transform.map_or(0.0, |t| t.translation().z);

        commands
            .entity(owner)
            .insert(EmitterRuntime::new(factory.create(owner)));

        commands.spawn((
            Mesh2d(mesh),
            MeshMaterial2d(material),
            Transform::from_xyz(0.0, 0.0, depth),
            Visibility::Hidden,
            EmitterMeshEntity { owner },
        ));
    }
}

pub fn process_emitters(
    mut commands: Commands,
    mut query: Query<(Entity, &mut EmitterRuntime, Option<&GlobalTransform>)>,
) {
    for (owner, mut runtime, transform) in query.iter_mut() {
        if runtime.paused {
            continue;
        }

        let position = transform.map_or(Vec2::ZERO, |t| t.translation().truncate());
        runtime.emitter_mut().process(position);

        if runtime.emitter().is_destroyed() {
            debug!("Particle emitter on {owner} is exhausted");
            commands
                .entity(owner)
                .remove::<(EmitterRuntime, ParticleEmitter)>();
        }
    }
}

pub fn sync_emitter_meshes(
    runtimes: Query<&EmitterRuntime>,
    mut mesh_entities: Query<(&EmitterMeshEntity, &Mesh2d, &mut Visibility)>,
    mut buffers: ResMut<ParticleDrawBuffers>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let batch = &mut buffers.batch;
    for (emitter_mesh, mesh, mut visibility) in mesh_entities.iter_mut() {
        let Ok(runtime) = runtimes.get(emitter_mesh.owner) else {
            continue;
        };

        batch.clear();
        runtime.emitter().draw(batch);

        if batch.is_empty() {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        }

        visibility.set_if_neq(Visibility::Inherited);
        if let Some(target) = meshes.get_mut(&mesh.0) {
            *target = batch.to_mesh();
        }
    }
}

pub fn cleanup_orphaned_meshes(
    mut commands: Commands,
    mesh_entities: Query<(Entity, &EmitterMeshEntity)>,
    runtimes: Query<(), With<EmitterRuntime>>,
) {
    for (mesh_entity, emitter_mesh) in mesh_entities.iter() {
        if runtimes.get(emitter_mesh.owner).is_err() {
            commands.entity(mesh_entity).despawn();
        }
    }
}
