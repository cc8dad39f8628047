use std::collections::HashMap;

use bevy::{asset::LoadState, prelude::*};
use thiserror::Error;

use crate::asset::{AnimationConfig, FrameRect};

/// A resolved texture together with its pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasTexture {
    /// Handle used when the batch is drawn.
    pub handle: Handle<Image>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Errors raised while resolving a texture for an animation.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureError {
    /// The image failed to load or does not exist.
    #[error("Texture \"{0}\" could not be loaded")]
    Missing(String),
    /// The image is still loading.
    #[error("Texture \"{0}\" has not finished loading")]
    NotLoaded(String),
    /// The image has a zero width or height.
    #[error("Texture \"{0}\" has no pixels")]
    Empty(String),
}

/// Resolves image paths from configuration into loaded textures.
pub trait TextureSource {
    /// Returns the texture stored at `path`.
    fn resolve(&self, path: &str) -> Result<AtlasTexture, TextureError>;
}

impl TextureSource for HashMap<String, AtlasTexture> {
    fn resolve(&self, path: &str) -> Result<AtlasTexture, TextureError> {
        self.get(path)
            .cloned()
            .ok_or_else(|| TextureError::Missing(path.to_string()))
    }
}

/// [`TextureSource`] backed by the asset server.
///
/// Only reports textures that already finished loading; callers are expected to
/// keep the image handles alive until then.
pub struct LoadedTextures<'a> {
    server: &'a AssetServer,
    images: &'a Assets<Image>,
}

impl<'a> LoadedTextures<'a> {
    /// Wraps the asset server and image storage.
    pub fn new(server: &'a AssetServer, images: &'a Assets<Image>) -> Self {
        Self { server, images }
    }
}

impl TextureSource for LoadedTextures<'_> {
    fn resolve(&self, path: &str) -> Result<AtlasTexture, TextureError> {
        let handle: Handle<Image> = self.server.load(path.to_string());
        match self.images.get(&handle) {
            Some(image) => Ok(AtlasTexture {
                width: image.width(),
                height: image.height(),
                handle,
            }),
            None => match self.server.load_state(&handle) {
                LoadState::Failed(_) => Err(TextureError::Missing(path.to_string())),
                _ => Err(TextureError::NotLoaded(path.to_string())),
            },
        }
    }
}

/// Texture coordinates of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameArea {
    /// Left texture coordinate.
    pub u1: f32,
    /// Top texture coordinate.
    pub v1: f32,
    /// Right texture coordinate.
    pub u2: f32,
    /// Bottom texture coordinate.
    pub v2: f32,
}

/// A sprite-sheet region cut into timed frames.
///
/// Built once per factory and shared read-only by every particle that uses it.
#[derive(Debug, Clone)]
pub struct ParticleAnimation {
    id: String,
    texture: Handle<Image>,
    frames: Vec<FrameArea>,
    duration: u64,
    width: f32,
    height: f32,
}

impl ParticleAnimation {
    /// Cuts the frames described by `config` out of its texture.
    pub fn new(config: &AnimationConfig, textures: &dyn TextureSource) -> Result<Self, TextureError> {
        let texture = textures.resolve(&config.image)?;
        if texture.width == 0 || texture.height == 0 {
            return Err(TextureError::Empty(config.image.clone()));
        }

        let base = config.rect.unwrap_or_else(|| {
            FrameRect::new(
                config.x,
                config.y,
                config.w.unwrap_or(texture.width as i32),
                config.h.unwrap_or(texture.height as i32),
            )
        });

        let frame_count = config.frames.max(1);
        let per_row = config.frames_per_row.filter(|n| *n > 0);
        let texture_width = texture.width as f32;
        let texture_height = texture.height as f32;

        let mut frames = Vec::with_capacity(frame_count as usize);
        let (mut row, mut col) = (0, 0);
        for _ in 0..frame_count {
            let area = FrameRect::new(
                base.x + col * (base.w + config.pad),
                base.y + row * (base.h + config.pad),
                base.w,
                base.h,
            );
            frames.push(FrameArea {
                u1: area.x as f32 / texture_width,
                v1: area.y as f32 / texture_height,
                u2: area.x2() as f32 / texture_width,
                v2: area.y2() as f32 / texture_height,
            });

            col += 1;
            if per_row == Some(col as u32) {
                col = 0;
                row += 1;
            }
        }

        Ok(Self {
            id: config.id.clone(),
            texture: texture.handle,
            frames,
            duration: config.duration.max(1) as u64,
            width: (base.w * 2) as f32,
            height: (base.h * 2) as f32,
        })
    }

    /// The frame shown `t` ticks after a particle spawned. Holds the last frame once
    /// the animation has run out.
    pub fn frame(&self, t: u64) -> &FrameArea {
        let index = (t / self.duration).min(self.frames.len() as u64 - 1);
        &self.frames[index as usize]
    }

    /// All frames, in playback order.
    pub fn frames(&self) -> &[FrameArea] {
        &self.frames
    }

    /// Ticks the whole animation takes before freezing on its last frame.
    pub fn total_duration(&self) -> u64 {
        self.duration * self.frames.len() as u64
    }

    /// On-screen width, twice the source width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// On-screen height, twice the source height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The sprite-sheet texture.
    pub fn texture(&self) -> &Handle<Image> {
        &self.texture
    }

    /// Identifier from the configuration.
    pub fn id(&self) -> &str {
        &self.id
    }
}
