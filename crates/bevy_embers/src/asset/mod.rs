mod point;
pub(crate) mod serde_helpers;
mod simple;
/// Asset format version tracking and compatibility validation.
pub mod versioning;

pub use point::PointEmitterConfig;
pub use simple::{AnimationConfig, FrameRect, SimpleEmitterConfig};

use std::{fmt, str::FromStr};

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use versioning::{VersionStatus, current_format_version};

/// Asset loader for [`ParticleSystemAsset`] files in RON format.
#[derive(Default, TypePath)]
pub struct ParticleSystemAssetLoader;

/// Errors that can occur when loading a [`ParticleSystemAsset`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ParticleSystemAssetLoaderError {
    /// An I/O error occurred while reading the asset file.
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid RON, or names an emitter type that does not exist.
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The asset file has an unknown format version, likely from a newer release.
    #[error("Unknown embers_version. You may need a newer version of bevy_embers.")]
    UnknownVersion,
    /// The asset file has a version that requires breaking changes to upgrade.
    #[error(
        "Asset version \"{found}\" is incompatible with current version \"{current}\". Manual migration is required."
    )]
    IncompatibleVersion {
        /// The version found in the asset file.
        found: String,
        /// The current format version.
        current: String,
    },
}

impl AssetLoader for ParticleSystemAssetLoader {
    type Asset = ParticleSystemAsset;
    type Settings = ();
    type Error = ParticleSystemAssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let mut asset = ron::de::from_bytes::<ParticleSystemAsset>(&bytes)?;

        match asset.try_upgrade_version() {
            VersionStatus::Current => {}
            VersionStatus::Outdated { found, current } => {
                let path = load_context.path();
                warn!(
                    "{path:?}: loaded asset with embers_version \"{found}\", current is \"{current}\""
                );
            }
            VersionStatus::Incompatible { found, current } => {
                return Err(ParticleSystemAssetLoaderError::IncompatibleVersion {
                    found,
                    current: current.to_string(),
                });
            }
            VersionStatus::Unknown => {
                return Err(ParticleSystemAssetLoaderError::UnknownVersion);
            }
        }

        Ok(asset)
    }

    fn extensions(&self) -> &[&str] {
        &["ron"]
    }
}

/// A type tag that does not name any emitter kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized particle system type: \"{0}\"")]
pub struct UnknownEmitterType(pub String);

/// The type tag selecting which emitter model a definition describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitterKind {
    /// Generation-batched animated sprites.
    Simple,
    /// Per-particle colored points.
    Point,
    /// Weather effects, provided by an externally registered factory.
    Weather,
    /// Water effects, provided by an externally registered factory.
    Water,
}

impl EmitterKind {
    /// The tag as written in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Point => "point",
            Self::Weather => "weather",
            Self::Water => "water",
        }
    }

    /// Whether factories of this kind come from outside this crate.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Weather | Self::Water)
    }
}

impl FromStr for EmitterKind {
    type Err = UnknownEmitterType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "simple" => Ok(Self::Simple),
            "point" => Ok(Self::Point),
            "weather" => Ok(Self::Weather),
            "water" => Ok(Self::Water),
            other => Err(UnknownEmitterType(other.to_string())),
        }
    }
}

impl fmt::Display for EmitterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declarative description of one emitter.
///
/// The variant is the emitter's type tag. Weather and water effects are owned by
/// other systems, so their configuration is kept as an untyped RON value and
/// handed to whichever builder is registered in
/// [`ExternalFactories`](crate::factory::ExternalFactories).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EmitterDefinition {
    /// A [`SimpleEmitterConfig`].
    Simple(SimpleEmitterConfig),
    /// A [`PointEmitterConfig`].
    Point(PointEmitterConfig),
    /// Weather configuration, interpreted by an external factory.
    Weather(ron::Value),
    /// Water configuration, interpreted by an external factory.
    Water(ron::Value),
}

impl EmitterDefinition {
    /// The type tag of this definition.
    pub fn kind(&self) -> EmitterKind {
        match self {
            Self::Simple(_) => EmitterKind::Simple,
            Self::Point(_) => EmitterKind::Point,
            Self::Weather(_) => EmitterKind::Weather,
            Self::Water(_) => EmitterKind::Water,
        }
    }

    /// Every image this definition needs before a factory can be built, without duplicates.
    pub fn image_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        if let Self::Simple(config) = self {
            for animation in &config.animations {
                if !paths.contains(&animation.image.as_str()) {
                    paths.push(&animation.image);
                }
            }
        }
        paths
    }
}

/// A particle effect asset, loadable from RON files.
///
/// Reference it from a [`ParticleEmitter`](crate::ParticleEmitter) component to attach
/// the effect to an entity.
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSystemAsset {
    embers_version: String,
    /// Display name for this effect.
    pub name: String,
    /// The emitter this effect instantiates.
    pub emitter: EmitterDefinition,
}

impl ParticleSystemAsset {
    /// Creates a new asset stamped with the current format version.
    pub fn new(name: impl Into<String>, emitter: EmitterDefinition) -> Self {
        Self {
            embers_version: current_format_version().to_string(),
            name: name.into(),
            emitter,
        }
    }

    /// The format version this asset was written with.
    pub fn embers_version(&self) -> &str {
        &self.embers_version
    }

    /// Validates this asset's `embers_version` against the current format version.
    ///
    /// Outdated but compatible versions are upgraded in place. Returns the status
    /// found before any upgrade so the caller can react to it.
    pub fn try_upgrade_version(&mut self) -> VersionStatus {
        let status = versioning::validate_version(&self.embers_version);
        if matches!(status, VersionStatus::Outdated { .. }) {
            self.embers_version = current_format_version().to_string();
        }
        status
    }
}
