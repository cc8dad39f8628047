use std::{cmp::Ordering, fmt};

/// A `major.minor` asset format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses `"major.minor"`. Anything else is `None`.
    pub fn parse(version: &str) -> Option<Self> {
        let (major, minor) = version.split_once('.')?;
        Some(Self::new(major.parse().ok()?, minor.parse().ok()?))
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// 0.2 added fixed_seed, legacy_angle_pi and point_size
const CURRENT: &str = "0.2";
const CURRENT_VERSION: FormatVersion = FormatVersion::new(0, 2);
// 0.0 stored signed lifetimes
const OLDEST_COMPATIBLE: FormatVersion = FormatVersion::new(0, 1);

/// The result of checking an asset's `embers_version` against the current format version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    /// The asset was written with the current format.
    Current,
    /// The asset is older but every change since then is backwards compatible.
    Outdated {
        /// The version found in the asset.
        found: String,
        /// The current format version.
        current: &'static str,
    },
    /// The asset predates a breaking format change.
    Incompatible {
        /// The version found in the asset.
        found: String,
        /// The current format version.
        current: &'static str,
    },
    /// The version string is malformed or newer than this crate.
    Unknown,
}

/// Returns the current asset format version string.
pub fn current_format_version() -> &'static str {
    CURRENT
}

/// Returns `true` if an asset written as `from` can be read as `to` without migration.
pub fn can_auto_upgrade(from: &str, to: &str) -> bool {
    let (Some(from), Some(to)) = (FormatVersion::parse(from), FormatVersion::parse(to)) else {
        return false;
    };
    from < to && from >= OLDEST_COMPATIBLE && to <= CURRENT_VERSION
}

/// Classifies `version` against the current format version.
pub fn validate_version(version: &str) -> VersionStatus {
    let Some(parsed) = FormatVersion::parse(version) else {
        return VersionStatus::Unknown;
    };
    match parsed.cmp(&CURRENT_VERSION) {
        Ordering::Equal => VersionStatus::Current,
        Ordering::Greater => VersionStatus::Unknown,
        Ordering::Less if parsed >= OLDEST_COMPATIBLE => VersionStatus::Outdated {
            found: version.to_string(),
            current: CURRENT,
        },
        Ordering::Less => VersionStatus::Incompatible {
            found: version.to_string(),
            current: CURRENT,
        },
    }
}
