//! Volume claim builders and the validated storage size type.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use stackforge_common::error::{Result, StackforgeError};
use stackforge_common::naming::{self, Labels};
use stackforge_common::types::DependencyKind;

use crate::resources::{
    AccessMode, ClaimSpec, ObjectMeta, PersistentVolumeClaim, StorageRequest, StorageRequirements,
};

/// A storage request such as `10Gi`: an integer followed by `Mi`, `Gi`
/// or `Ti`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StorageSize(String);

impl StorageSize {
    /// The size as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StorageSize {
    type Err = StackforgeError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_suffix("Gi")
            .or_else(|| s.strip_suffix("Mi"))
            .or_else(|| s.strip_suffix("Ti"));
        match digits {
            Some(d) if !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(Self(s.to_string()))
            }
            _ => Err(StackforgeError::config(format!(
                "invalid storage size \"{s}\" (expected an integer followed by Gi, Mi or Ti)"
            ))),
        }
    }
}

impl fmt::Display for StorageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The default storage size of a dependency's claim.
///
/// # Errors
///
/// Fails only if the per-kind default is malformed.
pub fn default_size(kind: DependencyKind) -> Result<StorageSize> {
    kind.storage_size().parse()
}

fn claim(
    name: String,
    labels: Labels,
    access_mode: AccessMode,
    size: StorageSize,
    storage_class: Option<&str>,
) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        api_version: "v1",
        kind: "PersistentVolumeClaim",
        metadata: ObjectMeta::new(name, labels),
        spec: ClaimSpec {
            access_modes: vec![access_mode],
            resources: StorageRequirements {
                requests: StorageRequest { storage: size },
            },
            storage_class_name: storage_class.map(String::from),
        },
    }
}

/// Single-writer claim backing one dependency's data directory.
#[must_use]
pub fn dependency_claim(
    project: &str,
    kind: DependencyKind,
    size: StorageSize,
    storage_class: Option<&str>,
) -> PersistentVolumeClaim {
    claim(
        naming::claim_name(kind),
        naming::dependency_labels(project, kind),
        AccessMode::ReadWriteOnce,
        size,
        storage_class,
    )
}

/// Claim mountable read-write by many pods, named `<name>-shared-pvc`.
#[must_use]
pub fn shared_claim(
    project: &str,
    name: &str,
    size: StorageSize,
    storage_class: Option<&str>,
) -> PersistentVolumeClaim {
    claim(
        format!("{name}-shared-pvc"),
        naming::base_labels(project),
        AccessMode::ReadWriteMany,
        size,
        storage_class,
    )
}

/// Checks a claim for structural problems.
///
/// # Errors
///
/// Returns [`StackforgeError::Config`] if the claim has no access mode.
pub fn validate(claim: &PersistentVolumeClaim) -> Result<()> {
    if claim.spec.access_modes.is_empty() {
        return Err(StackforgeError::config(format!(
            "volume claim \"{}\" must have at least one access mode",
            claim.metadata.name
        )));
    }
    Ok(())
}
