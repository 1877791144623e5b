//! Catalogued package URL types and their per-type rules.
//!
//! Each [`KnownType`] carries up to four pieces of data:
//! - an [`Adjustment`] for each of the namespace, name, and version components;
//! - a [`Requirement`] describing mandatory fields.
//!
//! A missing entry means "no special treatment". Types that aren't catalogued
//! at all get no special treatment on any axis: the package URL format is open
//! to ecosystems this library has never heard of.

use compact_str::CompactString;
use enum_assoc::Assoc;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Qualifiers, ValidationError};

/// Package URL types with catalogued rules.
///
/// ```
/// # use std::str::FromStr;
/// # use packageurl::{Adjustment, KnownType};
/// let pypi = KnownType::from_str("pypi").unwrap();
/// assert_eq!(pypi.name_adjustment(), Some(Adjustment::PypiName));
/// assert_eq!(pypi.namespace_adjustment(), None);
/// assert_eq!(KnownType::Deb.to_string(), "deb");
/// ```
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    Assoc,
)]
#[strum(serialize_all = "lowercase")]
#[func(const fn namespace_rule(&self) -> Option<Adjustment>)]
#[func(const fn name_rule(&self) -> Option<Adjustment>)]
#[func(const fn version_rule(&self) -> Option<Adjustment>)]
#[func(const fn mandatory(&self) -> Option<Requirement>)]
#[non_exhaustive]
pub enum KnownType {
    /// Arch Linux and other users of the libalpm/pacman package manager.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    #[assoc(name_rule = Adjustment::Lowercase)]
    Alpm,

    /// Alpine Linux packages.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    #[assoc(name_rule = Adjustment::Lowercase)]
    Apk,

    /// Bitbucket-hosted repositories.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    #[assoc(name_rule = Adjustment::Lowercase)]
    Bitbucket,

    /// Rust crates.
    Cargo,

    /// CocoaPods.
    Cocoapods,

    /// PHP Composer packages.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    #[assoc(name_rule = Adjustment::Lowercase)]
    Composer,

    /// Conan C/C++ packages.
    #[assoc(mandatory = Requirement::ConanChannel)]
    Conan,

    /// Conda packages.
    Conda,

    /// CRAN R packages.
    #[assoc(mandatory = Requirement::Version)]
    Cran,

    /// Debian, Debian derivatives, and Ubuntu packages.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    #[assoc(name_rule = Adjustment::Lowercase)]
    Deb,

    /// Docker images.
    Docker,

    /// RubyGems.
    Gem,

    /// Plain packages that do not fit anywhere else.
    Generic,

    /// GitHub-hosted repositories.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    #[assoc(name_rule = Adjustment::Lowercase)]
    Github,

    /// Go packages.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    #[assoc(name_rule = Adjustment::Lowercase)]
    Golang,

    /// Haskell packages.
    Hackage,

    /// Hex packages.
    Hex,

    /// Hugging Face ML models.
    #[assoc(version_rule = Adjustment::Lowercase)]
    Huggingface,

    /// Julia packages.
    Julia,

    /// Maven JARs and related artifacts.
    Maven,

    /// MLflow ML models.
    #[assoc(name_rule = Adjustment::MlflowName)]
    Mlflow,

    /// Node NPM packages.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    #[assoc(name_rule = Adjustment::Lowercase)]
    Npm,

    /// NuGet .NET packages.
    Nuget,

    /// OCI artifacts, including container images.
    Oci,

    /// Python packages.
    #[assoc(name_rule = Adjustment::PypiName)]
    Pypi,

    /// QNAP QPKG packages.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    Qpkg,

    /// RPMs.
    #[assoc(namespace_rule = Adjustment::Lowercase)]
    Rpm,

    /// ISO-IEC 19770-2 Software Identification (SWID) tags.
    Swid,

    /// Swift packages.
    #[assoc(mandatory = Requirement::NamespaceAndVersion)]
    Swift,
}

impl KnownType {
    /// The rewrite applied to the namespace, if any.
    pub const fn namespace_adjustment(&self) -> Option<Adjustment> {
        self.namespace_rule()
    }

    /// The rewrite applied to the name, if any.
    pub const fn name_adjustment(&self) -> Option<Adjustment> {
        self.name_rule()
    }

    /// The rewrite applied to the version, if any.
    pub const fn version_adjustment(&self) -> Option<Adjustment> {
        self.version_rule()
    }

    /// The mandatory-field rule checked after adjustment, if any.
    pub const fn requirement(&self) -> Option<Requirement> {
        self.mandatory()
    }
}

/// How a component of a package URL is rewritten for a given type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum Adjustment {
    /// Lower-case the whole component.
    Lowercase,

    /// Lower-case, then replace `_` with `-` (PyPI name normalization).
    PypiName,

    /// Lower-case only when the `repository_url` qualifier points at Databricks.
    ///
    /// Azure ML names are case sensitive, as are names from unrecognized hosts,
    /// and names with no `repository_url` at all: those are kept as-is.
    MlflowName,
}

impl Adjustment {
    /// Apply this adjustment to `value`.
    pub fn apply(self, value: &str, qualifiers: &Qualifiers) -> CompactString {
        match self {
            Adjustment::Lowercase => value.to_lowercase().into(),
            Adjustment::PypiName => value.to_lowercase().replace('_', "-").into(),
            Adjustment::MlflowName => match qualifiers.get("repository_url") {
                Some(repo) if repo.contains("azureml") => value.into(),
                Some(repo) if repo.contains("databricks") => value.to_lowercase().into(),
                _ => value.into(),
            },
        }
    }
}

/// Apply an optional adjustment, defaulting to the identity.
pub(crate) fn adjust(
    adjustment: Option<Adjustment>,
    value: CompactString,
    qualifiers: &Qualifiers,
) -> CompactString {
    match adjustment {
        Some(adjustment) => {
            let adjusted = adjustment.apply(&value, qualifiers);
            if adjusted != value {
                tracing::trace!(?adjustment, from = %value, to = %adjusted, "adjusted component");
            }
            adjusted
        }
        None => value,
    }
}

/// Mandatory-field rules for a type, checked after adjustment.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum Requirement {
    /// A namespace requires a non-empty `channel` qualifier,
    /// and a non-empty `channel` qualifier requires a namespace.
    ConanChannel,

    /// Both the namespace and the version must be present.
    NamespaceAndVersion,

    /// The version must be present.
    Version,
}

impl Requirement {
    /// Check the requirement against the given components.
    ///
    /// `qualifiers` should still include empty-valued entries,
    /// since some rules distinguish "empty" from "absent".
    pub fn check(
        self,
        package_type: &str,
        namespace: Option<&str>,
        version: Option<&str>,
        qualifiers: &Qualifiers,
    ) -> Result<(), ValidationError> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        let version = version.filter(|v| !v.is_empty());
        let invalid = |reason| {
            Err(ValidationError::InvalidStructure {
                package_type: package_type.to_string(),
                reason,
            })
        };

        match self {
            Requirement::ConanChannel => match (namespace, qualifiers.get("channel")) {
                (Some(_), None) => invalid("the 'channel' qualifier is required with a namespace"),
                (Some(_), Some("")) => invalid("the 'channel' qualifier must not be empty with a namespace"),
                (None, Some(channel)) if !channel.is_empty() => {
                    invalid("a namespace is required when the 'channel' qualifier is set")
                }
                _ => Ok(()),
            },
            Requirement::NamespaceAndVersion => match (namespace, version) {
                (None, _) => invalid("a namespace is required"),
                (_, None) => invalid("a version is required"),
                _ => Ok(()),
            },
            Requirement::Version => match version {
                None => invalid("a version is required"),
                Some(_) => Ok(()),
            },
        }
    }
}
