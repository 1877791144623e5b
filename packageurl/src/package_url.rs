use std::{borrow::Cow, str::FromStr};

use bon::Builder;
use compact_str::CompactString;
use documented::Documented;
use duplicate::duplicate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{ObjectBuilder, Type},
};

use crate::{KnownType, ParseError, Qualifiers, ValidationError, codec, known_type};

/// `PackageUrl` identifies a software package across packaging ecosystems.
///
/// Its canonical string form is:
/// ```ignore
/// pkg:{type}/{namespace}/{name}@{version}?{qualifiers}#{subpath}
/// ```
///
/// With the caveat that:
/// - `namespace`, `version`, `qualifiers`, and `subpath` are optional;
///   when absent, they and their separator are omitted.
/// - `namespace` and `subpath` may contain several `/`-separated segments.
/// - Every component is percent-encoded; `/` is only left unescaped
///   where it separates segments.
///
/// ## Guarantees
///
/// A `PackageUrl` returned by [`PackageUrl::parse`] or [`PackageUrl::normalize`]
/// is valid and canonical: its type is lower case, its type-specific
/// adjustments have been applied, its qualifiers are sorted with no empty
/// values, and rendering it then parsing the result yields an equal value.
///
/// A `PackageUrl` built with [`PackageUrl::builder`] holds exactly what the
/// caller provided; call [`PackageUrl::normalize`] before relying on it.
/// Rendering never validates: it trusts the record it was given.
///
/// This type says nothing about whether the package actually exists.
///
/// ## Examples
///
/// ```
/// # use packageurl::PackageUrl;
/// let purl = PackageUrl::parse("pkg:npm/%40angular/animation@12.3.1").unwrap();
/// assert_eq!(purl.package_type(), "npm");
/// assert_eq!(purl.namespace(), Some("@angular"));
/// assert_eq!(purl.name(), "animation");
/// assert_eq!(purl.version(), Some("12.3.1"));
/// assert_eq!(purl.to_string(), "pkg:npm/%40angular/animation@12.3.1");
///
/// let purl = PackageUrl::builder()
///     .package_type("deb")
///     .name("ab/c")
///     .build();
/// assert_eq!(purl.to_string(), "pkg:deb/ab%2Fc");
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug, Builder, Documented)]
pub struct PackageUrl {
    /// The ecosystem of the package, such as `npm` or `deb`.
    ///
    /// Selects which type-specific rules apply.
    #[builder(into)]
    package_type: CompactString,

    /// A hierarchical scope for the name, such as a Maven group ID
    /// or an NPM scope.
    #[builder(into)]
    namespace: Option<CompactString>,

    /// The name of the package.
    #[builder(into)]
    name: CompactString,

    /// The version of the package, treated as an opaque token.
    #[builder(into)]
    version: Option<CompactString>,

    /// Extra data such as an OS, architecture, or distribution.
    #[builder(default)]
    qualifiers: Qualifiers,

    /// A path within the package, relative to its root.
    #[builder(into)]
    subpath: Option<CompactString>,
}

impl PackageUrl {
    /// Parse and normalize a package URL from a string.
    ///
    /// The input is split left to right:
    /// - The scheme must be exactly `pkg`. Leading slashes after it are ignored,
    ///   so `pkg://npm/lodash` and `pkg:/npm/lodash` read the same as `pkg:npm/lodash`.
    /// - Everything after the first `#` is the subpath, and everything between
    ///   the first `?` and the subpath is the qualifiers.
    /// - The type runs up to the first `/`.
    /// - The name (and optional `@version`) follows the last `/`,
    ///   splitting on the last `@`; anything between the type and the name is the namespace.
    ///
    /// Each component is then percent-decoded and the result is passed through
    /// [`PackageUrl::normalize`]. Either a fully valid, canonical value is returned
    /// or an error describing the first problem found.
    ///
    /// ```
    /// # use packageurl::{ErrorKind, PackageUrl};
    /// let purl = PackageUrl::parse("pkg:pypi/My_Pkg@1.0").unwrap();
    /// assert_eq!(purl.name(), "my-pkg");
    ///
    /// let err = PackageUrl::parse("pkg:cran/caret").unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::InvalidStructure);
    /// ```
    pub fn parse(input: impl AsRef<str>) -> Result<Self, ParseError> {
        crate::parse::parse(input.as_ref())
    }

    /// The type, such as `npm`.
    pub fn package_type(&self) -> &str {
        &self.package_type
    }

    /// The catalogued type, if the type is one this library has rules for.
    pub fn known_type(&self) -> Option<KnownType> {
        KnownType::from_str(&self.package_type).ok()
    }

    /// The namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The qualifiers.
    pub fn qualifiers(&self) -> &Qualifiers {
        &self.qualifiers
    }

    /// The subpath, if any.
    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    /// Validate and canonicalize this package URL.
    ///
    /// In order:
    /// 1. The type is checked against `[A-Za-z0-9.+-]+` and lower-cased.
    /// 2. Empty segments are removed from the namespace and subpath;
    ///    if nothing remains, the component is absent. Empty versions are absent.
    /// 3. The name must be non-empty.
    /// 4. The subpath must not contain `..`, nor `.` other than as a leading segment.
    /// 5. Type-specific adjustments are applied to the namespace, name, and version.
    /// 6. Type-specific mandatory field rules are checked.
    /// 7. Qualifiers are sorted by key and empty values are dropped.
    ///
    /// Normalizing an already normalized value returns it unchanged.
    ///
    /// ```
    /// # use packageurl::PackageUrl;
    /// let purl = PackageUrl::builder()
    ///     .package_type("PyPI")
    ///     .name("Django_Allauth")
    ///     .version("0.61.1")
    ///     .build()
    ///     .normalize()
    ///     .unwrap();
    /// assert_eq!(purl.to_string(), "pkg:pypi/django-allauth@0.61.1");
    /// ```
    #[tracing::instrument]
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let package_type = normalize_type(&self.package_type)?;
        let namespace = self.namespace.as_deref().and_then(join_segments);
        let version = self.version.filter(|v| !v.is_empty());
        let subpath = self.subpath.as_deref().and_then(join_segments);

        if self.name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if let Some(subpath) = &subpath {
            check_subpath(subpath)?;
        }

        let known = KnownType::from_str(&package_type).ok();
        if known.is_none() {
            tracing::debug!(%package_type, "no catalogued rules for type");
        }

        let qualifiers = self.qualifiers;
        let namespace = namespace.map(|ns| {
            known_type::adjust(known.and_then(|k| k.namespace_adjustment()), ns, &qualifiers)
        });
        let name = known_type::adjust(known.and_then(|k| k.name_adjustment()), self.name, &qualifiers);
        let version = version.map(|v| {
            known_type::adjust(known.and_then(|k| k.version_adjustment()), v, &qualifiers)
        });

        if let Some(requirement) = known.and_then(|k| k.requirement()) {
            requirement.check(
                &package_type,
                namespace.as_deref(),
                version.as_deref(),
                &qualifiers,
            )?;
        }

        Ok(Self {
            package_type,
            namespace,
            name,
            version,
            qualifiers: qualifiers.canonical(),
            subpath,
        })
    }
}

/// Validate a type and lower-case it.
fn normalize_type(package_type: &str) -> Result<CompactString, ValidationError> {
    let valid = !package_type.is_empty()
        && package_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'));
    if !valid {
        return Err(ValidationError::InvalidType {
            package_type: package_type.to_string(),
        });
    }

    Ok(package_type.to_ascii_lowercase().into())
}

/// Rejoin the non-empty `/`-separated segments of `path`, if there are any.
fn join_segments(path: &str) -> Option<CompactString> {
    let joined = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    (!joined.is_empty()).then(|| joined.into())
}

/// Subpaths may not traverse upwards: `..` is never allowed,
/// and `.` is only allowed as a leading prefix of a longer path.
fn check_subpath(subpath: &str) -> Result<(), ValidationError> {
    let segments = subpath.split('/').collect::<Vec<_>>();
    let offending = segments.iter().enumerate().find(|(index, segment)| match **segment {
        ".." => true,
        "." => *index > 0 || segments.len() == 1,
        _ => false,
    });

    match offending {
        Some((_, segment)) => Err(ValidationError::InvalidSubpathSegment {
            subpath: subpath.to_string(),
            segment: segment.to_string(),
        }),
        None => Ok(()),
    }
}

/// Renders the canonical string form.
///
/// The record is rendered as-is: no normalization or validation takes place.
impl std::fmt::Display for PackageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pkg:{}/", self.package_type)?;
        if let Some(namespace) = self.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            write!(f, "{}/", codec::encode_path(namespace))?;
        }
        write!(f, "{}", codec::encode_segment(&self.name))?;
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            write!(f, "@{}", codec::encode_segment(version))?;
        }

        let query = self.qualifiers.to_canonical_query();
        if !query.is_empty() {
            write!(f, "?{query}")?;
        }

        if let Some(subpath) = self.subpath.as_deref().filter(|s| !s.is_empty()) {
            write!(f, "#{}", codec::encode_path(subpath))?;
        }
        Ok(())
    }
}

impl FromStr for PackageUrl {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

duplicate! {
    [
        ty;
        [ &str ];
        [ &String ];
        [ String ];
    ]
    impl TryFrom<ty> for PackageUrl {
        type Error = ParseError;
        fn try_from(s: ty) -> Result<Self, Self::Error> {
            Self::parse(s)
        }
    }
}

impl Serialize for PackageUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PackageUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let input = String::deserialize(deserializer)?;
        Self::parse(&input).map_err(serde::de::Error::custom)
    }
}

impl PartialSchema for PackageUrl {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ObjectBuilder::new()
            .description(Some(Self::DOCS))
            .examples([
                json!("pkg:npm/%40angular/animation@12.3.1"),
                json!("pkg:deb/debian/curl@7.50.3-1?arch=i386&distro=jessie"),
                json!("pkg:golang/google.golang.org/genproto#googleapis/api/annotations"),
            ])
            .min_length(Some(6))
            .pattern(Some("^pkg:"))
            .schema_type(Type::String)
            .build()
            .into()
    }
}

impl ToSchema for PackageUrl {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("PackageUrl")
    }
}
