use std::collections::HashMap;

use compact_str::{CompactString, ToCompactString};
use derive_more::Display;
use lazy_regex::regex_is_match;
use unicase::UniCase;

use crate::{QualifierError, codec};

/// A single `key=value` annotation of a package URL.
///
/// Keys are always lower case and match `^[A-Za-z.\-_][0-9A-Za-z.\-_]*$`.
/// Values have their first character lower-cased and are otherwise kept verbatim.
///
/// Renders as `key=value` with the value percent-encoded.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display("{key}={}", codec::encode_segment(value))]
pub struct Qualifier {
    key: CompactString,
    value: CompactString,
}

impl Qualifier {
    /// Validate and normalize a single pair.
    fn new(key: &str, value: &str) -> Result<Self, QualifierError> {
        if !is_valid_key(key) {
            return Err(QualifierError::InvalidKey {
                key: key.to_string(),
            });
        }

        Ok(Self {
            key: key.to_ascii_lowercase().into(),
            value: lowercase_first(value),
        })
    }

    /// The (lower case) key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The qualifiers of a package URL.
///
/// Qualifiers preserve the order in which they were provided, which matters
/// for callers inspecting freshly parsed input; rendering is always in
/// ascending key order so that output is deterministic.
///
/// Qualifiers with an empty value are semantically absent:
/// they are kept here so that type-specific rules can see them,
/// but are never rendered and are removed by [`Qualifiers::canonical`].
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, Display)]
#[display("{}", self.to_canonical_query())]
pub struct Qualifiers(Vec<Qualifier>);

impl Qualifiers {
    /// Build a qualifier set from ordered pairs.
    ///
    /// Keys are validated and lower-cased; only the first character of each value is lower-cased.
    /// A key that occurs twice (compared after lower-casing) is an error.
    ///
    /// ```
    /// # use packageurl::Qualifiers;
    /// let qualifiers = Qualifiers::from_pairs([("Arch", "i386"), ("distro", "Fedora-25")]).unwrap();
    /// assert_eq!(qualifiers.get("arch"), Some("i386"));
    /// assert_eq!(qualifiers.get("distro"), Some("fedora-25"));
    ///
    /// assert!(Qualifiers::from_pairs([("arch", "x86"), ("ARCH", "arm")]).is_err());
    /// assert!(Qualifiers::from_pairs([("1arch", "x86")]).is_err());
    /// ```
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, QualifierError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut qualifiers = Vec::<Qualifier>::new();
        for (key, value) in pairs {
            let qualifier = Qualifier::new(key.as_ref(), value.as_ref())?;
            if qualifiers.iter().any(|q| q.key == qualifier.key) {
                return Err(QualifierError::DuplicateKey {
                    key: qualifier.key.to_string(),
                });
            }
            qualifiers.push(qualifier);
        }
        Ok(Self(qualifiers))
    }

    /// Build a qualifier set from an unordered mapping.
    ///
    /// Keys are sorted (after lower-casing) before construction so that the
    /// result does not depend on the iteration order of the mapping.
    ///
    /// ```
    /// # use std::collections::HashMap;
    /// # use packageurl::Qualifiers;
    /// let map = HashMap::from([("os", "linux"), ("arch", "amd64")]);
    /// let qualifiers = Qualifiers::from_map(map).unwrap();
    /// let keys = qualifiers.iter().map(|q| q.key()).collect::<Vec<_>>();
    /// assert_eq!(keys, ["arch", "os"]);
    /// ```
    pub fn from_map<K, V>(map: impl IntoIterator<Item = (K, V)>) -> Result<Self, QualifierError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs = map.into_iter().collect::<Vec<_>>();
        pairs.sort_by_cached_key(|(key, _)| key.as_ref().to_ascii_lowercase());
        Self::from_pairs(pairs)
    }

    /// Convert to an unordered mapping of key to value.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|q| (q.key.to_string(), q.value.to_string()))
            .collect()
    }

    /// Look up the value for `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = UniCase::new(key);
        self.0
            .iter()
            .find(|q| UniCase::new(q.key.as_str()) == key)
            .map(|q| q.value.as_str())
    }

    /// Iterate over the qualifiers in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &Qualifier> {
        self.0.iter()
    }

    /// The number of stored qualifiers, including ones with empty values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no qualifiers are stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorted by key, without empty values.
    pub fn canonical(&self) -> Self {
        let mut qualifiers = self
            .0
            .iter()
            .filter(|q| !q.value.is_empty())
            .cloned()
            .collect::<Vec<_>>();
        qualifiers.sort_by(|a, b| a.key.cmp(&b.key));
        Self(qualifiers)
    }

    /// Render as a query string: `key=value` pairs joined by `&`,
    /// percent-encoded, sorted by key, with empty values omitted.
    ///
    /// ```
    /// # use packageurl::Qualifiers;
    /// let qualifiers = Qualifiers::from_pairs([
    ///     ("repository_url", "repo.spring.io/release"),
    ///     ("classifier", "sources"),
    ///     ("empty", ""),
    /// ]).unwrap();
    /// assert_eq!(
    ///     qualifiers.to_canonical_query(),
    ///     "classifier=sources&repository_url=repo.spring.io%2Frelease",
    /// );
    /// ```
    pub fn to_canonical_query(&self) -> String {
        self.canonical()
            .0
            .iter()
            .map(ToCompactString::to_compact_string)
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<'a> IntoIterator for &'a Qualifiers {
    type Item = &'a Qualifier;
    type IntoIter = std::slice::Iter<'a, Qualifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Keys are ASCII letters, digits, `.`, `-`, or `_`, and do not start with a digit.
fn is_valid_key(key: &str) -> bool {
    regex_is_match!(r"^[A-Za-z.\-_][0-9A-Za-z.\-_]*$", key)
}

/// Lower-case the first character of `value` and nothing else.
fn lowercase_first(value: &str) -> CompactString {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => CompactString::default(),
    }
}
