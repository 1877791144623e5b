//! Turns package URL strings into their raw components.

use compact_str::CompactString;
use nom::{
    Finish, IResult, Parser,
    bytes::complete::{take_till, take_while1},
    character::complete::char,
    combinator::{opt, rest},
    sequence::{preceded, terminated},
};

use crate::{PackageUrl, ParseError, Qualifiers, codec, error};

/// The structural pieces of a URL, before any decoding.
#[derive(Debug, Clone, Copy)]
struct Components<'a> {
    scheme: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

/// `nom` parser for the URL components.
///
/// The fragment starts at the first `#`; the query starts at the first `?` before that.
fn components(s: &str) -> IResult<&str, Components<'_>> {
    let (s, scheme) = terminated(take_while1(is_scheme_char), char(':')).parse(s)?;
    let (s, path) = take_till(|c: char| c == '?' || c == '#').parse(s)?;
    let (s, query) = opt(preceded(char('?'), take_till(|c: char| c == '#'))).parse(s)?;
    let (s, fragment) = opt(preceded(char('#'), rest)).parse(s)?;
    Ok((
        s,
        Components {
            scheme,
            path,
            query,
            fragment,
        },
    ))
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

/// Parse `input` into a normalized [`PackageUrl`].
#[tracing::instrument]
pub(crate) fn parse(input: &str) -> Result<PackageUrl, ParseError> {
    let parts = match components.parse_complete(input).finish() {
        Ok((_, parts)) if parts.scheme == "pkg" => parts,
        Ok((_, parts)) => {
            return Err(ParseError::InvalidScheme {
                input: input.into(),
                span: error::span(input, parts.scheme),
            });
        }
        Err(_) => {
            let scheme = input.split(':').next().unwrap_or_default();
            return Err(ParseError::InvalidScheme {
                input: input.into(),
                span: error::span(input, scheme),
            });
        }
    };

    // `pkg://type/...` and `pkg:/type/...` are read as if they were `pkg:type/...`.
    let path = parts.path.trim_start_matches('/');
    let Some((package_type, remainder)) = path.split_once('/') else {
        return Err(ParseError::MissingTypeOrName {
            input: input.into(),
            span: error::span(input, path),
        });
    };

    let qualifiers = parse_qualifiers(input, parts.query.unwrap_or_default())?;
    let (namespace, name, version) = parse_remainder(input, remainder)?;
    let subpath = match parts.fragment {
        Some(fragment) => Some(decode(input, "subpath", fragment)?),
        None => None,
    };

    PackageUrl::builder()
        .package_type(package_type.to_ascii_lowercase())
        .maybe_namespace(namespace)
        .name(name)
        .maybe_version(version)
        .qualifiers(qualifiers)
        .maybe_subpath(subpath)
        .build()
        .normalize()
        .map_err(|error| ParseError::Invalid {
            input: input.into(),
            error,
        })
}

/// Split the portion after the type into namespace, name, and version.
///
/// The name is whatever follows the last `/`, and the version whatever follows the last `@` in that.
/// The namespace is decoded as a whole, so an encoded `%2F` ends up as a literal `/` in it.
fn parse_remainder(
    input: &str,
    remainder: &str,
) -> Result<(Option<CompactString>, CompactString, Option<CompactString>), ParseError> {
    let (namespace, name_version) = match remainder.rsplit_once('/') {
        Some((namespace, name_version)) => (Some(namespace), name_version),
        None => (None, remainder),
    };
    let (name, version) = match name_version.rsplit_once('@') {
        Some((name, version)) => (name, Some(version)),
        None => (name_version, None),
    };

    let namespace = match namespace {
        Some(namespace) => Some(decode(input, "namespace", namespace)?),
        None => None,
    };
    let decoded_name = decode(input, "name", name)?;
    if decoded_name.is_empty() {
        return Err(ParseError::MissingName {
            input: input.into(),
            span: error::span(input, name_version),
        });
    }
    let version = match version {
        Some(version) => Some(decode(input, "version", version)?),
        None => None,
    };

    Ok((namespace, decoded_name, version))
}

/// Parse the raw query into qualifiers.
///
/// Pairs are separated by `&`; empty pairs are skipped.
/// A pair without `=` is a key with an empty value.
fn parse_qualifiers(input: &str, query: &str) -> Result<Qualifiers, ParseError> {
    let mut pairs = Vec::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(input, "qualifier key", key)?;
        let value = decode(input, "qualifier value", value)?;
        pairs.push((pair, key, value));
    }

    Qualifiers::from_pairs(pairs.iter().map(|(_, key, value)| (key, value))).map_err(|err| {
        let offending = pairs
            .iter()
            .filter(|(_, key, _)| key.eq_ignore_ascii_case(err.key()))
            .map(|(pair, _, _)| *pair)
            .last()
            .unwrap_or(query);
        error::qualifier!(input => offending, err)
    })
}

/// Percent-decode a component of `input`.
fn decode(input: &str, field: &'static str, fragment: &str) -> Result<CompactString, ParseError> {
    codec::decode_segment(fragment)
        .map(CompactString::from)
        .map_err(|err| error::escape!(input, field => fragment, err))
}
