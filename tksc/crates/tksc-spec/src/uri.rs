//! Versioned URI handling.
//!
//! Spec URIs end in a version segment: a single integer (`/0/`), a semver
//! triple (`/0.0.1/`), or `/latest/`. Conversion edges are keyed by the
//! version-stripped base so an edge registered for `/0/` serves requests
//! for `/0.0.1/`; spec lookup falls back from the exact URI through
//! progressively looser versions to the newest registration.

use std::fmt;

/// A parsed version segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses `0`, `1.2`, or `1.2.3`; missing fields are zero.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Splits a URI into its version-stripped base and version segment.
///
/// `https://a/rgb/0.0.1/` → base `https://a/rgb`, `Some(0.0.1)`;
/// `/latest/` yields `None` for the version; a URI with no recognizable
/// version segment is returned whole.
pub fn split_version(uri: &str) -> (String, Option<Version>, bool) {
    let trimmed = uri.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((base, last)) if last.eq_ignore_ascii_case("latest") => {
            (base.to_string(), None, true)
        }
        Some((base, last)) => match Version::parse(last) {
            Some(version) => (base.to_string(), Some(version), false),
            None => (trimmed.to_string(), None, false),
        },
        None => (trimmed.to_string(), None, false),
    }
}

/// The version-stripped key used by the conversion graph.
pub fn base_of(uri: &str) -> String {
    split_version(uri).0
}

/// Resolves a requested URI against the registered keys.
///
/// Tries, in order: the exact URI, the patch-stripped form, the
/// minor-stripped form, then `latest` (the highest version registered for
/// the same base).
pub fn resolve<'a, I>(registered: I, requested: &str) -> Option<String>
where
    I: Iterator<Item = &'a String> + Clone,
{
    let normalize = |u: &str| u.trim_end_matches('/').to_string();
    let requested_norm = normalize(requested);

    if registered.clone().any(|k| normalize(k) == requested_norm) {
        return Some(requested_norm);
    }

    let (base, version, latest) = split_version(requested);

    if !latest {
        if let Some(version) = version {
            for candidate in [
                format!("{base}/{}.{}", version.major, version.minor),
                format!("{base}/{}", version.major),
            ] {
                if let Some(found) = registered.clone().find(|k| normalize(k) == candidate) {
                    return Some(normalize(found));
                }
            }
        }
    }

    // Highest registered version sharing the base.
    registered
        .filter_map(|k| {
            let (kbase, kversion, _) = split_version(k);
            if kbase == base {
                Some((kversion.unwrap_or(Version::new(0, 0, 0)), normalize(k)))
            } else {
                None
            }
        })
        .max_by_key(|(version, _)| *version)
        .map(|(_, key)| key)
}
