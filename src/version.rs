//! Debian-style package version ordering.
//!
//! Pacscripts ride on top of apt, so upstream versions are compared the way
//! `dpkg --compare-versions` does it: an optional numeric epoch, an upstream
//! part and an optional revision, with digit runs compared numerically and
//! `~` sorting before everything else (including the end of the string, which
//! is what makes `2.0.0~rc1` older than `2.0.0`).

use std::cmp::Ordering;
use std::fmt;

/// A version string decomposed into `[epoch:]upstream[-revision]`.
///
/// Parsing is total: any string yields a comparable version, matching dpkg's
/// behaviour of ordering even badly-formed versions deterministically.
///
/// # Examples
///
/// ```
/// use libpacup::version::PkgVersion;
///
/// assert!(PkgVersion::new("1.10.0") > PkgVersion::new("1.2.0"));
/// assert!(PkgVersion::new("2.0.0~rc1") < PkgVersion::new("2.0.0"));
/// ```
#[derive(Debug, Clone)]
pub struct PkgVersion {
    epoch: u64,
    upstream: String,
    revision: String,
}

impl PkgVersion {
    pub fn new(version: &str) -> Self {
        let (epoch, rest) = match version.split_once(':') {
            Some((epoch, rest))
                if !epoch.is_empty() && epoch.bytes().all(|b| b.is_ascii_digit()) =>
            {
                (epoch.parse().unwrap_or(0), rest)
            },
            _ => (0, version),
        };

        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((upstream, revision)) => (upstream.to_owned(), revision.to_owned()),
            None => (rest.to_owned(), String::new()),
        };

        Self {
            epoch,
            upstream,
            revision,
        }
    }

    /// Whether `candidate` is strictly newer than `current`.
    pub fn is_newer(candidate: &str, current: &str) -> bool {
        Self::new(candidate) > Self::new(current)
    }
}

impl fmt::Display for PkgVersion {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(fmt, "{}:", self.epoch)?;
        }
        fmt.write_str(&self.upstream)?;
        if !self.revision.is_empty() {
            write!(fmt, "-{}", self.revision)?;
        }
        Ok(())
    }
}

impl PartialEq for PkgVersion {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for PkgVersion {}

impl PartialOrd for PkgVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for PkgVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| verrevcmp(self.upstream.as_bytes(), other.upstream.as_bytes()))
            .then_with(|| verrevcmp(self.revision.as_bytes(), other.revision.as_bytes()))
    }
}

/// Sort weight of one byte inside a non-digit run. `~` sorts before the end
/// of the string, letters before every other non-digit.
fn char_order(byte: u8) -> i32 {
    match byte {
        b'~' => -1,
        byte if byte.is_ascii_alphabetic() => i32::from(byte),
        byte => i32::from(byte) + 256,
    }
}

/// dpkg's `verrevcmp` over one version part: alternate non-digit and digit
/// runs, comparing the former bytewise via [`char_order`] and the latter
/// numerically with leading zeros stripped.
fn verrevcmp(a: &[u8], b: &[u8]) -> Ordering {
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        while (i < a.len() && !a[i].is_ascii_digit()) || (j < b.len() && !b[j].is_ascii_digit()) {
            let left = if i < a.len() && !a[i].is_ascii_digit() {
                char_order(a[i])
            } else {
                0
            };
            let right = if j < b.len() && !b[j].is_ascii_digit() {
                char_order(b[j])
            } else {
                0
            };

            if left != right {
                return left.cmp(&right);
            }
            i += 1;
            j += 1;
        }

        while i < a.len() && a[i] == b'0' {
            i += 1;
        }
        while j < b.len() && b[j] == b'0' {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while i < a.len() && a[i].is_ascii_digit() && j < b.len() && b[j].is_ascii_digit() {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }

        // The longer digit run is the larger number.
        if i < a.len() && a[i].is_ascii_digit() {
            return Ordering::Greater;
        }
        if j < b.len() && b[j].is_ascii_digit() {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}
