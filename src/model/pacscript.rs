use std::collections::HashMap;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::document::Document;
use crate::parser;
use crate::parser::errors::ParseError;

/// The digest value that marks a source entry as unchecked.
pub const SKIP_SUM: &str = "SKIP";

/// The supported sum algorithms. Each maps to a `<kind>sums[_<arch>]` array
/// in the pacscript; the set lives here rather than being scattered through
/// the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum HashKind {
    Sha256,
    Sha512,
    B2,
    Md5,
}

/// One element of a source array: an optional explicit download name, the
/// fetch URL, and the expected digest per algorithm at this entry's position.
///
/// A raw entry is `[name::]url`, with a trailing `::repology` changelog
/// marker tolerated and ignored. The URL may still be a dynamic expression;
/// resolving it is [`parser::eval`]'s job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceEntry {
    pub dest: Option<String>,
    pub url: String,
    pub sums: HashMap<HashKind, Option<String>>,
}

impl SourceEntry {
    /// Split a raw source element on the `::` delimiter.
    pub fn parse(raw: &str) -> Self {
        let split: Vec<&str> = raw.split("::").collect();

        let (dest, url) = match split.len() {
            1 => (None, split[0]),
            2 if split[0].contains("://") || split[1] == "repology" => (None, split[0]),
            2 => (Some(split[0]), split[1]),
            _ => (Some(split[0]), split[1]),
        };

        Self {
            dest: dest.map(ToOwned::to_owned),
            url: url.to_owned(),
            sums: HashMap::new(),
        }
    }

    /// The local file name the artifact downloads to: the explicit name when
    /// one was declared, the URL basename otherwise.
    pub fn file_name(&self) -> &str {
        if let Some(dest) = &self.dest {
            return dest;
        }

        let trimmed = self
            .url
            .find(['#', '?'])
            .map_or(self.url.as_str(), |index| &self.url[..index]);

        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// The expected digest for `kind`, or [`None`] when the sum array is
    /// absent or holds the skip sentinel at this position.
    pub fn sum(&self, kind: HashKind) -> Option<&str> {
        self.sums.get(&kind).and_then(Option::as_deref)
    }
}

/// The typed fields Pacup needs from one pacscript: identity, current
/// version, declared architectures, repology filter lines, and the per-arch
/// source lists with their digests bound positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacscript {
    pub pkgname: String,
    pub pkgver: String,
    pub arch: Vec<String>,
    pub repology: Vec<String>,
    sources: HashMap<String, Vec<SourceEntry>>,
}

impl Pacscript {
    /// Extract the typed view from a document.
    ///
    /// # Errors
    ///
    /// * [`ParseError::MissingField`] when `pkgname` or `pkgver` is absent.
    /// * [`ParseError::UnterminatedArray`] from any malformed array.
    /// * [`ParseError::SumCountMismatch`] when a declared sum array does not
    ///   line up with its source array.
    pub fn from_document(doc: &Document) -> Result<Self, ParseError> {
        let pkgname = parser::scalar(doc, "pkgname").ok_or_else(|| ParseError::MissingField {
            field: "pkgname".into(),
        })?;
        let pkgver = parser::scalar(doc, "pkgver").ok_or_else(|| ParseError::MissingField {
            field: "pkgver".into(),
        })?;

        let arch = parser::array(doc, "arch")?
            .map(|array| array.values())
            .unwrap_or_else(|| vec!["any".into()]);
        let repology = parser::array(doc, "repology")?
            .map(|array| array.values())
            .unwrap_or_default();

        let mut sources = HashMap::new();
        for arch_name in &arch {
            sources.insert(arch_name.clone(), Self::entries_for(doc, arch_name)?);
        }

        Ok(Self {
            pkgname,
            pkgver,
            arch,
            repology,
            sources,
        })
    }

    /// The source entries bound to one architecture, empty when the
    /// pacscript declares no sources for it.
    pub fn sources_for(&self, arch: &str) -> &[SourceEntry] {
        self.sources.get(arch).map_or(&[], Vec::as_slice)
    }

    fn entries_for(doc: &Document, arch: &str) -> Result<Vec<SourceEntry>, ParseError> {
        let source = parser::arch_array(doc, "source", arch)?;
        let Some(source) = source else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<SourceEntry> = source
            .entries
            .iter()
            .map(|entry| SourceEntry::parse(&entry.value))
            .collect();

        for kind in HashKind::iter() {
            let Some(sums) = parser::sum_array(doc, kind, arch)? else {
                continue;
            };

            if sums.len() != entries.len() {
                return Err(ParseError::SumCountMismatch {
                    sums: sums.field.clone(),
                    source: source.field.clone(),
                    found: sums.len(),
                    expected: entries.len(),
                });
            }

            for (entry, digest) in entries.iter_mut().zip(sums.values()) {
                let digest = if digest == SKIP_SUM { None } else { Some(digest) };
                entry.sums.insert(kind, digest);
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const POTATO: &str = r#"pkgname="potato"
pkgver="1.0.0"
arch=('amd64' 'arm64')
repology=("project: potato" "repo: ubuntu_22_04")
source=(
	"https://potato.com/${pkgver}.tar.gz"
	"potato.conf::https://potato.com/potato.conf"
)
source_arm64=("https://potato.com/${pkgver}-arm64.tar.gz")
sha256sums=(
	'8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4'
	'SKIP'
)
sha256sums_arm64=('ab5df625bc76dbd4e163bed2dd888df828f90159bb93556525c31821b6541d46')
"#;

    #[rstest]
    fn extracts_the_typed_view() {
        let doc = Document::new("potato.pacscript", POTATO);
        let pacscript = Pacscript::from_document(&doc).unwrap();

        assert_eq!(pacscript.pkgname, "potato");
        assert_eq!(pacscript.pkgver, "1.0.0");
        assert_eq!(pacscript.arch, vec!["amd64", "arm64"]);
        assert_eq!(
            pacscript.repology,
            vec!["project: potato", "repo: ubuntu_22_04"]
        );
    }

    #[rstest]
    fn binds_sums_positionally_with_skip_sentinel() {
        let doc = Document::new("potato.pacscript", POTATO);
        let pacscript = Pacscript::from_document(&doc).unwrap();
        let amd64 = pacscript.sources_for("amd64");

        assert_eq!(amd64.len(), 2);
        assert_eq!(
            amd64[0].sum(HashKind::Sha256),
            Some("8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4")
        );
        assert_eq!(amd64[1].sum(HashKind::Sha256), None);
        assert_eq!(amd64[1].dest.as_deref(), Some("potato.conf"));
    }

    #[rstest]
    fn arch_qualified_sources_override_the_base() {
        let doc = Document::new("potato.pacscript", POTATO);
        let pacscript = Pacscript::from_document(&doc).unwrap();
        let arm64 = pacscript.sources_for("arm64");

        assert_eq!(arm64.len(), 1);
        assert_eq!(arm64[0].url, "https://potato.com/${pkgver}-arm64.tar.gz");
        assert_eq!(
            arm64[0].sum(HashKind::Sha256),
            Some("ab5df625bc76dbd4e163bed2dd888df828f90159bb93556525c31821b6541d46")
        );
    }

    #[rstest]
    fn base_sources_apply_when_no_qualified_array_exists() {
        let doc = Document::new(
            "x.pacscript",
            "pkgname=\"x\"\npkgver=\"1.0\"\narch=('amd64')\nsource=(\"https://x/y.tar.gz\")\n",
        );
        let pacscript = Pacscript::from_document(&doc).unwrap();
        assert_eq!(pacscript.sources_for("amd64")[0].url, "https://x/y.tar.gz");
    }

    #[rstest]
    fn sum_count_mismatch_is_fatal() {
        let doc = Document::new(
            "x.pacscript",
            "pkgname=\"x\"\npkgver=\"1.0\"\nsource=(\"a\" \"b\")\nsha256sums=('aaaa')\n",
        );
        let error = Pacscript::from_document(&doc).unwrap_err();
        assert!(matches!(error, ParseError::SumCountMismatch { found: 1, expected: 2, .. }));
    }

    #[rstest]
    fn missing_pkgver_is_fatal() {
        let doc = Document::new("x.pacscript", "pkgname=\"x\"\n");
        let error = Pacscript::from_document(&doc).unwrap_err();
        assert_eq!(
            error,
            ParseError::MissingField {
                field: "pkgver".into(),
            }
        );
    }

    #[rstest]
    #[case("https://potato.com/potato-1.0.tar.gz", None, "potato-1.0.tar.gz")]
    #[case("renamed.tar.gz::https://potato.com/x.tar.gz", Some("renamed.tar.gz"), "renamed.tar.gz")]
    #[case("https://potato.com/x.tar.gz::repology", None, "x.tar.gz")]
    #[case("name::https://potato.com/x.tar.gz::repology", Some("name"), "name")]
    #[case("https://potato.com/x.tar.gz?ref=main", None, "x.tar.gz")]
    fn source_entry_decomposition(
        #[case] raw: &str,
        #[case] dest: Option<&str>,
        #[case] file_name: &str,
    ) {
        let entry = SourceEntry::parse(raw);
        assert_eq!(entry.dest.as_deref(), dest);
        assert_eq!(entry.file_name(), file_name);
    }

    #[rstest]
    fn hash_kinds_render_their_field_names() {
        assert_eq!(HashKind::Sha256.to_string(), "sha256");
        assert_eq!(HashKind::B2.to_string(), "b2");
        assert_eq!("md5".parse::<HashKind>().unwrap(), HashKind::Md5);
    }
}
