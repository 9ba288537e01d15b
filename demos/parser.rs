use libpacup::document::Document;
use libpacup::model::Pacscript;
use libpacup::repology::{select, CatalogRecord, FilterSet};
use miette::{IntoDiagnostic, Result};

fn main() -> Result<()> {
    let doc = Document::new(
        "potato.pacscript",
        r#"pkgname="potato"
pkgver="1.0.0"
arch=('amd64')
repology=("project: potato" "repo: debian")
source=("https://potato.com/${pkgver}.tar.gz")
sha256sums=('SKIP')
"#,
    );

    let pacscript = Pacscript::from_document(&doc)?;
    println!("{pacscript:#?}");

    // Selection against a canned catalog response, no network needed.
    let candidates: Vec<CatalogRecord> = serde_json::from_str(
        r#"[{"repo": "debian", "version": "1.2.0", "status": "newest"},
            {"repo": "fedora", "version": "9.9.9"}]"#,
    )
    .into_diagnostic()?;

    let filters = FilterSet::build(&pacscript.repology)?;
    println!("newest: {}", select(&candidates, &filters)?);

    Ok(())
}
