//! Phase 1: Upstream
//!
//! Fetches and parses the upstream document, checks that it has the target
//! section and removes excluded keys from that section.

use log::info;
use url::Url;

use super::Phase;
use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::exclude::{self, Exclusions};
use crate::fetch::Fetcher;
use crate::path::SectionPath;
use crate::section::{locate_mut, Missing};

/// The upstream document, ready to be merged
#[derive(Debug)]
pub struct Upstream {
    pub document: ConfigDocument,
    /// Paths stripped by the exclusion filter, relative to the section
    pub removed: Vec<SectionPath>,
}

/// Execute Phase 1: fetch, parse, locate and filter
///
/// # Errors
///
/// Propagates fetch and parse errors. Returns `Error::MissingSection` if the
/// upstream document has no (or an empty) target section.
pub async fn execute(
    url: &Url,
    fetcher: &dyn Fetcher,
    section: &SectionPath,
    exclusions: &Exclusions,
) -> Result<Upstream> {
    Phase::FetchUpstream.enter();
    let text = fetcher.fetch(url).await?;

    Phase::ParseUpstream.enter();
    let mut document = ConfigDocument::parse(&text, url.as_str())?;

    Phase::LocateTargetSection.enter();
    let missing = || Error::MissingSection {
        path: section.to_string(),
        origin: url.to_string(),
    };
    let table = locate_mut(document.root_mut(), section, Missing::Absent)?.ok_or_else(missing)?;
    if table.is_empty() {
        return Err(missing());
    }

    Phase::FilterExcluded.enter();
    let removed = exclude::filter_children(table, exclusions);
    for path in &removed {
        let full = SectionPath::new(section.iter().chain(path.iter()));
        info!("Excluded `{}` from upstream", full);
    }

    Ok(Upstream { document, removed })
}
