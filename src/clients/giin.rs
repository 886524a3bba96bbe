use crate::Result;
use crate::crawler::ListingCrawler;
use crate::error::Error;
use crate::models::{JobRecord, PageResult, Posted};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::trace;
use url::Url;

pub const GIIN_BASE_URL: &str = "https://jobs.thegiin.org/";

struct Selectors {
    job_entry: Selector,
    posted: Selector,
    title_link: Selector,
    organization: Selector,
    pagination: Selector,
    active_page: Selector,
    href: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| {
    let parse = |css: &str| Selector::parse(css).expect("static selector must parse");
    Selectors {
        job_entry: parse(".block-link"),
        posted: parse(".posted"),
        title_link: parse(".block-link-src"),
        organization: parse(".organization"),
        pagination: parse(".pagination"),
        active_page: parse(".active"),
        href: parse("[href]"),
    }
});

/// Job board of the Global Impact Investing Network.
pub struct GiinClient {
    base_url: Url,
}

impl GiinClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid listing base URL {base_url:?}: {e}")))?;
        Ok(Self { base_url })
    }

    fn resolve(&self, href: &str) -> Result<Url> {
        self.base_url
            .join(href)
            .map_err(|e| Error::malformed(format!("unresolvable link {href:?}: {e}")))
    }

    /// `None` for featured entries, whose badge is missing or carries no text.
    fn extract_posted(&self, entry: ElementRef) -> Result<Option<Posted>> {
        entry
            .select(&SELECTORS.posted)
            .next()
            .and_then(first_text)
            .map(|text| Posted::parse(&text))
            .transpose()
    }

    fn extract_title(&self, entry: ElementRef) -> String {
        entry
            .select(&SELECTORS.title_link)
            .next()
            .map(collapsed_text)
            .unwrap_or_default()
    }

    fn extract_org(&self, entry: ElementRef) -> String {
        entry
            .select(&SELECTORS.organization)
            .next()
            .map(collapsed_text)
            .unwrap_or_default()
    }

    fn extract_link(&self, entry: ElementRef) -> Result<String> {
        let href = entry
            .select(&SELECTORS.title_link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .ok_or_else(|| Error::malformed("job entry without a link"))?;
        Ok(self.resolve(href)?.into())
    }

    fn active_page(&self, pagination: ElementRef) -> Result<u32> {
        let label = pagination
            .select(&SELECTORS.active_page)
            .next()
            .and_then(first_text)
            .ok_or_else(|| Error::malformed("pager has no active page"))?;

        label
            .parse()
            .map_err(|_| Error::malformed(format!("active page label {label:?} is not a number")))
    }
}

impl ListingCrawler for GiinClient {
    fn start_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn extract(&self, document: &Html) -> Result<PageResult> {
        let mut records = Vec::new();

        for entry in document.select(&SELECTORS.job_entry) {
            let Some(posted) = self.extract_posted(entry)? else {
                continue;
            };

            if !posted.is_recent() {
                trace!(days_ago = posted.days_ago(), "skipping old posting");
                continue;
            }

            records.push(JobRecord::new(
                self.extract_title(entry),
                self.extract_org(entry),
                self.extract_link(entry)?,
                posted.days_ago(),
            ));
        }

        Ok(PageResult::new(records))
    }

    fn next_page_url(&self, document: &Html, should_continue: bool) -> Result<Option<String>> {
        let pagination = document
            .select(&SELECTORS.pagination)
            .next()
            .ok_or_else(|| Error::malformed("page has no pager"))?;

        let next_page = self.active_page(pagination)?.saturating_add(1).to_string();

        if !should_continue {
            return Ok(None);
        }

        let next_url = pagination
            .select(&SELECTORS.href)
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| self.resolve(href).ok())
            .find(|url| {
                url.query_pairs()
                    .any(|(key, value)| key == "page" && value == next_page)
            });

        Ok(next_url.map(String::from))
    }
}

/// The first text node under `element` that is not blank, trimmed.
///
/// Badges and pager labels put their value first and decorate it with nested
/// markup (icons, screen-reader hints) that must not leak into the value.
fn first_text(element: ElementRef) -> Option<String> {
    element
        .text()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Element text with runs of whitespace folded to single spaces.
fn collapsed_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
