use crate::Result;
use crate::fetcher::PageFetcher;
use crate::models::{JobRecord, PageResult};
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Bounds on a single crawl run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Hard cap on the number of pages fetched.
    pub max_pages: usize,
    /// Consecutive pages without a qualifying posting before the crawl gives up.
    pub stale_page_limit: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_pages: 50,
            stale_page_limit: 1,
        }
    }
}

/// A newest-first paginated listing.
///
/// Implementors supply the page-level extractor and navigator; the provided
/// [`ListingCrawler::fetch_all_jobs`] walks pages sequentially until one of them
/// says stop. The listing must be sorted newest-first: the first page without a
/// recent posting is taken as proof that every later page is older.
pub trait ListingCrawler {
    fn start_url(&self) -> &str;

    fn extract(&self, document: &Html) -> Result<PageResult>;

    fn next_page_url(&self, document: &Html, should_continue: bool) -> Result<Option<String>>;

    fn fetch_all_jobs(
        &self,
        fetcher: &dyn PageFetcher,
        limits: CrawlLimits,
    ) -> Result<Vec<JobRecord>> {
        let mut all_jobs = Vec::new();
        let mut visited = HashSet::new();
        let mut stale_streak = 0;
        let mut next_url = Some(self.start_url().to_string());
        let mut page_count = 0;

        while let Some(url) = next_url.take() {
            if page_count >= limits.max_pages {
                warn!(max_pages = limits.max_pages, next = %url, "page cap reached, stopping");
                break;
            }

            let html = fetcher.fetch(&url)?;
            page_count += 1;
            visited.insert(url.clone());

            let document = Html::parse_document(&html);
            let page = self.extract(&document).map_err(|e| e.at_url(&url))?;

            stale_streak = if page.should_continue { 0 } else { stale_streak + 1 };
            let keep_going = stale_streak < limits.stale_page_limit;

            let new_count = page.records.len();
            all_jobs.extend(page.records);
            info!(
                page = page_count,
                url = %url,
                new = new_count,
                total = all_jobs.len(),
                "scanned listing page"
            );

            next_url = self
                .next_page_url(&document, keep_going)
                .map_err(|e| e.at_url(&url))?
                .filter(|candidate| {
                    let unseen = !visited.contains(candidate);
                    if !unseen {
                        warn!(url = %candidate, "pager points back to a visited page, stopping");
                    }
                    unseen
                });

            if next_url.is_none() {
                debug!(stale_streak, keep_going, "no further page to fetch");
            }
        }

        Ok(all_jobs)
    }
}
