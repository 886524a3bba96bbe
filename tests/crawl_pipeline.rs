use giin_job_alert::{
    CrawlLimits, CrawlPipeline, Delivery, Digest, Error, GIIN_BASE_URL, GiinClient, JobRecord,
    ListingCrawler, Notifier, PageFetcher, Result, render,
};
use scraper::Html;
use std::cell::RefCell;
use std::collections::HashMap;

/// Serves canned listing pages and remembers what was asked for.
#[derive(Default)]
struct CannedSite {
    pages: HashMap<String, String>,
    fetched: RefCell<Vec<String>>,
}

impl CannedSite {
    fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl PageFetcher for CannedSite {
    fn fetch(&self, url: &str) -> Result<String> {
        self.fetched.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::fetch(url, "connection refused"))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: RefCell<Vec<Digest>>,
}

impl Notifier for RecordingNotifier {
    fn send(&self, digest: &Digest) -> Result<()> {
        self.sent.borrow_mut().push(digest.clone());
        Ok(())
    }
}

struct Entry<'a> {
    posted: Option<&'a str>,
    title: &'a str,
    org: &'a str,
    href: &'a str,
}

fn listing(entries: &[Entry], active: u32, last_page: u32) -> String {
    let jobs: String = entries
        .iter()
        .map(|e| {
            let posted = e
                .posted
                .map(|p| format!(r#"<div class="posted">{p}</div>"#))
                .unwrap_or_default();
            format!(
                r#"<li class="block-link">
                     <h3><a class="block-link-src" href="{}">{}</a></h3>
                     <span class="organization">{}</span>
                     {posted}
                   </li>"#,
                e.href, e.title, e.org
            )
        })
        .collect();

    let pager: String = (1..=last_page)
        .map(|page| {
            if page == active {
                format!(r#"<li class="active"><span>{page}</span></li>"#)
            } else {
                format!(r#"<li><a href="?page={page}">{page}</a></li>"#)
            }
        })
        .collect();

    format!(
        r#"<html><body>
             <aside><ul>{featured}</ul></aside>
             <ul class="jobs">{jobs}</ul>
             <ul class="pagination">{pager}</ul>
           </body></html>"#,
        featured = r#"<li class="block-link"><a class="block-link-src" href="/job/featured">Featured</a></li>"#,
    )
}

fn recent(org: &'static str, href: &'static str) -> Entry<'static> {
    Entry {
        posted: Some("Posted 2 days ago"),
        title: "Program Officer",
        org,
        href,
    }
}

fn old(org: &'static str, href: &'static str) -> Entry<'static> {
    Entry {
        posted: Some("Posted 10 days ago"),
        title: "Senior Associate",
        org,
        href,
    }
}

fn page_url(page: u32) -> String {
    format!("{GIIN_BASE_URL}?page={page}")
}

fn client() -> GiinClient {
    GiinClient::new(GIIN_BASE_URL).unwrap()
}

#[test]
fn end_to_end_single_page_run() {
    let site = CannedSite::default().page(
        GIIN_BASE_URL,
        listing(
            &[
                Entry {
                    posted: Some("New"),
                    title: "Impact Analyst",
                    org: "Org A",
                    href: "/job/1",
                },
                Entry {
                    posted: Some("Posted 10 days ago"),
                    title: "Fund Manager",
                    org: "Org B",
                    href: "/job/2",
                },
            ],
            1,
            1,
        ),
    );
    let notifier = RecordingNotifier::default();

    let document = Html::parse_document(&site.pages[GIIN_BASE_URL]);
    let page = client().extract(&document).unwrap();
    assert!(page.should_continue);
    assert_eq!(page.records.len(), 1);
    assert_eq!(client().next_page_url(&document, page.should_continue).unwrap(), None);

    let delivery = CrawlPipeline::new(&site)
        .crawl(&client())
        .unwrap()
        .notify(&notifier)
        .unwrap();

    let expected = JobRecord::new(
        "Impact Analyst".into(),
        "Org A".into(),
        "https://jobs.thegiin.org/job/1".into(),
        0,
    );
    assert_eq!(delivery, Delivery::Sent { job_count: 1 });
    assert_eq!(site.fetched(), [GIIN_BASE_URL]);

    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, render(&[expected]));
    assert_eq!(sent[0].body.matches("<li>").count(), 1);
    assert!(sent[0].body.contains("Host Organization: Org A"));
    assert!(!sent[0].body.contains("Org B"));
}

#[test]
fn stops_after_first_page_without_recent_postings() {
    let site = CannedSite::default()
        .page(
            GIIN_BASE_URL,
            listing(&[recent("Org 1a", "/job/1a"), recent("Org 1b", "/job/1b")], 1, 5),
        )
        .page(
            &page_url(2),
            listing(&[recent("Org 2a", "/job/2a"), old("Org 2b", "/job/2b")], 2, 5),
        )
        .page(
            &page_url(3),
            listing(&[old("Org 3a", "/job/3a"), old("Org 3b", "/job/3b")], 3, 5),
        )
        .page(&page_url(4), listing(&[recent("Org 4a", "/job/4a")], 4, 5));

    let pipeline = CrawlPipeline::new(&site).crawl(&client()).unwrap();

    assert_eq!(
        site.fetched(),
        [GIIN_BASE_URL.to_string(), page_url(2), page_url(3)]
    );
    let orgs: Vec<_> = pipeline.jobs().iter().map(|j| j.org.as_str()).collect();
    assert_eq!(orgs, ["Org 1a", "Org 1b", "Org 2a"]);
}

#[test]
fn stops_when_pager_has_no_next_link() {
    let site = CannedSite::default()
        .page(GIIN_BASE_URL, listing(&[recent("Org 1", "/job/1")], 1, 2))
        .page(&page_url(2), listing(&[recent("Org 2", "/job/2")], 2, 2));

    let pipeline = CrawlPipeline::new(&site).crawl(&client()).unwrap();

    assert_eq!(site.fetched(), [GIIN_BASE_URL.to_string(), page_url(2)]);
    assert_eq!(pipeline.jobs().len(), 2);
}

#[test]
fn page_cap_limits_the_crawl() {
    let site = CannedSite::default()
        .page(GIIN_BASE_URL, listing(&[recent("Org 1", "/job/1")], 1, 3))
        .page(&page_url(2), listing(&[recent("Org 2", "/job/2")], 2, 3))
        .page(&page_url(3), listing(&[recent("Org 3", "/job/3")], 3, 3));
    let limits = CrawlLimits {
        max_pages: 2,
        ..Default::default()
    };

    let pipeline = CrawlPipeline::new(&site)
        .with_limits(limits)
        .crawl(&client())
        .unwrap();

    assert_eq!(pipeline.jobs().len(), 2);
    assert_eq!(site.fetched().len(), 2);
}

#[test]
fn empty_run_still_sends_by_default() {
    let site = CannedSite::default().page(GIIN_BASE_URL, listing(&[old("Org", "/job/x")], 1, 3));
    let notifier = RecordingNotifier::default();

    let delivery = CrawlPipeline::new(&site)
        .crawl(&client())
        .unwrap()
        .notify(&notifier)
        .unwrap();

    assert_eq!(delivery, Delivery::Sent { job_count: 0 });
    let sent = notifier.sent.borrow();
    assert!(sent[0].body.contains("posted within the last week"));
    assert!(!sent[0].body.contains("<li>"));
}

#[test]
fn empty_run_can_skip_delivery() {
    let site = CannedSite::default().page(GIIN_BASE_URL, listing(&[], 1, 1));
    let notifier = RecordingNotifier::default();

    let delivery = CrawlPipeline::new(&site)
        .crawl(&client())
        .unwrap()
        .send_empty_digest(false)
        .notify(&notifier)
        .unwrap();

    assert_eq!(delivery, Delivery::SkippedEmpty);
    assert!(notifier.sent.borrow().is_empty());
}

#[test]
fn fetch_failure_aborts_before_delivery() {
    let site = CannedSite::default().page(GIIN_BASE_URL, listing(&[recent("Org 1", "/job/1")], 1, 2));

    let err = CrawlPipeline::new(&site).crawl(&client()).err().unwrap();

    assert!(matches!(err, Error::Fetch { ref url, .. } if *url == page_url(2)));
    assert!(!err.is_layout_change());
}

#[test]
fn layout_change_is_reported_as_malformed() {
    let html = listing(
        &[Entry {
            posted: Some("Closing soon"),
            title: "Director",
            org: "Org",
            href: "/job/d",
        }],
        1,
        1,
    );
    let site = CannedSite::default().page(GIIN_BASE_URL, html);

    let err = CrawlPipeline::new(&site).crawl(&client()).err().unwrap();

    assert!(err.is_layout_change());
    assert!(err.to_string().contains(GIIN_BASE_URL));
}
