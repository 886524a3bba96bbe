use crate::Result;
use crate::crawler::{CrawlLimits, ListingCrawler};
use crate::digest::Digest;
use crate::fetcher::PageFetcher;
use crate::models::JobRecord;
use crate::notifier::Notifier;
use tracing::{error, info};

/// Crawl once, then deliver once.
///
/// ```ignore
/// CrawlPipeline::new(&fetcher)
///     .with_limits(config.limits)
///     .crawl(&GiinClient::new(&config.base_url)?)?
///     .notify(&notifier)?;
/// ```
pub struct CrawlPipeline<'a> {
    fetcher: &'a dyn PageFetcher,
    limits: CrawlLimits,
}

#[must_use = "pipeline must end with .notify() to deliver the digest"]
pub struct PipelineWithJobs {
    jobs: Vec<JobRecord>,
    send_empty_digest: bool,
}

/// What happened to the digest at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent { job_count: usize },
    SkippedEmpty,
}

impl<'a> CrawlPipeline<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher) -> Self {
        Self {
            fetcher,
            limits: CrawlLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn crawl(self, client: &impl ListingCrawler) -> Result<PipelineWithJobs> {
        info!(url = client.start_url(), "crawling job listings");
        let jobs = client
            .fetch_all_jobs(self.fetcher, self.limits)
            .inspect(|jobs| info!(count = jobs.len(), "found new job listings"))
            .inspect_err(|e| error!(error = %e, layout_change = e.is_layout_change(), "crawl failed"))?;

        Ok(PipelineWithJobs {
            jobs,
            send_empty_digest: true,
        })
    }
}

impl PipelineWithJobs {
    /// When disabled, a run that found nothing sends nothing.
    pub fn send_empty_digest(mut self, enabled: bool) -> Self {
        self.send_empty_digest = enabled;
        self
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn notify(self, notifier: &dyn Notifier) -> Result<Delivery> {
        let digest = Digest::new(&self.jobs);

        if digest.is_empty() && !self.send_empty_digest {
            info!("no new job listings, skipping digest");
            return Ok(Delivery::SkippedEmpty);
        }

        notifier
            .send(&digest)
            .inspect(|_| info!(jobs = digest.job_count, "digest delivered"))
            .inspect_err(|e| error!(error = %e, "digest delivery failed"))?;

        Ok(Delivery::Sent {
            job_count: digest.job_count,
        })
    }
}
