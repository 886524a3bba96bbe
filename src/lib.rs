pub mod clients;
pub mod config;
pub mod crawler;
pub mod digest;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod notifier;
pub mod pipeline;

pub use clients::{GIIN_BASE_URL, GiinClient};
pub use config::{Config, DeliveryMode, FetcherKind};
pub use crawler::{CrawlLimits, ListingCrawler};
pub use digest::{Digest, render};
pub use error::Error;
pub use fetcher::{BrowserFetcher, HttpFetcher, PageFetcher};
pub use models::{JobRecord, PageResult, Posted};
pub use notifier::{LogNotifier, Notifier, SmtpNotifier};
pub use pipeline::{CrawlPipeline, Delivery};

pub type Result<T> = std::result::Result<T, Error>;
