use crate::Result;
use crate::error::Error;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Retrieves the HTML of a listing page.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET. The listing site renders server-side, so this is the default.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| Error::fetch(url, e))
    }
}

/// Renders pages in headless Chrome, for when the listing needs scripts to run.
pub struct BrowserFetcher {
    browser: Browser,
}

impl BrowserFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_chrome_path(user_agent, None)
    }

    /// Launches the given Chrome binary, or the one headless_chrome finds on its own.
    pub fn with_chrome_path(user_agent: &str, chrome_path: Option<PathBuf>) -> Result<Self> {
        let user_agent_arg = OsString::from(format!("--user-agent={}", user_agent));
        let automation_arg = OsString::from("--disable-blink-features=AutomationControlled");

        let browser = Browser::new(LaunchOptions {
            headless: true,
            path: chrome_path,
            args: vec![user_agent_arg.as_os_str(), automation_arg.as_os_str()],
            ..Default::default()
        })
        .map_err(|e| Error::Config(format!("failed to launch headless Chrome: {e}")))?;

        Ok(Self { browser })
    }
}

impl PageFetcher for BrowserFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "navigating");
        let tab = self.browser.new_tab().map_err(|e| Error::fetch(url, e))?;

        let html = tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_for_element("body").map(|_| tab))
            .and_then(|tab| tab.get_content());

        // A leaked tab keeps its renderer alive for the rest of the run.
        if let Err(e) = tab.close(true) {
            debug!(url, error = %e, "failed to close tab");
        }

        html.map_err(|e| Error::fetch(url, e))
    }
}
