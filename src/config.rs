use crate::Result;
use crate::clients::GIIN_BASE_URL;
use crate::crawler::CrawlLimits;
use crate::error::Error;
use crate::fetcher::{BrowserFetcher, DEFAULT_USER_AGENT, HttpFetcher, PageFetcher};
use crate::notifier::{LogNotifier, Notifier, SmtpNotifier};
use dotenvy::dotenv;
use lettre::message::Mailbox;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherKind {
    Http,
    Browser,
}

impl FromStr for FetcherKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "browser" | "chrome" => Ok(Self::Browser),
            other => Err(Error::Config(format!("unknown fetcher {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Plaintext local relay, addressed to the sender.
    LocalRelay,
    /// Authenticated relay, addressed to the sender.
    DirectToSelf,
    /// Authenticated relay, one message per list member.
    MailingList,
    /// Log the digest, send nothing.
    DryRun,
}

impl FromStr for DeliveryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local-relay" | "local" => Ok(Self::LocalRelay),
            "direct-to-self" | "dev" => Ok(Self::DirectToSelf),
            "mailing-list" | "list" => Ok(Self::MailingList),
            "dry-run" => Ok(Self::DryRun),
            other => Err(Error::Config(format!("unknown delivery mode {other:?}"))),
        }
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub limits: CrawlLimits,
    pub fetcher: FetcherKind,
    pub user_agent: String,
    pub chrome_path: Option<PathBuf>,
    pub delivery_mode: DeliveryMode,
    pub mail_from: Option<Mailbox>,
    pub mail_password: Option<String>,
    pub mail_recipients: Vec<Mailbox>,
    pub smtp_relay: String,
    pub local_smtp_host: String,
    pub local_smtp_port: u16,
    pub send_empty_digest: bool,
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or(default).to_string();

        let limits = CrawlLimits {
            max_pages: parse_count(get("GIIN_MAX_PAGES"), "GIIN_MAX_PAGES", 50)?,
            stale_page_limit: parse_count(
                get("GIIN_STALE_PAGE_LIMIT"),
                "GIIN_STALE_PAGE_LIMIT",
                1,
            )?,
        };

        let config = Self {
            base_url: get_or("GIIN_BASE_URL", GIIN_BASE_URL),
            limits,
            fetcher: get("GIIN_FETCHER").unwrap_or("http").parse()?,
            user_agent: get_or("GIIN_USER_AGENT", DEFAULT_USER_AGENT),
            chrome_path: get("GIIN_CHROME_PATH").map(PathBuf::from),
            delivery_mode: get("DELIVERY_MODE").unwrap_or("direct-to-self").parse()?,
            mail_from: get("MAIL_FROM").map(|v| parse_mailbox(v, "MAIL_FROM")).transpose()?,
            mail_password: get("MAIL_PASSWORD").map(str::to_string),
            mail_recipients: get("MAIL_RECIPIENTS")
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(|v| parse_mailbox(v, "MAIL_RECIPIENTS"))
                        .collect::<Result<Vec<_>>>()
                })
                .transpose()?
                .unwrap_or_default(),
            smtp_relay: get_or("SMTP_RELAY", "smtp.gmail.com"),
            local_smtp_host: get_or("LOCAL_SMTP_HOST", "localhost"),
            local_smtp_port: get("LOCAL_SMTP_PORT")
                .unwrap_or("1025")
                .parse()
                .map_err(|_| Error::Config("LOCAL_SMTP_PORT must be a valid port".into()))?,
            send_empty_digest: parse_bool(get("SEND_EMPTY_DIGEST"), "SEND_EMPTY_DIGEST", true)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.delivery_mode != DeliveryMode::DryRun && self.mail_from.is_none() {
            return Err(Error::Config("MAIL_FROM must be set".into()));
        }

        let needs_password = matches!(
            self.delivery_mode,
            DeliveryMode::DirectToSelf | DeliveryMode::MailingList
        );
        if needs_password && self.mail_password.is_none() {
            return Err(Error::Config("MAIL_PASSWORD must be set".into()));
        }

        if self.delivery_mode == DeliveryMode::MailingList && self.mail_recipients.is_empty() {
            return Err(Error::Config("MAIL_RECIPIENTS must list at least one address".into()));
        }

        Ok(())
    }

    pub fn build_fetcher(&self) -> Result<Box<dyn PageFetcher>> {
        let fetcher: Box<dyn PageFetcher> = match self.fetcher {
            FetcherKind::Http => Box::new(HttpFetcher::new(&self.user_agent)?),
            FetcherKind::Browser => Box::new(BrowserFetcher::with_chrome_path(
                &self.user_agent,
                self.chrome_path.clone(),
            )?),
        };
        Ok(fetcher)
    }

    pub fn build_notifier(&self) -> Result<Box<dyn Notifier>> {
        let from = || {
            self.mail_from
                .clone()
                .ok_or_else(|| Error::Config("MAIL_FROM must be set".into()))
        };
        let password = || {
            self.mail_password
                .clone()
                .ok_or_else(|| Error::Config("MAIL_PASSWORD must be set".into()))
        };

        let notifier: Box<dyn Notifier> = match self.delivery_mode {
            DeliveryMode::LocalRelay => Box::new(SmtpNotifier::local_relay(
                from()?,
                &self.local_smtp_host,
                self.local_smtp_port,
            )),
            DeliveryMode::DirectToSelf => Box::new(SmtpNotifier::direct_to_self(
                from()?,
                password()?,
                &self.smtp_relay,
            )?),
            DeliveryMode::MailingList => Box::new(SmtpNotifier::mailing_list(
                from()?,
                self.mail_recipients.clone(),
                password()?,
                &self.smtp_relay,
            )?),
            DeliveryMode::DryRun => Box::new(LogNotifier),
        };
        Ok(notifier)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("limits", &self.limits)
            .field("fetcher", &self.fetcher)
            .field("user_agent", &self.user_agent)
            .field("chrome_path", &self.chrome_path)
            .field("delivery_mode", &self.delivery_mode)
            .field("mail_from", &self.mail_from)
            .field("mail_password", &self.mail_password.as_ref().map(|_| "<redacted>"))
            .field("mail_recipients", &self.mail_recipients)
            .field("smtp_relay", &self.smtp_relay)
            .field("local_smtp_host", &self.local_smtp_host)
            .field("local_smtp_port", &self.local_smtp_port)
            .field("send_empty_digest", &self.send_empty_digest)
            .finish()
    }
}

fn parse_count(value: Option<&str>, key: &str, default: usize) -> Result<usize> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(Error::Config(format!("{key} must be a positive integer, got {value:?}"))),
    }
}

fn parse_bool(value: Option<&str>, key: &str, default: bool) -> Result<bool> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes") => Ok(true),
        Some("0" | "false" | "no") => Ok(false),
        Some(other) => Err(Error::Config(format!("{key} must be true or false, got {other:?}"))),
    }
}

fn parse_mailbox(value: &str, key: &str) -> Result<Mailbox> {
    value
        .parse()
        .map_err(|e| Error::Config(format!("{key} has invalid address {value:?}: {e}")))
}
