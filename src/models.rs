use crate::Result;
use crate::error::Error;
use regex::Regex;
use std::sync::LazyLock;

/// Postings older than this many days are never materialized.
pub const MAX_DAYS_AGO: u32 = 7;

static POSTED_DAYS_AGO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Posted\s+(\d+)\s+days?\s+ago\.?$").expect("static regex must compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub title: String,
    pub org: String,
    pub link: String,
    pub days_ago: u32,
}

impl JobRecord {
    pub fn new(title: String, org: String, link: String, days_ago: u32) -> Self {
        Self {
            title,
            org,
            link,
            days_ago,
        }
    }
}

/// Qualifying postings found on one listing page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub records: Vec<JobRecord>,
    pub should_continue: bool,
}

impl PageResult {
    pub fn new(records: Vec<JobRecord>) -> Self {
        let should_continue = !records.is_empty();
        Self {
            records,
            should_continue,
        }
    }
}

/// The "posted" badge on a listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posted {
    New,
    DaysAgo(u32),
}

impl Posted {
    /// Accepts `New` or `Posted <N> days ago`.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        if text.split_whitespace().next() == Some("New") {
            return Ok(Self::New);
        }

        let captures = POSTED_DAYS_AGO
            .captures(text)
            .ok_or_else(|| Error::malformed(format!("unrecognized posted text {text:?}")))?;

        captures[1]
            .parse::<u32>()
            .map(Self::DaysAgo)
            .map_err(|e| Error::malformed(format!("bad day count in {text:?}: {e}")))
    }

    pub fn days_ago(self) -> u32 {
        match self {
            Self::New => 0,
            Self::DaysAgo(days) => days,
        }
    }

    pub fn is_recent(self) -> bool {
        self.days_ago() <= MAX_DAYS_AGO
    }
}
