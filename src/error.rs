use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// The page could not be retrieved. Network, HTTP status and browser failures all land here.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The listing markup no longer matches what the extractor expects.
    #[error("malformed document{}: {reason}", .url.as_deref().map(|u| format!(" at {u}")).unwrap_or_default())]
    MalformedDocument { url: Option<String>, reason: String },

    #[error("mail delivery failed: {0}")]
    Delivery(#[source] BoxError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn fetch(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            url: None,
            reason: reason.into(),
        }
    }

    pub fn delivery(source: impl Into<BoxError>) -> Self {
        Self::Delivery(source.into())
    }

    /// Attaches the page URL to a malformed-document error raised by a pure parser.
    pub fn at_url(self, page_url: &str) -> Self {
        match self {
            Self::MalformedDocument { url: None, reason } => Self::MalformedDocument {
                url: Some(page_url.to_string()),
                reason,
            },
            other => other,
        }
    }

    /// True when the site markup, rather than the network or the mail server, is at fault.
    pub fn is_layout_change(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. })
    }
}
