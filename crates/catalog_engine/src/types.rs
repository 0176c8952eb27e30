use std::fmt;

/// A page fetch or session failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Worth retrying after a reload.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::Timeout | FailureKind::Navigation | FailureKind::Network
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    /// The page loaded but never rendered the expected content.
    Navigation,
    Network,
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Navigation => write!(f, "navigation failure"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Parse => write!(f, "unreadable page"),
        }
    }
}

/// A numbered link of a listing's pager. `href` is absent for the current
/// page, which is rendered without a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub label: String,
    pub href: Option<String>,
}

impl PageLink {
    pub fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
        }
    }

    pub fn to(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }
}

/// Field lists of one listing page, as rendered. Entry `i` of every list
/// describes the same item; a page where the lengths disagree cannot be
/// trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    pub titles: Vec<String>,
    pub urls: Vec<String>,
    pub types: Vec<String>,
    pub series: Vec<Vec<String>>,
    pub artists: Vec<Vec<String>>,
    pub tags: Vec<Vec<String>>,
    pub dates: Vec<String>,
    pub page_links: Vec<PageLink>,
}

/// Errors that end a crawl run.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("failed to load {url} after {attempts} attempts: {source}")]
    FatalPage {
        url: String,
        attempts: usize,
        #[source]
        source: FetchError,
    },
    #[error("misaligned listing at {url} ({counts})")]
    ShapeMismatch { url: String, counts: String },
    #[error("unreadable date '{raw}' at {url}")]
    InvalidDate { url: String, raw: String },
    #[error("could not open a session: {0}")]
    Session(#[source] FetchError),
    #[error("invalid page interval {first}-{last}: {reason}")]
    InvalidInterval {
        first: usize,
        last: usize,
        reason: String,
    },
}
