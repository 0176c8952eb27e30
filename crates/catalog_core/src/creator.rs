use crate::item::CreatorRole;

/// An artist or group worth tracking. Identity is the name, which is
/// always derived from the canonical url.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Creator {
    pub name: String,
    pub url: String,
}

impl Creator {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: creator_name_from_url(&url),
            url,
        }
    }

    /// Group pages live under `/group/`, everything else is an artist page.
    pub fn role(&self) -> CreatorRole {
        if self.url.contains("/group/") {
            CreatorRole::Group
        } else {
            CreatorRole::Artist
        }
    }
}

/// `https://host/artist/hase%20yuu-japanese.html` -> `hase yuu`.
///
/// The trailing `-<language>.html` segment is dropped, then the last path
/// segment is taken and `%20` decoded to a space.
pub fn creator_name_from_url(url: &str) -> String {
    let without_suffix = match url.rfind('-') {
        Some(idx) => &url[..idx],
        None => "",
    };
    let last_segment = without_suffix.rsplit('/').next().unwrap_or_default();
    last_segment.replace("%20", " ")
}
