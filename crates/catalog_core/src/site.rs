//! Url rules of the catalog origin.

use url::Url;

use crate::creator::Creator;
use crate::item::CreatorRole;
use crate::policy::FilterPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub base_url: String,
    pub language: String,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            base_url: "https://hitomi.la".to_string(),
            language: "japanese".to_string(),
        }
    }
}

impl Site {
    pub fn new(base_url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
        }
    }

    pub fn artist_url(&self, name: &str) -> String {
        self.listing_url("artist", name)
    }

    pub fn group_url(&self, name: &str) -> String {
        self.listing_url("group", name)
    }

    pub fn series_url(&self, name: &str) -> String {
        self.listing_url("series", name)
    }

    pub fn creator(&self, role: CreatorRole, name: &str) -> Creator {
        let url = match role {
            CreatorRole::Artist => self.artist_url(name),
            CreatorRole::Group => self.group_url(name),
        };
        Creator::from_url(url)
    }

    fn listing_url(&self, section: &str, name: &str) -> String {
        format!(
            "{}/{section}/{}-{}.html",
            self.base_url,
            name.replace(' ', "%20"),
            self.language
        )
    }

    /// Builds the listing url that pre-filters on the origin with the same
    /// rules the policy enforces locally. Falls back to the bare base url
    /// when the policy has nothing to search for.
    pub fn search_url(&self, policy: &FilterPolicy) -> String {
        let mut tokens: Vec<String> = Vec::new();
        if let Some(series) = &policy.required_series {
            tokens.push(format!("series%3A{}", series.replace(' ', "_")));
        }
        if !self.language.is_empty() {
            tokens.push(format!("language%3A{}", self.language));
        }
        for kind in &policy.excluded_types {
            tokens.push(format!("-type%3A{}", kind.replace(' ', "")));
        }
        for tag in &policy.required_tags {
            tokens.push(tag_search_token(tag, false));
        }
        for tag in &policy.excluded_tags {
            tokens.push(tag_search_token(tag, true));
        }

        if tokens.is_empty() {
            return self.base_url.clone();
        }
        let query = tokens.join("%20");
        match Url::parse(&self.base_url).and_then(|base| base.join("search.html")) {
            Ok(mut url) => {
                url.set_query(Some(&query));
                url.to_string()
            }
            Err(_) => format!("{}/search.html?{query}", self.base_url),
        }
    }
}

fn tag_search_token(tag: &str, exclude: bool) -> String {
    let body = if let Some(name) = tag.strip_suffix(" ♀") {
        format!("female%3A{name}")
    } else if let Some(name) = tag.strip_suffix(" ♂") {
        format!("male%3A{name}")
    } else {
        format!("tag%3A{tag}")
    };
    let sign = if exclude { "-" } else { "" };
    format!("{sign}{}", body.replace(' ', "_"))
}
