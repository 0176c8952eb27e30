//! Session over plain HTTP, reading the origin's server-rendered markup.

use std::time::Duration;

use catalog_core::ItemDetail;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::source::{DetailSource, PageSource, Session, SessionProvider};
use crate::types::{FailureKind, FetchError, PageLink, RawPage};

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct HttpSessionProvider {
    client: reqwest::Client,
}

impl HttpSessionProvider {
    pub fn new(request_timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client })
    }
}

impl SessionProvider for HttpSessionProvider {
    fn acquire(&self) -> Result<Box<dyn Session>, FetchError> {
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
        }))
    }
}

pub struct HttpSession {
    client: reqwest::Client,
}

impl HttpSession {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

#[async_trait::async_trait]
impl PageSource for HttpSession {
    async fn fetch_page(&mut self, url: &str) -> Result<RawPage, FetchError> {
        let body = self.get(url).await?;
        parse_listing(&body, url)
    }

    /// Every fetch is a fresh request; there is no rendered state to reset.
    async fn reload(&mut self) -> Result<(), FetchError> {
        Ok(())
    }

    async fn resolves(&mut self, url: &str) -> Result<bool, FetchError> {
        match self.get(url).await {
            Ok(body) => Ok(has_listing(&body)),
            Err(err) if err.kind == FailureKind::HttpStatus(404) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[async_trait::async_trait]
impl DetailSource for HttpSession {
    async fn fetch_detail(&mut self, item_url: &str) -> Result<ItemDetail, FetchError> {
        let body = self.get(item_url).await?;
        Ok(parse_detail(&body))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::Navigation, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

/// BOM, then the Content-Type charset, then detection.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css)
        .map_err(|err| FetchError::new(FailureKind::Parse, format!("selector {css}: {err}")))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Lower-cased texts of the links under `element`, ellipsis links dropped.
fn link_texts(element: ElementRef<'_>, links: &Selector) -> Vec<String> {
    element
        .select(links)
        .map(text_of)
        .filter(|text| text != ELLIPSIS && !text.is_empty())
        .map(|text| text.to_lowercase())
        .collect()
}

fn absolute(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extracts the parallel field lists of a listing page. Lengths are not
/// checked here; a misaligned page is rejected when it is turned into items.
pub fn parse_listing(html: &str, page_url: &str) -> Result<RawPage, FetchError> {
    let base = Url::parse(page_url)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    let doc = Html::parse_document(html);

    let title_sel = selector(".lillie a")?;
    let series_sel = selector("table.dj-desc tr:nth-child(1) > td:nth-child(2)")?;
    let type_sel = selector("table.dj-desc tr:nth-child(2) > td:nth-child(2)")?;
    let artist_sel = selector(".artist-list")?;
    let tag_sel = selector(".relatedtags")?;
    let date_sel = selector(".date")?;
    let pager_sel = selector(".page-container li")?;
    let link_sel = selector("a")?;

    let mut page = RawPage::default();
    for title in doc.select(&title_sel) {
        page.titles.push(text_of(title));
        let href = title.value().attr("href").unwrap_or_default();
        page.urls.push(absolute(&base, href));
    }
    page.series = doc.select(&series_sel).map(|e| link_texts(e, &link_sel)).collect();
    page.types = doc.select(&type_sel).map(|e| text_of(e).to_lowercase()).collect();
    page.artists = doc.select(&artist_sel).map(|e| link_texts(e, &link_sel)).collect();
    page.tags = doc.select(&tag_sel).map(|e| link_texts(e, &link_sel)).collect();
    page.dates = doc.select(&date_sel).map(text_of).collect();
    page.page_links = doc
        .select(&pager_sel)
        .map(|li| {
            let href = li
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| absolute(&base, href));
            PageLink {
                label: text_of(li),
                href,
            }
        })
        .collect();
    Ok(page)
}

pub fn parse_detail(html: &str) -> ItemDetail {
    let doc = Html::parse_document(html);
    let texts = |css: &str| -> Vec<String> {
        match Selector::parse(css) {
            Ok(sel) => doc
                .select(&sel)
                .map(text_of)
                .filter(|text| !text.is_empty())
                .map(|text| text.to_lowercase())
                .collect(),
            Err(_) => Vec::new(),
        }
    };
    ItemDetail {
        groups: texts("#groups a"),
        characters: texts("#characters a"),
    }
}

fn has_listing(html: &str) -> bool {
    let doc = Html::parse_document(html);
    Selector::parse("h1.lillie a")
        .map(|sel| doc.select(&sel).next().is_some())
        .unwrap_or(false)
}
