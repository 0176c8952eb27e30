//! Turning a rendered listing page into items.

use catalog_core::{parse_listing_date, Item};

use crate::types::{CrawlError, PageLink, RawPage};

const ELLIPSIS: &str = "...";

/// Zips the page's field lists into items, in listing order.
pub fn page_items(page: &RawPage, page_url: &str) -> Result<Vec<Item>, CrawlError> {
    let len = page.titles.len();
    let aligned = [
        page.urls.len(),
        page.series.len(),
        page.types.len(),
        page.artists.len(),
        page.tags.len(),
        page.dates.len(),
    ]
    .iter()
    .all(|n| *n == len);
    if !aligned {
        return Err(CrawlError::ShapeMismatch {
            url: page_url.to_string(),
            counts: format!(
                "titles:{} urls:{} series:{} types:{} artists:{} tags:{} dates:{}",
                page.titles.len(),
                page.urls.len(),
                page.series.len(),
                page.types.len(),
                page.artists.len(),
                page.tags.len(),
                page.dates.len()
            ),
        });
    }

    let mut items = Vec::with_capacity(len);
    for i in 0..len {
        let mut item = Item::new(page.urls[i].clone(), page.titles[i].clone());
        item.kind = page.types[i].clone();
        item.series = page.series[i].clone();
        item.credits.artists = page.artists[i].clone();
        item.tags = page.tags[i].clone();
        item.published_at =
            parse_listing_date(&page.dates[i]).map_err(|_| CrawlError::InvalidDate {
                url: page_url.to_string(),
                raw: page.dates[i].clone(),
            })?;
        items.push(item);
    }
    Ok(items)
}

/// The first linked page numbered above the current one. The current page
/// is the one rendered without a link; ellipsis entries are ignored.
pub fn next_page_url(links: &[PageLink]) -> Option<String> {
    let mut current: Option<u64> = None;
    for link in links {
        let label = link.label.trim();
        if label == ELLIPSIS {
            continue;
        }
        let Ok(number) = label.parse::<u64>() else {
            continue;
        };
        match &link.href {
            None => current = Some(number),
            Some(href) => {
                if current.is_some_and(|current| number > current) {
                    return Some(href.clone());
                }
            }
        }
    }
    None
}

/// Renders the pager the way the log shows it: `| 1 [2] 3 ... 9 |`.
pub fn describe_pager(links: &[PageLink]) -> String {
    let next = next_page_url(links);
    let mut rendered = String::from("|");
    for link in links {
        let label = link.label.trim();
        if link.href.is_some() && link.href == next {
            rendered.push_str(&format!(" [{label}]"));
        } else {
            rendered.push_str(&format!(" {label}"));
        }
    }
    rendered.push_str(" |");
    rendered
}
