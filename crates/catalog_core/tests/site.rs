use std::collections::BTreeSet;

use catalog_core::{
    creator_name_from_url, parse_listing_date, Creator, CreatorRole, FilterPolicy, Site,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

#[test]
fn creator_urls_round_trip_names() {
    let site = Site::default();
    let url = site.artist_url("hase yuu");

    assert_eq!(url, "https://hitomi.la/artist/hase%20yuu-japanese.html");
    assert_eq!(creator_name_from_url(&url), "hase yuu");

    let group = site.creator(CreatorRole::Group, "team a-b");
    assert_eq!(group.url, "https://hitomi.la/group/team%20a-b-japanese.html");
    assert_eq!(group.name, "team a-b");
    assert_eq!(group.role(), CreatorRole::Group);
}

#[test]
fn creator_name_of_malformed_url_is_empty() {
    assert_eq!(creator_name_from_url("nohyphen"), "");
    assert_eq!(Creator::from_url("https://x/artist/bob-english.html").name, "bob");
}

#[test]
fn search_url_encodes_policy() {
    let site = Site::new("https://example.org/", "japanese");
    let policy = FilterPolicy {
        excluded_types: ["game cg".to_string()].into_iter().collect(),
        required_tags: ["sole female ♀".to_string()].into_iter().collect(),
        excluded_tags: ["full censorship".to_string()].into_iter().collect(),
        ..FilterPolicy::default()
    };

    assert_eq!(
        site.search_url(&policy),
        "https://example.org/search.html?language%3Ajapanese%20-type%3Agamecg%20female%3Asole_female%20-tag%3Afull_censorship"
    );
}

#[test]
fn empty_search_is_the_base_url() {
    let site = Site::new("https://example.org", "");
    let policy = FilterPolicy {
        excluded_types: BTreeSet::new(),
        ..FilterPolicy::default()
    };

    assert_eq!(site.search_url(&policy), "https://example.org");
}

#[test]
fn listing_dates_in_both_renderings() {
    let expected = NaiveDate::from_ymd_opt(2017, 9, 30)
        .unwrap()
        .and_hms_opt(23, 14, 0)
        .unwrap();

    assert_eq!(parse_listing_date("2017-09-30 23:14:00-06").unwrap(), expected);
    assert_eq!(parse_listing_date("30 Sept 2017, 23:14").unwrap(), expected);
    assert_eq!(parse_listing_date(" 30 Sep 2017, 23:14 ").unwrap(), expected);
    assert!(parse_listing_date("yesterday").is_err());
}
