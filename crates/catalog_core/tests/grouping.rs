use catalog_core::{
    bucket_by_creator, build_export_tree, BookmarkNode, Creator, ExportLayout, Item,
    ANTHOLOGY_BUCKET, UNDEFINED_BUCKET,
};
use pretty_assertions::assert_eq;

fn item(id: u32, name: &str, artists: &[&str]) -> Item {
    let mut item = Item::new(format!("https://example.org/galleries/{id}.html"), name);
    item.credits.artists = artists.iter().map(|a| a.to_string()).collect();
    item
}

fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

fn child_names(node: &BookmarkNode) -> Vec<&str> {
    node.children().iter().map(BookmarkNode::name).collect()
}

#[test]
fn sole_creator_items_share_a_sorted_folder() {
    let accepted = vec![item(1, "Zebra", &["alice"]), item(2, "Apple", &["alice"])];

    let buckets = bucket_by_creator(&accepted);

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].name, "alice");
    assert_eq!(names(&buckets[0].items), vec!["Apple", "Zebra"]);
}

#[test]
fn more_than_three_creators_is_always_an_anthology() {
    let accepted = vec![
        item(1, "Big", &["a", "b", "c", "d"]),
        item(2, "A1", &["a"]),
        item(3, "A2", &["a"]),
    ];

    let buckets = bucket_by_creator(&accepted);

    assert_eq!(buckets[0].name, ANTHOLOGY_BUCKET);
    assert_eq!(names(&buckets[0].items), vec!["Big"]);
}

#[test]
fn unrepeated_pair_falls_back_to_undefined() {
    let accepted = vec![item(1, "Duo", &["x", "y"]), item(2, "Other", &["z"])];

    let buckets = bucket_by_creator(&accepted);

    assert_eq!(buckets[0].name, UNDEFINED_BUCKET);
    assert_eq!(buckets[1].name, "z");
}

#[test]
fn shared_work_goes_to_the_most_frequent_creator() {
    let accepted = vec![
        item(1, "Duo", &["x", "y"]),
        item(2, "Y solo", &["y"]),
        item(3, "Y again", &["y"]),
    ];

    let buckets = bucket_by_creator(&accepted);

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].name, "y");
    assert_eq!(names(&buckets[0].items), vec!["Duo", "Y again", "Y solo"]);
}

#[test]
fn ties_go_to_the_first_credited_creator() {
    let accepted = vec![
        item(1, "Duo", &["x", "y"]),
        item(2, "X solo", &["x"]),
        item(3, "Y solo", &["y"]),
    ];

    let buckets = bucket_by_creator(&accepted);

    assert_eq!(buckets[0].name, "x");
    assert_eq!(names(&buckets[0].items), vec!["Duo", "X solo"]);
}

#[test]
fn uncredited_items_use_groups_then_undefined() {
    let mut grouped = item(1, "G1", &[]);
    grouped.credits.groups = vec!["circle".to_string()];
    let anonymous = item(2, "Anon", &[]);

    let buckets = bucket_by_creator(&[grouped, anonymous]);

    assert_eq!(buckets[0].name, "circle");
    assert_eq!(buckets[1].name, UNDEFINED_BUCKET);
}

#[test]
fn sorting_is_case_sensitive() {
    let accepted = vec![item(1, "beta", &["a"]), item(2, "Alpha", &["a"]), item(3, "Beta", &["a"])];

    let buckets = bucket_by_creator(&accepted);

    assert_eq!(names(&buckets[0].items), vec!["Alpha", "Beta", "beta"]);
}

#[test]
fn export_tree_flattens_singletons_but_keeps_reserved_folders() {
    let accepted = vec![
        item(1, "A1", &["alice"]),
        item(2, "A2", &["alice"]),
        item(3, "Solo", &["bob"]),
        item(4, "Anon", &[]),
    ];
    let creators = vec![Creator::from_url("https://example.org/artist/alice-japanese.html")];

    let root = build_export_tree(&accepted, &creators, &ExportLayout::default()).unwrap();

    assert_eq!(child_names(&root), vec!["new-items", "new-creators"]);
    let items_folder = root.find_folder("new-items").unwrap();
    assert_eq!(child_names(items_folder), vec!["alice", "bob | Solo", UNDEFINED_BUCKET]);
    assert_eq!(
        child_names(items_folder.find_folder("alice").unwrap()),
        vec!["alice | A1", "alice | A2"]
    );
    assert_eq!(
        child_names(items_folder.find_folder(UNDEFINED_BUCKET).unwrap()),
        vec!["Anon"]
    );
    assert_eq!(child_names(root.find_folder("new-creators").unwrap()), vec!["alice"]);
    assert_eq!(root.link_count(), 5);
}

#[test]
fn single_accepted_item_is_not_grouped() {
    let accepted = vec![item(1, "Only", &["a", "b", "c", "d"])];

    let root = build_export_tree(&accepted, &[], &ExportLayout::for_series(Some("touhou"))).unwrap();

    assert_eq!(child_names(&root), vec!["touhou"]);
    let folder = root.find_folder("touhou").unwrap();
    assert_eq!(
        folder.children(),
        &[BookmarkNode::Link {
            title: "Only".to_string(),
            url: "https://example.org/galleries/1.html".to_string(),
        }]
    );
}

#[test]
fn nothing_to_export_yields_no_tree() {
    assert!(build_export_tree(&[], &[], &ExportLayout::default()).is_none());
}

#[test]
fn link_titles_escape_markup() {
    let accepted = vec![item(1, "<b>bold</b>", &["a"]), item(2, "x", &["a"])];

    let root = build_export_tree(&accepted, &[], &ExportLayout::default()).unwrap();
    let folder = root.find_folder("new-items").unwrap().find_folder("a").unwrap();

    assert_eq!(child_names(folder)[0], "a | &lt;b&gt;bold&lt;/b&gt;");
}
