use super::*;
use crate::repo::tests::{create_test_user, setup_test_db};
use crate::repo::{create_comment, favorite_item, follow_user, list_comments};

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn create_simple_item(pool: &DbPool, seller: &User, title: &str) -> Item {
    create_item(
        pool,
        seller.get_id(),
        title.to_string(),
        "description".to_string(),
        "body".to_string(),
        &[],
    )
    .unwrap()
}

#[test]
fn test_create_item() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "jake");

    let item = create_item(
        &pool,
        seller.get_id(),
        "How to train your dragon".to_string(),
        "Ever wonder how?".to_string(),
        "You have to believe".to_string(),
        &tags(&["dragons", "training"]),
    )
    .unwrap();

    assert_eq!(item.get_slug().as_str(), "how-to-train-your-dragon");
    assert_eq!(item.get_title(), "How to train your dragon");
    assert_eq!(item.get_description(), "Ever wonder how?");
    assert_eq!(item.get_body(), "You have to believe");

    let view = get_item_view(&pool, "how-to-train-your-dragon", None).unwrap().unwrap();
    assert_eq!(view.seller.get_username(), "jake");
    assert_eq!(view.tags, tags(&["dragons", "training"]));
    assert_eq!(view.favorites_count, 0);
    assert!(!view.favorited);
}

#[test]
fn test_same_title_gets_unique_slug() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "jake");

    let first = create_simple_item(&pool, &seller, "Dragon Eggs");
    let second = create_simple_item(&pool, &seller, "Dragon Eggs");
    let third = create_simple_item(&pool, &seller, "dragon eggs!");

    assert_eq!(first.get_slug().as_str(), "dragon-eggs");
    assert_eq!(second.get_slug().as_str(), "dragon-eggs-2");
    assert_eq!(third.get_slug().as_str(), "dragon-eggs-3");
}

#[test]
fn test_duplicate_tag_names_share_one_tag() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "jake");

    create_item(&pool, seller.get_id(), "First item".to_string(), String::new(), String::new(), &tags(&["rust", "rust"])).unwrap();
    create_item(&pool, seller.get_id(), "Second item".to_string(), String::new(), String::new(), &tags(&["rust"])).unwrap();

    let all_tags = crate::repo::list_tags(&pool).unwrap();
    assert_eq!(all_tags.len(), 1);

    let view = get_item_view(&pool, "first-item", None).unwrap().unwrap();
    assert_eq!(view.tags, tags(&["rust"]));
}

#[test]
fn test_get_nonexistent_item() {
    let pool = setup_test_db();
    assert!(get_item_by_slug(&pool, "nope").unwrap().is_none());
    assert!(get_item_view(&pool, "nope", None).unwrap().is_none());
}

#[test]
fn test_update_item_rederives_slug_and_tags() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "jake");
    let item = create_item(&pool, seller.get_id(), "Old title".to_string(), "d".to_string(), "b".to_string(), &tags(&["old"])).unwrap();

    let updated = update_item(
        &pool,
        item.get_id(),
        ItemUpdate {
            title: "New title".to_string(),
            description: "d2".to_string(),
            body: "b2".to_string(),
            tags: Some(tags(&["new", "shiny"])),
        },
    )
    .unwrap();

    assert_eq!(updated.get_id(), item.get_id());
    assert_eq!(updated.get_slug().as_str(), "new-title");
    assert_eq!(updated.get_description(), "d2");
    assert!(updated.get_updated_at() >= item.get_updated_at());

    assert!(get_item_by_slug(&pool, "old-title").unwrap().is_none());
    let view = get_item_view(&pool, "new-title", None).unwrap().unwrap();
    assert_eq!(view.tags, tags(&["new", "shiny"]));
}

#[test]
fn test_update_item_same_title_keeps_slug_and_tags() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "jake");
    let item = create_item(&pool, seller.get_id(), "Stable".to_string(), "d".to_string(), "b".to_string(), &tags(&["keep"])).unwrap();

    let updated = update_item(
        &pool,
        item.get_id(),
        ItemUpdate {
            title: "Stable".to_string(),
            description: "changed".to_string(),
            body: "b".to_string(),
            tags: None,
        },
    )
    .unwrap();

    assert_eq!(updated.get_slug().as_str(), "stable");
    let view = get_item_view(&pool, "stable", None).unwrap().unwrap();
    assert_eq!(view.tags, tags(&["keep"]));
}

#[test]
fn test_delete_item_hides_item_and_comments() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "jake");
    let item = create_simple_item(&pool, &seller, "Short lived");
    create_comment(&pool, item.get_id(), seller.get_id(), "first!".to_string()).unwrap();

    delete_item(&pool, item.get_id()).unwrap();

    assert!(get_item_by_slug(&pool, "short-lived").unwrap().is_none());
    assert!(list_comments(&pool, item.get_id(), None).unwrap().is_empty());

    let (items, count) = list_items(&pool, &ItemFilter::default(), Page::default(), None).unwrap();
    assert!(items.is_empty());
    assert_eq!(count, 0);
}

#[test]
fn test_deleted_slug_can_be_reused() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "jake");
    let item = create_simple_item(&pool, &seller, "Reusable");
    delete_item(&pool, item.get_id()).unwrap();

    let again = create_simple_item(&pool, &seller, "Reusable");
    assert_eq!(again.get_slug().as_str(), "reusable");
}

#[test]
fn test_list_items_filters() {
    let pool = setup_test_db();
    let jake = create_test_user(&pool, "jake");
    let anna = create_test_user(&pool, "anna");

    create_item(&pool, jake.get_id(), "Jake one".to_string(), String::new(), String::new(), &tags(&["rust"])).unwrap();
    create_item(&pool, jake.get_id(), "Jake two".to_string(), String::new(), String::new(), &[]).unwrap();
    let anna_item = create_item(&pool, anna.get_id(), "Anna one".to_string(), String::new(), String::new(), &tags(&["rust"])).unwrap();
    favorite_item(&pool, anna_item.get_id(), jake.get_id()).unwrap();

    let (all, count) = list_items(&pool, &ItemFilter::default(), Page::default(), None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(count, 3);

    let by_tag = ItemFilter { tag: Some("rust".to_string()), ..Default::default() };
    let (items, count) = list_items(&pool, &by_tag, Page::default(), None).unwrap();
    assert_eq!(count, 2);
    assert_eq!(items.len(), 2);

    let by_seller = ItemFilter { seller: Some("jake".to_string()), ..Default::default() };
    let (items, count) = list_items(&pool, &by_seller, Page::default(), None).unwrap();
    assert_eq!(count, 2);
    assert!(items.iter().all(|view| view.seller.get_username() == "jake"));

    let by_favorite = ItemFilter { favorited: Some("jake".to_string()), ..Default::default() };
    let (items, count) = list_items(&pool, &by_favorite, Page::default(), None).unwrap();
    assert_eq!(count, 1);
    assert_eq!(items[0].item.get_id(), anna_item.get_id());
    assert_eq!(items[0].favorites_count, 1);
}

#[test]
fn test_list_items_tag_takes_precedence() {
    let pool = setup_test_db();
    let jake = create_test_user(&pool, "jake");
    let anna = create_test_user(&pool, "anna");
    create_item(&pool, jake.get_id(), "Jake one".to_string(), String::new(), String::new(), &[]).unwrap();
    create_item(&pool, anna.get_id(), "Anna one".to_string(), String::new(), String::new(), &tags(&["rust"])).unwrap();

    let filter = ItemFilter {
        tag: Some("rust".to_string()),
        seller: Some("jake".to_string()),
        favorited: None,
    };
    let (items, _) = list_items(&pool, &filter, Page::default(), None).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].seller.get_username(), "anna");
}

#[test]
fn test_list_items_unknown_filters_match_nothing() {
    let pool = setup_test_db();
    let jake = create_test_user(&pool, "jake");
    create_simple_item(&pool, &jake, "Something");

    for filter in [
        ItemFilter { tag: Some("missing".to_string()), ..Default::default() },
        ItemFilter { seller: Some("ghost".to_string()), ..Default::default() },
        ItemFilter { favorited: Some("ghost".to_string()), ..Default::default() },
        // Registered but has never sold anything
        ItemFilter { seller: Some("nobody".to_string()), ..Default::default() },
    ] {
        if filter.seller.as_deref() == Some("nobody") {
            create_test_user(&pool, "nobody");
        }
        let (items, count) = list_items(&pool, &filter, Page::default(), None).unwrap();
        assert!(items.is_empty(), "filter {:?} should match nothing", filter);
        assert_eq!(count, 0);
    }
}

#[test]
fn test_list_items_pagination() {
    let pool = setup_test_db();
    let jake = create_test_user(&pool, "jake");
    for i in 0..5 {
        create_simple_item(&pool, &jake, &format!("Item number {}", i));
    }

    let (items, count) = list_items(&pool, &ItemFilter::default(), Page { limit: 2, offset: 1 }, None).unwrap();
    assert_eq!(count, 5);
    assert_eq!(items.len(), 2);
    // Newest first
    assert_eq!(items[0].item.get_title(), "Item number 3");
    assert_eq!(items[1].item.get_title(), "Item number 2");
}

#[test]
fn test_viewer_specific_flags() {
    let pool = setup_test_db();
    let jake = create_test_user(&pool, "jake");
    let anna = create_test_user(&pool, "anna");
    let item = create_simple_item(&pool, &anna, "Anna's item");

    favorite_item(&pool, item.get_id(), jake.get_id()).unwrap();
    follow_user(&pool, jake.get_id(), anna.get_id()).unwrap();

    let as_jake = get_item_view(&pool, item.get_slug().as_str(), Some(jake.get_id())).unwrap().unwrap();
    assert!(as_jake.favorited);
    assert!(as_jake.seller_followed);
    assert_eq!(as_jake.favorites_count, 1);

    let anonymous = get_item_view(&pool, item.get_slug().as_str(), None).unwrap().unwrap();
    assert!(!anonymous.favorited);
    assert!(!anonymous.seller_followed);
    assert_eq!(anonymous.favorites_count, 1);
}

#[test]
fn test_item_feed_only_followed_sellers() {
    let pool = setup_test_db();
    let jake = create_test_user(&pool, "jake");
    let anna = create_test_user(&pool, "anna");
    let bob = create_test_user(&pool, "bob");

    let anna_old = create_simple_item(&pool, &anna, "Anna old");
    create_simple_item(&pool, &anna, "Anna new");
    create_simple_item(&pool, &bob, "Bob item");
    create_simple_item(&pool, &jake, "Jake item");

    follow_user(&pool, jake.get_id(), anna.get_id()).unwrap();

    // Touch the older item so it becomes the most recently updated
    update_item(
        &pool,
        anna_old.get_id(),
        ItemUpdate {
            title: "Anna old".to_string(),
            description: "edited".to_string(),
            body: "body".to_string(),
            tags: None,
        },
    )
    .unwrap();

    let (feed, count) = item_feed(&pool, jake.get_id(), Page::default()).unwrap();
    assert_eq!(count, 2);
    let titles: Vec<&str> = feed.iter().map(|view| view.item.get_title()).collect();
    assert_eq!(titles, vec!["Anna old", "Anna new"]);
    assert!(feed.iter().all(|view| view.seller_followed));
}

#[test]
fn test_item_feed_without_followees_is_empty() {
    let pool = setup_test_db();
    let jake = create_test_user(&pool, "jake");
    create_simple_item(&pool, &jake, "Own item");

    let (feed, count) = item_feed(&pool, jake.get_id(), Page::default()).unwrap();
    assert!(feed.is_empty());
    assert_eq!(count, 0);
}
