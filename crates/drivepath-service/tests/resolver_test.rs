//! Integration tests for path resolution and the path cache.

mod helpers;

use drivepath_core::ErrorKind;
use drivepath_core::traits::RemoteDrive;
use drivepath_query::Query;
use drivepath_service::CallContext;

use helpers::TestDrive;

#[tokio::test]
async fn test_second_resolve_is_a_cache_hit() {
    let t = TestDrive::new();
    let (_, _, file_id) = t.seed_nested("file.txt");

    let first = t.service.find_file(&t.ctx, "A/B/file.txt", None).await.unwrap();
    assert_eq!(first.unwrap().id, file_id);
    assert_eq!(t.drive.counts().list, 3);

    t.drive.reset_counts();
    let second = t.service.find_file(&t.ctx, "A\\B//file.txt", None).await.unwrap();
    assert_eq!(second.unwrap().id, file_id);
    let counts = t.drive.counts();
    assert_eq!(counts.list, 0);
    assert_eq!(counts.get, 1);
}

#[tokio::test]
async fn test_ancestors_are_cached_while_resolving() {
    let t = TestDrive::new();
    let (a, b, _) = t.seed_nested("file.txt");
    t.service.find_file(&t.ctx, "A/B/file.txt", None).await.unwrap();
    assert_eq!(t.cache.get_id("A").await, Some(a));
    assert_eq!(t.cache.get_id("A/B").await, Some(b));
}

#[tokio::test]
async fn test_trashed_cache_hit_falls_through_to_search() {
    let t = TestDrive::new();
    let old = t.drive.seed_folder("A", None);
    t.service.find_folder(&t.ctx, "A", None).await.unwrap();

    t.drive.trash(&old.id);
    let fresh = t.drive.seed_folder("A", None);

    let found = t.service.find_folder(&t.ctx, "A", None).await.unwrap().unwrap();
    assert_eq!(found.id, fresh.id);
    assert_eq!(t.cache.get_id("A").await, Some(fresh.id));
}

#[tokio::test]
async fn test_remotely_deleted_cache_entry_is_dropped() {
    let t = TestDrive::new();
    let folder = t.drive.seed_folder("A", None);
    t.service.find_folder(&t.ctx, "A", None).await.unwrap();
    t.drive.delete(&folder.id).await.unwrap();

    assert!(t.service.find_folder(&t.ctx, "A", None).await.unwrap().is_none());
    assert_eq!(t.cache.get_id("A").await, None);
}

#[tokio::test]
async fn test_missing_ancestor_resolves_to_none() {
    let t = TestDrive::new();
    t.drive.seed_folder("A", None);
    let found = t.service.find_resource(&t.ctx, "A/missing/leaf", None).await;
    assert!(found.unwrap().is_none());
}

#[tokio::test]
async fn test_extra_filter_constrains_leaf() {
    let t = TestDrive::new();
    let mut tagged = t.drive.seed_file("tagged.txt", None, "x");
    tagged.properties.insert("tag".into(), "blue".into());
    t.drive.seed(tagged.clone());

    let blue = Query::new().has_property_value("tag", "blue");
    let red = Query::new().has_property_value("tag", "red");
    let hit = t.service.find_file(&t.ctx, "tagged.txt", Some(&blue)).await.unwrap();
    assert_eq!(hit.unwrap().id, tagged.id);

    t.cache.clear().await;
    let miss = t.service.find_file(&t.ctx, "tagged.txt", Some(&red)).await.unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_names_with_quotes_resolve() {
    let t = TestDrive::new();
    let folder = t.drive.seed_folder("Bob's files", None);
    let file = t.drive.seed_file("it's \"done\".txt", Some(&folder.id), "x");

    let found = t
        .service
        .find_file(&t.ctx, "Bob's files/it's \"done\".txt", None)
        .await
        .unwrap();
    assert_eq!(found.unwrap().id, file.id);
    assert!(t.drive.list_queries().iter().any(|q| q.contains("Bob\\'s files")));
}

#[tokio::test]
async fn test_duplicate_names_pick_earliest_created() {
    let t = TestDrive::new();
    let early = t.drive.seed_file("early.txt", None, "x");
    let late = t.drive.seed_file("dup.txt", None, "late");

    let mut earliest = late.clone();
    earliest.id = "dup-earliest".into();
    earliest.created_time = early.created_time;
    t.drive.seed(earliest);

    let found = t.service.find_file(&t.ctx, "dup.txt", None).await.unwrap();
    assert_eq!(found.unwrap().id, "dup-earliest");
}

#[tokio::test]
async fn test_duplicate_without_creation_time_sorts_last() {
    let t = TestDrive::new();
    let timed = t.drive.seed_file("dup.txt", None, "x");
    let mut untimed = timed.clone();
    untimed.id = "dup-untimed".into();
    untimed.created_time = None;
    t.drive.seed(untimed);

    let found = t.service.find_file(&t.ctx, "dup.txt", None).await.unwrap();
    assert_eq!(found.unwrap().id, timed.id);
}

#[tokio::test]
async fn test_listing_follows_every_page() {
    let t = TestDrive::with_page_size(1);
    for i in 0..3 {
        t.drive.seed_file(&format!("f{i}.txt"), None, "x");
    }
    let all = t
        .service
        .query_resources(&t.ctx, &Query::new().is_parent("root"))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(t.drive.counts().list, 3);
}

#[tokio::test]
async fn test_create_folder_creates_missing_ancestors_once() {
    let t = TestDrive::new();

    let y = t.service.create_folder(&t.ctx, "X/Y").await.unwrap();
    assert_eq!(y.name, "Y");
    assert_eq!(t.drive.counts().create, 2);
    assert!(t.cache.get_id("X").await.is_some());
    assert_eq!(t.cache.get_id("X/Y").await, Some(y.id.clone()));

    let err = t.service.create_folder(&t.ctx, "X/Y").await.unwrap_err();
    assert!(err.is(ErrorKind::AlreadyExists));
    assert!(err.message.contains("'Y'"));
    assert_eq!(t.drive.counts().create, 2);
}

#[tokio::test]
async fn test_ensure_folder_reuses_existing() {
    let t = TestDrive::new();
    let existing = t.drive.seed_folder("X", None);
    let ensured = t.service.ensure_folder(&t.ctx, "X").await.unwrap();
    assert_eq!(ensured.id, existing.id);
    assert_eq!(t.drive.counts().create, 0);
}

#[tokio::test]
async fn test_cancelled_call_leaves_cache_untouched() {
    let t = TestDrive::new();
    let ctx = CallContext::new();
    ctx.cancel();

    let err = t.service.create_folder(&ctx, "X/Y").await.unwrap_err();
    assert!(err.is(ErrorKind::Cancelled));
    assert_eq!(t.drive.counts().total(), 0);
    assert!(t.cache.is_empty().await);
}

#[tokio::test]
async fn test_full_name_at_root_is_own_name() {
    let t = TestDrive::new();
    let file = t.drive.seed_file("top.txt", None, "x");
    let name = t.service.full_name(&t.ctx, &file).await.unwrap();
    assert_eq!(name, "top.txt");
}

#[tokio::test]
async fn test_full_name_nested_then_memoized() {
    let t = TestDrive::new();
    let (_, _, file_id) = t.seed_nested("resource");
    let file = t.drive.peek(&file_id).unwrap();

    let name = t.service.full_name(&t.ctx, &file).await.unwrap();
    assert_eq!(name, "A/B/resource");
    assert!(t.cache.get_id("A/B").await.is_some());

    t.drive.reset_counts();
    let again = t.service.full_name(&t.ctx, &file).await.unwrap();
    assert_eq!(again, "A/B/resource");
    assert_eq!(t.drive.counts().total(), 0);
}

#[tokio::test]
async fn test_full_name_under_concrete_root_id() {
    let t = TestDrive::with_root_folder("my-drive");
    let file = t.drive.seed_file("top.txt", None, "x");
    assert_eq!(file.parent_id.as_deref(), Some("my-drive"));

    let name = t.service.full_name(&t.ctx, &file).await.unwrap();
    assert_eq!(name, "top.txt");
    assert_eq!(t.drive.counts().list, 1);
    assert_eq!(t.drive.counts().get, 0);
    assert_eq!(t.cache.get_id("top.txt").await, Some(file.id));
}

#[tokio::test]
async fn test_full_name_nested_under_concrete_root_id() {
    let t = TestDrive::with_root_folder("my-drive");
    let (a, b, file_id) = t.seed_nested("resource");
    let file = t.drive.peek(&file_id).unwrap();

    let name = t.service.full_name(&t.ctx, &file).await.unwrap();
    assert_eq!(name, "A/B/resource");
    assert_eq!(t.drive.counts().list, 3);
    assert_eq!(t.drive.counts().get, 2);
    assert_eq!(t.cache.get_id("A").await, Some(a));
    assert_eq!(t.cache.get_id("A/B").await, Some(b));

    t.drive.reset_counts();
    assert_eq!(t.service.full_name(&t.ctx, &file).await.unwrap(), "A/B/resource");
    assert_eq!(t.drive.counts().total(), 0);
}

#[tokio::test]
async fn test_parent_of_top_level_under_concrete_root_id_is_none() {
    let t = TestDrive::with_root_folder("my-drive");
    let (a, b, _) = t.seed_nested("f.txt");
    let folder_a = t.drive.peek(&a).unwrap();
    let folder_b = t.drive.peek(&b).unwrap();

    assert!(t.service.parent_of(&t.ctx, &folder_a).await.unwrap().is_none());
    assert_eq!(t.service.parent_of(&t.ctx, &folder_b).await.unwrap().unwrap().id, a);

    let found = t.service.find_file(&t.ctx, "A/B/f.txt", None).await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_parent_of_root_level_is_none() {
    let t = TestDrive::new();
    let (a, b, _) = t.seed_nested("f.txt");
    let folder_b = t.drive.peek(&b).unwrap();
    let folder_a = t.drive.peek(&a).unwrap();

    let parent = t.service.parent_of(&t.ctx, &folder_b).await.unwrap();
    assert_eq!(parent.unwrap().id, a);
    assert!(t.service.parent_of(&t.ctx, &folder_a).await.unwrap().is_none());
}
