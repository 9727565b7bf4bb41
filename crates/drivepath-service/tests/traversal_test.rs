//! Integration tests for folder traversal.

mod helpers;

use std::time::Duration;

use futures::StreamExt;

use drivepath_core::types::{RemoteResource, ResourceKind};
use drivepath_core::{AppError, ErrorKind};
use drivepath_query::Query;
use drivepath_remote::Operation;
use drivepath_service::CallContext;

use helpers::TestDrive;

/// `R/{fileA1, B/{fileB1, C/{fileC1}}}`; returns R.
fn seed_tree(t: &TestDrive) -> RemoteResource {
    let r = t.drive.seed_folder("R", None);
    t.drive.seed_file("fileA1", Some(&r.id), "a1");
    let b = t.drive.seed_folder("B", Some(&r.id));
    t.drive.seed_file("fileB1", Some(&b.id), "b1");
    let c = t.drive.seed_folder("C", Some(&b.id));
    t.drive.seed_file("fileC1", Some(&c.id), "c1");
    r
}

fn names(resources: &[RemoteResource]) -> Vec<&str> {
    resources.iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn test_deep_traversal_is_breadth_first() {
    let t = TestDrive::new();
    let r = seed_tree(&t);
    let files_only = Query::new().is_not_type(ResourceKind::Folder);

    let found = t
        .service
        .inner_resources(&t.ctx, &r, Some(&files_only), true)
        .collect_all()
        .await
        .unwrap();
    assert_eq!(names(&found), ["fileA1", "fileB1", "fileC1"]);
}

#[tokio::test]
async fn test_deep_traversal_without_filter_includes_folders() {
    let t = TestDrive::new();
    let r = seed_tree(&t);
    let found = t
        .service
        .inner_resources(&t.ctx, &r, None, true)
        .collect_all()
        .await
        .unwrap();
    assert_eq!(names(&found), ["fileA1", "B", "fileB1", "C", "fileC1"]);
}

#[tokio::test]
async fn test_shallow_traversal_lists_direct_children() {
    let t = TestDrive::new();
    let r = seed_tree(&t);
    let found = t
        .service
        .inner_resources(&t.ctx, &r, None, false)
        .collect_all()
        .await
        .unwrap();
    assert_eq!(names(&found), ["fileA1", "B"]);
    assert_eq!(t.drive.counts().list, 1);
}

#[tokio::test]
async fn test_trashed_children_are_listed_only_on_request() {
    let t = TestDrive::new();
    let r = t.drive.seed_folder("R", None);
    let gone = t.drive.seed_file("gone.txt", Some(&r.id), "x");
    t.drive.seed_file("kept.txt", Some(&r.id), "x");
    t.drive.trash(&gone.id);

    let found = t
        .service
        .inner_resources(&t.ctx, &r, None, false)
        .collect_all()
        .await
        .unwrap();
    assert_eq!(names(&found), ["kept.txt"]);

    let trash_only = Query::new().include_trashed(true);
    let trashed = t
        .service
        .inner_resources(&t.ctx, &r, Some(&trash_only), false)
        .collect_all()
        .await
        .unwrap();
    assert_eq!(names(&trashed), ["gone.txt"]);
}

#[tokio::test]
async fn test_non_folder_yields_nothing() {
    let t = TestDrive::new();
    let file = t.drive.seed_file("plain.txt", None, "x");

    let mut stream = t.service.inner_resources(&t.ctx, &file, None, true);
    assert!(stream.next().await.is_none());
    assert_eq!(t.drive.counts().total(), 0);
}

#[tokio::test]
async fn test_failure_mid_stream_keeps_earlier_items() {
    let t = TestDrive::with_page_size(1);
    let r = t.drive.seed_folder("R", None);
    for i in 0..3 {
        t.drive.seed_file(&format!("f{i}.txt"), Some(&r.id), "x");
    }
    t.drive
        .fail_at(Operation::List, 2, AppError::remote("listing broke"));

    let mut stream = t.service.inner_resources(&t.ctx, &r, None, false);
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.name, "f0.txt");
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(err.is(ErrorKind::Remote));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_collect_all_stops_at_first_error() {
    let t = TestDrive::new();
    let r = t.drive.seed_folder("R", None);
    t.drive
        .fail_next(Operation::List, AppError::transient("503"));

    let err = t
        .service
        .inner_resources(&t.ctx, &r, None, false)
        .collect_all()
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Transient));
}

#[tokio::test]
async fn test_slow_consumer_throttles_listing() {
    let t = TestDrive::with_page_size(10);
    let r = t.drive.seed_folder("R", None);
    for i in 0..200 {
        t.drive.seed_file(&format!("f{i:03}.txt"), Some(&r.id), "x");
    }

    let stream = t.service.inner_resources(&t.ctx, &r, None, false);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let listed_while_idle = t.drive.counts().list;
    assert!(listed_while_idle < 20, "listed {listed_while_idle} pages unread");

    let all = stream.collect_all().await.unwrap();
    assert_eq!(all.len(), 200);
    assert_eq!(t.drive.counts().list, 20);
}

#[tokio::test]
async fn test_dropping_the_stream_stops_the_walk() {
    let t = TestDrive::with_page_size(10);
    let r = t.drive.seed_folder("R", None);
    for i in 0..200 {
        t.drive.seed_file(&format!("f{i:03}.txt"), Some(&r.id), "x");
    }

    let mut stream = t.service.inner_resources(&t.ctx, &r, None, false);
    stream.next().await.unwrap().unwrap();
    drop(stream);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(t.drive.counts().list < 20);
}

#[tokio::test]
async fn test_cancelled_context_ends_traversal() {
    let t = TestDrive::new();
    let r = seed_tree(&t);
    let ctx = CallContext::new();
    ctx.cancel();

    let mut stream = t.service.inner_resources(&ctx, &r, None, true);
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(err.is(ErrorKind::Cancelled));
    assert!(stream.next().await.is_none());
    assert_eq!(t.drive.counts().total(), 0);
}
