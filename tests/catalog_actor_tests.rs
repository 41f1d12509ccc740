mod common;

use common::{StubSource, post, practitioner, therapy};
use wellness_hub::service::{CacheStatus, CollectionKind, catalog_actor};
use wellness_hub::types::PostBoard;

#[tokio::test]
async fn first_read_loads_the_collection() {
    let source = StubSource::new();
    source.set_practitioners(vec![
        practitioner(1, "Ana Silva", &["Reiki"]),
        practitioner(2, "Juliana Barbosa", &["Yoga"]),
    ]);
    let catalog = catalog_actor::spawn(source.clone()).await.unwrap();

    let view = catalog.practitioners().await.unwrap();

    assert_eq!(view.status, CacheStatus::Loaded);
    assert_eq!(view.items.len(), 2);
    assert!(view.refreshed_at.is_some());
    assert_eq!(source.fetch_count(CollectionKind::Practitioners), 1);

    // Loaded snapshots are served without another fetch.
    catalog.practitioners().await.unwrap();
    assert_eq!(source.fetch_count(CollectionKind::Practitioners), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let source = StubSource::new();
    source.set_posts(PostBoard::Forum, vec![post(1, "Geral", 0), post(2, "Geral", 3)]);
    let catalog = catalog_actor::spawn(source.clone()).await.unwrap();
    assert_eq!(catalog.posts(PostBoard::Forum).await.unwrap().items.len(), 2);
    let loaded_at = catalog.posts(PostBoard::Forum).await.unwrap().refreshed_at;

    source.fail(CollectionKind::Forum, "table is gone");
    let status = catalog.reload(CollectionKind::Forum).await.unwrap();

    assert_eq!(status.label(), "errored");
    assert!(status.error().unwrap().contains("table is gone"));
    let view = catalog.posts(PostBoard::Forum).await.unwrap();
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.refreshed_at, loaded_at);

    source.recover(CollectionKind::Forum);
    source.set_posts(PostBoard::Forum, vec![post(3, "Geral", 0)]);
    assert_eq!(
        catalog.reload(CollectionKind::Forum).await.unwrap(),
        CacheStatus::Loaded
    );
    let view = catalog.posts(PostBoard::Forum).await.unwrap();
    assert_eq!(view.items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3]);
}

#[tokio::test]
async fn failed_first_load_serves_empty_errored_view() {
    let source = StubSource::new();
    source.fail(CollectionKind::Therapies, "offline");
    let catalog = catalog_actor::spawn(source).await.unwrap();

    let view = catalog.therapies().await.unwrap();

    assert!(view.items.is_empty());
    assert!(matches!(view.status, CacheStatus::Errored { .. }));
    assert!(view.refreshed_at.is_none());
}

#[tokio::test]
async fn duplicate_ids_are_dropped_keeping_first() {
    let source = StubSource::new();
    let mut dup = practitioner(1, "Second Copy", &[]);
    dup.bio = "dup".to_string();
    source.set_practitioners(vec![
        practitioner(1, "First Copy", &[]),
        practitioner(2, "Other", &[]),
        dup,
    ]);
    let catalog = catalog_actor::spawn(source).await.unwrap();

    let view = catalog.practitioners().await.unwrap();

    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].name, "First Copy");
}

#[tokio::test]
async fn boards_are_cached_independently() {
    let source = StubSource::new();
    source.set_posts(PostBoard::Forum, vec![post(1, "Geral", 0)]);
    source.set_posts(PostBoard::Feed, vec![post(10, "Foto", 0), post(11, "Foto", 0)]);
    let catalog = catalog_actor::spawn(source.clone()).await.unwrap();

    assert_eq!(catalog.posts(PostBoard::Feed).await.unwrap().items.len(), 2);
    assert_eq!(source.fetch_count(CollectionKind::Forum), 0);
    assert_eq!(catalog.posts(PostBoard::Forum).await.unwrap().items.len(), 1);
}

#[tokio::test]
async fn reload_all_reports_every_collection() {
    let source = StubSource::new();
    source.set_therapies(vec![therapy(1, "Reiki")]);
    source.fail(CollectionKind::Feed, "nope");
    let catalog = catalog_actor::spawn(source).await.unwrap();

    let results = catalog.reload_all().await;

    assert_eq!(results.len(), CollectionKind::ALL.len());
    for (kind, result) in results {
        let status = result.unwrap();
        match kind {
            CollectionKind::Feed => assert_eq!(status.label(), "errored"),
            _ => assert_eq!(status, CacheStatus::Loaded),
        }
    }
}

#[tokio::test]
async fn fire_and_forget_refresh_eventually_lands() {
    let source = StubSource::new();
    source.set_therapies(vec![therapy(1, "Reiki")]);
    let catalog = catalog_actor::spawn(source.clone()).await.unwrap();
    assert_eq!(catalog.therapies().await.unwrap().items.len(), 1);

    source.set_therapies(vec![therapy(1, "Reiki"), therapy(2, "Yoga")]);
    catalog.refresh(CollectionKind::Therapies);

    let mut len = 0;
    for _ in 0..50 {
        len = catalog.therapies().await.unwrap().items.len();
        if len == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(len, 2);
}
