//! Integration tests for the feed grid: paging through the fixture backend,
//! relayout on view-mode change, and directional navigation.

use std::sync::Arc;

use feedgrid::app::{App, AppEvent, Tab, Viewport};
use feedgrid::config::Config;
use feedgrid::feed::{spawn_page_load, FixtureOptions, FixtureService, Item, PageSource};
use feedgrid::layout::Direction;
use feedgrid::preferences::ViewMode;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

const TIMELINE: &str = include_str!("../demos/timeline.json");

fn backend(page_size: usize) -> Arc<FixtureService> {
    let options = FixtureOptions {
        page_size,
        ..FixtureOptions::default()
    };
    Arc::new(FixtureService::from_json(TIMELINE, options).unwrap())
}

async fn load_posts(app: &mut App, rx: &mut mpsc::Receiver<AppEvent>) {
    match rx.recv().await.expect("channel open") {
        AppEvent::PostsLoaded(loaded) => app.apply_posts_loaded(loaded),
        _ => panic!("expected a posts page"),
    }
}

fn app(backend: &Arc<FixtureService>, mode: ViewMode) -> App {
    let mut app = App::new(Arc::clone(backend), &Config::default(), mode, None);
    app.viewport = Viewport {
        rows: 20,
        column_cells: 30,
    };
    app
}

#[tokio::test]
async fn test_paging_appends_without_moving_focus() {
    let backend = backend(5);
    let mut app = app(&backend, ViewMode::Triple);
    let (tx, mut rx) = mpsc::channel(8);

    let request = app.begin_reload(Tab::Feed);
    spawn_page_load::<_, Item, _>(Arc::clone(&backend), request, tx.clone());
    load_posts(&mut app, &mut rx).await;
    assert_eq!(app.posts.len(), 5);
    assert_eq!(app.posts.focus(), Some(0));

    // Five cards over three columns: focus is already near the end of its column
    assert!(app.needs_more());
    let request = app.begin_next_page(Tab::Feed).expect("more pages");
    assert_eq!(request.cursor.as_deref(), Some("5"));
    // A second request while one is loading is refused
    assert!(app.begin_next_page(Tab::Feed).is_none());

    spawn_page_load::<_, Item, _>(Arc::clone(&backend), request, tx.clone());
    load_posts(&mut app, &mut rx).await;
    assert_eq!(app.posts.len(), 10);
    assert_eq!(app.posts.focus(), Some(0));

    let request = app.begin_next_page(Tab::Feed).expect("last page");
    spawn_page_load::<_, Item, _>(Arc::clone(&backend), request, tx);
    load_posts(&mut app, &mut rx).await;
    assert_eq!(app.posts.len(), 12);
    assert!(app.posts.pagination.is_exhausted());
    assert!(app.begin_next_page(Tab::Feed).is_none());
}

#[tokio::test]
async fn test_partition_is_balanced_and_ordered() {
    let backend = backend(20);
    let mut app = app(&backend, ViewMode::Triple);
    let page = PageSource::<Item>::fetch_page(&*backend, None).await.unwrap();
    let request = app.begin_reload(Tab::Feed);
    app.apply_posts_loaded(feedgrid::feed::PageLoaded {
        generation: request.generation,
        replace: true,
        result: Ok(page),
    });

    let partition = app.posts.partition();
    let lengths = partition.column_lengths();
    assert_eq!(lengths.iter().sum::<usize>(), 12);
    let (min, max) = (lengths.iter().min().unwrap(), lengths.iter().max().unwrap());
    assert!(max - min <= 1, "lengths {lengths:?}");

    for column in partition.columns() {
        let indices: Vec<usize> = column.iter().map(|e| e.original_index).collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]), "column {indices:?}");
    }
}

#[tokio::test]
async fn test_navigation_stays_in_bounds_and_survives_relayout() {
    let backend = backend(20);
    let mut app = app(&backend, ViewMode::Triple);
    let (tx, mut rx) = mpsc::channel(8);
    let request = app.begin_reload(Tab::Feed);
    spawn_page_load::<_, Item, _>(Arc::clone(&backend), request, tx);
    load_posts(&mut app, &mut rx).await;

    // Walk to the bottom of the first column
    while app.move_focus(Direction::Down) {}
    let bottom = app.posts.focus().unwrap();
    let (column, row) = app.posts.partition().locate(bottom).unwrap();
    assert_eq!(column, 0);
    assert_eq!(row + 1, app.posts.partition().column(0).unwrap().len());

    // Idempotent at the edges
    assert!(!app.move_focus(Direction::Down));
    assert!(!app.move_focus(Direction::Left));

    app.move_focus(Direction::Right);
    let focused = app.posts.focus().unwrap();
    assert!(focused < app.posts.len());
    assert_eq!(app.posts.partition().locate(focused).map(|(c, _)| c), Some(1));

    // Relayout keeps the focused item
    app.cycle_view_mode();
    assert_eq!(app.view_mode, ViewMode::Single);
    assert_eq!(app.posts.columns(), 1);
    assert_eq!(app.posts.focus(), Some(focused));
    assert_eq!(app.posts.partition().locate(focused), Some((0, focused)));
}
