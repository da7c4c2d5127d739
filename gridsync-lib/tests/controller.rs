//! Coordination across tables of one controller.

mod common;

use gridsync_lib::grid::ElementRef;
use gridsync_lib::grid::GridApi;
use gridsync_lib::grid::MountPoint;

use common::*;

#[tokio::test(start_paused = true)]
async fn test_redraw_table_keeps_page() {
    let harness = Harness::new(
        FakeEndpoint::new(orders_payload(false, false)).with_page(numbered_rows(10)),
    );
    let (_session, grid) = harness.open_rendered("orders").await;
    grid.set_page(3);

    let inside = MountPoint::new("orders").descendant("tbody/tr/4/td/1/button");
    assert!(harness.controller.redraw_table(&inside));
    grid.idle().await;

    assert_eq!(grid.page(), 3);
    assert_eq!(harness.endpoint.last_post().field("start"), Some("30"));
}

#[tokio::test(start_paused = true)]
async fn test_redraw_table_outside_any_grid() {
    let harness = Harness::new(FakeEndpoint::new(orders_payload(false, false)));
    let (_session, grid) = harness.open_rendered("orders").await;

    assert!(!harness.controller.redraw_table(&ElementRef::new("sidebar/button")));
    assert_eq!(grid.draws_requested(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_redraw_all_tables() {
    let harness = Harness::new(FakeEndpoint::new(orders_payload(false, false)));
    let (_orders, orders_grid) = harness.open_rendered("orders").await;
    let (_invoices, invoices_grid) = harness.open_rendered("invoices").await;
    invoices_grid.set_visible(false);
    orders_grid.set_page(2);

    assert_eq!(harness.controller.redraw_all_tables(), 2);
    assert_eq!(orders_grid.draws_requested(), 1);
    assert_eq!(invoices_grid.draws_requested(), 1);
    assert_eq!(orders_grid.page(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_adjust_columns_skips_hidden_tables() {
    let harness = Harness::new(FakeEndpoint::new(orders_payload(false, false)));
    let (_orders, orders_grid) = harness.open_rendered("orders").await;
    let (_invoices, invoices_grid) = harness.open_rendered("invoices").await;
    invoices_grid.set_visible(false);

    let before = (orders_grid.column_adjustments(), invoices_grid.column_adjustments());
    assert_eq!(harness.controller.adjust_table_columns(), 1);
    assert_eq!(orders_grid.column_adjustments(), before.0 + 1);
    assert_eq!(invoices_grid.column_adjustments(), before.1);
}

#[tokio::test(start_paused = true)]
async fn test_table_outlives_discarded_handle() {
    let harness = Harness::new(
        FakeEndpoint::new(orders_payload(true, false)).with_page(numbered_rows(5)),
    );
    let mount = MountPoint::new("orders");
    drop(
        harness
            .controller
            .initialize_table(mount.clone(), ENDPOINT, None, None)
            .await
            .unwrap(),
    );

    let grid = harness.factory.grid(&mount).expect("grid kept alive by its table");
    grid.draw_now().await.unwrap();
    settle().await;
    assert_eq!(grid.rows().len(), 5);
    assert_eq!(grid.header_rows().len(), 1);

    assert_eq!(harness.controller.redraw_all_tables(), 1);
    grid.idle().await;
    assert!(harness.controller.redraw_table(&mount.descendant("tbody/tr/0")));
    grid.idle().await;

    assert_eq!(harness.endpoint.posts().len(), 3);
    let table = harness.controller.table(&mount).unwrap();
    assert!(table.is_composed());
}

#[tokio::test(start_paused = true)]
async fn test_registry_keyed_by_mount() {
    let harness = Harness::new(FakeEndpoint::new(orders_payload(false, false)));
    let (orders, _) = harness.open("orders").await;
    let (invoices, _) = harness.open("invoices").await;
    drop(invoices);
    assert_eq!(harness.controller.registry().len(), 2);

    let (replacement, _) = harness.open("orders").await;
    assert_eq!(harness.controller.registry().len(), 2);
    let current = harness.controller.table(&MountPoint::new("orders")).unwrap();
    assert_eq!(current.id(), replacement.id());
    assert_ne!(current.id(), orders.id());
}

#[tokio::test(start_paused = true)]
async fn test_destroy_table() {
    let harness = Harness::new(
        FakeEndpoint::new(orders_payload(false, false))
            .with_page(numbered_rows(2))
            .with_details("<p>order-1</p>"),
    );
    let mount = MountPoint::new("orders");
    let (session, grid) = harness.open_rendered("orders").await;

    assert!(harness.controller.destroy_table(&mount));
    assert!(!harness.controller.destroy_table(&mount));
    assert!(harness.controller.registry().is_empty());
    assert_eq!(harness.controller.redraw_all_tables(), 0);
    assert!(!harness.controller.redraw_table(&mount.descendant("tbody")));
    assert!(!session.dispatch(gridsync_lib::session::UiEvent::RowToolClick {
        row: gridsync_lib::grid::RowIndex(0),
    }));

    drop(session);
    drop(grid);
    assert!(harness.factory.grid(&mount).is_none());
    assert_eq!(harness.factory.live_grids(), 0);
}
