//! Overlay geometry as seen through a resolver input

mod helpers;

use helpers::{anchor_at, mount_with_viewport, ScriptedSearch};
use oj_resolver::{
    ManualViewport, OverlayGeometry, Rect, RectAnchor, ResolverInputConfig,
};
use pretty_assertions::assert_eq;
use std::rc::Rc;
use std::sync::Arc;

#[tokio::test]
async fn test_geometry_tracks_scroll_while_open() {
    let viewport = ManualViewport::new();
    let search = Arc::new(ScriptedSearch::new());
    let mut input = mount_with_viewport(ResolverInputConfig::default(), &search, viewport.clone());

    input.focus(anchor_at(50.0, 100.0, 180.0, 20.0));
    assert_eq!(
        input.geometry(),
        OverlayGeometry {
            top: 120.0,
            left: 50.0,
            min_width: 180.0
        }
    );

    viewport.scroll_by(0.0, 30.0);
    assert_eq!(input.geometry().top, 150.0);
    assert_eq!(input.geometry().left, 50.0);

    viewport.scroll_by(12.0, 0.0);
    assert_eq!(input.geometry().left, 62.0);
}

#[tokio::test]
async fn test_geometry_follows_resized_anchor() {
    let viewport = ManualViewport::new();
    let search = Arc::new(ScriptedSearch::new());
    let mut input = mount_with_viewport(ResolverInputConfig::default(), &search, viewport.clone());

    let anchor = Rc::new(RectAnchor::new(Some(Rect::new(20.0, 20.0, 200.0, 24.0))));
    input.focus(anchor.clone());

    anchor.set(Rect::new(40.0, 20.0, 320.0, 30.0));
    viewport.resize();
    assert_eq!(
        input.geometry(),
        OverlayGeometry {
            top: 50.0,
            left: 40.0,
            min_width: 320.0
        }
    );
}

#[tokio::test]
async fn test_listeners_released_on_every_exit_path() {
    let viewport = ManualViewport::new();
    let search = Arc::new(ScriptedSearch::new());
    let mut input = mount_with_viewport(ResolverInputConfig::default(), &search, viewport.clone());

    input.focus(anchor_at(0.0, 0.0, 100.0, 20.0));
    assert_eq!(viewport.listener_count(), 1);
    input.blur();
    assert_eq!(viewport.listener_count(), 0);

    input.focus(anchor_at(0.0, 0.0, 100.0, 20.0));
    input.select_entity(oj_types::Entity::new(1));
    assert_eq!(viewport.listener_count(), 0);

    input.focus(anchor_at(0.0, 0.0, 100.0, 20.0));
    input.close();
    assert_eq!(viewport.listener_count(), 0);

    input.focus(anchor_at(0.0, 0.0, 100.0, 20.0));
    drop(input);
    assert_eq!(viewport.listener_count(), 0);
}

#[tokio::test]
async fn test_geometry_frozen_after_close() {
    let viewport = ManualViewport::new();
    let search = Arc::new(ScriptedSearch::new());
    let mut input = mount_with_viewport(ResolverInputConfig::default(), &search, viewport.clone());

    input.focus(anchor_at(0.0, 10.0, 100.0, 20.0));
    input.blur();
    viewport.scroll_by(0.0, 500.0);

    assert_eq!(input.geometry().top, 30.0);
}

#[tokio::test]
async fn test_two_inputs_on_one_viewport() {
    let viewport = ManualViewport::new();
    let search = Arc::new(ScriptedSearch::new());
    let mut accounts =
        mount_with_viewport(ResolverInputConfig::default(), &search, viewport.clone());
    let mut problems =
        mount_with_viewport(ResolverInputConfig::default(), &search, viewport.clone());

    accounts.focus(anchor_at(0.0, 0.0, 100.0, 20.0));
    problems.focus(anchor_at(0.0, 200.0, 300.0, 20.0));
    viewport.scroll_by(0.0, 10.0);

    assert_eq!(accounts.geometry().top, 30.0);
    assert_eq!(problems.geometry().top, 230.0);
    assert_eq!(problems.geometry().min_width, 300.0);

    accounts.blur();
    assert_eq!(viewport.listener_count(), 1);
}

#[tokio::test]
async fn test_unattached_anchor_keeps_default_geometry() {
    let viewport = ManualViewport::new();
    let search = Arc::new(ScriptedSearch::new());
    let mut input = mount_with_viewport(ResolverInputConfig::default(), &search, viewport.clone());

    input.focus(Rc::new(RectAnchor::new(None)));
    assert!(input.is_open());
    assert!(!input.positioner().is_active());
    assert_eq!(input.geometry(), OverlayGeometry::default());
    assert_eq!(viewport.listener_count(), 0);
}
