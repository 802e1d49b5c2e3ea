//! Overlay positioning
//!
//! Keeps the screen rectangle of a floating panel in sync with the input it
//! hangs under. The panel is drawn in a root-level layer, so geometry is
//! expressed in document coordinates (client rect plus scroll offsets).
//!
//! The positioner talks to the host through two small seams:
//! - [`Anchor`]: where the input currently is (or `None` when not attached)
//! - [`Viewport`]: current scroll offsets and resize/scroll notifications
//!
//! Listener registration is scoped: [`Viewport::subscribe`] hands back a
//! [`Subscription`] that unregisters when disposed or dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

// =============================================================================
// GEOMETRY
// =============================================================================

/// Bounding rectangle of an element relative to the viewport (client coords)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Current document scroll position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

/// Where the floating panel goes, in document coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayGeometry {
    pub top: f64,
    pub left: f64,
    pub min_width: f64,
}

impl OverlayGeometry {
    /// Directly below `anchor`, left-aligned, at least as wide
    pub fn below(anchor: Rect, scroll: ScrollOffset) -> Self {
        Self {
            top: anchor.top + scroll.y + anchor.height,
            left: anchor.left + scroll.x,
            min_width: anchor.width,
        }
    }
}

// =============================================================================
// HOST SEAMS
// =============================================================================

/// The element an overlay is anchored to
pub trait Anchor {
    /// Client rect of the element, `None` while it is not attached/rendered
    fn bounding_rect(&self) -> Option<Rect>;
}

/// Viewport notifications that may move an anchor on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Resize,
    Scroll,
}

pub type ViewportListener = Rc<dyn Fn(ViewportEvent)>;

/// Source of scroll offsets and resize/scroll events
pub trait Viewport {
    fn scroll_offset(&self) -> ScrollOffset;

    /// Register `listener` until the returned subscription is disposed
    fn subscribe(&self, listener: ViewportListener) -> Subscription;
}

/// Disposer for a registered listener.
///
/// Unregisters exactly once, either via [`Subscription::dispose`] or on drop.
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription with nothing to release
    pub fn empty() -> Self {
        Self { dispose: None }
    }

    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.dispose.is_some())
            .finish()
    }
}

// =============================================================================
// HOST-DRIVEN BACKENDS
// =============================================================================

/// Anchor whose rect is pushed in by the host (egui frames, tests)
#[derive(Debug, Default)]
pub struct RectAnchor {
    rect: Cell<Option<Rect>>,
}

impl RectAnchor {
    pub fn new(rect: Option<Rect>) -> Self {
        Self {
            rect: Cell::new(rect),
        }
    }

    pub fn set(&self, rect: Rect) {
        self.rect.set(Some(rect));
    }

    pub fn detach(&self) {
        self.rect.set(None);
    }
}

impl Anchor for RectAnchor {
    fn bounding_rect(&self) -> Option<Rect> {
        self.rect.get()
    }
}

/// Viewport driven by explicit calls instead of a windowing system.
///
/// Clones share the same scroll position and listener list.
#[derive(Clone, Default)]
pub struct ManualViewport {
    inner: Rc<ManualViewportInner>,
}

#[derive(Default)]
struct ManualViewportInner {
    scroll: Cell<ScrollOffset>,
    listeners: RefCell<Vec<(u64, ViewportListener)>>,
    next_id: Cell<u64>,
}

impl ManualViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        self.inner.scroll.set(ScrollOffset { x, y });
        self.emit(ViewportEvent::Scroll);
    }

    pub fn scroll_by(&self, dx: f64, dy: f64) {
        let current = self.inner.scroll.get();
        self.scroll_to(current.x + dx, current.y + dy);
    }

    pub fn resize(&self) {
        self.emit(ViewportEvent::Resize);
    }

    /// Deliver `event` to every listener registered at call time
    pub fn emit(&self, event: ViewportEvent) {
        // Snapshot so listeners may unsubscribe while being notified
        let listeners: Vec<ViewportListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl Viewport for ManualViewport {
    fn scroll_offset(&self) -> ScrollOffset {
        self.inner.scroll.get()
    }

    fn subscribe(&self, listener: ViewportListener) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, listener));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }
}

// =============================================================================
// POSITIONER
// =============================================================================

pub type GeometryCallback = Rc<dyn Fn(OverlayGeometry)>;

struct TrackingState {
    anchor: Option<Rc<dyn Anchor>>,
    geometry: OverlayGeometry,
}

/// Tracks one anchor and keeps the overlay geometry current
pub struct OverlayPositioner {
    viewport: Rc<dyn Viewport>,
    state: Rc<RefCell<TrackingState>>,
    on_geometry: Option<GeometryCallback>,
    subscription: Option<Subscription>,
}

impl OverlayPositioner {
    pub fn new(viewport: Rc<dyn Viewport>) -> Self {
        Self {
            viewport,
            state: Rc::new(RefCell::new(TrackingState {
                anchor: None,
                geometry: OverlayGeometry::default(),
            })),
            on_geometry: None,
            subscription: None,
        }
    }

    /// Callback receiving geometry whenever it changes.
    ///
    /// Takes effect from the next `activate`.
    pub fn set_on_geometry(&mut self, callback: GeometryCallback) {
        self.on_geometry = Some(callback);
    }

    /// Start tracking `anchor`.
    ///
    /// No-op when the anchor is not attached; the last geometry is kept.
    pub fn activate(&mut self, anchor: Rc<dyn Anchor>) {
        self.deactivate();

        if anchor.bounding_rect().is_none() {
            tracing::debug!("overlay anchor not attached, positioner stays idle");
            return;
        }

        self.state.borrow_mut().anchor = Some(anchor);
        recompute(
            self.viewport.as_ref(),
            &self.state,
            self.on_geometry.as_ref(),
            true,
        );

        let state = Rc::downgrade(&self.state);
        let viewport: Weak<dyn Viewport> = Rc::downgrade(&self.viewport);
        let on_geometry = self.on_geometry.clone();
        let listener: ViewportListener = Rc::new(move |event| {
            if let (Some(state), Some(viewport)) = (state.upgrade(), viewport.upgrade()) {
                tracing::trace!(?event, "viewport changed, repositioning overlay");
                recompute(viewport.as_ref(), &state, on_geometry.as_ref(), false);
            }
        });
        self.subscription = Some(self.viewport.subscribe(listener));
    }

    /// Stop tracking and drop viewport listeners. Idempotent.
    pub fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
        self.state.borrow_mut().anchor = None;
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Recompute from the tracked anchor outside of viewport events
    /// (immediate-mode hosts call this once per frame)
    pub fn refresh(&self) {
        recompute(
            self.viewport.as_ref(),
            &self.state,
            self.on_geometry.as_ref(),
            false,
        );
    }

    pub fn current_geometry(&self) -> OverlayGeometry {
        self.state.borrow().geometry
    }
}

impl Drop for OverlayPositioner {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn recompute(
    viewport: &dyn Viewport,
    state: &RefCell<TrackingState>,
    on_geometry: Option<&GeometryCallback>,
    force_notify: bool,
) {
    let geometry = {
        let mut state = state.borrow_mut();
        let Some(rect) = state.anchor.as_ref().and_then(|anchor| anchor.bounding_rect()) else {
            return;
        };
        let geometry = OverlayGeometry::below(rect, viewport.scroll_offset());
        if geometry == state.geometry && !force_notify {
            return;
        }
        state.geometry = geometry;
        geometry
    };

    if let Some(callback) = on_geometry {
        callback(geometry);
    }
}
