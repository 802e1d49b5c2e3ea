//! Browser backend for the overlay positioner (wasm32 only)
//!
//! Scroll is captured on the window in the capture phase, so scrolling any
//! ancestor container repositions the overlay, not only the document itself.

use crate::overlay::{Anchor, Rect, ScrollOffset, Subscription, Viewport, ViewportEvent, ViewportListener};
use gloo::events::{EventListener, EventListenerOptions};
use web_sys::{Element, Window};

/// DOM element used as an overlay anchor
pub struct DomAnchor {
    element: Element,
}

impl DomAnchor {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl Anchor for DomAnchor {
    fn bounding_rect(&self) -> Option<Rect> {
        if !self.element.is_connected() {
            return None;
        }
        let rect = self.element.get_bounding_client_rect();
        Some(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
    }
}

/// The browser window as a [`Viewport`]
pub struct DomViewport {
    window: Window,
}

impl DomViewport {
    /// `None` outside a browsing context (workers)
    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }
}

impl Viewport for DomViewport {
    fn scroll_offset(&self) -> ScrollOffset {
        ScrollOffset {
            x: self.window.scroll_x().unwrap_or(0.0),
            y: self.window.scroll_y().unwrap_or(0.0),
        }
    }

    fn subscribe(&self, listener: ViewportListener) -> Subscription {
        let on_resize = listener.clone();
        let resize = EventListener::new(&self.window, "resize", move |_| {
            on_resize(ViewportEvent::Resize)
        });

        let scroll = EventListener::new_with_options(
            &self.window,
            "scroll",
            EventListenerOptions::run_in_capture_phase(),
            move |_| listener(ViewportEvent::Scroll),
        );

        // Dropping the gloo listeners removes them from the window
        Subscription::new(move || drop((resize, scroll)))
    }
}
