//! OJ Resolver - searchable entity reference inputs for the online-judge client
//!
//! ## Components
//!
//! - [`overlay`]: keeps a floating panel positioned under its input
//! - [`category`]: which entity kinds an input may search over
//! - [`resolver`]: query / lock / candidates state machine with
//!   last-issued-wins fetch sequencing
//! - [`search`]: the search collaborator seam, plus an in-process backend
//! - [`api`]: HTTP search backend against the judge REST API

pub mod api;
pub mod category;
pub mod config;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod overlay;
pub mod resolver;
pub mod runtime;
pub mod search;
pub mod telemetry;

pub use api::{ApiClient, HttpEntitySearch};
pub use category::CategoryFilter;
pub use config::{ConfigError, ResolverConfig};
pub use oj_types::{AccountKind, Entity, EntityId};
pub use overlay::{
    Anchor, ManualViewport, OverlayGeometry, OverlayPositioner, Rect, RectAnchor, ScrollOffset,
    Subscription, Viewport, ViewportEvent,
};
pub use resolver::{RepaintHook, ResolverEvent, ResolverInput, ResolverInputConfig};
pub use runtime::Spawner;
pub use search::{EntitySearch, InMemoryEntitySearch, SearchError};
