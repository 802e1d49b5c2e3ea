//! OJ UI - egui widgets for the online-judge client
//!
//! Follows the widget rules used across the UI:
//! - Widgets return events via return values, not callbacks
//! - Async results are committed at the start of each frame
//! - Floating panels render in the foreground layer, outside the parent layout

pub mod presets;
pub mod resolver_input;

pub use presets::{account_input, account_input_config, problem_input, problem_input_config};
pub use resolver_input::{ResolverInputResponse, ResolverInputWidget};
