//! Preconfigured resolver inputs for accounts and problems

use crate::resolver_input::ResolverInputWidget;
use oj_resolver::{EntitySearch, ResolverInput, ResolverInputConfig, Spawner, Viewport};
use oj_types::{AccountKind, PROBLEM_CATEGORY};
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

/// Account picker over `kinds`; an empty slice searches every account kind
pub fn account_input_config(kinds: &[AccountKind]) -> ResolverInputConfig {
    let config = ResolverInputConfig::default().with_placeholder(account_placeholder(kinds));
    if kinds.is_empty() {
        config
    } else {
        config.with_kinds(kinds.iter().map(AccountKind::as_str))
    }
}

/// Problem picker, fixed to the problem category
pub fn problem_input_config() -> ResolverInputConfig {
    ResolverInputConfig::default()
        .with_kinds([PROBLEM_CATEGORY])
        .with_placeholder("Search problems by id or title")
}

fn account_placeholder(kinds: &[AccountKind]) -> String {
    if kinds.is_empty() {
        return "Search accounts".to_string();
    }
    let nouns: Vec<&str> = kinds
        .iter()
        .map(|kind| match kind {
            AccountKind::User => "users",
            AccountKind::Group => "groups",
            AccountKind::Scope => "scopes",
            AccountKind::ScopeUser => "scope users",
        })
        .collect();
    format!("Search {}", nouns.join(", "))
}

pub fn account_input(
    ctx: &egui::Context,
    id_source: impl Hash,
    kinds: &[AccountKind],
    search: Arc<dyn EntitySearch>,
    spawner: Spawner,
    viewport: Rc<dyn Viewport>,
) -> ResolverInputWidget {
    let input = ResolverInput::new(account_input_config(kinds), search, spawner, viewport);
    ResolverInputWidget::new(ctx, id_source, input)
}

pub fn problem_input(
    ctx: &egui::Context,
    id_source: impl Hash,
    search: Arc<dyn EntitySearch>,
    spawner: Spawner,
    viewport: Rc<dyn Viewport>,
) -> ResolverInputWidget {
    let input = ResolverInput::new(problem_input_config(), search, spawner, viewport);
    ResolverInputWidget::new(ctx, id_source, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oj_resolver::{InMemoryEntitySearch, ManualViewport};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_account_placeholder() {
        assert_eq!(account_placeholder(&[]), "Search accounts");
        assert_eq!(
            account_placeholder(&[AccountKind::User, AccountKind::ScopeUser]),
            "Search users, scope users"
        );
    }

    #[test]
    fn test_empty_kinds_means_any_account() {
        let config = account_input_config(&[]);
        assert_eq!(config.kinds, None);
    }

    #[test]
    fn test_single_kind_is_fixed() {
        let config = account_input_config(&[AccountKind::Group]);
        assert_eq!(config.kinds, Some(vec!["group".to_string()]));
    }

    #[tokio::test]
    async fn test_problem_input_is_locked_to_problems() {
        let ctx = egui::Context::default();
        let widget = problem_input(
            &ctx,
            "problem",
            Arc::new(InMemoryEntitySearch::new(Vec::new())),
            Spawner::current().expect("tokio runtime"),
            Rc::new(ManualViewport::new()),
        );

        let input = widget.input();
        assert!(input.filter().is_category_fixed());
        assert_eq!(input.active_category(), Some(PROBLEM_CATEGORY));
        assert!(input.filter().selector_options().is_empty());
        assert_eq!(input.placeholder(), Some("Search problems by id or title"));
    }

    #[tokio::test]
    async fn test_account_input_offers_category_row() {
        let ctx = egui::Context::default();
        let widget = account_input(
            &ctx,
            "account",
            &[AccountKind::User, AccountKind::Group],
            Arc::new(InMemoryEntitySearch::new(Vec::new())),
            Spawner::current().expect("tokio runtime"),
            Rc::new(ManualViewport::new()),
        );

        let options = widget.input().filter().selector_options();
        assert_eq!(
            options,
            vec![None, Some("user".to_string()), Some("group".to_string())]
        );
        assert_eq!(widget.input().active_category(), None);
    }
}
