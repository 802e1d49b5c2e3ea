//! Property tests: the lock invariant holds after every operation
//!
//! Whenever an entity is resolved, the visible text equals its display label.

use oj_resolver::{
    InMemoryEntitySearch, ManualViewport, Rect, RectAnchor, ResolverInput, ResolverInputConfig,
    Spawner,
};
use oj_types::Entity;
use proptest::prelude::*;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    SetQuery(String),
    Select(usize),
    SetCategory(usize),
    Reset(Option<usize>),
    Focus,
    Blur,
    Settle,
}

fn pool() -> Vec<Entity> {
    vec![
        Entity::new(1).with_category("user").with_label("admin"),
        Entity::new(2).with_category("group").with_label("admins"),
        Entity::new("sc-1").with_category("scope"),
        Entity::new(4),
    ]
}

const CATEGORIES: [Option<&str>; 4] = [None, Some("user"), Some("group"), Some("scope")];

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-d]{0,4}".prop_map(Op::SetQuery),
        (0..4usize).prop_map(Op::Select),
        (0..4usize).prop_map(Op::SetCategory),
        proptest::option::of(0..4usize).prop_map(Op::Reset),
        Just(Op::Focus),
        Just(Op::Blur),
        Just(Op::Settle),
    ]
}

fn assert_locked_text_matches(input: &ResolverInput) {
    if let Some(entity) = input.resolved_entity() {
        assert_eq!(input.query_text(), entity.display_label());
    }
}

proptest! {
    #[test]
    fn lock_invariant_holds(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let mut input = ResolverInput::new(
            ResolverInputConfig::default().with_kinds(["user", "group"]),
            Arc::new(InMemoryEntitySearch::new(pool())),
            Spawner::new(runtime.handle().clone()),
            Rc::new(ManualViewport::new()),
        );
        let anchor = Rc::new(RectAnchor::new(Some(Rect::new(0.0, 0.0, 120.0, 20.0))));
        let entities = pool();

        for op in ops {
            match op {
                Op::SetQuery(text) => {
                    input.set_query(text.clone());
                    prop_assert!(input.resolved_entity().is_none());
                    prop_assert_eq!(input.query_text(), text.as_str());
                }
                Op::Select(idx) => {
                    input.select_entity(entities[idx].clone());
                    prop_assert_eq!(input.resolved_entity(), Some(&entities[idx]));
                }
                Op::SetCategory(idx) => {
                    let before = input.resolved_entity().cloned();
                    input.set_category(CATEGORIES[idx]);
                    prop_assert_eq!(input.resolved_entity().cloned(), before);
                    prop_assert_ne!(input.active_category(), Some("scope"));
                }
                Op::Reset(idx) => {
                    input.reset_entity(idx.map(|i| entities[i].clone()));
                }
                Op::Focus => input.focus(anchor.clone()),
                Op::Blur => input.blur(),
                Op::Settle => {
                    runtime.block_on(tokio::task::yield_now());
                    input.process_async_results();
                }
            }
            assert_locked_text_matches(&input);
        }
    }
}
