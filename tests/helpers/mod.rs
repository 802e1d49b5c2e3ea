//! Shared fixtures for resolver integration tests
//!
//! `ScriptedSearch` answers each (category, query) pair after a scripted
//! delay, so tests can make responses race out of order under paused time.

#![allow(dead_code)]

use async_trait::async_trait;
use oj_resolver::{
    Anchor, EntitySearch, ManualViewport, Rect, RectAnchor, ResolverInput, ResolverInputConfig,
    SearchError, Spawner,
};
use oj_types::Entity;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type CallKey = (Option<String>, Option<String>);

#[derive(Clone)]
enum Scripted {
    Ok(Duration, Vec<Entity>),
    Err(Duration),
}

#[derive(Default)]
pub struct ScriptedSearch {
    responses: HashMap<CallKey, Scripted>,
    calls: Mutex<Vec<CallKey>>,
}

fn key(category: Option<&str>, query: Option<&str>) -> CallKey {
    (category.map(str::to_string), query.map(str::to_string))
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(
        mut self,
        category: Option<&str>,
        query: Option<&str>,
        delay_ms: u64,
        entities: Vec<Entity>,
    ) -> Self {
        self.responses.insert(
            key(category, query),
            Scripted::Ok(Duration::from_millis(delay_ms), entities),
        );
        self
    }

    pub fn fail(mut self, category: Option<&str>, query: Option<&str>, delay_ms: u64) -> Self {
        self.responses
            .insert(key(category, query), Scripted::Err(Duration::from_millis(delay_ms)));
        self
    }

    pub fn calls(&self) -> Vec<CallKey> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl EntitySearch for ScriptedSearch {
    async fn search(
        &self,
        category: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<Entity>, SearchError> {
        let call = key(category, query);
        self.calls.lock().unwrap().push(call.clone());

        match self.responses.get(&call).cloned() {
            Some(Scripted::Ok(delay, entities)) => {
                tokio::time::sleep(delay).await;
                Ok(entities)
            }
            Some(Scripted::Err(delay)) => {
                tokio::time::sleep(delay).await;
                Err(SearchError::Status {
                    status: 503,
                    body: "search backend down".to_string(),
                })
            }
            None => Ok(Vec::new()),
        }
    }
}

pub fn user(id: i64, label: &str) -> Entity {
    Entity::new(id).with_category("user").with_label(label)
}

pub fn mount(config: ResolverInputConfig, search: &Arc<ScriptedSearch>) -> ResolverInput {
    mount_with_viewport(config, search, ManualViewport::new())
}

pub fn mount_with_viewport(
    config: ResolverInputConfig,
    search: &Arc<ScriptedSearch>,
    viewport: ManualViewport,
) -> ResolverInput {
    ResolverInput::new(
        config,
        search.clone(),
        Spawner::current().expect("tests run inside a tokio runtime"),
        Rc::new(viewport),
    )
}

pub fn anchor_at(left: f64, top: f64, width: f64, height: f64) -> Rc<dyn Anchor> {
    Rc::new(RectAnchor::new(Some(Rect::new(left, top, width, height))))
}

/// Let paused time run forward, then commit whatever settled
pub async fn settle(input: &mut ResolverInput, ms: u64) -> bool {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    input.process_async_results()
}
