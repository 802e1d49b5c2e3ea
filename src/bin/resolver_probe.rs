//! Resolver probe
//!
//! Drives a headless resolver input against the judge search API and prints
//! the candidates it settles on. Useful to check kinds and search ranking
//! without a browser.
//!
//! Usage:
//!   resolver-probe --kind user --kind group adm
//!   resolver-probe --config resolver.yaml --select 0 admin

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Parser;
use oj_resolver::{
    telemetry, EntitySearch, HttpEntitySearch, ManualViewport, Rect, RectAnchor, ResolverConfig,
    ResolverEvent, ResolverInput, ResolverInputConfig, SearchError, Spawner,
};
use oj_types::Entity;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type SearchKey = (Option<String>, Option<String>);

/// HTTP search that remembers which (category, query) pairs last failed.
///
/// The resolver only logs failures, so without this an unreachable backend
/// would look like an empty result list.
struct FailureTrackingSearch {
    inner: HttpEntitySearch,
    failures: Mutex<HashMap<SearchKey, SearchError>>,
}

impl FailureTrackingSearch {
    fn new(inner: HttpEntitySearch) -> Self {
        Self {
            inner,
            failures: Mutex::new(HashMap::new()),
        }
    }

    fn failure_for(&self, category: Option<&str>, query: Option<&str>) -> Option<SearchError> {
        let key = search_key(category, query);
        let failures = self.failures.lock().ok()?;
        failures.get(&key).cloned()
    }
}

fn search_key(category: Option<&str>, query: Option<&str>) -> SearchKey {
    (category.map(str::to_string), query.map(str::to_string))
}

#[async_trait]
impl EntitySearch for FailureTrackingSearch {
    async fn search(
        &self,
        category: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<Entity>, SearchError> {
        let result = self.inner.search(category, query).await;
        if let Ok(mut failures) = self.failures.lock() {
            let key = search_key(category, query);
            match &result {
                Ok(_) => {
                    failures.remove(&key);
                }
                Err(e) => {
                    failures.insert(key, e.clone());
                }
            }
        }
        result
    }
}

#[derive(Parser, Debug)]
#[command(name = "resolver-probe", about = "Query the judge entity search like a resolver input")]
struct Args {
    /// YAML config file
    #[arg(long, env = "OJ_RESOLVER_CONFIG")]
    config: Option<String>,

    /// Allowed kinds (repeat for several); omitted searches every kind
    #[arg(long = "kind")]
    kinds: Vec<String>,

    /// Narrow to one of the allowed kinds after typing
    #[arg(long)]
    category: Option<String>,

    /// Select the candidate at this index and print the locked entity
    #[arg(long)]
    select: Option<usize>,

    /// Give up waiting for results after this many milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Query text
    query: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("loading resolver config from {}", path))?,
        None => ResolverConfig::default(),
    }
    .with_env_overrides();

    tracing::info!(base_url = %config.api.base_url, "probing entity search");

    let mut input_config = ResolverInputConfig::default().with_debounce(config.debounce());
    if !args.kinds.is_empty() {
        input_config = input_config.with_kinds(args.kinds.clone());
    }

    let spawner = Spawner::current().context("no tokio runtime")?;
    let search = Arc::new(FailureTrackingSearch::new(config.http_search()));
    let mut input = ResolverInput::new(
        input_config,
        search.clone(),
        spawner,
        Rc::new(ManualViewport::new()),
    );

    input.focus(Rc::new(RectAnchor::new(Some(Rect::new(0.0, 0.0, 320.0, 24.0)))));
    input.set_query(args.query.clone());
    if let Some(category) = args.category.as_deref() {
        if !input.set_category(Some(category)) {
            bail!("category {} is not among the allowed kinds", category);
        }
    }

    let deadline = tokio::time::Instant::now() + Duration::from_millis(args.timeout_ms);
    loop {
        input.tick(instant::Instant::now());
        input.process_async_results();
        if !input.is_loading() {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            bail!("no search result within {}ms", args.timeout_ms);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let query = Some(input.query_text()).filter(|q| !q.is_empty());
    if let Some(error) = search.failure_for(input.active_category(), query) {
        bail!("entity search failed: {}", error);
    }

    for (idx, entity) in input.candidates().iter().enumerate() {
        println!(
            "{:>3}  {:<12} {:<10} {}",
            idx,
            entity.id.to_string(),
            entity.category.as_deref().unwrap_or("-"),
            entity.display_label()
        );
    }

    if let Some(idx) = args.select {
        let Some(entity) = input.candidates().get(idx).cloned() else {
            bail!("no candidate at index {}", idx);
        };
        if let Some(ResolverEvent::EntityChanged(Some(entity))) = input.select_entity(entity) {
            println!("locked: {} ({})", input.query_text(), entity.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oj_resolver::ApiClient;

    #[tokio::test]
    async fn test_unreachable_backend_is_remembered_per_key() {
        // Nothing listens on the discard port, so the connection is refused
        let search = FailureTrackingSearch::new(HttpEntitySearch::new(
            ApiClient::new("http://127.0.0.1:9"),
            "/api/search",
        ));

        assert!(search.search(Some("user"), Some("adm")).await.is_err());
        assert!(matches!(
            search.failure_for(Some("user"), Some("adm")),
            Some(SearchError::Request(_))
        ));
        assert!(search.failure_for(None, Some("adm")).is_none());
    }
}
