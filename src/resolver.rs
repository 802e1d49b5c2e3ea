//! Resolver input state machine
//!
//! A searchable, lockable reference field:
//!
//! 1. The user types a query; any lock on a resolved entity is dropped
//! 2. Candidates are fetched asynchronously for (query, category)
//! 3. Picking a candidate locks the field and rewrites its text
//!
//! Fetch sequencing follows the async coordination pattern used across the UI:
//!
//! 1. `dispatch` spawns the search with a request token passed by value
//! 2. The task writes its outcome into `Arc<Mutex<AsyncState>>` through a weak sink
//! 3. The task calls the repaint hook
//! 4. `process_async_results()` extracts everything, drops the lock, and
//!    commits only the outcome whose token is still current
//!
//! Last-issued wins: a slow response for an older query never replaces the
//! candidates of a newer one. Once the input is dropped the weak sink is
//! dead and late responses are discarded.

use crate::category::CategoryFilter;
use crate::overlay::{Anchor, OverlayGeometry, OverlayPositioner, Viewport};
use crate::runtime::Spawner;
use crate::search::{EntitySearch, SearchError};
use instant::Instant;
use oj_types::Entity;
use std::rc::Rc;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

// =============================================================================
// CONFIGURATION & EVENTS
// =============================================================================

/// Construction-time configuration of one resolver input
#[derive(Debug, Clone, Default)]
pub struct ResolverInputConfig {
    /// Selectable categories; `None` searches all of them
    pub kinds: Option<Vec<String>>,
    /// Hint shown while the field is empty
    pub placeholder: Option<String>,
    /// Disabled inputs ignore user interaction
    pub disabled: bool,
    /// Entity the field starts locked to
    pub initial_entity: Option<Entity>,
    /// Delay between the last keystroke and its fetch (zero = immediate)
    pub debounce: Duration,
}

impl ResolverInputConfig {
    pub fn with_kinds<I, K>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.kinds = Some(kinds.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_initial_entity(mut self, entity: Option<Entity>) -> Self {
        self.initial_entity = entity;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Notifications for the embedding form.
///
/// Returned from transitions rather than delivered through callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverEvent {
    /// A candidate was selected or the entity was reset externally
    EntityChanged(Option<Entity>),
    /// The user edited the text (`None` when the field became empty)
    QueryChanged(Option<String>),
}

/// Called from fetch tasks once an outcome was delivered
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

// =============================================================================
// ASYNC STATE - Coordination for spawned fetches
// =============================================================================

/// (query text, category) a candidate list belongs to
type CandidatesKey = (String, Option<String>);

/// Completed fetch, waiting to be committed or discarded
#[derive(Debug)]
pub struct FetchOutcome {
    token: u64,
    key: CandidatesKey,
    result: Result<Vec<Entity>, SearchError>,
}

/// Written by fetch tasks, read by `process_async_results()`
#[derive(Debug, Default)]
pub struct AsyncState {
    completed: Vec<FetchOutcome>,
}

impl AsyncState {
    /// Take all completed outcomes so the lock can be dropped before processing
    fn extract_pending(&mut self) -> Vec<FetchOutcome> {
        std::mem::take(&mut self.completed)
    }
}

/// Weak handle through which a fetch task reports back
#[derive(Debug, Clone)]
pub struct FetchSink {
    state: Weak<Mutex<AsyncState>>,
}

impl FetchSink {
    fn new(state: &Arc<Mutex<AsyncState>>) -> Self {
        Self {
            state: Arc::downgrade(state),
        }
    }

    /// Store `outcome`; false when the owning input is gone
    fn deliver(&self, outcome: FetchOutcome) -> bool {
        let Some(state) = self.state.upgrade() else {
            tracing::trace!(token = outcome.token, "resolver input dropped, discarding fetch");
            return false;
        };
        let delivered = match state.lock() {
            Ok(mut state) => {
                state.completed.push(outcome);
                true
            }
            Err(_) => false,
        };
        delivered
    }
}

struct DebouncedFetch {
    token: u64,
    due: Instant,
}

// =============================================================================
// RESOLVER INPUT
// =============================================================================

/// Searchable reference field with a lock on the picked entity
pub struct ResolverInput {
    // === Collaborators ===
    search: Arc<dyn EntitySearch>,
    spawner: Spawner,
    positioner: OverlayPositioner,
    repaint: Option<RepaintHook>,

    // === Configuration ===
    filter: CategoryFilter,
    placeholder: Option<String>,
    disabled: bool,
    debounce: Duration,

    // === Resolver state ===
    query_text: String,
    resolved_entity: Option<Entity>,
    active_category: Option<String>,
    candidates: Vec<Entity>,
    /// What `candidates` were fetched for
    candidates_key: Option<CandidatesKey>,
    /// What the fetch holding the current token is for, until it settles
    pending_key: Option<CandidatesKey>,
    request_token: u64,
    is_open: bool,

    // === UI-only state ===
    /// Keyboard cursor into `candidates`
    highlighted: Option<usize>,
    /// Set when a press lands inside the overlay so the next blur is ignored
    pointer_in_overlay: bool,
    debounced: Option<DebouncedFetch>,

    // === Async coordination ===
    async_state: Arc<Mutex<AsyncState>>,
}

impl ResolverInput {
    pub fn new(
        config: ResolverInputConfig,
        search: Arc<dyn EntitySearch>,
        spawner: Spawner,
        viewport: Rc<dyn Viewport>,
    ) -> Self {
        let filter = CategoryFilter::new(config.kinds);
        let active_category = filter.initial_category();
        let (query_text, resolved_entity) = match config.initial_entity {
            Some(entity) => (entity.display_label(), Some(entity)),
            None => (String::new(), None),
        };

        Self {
            search,
            spawner,
            positioner: OverlayPositioner::new(viewport),
            repaint: None,
            filter,
            placeholder: config.placeholder,
            disabled: config.disabled,
            debounce: config.debounce,
            query_text,
            resolved_entity,
            active_category,
            candidates: Vec::new(),
            candidates_key: None,
            pending_key: None,
            request_token: 0,
            is_open: false,
            highlighted: None,
            pointer_in_overlay: false,
            debounced: None,
            async_state: Arc::new(Mutex::new(AsyncState::default())),
        }
    }

    /// Hook fired from fetch tasks when a result is ready (e.g. request a repaint)
    pub fn set_repaint_hook(&mut self, hook: RepaintHook) {
        self.repaint = Some(hook);
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn resolved_entity(&self) -> Option<&Entity> {
        self.resolved_entity.as_ref()
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    pub fn candidates(&self) -> &[Entity] {
        &self.candidates
    }

    pub fn request_token(&self) -> u64 {
        self.request_token
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// A fetch for the current token has not settled yet
    pub fn is_loading(&self) -> bool {
        self.pending_key.is_some()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.close();
        }
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn positioner(&self) -> &OverlayPositioner {
        &self.positioner
    }

    pub fn positioner_mut(&mut self) -> &mut OverlayPositioner {
        &mut self.positioner
    }

    pub fn geometry(&self) -> OverlayGeometry {
        self.positioner.current_geometry()
    }

    /// Whether `entity` is the one the field is locked to
    pub fn is_selected(&self, entity: &Entity) -> bool {
        self.resolved_entity
            .as_ref()
            .is_some_and(|resolved| resolved.id == entity.id)
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// User edited the text: drop the lock and fetch for the new text
    pub fn set_query(&mut self, text: impl Into<String>) -> Option<ResolverEvent> {
        if self.disabled {
            return None;
        }
        self.query_text = text.into();
        self.resolved_entity = None;
        self.highlighted = None;
        self.schedule_fetch(true);

        let reported = if self.query_text.is_empty() {
            None
        } else {
            Some(self.query_text.clone())
        };
        Some(ResolverEvent::QueryChanged(reported))
    }

    /// Input gained focus: open the overlay anchored at `anchor`
    pub fn focus(&mut self, anchor: Rc<dyn Anchor>) {
        if self.disabled {
            return;
        }
        self.is_open = true;
        self.pointer_in_overlay = false;
        self.positioner.activate(anchor);

        let key = self.current_key();
        let cached = self.candidates_key.as_ref() == Some(&key);
        let in_flight = self.pending_key.as_ref() == Some(&key);
        if !cached && !in_flight {
            self.schedule_fetch(false);
        }
    }

    /// Input lost focus: close the overlay, keep text, lock and candidates.
    ///
    /// Ignored once after [`Self::mark_pointer_in_overlay`], since a press on
    /// an overlay row takes focus from the field before the row sees the click.
    pub fn blur(&mut self) {
        if std::mem::take(&mut self.pointer_in_overlay) {
            tracing::trace!("blur caused by overlay press, keeping overlay open");
            return;
        }
        self.close();
    }

    /// Flag that the pointer went down inside the overlay layer
    pub fn mark_pointer_in_overlay(&mut self) {
        self.pointer_in_overlay = true;
    }

    /// Close the overlay unconditionally (Escape, disabling)
    pub fn close(&mut self) {
        self.is_open = false;
        self.highlighted = None;
        self.pointer_in_overlay = false;
        self.positioner.deactivate();
    }

    /// Switch the category filter; disallowed or unchanged categories are ignored.
    ///
    /// Returns true when the category changed.
    pub fn set_category(&mut self, category: Option<&str>) -> bool {
        if self.disabled {
            return false;
        }
        if !self.filter.allows(category) {
            tracing::debug!(?category, "ignoring category outside the allowed kinds");
            return false;
        }
        if self.active_category.as_deref() == category {
            return false;
        }
        self.active_category = category.map(str::to_string);
        self.highlighted = None;
        self.schedule_fetch(false);
        true
    }

    /// User picked a candidate: lock onto it and close
    pub fn select_entity(&mut self, entity: Entity) -> Option<ResolverEvent> {
        if self.disabled {
            return None;
        }
        Some(self.lock_onto(Some(entity)))
    }

    /// Consumer replaced the entity programmatically
    pub fn reset_entity(&mut self, entity: Option<Entity>) -> ResolverEvent {
        self.lock_onto(entity)
    }

    fn lock_onto(&mut self, entity: Option<Entity>) -> ResolverEvent {
        self.query_text = entity.as_ref().map(Entity::display_label).unwrap_or_default();
        self.resolved_entity = entity.clone();
        if self.debounced.take().is_some() {
            // The dropped fetch was the one holding the current token
            self.pending_key = None;
        }
        self.close();
        ResolverEvent::EntityChanged(entity)
    }

    // =========================================================================
    // KEYBOARD NAVIGATION
    // =========================================================================

    pub fn highlight_next(&mut self) {
        if self.disabled || self.candidates.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(idx) if idx + 1 < self.candidates.len() => idx + 1,
            Some(idx) => idx,
            None => 0,
        });
    }

    pub fn highlight_prev(&mut self) {
        if self.disabled || self.candidates.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(idx) => idx.saturating_sub(1),
            None => 0,
        });
    }

    pub fn select_highlighted(&mut self) -> Option<ResolverEvent> {
        let entity = self.candidates.get(self.highlighted?)?.clone();
        self.select_entity(entity)
    }

    // =========================================================================
    // FETCHING
    // =========================================================================

    fn current_key(&self) -> CandidatesKey {
        (self.query_text.clone(), self.active_category.clone())
    }

    /// Bump the token now so older in-flight fetches are already stale,
    /// then dispatch immediately or once the debounce delay expires
    fn schedule_fetch(&mut self, debounced: bool) {
        self.request_token += 1;
        let token = self.request_token;
        self.pending_key = Some(self.current_key());

        if debounced && !self.debounce.is_zero() {
            self.debounced = Some(DebouncedFetch {
                token,
                due: Instant::now() + self.debounce,
            });
        } else {
            self.debounced = None;
            self.dispatch(token);
        }
    }

    /// Dispatch a debounced fetch whose delay has passed
    pub fn tick(&mut self, now: Instant) {
        let due = matches!(&self.debounced, Some(pending) if now >= pending.due);
        if !due {
            return;
        }
        if let Some(pending) = self.debounced.take() {
            if pending.token == self.request_token {
                self.dispatch(pending.token);
            }
        }
    }

    fn dispatch(&mut self, token: u64) {
        let key = self.current_key();
        let category = self.active_category.clone();
        let query = if self.query_text.is_empty() {
            None
        } else {
            Some(self.query_text.clone())
        };
        tracing::debug!(token, ?category, ?query, "issuing entity search");

        let search = Arc::clone(&self.search);
        let sink = FetchSink::new(&self.async_state);
        let repaint = self.repaint.clone();

        self.spawner.spawn(async move {
            let result = search.search(category.as_deref(), query.as_deref()).await;
            if sink.deliver(FetchOutcome { token, key, result }) {
                if let Some(repaint) = repaint {
                    repaint();
                }
            }
        });
    }

    /// Commit settled fetches. Call once per frame / event-loop turn.
    ///
    /// Returns true when the candidate list changed.
    pub fn process_async_results(&mut self) -> bool {
        let pending = match self.async_state.lock() {
            Ok(mut state) => state.extract_pending(),
            Err(_) => return false,
        };
        // Lock is dropped - full &mut self access from here

        let mut changed = false;
        for outcome in pending {
            if outcome.token != self.request_token {
                tracing::trace!(
                    token = outcome.token,
                    current = self.request_token,
                    "discarding stale search result"
                );
                continue;
            }
            self.pending_key = None;

            match outcome.result {
                Ok(entities) => {
                    tracing::debug!(
                        token = outcome.token,
                        count = entities.len(),
                        "search results committed"
                    );
                    self.highlighted = if entities.is_empty() { None } else { Some(0) };
                    self.candidates = entities;
                    self.candidates_key = Some(outcome.key);
                    changed = true;
                }
                Err(e) => {
                    tracing::warn!(token = outcome.token, error = %e, "entity search failed");
                }
            }
        }
        changed
    }
}
