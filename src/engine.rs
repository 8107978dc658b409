//! Background worker that keeps a [`ListingView`] in step with the table state.
//!
//! The caller owns a [`ListingEngine`] handle and feeds it [`FilterAction`]s.
//! Each action is reduced into the [`ViewState`], stamped with a generation
//! number and handed to a worker task over a watch channel. The worker
//! publishes views back over a second watch channel.
//!
//! In [`EngineMode::Client`] the worker loads one bounded snapshot and filters
//! it in memory on every change. In [`EngineMode::Server`] every change becomes
//! a store query; typing is debounced, and a fetch still in flight when a newer
//! state arrives is dropped before it can publish.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::filter::{self, FilterAction, FilterOptions, SelectField, ViewState};
use crate::models::Listing;
use crate::store::{ListingPage, ListingQuery, ListingStore, LIVE_ROW_CAP, SNAPSHOT_ROW_CAP};

/// Where filtering happens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineMode {
    /// One snapshot, filtered in memory
    #[default]
    Client,
    /// Every change is a store query
    Server,
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineMode::Client => f.write_str("client"),
            EngineMode::Server => f.write_str("server"),
        }
    }
}

impl FromStr for EngineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" | "memory" => Ok(EngineMode::Client),
            "server" | "live" => Ok(EngineMode::Server),
            other => Err(format!("unknown engine mode: {other} (expected client or server)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub mode: EngineMode,
    /// Rows fetched per query
    pub row_cap: usize,
    /// Quiet period after typing before a live query fires
    pub debounce: Duration,
    pub fetch_timeout: Duration,
    /// Values kept per dropdown
    pub option_limit: usize,
}

impl EngineSettings {
    pub fn for_mode(mode: EngineMode) -> Self {
        let row_cap = match mode {
            EngineMode::Client => SNAPSHOT_ROW_CAP,
            EngineMode::Server => LIVE_ROW_CAP,
        };
        Self {
            mode,
            row_cap,
            debounce: Duration::from_millis(300),
            fetch_timeout: Duration::from_secs(15),
            option_limit: 500,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::for_mode(EngineMode::default())
    }
}

/// What the presentation layer renders
#[derive(Debug, Clone, PartialEq)]
pub struct ListingView {
    pub rows: Vec<Listing>,
    pub loading: bool,
    pub error: Option<String>,
    /// Rows matching the current filters, which may exceed `rows.len()`
    pub total: Option<usize>,
    pub options: FilterOptions,
    /// Generation of the state these rows were computed for
    pub generation: u64,
}

impl Default for ListingView {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            loading: true,
            error: None,
            total: None,
            options: FilterOptions::default(),
            generation: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus<'a> {
    Loading,
    Failed(&'a str),
    /// Fetch succeeded, nothing matched
    Empty,
    Ready,
}

impl ListingView {
    fn failed(message: String, generation: u64) -> Self {
        Self {
            loading: false,
            error: Some(message),
            generation,
            ..Self::default()
        }
    }

    pub fn status(&self) -> ViewStatus<'_> {
        if self.loading {
            ViewStatus::Loading
        } else if let Some(error) = &self.error {
            ViewStatus::Failed(error)
        } else if self.rows.is_empty() {
            ViewStatus::Empty
        } else {
            ViewStatus::Ready
        }
    }
}

impl ListingQuery {
    /// Live query for the current table state
    pub fn for_view(view: &ViewState, limit: usize) -> Self {
        Self {
            conditions: view.filters.conditions(),
            order: view.sort,
            limit,
            count_total: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Commit {
    generation: u64,
    view: ViewState,
    debounce: bool,
}

/// Handle to a running listings table
pub struct ListingEngine {
    state: ViewState,
    generation: u64,
    commits: watch::Sender<Commit>,
    views: watch::Receiver<ListingView>,
    worker: JoinHandle<()>,
}

impl ListingEngine {
    /// Start the worker with the default state (newest first, no filters).
    /// Must be called inside a Tokio runtime.
    pub fn spawn(store: Arc<dyn ListingStore>, settings: EngineSettings) -> Self {
        Self::with_state(store, settings, ViewState::default())
    }

    pub fn with_state(
        store: Arc<dyn ListingStore>,
        settings: EngineSettings,
        state: ViewState,
    ) -> Self {
        let (commits, commit_rx) = watch::channel(Commit {
            generation: 0,
            view: state.clone(),
            debounce: false,
        });
        let (view_tx, views) = watch::channel(ListingView::default());

        info!(
            "Starting listing engine ({} mode, {} store)",
            settings.mode,
            store.source_name()
        );
        let worker = tokio::spawn(run_worker(store, settings, commit_rx, view_tx));

        Self {
            state,
            generation: 0,
            commits,
            views,
            worker,
        }
    }

    /// Apply one user interaction. Never blocks.
    pub fn dispatch(&mut self, action: FilterAction) {
        let debounce = action.is_typing();
        debug!(?action, "dispatch");
        self.state.apply(action);
        self.generation += 1;
        self.commits.send_replace(Commit {
            generation: self.generation,
            view: self.state.clone(),
            debounce,
        });
    }

    /// Latest published view, possibly still loading
    pub fn view(&self) -> ListingView {
        self.views.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingView> {
        self.views.clone()
    }

    /// Wait until the view reflects the most recent dispatch
    pub async fn settled(&self) -> ListingView {
        let target = self.generation;
        let mut views = self.views.clone();
        let settled = views
            .wait_for(|v| !v.loading && v.generation >= target)
            .await
            .map(|v| v.clone());
        match settled {
            Ok(view) => view,
            Err(_) => {
                warn!("Listing engine stopped before settling");
                views.borrow().clone()
            }
        }
    }
}

impl Drop for ListingEngine {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker(
    store: Arc<dyn ListingStore>,
    settings: EngineSettings,
    commits: watch::Receiver<Commit>,
    views: watch::Sender<ListingView>,
) {
    match settings.mode {
        EngineMode::Client => run_snapshot(store, settings, commits, views).await,
        EngineMode::Server => run_live(store, settings, commits, views).await,
    }
}

async fn fetch_with_timeout(
    store: &dyn ListingStore,
    query: &ListingQuery,
    limit: Duration,
) -> Result<ListingPage, StoreError> {
    match timeout(limit, store.fetch(query)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

async fn run_snapshot(
    store: Arc<dyn ListingStore>,
    settings: EngineSettings,
    mut commits: watch::Receiver<Commit>,
    views: watch::Sender<ListingView>,
) {
    let query = ListingQuery::snapshot(settings.row_cap);
    let snapshot = match fetch_with_timeout(store.as_ref(), &query, settings.fetch_timeout).await {
        Ok(page) => page.rows,
        Err(err) => {
            warn!("Listing snapshot failed: {}", err);
            let message = err.to_string();
            loop {
                let generation = commits.borrow_and_update().generation;
                views.send_replace(ListingView::failed(message.clone(), generation));
                if commits.changed().await.is_err() {
                    return;
                }
            }
        }
    };

    info!("✅ Loaded {} listings into memory", snapshot.len());
    let options = FilterOptions::from_rows(&snapshot);

    loop {
        let commit = commits.borrow_and_update().clone();
        let rows = filter::apply(&snapshot, &commit.view);
        debug!(generation = commit.generation, matched = rows.len(), "filtered snapshot");

        views.send_replace(ListingView {
            total: Some(rows.len()),
            rows,
            loading: false,
            error: None,
            options: options.clone(),
            generation: commit.generation,
        });

        if commits.changed().await.is_err() {
            return;
        }
    }
}

async fn run_live(
    store: Arc<dyn ListingStore>,
    settings: EngineSettings,
    mut commits: watch::Receiver<Commit>,
    views: watch::Sender<ListingView>,
) {
    let views = Arc::new(views);
    // aborted with the worker when the engine goes away
    let _options = load_options(&store, &settings, &views);

    loop {
        let commit = commits.borrow_and_update().clone();

        if commit.debounce {
            tokio::select! {
                _ = sleep(settings.debounce) => {}
                changed = commits.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue;
                }
            }
        }

        views.send_modify(|view| view.loading = true);
        let query = ListingQuery::for_view(&commit.view, settings.row_cap);

        tokio::select! {
            biased;

            changed = commits.changed() => {
                if changed.is_err() {
                    return;
                }
                debug!(generation = commit.generation, "dropping superseded fetch");
                continue;
            }
            result = fetch_with_timeout(store.as_ref(), &query, settings.fetch_timeout) => {
                match commits.has_changed() {
                    Ok(false) => publish(&views, result, commit.generation),
                    Ok(true) => {
                        debug!(generation = commit.generation, "superseded before publish");
                        continue;
                    }
                    Err(_) => return,
                }
            }
        }

        if commits.changed().await.is_err() {
            return;
        }
    }
}

fn publish(
    views: &watch::Sender<ListingView>,
    result: Result<ListingPage, StoreError>,
    generation: u64,
) {
    views.send_modify(|view| {
        view.loading = false;
        view.generation = generation;
        match result {
            Ok(page) => {
                debug!(generation, rows = page.rows.len(), total = ?page.total, "published");
                view.rows = page.rows;
                view.total = page.total;
                view.error = None;
            }
            Err(err) => {
                warn!("Listing query failed: {}", err);
                view.rows.clear();
                view.total = None;
                view.error = Some(err.to_string());
            }
        }
    });
}

/// Dropdown values from the whole table, one lightweight query per column.
/// The queries run alongside the listing fetches and each list is merged
/// into the view as it lands.
fn load_options(
    store: &Arc<dyn ListingStore>,
    settings: &EngineSettings,
    views: &Arc<watch::Sender<ListingView>>,
) -> JoinSet<()> {
    let mut tasks = JoinSet::new();
    for field in SelectField::ALL {
        let store = Arc::clone(store);
        let views = Arc::clone(views);
        let (limit, wait) = (settings.option_limit, settings.fetch_timeout);

        tasks.spawn(async move {
            let column = field.column();
            match timeout(wait, store.distinct(column, limit)).await {
                Ok(Ok(values)) => views.send_modify(|view| view.options.set(field, values)),
                Ok(Err(err)) => warn!("Could not load {} options: {}", column, err),
                Err(_) => warn!("Timed out loading {} options", column),
            }
        });
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FlagField, RangeField, SelectField, TriState};
    use crate::models::fixtures::{ids, inventory};
    use crate::models::Column;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use tokio::time::Instant;

    /// Memory store whose fetches take scripted amounts of time
    struct ScriptedStore {
        inner: MemoryStore,
        delays: Mutex<VecDeque<Duration>>,
        calls: AtomicUsize,
    }

    impl ScriptedStore {
        fn new(delays: &[u64]) -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryStore::new(inventory()),
                delays: Mutex::new(delays.iter().map(|ms| Duration::from_millis(*ms)).collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ListingStore for ScriptedStore {
        async fn fetch(&self, query: &ListingQuery) -> Result<ListingPage, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
            if !delay.is_zero() {
                sleep(delay).await;
            }
            self.inner.fetch(query).await
        }

        async fn distinct(&self, column: Column, limit: usize) -> Result<Vec<String>, StoreError> {
            self.inner.distinct(column, limit).await
        }

        fn source_name(&self) -> &'static str {
            "scripted"
        }
    }

    /// Memory store whose second fetch parks until released; the third is slow
    struct GatedStore {
        inner: MemoryStore,
        gate: Notify,
        calls: AtomicUsize,
    }

    impl GatedStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryStore::new(inventory()),
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ListingStore for GatedStore {
        async fn fetch(&self, query: &ListingQuery) -> Result<ListingPage, StoreError> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                1 => self.gate.notified().await,
                2 => sleep(Duration::from_secs(1)).await,
                _ => {}
            }
            self.inner.fetch(query).await
        }

        async fn distinct(&self, column: Column, limit: usize) -> Result<Vec<String>, StoreError> {
            self.inner.distinct(column, limit).await
        }

        fn source_name(&self) -> &'static str {
            "gated"
        }
    }

    /// Never answers
    struct HangingStore;

    #[async_trait]
    impl ListingStore for HangingStore {
        async fn fetch(&self, _query: &ListingQuery) -> Result<ListingPage, StoreError> {
            sleep(Duration::from_secs(3600)).await;
            Ok(ListingPage::default())
        }

        async fn distinct(&self, _column: Column, _limit: usize) -> Result<Vec<String>, StoreError> {
            sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        fn source_name(&self) -> &'static str {
            "hanging"
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl ListingStore for BrokenStore {
        async fn fetch(&self, _query: &ListingQuery) -> Result<ListingPage, StoreError> {
            Err(StoreError::Backend {
                status: 401,
                message: "Invalid API key".into(),
            })
        }

        async fn distinct(&self, _column: Column, _limit: usize) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }

        fn source_name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn mode_parses_from_config_strings() {
        assert_eq!("client".parse::<EngineMode>().unwrap(), EngineMode::Client);
        assert_eq!(" Server ".parse::<EngineMode>().unwrap(), EngineMode::Server);
        assert!("hybrid".parse::<EngineMode>().is_err());
        assert_eq!(EngineSettings::for_mode(EngineMode::Server).row_cap, 1000);
        assert_eq!(EngineSettings::default().row_cap, 5000);
    }

    #[test]
    fn status_separates_failure_from_no_matches() {
        let mut view = ListingView::default();
        assert_eq!(view.status(), ViewStatus::Loading);

        view.loading = false;
        assert_eq!(view.status(), ViewStatus::Empty);

        view.error = Some("boom".into());
        assert_eq!(view.status(), ViewStatus::Failed("boom"));

        let ready = ListingView {
            rows: inventory(),
            loading: false,
            ..ListingView::default()
        };
        assert_eq!(ready.status(), ViewStatus::Ready);
    }

    #[tokio::test]
    async fn client_mode_filters_snapshot_in_memory() {
        let store = ScriptedStore::new(&[]);
        let mut engine = ListingEngine::spawn(store.clone(), EngineSettings::default());

        let view = engine.settled().await;
        assert_eq!(ids(&view.rows), ["b1", "a1", "a2", "c1"]);
        assert_eq!(view.total, Some(4));
        assert_eq!(view.options.city, ["Cebu City", "Makati", "Taguig"]);

        engine.dispatch(FilterAction::Select(SelectField::City, "Makati".into()));
        engine.dispatch(FilterAction::RangeMin(RangeField::Lease, "20000".into()));
        let view = engine.settled().await;
        assert_eq!(ids(&view.rows), ["a1"]);
        assert_eq!(view.generation, 2);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn client_mode_failure_is_not_an_empty_result() {
        let mut engine = ListingEngine::spawn(Arc::new(BrokenStore), EngineSettings::default());

        let view = engine.settled().await;
        assert!(view.rows.is_empty());
        assert_eq!(
            view.status(),
            ViewStatus::Failed("listing store returned 401: Invalid API key")
        );

        engine.dispatch(FilterAction::Search("makati".into()));
        let view = engine.settled().await;
        assert_eq!(view.generation, 1);
        assert!(view.error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn server_mode_debounces_typing() {
        let store = ScriptedStore::new(&[]);
        let mut engine = ListingEngine::spawn(
            store.clone(),
            EngineSettings::for_mode(EngineMode::Server),
        );

        let view = engine.settled().await;
        assert_eq!(view.rows.len(), 4);
        assert_eq!(store.calls(), 1);

        let mut views = engine.subscribe();
        let categories = views
            .wait_for(|v| !v.options.category.is_empty())
            .await
            .unwrap()
            .options
            .category
            .clone();
        assert_eq!(categories, ["Condominium", "House and Lot", "Office"]);

        engine.dispatch(FilterAction::Search("s".into()));
        engine.dispatch(FilterAction::Search("st".into()));
        engine.dispatch(FilterAction::Search("studio".into()));

        let view = engine.settled().await;
        assert_eq!(ids(&view.rows), ["a1"]);
        assert_eq!(view.total, Some(1));
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn server_mode_discards_superseded_fetch() {
        let store = ScriptedStore::new(&[0, 500, 10]);
        let mut engine = ListingEngine::spawn(
            store.clone(),
            EngineSettings::for_mode(EngineMode::Server),
        );
        engine.settled().await;

        engine.dispatch(FilterAction::Select(SelectField::City, "Taguig".into()));
        sleep(Duration::from_millis(50)).await;
        engine.dispatch(FilterAction::Select(SelectField::City, "Makati".into()));

        let view = engine.settled().await;
        assert_eq!(view.generation, 2);
        assert_eq!(ids(&view.rows), ["a1", "a2"]);

        sleep(Duration::from_secs(1)).await;
        let view = engine.view();
        assert_eq!(view.generation, 2);
        assert_eq!(ids(&view.rows), ["a1", "a2"]);
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn server_mode_drops_fetch_finishing_alongside_newer_state() {
        let store = GatedStore::new();
        let mut engine = ListingEngine::spawn(
            store.clone(),
            EngineSettings::for_mode(EngineMode::Server),
        );
        engine.settled().await;

        engine.dispatch(FilterAction::Select(SelectField::City, "Taguig".into()));
        while store.calls() < 2 {
            tokio::task::yield_now().await;
        }

        // the Taguig fetch completes in the same step the Makati state lands
        store.gate.notify_one();
        engine.dispatch(FilterAction::Select(SelectField::City, "Makati".into()));

        sleep(Duration::from_millis(10)).await;
        let view = engine.view();
        assert!(view.loading);
        assert_ne!(view.generation, 1);
        assert_eq!(view.rows.len(), 4);

        let view = engine.settled().await;
        assert_eq!(view.generation, 2);
        assert_eq!(ids(&view.rows), ["a1", "a2"]);
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn server_mode_fires_non_typing_actions_immediately() {
        let settings = EngineSettings::for_mode(EngineMode::Server);
        let debounce = settings.debounce;
        let mut engine = ListingEngine::spawn(ScriptedStore::new(&[]), settings);
        engine.settled().await;

        let actions = [
            FilterAction::Select(SelectField::City, "Makati".into()),
            FilterAction::Flag(FlagField::WithBalcony, TriState::Yes),
            FilterAction::SortBy(Column::Code),
            FilterAction::Reset,
        ];
        for action in actions {
            let started = Instant::now();
            engine.dispatch(action.clone());
            engine.settled().await;
            assert!(
                started.elapsed() < debounce,
                "{action:?} waited {:?}",
                started.elapsed()
            );
        }

        let started = Instant::now();
        engine.dispatch(FilterAction::Search("studio".into()));
        let view = engine.settled().await;
        assert!(started.elapsed() >= debounce);
        assert_eq!(ids(&view.rows), ["a1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn server_mode_option_queries_do_not_hold_up_rows() {
        let settings = EngineSettings {
            fetch_timeout: Duration::from_secs(5),
            ..EngineSettings::for_mode(EngineMode::Server)
        };
        let engine = ListingEngine::spawn(Arc::new(HangingStore), settings);

        let started = Instant::now();
        let view = engine.settled().await;
        assert_eq!(
            view.error.as_deref(),
            Some("listing store did not respond within 5s")
        );
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(view.options.city.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn server_mode_reports_total_beyond_page() {
        let store = ScriptedStore::new(&[]);
        let settings = EngineSettings {
            row_cap: 2,
            ..EngineSettings::for_mode(EngineMode::Server)
        };
        let mut engine = ListingEngine::spawn(store, settings);
        engine.dispatch(FilterAction::SortBy(Column::Code));

        let view = engine.settled().await;
        assert_eq!(ids(&view.rows), ["b1", "c1"]);
        assert_eq!(view.total, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_times_out() {
        let store = ScriptedStore::new(&[60_000]);
        let settings = EngineSettings {
            fetch_timeout: Duration::from_secs(5),
            ..EngineSettings::for_mode(EngineMode::Server)
        };
        let engine = ListingEngine::spawn(store, settings);

        let view = engine.settled().await;
        assert!(view.rows.is_empty());
        assert_eq!(
            view.error.as_deref(),
            Some("listing store did not respond within 5s")
        );
    }
}
