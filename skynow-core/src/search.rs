//! Debounced autocomplete.
//!
//! Every keystroke bumps a generation counter and starts a trailing-edge
//! delay. When the delay elapses the request is only issued if no newer
//! keystroke arrived, and its result is only applied if it is still the
//! latest generation when it completes.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{runtime::Handle, sync::watch, task::JoinHandle};

use crate::{model::GeocodingResult, provider::Geocoder};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchPhase {
    Idle,
    Debouncing,
    Searching,
    Resolved(Vec<GeocodingResult>),
    NotFound,
    Failed(String),
}

impl SearchPhase {
    pub fn is_settled(&self) -> bool {
        !matches!(self, SearchPhase::Debouncing | SearchPhase::Searching)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub generation: u64,
    pub query: String,
    pub phase: SearchPhase,
}

impl SearchSnapshot {
    pub fn suggestions(&self) -> &[GeocodingResult] {
        match &self.phase {
            SearchPhase::Resolved(list) => list,
            _ => &[],
        }
    }
}

#[derive(Debug)]
struct Inner {
    geocoder: Arc<dyn Geocoder>,
    delay: Duration,
    generation: AtomicU64,
    updates: watch::Sender<SearchSnapshot>,
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Applies `phase` unless a newer keystroke superseded `generation`.
    fn apply(&self, generation: u64, phase: SearchPhase) -> bool {
        self.updates.send_if_modified(|snapshot| {
            if snapshot.generation != generation || !self.is_current(generation) {
                return false;
            }
            snapshot.phase = phase;
            true
        })
    }
}

/// Suggestion search driven by keystrokes.
#[derive(Debug, Clone)]
pub struct SuggestionController {
    inner: Arc<Inner>,
    runtime: Handle,
}

impl SuggestionController {
    /// Must be called from within a tokio runtime.
    pub fn new(geocoder: Arc<dyn Geocoder>, delay: Duration) -> Self {
        let (updates, _) = watch::channel(SearchSnapshot {
            generation: 0,
            query: String::new(),
            phase: SearchPhase::Idle,
        });

        Self {
            inner: Arc::new(Inner {
                geocoder,
                delay,
                generation: AtomicU64::new(0),
                updates,
            }),
            runtime: Handle::current(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.updates.borrow().clone()
    }

    pub fn suggestions(&self) -> Vec<GeocodingResult> {
        self.inner.updates.borrow().suggestions().to_vec()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Records a keystroke. Blank input resets to `Idle` without a request.
    /// Returns the debounce task, `None` for blank input.
    pub fn on_input(&self, text: &str) -> Option<JoinHandle<()>> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = text.trim().to_string();
        let blank = query.is_empty();

        self.inner.updates.send_replace(SearchSnapshot {
            generation,
            query: query.clone(),
            phase: if blank {
                SearchPhase::Idle
            } else {
                SearchPhase::Debouncing
            },
        });

        if blank {
            return None;
        }

        let inner = Arc::clone(&self.inner);
        Some(self.runtime.spawn(async move {
            tokio::time::sleep(inner.delay).await;
            if !inner.apply(generation, SearchPhase::Searching) {
                return;
            }

            tracing::debug!(%query, generation, "searching suggestions");
            let phase = match inner.geocoder.search_suggestions(&query).await {
                Ok(list) if list.is_empty() => SearchPhase::NotFound,
                Ok(list) => SearchPhase::Resolved(list),
                Err(err) => {
                    tracing::warn!(%query, error = %err, "suggestion search failed");
                    SearchPhase::Failed(err.to_string())
                }
            };

            if !inner.apply(generation, phase) {
                tracing::debug!(%query, generation, "discarding superseded suggestions");
            }
        }))
    }

    /// Drops pending work and any shown suggestions.
    pub fn reset(&self) {
        self.on_input("");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::{FakeProvider, weather};

    fn provider() -> FakeProvider {
        FakeProvider::new()
            .with_place("Yaoundé", 3.848, 11.5021, weather(24.0, "nuageux"))
            .with_place("Yamoussoukro", 6.8276, -5.2893, weather(30.0, "ciel dégagé"))
            .with_place("Douala", 4.0511, 9.7679, weather(29.0, "ciel dégagé"))
    }

    fn names(snapshot: &SearchSnapshot) -> Vec<&str> {
        snapshot.suggestions().iter().map(|s| s.name.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_trailing_keystroke_issues_a_request() {
        let provider = Arc::new(provider());
        let ctrl = SuggestionController::new(provider.clone(), Duration::from_millis(300));

        ctrl.on_input("D");
        tokio::time::sleep(Duration::from_millis(100)).await;
        ctrl.on_input("Do");
        tokio::time::sleep(Duration::from_millis(100)).await;
        let last = ctrl.on_input("Dou").expect("debounce task");

        assert_eq!(ctrl.snapshot().phase, SearchPhase::Debouncing);
        last.await.expect("task");

        assert_eq!(provider.network_calls(), 1);
        let snapshot = ctrl.snapshot();
        assert_eq!(snapshot.query, "Dou");
        assert_eq!(names(&snapshot), ["Douala"]);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_resets_without_network() {
        let provider = Arc::new(provider());
        let ctrl = SuggestionController::new(provider.clone(), Duration::from_millis(300));

        let pending = ctrl.on_input("Ya").expect("debounce task");
        assert!(ctrl.on_input("   ").is_none());
        pending.await.expect("task");

        assert_eq!(provider.network_calls(), 0);
        assert_eq!(ctrl.snapshot().phase, SearchPhase::Idle);
        assert!(ctrl.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_responses_are_discarded() {
        let provider = Arc::new(provider().with_suggestion_delay("Ya", Duration::from_secs(2)));
        let ctrl = SuggestionController::new(provider.clone(), Duration::from_millis(300));

        let slow = ctrl.on_input("Ya").expect("debounce task");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(ctrl.snapshot().phase, SearchPhase::Searching);

        let fast = ctrl.on_input("Yao").expect("debounce task");
        fast.await.expect("task");
        assert_eq!(names(&ctrl.snapshot()), ["Yaoundé"]);

        slow.await.expect("task");
        assert_eq!(provider.network_calls(), 2);
        let snapshot = ctrl.snapshot();
        assert_eq!(snapshot.query, "Yao");
        assert_eq!(names(&snapshot), ["Yaoundé"]);
    }

    #[tokio::test(start_paused = true)]
    async fn no_match_is_not_found() {
        let ctrl = SuggestionController::new(Arc::new(provider()), Duration::from_millis(300));

        ctrl.on_input("Zz").expect("debounce task").await.expect("task");

        let snapshot = ctrl.snapshot();
        assert_eq!(snapshot.phase, SearchPhase::NotFound);
        assert!(snapshot.phase.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn provider_error_is_failed_without_suggestions() {
        let provider = Arc::new(provider());
        provider.fail_suggestions(Some("geocoder down"));
        let ctrl = SuggestionController::new(provider.clone(), Duration::from_millis(300));

        ctrl.on_input("Dou").expect("debounce task").await.expect("task");

        let snapshot = ctrl.snapshot();
        assert!(matches!(snapshot.phase, SearchPhase::Failed(ref msg) if msg.contains("503")));
        assert!(snapshot.phase.is_settled());
        assert!(ctrl.suggestions().is_empty());
        assert_eq!(provider.network_calls(), 1);

        provider.fail_suggestions(None);
        ctrl.on_input("Doua").expect("debounce task").await.expect("task");
        assert_eq!(ctrl.suggestions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_resolution() {
        let ctrl = SuggestionController::new(Arc::new(provider()), Duration::from_millis(300));
        let mut rx = ctrl.subscribe();

        ctrl.on_input("Yam");
        let settled = rx
            .wait_for(|s| s.phase.is_settled())
            .await
            .expect("controller alive")
            .clone();

        assert_eq!(names(&settled), ["Yamoussoukro"]);
    }
}
