//! Live point values.
//!
//! A [`LiveValueResolver`] polls a [`LiveValueSource`] on a fixed interval
//! and publishes each successful result as a new [`LiveValueMap`] snapshot.
//! Snapshots are replaced wholesale, never merged; a failed poll keeps the
//! previous snapshot so rendering continues with stale data.
//!
//! Live values never touch element records. They only feed the render-time
//! view, so a poll racing a property edit cannot corrupt persisted state.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::errors::SourceError;
use crate::log;
use crate::model::{Element, coerce_number};

/// Shortest poll period; shorter requests are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// One entry of a source's `list()` result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointValue {
    /// Point identifier, as a string or a number.
    pub id: Value,
    #[serde(default)]
    pub value: Value,
}

impl PointValue {
    pub fn new(id: impl Into<Value>, value: impl Into<Value>) -> Self {
        PointValue {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Opaque session credential handed to every fetch.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(Option<String>);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(Some(token.into()))
    }

    pub fn anonymous() -> Self {
        Credential(None)
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Credential(<redacted>)"),
            None => f.write_str("Credential(anonymous)"),
        }
    }
}

/// Something that can list current point values.
pub trait LiveValueSource: Send + Sync + 'static {
    fn list(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<PointValue>, SourceError>> + Send;
}

/// A source that always returns the same points. Used for offline
/// previews and by the `hmi-render` binary.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    points: Vec<PointValue>,
}

impl StaticSource {
    pub fn new(points: Vec<PointValue>) -> Self {
        Self { points }
    }

    /// Parse a JSON array of `{id, value}` records.
    pub fn from_json(source: &str) -> Result<Self, SourceError> {
        let points: Vec<PointValue> = serde_json::from_str(source).map_err(|e| SourceError::Malformed {
            reason: e.to_string(),
        })?;
        Ok(Self::new(points))
    }

    pub fn points(&self) -> &[PointValue] {
        &self.points
    }
}

impl LiveValueSource for StaticSource {
    fn list(
        &self,
        _credential: &Credential,
    ) -> impl Future<Output = Result<Vec<PointValue>, SourceError>> + Send {
        let points = self.points.clone();
        async move { Ok(points) }
    }
}

// ============================================================================
// Value map
// ============================================================================

/// Point id → latest value.
///
/// Every point is stored under each textual form of its id (raw, trimmed
/// and, when numeric, the canonical number) so lookups succeed no matter
/// which form a binding uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveValueMap {
    values: HashMap<String, Value>,
    points: usize,
}

impl LiveValueMap {
    pub fn from_points(points: Vec<PointValue>) -> Self {
        let count = points.len();
        let mut values = HashMap::with_capacity(count * 2);
        for point in points {
            for key in key_forms(&point.id) {
                values.insert(key, point.value.clone());
            }
        }
        LiveValueMap {
            values,
            points: count,
        }
    }

    /// Number of points in the poll result this map was built from.
    pub fn point_count(&self) -> usize {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points == 0
    }

    /// Look up by any id form (string, number, padded string).
    pub fn lookup(&self, id: &Value) -> Option<&Value> {
        key_forms(id).into_iter().find_map(|key| self.values.get(&key))
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.lookup(&Value::String(id.to_string()))
    }
}

/// Every textual key a point id is addressable by.
fn key_forms(id: &Value) -> Vec<String> {
    let mut keys = Vec::with_capacity(3);
    let mut push = |key: String| {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    };
    match id {
        Value::String(s) => {
            push(s.clone());
            push(s.trim().to_string());
        }
        Value::Number(n) => push(n.to_string()),
        _ => return keys,
    }
    if let Some(n) = coerce_number(id) {
        push(canonical_number(n));
    }
    keys
}

fn canonical_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// The value an element is drawn with: its bound live point when it has a
/// binding, otherwise its static `current_value` property.
pub fn resolve_value<'a>(element: &'a Element, values: &'a LiveValueMap) -> Option<&'a Value> {
    match &element.data_binding_source {
        Some(source) => values.get(source),
        None => element.props.get("current_value").filter(|v| !v.is_null()),
    }
}

// ============================================================================
// Resolver and poll task
// ============================================================================

/// Read handle on the current snapshot.
#[derive(Debug, Clone)]
pub struct LiveValues(watch::Receiver<Arc<LiveValueMap>>);

impl LiveValues {
    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<LiveValueMap> {
        self.0.borrow().clone()
    }

    /// Wait for the next snapshot. Returns false once the resolver is gone.
    pub async fn changed(&mut self) -> bool {
        self.0.changed().await.is_ok()
    }
}

/// Polls a source and publishes snapshots.
pub struct LiveValueResolver<S> {
    source: Arc<S>,
    credential: Credential,
    tx: watch::Sender<Arc<LiveValueMap>>,
}

impl<S: LiveValueSource> LiveValueResolver<S> {
    pub fn new(source: S, credential: Credential) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(LiveValueMap::default()));
        Self {
            source: Arc::new(source),
            credential,
            tx,
        }
    }

    pub fn values(&self) -> LiveValues {
        LiveValues(self.tx.subscribe())
    }

    /// Poll once. On success the snapshot is replaced and the number of
    /// points returned; on failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize, SourceError> {
        match self.source.list(&self.credential).await {
            Ok(points) => {
                let map = LiveValueMap::from_points(points);
                let count = map.point_count();
                self.tx.send_replace(Arc::new(map));
                log::debug!(points = count, "live values refreshed");
                Ok(count)
            }
            Err(err) => {
                log::warn!(%err, "live value poll failed, keeping previous values");
                Err(err)
            }
        }
    }

    /// Start polling every `interval` (at least [`MIN_POLL_INTERVAL`]),
    /// first poll immediately. The loop lives until the returned
    /// [`PollTask`] is cancelled or dropped.
    pub fn spawn(self, interval: Duration) -> PollTask {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let values = self.values();
        log::info!(interval_ms = interval.as_millis() as u64, "live value polling started");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = async {
                        ticker.tick().await;
                        let _ = self.refresh().await;
                    } => {}
                }
            }
            log::debug!("live value polling stopped");
        });
        PollTask {
            token,
            handle: Some(handle),
            values,
        }
    }
}

/// Guard for a running poll loop. Cancels the loop when dropped, so
/// polling never outlives the scene that owns it.
#[derive(Debug)]
pub struct PollTask {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
    values: LiveValues,
}

impl PollTask {
    pub fn values(&self) -> LiveValues {
        self.values.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a script of poll results, then repeats the last one.
    struct ScriptedSource {
        calls: Arc<AtomicUsize>,
        script: Mutex<Vec<Result<Vec<PointValue>, SourceError>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<PointValue>, SourceError>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = ScriptedSource {
                calls: calls.clone(),
                script: Mutex::new(script),
            };
            (source, calls)
        }
    }

    impl LiveValueSource for ScriptedSource {
        fn list(
            &self,
            credential: &Credential,
        ) -> impl Future<Output = Result<Vec<PointValue>, SourceError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if credential.token().is_none() {
                Err(SourceError::Unauthorized)
            } else {
                let mut script = self.script.lock().unwrap();
                if script.len() > 1 {
                    script.remove(0)
                } else {
                    script.first().cloned().unwrap_or_else(|| Ok(Vec::new()))
                }
            };
            async move { result }
        }
    }

    fn token() -> Credential {
        Credential::new("secret")
    }

    #[test]
    fn lookup_accepts_every_id_form() {
        let map = LiveValueMap::from_points(vec![
            PointValue::new(7, 21.5),
            PointValue::new(" pump.speed ", 1200),
            PointValue::new("007", "padded"),
        ]);
        assert_eq!(map.lookup(&json!(7)), Some(&json!("padded")));
        assert_eq!(map.get("pump.speed"), Some(&json!(1200)));
        assert_eq!(map.get(" pump.speed "), Some(&json!(1200)));
        assert_eq!(map.get("007"), Some(&json!("padded")));
        assert_eq!(map.lookup(&json!(7.0)), Some(&json!("padded")));
        assert_eq!(map.get("missing"), None);
        assert_eq!(map.point_count(), 3);
    }

    #[test]
    fn numeric_ids_match_string_bindings() {
        let map = LiveValueMap::from_points(vec![PointValue::new(12, true)]);
        assert_eq!(map.get("12"), Some(&json!(true)));
        assert_eq!(map.get(" 12 "), Some(&json!(true)));
    }

    #[test]
    fn resolve_value_prefers_binding() {
        let map = LiveValueMap::from_points(vec![PointValue::new("t1", 60)]);
        let mut el = Element::new("g".into(), ElementKind::VerticalGauge, 0.0, 0.0);
        el.set_prop("current_value", 75);
        assert_eq!(resolve_value(&el, &map), Some(&json!(75)));

        el.data_binding_source = Some("t1".into());
        assert_eq!(resolve_value(&el, &map), Some(&json!(60)));

        el.data_binding_source = Some("t2".into());
        assert_eq!(resolve_value(&el, &map), None);
    }

    #[test]
    fn credential_debug_is_redacted() {
        assert_eq!(format!("{:?}", token()), "Credential(<redacted>)");
    }

    #[tokio::test]
    async fn refresh_replaces_wholesale() {
        let (source, _) = ScriptedSource::new(vec![
            Ok(vec![PointValue::new("a", 1), PointValue::new("b", 2)]),
            Ok(vec![PointValue::new("a", 10)]),
        ]);
        let resolver = LiveValueResolver::new(source, token());
        let values = resolver.values();

        assert_eq!(resolver.refresh().await, Ok(2));
        assert_eq!(values.snapshot().get("b"), Some(&json!(2)));

        assert_eq!(resolver.refresh().await, Ok(1));
        let snap = values.snapshot();
        assert_eq!(snap.get("a"), Some(&json!(10)));
        assert_eq!(snap.get("b"), None);
    }

    #[tokio::test]
    async fn failed_poll_keeps_previous_snapshot() {
        let (source, _) = ScriptedSource::new(vec![
            Ok(vec![PointValue::new("a", 1)]),
            Err(SourceError::Unavailable { reason: "timeout".into() }),
        ]);
        let resolver = LiveValueResolver::new(source, token());
        let values = resolver.values();

        resolver.refresh().await.unwrap();
        let before = values.snapshot();
        assert!(resolver.refresh().await.is_err());
        assert_eq!(values.snapshot(), before);
        assert_eq!(values.snapshot().get("a"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn credential_is_passed_to_source() {
        let (source, _) = ScriptedSource::new(vec![Ok(vec![])]);
        let resolver = LiveValueResolver::new(source, Credential::anonymous());
        assert_eq!(resolver.refresh().await, Err(SourceError::Unauthorized));
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_interval_until_cancelled() {
        let (source, calls) = ScriptedSource::new(vec![Ok(vec![PointValue::new("a", 1)])]);
        let task = LiveValueResolver::new(source, token()).spawn(Duration::from_millis(2000));

        tokio::time::sleep(Duration::from_millis(4100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(task.values().snapshot().get("a"), Some(&json!(1)));

        task.cancel();
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_task_stops_polling() {
        let (source, calls) = ScriptedSource::new(vec![Ok(vec![])]);
        let task = LiveValueResolver::new(source, token()).spawn(Duration::from_millis(2000));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(task);
        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_polls_at_the_floor() {
        let (source, calls) = ScriptedSource::new(vec![Ok(vec![PointValue::new("a", 1)])]);
        let task = LiveValueResolver::new(source, token()).spawn(Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let polled = calls.load(Ordering::SeqCst);
        assert!(polled >= 5, "{polled} polls");
        assert_eq!(task.values().snapshot().get("a"), Some(&json!(1)));
        task.shutdown().await;
    }

    #[test]
    fn static_source_parses_json() {
        let source = StaticSource::from_json(r#"[{"id": 1, "value": 3.5}, {"id": "x"}]"#).unwrap();
        assert_eq!(source.points().len(), 2);
        assert_eq!(source.points()[1].value, Value::Null);
        assert!(StaticSource::from_json("{").is_err());
    }
}
