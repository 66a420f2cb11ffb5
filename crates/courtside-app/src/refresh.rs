// Fetch → normalize → render for one page region.
//
// A `RefreshTask<R>` bundles everything one region needs: where to fetch,
// how to turn the payload into records of type `R`, how to render them, and
// which records to show when upstream is unusable. Every invocation ends in
// exactly one region update; errors stop at the task boundary.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use courtside_core::normalize::NormalizeError;

use crate::fetch::{Endpoint, FetchError, JsonFetcher};
use crate::region::{RegionSink, RegionUpdate};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("upstream returned no records")]
    Empty,
}

impl From<FetchError> for RefreshError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status { status, .. } => RefreshError::Status(status),
            FetchError::Body { .. } | FetchError::Relay { .. } => {
                RefreshError::Malformed(err.to_string())
            }
            FetchError::Network { .. } | FetchError::InvalidUrl { .. } => {
                RefreshError::Network(err.to_string())
            }
        }
    }
}

impl From<NormalizeError> for RefreshError {
    fn from(err: NormalizeError) -> Self {
        RefreshError::Malformed(err.to_string())
    }
}

/// Which record set ended up in the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Upstream,
    Fallback,
    /// Upstream answered with zero records; the empty-set message is shown.
    Empty,
}

#[derive(Debug)]
pub struct RefreshReport {
    pub task: String,
    pub region: String,
    pub outcome: RefreshOutcome,
    /// Records handed to the renderer.
    pub records: usize,
    /// Why upstream data was not used, when it was not.
    pub error: Option<RefreshError>,
    /// False when the region is not on the page or the write failed.
    pub applied: bool,
}

pub type Normalizer<R> = Box<dyn Fn(Value) -> Result<Vec<R>, NormalizeError> + Send + Sync>;
pub type Renderer<R> = Box<dyn Fn(&[R]) -> RegionUpdate + Send + Sync>;
pub type RecordsHook<R> = Box<dyn Fn(&[R]) + Send + Sync>;

#[async_trait]
pub trait Refresh: Send + Sync {
    fn name(&self) -> &str;
    fn region(&self) -> &str;
    /// Re-run period. `None` means the task runs at startup only.
    fn interval(&self) -> Option<Duration>;
    async fn refresh(&self, fetcher: &dyn JsonFetcher, sink: &dyn RegionSink) -> RefreshReport;
}

pub struct RefreshTask<R> {
    name: String,
    region: String,
    endpoint: Endpoint,
    interval: Option<Duration>,
    normalize: Normalizer<R>,
    render: Renderer<R>,
    fallback: Vec<R>,
    on_records: Option<RecordsHook<R>>,
}

impl<R: Send + Sync + 'static> RefreshTask<R> {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        endpoint: Endpoint,
        normalize: impl Fn(Value) -> Result<Vec<R>, NormalizeError> + Send + Sync + 'static,
        render: impl Fn(&[R]) -> RegionUpdate + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            endpoint,
            interval: None,
            normalize: Box::new(normalize),
            render: Box::new(render),
            fallback: Vec::new(),
            on_records: None,
        }
    }

    /// Records rendered when upstream fails. Empty by default, which renders
    /// the task's empty-set content.
    pub fn with_fallback(mut self, fallback: Vec<R>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval;
        self
    }

    /// Called with the upstream records (possibly none) after every
    /// successful fetch. Not called when the fallback is used.
    pub fn on_records(mut self, hook: impl Fn(&[R]) + Send + Sync + 'static) -> Self {
        self.on_records = Some(Box::new(hook));
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn fetch_records(&self, fetcher: &dyn JsonFetcher) -> Result<Vec<R>, RefreshError> {
        let payload = fetcher.get_json(&self.endpoint).await?;
        let records = (self.normalize)(payload)?;
        if records.is_empty() {
            return Err(RefreshError::Empty);
        }
        Ok(records)
    }
}

#[async_trait]
impl<R: Send + Sync + 'static> Refresh for RefreshTask<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn interval(&self) -> Option<Duration> {
        self.interval
    }

    async fn refresh(&self, fetcher: &dyn JsonFetcher, sink: &dyn RegionSink) -> RefreshReport {
        let fetched = self.fetch_records(fetcher).await;

        let (update, outcome, records, error) = match fetched {
            Ok(records) => {
                if let Some(hook) = &self.on_records {
                    hook(&records);
                }
                info!(task = %self.name, records = records.len(), "refreshed from upstream");
                ((self.render)(&records), RefreshOutcome::Upstream, records.len(), None)
            }
            Err(RefreshError::Empty) => {
                if let Some(hook) = &self.on_records {
                    hook(&[]);
                }
                info!(task = %self.name, "upstream returned no records");
                (
                    (self.render)(&[]),
                    RefreshOutcome::Empty,
                    0,
                    Some(RefreshError::Empty),
                )
            }
            Err(e) => {
                warn!(
                    task = %self.name,
                    error = %e,
                    fallback = self.fallback.len(),
                    "refresh failed, rendering fallback"
                );
                (
                    (self.render)(&self.fallback),
                    RefreshOutcome::Fallback,
                    self.fallback.len(),
                    Some(e),
                )
            }
        };

        let applied = match sink.apply(&self.region, update) {
            Ok(applied) => {
                if !applied {
                    debug!(task = %self.name, region = %self.region, "region not on page");
                }
                applied
            }
            Err(e) => {
                error!(task = %self.name, error = %e, "failed to apply region update");
                false
            }
        };

        RefreshReport {
            task: self.name.clone(),
            region: self.region.clone(),
            outcome,
            records,
            error,
            applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::MemoryRegionSink;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Stub {
        Ok(Value),
        Status(u16),
        BadBody,
        Unreachable,
    }

    #[async_trait]
    impl JsonFetcher for Stub {
        async fn get_json(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
            match self {
                Stub::Ok(v) => Ok(v.clone()),
                Stub::Status(status) => Err(FetchError::Status {
                    url: endpoint.url.clone(),
                    status: *status,
                }),
                Stub::BadBody => Err(FetchError::Body {
                    url: endpoint.url.clone(),
                    message: "expected value".into(),
                }),
                Stub::Unreachable => Err(FetchError::InvalidUrl {
                    url: endpoint.url.clone(),
                    message: "relative URL without a base".into(),
                }),
            }
        }
    }

    fn numbers(payload: Value) -> Result<Vec<u32>, NormalizeError> {
        let items = payload
            .get("items")
            .and_then(Value::as_array)
            .ok_or(NormalizeError::MissingField("items"))?;
        Ok(items.iter().filter_map(|v| v.as_u64()).map(|n| n as u32).collect())
    }

    fn render_numbers(items: &[u32]) -> RegionUpdate {
        if items.is_empty() {
            return RegionUpdate::Replace("none".into());
        }
        RegionUpdate::Replace(
            items
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    fn task() -> RefreshTask<u32> {
        RefreshTask::new(
            "numbers",
            "numbersRegion",
            Endpoint::direct("https://example.invalid/numbers"),
            numbers,
            render_numbers,
        )
        .with_fallback(vec![9, 9])
    }

    #[tokio::test]
    async fn upstream_records_are_rendered() {
        let sink = MemoryRegionSink::new(["numbersRegion"]);
        let report = task()
            .refresh(&Stub::Ok(json!({ "items": [1, 2, 3] })), &sink)
            .await;

        assert_eq!(report.outcome, RefreshOutcome::Upstream);
        assert_eq!(report.records, 3);
        assert!(report.error.is_none());
        assert!(report.applied);
        assert_eq!(
            sink.history(),
            vec![(
                "numbersRegion".to_string(),
                RegionUpdate::Replace("1,2,3".into())
            )]
        );
    }

    #[tokio::test]
    async fn http_error_renders_fallback() {
        let sink = MemoryRegionSink::new(["numbersRegion"]);
        let report = task().refresh(&Stub::Status(503), &sink).await;

        assert_eq!(report.outcome, RefreshOutcome::Fallback);
        assert!(matches!(report.error, Some(RefreshError::Status(503))));
        assert_eq!(
            sink.latest("numbersRegion"),
            Some(RegionUpdate::Replace("9,9".into()))
        );
    }

    #[tokio::test]
    async fn malformed_payload_renders_fallback() {
        let sink = MemoryRegionSink::new(["numbersRegion"]);
        let report = task().refresh(&Stub::Ok(json!({ "wrong": true })), &sink).await;
        assert_eq!(report.outcome, RefreshOutcome::Fallback);
        assert!(matches!(report.error, Some(RefreshError::Malformed(_))));

        let report = task().refresh(&Stub::BadBody, &sink).await;
        assert!(matches!(report.error, Some(RefreshError::Malformed(_))));
        assert_eq!(sink.history().len(), 2);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_network_failure() {
        let sink = MemoryRegionSink::new(["numbersRegion"]);
        let report = task().refresh(&Stub::Unreachable, &sink).await;
        assert_eq!(report.outcome, RefreshOutcome::Fallback);
        assert!(matches!(report.error, Some(RefreshError::Network(_))));
        assert_eq!(
            sink.latest("numbersRegion"),
            Some(RegionUpdate::Replace("9,9".into()))
        );
    }

    #[tokio::test]
    async fn fetch_errors_map_onto_refresh_errors() {
        let url = "https://example.invalid/numbers".to_string();

        // Fails while building the request, so nothing leaves the machine.
        let source = reqwest::get("not a url").await.unwrap_err();
        let network = RefreshError::from(FetchError::Network {
            url: url.clone(),
            source,
        });
        assert!(matches!(network, RefreshError::Network(_)));

        let invalid = RefreshError::from(FetchError::InvalidUrl {
            url: url.clone(),
            message: "bad".into(),
        });
        assert!(matches!(invalid, RefreshError::Network(_)));

        let status = RefreshError::from(FetchError::Status {
            url: url.clone(),
            status: 404,
        });
        assert!(matches!(status, RefreshError::Status(404)));

        let relay = RefreshError::from(FetchError::Relay {
            url,
            message: "http_code 500".into(),
        });
        assert!(matches!(relay, RefreshError::Malformed(_)));
    }

    #[tokio::test]
    async fn empty_upstream_renders_empty_message_not_fallback() {
        let sink = MemoryRegionSink::new(["numbersRegion"]);
        let report = task().refresh(&Stub::Ok(json!({ "items": [] })), &sink).await;
        assert_eq!(report.outcome, RefreshOutcome::Empty);
        assert_eq!(
            sink.latest("numbersRegion"),
            Some(RegionUpdate::Replace("none".into()))
        );
    }

    #[tokio::test]
    async fn missing_region_is_not_applied() {
        let sink = MemoryRegionSink::new(["elsewhere"]);
        let report = task()
            .refresh(&Stub::Ok(json!({ "items": [1] })), &sink)
            .await;
        assert!(!report.applied);
        assert!(sink.history().is_empty());
    }

    #[tokio::test]
    async fn hook_sees_upstream_records_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let task = task().on_records(move |records: &[u32]| {
            seen.fetch_add(records.len() + 1, Ordering::SeqCst);
        });
        let sink = MemoryRegionSink::new(["numbersRegion"]);

        task.refresh(&Stub::Ok(json!({ "items": [4, 5] })), &sink).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        task.refresh(&Stub::Status(500), &sink).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        task.refresh(&Stub::Ok(json!({ "items": [] })), &sink).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
