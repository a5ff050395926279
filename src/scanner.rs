// SPDX-License-Identifier: PMPL-1.0-or-later
//! Document scanning.
//!
//! A scan resolves the document shape once, snapshots each container's
//! elements, flattens them and runs every rule. Failures are contained:
//! a document that cannot be read yields a single error issue, and a
//! container whose tree is too deep is reported and skipped.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::advisor::{AdviceClient, AdviceContext};
use crate::config::RulesConfig;
use crate::error::Result;
use crate::host::{materialize, Container, HostDocument, JsonDocument};
use crate::issue::{Category, Issue, Severity};
use crate::report::Report;
use crate::rules;
use crate::walker;

/// Scan a whole document
pub async fn scan_document(doc: &dyn HostDocument, config: &RulesConfig) -> Report {
    let shape = match doc.shape().await {
        Ok(shape) => shape,
        Err(e) => {
            warn!("Document validation failed: {}", e);
            return Report::new(vec![document_error(&e.to_string())], 0);
        }
    };
    debug!("Scanning {} document", shape.name());

    let mut issues = Vec::new();
    let mut total_elements = 0;

    for container in shape.containers() {
        match scan_container(&container, config).await {
            Ok((count, found)) => {
                debug!("{}: {} elements, {} issues", container.label, count, found.len());
                total_elements += count;
                issues.extend(found);
            }
            Err(e) => {
                warn!("Skipping {}: {}", container.label, e);
                issues.push(document_error(&format!("{}: {}", container.label, e)));
            }
        }
    }

    info!("Scanned {} elements, found {} issues", total_elements, issues.len());
    Report::new(issues, total_elements)
}

async fn scan_container(container: &Container<'_>, config: &RulesConfig) -> Result<(usize, Vec<Issue>)> {
    let mut roots = Vec::with_capacity(container.children.len());
    for node in &container.children {
        roots.push(materialize(*node).await?);
    }

    let visited = walker::flatten_children(&roots)?;
    Ok((visited.len(), rules::evaluate(&visited, config)))
}

fn document_error(message: &str) -> Issue {
    Issue::new(Severity::Error, Category::Error, "Document Validation Error")
        .with_description(format!("Unable to fully validate document: {}", message))
        .with_suggestion("Try scanning again or check if the document is properly loaded.")
}

/// Load a JSON document from disk and scan it
pub async fn scan_path(path: &Path, config: &RulesConfig) -> Result<Report> {
    info!("Scanning document: {}", path.display());
    let doc = JsonDocument::from_path(path).await?;
    Ok(scan_document(&doc, config).await)
}

/// Serializes scans and optionally enriches them with advice
pub struct Validator {
    rules: RulesConfig,
    advisor: Option<AdviceClient>,
    context: AdviceContext,
    scan_lock: Mutex<()>,
}

impl Validator {
    pub fn new(rules: RulesConfig, advisor: Option<AdviceClient>) -> Self {
        Self {
            rules,
            advisor,
            context: AdviceContext::default(),
            scan_lock: Mutex::new(()),
        }
    }

    pub fn with_context(mut self, context: AdviceContext) -> Self {
        self.context = context;
        self
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    pub fn advisor(&self) -> Option<&AdviceClient> {
        self.advisor.as_ref()
    }

    /// Run one scan. A scan requested while another is running waits for it.
    pub async fn validate(&self, doc: &dyn HostDocument) -> Report {
        let _guard = self.scan_lock.lock().await;
        scan_document(doc, &self.rules).await
    }

    /// Scan, then attach advice to every issue when an advisor is configured
    pub async fn validate_with_advice(&self, doc: &dyn HostDocument) -> Report {
        let report = self.validate(doc).await;
        match &self.advisor {
            Some(advisor) if !report.issues.is_empty() => {
                let advice = advisor.get_bulk_advice(&report.issues, &self.context).await;
                report.with_advice(&advice)
            }
            _ => report,
        }
    }
}

/// Re-scans a document on a fixed interval until stopped
pub struct ContinuousValidation {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ContinuousValidation {
    /// Start scanning `doc` every `interval`; each report is passed to
    /// `on_report`. The first scan runs immediately.
    pub fn start<D, F>(validator: Arc<Validator>, doc: Arc<D>, interval: Duration, mut on_report: F) -> Self
    where
        D: HostDocument + 'static,
        F: FnMut(Report) + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                // Stop wins over a tick that came due during the last scan
                tokio::select! {
                    biased;

                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let report = validator.validate(doc.as_ref()).await;
                        debug!("Continuous scan: score {}, {} issues", report.score, report.issues.len());
                        on_report(report);
                    }
                }
            }
            info!("Continuous validation stopped");
        });

        info!("Continuous validation started, interval {:?}", interval);
        Self { stop_tx, handle }
    }

    /// Stop scheduling further scans. A scan already running completes.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!("Continuous validation task ended abnormally: {}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::host::DocumentShape;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MissingDocument;

    #[async_trait]
    impl HostDocument for MissingDocument {
        async fn shape(&self) -> Result<DocumentShape<'_>> {
            Err(Error::NoDocument("no document open".to_string()))
        }
    }

    /// Counts scans and holds each one open for a while
    struct SlowDocument {
        inner: JsonDocument,
        active: AtomicUsize,
        max_active: AtomicUsize,
        scans: AtomicUsize,
    }

    impl SlowDocument {
        fn new() -> Self {
            Self {
                inner: r#"{"pages": [{"children": [{"type": "text", "text": "Hi", "fontSize": 14}]}]}"#
                    .parse()
                    .unwrap(),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                scans: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HostDocument for SlowDocument {
        async fn shape(&self) -> Result<DocumentShape<'_>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            self.scans.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.inner.shape().await
        }
    }

    #[tokio::test]
    async fn test_missing_document_yields_error_issue() {
        let report = scan_document(&MissingDocument, &RulesConfig::default()).await;
        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.title, "Document Validation Error");
        assert_eq!(issue.severity, Severity::Error);
        assert!(issue.description.starts_with("Unable to fully validate document: "));
        assert!(issue.description.contains("no document open"));
        assert_eq!(report.total_elements, 0);
        assert_eq!(report.score, 100);
    }

    #[tokio::test]
    async fn test_flat_and_nested_agree() {
        let flat: JsonDocument = r#"{"pages": [{"children": [
            {"type": "text", "text": "Small text", "fontSize": 8},
            {"type": "image", "altText": ""}
        ]}]}"#
            .parse()
            .unwrap();
        let nested: JsonDocument = r#"{"pages": [{"artboards": [{"children": [
            {"type": "text", "text": "Small text", "fontSize": 8},
            {"type": "image", "altText": ""}
        ]}]}]}"#
            .parse()
            .unwrap();

        let config = RulesConfig::default();
        let a = scan_document(&flat, &config).await;
        let b = scan_document(&nested, &config).await;

        let titles = |r: &Report| r.issues.iter().map(|i| i.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(&a), titles(&b));
        assert_eq!(titles(&a), vec!["Text Too Small", "Long Text Lines", "Missing Alt Text"]);
        assert_eq!(a.total_elements, 2);
        assert_eq!(a.score, b.score);
        assert_eq!(a.score, 100 - 15 - 5 - 15);
    }

    #[tokio::test]
    async fn test_overlapping_scans_are_serialized() {
        let validator = Arc::new(Validator::new(RulesConfig::default(), None));
        let doc = Arc::new(SlowDocument::new());

        let (first, second) = tokio::join!(
            validator.validate(doc.as_ref()),
            validator.validate(doc.as_ref())
        );

        assert_eq!(doc.scans.load(Ordering::SeqCst), 2);
        assert_eq!(doc.max_active.load(Ordering::SeqCst), 1);
        assert_eq!(first.total_elements, 1);
        assert_eq!(second.total_elements, 1);
    }

    #[tokio::test]
    async fn test_validate_without_advisor_leaves_advice_empty() {
        let validator = Validator::new(RulesConfig::default(), None);
        assert!(!validator.has_advisor());
        let report = validator.validate_with_advice(&JsonDocument::sample()).await;
        assert!(!report.issues.is_empty());
        assert!(report.issues.iter().all(|i| i.ai_advice.is_none()));
    }

    #[tokio::test]
    async fn test_continuous_validation_stops() {
        let validator = Arc::new(Validator::new(RulesConfig::default(), None));
        let doc = Arc::new(SlowDocument::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let watcher = ContinuousValidation::start(
            validator,
            Arc::clone(&doc),
            Duration::from_millis(10),
            move |report| {
                let _ = tx.send(report.score);
            },
        );

        // At least two scans arrive
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
        assert!(watcher.is_running());

        watcher.stop().await;
        let after_stop = doc.scans.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(doc.scans.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_during_report_starts_no_new_scan() {
        for _ in 0..10 {
            let validator = Arc::new(Validator::new(RulesConfig::default(), None));
            let doc = Arc::new(SlowDocument::new());
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

            // The handler outlives the 1ms interval, so a tick is due when it returns
            let watcher = ContinuousValidation::start(
                validator,
                Arc::clone(&doc),
                Duration::from_millis(1),
                move |_report| {
                    let _ = tx.send(());
                    std::thread::sleep(Duration::from_millis(20));
                },
            );

            assert!(rx.recv().await.is_some());
            let scans_when_stopped = doc.scans.load(Ordering::SeqCst);
            watcher.stop().await;
            assert_eq!(doc.scans.load(Ordering::SeqCst), scans_when_stopped);
        }
    }
}
