//! Navigation Resolver
//!
//! Drives a single [`Viewport`] through its lifecycle and decides which
//! channel delivers an address:
//!
//! ```text
//! Uninitialized ──init ok──▶ Ready
//!       │                      │ engine error: report, then set address
//!   init failed                ▼
//!       ▼                   (stays Ready)
//!    Failed ──next navigation retries init──▶ Ready | Failed
//! ```
//!
//! When the engine cannot be started the address is set directly instead.
//! Failures are collected in the returned [`NavigationReport`] for the
//! caller to show; none of them aborts navigation.

use log::{error, info, warn};

use super::address::normalize_address;
use super::viewport::Viewport;
use crate::error::WaymarkError;
use crate::workflow::NodeRef;

/// Lifecycle of the viewport's rich engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    Uninitialized,
    Ready,
    /// The last initialization attempt failed. The next navigation retries.
    Failed,
}

/// How an address reached the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Engine,
    Address,
    None,
}

/// Outcome of one navigation request.
#[derive(Debug)]
pub struct NavigationReport {
    pub url: String,
    pub channel: Channel,
    /// Failures to surface to the user, in the order they happened.
    pub errors: Vec<WaymarkError>,
}

impl NavigationReport {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            channel: Channel::None,
            errors: Vec::new(),
        }
    }

    /// True if some channel displayed the address.
    pub fn delivered(&self) -> bool {
        self.channel != Channel::None
    }

    /// True if the address was delivered without any failure along the way.
    pub fn is_clean(&self) -> bool {
        self.channel == Channel::Engine && self.errors.is_empty()
    }
}

/// The navigation target of a selected node: a step's URL, nothing for
/// workflows and tasks.
pub fn resolve(node: NodeRef<'_>) -> Option<&str> {
    match node {
        NodeRef::Step(step) => Some(step.url()),
        NodeRef::Workflow(_) | NodeRef::Task(_) => None,
    }
}

/// Routes addresses to a single viewport.
#[derive(Debug)]
pub struct Navigator<V: Viewport> {
    viewport: V,
    state: ViewportState,
}

impl<V: Viewport> Navigator<V> {
    pub fn new(viewport: V) -> Self {
        Self {
            viewport,
            state: ViewportState::Uninitialized,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Eager startup attempt. A failure is only logged; the first
    /// navigation will try again.
    pub async fn initialize(&mut self) -> ViewportState {
        if self.state != ViewportState::Ready {
            if let Err(reason) = self.start_engine().await {
                warn!("Viewport initialization failed: {}", reason);
            }
        }
        self.state
    }

    async fn start_engine(&mut self) -> Result<(), String> {
        match self.viewport.initialize().await {
            Ok(()) => {
                self.state = ViewportState::Ready;
                info!("Viewport ready");
                Ok(())
            }
            Err(reason) => {
                self.state = ViewportState::Failed;
                Err(reason)
            }
        }
    }

    /// Shows `url` in the viewport.
    ///
    /// An engine that is not ready is started first. If it cannot start,
    /// the address is set directly. If the started engine fails to
    /// navigate, the failure is reported and the address is set directly
    /// as a last resort; a failure of that last resort is only logged.
    pub async fn navigate(&mut self, url: &str) -> NavigationReport {
        let mut report = NavigationReport::new(url);

        if self.state != ViewportState::Ready {
            if let Err(reason) = self.start_engine().await {
                warn!("Viewport unavailable, setting address directly: {}", reason);
                report.errors.push(WaymarkError::ViewportInit(reason));

                match self.viewport.set_address(url) {
                    Ok(()) => report.channel = Channel::Address,
                    Err(reason) => {
                        error!("Error loading URL {}: {}", url, reason);
                        report.errors.push(WaymarkError::Navigation {
                            url: url.to_string(),
                            reason,
                        });
                    }
                }
                return report;
            }
        }

        match self.viewport.navigate(url).await {
            Ok(()) => {
                info!("Navigated to {}", url);
                report.channel = Channel::Engine;
            }
            Err(reason) => {
                error!("Error loading URL {}: {}", url, reason);
                report.errors.push(WaymarkError::Navigation {
                    url: url.to_string(),
                    reason,
                });

                match self.viewport.set_address(url) {
                    Ok(()) => report.channel = Channel::Address,
                    Err(reason) => warn!("Setting address {} also failed: {}", url, reason),
                }
            }
        }

        report
    }

    /// Navigates to the selected node's target. Workflows and tasks are
    /// ignored and yield `None`.
    pub async fn open(&mut self, node: NodeRef<'_>) -> Option<NavigationReport> {
        let url = resolve(node)?.to_string();
        Some(self.navigate(&url).await)
    }

    /// Navigates to a user-typed address after normalizing it. Blank
    /// input yields `None`.
    pub async fn go(&mut self, input: &str) -> Option<NavigationReport> {
        let url = normalize_address(input)?;
        Some(self.navigate(&url).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Step, Task, Workflow};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Scripted viewport that records every call.
    #[derive(Debug, Default)]
    struct RecordingViewport {
        init_results: VecDeque<Result<(), String>>,
        navigate_results: VecDeque<Result<(), String>>,
        address_result: Option<String>,
        init_calls: usize,
        navigated: Vec<String>,
        addresses: Vec<String>,
    }

    impl RecordingViewport {
        fn failing_init() -> Self {
            Self {
                init_results: VecDeque::from([Err("engine missing".to_string())]),
                ..Self::default()
            }
        }

        fn failing_navigation() -> Self {
            Self {
                navigate_results: VecDeque::from([Err("renderer crashed".to_string())]),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Viewport for RecordingViewport {
        async fn initialize(&mut self) -> Result<(), String> {
            self.init_calls += 1;
            self.init_results.pop_front().unwrap_or(Ok(()))
        }

        async fn navigate(&mut self, url: &str) -> Result<(), String> {
            self.navigated.push(url.to_string());
            self.navigate_results.pop_front().unwrap_or(Ok(()))
        }

        fn set_address(&mut self, url: &str) -> Result<(), String> {
            self.addresses.push(url.to_string());
            match &self.address_result {
                Some(reason) => Err(reason.clone()),
                None => Ok(()),
            }
        }
    }

    fn store() -> Vec<Workflow> {
        vec![Workflow::new("w").with_task(
            Task::new("t").with_step(Step::new("s", "https://docs.example.com")),
        )]
    }

    #[test]
    fn test_resolve_only_steps() {
        let workflows = store();
        let task = &workflows[0].tasks()[0];

        assert_eq!(resolve(NodeRef::Step(&task.steps()[0])), Some("https://docs.example.com"));
        assert_eq!(resolve(NodeRef::Task(task)), None);
        assert_eq!(resolve(NodeRef::Workflow(&workflows[0])), None);
    }

    #[tokio::test]
    async fn test_navigate_initializes_lazily() {
        let mut navigator = Navigator::new(RecordingViewport::default());
        assert_eq!(navigator.state(), ViewportState::Uninitialized);

        let report = navigator.navigate("https://a.example").await;

        assert!(report.is_clean());
        assert_eq!(navigator.state(), ViewportState::Ready);
        assert_eq!(navigator.viewport().init_calls, 1);
        assert_eq!(navigator.viewport().navigated, vec!["https://a.example"]);
        assert!(navigator.viewport().addresses.is_empty());
    }

    #[tokio::test]
    async fn test_ready_viewport_is_not_reinitialized() {
        let mut navigator = Navigator::new(RecordingViewport::default());
        assert_eq!(navigator.initialize().await, ViewportState::Ready);

        navigator.navigate("https://a.example").await;
        navigator.navigate("https://b.example").await;

        assert_eq!(navigator.viewport().init_calls, 1);
        assert_eq!(navigator.viewport().navigated.len(), 2);
    }

    #[tokio::test]
    async fn test_init_failure_falls_back_to_address_once() {
        let mut navigator = Navigator::new(RecordingViewport::failing_init());

        let report = navigator.navigate("https://a.example").await;

        assert_eq!(navigator.state(), ViewportState::Failed);
        assert_eq!(report.channel, Channel::Address);
        assert!(matches!(report.errors.as_slice(), [WaymarkError::ViewportInit(_)]));
        assert_eq!(navigator.viewport().addresses, vec!["https://a.example"]);
        assert!(navigator.viewport().navigated.is_empty());
    }

    #[tokio::test]
    async fn test_failed_state_is_retried() {
        let mut navigator = Navigator::new(RecordingViewport::failing_init());
        assert_eq!(navigator.initialize().await, ViewportState::Failed);

        let report = navigator.navigate("https://a.example").await;

        assert!(report.is_clean());
        assert_eq!(navigator.state(), ViewportState::Ready);
        assert_eq!(navigator.viewport().init_calls, 2);
    }

    #[tokio::test]
    async fn test_engine_failure_reports_then_sets_address() {
        let mut navigator = Navigator::new(RecordingViewport::failing_navigation());

        let report = navigator.navigate("https://a.example").await;

        assert_eq!(report.channel, Channel::Address);
        assert!(matches!(
            report.errors.as_slice(),
            [WaymarkError::Navigation { url, .. }] if url == "https://a.example"
        ));
        assert_eq!(navigator.viewport().addresses, vec!["https://a.example"]);
        assert_eq!(navigator.state(), ViewportState::Ready);
    }

    #[tokio::test]
    async fn test_last_resort_failure_is_swallowed() {
        let mut viewport = RecordingViewport::failing_navigation();
        viewport.address_result = Some("no address bar".to_string());
        let mut navigator = Navigator::new(viewport);

        let report = navigator.navigate("https://a.example").await;

        assert_eq!(report.channel, Channel::None);
        assert_eq!(report.errors.len(), 1);
        assert!(!report.delivered());
    }

    #[tokio::test]
    async fn test_init_and_address_failure_both_reported() {
        let mut viewport = RecordingViewport::failing_init();
        viewport.address_result = Some("no address bar".to_string());
        let mut navigator = Navigator::new(viewport);

        let report = navigator.navigate("https://a.example").await;

        assert!(!report.delivered());
        assert!(matches!(
            report.errors.as_slice(),
            [WaymarkError::ViewportInit(_), WaymarkError::Navigation { .. }]
        ));
        assert_eq!(navigator.viewport().addresses.len(), 1);
    }

    #[tokio::test]
    async fn test_open_step_and_ignore_others() {
        let workflows = store();
        let task = &workflows[0].tasks()[0];
        let mut navigator = Navigator::new(RecordingViewport::default());

        assert!(navigator.open(NodeRef::Task(task)).await.is_none());
        assert!(navigator.open(NodeRef::Workflow(&workflows[0])).await.is_none());
        assert_eq!(navigator.viewport().init_calls, 0);

        let report = navigator.open(NodeRef::Step(&task.steps()[0])).await.unwrap();
        assert_eq!(report.url, "https://docs.example.com");
    }

    #[tokio::test]
    async fn test_go_normalizes_typed_address() {
        let mut navigator = Navigator::new(RecordingViewport::default());

        let report = navigator.go("  example.com ").await.unwrap();
        assert_eq!(report.url, "https://example.com");

        navigator.go("http://example.com").await.unwrap();
        assert_eq!(
            navigator.viewport().navigated,
            vec!["https://example.com", "http://example.com"]
        );

        assert!(navigator.go("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_stored_url_is_not_normalized() {
        let workflows = vec![Workflow::new("w").with_task(
            Task::new("t").with_step(Step::new("s", "intranet/page")),
        )];
        let mut navigator = Navigator::new(RecordingViewport::default());

        let step = &workflows[0].tasks()[0].steps()[0];
        navigator.open(NodeRef::Step(step)).await.unwrap();
        assert_eq!(navigator.viewport().navigated, vec!["intranet/page"]);
    }
}
