//! Redirect tracing with a scripted headless browser.
//!
//! Every trace gets its own browser process and throwaway profile directory.
//! The session is closed on every exit path before the chain is returned.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{
    EventRequestWillBeSent, EventResponseReceived, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, FrameId, NavigateParams};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::{FutureExt, StreamExt};
use log::{debug, info, warn};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use super::{dedupe_hops, validate_start_url, RedirectTracer};
use crate::config::BROWSER_CLOSE_TIMEOUT;
use crate::error_handling::TraceError;
use crate::models::{
    DeviceProfile, RedirectChain, RedirectHop, TraceConfiguration, TraceStrategy,
};

/// Records every HTTPS response for the top-level document while a headless
/// browser navigates to the start URL.
///
/// Navigation failures and timeouts are not errors: whatever was captured
/// (possibly nothing) is returned. Only a browser that fails to start is.
#[derive(Debug, Clone, Default)]
pub struct BrowserTracer {
    chrome_path: Option<PathBuf>,
}

impl BrowserTracer {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }
}

impl RedirectTracer for BrowserTracer {
    fn strategy(&self) -> TraceStrategy {
        TraceStrategy::ScriptedBrowser
    }

    async fn trace(&self, config: &TraceConfiguration) -> Result<RedirectChain, TraceError> {
        let start_url = match validate_start_url(&config.start_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Navigation error: {e}");
                return Ok(Vec::new());
            }
        };

        let session = BrowserSession::launch(self.chrome_path.as_deref()).await?;
        let captured = session.capture(start_url.as_str(), config).await;
        session.close().await;

        let hops = match captured {
            Ok(hops) => hops,
            Err(e) => {
                warn!("Browser session for {} failed: {e}", config.start_url);
                Vec::new()
            }
        };
        info!(
            "{} trace for {} captured {} document response(s)",
            self.strategy(),
            config.start_url,
            hops.len()
        );
        Ok(dedupe_hops(hops))
    }
}

/// A browser process private to one trace.
struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    // Deleted by close(), or on drop if the session is abandoned
    profile_dir: TempDir,
}

impl BrowserSession {
    async fn launch(chrome_path: Option<&Path>) -> Result<Self, TraceError> {
        let profile_dir = tempfile::Builder::new()
            .prefix("domain-check-profile-")
            .tempdir()
            .map_err(|e| TraceError::BrowserLaunch(format!("profile directory: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile_dir.path());
        if let Some(path) = chrome_path {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(TraceError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| TraceError::BrowserLaunch(e.to_string()))?;

        // The handler drives the CDP connection and must be polled for the
        // lifetime of the browser.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler: {e}");
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            profile_dir,
        })
    }

    /// Navigates to `url` and collects top-level document hops in the order
    /// the browser observed them.
    ///
    /// Errors here mean the page could not be set up; navigation problems are
    /// logged and end the capture early instead.
    async fn capture(
        &self,
        url: &str,
        config: &TraceConfiguration,
    ) -> Result<Vec<RedirectHop>, CdpError> {
        let page = self.browser.new_page("about:blank").await?;
        page.set_user_agent(user_agent_override(config.device_profile)).await?;

        let main_frame = match page.mainframe().await? {
            Some(frame) => frame,
            None => FrameId::new(page.target_id().inner().clone()),
        };

        let mut responses = page.event_listener::<EventResponseReceived>().await?;
        let mut redirects = page.event_listener::<EventRequestWillBeSent>().await?;
        let mut dom_ready = page.event_listener::<EventDomContentEventFired>().await?;

        let outcome = match tokio::time::timeout(
            config.navigation_timeout(),
            navigate(&page, url, &mut dom_ready),
        )
        .await
        {
            Ok(Ok(())) => {
                debug!("DOMContentLoaded for {url}");
                NavigationOutcome::Loaded
            }
            Ok(Err(e)) => {
                warn!("Navigation error for {url}: {e}");
                NavigationOutcome::Failed
            }
            Err(_) => {
                warn!(
                    "Navigation timeout for {url} after {}ms",
                    config.navigation_timeout_ms
                );
                NavigationOutcome::TimedOut
            }
        };

        // Client-side redirects fire after the document has loaded
        if let Some(wait) = settle_wait(outcome, config.settle_timeout()) {
            tokio::time::sleep(wait).await;
        }

        let mut observed: Vec<(f64, RedirectHop)> = Vec::new();
        while let Some(Some(event)) = redirects.next().now_or_never() {
            if let Some(redirect) = &event.redirect_response {
                if let Some(hop) = document_hop(
                    event.r#type.as_ref(),
                    event.frame_id.as_ref(),
                    &main_frame,
                    &redirect.url,
                    redirect.status,
                ) {
                    observed.push((*event.timestamp.inner(), hop));
                }
            }
        }
        while let Some(Some(event)) = responses.next().now_or_never() {
            if let Some(hop) = document_hop(
                Some(&event.r#type),
                event.frame_id.as_ref(),
                &main_frame,
                &event.response.url,
                event.response.status,
            ) {
                observed.push((*event.timestamp.inner(), hop));
            }
        }

        Ok(order_by_observation(observed))
    }

    /// Closes the browser, killing it if it does not exit in time, and
    /// removes the profile directory.
    async fn close(mut self) {
        match tokio::time::timeout(BROWSER_CLOSE_TIMEOUT, self.browser.close()).await {
            Ok(Ok(_)) => {
                if let Err(e) = self.browser.wait().await {
                    debug!("Waiting for browser exit failed: {e}");
                }
            }
            Ok(Err(e)) => {
                debug!("Browser close failed, killing process: {e}");
                self.kill().await;
            }
            Err(_) => {
                debug!(
                    "Browser did not close within {}s, killing process",
                    BROWSER_CLOSE_TIMEOUT.as_secs()
                );
                self.kill().await;
            }
        }
        self.handler_task.abort();
        if let Err(e) = self.profile_dir.close() {
            debug!("Removing browser profile failed: {e}");
        }
    }

    async fn kill(&mut self) {
        if let Some(Err(e)) = self.browser.kill().await {
            warn!("Killing browser process failed: {e}");
        }
    }
}

/// Network-domain UA override for the device being emulated.
pub(crate) fn user_agent_override(device: DeviceProfile) -> SetUserAgentOverrideParams {
    SetUserAgentOverrideParams::new(device.user_agent())
}

/// How the navigation to the start URL ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavigationOutcome {
    Loaded,
    Failed,
    TimedOut,
}

/// Only a loaded document can still redirect client-side; failed or timed
/// out navigations go straight to teardown.
pub(crate) fn settle_wait(outcome: NavigationOutcome, settle: Duration) -> Option<Duration> {
    match outcome {
        NavigationOutcome::Loaded => Some(settle),
        NavigationOutcome::Failed | NavigationOutcome::TimedOut => None,
    }
}

/// Issues the navigation and waits for DOMContentLoaded.
async fn navigate<S>(page: &Page, url: &str, dom_ready: &mut S) -> anyhow::Result<()>
where
    S: futures::Stream + Unpin,
{
    let navigation = page.execute(NavigateParams::new(url)).await?;
    if let Some(error_text) = &navigation.result.error_text {
        anyhow::bail!("{error_text}");
    }
    dom_ready.next().await;
    Ok(())
}

/// Turns an observed response into a hop if it belongs to the top-level
/// document and was served over HTTPS.
///
/// Responses without a frame id are treated as top-level.
pub(crate) fn document_hop(
    resource_type: Option<&ResourceType>,
    frame_id: Option<&FrameId>,
    main_frame: &FrameId,
    url: &str,
    status: i64,
) -> Option<RedirectHop> {
    if resource_type != Some(&ResourceType::Document) {
        return None;
    }
    if frame_id.is_some_and(|frame| frame != main_frame) {
        return None;
    }
    if !url.starts_with("https://") {
        return None;
    }
    let status = u16::try_from(status).ok()?;
    Some(RedirectHop::new(url, status))
}

/// Sorts hops by CDP timestamp; ties keep their insertion order.
pub(crate) fn order_by_observation(mut observed: Vec<(f64, RedirectHop)>) -> Vec<RedirectHop> {
    observed.sort_by(|a, b| a.0.total_cmp(&b.0));
    observed.into_iter().map(|(_, hop)| hop).collect()
}
