//! Login-state detection.
//!
//! The portal renders progressively, so detection is two-phase: first wait
//! for the body to show any text at all, then check for the authenticated
//! markers. Every page-communication error here collapses to "not logged
//! in" — a wrong negative only costs a retry, a wrong positive skips the
//! login entirely.

use petrel_core::{PortalConfig, PortalPage};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Poll until the rendered body text reaches `min_len` characters or the
/// timeout elapses. Returns whether readiness was observed; callers
/// proceed to element checks either way.
pub async fn wait_for_render(
    page: &dyn PortalPage,
    min_len: usize,
    timeout: Duration,
    interval: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(text) = page.body_text().await {
            if text.trim().chars().count() >= min_len {
                return true;
            }
        }
        if Instant::now() >= deadline {
            tracing::debug!("Body text never reached {} characters", min_len);
            return false;
        }
        sleep(interval).await;
    }
}

/// Element-based check: authenticated iff the status element carries one
/// of the success markers, or a visible logout control exists.
///
/// Only reliable once the page has rendered; pair with
/// [`wait_for_render`] right after navigation.
pub async fn is_logged_in(page: &dyn PortalPage, portal: &PortalConfig) -> bool {
    if let Ok(Some(text)) = page.element_text(&portal.status_field).await {
        let text = text.trim();
        if !text.is_empty() && portal.success_markers.iter().any(|m| text.contains(m.as_str())) {
            tracing::debug!("Status element reports success: {:?}", text);
            return true;
        }
    }

    matches!(page.is_visible(&portal.logout_field).await, Ok(true))
}

/// Quick check used right after the page opens: give the body a short
/// window to render, then run the element check.
pub async fn is_logged_in_after_render(page: &dyn PortalPage, portal: &PortalConfig) -> bool {
    wait_for_render(
        page,
        portal.render_min_len,
        portal.render_timeout,
        portal.render_interval,
    )
    .await;
    is_logged_in(page, portal).await
}

/// Poll the element check until it reports logged in or the timeout
/// elapses. Used to verify the outcome after submission.
pub async fn wait_for_login(
    page: &dyn PortalPage,
    portal: &PortalConfig,
    timeout: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if is_logged_in(page, portal).await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(portal.poll_interval).await;
    }
}
