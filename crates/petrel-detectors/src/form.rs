//! Form-field waiting, filling, and submission.

use crate::login;
use petrel_core::{Credentials, PortalConfig, PortalPage, Result};
use tokio::time::{sleep, Instant};

/// Outcome of waiting for the login form to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWait {
    /// All three fields are visible and ready to fill.
    Present,
    /// The page flipped to an authenticated state while waiting.
    LoggedIn,
    /// The field budget elapsed without a complete form.
    TimedOut,
}

/// Poll until the username, password, and carrier fields are all visible
/// at once. Hidden duplicates never satisfy the check. Each iteration also
/// re-checks login state: a prior session can become valid while the form
/// is still loading, in which case filling would be wasted work.
pub async fn wait_for_fields(page: &dyn PortalPage, portal: &PortalConfig) -> FieldWait {
    let deadline = Instant::now() + portal.field_timeout;
    loop {
        let all_visible = matches!(page.is_visible(&portal.username_field).await, Ok(true))
            && matches!(page.is_visible(&portal.password_field).await, Ok(true))
            && matches!(page.is_visible(&portal.isp_field).await, Ok(true));
        if all_visible {
            tracing::debug!("All form fields visible");
            return FieldWait::Present;
        }

        if login::is_logged_in(page, portal).await {
            tracing::info!("Page became authenticated while waiting for the form");
            return FieldWait::LoggedIn;
        }

        if Instant::now() >= deadline {
            tracing::warn!(
                "Form fields not visible after {:?}",
                portal.field_timeout
            );
            return FieldWait::TimedOut;
        }
        sleep(portal.poll_interval).await;
    }
}

/// Fill the credentials and trigger submission.
///
/// Username/password fill errors propagate — if those inputs vanished the
/// run is broken. The carrier selector and the submit script are more
/// forgiving: selection falls back to raw key-sends when the control is
/// not a standard `<select>`, and script errors are swallowed because some
/// portal firmwares submit through the form action on their own. The
/// verification wait decides the real outcome.
pub async fn fill_and_submit(
    page: &dyn PortalPage,
    portal: &PortalConfig,
    creds: &Credentials,
) -> Result<()> {
    page.fill_visible(&portal.username_field, &creds.username)
        .await?;
    page.fill_visible(&portal.password_field, &creds.password)
        .await?;

    let suffix = creds.isp.suffix();
    match page.select_by_value(&portal.isp_field, suffix).await {
        Ok(true) => {}
        Ok(false) | Err(_) => {
            tracing::debug!("Structured carrier selection failed, sending raw keys");
            if let Err(e) = page.send_keys(&portal.isp_field, suffix).await {
                tracing::debug!("Carrier key-send fallback failed (ignored): {}", e);
            }
        }
    }

    tracing::debug!("Invoking portal submit script");
    if let Err(e) = page.execute_script(&portal.submit_script).await {
        tracing::debug!("Submit script failed (ignored), form may auto-submit: {}", e);
    }

    Ok(())
}
