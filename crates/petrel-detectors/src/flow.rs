//! The login flow state machine:
//! navigate → initial check → field wait → fill/submit → verify.

use crate::form::{self, FieldWait};
use crate::login;
use petrel_core::{Credentials, PortalConfig, PortalPage, Result};

/// Terminal outcome of a login run. The CLI maps these to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session was authenticated before any form interaction.
    AlreadyLoggedIn,
    /// The form was filled, submitted, and success was detected.
    LoggedIn,
    /// The required form fields never became visible.
    FieldsNotFound,
    /// Submission happened but no success state was detected.
    LoginFailed,
}

/// Run one login attempt against the portal. Detection and timeout
/// failures come back as outcomes; only page-communication failures on
/// the mandatory steps (navigation, credential fill) surface as `Err`.
pub async fn run(
    page: &dyn PortalPage,
    portal: &PortalConfig,
    creds: &Credentials,
) -> Result<LoginOutcome> {
    page.navigate(&portal.url).await?;

    if login::is_logged_in_after_render(page, portal).await {
        tracing::info!("Already logged in");
        return Ok(LoginOutcome::AlreadyLoggedIn);
    }

    match form::wait_for_fields(page, portal).await {
        FieldWait::Present => {}
        FieldWait::LoggedIn => return Ok(LoginOutcome::AlreadyLoggedIn),
        FieldWait::TimedOut => {
            // The form may have been replaced by the logged-in view while
            // earlier checks raced the render.
            return Ok(if login::is_logged_in(page, portal).await {
                LoginOutcome::AlreadyLoggedIn
            } else {
                LoginOutcome::FieldsNotFound
            });
        }
    }

    form::fill_and_submit(page, portal, creds).await?;

    if login::wait_for_login(page, portal, portal.verify_timeout).await {
        tracing::info!("Login succeeded");
        return Ok(LoginOutcome::LoggedIn);
    }

    // One last immediate check; the success marker can land right at the
    // verification deadline.
    Ok(if login::is_logged_in(page, portal).await {
        tracing::info!("Login succeeded on final re-check");
        LoginOutcome::LoggedIn
    } else {
        tracing::warn!("No success state detected after submission");
        LoginOutcome::LoginFailed
    })
}
