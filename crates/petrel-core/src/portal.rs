use std::time::Duration;

/// Everything the login flow needs to know about a specific portal:
/// where it lives, how its form is named, and how long to wait for it.
///
/// Passed explicitly into the detectors and the flow so tests and
/// alternate portals can substitute their own values.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Portal entry URL.
    pub url: String,

    /// `name` attribute of the account input.
    pub username_field: String,
    /// `name` attribute of the password input.
    pub password_field: String,
    /// `name` attribute of the carrier `<select>`.
    pub isp_field: String,
    /// `name` attribute of the status/tip element.
    pub status_field: String,
    /// `name` attribute of the logout control shown once authenticated.
    pub logout_field: String,

    /// Page-global submit trigger. Guarded so portals without the function
    /// fall through to their form's own submit action.
    pub submit_script: String,

    /// Substrings of the status text that indicate an authenticated session.
    pub success_markers: Vec<String>,

    /// Minimum rendered body length for the post-navigation readiness wait.
    pub render_min_len: usize,
    /// Budget for the post-navigation readiness wait.
    pub render_timeout: Duration,
    /// Poll interval during the readiness wait.
    pub render_interval: Duration,

    /// Poll interval for the field wait and the login verification wait.
    pub poll_interval: Duration,
    /// Budget for the three form fields to become visible.
    pub field_timeout: Duration,
    /// Budget for login to become detectable after submission.
    pub verify_timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            url: "http://172.19.0.1/".to_string(),
            username_field: "DDDDD".to_string(),
            password_field: "upass".to_string(),
            isp_field: "ISP_select".to_string(),
            status_field: "PageTips".to_string(),
            logout_field: "logout".to_string(),
            submit_script: "if (typeof ee === 'function') { ee(1); }".to_string(),
            success_markers: vec![
                "成功".to_string(),
                "已成功".to_string(),
                "登录".to_string(),
            ],
            render_min_len: 1,
            render_timeout: Duration::from_secs(1),
            render_interval: Duration::from_millis(50),
            poll_interval: Duration::from_millis(100),
            field_timeout: Duration::from_secs(5),
            verify_timeout: Duration::from_secs(3),
        }
    }
}
