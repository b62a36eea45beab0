use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType,
};
use chromiumoxide::Page;
use futures::StreamExt;
use petrel_core::PortalPage;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Options for launching the controlled Chrome instance.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub chrome_path: PathBuf,
    pub headless: bool,
}

/// A live Chrome instance with a single page pointed at the portal.
///
/// Owns the browser process, its CDP handler task, and a throwaway profile
/// directory that is removed when the session is dropped. Implements
/// [`PortalPage`] by evaluating JavaScript in the page; element lookups go
/// through `document.getElementsByName` and only consider elements the
/// page actually renders.
pub struct PortalSession {
    browser: Mutex<Browser>,
    handler_task: JoinHandle<()>,
    page: Page,
    _profile_dir: tempfile::TempDir,
}

impl PortalSession {
    /// Launch Chrome with popups and extensions disabled and open a blank
    /// page. Navigation happens later through [`PortalPage::navigate`];
    /// readiness is the detector's job, not the navigation call's.
    pub async fn launch(opts: &SessionOptions) -> Result<Self> {
        let profile_dir = tempfile::tempdir().map_err(Error::Io)?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&opts.chrome_path)
            .user_data_dir(profile_dir.path())
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        // with_head() keeps chromiumoxide from injecting the legacy
        // --headless flag; new headless mode is added explicitly.
        builder = if opts.headless {
            builder.with_head().arg("--headless=new")
        } else {
            builder.with_head()
        };

        let config = builder.build().map_err(Error::Browser)?;

        tracing::info!("Launching Chrome from {}", opts.chrome_path.display());
        let (browser, mut handler) = Browser::launch(config).await?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser: Mutex::new(browser),
            handler_task,
            page,
            _profile_dir: profile_dir,
        })
    }

    /// Best-effort shutdown. Called on every exit path; failures are
    /// logged and ignored.
    pub async fn close(&self) {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close failed (ignored): {}", e);
        }
        self.handler_task.abort();
    }

    async fn eval_bool(&self, script: String) -> Result<bool> {
        self.page
            .evaluate(script)
            .await?
            .into_value::<bool>()
            .map_err(|e| Error::Cdp(e.to_string()))
    }
}

fn page_err(e: impl std::fmt::Display) -> petrel_core::Error {
    petrel_core::Error::Page(e.to_string())
}

/// Quote a Rust string as a JavaScript string literal.
fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

// Shared visibility predicate: an element counts only if the page gives
// it layout boxes and it is not styled away. Portal pages render hidden
// duplicates of the form fields, which must never be picked up.
const VISIBLE_FN: &str = "const visible = (el) => { \
     const style = window.getComputedStyle(el); \
     return style.display !== 'none' && style.visibility !== 'hidden' \
         && el.getClientRects().length > 0; };";

fn body_text_script() -> String {
    "document.body ? document.body.innerText : ''".to_string()
}

fn element_text_script(name: &str) -> String {
    format!(
        "(() => {{ const els = document.getElementsByName({name}); \
         if (els.length === 0) return null; \
         const el = els[0]; \
         return el.innerText !== undefined ? el.innerText : (el.textContent || ''); }})()",
        name = js_str(name),
    )
}

fn is_visible_script(name: &str) -> String {
    format!(
        "(() => {{ {VISIBLE_FN} \
         return Array.from(document.getElementsByName({name})).some(visible); }})()",
        name = js_str(name),
    )
}

fn fill_script(name: &str, value: &str) -> String {
    format!(
        "(() => {{ {VISIBLE_FN} \
         const el = Array.from(document.getElementsByName({name})).find(visible); \
         if (!el) return false; \
         el.focus(); \
         el.value = ''; \
         el.value = {value}; \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return true; }})()",
        name = js_str(name),
        value = js_str(value),
    )
}

fn select_script(name: &str, value: &str) -> String {
    format!(
        "(() => {{ {VISIBLE_FN} \
         const el = Array.from(document.getElementsByName({name})).find(visible); \
         if (!el || el.tagName !== 'SELECT') return false; \
         const opt = Array.from(el.options).find((o) => o.value === {value}); \
         if (!opt) return false; \
         el.value = {value}; \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return true; }})()",
        name = js_str(name),
        value = js_str(value),
    )
}

fn focus_script(name: &str) -> String {
    format!(
        "(() => {{ {VISIBLE_FN} \
         const el = Array.from(document.getElementsByName({name})).find(visible); \
         if (!el) return false; \
         el.focus(); \
         return true; }})()",
        name = js_str(name),
    )
}

#[async_trait]
impl PortalPage for PortalSession {
    async fn navigate(&self, url: &str) -> petrel_core::Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.page.goto(url).await.map_err(page_err)?;
        Ok(())
    }

    async fn body_text(&self) -> petrel_core::Result<String> {
        self.page
            .evaluate(body_text_script())
            .await
            .map_err(page_err)?
            .into_value::<String>()
            .map_err(page_err)
    }

    async fn element_text(&self, name: &str) -> petrel_core::Result<Option<String>> {
        self.page
            .evaluate(element_text_script(name))
            .await
            .map_err(page_err)?
            .into_value::<Option<String>>()
            .map_err(page_err)
    }

    async fn is_visible(&self, name: &str) -> petrel_core::Result<bool> {
        self.eval_bool(is_visible_script(name)).await.map_err(page_err)
    }

    async fn fill_visible(&self, name: &str, value: &str) -> petrel_core::Result<()> {
        let filled = self
            .eval_bool(fill_script(name, value))
            .await
            .map_err(page_err)?;
        if !filled {
            return Err(page_err(format!("no visible element named {name:?}")));
        }
        Ok(())
    }

    async fn select_by_value(&self, name: &str, value: &str) -> petrel_core::Result<bool> {
        self.eval_bool(select_script(name, value))
            .await
            .map_err(page_err)
    }

    async fn send_keys(&self, name: &str, keys: &str) -> petrel_core::Result<()> {
        let focused = self
            .eval_bool(focus_script(name))
            .await
            .map_err(page_err)?;
        if !focused {
            return Err(page_err(format!("no visible element named {name:?}")));
        }

        for c in keys.chars() {
            let key_down = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::KeyDown)
                .text(c.to_string())
                .build()
                .map_err(page_err)?;
            self.page.execute(key_down).await.map_err(page_err)?;

            let key_up = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::KeyUp)
                .build()
                .map_err(page_err)?;
            self.page.execute(key_up).await.map_err(page_err)?;
        }
        Ok(())
    }

    async fn execute_script(&self, script: &str) -> petrel_core::Result<()> {
        self.page
            .evaluate(script.to_string())
            .await
            .map_err(page_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Launch/close require a real Chrome and are exercised manually; the
    // script builders are covered here.

    #[test]
    fn test_js_str_quotes_and_escapes() {
        assert_eq!(js_str("abc"), "\"abc\"");
        assert_eq!(js_str("a\"b"), "\"a\\\"b\"");
        assert_eq!(js_str("a'b\\c"), "\"a'b\\\\c\"");
    }

    #[test]
    fn test_fill_script_embeds_quoted_values() {
        let script = fill_script("upass", "p@ss'w\"d");
        assert!(script.contains("document.getElementsByName(\"upass\")"));
        assert!(script.contains("el.value = \"p@ss'w\\\"d\""));
        assert!(script.contains("dispatchEvent"));
    }

    #[test]
    fn test_select_script_checks_option_values() {
        let script = select_script("ISP_select", "@cmcc");
        assert!(script.contains("el.tagName !== 'SELECT'"));
        assert!(script.contains("o.value === \"@cmcc\""));
    }

    #[test]
    fn test_visibility_scripts_skip_hidden_elements() {
        for script in [
            is_visible_script("DDDDD"),
            fill_script("DDDDD", "x"),
            focus_script("DDDDD"),
        ] {
            assert!(script.contains("getClientRects"));
            assert!(script.contains("display !== 'none'"));
        }
    }

    #[test]
    fn test_element_text_script_returns_null_when_absent() {
        let script = element_text_script("PageTips");
        assert!(script.contains("return null"));
        assert!(script.contains("document.getElementsByName(\"PageTips\")"));
    }
}
