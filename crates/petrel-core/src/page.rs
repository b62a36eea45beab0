use crate::Result;
use async_trait::async_trait;

/// Capability interface over the rendered portal page.
///
/// The detectors and the login flow only talk to the page through this
/// trait, so they can be exercised against a fake page in tests while the
/// real implementation drives Chrome over CDP.
///
/// All element lookups are by the HTML `name` attribute, which is how the
/// portal firmware identifies its controls.
#[async_trait]
pub trait PortalPage: Send + Sync {
    /// Navigate the page to the given URL.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Rendered text of the document body.
    async fn body_text(&self) -> Result<String>;

    /// Rendered text of the first element with the given name, if any exists.
    async fn element_text(&self, name: &str) -> Result<Option<String>>;

    /// Whether at least one *visible* element with the given name exists.
    /// Hidden duplicates do not count.
    async fn is_visible(&self, name: &str) -> Result<bool>;

    /// Clear and fill the first visible element with the given name.
    /// Errors if no visible element matches.
    async fn fill_visible(&self, name: &str, value: &str) -> Result<()>;

    /// Select the option with the given value on the first visible
    /// `<select>` with the given name. Returns false when no option
    /// carries that value.
    async fn select_by_value(&self, name: &str, value: &str) -> Result<bool>;

    /// Focus the first visible element with the given name and send the
    /// text as raw keystrokes. Fallback for selector controls that do not
    /// behave like a standard `<select>`.
    async fn send_keys(&self, name: &str, keys: &str) -> Result<()>;

    /// Evaluate a script in the page, discarding its result.
    async fn execute_script(&self, script: &str) -> Result<()>;
}
