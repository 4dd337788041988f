use crate::error::Result;
use std::fmt;
use std::time::Duration;

/// Opaque handle to a live DOM element.
///
/// Wraps a selector that addresses exactly one element for the lifetime of
/// the page load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn selector(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How to pick an option of a `<select>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBy {
    /// Visible option text
    Label(String),
    /// Underlying `value` attribute
    Value(String),
    /// Position among the options
    Index(usize),
}

/// Browser actions for form automation.
///
/// Element queries return handles that stay valid until the next navigation.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL and wait for the page to load, bounded by `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// All elements matching a CSS selector, in document order
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// First element matching a CSS selector
    async fn query(&self, selector: &str) -> Result<Option<ElementHandle>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    /// First element matching `selector` inside the element's parent
    async fn query_in_parent(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>>;

    /// Uppercase tag name
    async fn tag_name(&self, element: &ElementHandle) -> Result<String>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    /// Text content of the element and its descendants
    async fn text_content(&self, element: &ElementHandle) -> Result<Option<String>>;

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool>;

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool>;

    async fn click(&self, element: &ElementHandle) -> Result<()>;

    /// Replace the value of an input, textarea or editable element
    async fn fill(&self, element: &ElementHandle, value: &str) -> Result<()>;

    /// Select an option of a `<select>` element and return the selected option's value
    async fn select_option(&self, element: &ElementHandle, by: &SelectBy) -> Result<String>;

    /// Check or uncheck a checkbox or radio
    async fn set_checked(&self, element: &ElementHandle, checked: bool) -> Result<()>;

    /// Press a key on whatever currently has focus
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Release the page and its browser
    async fn close(&self) -> Result<()>;
}

/// Opens a fresh, exclusively owned page per application run.
#[async_trait::async_trait]
pub trait PageLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserActions>>;
}

/// Quote a value for use inside a CSS attribute selector.
pub fn css_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\a "),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
