//! Form submission.

use blitz_browser::{BrowserActions, BrowserError, ElementHandle};
use blitz_core::SubmissionMethod;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Elements that may carry a button caption.
const BUTTON_LIKE_SELECTOR: &str = "button, [role='button']";

/// A way of locating a submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    /// First visible element matching a CSS selector
    Css(&'static str),
    /// First visible button whose text contains the caption, case-insensitively
    ButtonText(&'static str),
}

impl fmt::Display for SubmitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => f.write_str(selector),
            Self::ButtonText(caption) => write!(f, "button:contains('{caption}')"),
        }
    }
}

/// Submit controls in priority order.
pub const SUBMIT_TARGETS: [SubmitTarget; 8] = [
    SubmitTarget::Css("button[type='submit']"),
    SubmitTarget::Css("input[type='submit']"),
    SubmitTarget::ButtonText("Submit"),
    SubmitTarget::ButtonText("Apply"),
    SubmitTarget::ButtonText("Send"),
    SubmitTarget::Css("[data-testid='submit']"),
    SubmitTarget::Css(".submit-button"),
    SubmitTarget::Css(".apply-button"),
];

/// Submit the current form.
///
/// Clicks the first visible control from [`SUBMIT_TARGETS`] and waits
/// `settle`. When none is usable, presses Enter on the page instead. That
/// fallback is not verified: it returns [`SubmissionMethod::KeyboardFallback`]
/// whenever the key press itself goes through.
///
/// # Errors
///
/// Returns the key press error when the keyboard fallback cannot be sent.
pub async fn submit(
    page: &dyn BrowserActions,
    settle: Duration,
) -> Result<SubmissionMethod, BrowserError> {
    for target in SUBMIT_TARGETS {
        let Some(button) = locate(page, target).await else {
            continue;
        };
        match page.click(&button).await {
            Ok(()) => {
                info!(%target, "clicked submit control");
                pause(settle).await;
                return Ok(SubmissionMethod::Button {
                    selector: target.to_string(),
                });
            }
            Err(e) => warn!(%target, "submit click failed: {e}"),
        }
    }

    debug!("no submit control found, pressing Enter");
    page.press_key("Enter").await?;
    pause(settle).await;
    Ok(SubmissionMethod::KeyboardFallback)
}

/// First visible element for `target`; lookup errors count as not found.
async fn locate(page: &dyn BrowserActions, target: SubmitTarget) -> Option<ElementHandle> {
    match target {
        SubmitTarget::Css(selector) => {
            let candidates = page.query_all(selector).await.ok()?;
            for candidate in candidates {
                if visible(page, &candidate).await {
                    return Some(candidate);
                }
            }
            None
        }
        SubmitTarget::ButtonText(caption) => {
            let caption = caption.to_lowercase();
            let buttons = page.query_all(BUTTON_LIKE_SELECTOR).await.ok()?;
            for button in buttons {
                let text = page.text_content(&button).await.ok().flatten();
                let matches = text.is_some_and(|t| t.to_lowercase().contains(&caption));
                if matches && visible(page, &button).await {
                    return Some(button);
                }
            }
            None
        }
    }
}

async fn visible(page: &dyn BrowserActions, handle: &ElementHandle) -> bool {
    page.is_visible(handle).await.unwrap_or(false)
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
