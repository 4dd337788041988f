use crate::actions::{BrowserActions, ElementHandle, PageLauncher, SelectBy};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use blitz_core::BrowserConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::stream::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Attribute used to tag queried elements so later calls can address them.
const HANDLE_ATTR: &str = "data-blitz-handle";

/// Envelope returned by every element-level script.
#[derive(Debug, Deserialize)]
struct ScriptReply<T> {
    found: bool,
    value: Option<T>,
}

/// Browser automation engine: one Chromium process driving one page.
pub struct BrowserEngine {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch a browser with the given settings and open a blank page.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let fingerprint = FingerprintConfig::from_config(config);

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .viewport(Viewport {
                width: fingerprint.viewport_width,
                height: fingerprint.viewport_height,
                ..Viewport::default()
            })
            .arg("--disable-dev-shm-usage")
            .args(fingerprint.launch_args());
        if !config.headless {
            builder = builder.with_head();
        }
        let chrome_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        tracing::debug!(user_agent = %fingerprint.user_agent, "browser launched");

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
        })
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }

    /// Run `body` (a JS expression over `el`) against the element.
    async fn on_element<T: DeserializeOwned>(
        &self,
        element: &ElementHandle,
        body: &str,
    ) -> Result<Option<T>> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return {{ found: false }}; \
             return {{ found: true, value: ({body}) }}; }})()",
            sel = js_string(element.selector()),
        );
        let reply: ScriptReply<T> = self.evaluate(script).await?;
        if reply.found {
            Ok(reply.value)
        } else {
            Err(BrowserError::SelectorNotFound(element.selector().to_string()))
        }
    }

    async fn on_element_flag(&self, element: &ElementHandle, body: &str) -> Result<bool> {
        Ok(self.on_element::<bool>(element, body).await?.unwrap_or(false))
    }

    fn handles(ids: Vec<String>) -> Vec<ElementHandle> {
        ids.into_iter()
            .map(|id| ElementHandle::new(format!("[{HANDLE_ATTR}=\"{id}\"]")))
            .collect()
    }
}

/// JS snippet tagging `el` with a stable handle id and returning the id.
fn tag_script(el: &str) -> String {
    format!(
        "(() => {{ let id = {el}.getAttribute('{HANDLE_ATTR}'); \
         if (!id) {{ window.__blitzNext = (window.__blitzNext || 0) + 1; \
         id = String(window.__blitzNext); {el}.setAttribute('{HANDLE_ATTR}', id); }} \
         return id; }})()"
    )
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn key_definition(key: &str) -> (&str, Option<&'static str>, Option<i64>) {
    match key {
        "Enter" => ("Enter", Some("\r"), Some(13)),
        "Tab" => ("Tab", Some("\t"), Some(9)),
        "Escape" => ("Escape", None, Some(27)),
        _ => (key, None, None),
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        url::Url::parse(url)
            .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {e}")))?;

        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(e.to_string())),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {url} did not finish within {timeout:?}"
            ))),
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let script = format!(
            "Array.from(document.querySelectorAll({sel})).map(el => {tag})",
            sel = js_string(selector),
            tag = tag_script("el"),
        );
        let ids: Vec<String> = self.evaluate(script).await?;
        Ok(Self::handles(ids))
    }

    async fn query_in_parent(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        let body = format!(
            "(() => {{ const found = el.parentElement && el.parentElement.querySelector({sel}); \
             return found ? {tag} : null; }})()",
            sel = js_string(selector),
            tag = tag_script("found"),
        );
        let id: Option<String> = self.on_element(element, &body).await?;
        Ok(id.and_then(|id| Self::handles(vec![id]).pop()))
    }

    async fn tag_name(&self, element: &ElementHandle) -> Result<String> {
        Ok(self
            .on_element::<String>(element, "el.tagName")
            .await?
            .unwrap_or_default())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let body = format!("el.getAttribute({})", js_string(name));
        self.on_element(element, &body).await
    }

    async fn text_content(&self, element: &ElementHandle) -> Result<Option<String>> {
        self.on_element(element, "el.textContent").await
    }

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool> {
        self.on_element_flag(
            element,
            "(() => { const r = el.getBoundingClientRect(); const s = getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; })()",
        )
        .await
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        self.on_element_flag(
            element,
            "!el.disabled && el.getAttribute('aria-disabled') !== 'true'",
        )
        .await
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let target = self
            .page
            .find_element(element.selector())
            .await
            .map_err(|_| BrowserError::SelectorNotFound(element.selector().to_string()))?;
        target.click().await.map_err(|e| BrowserError::Interaction {
            selector: element.selector().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, value: &str) -> Result<()> {
        let body = format!(
            "(() => {{ const v = {v}; \
             let proto = null; \
             if (el instanceof HTMLInputElement) proto = HTMLInputElement.prototype; \
             else if (el instanceof HTMLTextAreaElement) proto = HTMLTextAreaElement.prototype; \
             el.focus(); \
             if (proto) {{ Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, v); }} \
             else if (el.isContentEditable) {{ el.textContent = v; }} \
             else {{ return false; }} \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            v = js_string(value),
        );
        if self.on_element_flag(element, &body).await? {
            Ok(())
        } else {
            Err(BrowserError::Interaction {
                selector: element.selector().to_string(),
                reason: "element does not accept text".to_string(),
            })
        }
    }

    async fn select_option(&self, element: &ElementHandle, by: &SelectBy) -> Result<String> {
        let finder = match by {
            SelectBy::Label(label) => format!(
                "opts.findIndex(o => o.label.trim() === {l} || o.text.trim() === {l})",
                l = js_string(label.trim())
            ),
            SelectBy::Value(value) => {
                format!("opts.findIndex(o => o.value === {})", js_string(value))
            }
            SelectBy::Index(index) => format!("({index} < opts.length ? {index} : -1)"),
        };
        let body = format!(
            "(() => {{ if (!(el instanceof HTMLSelectElement)) return null; \
             const opts = Array.from(el.options); const idx = {finder}; \
             if (idx < 0) return null; \
             el.selectedIndex = idx; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return opts[idx].value; }})()"
        );
        self.on_element::<String>(element, &body)
            .await?
            .ok_or_else(|| BrowserError::Interaction {
                selector: element.selector().to_string(),
                reason: format!("no option matching {by:?}"),
            })
    }

    async fn set_checked(&self, element: &ElementHandle, checked: bool) -> Result<()> {
        let body = format!(
            "(() => {{ const want = {checked}; \
             if (el.checked !== want) el.click(); \
             if (el.checked !== want) {{ el.checked = want; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); }} \
             return el.checked === want; }})()"
        );
        if self.on_element_flag(element, &body).await? {
            Ok(())
        } else {
            Err(BrowserError::Interaction {
                selector: element.selector().to_string(),
                reason: "checked state did not change".to_string(),
            })
        }
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let (code, text, virtual_key) = key_definition(key);

        let mut down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key(key.to_string())
            .code(code.to_string());
        if let Some(text) = text {
            down = down.text(text.to_string());
        }
        if let Some(vk) = virtual_key {
            down = down.windows_virtual_key_code(vk);
        }
        let down = down.build().map_err(BrowserError::ChromiumError)?;

        let mut up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key(key.to_string())
            .code(code.to_string());
        if let Some(vk) = virtual_key {
            up = up.windows_virtual_key_code(vk);
        }
        let up = up.build().map_err(BrowserError::ChromiumError)?;

        for params in [down, up] {
            self.page
                .execute(params)
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if closed.is_ok() {
            let _ = browser.wait().await;
        }
        self.handler.abort();
        closed.map(|_| ())
    }
}

impl Drop for BrowserEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Launches a dedicated Chromium instance per application run.
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl PageLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserActions>> {
        let engine = BrowserEngine::launch(&self.config).await?;
        Ok(Box::new(engine))
    }
}
