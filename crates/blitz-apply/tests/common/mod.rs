//! Scripted in-memory page for driving detector, filler and driver tests.
//!
//! Elements live in a flat arena and are addressed by `#fake-N` handles.
//! Selectors only match what a test registers for them, so every test spells
//! out exactly what the page "contains".

#![allow(dead_code)]

use async_trait::async_trait;
use blitz_apply::detector::{label_for_selector, NATIVE_CONTROL_SELECTOR};
use blitz_browser::{BrowserActions, BrowserError, ElementHandle, PageLauncher, Result, SelectBy};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One element on the fake page.
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub attrs: HashMap<String, String>,
    pub text: Option<String>,
    pub hidden: bool,
    pub disabled: bool,
    /// `(label, value)` pairs of a select
    pub options: Vec<(String, String)>,
    pub checked: bool,
    pub fail_interaction: bool,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_uppercase(),
            ..Self::default()
        }
    }

    pub fn input(input_type: &str) -> Self {
        Self::new("input").attr("type", input_type)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn option(mut self, label: &str, value: &str) -> Self {
        self.options.push((label.to_string(), value.to_string()));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_interaction = true;
        self
    }
}

#[derive(Debug, Default)]
struct State {
    elements: Vec<FakeElement>,
    selectors: HashMap<String, Vec<usize>>,
    after_click: HashMap<String, Vec<usize>>,
    parents: HashMap<(usize, String), usize>,
    failing_selectors: HashSet<String>,
    unreachable: HashSet<String>,
    fail_key_press: bool,
    panic_on_navigate: bool,
    events: Vec<String>,
    closed: usize,
}

/// Scripted page. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<State>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element and return its index.
    pub fn add(&self, element: FakeElement) -> usize {
        let mut state = self.state.lock().unwrap();
        state.elements.push(element);
        state.elements.len() - 1
    }

    /// Make `selector` match the given elements, appended in order.
    pub fn on(&self, selector: &str, ids: &[usize]) {
        let mut state = self.state.lock().unwrap();
        state
            .selectors
            .entry(selector.to_string())
            .or_default()
            .extend_from_slice(ids);
    }

    /// Make `selector` match the given elements once anything was clicked.
    pub fn on_after_click(&self, selector: &str, ids: &[usize]) {
        let mut state = self.state.lock().unwrap();
        state
            .after_click
            .entry(selector.to_string())
            .or_default()
            .extend_from_slice(ids);
    }

    /// Make `selector` resolve to `child` inside `element`'s parent.
    pub fn in_parent(&self, element: usize, selector: &str, child: usize) {
        let mut state = self.state.lock().unwrap();
        state.parents.insert((element, selector.to_string()), child);
    }

    pub fn fail_selector(&self, selector: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_selectors.insert(selector.to_string());
    }

    pub fn unreachable(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.unreachable.insert(url.to_string());
    }

    pub fn fail_key_press(&self) {
        self.state.lock().unwrap().fail_key_press = true;
    }

    pub fn panic_on_navigate(&self) {
        self.state.lock().unwrap().panic_on_navigate = true;
    }

    /// A native control with an explicit `<label for=id>`.
    pub fn labeled(&self, label: &str, id: &str, element: FakeElement) -> usize {
        let control = self.add(element.attr("id", id));
        let label_el = self.add(FakeElement::new("label").text(label));
        self.on(NATIVE_CONTROL_SELECTOR, &[control]);
        self.on(&label_for_selector(id), &[label_el]);
        control
    }

    /// A radio input in group `name`.
    pub fn radio(&self, name: &str, value: &str) -> usize {
        let radio = self.add(
            FakeElement::input("radio")
                .attr("name", name)
                .attr("value", value),
        );
        self.on("input[type='radio']", &[radio]);
        self.on(&format!("input[type='radio'][name=\"{name}\"]"), &[radio]);
        radio
    }

    pub fn handle(&self, id: usize) -> ElementHandle {
        ElementHandle::new(format!("#fake-{id}"))
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.events().iter().any(|e| e == event)
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    pub fn element(&self, id: usize) -> FakeElement {
        self.state.lock().unwrap().elements[id].clone()
    }

    fn index(handle: &ElementHandle) -> Result<usize> {
        handle
            .selector()
            .strip_prefix("#fake-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| BrowserError::SelectorNotFound(handle.to_string()))
    }

    fn with_element<T>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut FakeElement, &mut Vec<String>, usize) -> Result<T>,
    ) -> Result<T> {
        let idx = Self::index(handle)?;
        let mut state = self.state.lock().unwrap();
        let State {
            elements, events, ..
        } = &mut *state;
        let element = elements
            .get_mut(idx)
            .ok_or_else(|| BrowserError::SelectorNotFound(handle.to_string()))?;
        f(element, events, idx)
    }
}

fn interaction_error(idx: usize, reason: &str) -> BrowserError {
    BrowserError::Interaction {
        selector: format!("#fake-{idx}"),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl BrowserActions for FakePage {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        let (panic, unreachable) = {
            let mut state = self.state.lock().unwrap();
            state.events.push(format!("navigate:{url}"));
            (state.panic_on_navigate, state.unreachable.contains(url))
        };
        if panic {
            panic!("renderer crashed");
        }
        if unreachable {
            return Err(BrowserError::NavigationError(format!(
                "net::ERR_NAME_NOT_RESOLVED at {url}"
            )));
        }
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let state = self.state.lock().unwrap();
        if state.failing_selectors.contains(selector) {
            return Err(BrowserError::ScriptError(format!("bad selector {selector}")));
        }
        Ok(state
            .selectors
            .get(selector)
            .map(|ids| ids.iter().map(|&id| self.handle(id)).collect())
            .unwrap_or_default())
    }

    async fn query_in_parent(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        let idx = Self::index(element)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .parents
            .get(&(idx, selector.to_string()))
            .map(|&child| self.handle(child)))
    }

    async fn tag_name(&self, element: &ElementHandle) -> Result<String> {
        self.with_element(element, |el, _, _| Ok(el.tag.clone()))
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.with_element(element, |el, _, _| Ok(el.attrs.get(name).cloned()))
    }

    async fn text_content(&self, element: &ElementHandle) -> Result<Option<String>> {
        self.with_element(element, |el, _, _| Ok(el.text.clone()))
    }

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool> {
        self.with_element(element, |el, _, _| Ok(!el.hidden))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        self.with_element(element, |el, _, _| Ok(!el.disabled))
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.with_element(element, |el, events, idx| {
            if el.fail_interaction {
                return Err(interaction_error(idx, "click intercepted"));
            }
            events.push(format!("click:{idx}"));
            Ok(())
        })?;

        let mut state = self.state.lock().unwrap();
        let revealed: Vec<_> = state.after_click.drain().collect();
        for (selector, ids) in revealed {
            state.selectors.entry(selector).or_default().extend(ids);
        }
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, value: &str) -> Result<()> {
        self.with_element(element, |el, events, idx| {
            if el.fail_interaction {
                return Err(interaction_error(idx, "element is not editable"));
            }
            el.attrs.insert("value".to_string(), value.to_string());
            events.push(format!("fill:{idx}={value}"));
            Ok(())
        })
    }

    async fn select_option(&self, element: &ElementHandle, by: &SelectBy) -> Result<String> {
        self.with_element(element, |el, events, idx| {
            let chosen = match by {
                SelectBy::Label(label) => el.options.iter().find(|(l, _)| l == label),
                SelectBy::Value(value) => el.options.iter().find(|(_, v)| v == value),
                SelectBy::Index(i) => el.options.get(*i),
            };
            let Some((_, value)) = chosen.cloned() else {
                return Err(interaction_error(idx, "no matching option"));
            };
            events.push(format!("select:{idx}={value}"));
            Ok(value)
        })
    }

    async fn set_checked(&self, element: &ElementHandle, checked: bool) -> Result<()> {
        self.with_element(element, |el, events, idx| {
            if el.fail_interaction {
                return Err(interaction_error(idx, "element is not checkable"));
            }
            el.checked = checked;
            let verb = if checked { "check" } else { "uncheck" };
            events.push(format!("{verb}:{idx}"));
            Ok(())
        })
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_key_press {
            return Err(BrowserError::ChromiumError("keyboard unavailable".to_string()));
        }
        state.events.push(format!("key:{key}"));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.closed += 1;
        state.events.push("close".to_string());
        Ok(())
    }
}

/// Hands out the same scripted page for every run.
pub struct FakeLauncher {
    page: Option<FakePage>,
    launches: AtomicUsize,
}

impl FakeLauncher {
    pub fn new(page: FakePage) -> Self {
        Self {
            page: Some(page),
            launches: AtomicUsize::new(0),
        }
    }

    /// A launcher whose browser never starts.
    pub fn broken() -> Self {
        Self {
            page: None,
            launches: AtomicUsize::new(0),
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserActions>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        match &self.page {
            Some(page) => Ok(Box::new(page.clone())),
            None => Err(BrowserError::ChromiumError(
                "could not find a Chrome executable".to_string(),
            )),
        }
    }
}
