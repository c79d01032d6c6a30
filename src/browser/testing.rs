//! Scripted fake browser for session-provider and DOM-client tests.

use super::{BrowserEngine, BrowserError, BrowserPage, CapturedResponse, Cookie};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared scripted state; tests keep a clone to inspect after the page is
/// consumed by the code under test.
#[derive(Default)]
pub struct PageState {
    pub current_url: String,
    /// URLs adopted, in order, by successive `wait_for_navigation` calls.
    /// When empty, a wait leaves the page where it is (login-rejected case).
    pub nav_queue: VecDeque<String>,
    pub fields: HashMap<String, String>,
    /// Fields whose reported value ignores typing (simulates rejected input).
    pub locked_fields: HashMap<String, String>,
    pub cookies: Vec<Cookie>,
    pub captured: Vec<CapturedResponse>,
    pub banners: String,
    pub save_button_present: bool,
    pub typed: Vec<(String, String)>,
    pub clicked: Vec<String>,
    pub closed: bool,
}

impl PageState {
    pub fn new() -> SharedPageState {
        Arc::new(Mutex::new(PageState {
            save_button_present: true,
            ..PageState::default()
        }))
    }
}

pub type SharedPageState = Arc<Mutex<PageState>>;

pub struct FakePage {
    state: SharedPageState,
}

impl FakePage {
    pub fn new(state: SharedPageState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.state.lock().unwrap().current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BrowserError> {
        let mut s = self.state.lock().unwrap();
        s.typed.push((selector.to_string(), text.to_string()));
        s.fields
            .entry(selector.to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn clear_field(&mut self, selector: &str) -> Result<(), BrowserError> {
        self.state
            .lock()
            .unwrap()
            .fields
            .insert(selector.to_string(), String::new());
        Ok(())
    }

    async fn field_value(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        let s = self.state.lock().unwrap();
        if let Some(locked) = s.locked_fields.get(selector) {
            return Ok(Some(locked.clone()));
        }
        Ok(s.fields.get(selector).cloned())
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        self.state.lock().unwrap().clicked.push(selector.to_string());
        Ok(())
    }

    async fn click_by_text(&mut self, tag: &str, pattern: &str) -> Result<bool, BrowserError> {
        let mut s = self.state.lock().unwrap();
        s.clicked.push(format!("{tag}:{pattern}"));
        Ok(s.save_button_present)
    }

    async fn wait_for_navigation(&mut self, _timeout: Duration) -> Result<(), BrowserError> {
        let mut s = self.state.lock().unwrap();
        if let Some(next) = s.nav_queue.pop_front() {
            s.current_url = next;
        }
        Ok(())
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>, BrowserError> {
        Ok(self.state.lock().unwrap().cookies.clone())
    }

    async fn install_response_capture(
        &mut self,
        _url_fragment: &str,
    ) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn captured_responses(&mut self) -> Result<Vec<CapturedResponse>, BrowserError> {
        Ok(std::mem::take(&mut self.state.lock().unwrap().captured))
    }

    async fn banner_text(&mut self, _selectors: &str) -> Result<String, BrowserError> {
        Ok(self.state.lock().unwrap().banners.clone())
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Engine handing out pre-scripted pages in order; `open` fails once the
/// script runs out.
pub struct FakeEngine {
    pages: Mutex<VecDeque<SharedPageState>>,
}

impl FakeEngine {
    pub fn new(pages: Vec<SharedPageState>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
        }
    }

    pub fn single(state: SharedPageState) -> Self {
        Self::new(vec![state])
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    async fn open(&self) -> Result<Box<dyn BrowserPage>, BrowserError> {
        let state = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BrowserError::Driver("no scripted pages left".to_string()))?;
        Ok(Box::new(FakePage::new(state)))
    }
}
