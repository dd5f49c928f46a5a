use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

// 1. ViewRenderer Contract

/// ViewRenderer
///
/// Defines the abstract contract for the view-rendering collaborator: a view
/// identifier plus a mapping of named values produces an HTML response body.
/// Real templating is outside this application's scope, so the trait keeps the
/// boundary explicit and lets us swap the shell implementation for the
/// recording mock (MockViewRenderer) during testing without affecting the
/// calling handlers.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, ctx: &ViewContext) -> Result<String, String>;
}

/// RendererState
///
/// The concrete type used to share the view renderer across the application state.
pub type RendererState = Arc<dyn ViewRenderer>;

/// ViewContext
///
/// The mapping of named values handed to the renderer. Values are stored as
/// JSON so the renderer contract stays independent of the application's model
/// types. A value that fails to serialize degrades to null rather than
/// panicking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewContext {
    values: Map<String, Value>,
}

impl ViewContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.values.insert(key.to_string(), value);
    }

    /// Builder-style insert for one-expression context construction.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

// 2. The Shell Implementation

/// HtmlShellRenderer
///
/// Stand-in for the real template engine: wraps the context in a minimal HTML
/// shell with the view name as the title and the data as a pretty-printed
/// block. Enough to serve pages and to be replaced wholesale once actual
/// templates exist.
#[derive(Clone, Default)]
pub struct HtmlShellRenderer;

impl HtmlShellRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ViewRenderer for HtmlShellRenderer {
    fn render(&self, view: &str, ctx: &ViewContext) -> Result<String, String> {
        let data = serde_json::to_string_pretty(ctx.values()).map_err(|e| e.to_string())?;
        Ok(format!(
            "<!doctype html>\n<html>\n<head><title>{view}</title></head>\n<body data-view=\"{view}\">\n<pre>{data}</pre>\n</body>\n</html>\n"
        ))
    }
}

// 3. The Mock Implementation (For Tests)

/// MockViewRenderer
///
/// A mock implementation of `ViewRenderer` used exclusively for testing. It
/// records every (view, context) pair it is asked to render, which lets tests
/// assert both that a handler rendered the expected view with the expected
/// data and, for guard tests, that a protected view was never rendered at all.
#[derive(Default)]
pub struct MockViewRenderer {
    /// When true, all render calls return a simulated failure.
    pub should_fail: bool,
    rendered: Mutex<Vec<(String, ViewContext)>>,
}

impl MockViewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            rendered: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of every render call so far, in order.
    pub fn rendered(&self) -> Vec<(String, ViewContext)> {
        self.rendered
            .lock()
            .expect("mock renderer lock poisoned")
            .clone()
    }

    /// The views rendered so far, without their contexts.
    pub fn rendered_views(&self) -> Vec<String> {
        self.rendered()
            .into_iter()
            .map(|(view, _)| view)
            .collect()
    }
}

impl ViewRenderer for MockViewRenderer {
    fn render(&self, view: &str, ctx: &ViewContext) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Render Error: Simulation requested".to_string());
        }

        self.rendered
            .lock()
            .expect("mock renderer lock poisoned")
            .push((view.to_string(), ctx.clone()));

        // Deterministic marker body for response assertions.
        Ok(format!("view:{view}"))
    }
}
