//! Combobox component - filterable single-select dropdown
//!
//! A headless combobox: it owns the interaction state (filter text,
//! dropdown visibility, editing, keyboard highlight) and produces a
//! [`ComboboxView`] render model. The selected key belongs to the caller,
//! who passes it in at render time and learns about changes through
//! `on_select`.
//!
//! Filter text and dropdown visibility can each be owned by the caller
//! (controlled) or by the combobox (uncontrolled). The choice is made once
//! in [`ComboboxBuilder::build`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tesserae_cn::components::combobox::combobox;
//! use tesserae_core::{Document, PointerEvent, ReactiveContext, Rect};
//!
//! let ctx = ReactiveContext::new();
//! let document = Document::new();
//! let author = Arc::new(Mutex::new(None::<String>));
//!
//! let author_for_select = Arc::clone(&author);
//! let mut picker = combobox(&ctx)
//!     .placeholder("Search authors...")
//!     .option("verg", "Vergil")
//!     .option("ovid", "Ovid")
//!     .option("luc", "Lucan")
//!     .on_select(move |key| *author_for_select.lock().unwrap() = Some(key.to_string()))
//!     .build();
//!
//! picker.mount(&document);
//! picker.set_bounds(Rect::new(0.0, 0.0, 240.0, 200.0));
//!
//! picker.focus();
//! picker.input("v");
//! assert_eq!(picker.view(None).option_count(), 2);
//!
//! picker.pointer_down_row(1);
//! let selected = author.lock().unwrap().clone();
//! assert_eq!(picker.view(selected.as_deref()).text, "Ovid");
//!
//! // Presses elsewhere on the page reach the combobox while it's mounted
//! document.pointer_down(PointerEvent::down(500.0, 500.0));
//! picker.unmount();
//! assert_eq!(document.listener_count(), 0);
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use serde::Serialize;
use serde_json::Value;
use tesserae_core::{
    Document, KeyCode, ListenerGuard, PointerEvent, ReactiveContext, Rect, Slot, State,
};
use tracing::{debug, trace};

use crate::config::ComboboxSettings;

// =============================================================================
// Options
// =============================================================================

/// An option in the combobox dropdown
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComboboxOption {
    /// Identifier reported through `on_select`
    pub key: String,
    /// The display label shown in the field and used for filtering
    pub label: String,
    /// Whether this option is disabled
    pub disabled: bool,
}

impl ComboboxOption {
    /// Create a new option with key and label
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            disabled: false,
        }
    }

    /// Mark this option as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Check if this option matches a search query (case-insensitive)
    ///
    /// Matches against the label, and against the key too when
    /// `match_keys` is set.
    pub fn matches(&self, query: &str, match_keys: bool) -> bool {
        if query.is_empty() {
            return true;
        }
        let query_lower = query.to_lowercase();
        self.label.to_lowercase().contains(&query_lower)
            || (match_keys && self.key.to_lowercase().contains(&query_lower))
    }

    /// Read an option from a JSON object
    ///
    /// The key may be a string or a number (`key` or `value`); the label
    /// must be a string. Anything else yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let key = match object.get("key").or_else(|| object.get("value"))? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let label = object.get("label")?.as_str()?.to_string();
        let disabled = object
            .get("disabled")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Some(Self {
            key,
            label,
            disabled,
        })
    }
}

/// The caller's option list
///
/// Cheap to clone. Anything that isn't a sequence converts to an empty
/// list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComboboxOptions(Arc<Vec<ComboboxOption>>);

impl ComboboxOptions {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read options from a JSON value
    ///
    /// A value that isn't an array is treated as an empty list. Entries
    /// that aren't usable options are skipped.
    pub fn from_json(value: &Value) -> Self {
        let Some(items) = value.as_array() else {
            debug!("combobox options are not an array, treating as empty");
            return Self::empty();
        };

        let options: Vec<_> = items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let option = ComboboxOption::from_json(item);
                if option.is_none() {
                    debug!(idx, "skipping malformed combobox option");
                }
                option
            })
            .collect();
        Self(Arc::new(options))
    }

    /// Parse a JSON document and read options from it
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_json(&value))
    }

    pub fn as_slice(&self) -> &[ComboboxOption] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComboboxOption> {
        self.0.iter()
    }

    /// Label of the option with `key`
    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|opt| opt.key == key)
            .map(|opt| opt.label.as_str())
    }

    /// Options matching `query`, in input order
    pub fn filter(&self, query: &str, match_keys: bool) -> Vec<ComboboxOption> {
        self.0
            .iter()
            .filter(|opt| opt.matches(query, match_keys))
            .cloned()
            .collect()
    }
}

impl From<Vec<ComboboxOption>> for ComboboxOptions {
    fn from(options: Vec<ComboboxOption>) -> Self {
        Self(Arc::new(options))
    }
}

impl From<Option<Vec<ComboboxOption>>> for ComboboxOptions {
    fn from(options: Option<Vec<ComboboxOption>>) -> Self {
        options.map(Self::from).unwrap_or_default()
    }
}

impl From<&Value> for ComboboxOptions {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}

impl FromIterator<ComboboxOption> for ComboboxOptions {
    fn from_iter<I: IntoIterator<Item = ComboboxOption>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

// =============================================================================
// State machine
// =============================================================================

/// Interaction phase, derived from (dropdown visible, editing)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComboboxPhase {
    /// Dropdown hidden; the field shows the selected label
    Closed,
    /// Dropdown shown; the field shows the filter text
    Editing,
    /// Dropdown hidden by its owner while the field still holds the filter
    Detached,
    /// Dropdown shown by its owner without the field being edited
    Browsing,
}

/// Inputs the state machine reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComboboxEvent {
    /// The text field gained focus
    Focus,
    /// The text field's content changed
    Input(String),
    /// The text field lost focus
    Blur,
    /// A press landed outside the component's bounds
    OutsidePointerDown,
    /// Keyboard request to show the list without touching the filter
    OpenList,
    /// An option with this key was chosen
    Commit(String),
    /// Escape pressed
    Dismiss,
}

/// Slot writes and upward reports produced by one event
///
/// `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    pub dropdown_visible: Option<bool>,
    pub editing: Option<bool>,
    pub filter_text: Option<String>,
    pub commit: Option<String>,
}

impl Transition {
    fn open(filter_text: Option<String>) -> Self {
        Self {
            dropdown_visible: Some(true),
            editing: Some(true),
            filter_text,
            commit: None,
        }
    }

    fn close() -> Self {
        Self {
            dropdown_visible: Some(false),
            editing: Some(false),
            filter_text: Some(String::new()),
            commit: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

impl ComboboxPhase {
    pub fn from_flags(dropdown_visible: bool, editing: bool) -> Self {
        match (dropdown_visible, editing) {
            (false, false) => ComboboxPhase::Closed,
            (true, true) => ComboboxPhase::Editing,
            (false, true) => ComboboxPhase::Detached,
            (true, false) => ComboboxPhase::Browsing,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ComboboxPhase::Editing | ComboboxPhase::Browsing)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, ComboboxPhase::Editing | ComboboxPhase::Detached)
    }

    /// What `event` does in this phase
    pub fn next(self, event: &ComboboxEvent) -> Transition {
        match event {
            // Focus always starts from the full list
            ComboboxEvent::Focus => Transition::open(Some(String::new())),
            ComboboxEvent::Input(text) => Transition::open(Some(text.clone())),
            ComboboxEvent::OpenList => Transition::open(None),
            // While open, the outside-press listener decides; a blur here is
            // usually focus moving onto a row
            ComboboxEvent::Blur if self.is_open() => Transition::default(),
            ComboboxEvent::Blur => Transition {
                editing: Some(false),
                filter_text: Some(String::new()),
                ..Transition::default()
            },
            ComboboxEvent::OutsidePointerDown | ComboboxEvent::Dismiss => Transition::close(),
            ComboboxEvent::Commit(key) => Transition {
                commit: Some(key.clone()),
                ..Transition::close()
            },
        }
    }
}

// =============================================================================
// Render model
// =============================================================================

/// One row of the dropdown body
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropdownRow {
    Option {
        key: String,
        label: String,
        selected: bool,
        highlighted: bool,
        disabled: bool,
    },
    /// Placeholder shown when nothing matches
    NoMatches { text: String },
}

impl DropdownRow {
    /// Whether pressing this row commits something
    pub fn is_interactive(&self) -> bool {
        matches!(self, DropdownRow::Option { disabled: false, .. })
    }
}

/// Everything a host needs to draw the combobox
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboboxView {
    /// Text shown in the field
    pub text: String,
    pub placeholder: Option<String>,
    pub phase: ComboboxPhase,
    /// Dropdown body; `None` while the dropdown is hidden
    pub dropdown: Option<Vec<DropdownRow>>,
    pub disabled: bool,
}

impl ComboboxView {
    /// Whether the field should draw the placeholder instead of `text`
    pub fn shows_placeholder(&self) -> bool {
        self.text.is_empty() && self.placeholder.is_some()
    }

    /// Number of option rows (the "no matches" row isn't one)
    pub fn option_count(&self) -> usize {
        self.dropdown
            .as_ref()
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches!(row, DropdownRow::Option { .. }))
                    .count()
            })
            .unwrap_or(0)
    }
}

// =============================================================================
// Component
// =============================================================================

/// Callback receiving the committed option's key
pub type SelectCallback = Arc<dyn Fn(&str) + Send + Sync>;

struct ComboboxInner {
    options: State<ComboboxOptions>,
    filter_text: Slot<String>,
    dropdown_visible: Slot<bool>,
    editing: State<bool>,
    highlighted: State<Option<usize>>,
    bounds: State<Option<Rect>>,
    settings: ComboboxSettings,
    disabled: bool,
    on_select: Option<SelectCallback>,
}

impl ComboboxInner {
    fn phase(&self) -> ComboboxPhase {
        ComboboxPhase::from_flags(self.dropdown_visible.get(), self.editing.get())
    }

    fn filtered(&self) -> Vec<ComboboxOption> {
        self.options
            .get()
            .filter(&self.filter_text.get(), self.settings.match_keys)
    }

    /// Run `event` through the state machine and apply the result
    ///
    /// Slots are only written when their value changes.
    fn dispatch(&self, event: ComboboxEvent) {
        if self.disabled {
            return;
        }

        let phase = self.phase();
        let transition = phase.next(&event);
        trace!(?phase, ?event, ?transition, "combobox transition");

        if let Some(visible) = transition.dropdown_visible {
            if self.dropdown_visible.get() != visible {
                self.dropdown_visible.set(visible);
            }
        }
        if let Some(editing) = transition.editing {
            if self.editing.get() != editing {
                self.editing.set_rebuild(editing);
            }
        }
        if let Some(text) = transition.filter_text {
            if self.filter_text.get() != text {
                self.filter_text.set(text);
            }
        }
        // Row indices don't survive opening, closing, or a new filter
        if transition.dropdown_visible.is_some() && self.highlighted.get().is_some() {
            self.highlighted.set_rebuild(None);
        }

        if let Some(key) = transition.commit {
            debug!(%key, "combobox option committed");
            if let Some(ref cb) = self.on_select {
                cb(&key);
            }
        }
    }

    fn handle_document_pointer(&self, event: &PointerEvent) {
        let inside = self
            .bounds
            .get()
            .map(|bounds| bounds.contains(event.position))
            .unwrap_or(false);
        if !inside {
            self.dispatch(ComboboxEvent::OutsidePointerDown);
        }
    }

    /// Move the highlight `forward` or back over enabled rows, wrapping
    fn step_highlight(&self, rows: &[ComboboxOption], forward: bool) {
        let enabled: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, opt)| !opt.disabled)
            .map(|(idx, _)| idx)
            .collect();
        if enabled.is_empty() {
            self.highlighted.set_rebuild(None);
            return;
        }

        let current = self
            .highlighted
            .get()
            .and_then(|idx| enabled.iter().position(|&e| e == idx));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => enabled.len() - 1,
            (Some(pos), true) => (pos + 1) % enabled.len(),
            (Some(pos), false) => (pos + enabled.len() - 1) % enabled.len(),
        };
        self.highlighted.set_rebuild(Some(enabled[next]));
    }
}

/// Combobox component
///
/// Keeps its document listener alive while mounted; dropping the combobox
/// unmounts it.
pub struct Combobox {
    inner: Arc<ComboboxInner>,
    listener: Option<ListenerGuard>,
}

impl fmt::Debug for Combobox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combobox")
            .field("phase", &self.phase())
            .field("filter_text", &self.filter_text())
            .field("options", &self.inner.options.get().len())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

impl Combobox {
    /// Attach to `document` so outside presses close the dropdown
    ///
    /// Mounting again replaces the previous registration.
    pub fn mount(&mut self, document: &Document) {
        let inner: Weak<ComboboxInner> = Arc::downgrade(&self.inner);
        let guard = document.on_pointer_down(move |event| {
            if let Some(inner) = inner.upgrade() {
                inner.handle_document_pointer(event);
            }
        });
        debug!(listener = ?guard.id(), "combobox mounted");
        self.listener = Some(guard);
    }

    /// Release the document listener
    pub fn unmount(&mut self) {
        if self.listener.take().is_some() {
            debug!("combobox unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.listener
            .as_ref()
            .map(ListenerGuard::is_active)
            .unwrap_or(false)
    }

    /// Record where the component sits in the document
    ///
    /// Cover the dropdown too: presses inside these bounds never count as
    /// outside.
    pub fn set_bounds(&self, bounds: Rect) {
        self.inner.bounds.set(Some(bounds));
    }

    /// Replace the option list
    pub fn set_options(&self, options: impl Into<ComboboxOptions>) {
        self.inner.options.set_rebuild(options.into());
        self.inner.highlighted.set_rebuild(None);
    }

    pub fn options(&self) -> ComboboxOptions {
        self.inner.options.get()
    }

    pub fn phase(&self) -> ComboboxPhase {
        self.inner.phase()
    }

    pub fn filter_text(&self) -> String {
        self.inner.filter_text.get()
    }

    pub fn is_dropdown_visible(&self) -> bool {
        self.inner.dropdown_visible.get()
    }

    pub fn is_editing(&self) -> bool {
        self.inner.editing.get()
    }

    /// Index of the highlighted row among the filtered options
    pub fn highlighted(&self) -> Option<usize> {
        self.inner.highlighted.get()
    }

    /// Options matching the current filter, in input order
    pub fn filtered_options(&self) -> Vec<ComboboxOption> {
        self.inner.filtered()
    }

    /// The text field gained focus
    pub fn focus(&self) {
        self.inner.dispatch(ComboboxEvent::Focus);
    }

    /// The text field's content changed to `text`
    pub fn input(&self, text: impl Into<String>) {
        self.inner.dispatch(ComboboxEvent::Input(text.into()));
    }

    /// The text field lost focus
    pub fn blur(&self) {
        self.inner.dispatch(ComboboxEvent::Blur);
    }

    /// Pointer pressed on dropdown row `row`
    ///
    /// Returns whether an option was committed. Presses on the "no
    /// matches" row, disabled options, or while the dropdown is hidden do
    /// nothing.
    pub fn pointer_down_row(&self, row: usize) -> bool {
        if self.inner.disabled || !self.is_dropdown_visible() {
            return false;
        }
        match self.inner.filtered().into_iter().nth(row) {
            Some(option) if !option.disabled => {
                self.inner.dispatch(ComboboxEvent::Commit(option.key));
                true
            }
            _ => false,
        }
    }

    /// Handle a key press in the text field
    ///
    /// Returns whether the key was consumed.
    pub fn key_down(&self, key: KeyCode) -> bool {
        let inner = &self.inner;
        if inner.disabled {
            return false;
        }

        match key {
            KeyCode::ArrowDown | KeyCode::ArrowUp => {
                if !inner.phase().is_open() {
                    inner.dispatch(ComboboxEvent::OpenList);
                }
                let rows = inner.filtered();
                inner.step_highlight(&rows, key == KeyCode::ArrowDown);
                true
            }
            KeyCode::Enter => match inner.highlighted.get() {
                Some(row) if inner.phase().is_open() => self.pointer_down_row(row),
                _ => false,
            },
            KeyCode::Escape => {
                if inner.phase() == ComboboxPhase::Closed {
                    return false;
                }
                inner.dispatch(ComboboxEvent::Dismiss);
                true
            }
        }
    }

    /// Text shown in the field for the given selection
    pub fn display_text(&self, selected_key: Option<&str>) -> String {
        if self.is_editing() {
            return self.filter_text();
        }
        selected_key
            .and_then(|key| self.inner.options.get().label_for(key).map(str::to_string))
            .unwrap_or_default()
    }

    /// Build the render model for the given selection
    pub fn view(&self, selected_key: Option<&str>) -> ComboboxView {
        let inner = &self.inner;
        let phase = inner.phase();

        let dropdown = phase.is_open().then(|| {
            let rows = inner.filtered();
            if rows.is_empty() {
                return vec![DropdownRow::NoMatches {
                    text: inner.settings.no_matches_text.clone(),
                }];
            }
            let highlighted = inner.highlighted.get();
            rows.into_iter()
                .enumerate()
                .map(|(idx, opt)| DropdownRow::Option {
                    selected: selected_key == Some(opt.key.as_str()),
                    highlighted: highlighted == Some(idx),
                    disabled: opt.disabled,
                    key: opt.key,
                    label: opt.label,
                })
                .collect()
        });

        ComboboxView {
            text: self.display_text(selected_key),
            placeholder: inner.settings.placeholder.clone(),
            phase,
            dropdown,
            disabled: inner.disabled,
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for creating Combobox components with fluent API
pub struct ComboboxBuilder {
    ctx: ReactiveContext,
    options: Vec<ComboboxOption>,
    filter_text: Option<Slot<String>>,
    dropdown_visible: Option<Slot<bool>>,
    settings: ComboboxSettings,
    disabled: bool,
    on_select: Option<SelectCallback>,
}

impl ComboboxBuilder {
    /// Create a new combobox builder allocating internal state in `ctx`
    pub fn new(ctx: &ReactiveContext) -> Self {
        Self {
            ctx: ctx.clone(),
            options: Vec::new(),
            filter_text: None,
            dropdown_visible: None,
            settings: ComboboxSettings::default(),
            disabled: false,
            on_select: None,
        }
    }

    /// Add an option with key and label
    pub fn option(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(ComboboxOption::new(key, label));
        self
    }

    /// Add a disabled option
    pub fn option_disabled(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(ComboboxOption::new(key, label).disabled());
        self
    }

    /// Add multiple options
    pub fn options(mut self, options: impl Into<ComboboxOptions>) -> Self {
        self.options.extend(options.into().iter().cloned());
        self
    }

    /// Apply copy and matching settings from configuration
    pub fn settings(mut self, settings: ComboboxSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the placeholder text
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.settings.placeholder = Some(placeholder.into());
        self
    }

    /// Set the text of the row shown when nothing matches
    pub fn no_matches_text(mut self, text: impl Into<String>) -> Self {
        self.settings.no_matches_text = text.into();
        self
    }

    /// Also match the filter against option keys
    pub fn match_keys(mut self, match_keys: bool) -> Self {
        self.settings.match_keys = match_keys;
        self
    }

    /// Set disabled state
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Let the caller own the filter text through its own state
    pub fn filter_text_state(mut self, state: &State<String>) -> Self {
        self.filter_text = Some(Slot::from_state(state));
        self
    }

    /// Let the caller own the filter text through a getter/setter pair
    pub fn filter_text<G, S>(mut self, get: G, set: S) -> Self
    where
        G: Fn() -> String + Send + Sync + 'static,
        S: Fn(String) + Send + Sync + 'static,
    {
        self.filter_text = Some(Slot::controlled(get, set));
        self
    }

    /// Let the caller own dropdown visibility through its own state
    pub fn dropdown_visible_state(mut self, state: &State<bool>) -> Self {
        self.dropdown_visible = Some(Slot::from_state(state));
        self
    }

    /// Let the caller own dropdown visibility through a getter/setter pair
    pub fn dropdown_visible<G, S>(mut self, get: G, set: S) -> Self
    where
        G: Fn() -> bool + Send + Sync + 'static,
        S: Fn(bool) + Send + Sync + 'static,
    {
        self.dropdown_visible = Some(Slot::controlled(get, set));
        self
    }

    /// Set the selection callback
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_select = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Combobox {
        let ctx = self.ctx;
        let filter_text = self
            .filter_text
            .unwrap_or_else(|| Slot::owned(&ctx, String::new()));
        let dropdown_visible = self
            .dropdown_visible
            .unwrap_or_else(|| Slot::owned(&ctx, false));

        debug!(
            options = self.options.len(),
            controlled_filter = filter_text.is_controlled(),
            controlled_dropdown = dropdown_visible.is_controlled(),
            "combobox built"
        );

        let inner = ComboboxInner {
            options: ctx.use_state(ComboboxOptions::from(self.options)),
            filter_text,
            dropdown_visible,
            editing: ctx.use_state(false),
            highlighted: ctx.use_state(None),
            bounds: ctx.use_state(None),
            settings: self.settings,
            disabled: self.disabled,
            on_select: self.on_select,
        };

        Combobox {
            inner: Arc::new(inner),
            listener: None,
        }
    }
}

/// Create a combobox builder
///
/// Internal state is allocated in `ctx`; writes that change the render
/// model mark it dirty.
pub fn combobox(ctx: &ReactiveContext) -> ComboboxBuilder {
    ComboboxBuilder::new(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use tesserae_core::Point;

    fn authors() -> Vec<ComboboxOption> {
        vec![
            ComboboxOption::new("verg", "Vergil"),
            ComboboxOption::new("ovid", "Ovid"),
            ComboboxOption::new("luc", "Lucan"),
            ComboboxOption::new("stat", "Statius"),
            ComboboxOption::new("sil", "Silius Italicus"),
        ]
    }

    /// A combobox whose selections land in the returned `State`
    fn picker(ctx: &ReactiveContext) -> (Combobox, State<Option<String>>, Arc<Mutex<Vec<String>>>) {
        let selected = ctx.use_state(None::<String>);
        let calls = Arc::new(Mutex::new(Vec::new()));

        let selected_for_cb = selected.clone();
        let calls_for_cb = Arc::clone(&calls);
        let combo = combobox(ctx)
            .options(authors())
            .on_select(move |key| {
                calls_for_cb.lock().unwrap().push(key.to_string());
                selected_for_cb.set(Some(key.to_string()));
            })
            .build();
        (combo, selected, calls)
    }

    fn labels(view: &ComboboxView) -> Vec<String> {
        view.dropdown
            .iter()
            .flatten()
            .filter_map(|row| match row {
                DropdownRow::Option { label, .. } => Some(label.clone()),
                DropdownRow::NoMatches { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_combobox_option_matches() {
        let opt = ComboboxOption::new("sil", "Silius Italicus");

        // Empty query matches everything
        assert!(opt.matches("", false));

        // Case-insensitive label match
        assert!(opt.matches("italic", false));
        assert!(opt.matches("SILIUS", false));
        assert!(opt.matches("s it", false));

        // Keys only match when asked
        assert!(!opt.matches("sil ", false));
        assert!(!ComboboxOption::new("xyz", "Ovid").matches("xy", false));
        assert!(ComboboxOption::new("xyz", "Ovid").matches("XY", true));
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let ctx = ReactiveContext::new();
        let (combo, _, _) = picker(&ctx);

        combo.focus();
        combo.input("i");

        // Every label containing "i", in the order supplied
        assert_eq!(
            labels(&combo.view(None)),
            vec!["Vergil", "Ovid", "Statius", "Silius Italicus"]
        );

        combo.input("US");
        assert_eq!(
            labels(&combo.view(None)),
            vec!["Statius", "Silius Italicus"]
        );
    }

    #[test]
    fn test_non_sequence_options_are_empty() {
        for value in [json!(null), json!({"key": "a"}), json!("Vergil"), json!(3)] {
            let options = ComboboxOptions::from_json(&value);
            assert!(options.is_empty());

            let ctx = ReactiveContext::new();
            let combo = combobox(&ctx).options(&value).build();
            combo.focus();

            let view = combo.view(Some("verg"));
            assert_eq!(view.option_count(), 0);
            assert_eq!(view.text, "");
        }

        let none: Option<Vec<ComboboxOption>> = None;
        assert!(ComboboxOptions::from(none).is_empty());
    }

    #[test]
    fn test_json_options_skip_malformed_entries() {
        let options = ComboboxOptions::from_json(&json!([
            {"key": "verg", "label": "Vergil"},
            {"key": 42, "label": "Horace"},
            {"value": "ovid", "label": "Ovid", "disabled": true},
            {"key": "nolabel"},
            {"label": "No key"},
            {"key": ["bad"], "label": "Bad key"},
            "Lucan",
        ]));

        let keys: Vec<_> = options.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["verg", "42", "ovid"]);
        assert!(options.as_slice()[2].disabled);
    }

    #[test]
    fn test_json_str_rejects_invalid_documents() {
        assert!(ComboboxOptions::from_json_str("[{").is_err());
        assert_eq!(
            ComboboxOptions::from_json_str(r#"{"authors": []}"#)
                .unwrap()
                .len(),
            0
        );
    }

    #[test]
    fn test_select_reports_once_and_shows_label() {
        let ctx = ReactiveContext::new();
        let (combo, selected, calls) = picker(&ctx);

        combo.focus();
        combo.input("luc");
        assert!(combo.pointer_down_row(0));

        assert_eq!(*calls.lock().unwrap(), vec!["luc".to_string()]);
        assert_eq!(combo.phase(), ComboboxPhase::Closed);
        assert_eq!(combo.filter_text(), "");

        let key = selected.get();
        let view = combo.view(key.as_deref());
        assert_eq!(view.text, "Lucan");
        assert!(view.dropdown.is_none());
    }

    #[test]
    fn test_focus_opens_and_clears_filter() {
        let ctx = ReactiveContext::new();
        let (combo, _, _) = picker(&ctx);

        combo.focus();
        combo.input("stat");
        assert_eq!(combo.filter_text(), "stat");

        combo.focus();
        assert_eq!(combo.filter_text(), "");
        assert_eq!(combo.phase(), ComboboxPhase::Editing);
        assert_eq!(combo.view(None).option_count(), 5);
    }

    #[test]
    fn test_outside_press_cancels_editing() {
        let ctx = ReactiveContext::new();
        let document = Document::new();
        let (mut combo, selected, calls) = picker(&ctx);
        combo.mount(&document);
        combo.set_bounds(Rect::new(0.0, 0.0, 240.0, 200.0));

        selected.set(Some("ovid".into()));
        combo.focus();
        combo.input("sta");
        assert_eq!(combo.view(Some("ovid")).text, "sta");

        document.pointer_down(PointerEvent::down(300.0, 10.0));

        assert!(!combo.is_dropdown_visible());
        assert!(!combo.is_editing());
        assert_eq!(combo.filter_text(), "");
        assert_eq!(combo.view(Some("ovid")).text, "Ovid");
        assert_eq!(combo.view(None).text, "");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_press_inside_bounds_keeps_dropdown() {
        let ctx = ReactiveContext::new();
        let document = Document::new();
        let (mut combo, _, _) = picker(&ctx);
        combo.mount(&document);
        combo.set_bounds(Rect::new(10.0, 10.0, 100.0, 100.0));

        combo.focus();
        combo.input("o");
        document.pointer_down(PointerEvent {
            position: Point::new(50.0, 50.0),
            button: Default::default(),
        });

        assert_eq!(combo.phase(), ComboboxPhase::Editing);
        assert_eq!(combo.filter_text(), "o");
    }

    #[test]
    fn test_unknown_bounds_treat_every_press_as_outside() {
        let ctx = ReactiveContext::new();
        let document = Document::new();
        let (mut combo, _, _) = picker(&ctx);
        combo.mount(&document);

        combo.focus();
        document.pointer_down(PointerEvent::down(0.0, 0.0));
        assert_eq!(combo.phase(), ComboboxPhase::Closed);
    }

    #[test]
    fn test_blur_while_open_keeps_filter() {
        let ctx = ReactiveContext::new();
        let (combo, _, _) = picker(&ctx);

        combo.focus();
        combo.input("ov");
        combo.blur();

        assert_eq!(combo.filter_text(), "ov");
        assert!(combo.is_editing());
        assert!(combo.is_dropdown_visible());
    }

    #[test]
    fn test_blur_while_closed_exits_editing() {
        let ctx = ReactiveContext::new();
        let visible = ctx.use_state(false);
        let combo = combobox(&ctx)
            .options(authors())
            .dropdown_visible_state(&visible)
            .build();

        combo.focus();
        combo.input("ov");
        // Owner hides the dropdown while the field keeps focus
        visible.set(false);
        assert_eq!(combo.phase(), ComboboxPhase::Detached);

        combo.blur();
        assert_eq!(combo.phase(), ComboboxPhase::Closed);
        assert_eq!(combo.filter_text(), "");
    }

    #[test]
    fn test_no_matches_row() {
        let ctx = ReactiveContext::new();
        let combo = combobox(&ctx)
            .options(authors())
            .no_matches_text("Nobody by that name")
            .build();

        combo.focus();
        combo.input("homer");

        let view = combo.view(None);
        assert_eq!(
            view.dropdown,
            Some(vec![DropdownRow::NoMatches {
                text: "Nobody by that name".into()
            }])
        );
        assert!(!view.dropdown.unwrap()[0].is_interactive());
        // The placeholder row can't be committed
        assert!(!combo.pointer_down_row(0));
    }

    #[test]
    fn test_unmount_and_drop_release_listener() {
        let ctx = ReactiveContext::new();
        let document = Document::new();

        let (mut combo, _, _) = picker(&ctx);
        combo.mount(&document);
        assert!(combo.is_mounted());
        assert_eq!(document.listener_count(), 1);

        // Remounting replaces rather than stacks
        combo.mount(&document);
        assert_eq!(document.listener_count(), 1);

        combo.unmount();
        assert!(!combo.is_mounted());
        assert_eq!(document.listener_count(), 0);

        combo.mount(&document);
        drop(combo);
        assert_eq!(document.listener_count(), 0);
    }

    #[test]
    fn test_controlled_slots_receive_writes() {
        let ctx = ReactiveContext::new();
        let filter_writes = Arc::new(Mutex::new(Vec::new()));
        let open = ctx.use_state(false);

        let filter_value = Arc::new(Mutex::new(String::new()));
        let filter_for_get = Arc::clone(&filter_value);
        let filter_for_set = Arc::clone(&filter_value);
        let writes_for_set = Arc::clone(&filter_writes);

        let combo = combobox(&ctx)
            .options(authors())
            .filter_text(
                move || filter_for_get.lock().unwrap().clone(),
                move |text| {
                    writes_for_set.lock().unwrap().push(text.clone());
                    *filter_for_set.lock().unwrap() = text;
                },
            )
            .dropdown_visible_state(&open)
            .build();

        // Caller state + options, editing, highlight, bounds
        assert_eq!(ctx.stats().signal_count, 5);

        combo.focus();
        combo.input("v");
        assert!(open.get());
        assert_eq!(combo.filter_text(), "v");

        assert!(combo.key_down(KeyCode::Escape));
        assert!(!open.get());
        assert_eq!(*filter_writes.lock().unwrap(), vec!["v", ""]);
    }

    #[test]
    fn test_caller_can_open_dropdown() {
        let ctx = ReactiveContext::new();
        let open = ctx.use_state(false);
        let combo = combobox(&ctx)
            .options(authors())
            .dropdown_visible_state(&open)
            .build();

        open.set(true);
        assert_eq!(combo.phase(), ComboboxPhase::Browsing);

        let view = combo.view(Some("stat"));
        assert_eq!(view.text, "Statius");
        assert_eq!(view.option_count(), 5);
        assert!(combo.pointer_down_row(4));
        assert!(!open.get());
    }

    #[test]
    fn test_closed_outside_press_writes_nothing() {
        let ctx = ReactiveContext::new();
        let writes = Arc::new(Mutex::new(0));
        let writes_clone = Arc::clone(&writes);
        let document = Document::new();

        let mut combo = combobox(&ctx)
            .options(authors())
            .dropdown_visible(|| false, move |_| *writes_clone.lock().unwrap() += 1)
            .build();
        combo.mount(&document);

        document.pointer_down(PointerEvent::down(900.0, 900.0));
        assert_eq!(*writes.lock().unwrap(), 0);
    }

    #[test]
    fn test_keyboard_navigation_skips_disabled_and_wraps() {
        let ctx = ReactiveContext::new();
        let picked = Arc::new(Mutex::new(Vec::new()));
        let picked_clone = Arc::clone(&picked);

        let combo = combobox(&ctx)
            .option("verg", "Vergil")
            .option_disabled("ovid", "Ovid")
            .option("luc", "Lucan")
            .on_select(move |key| picked_clone.lock().unwrap().push(key.to_string()))
            .build();

        // Down on a closed dropdown opens it and highlights the first row
        assert!(combo.key_down(KeyCode::ArrowDown));
        assert!(combo.is_dropdown_visible());
        assert_eq!(combo.highlighted(), Some(0));

        combo.key_down(KeyCode::ArrowDown);
        assert_eq!(combo.highlighted(), Some(2));

        combo.key_down(KeyCode::ArrowDown);
        assert_eq!(combo.highlighted(), Some(0));

        combo.key_down(KeyCode::ArrowUp);
        assert_eq!(combo.highlighted(), Some(2));

        assert!(combo.key_down(KeyCode::Enter));
        assert_eq!(*picked.lock().unwrap(), vec!["luc".to_string()]);
        assert_eq!(combo.phase(), ComboboxPhase::Closed);
        assert_eq!(combo.highlighted(), None);
    }

    #[test]
    fn test_typing_resets_highlight() {
        let ctx = ReactiveContext::new();
        let (combo, _, calls) = picker(&ctx);

        combo.focus();
        combo.key_down(KeyCode::ArrowDown);
        combo.key_down(KeyCode::ArrowDown);
        assert_eq!(combo.highlighted(), Some(1));

        combo.input("s");
        assert_eq!(combo.highlighted(), None);
        // Enter without a highlight commits nothing
        assert!(!combo.key_down(KeyCode::Enter));
        assert!(calls.lock().unwrap().is_empty());

        let view = combo.view(None);
        assert!(view.dropdown.unwrap().iter().all(|row| !matches!(
            row,
            DropdownRow::Option {
                highlighted: true,
                ..
            }
        )));
    }

    #[test]
    fn test_disabled_option_not_committed() {
        let ctx = ReactiveContext::new();
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = Arc::clone(&calls);
        let combo = combobox(&ctx)
            .option_disabled("ovid", "Ovid")
            .on_select(move |_| *calls_clone.lock().unwrap() += 1)
            .build();

        combo.focus();
        assert!(!combo.pointer_down_row(0));
        assert!(!combo.key_down(KeyCode::Enter));
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(combo.is_dropdown_visible());
    }

    #[test]
    fn test_row_press_while_closed_is_ignored() {
        let ctx = ReactiveContext::new();
        let (combo, _, calls) = picker(&ctx);

        assert!(!combo.pointer_down_row(0));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disabled_combobox_ignores_events() {
        let ctx = ReactiveContext::new();
        let combo = combobox(&ctx).options(authors()).disabled(true).build();

        combo.focus();
        combo.input("v");
        assert!(!combo.key_down(KeyCode::ArrowDown));
        assert_eq!(combo.phase(), ComboboxPhase::Closed);
        assert!(combo.view(None).disabled);
    }

    #[test]
    fn test_placeholder_and_selection_marking() {
        let ctx = ReactiveContext::new();
        let combo = combobox(&ctx)
            .options(authors())
            .placeholder("Search authors...")
            .build();

        let view = combo.view(None);
        assert!(view.shows_placeholder());

        combo.focus();
        let view = combo.view(Some("luc"));
        let selected: Vec<_> = view
            .dropdown
            .unwrap()
            .into_iter()
            .filter_map(|row| match row {
                DropdownRow::Option {
                    key, selected: true, ..
                } => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(selected, vec!["luc".to_string()]);
    }

    #[test]
    fn test_set_options_rederives_label() {
        let ctx = ReactiveContext::new();
        let (combo, _, _) = picker(&ctx);
        assert_eq!(combo.view(Some("hor")).text, "");

        combo.set_options(vec![ComboboxOption::new("hor", "Horace")]);
        assert_eq!(combo.view(Some("hor")).text, "Horace");
        assert!(ctx.take_dirty());
    }

    #[test]
    fn test_match_keys_setting() {
        let ctx = ReactiveContext::new();
        let combo = combobox(&ctx)
            .options(authors())
            .match_keys(true)
            .build();

        combo.focus();
        combo.input("verg");
        assert_eq!(combo.filtered_options().len(), 1);
        combo.input("stat");
        assert_eq!(combo.filtered_options()[0].label, "Statius");
    }

    #[test]
    fn test_phase_transitions() {
        use ComboboxEvent::*;

        assert_eq!(ComboboxPhase::Closed.next(&Blur).editing, Some(false));
        assert!(ComboboxPhase::Editing.next(&Blur).is_noop());
        assert!(ComboboxPhase::Browsing.next(&Blur).is_noop());

        let focus = ComboboxPhase::Closed.next(&Focus);
        assert_eq!(focus.filter_text.as_deref(), Some(""));
        assert_eq!(focus.dropdown_visible, Some(true));

        assert_eq!(ComboboxPhase::Editing.next(&OpenList).filter_text, None);

        let commit = ComboboxPhase::Editing.next(&Commit("ovid".into()));
        assert_eq!(commit.commit.as_deref(), Some("ovid"));
        assert_eq!(commit.dropdown_visible, Some(false));
        assert_eq!(
            ComboboxPhase::Detached.next(&OutsidePointerDown),
            ComboboxPhase::Detached.next(&Dismiss)
        );
    }
}
