//! Search-mode toggle
//!
//! A two-segment toggle choosing between exact text search and semantic
//! search. The mode lives in a [`Slot`], so the toggle owns it unless the
//! caller hands one in.
//!
//! # Example
//!
//! ```rust
//! use tesserae_cn::components::search_mode::{search_mode_toggle, SearchMode};
//! use tesserae_core::ReactiveContext;
//!
//! let ctx = ReactiveContext::new();
//! let toggle = search_mode_toggle(&ctx)
//!     .on_change(|mode| println!("Searching by {}", mode))
//!     .build();
//!
//! toggle.toggle();
//! assert_eq!(toggle.mode(), SearchMode::Semantic);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tesserae_core::{ReactiveContext, Slot, State};
use thiserror::Error;
use tracing::debug;

/// How queries are matched against the corpus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Literal text matching
    #[default]
    Exact,
    /// Embedding similarity
    Semantic,
}

impl SearchMode {
    /// Every mode, in segment order
    pub const ALL: [SearchMode; 2] = [SearchMode::Exact, SearchMode::Semantic];

    /// Human-facing segment label
    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::Exact => "Exact",
            SearchMode::Semantic => "Semantic",
        }
    }

    /// The other mode
    pub fn flipped(&self) -> SearchMode {
        match self {
            SearchMode::Exact => SearchMode::Semantic,
            SearchMode::Semantic => SearchMode::Exact,
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Exact => f.write_str("exact"),
            SearchMode::Semantic => f.write_str("semantic"),
        }
    }
}

/// Error returned when a search mode name isn't recognized
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown search mode '{0}' (expected 'exact' or 'semantic')")]
pub struct ParseSearchModeError(pub String);

impl FromStr for SearchMode {
    type Err = ParseSearchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(SearchMode::Exact),
            "semantic" => Ok(SearchMode::Semantic),
            _ => Err(ParseSearchModeError(s.to_string())),
        }
    }
}

/// One rendered segment of the toggle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleSegment {
    pub mode: SearchMode,
    pub label: &'static str,
    pub active: bool,
}

/// Render model of the toggle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchModeView {
    pub segments: Vec<ToggleSegment>,
    pub disabled: bool,
}

type ChangeCallback = Arc<dyn Fn(SearchMode) + Send + Sync>;

/// Search-mode toggle component
pub struct SearchModeToggle {
    mode: Slot<SearchMode>,
    disabled: bool,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for SearchModeToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchModeToggle")
            .field("mode", &self.mode())
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl SearchModeToggle {
    /// Current mode
    pub fn mode(&self) -> SearchMode {
        self.mode.get()
    }

    /// Switch to `mode`
    ///
    /// Fires the change callback only if the mode actually changes.
    /// Returns whether it did.
    pub fn select(&self, mode: SearchMode) -> bool {
        if self.disabled || self.mode.get() == mode {
            return false;
        }
        debug!(%mode, "search mode changed");
        self.mode.set(mode);
        if let Some(ref cb) = self.on_change {
            cb(mode);
        }
        true
    }

    /// Flip to the other mode
    pub fn toggle(&self) -> bool {
        self.select(self.mode.get().flipped())
    }

    pub fn view(&self) -> SearchModeView {
        let current = self.mode.get();
        SearchModeView {
            segments: SearchMode::ALL
                .iter()
                .map(|&mode| ToggleSegment {
                    mode,
                    label: mode.label(),
                    active: mode == current,
                })
                .collect(),
            disabled: self.disabled,
        }
    }
}

/// Builder for creating SearchModeToggle components with fluent API
pub struct SearchModeToggleBuilder {
    ctx: ReactiveContext,
    mode: Option<Slot<SearchMode>>,
    initial: SearchMode,
    disabled: bool,
    on_change: Option<ChangeCallback>,
}

impl SearchModeToggleBuilder {
    pub fn new(ctx: &ReactiveContext) -> Self {
        Self {
            ctx: ctx.clone(),
            mode: None,
            initial: SearchMode::default(),
            disabled: false,
            on_change: None,
        }
    }

    /// Starting mode when the toggle owns its state
    pub fn initial(mut self, mode: SearchMode) -> Self {
        self.initial = mode;
        self
    }

    /// Bind the mode to caller-owned state
    pub fn mode_state(mut self, state: &State<SearchMode>) -> Self {
        self.mode = Some(Slot::from_state(state));
        self
    }

    /// Bind the mode to a caller-supplied slot
    pub fn mode_slot(mut self, slot: Slot<SearchMode>) -> Self {
        self.mode = Some(slot);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(SearchMode) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> SearchModeToggle {
        let mode = match self.mode {
            Some(slot) => slot,
            None => Slot::owned(&self.ctx, self.initial),
        };
        SearchModeToggle {
            mode,
            disabled: self.disabled,
            on_change: self.on_change,
        }
    }
}

/// Create a search-mode toggle builder
pub fn search_mode_toggle(ctx: &ReactiveContext) -> SearchModeToggleBuilder {
    SearchModeToggleBuilder::new(ctx)
}
