//! Headless selector components built on tesserae_core primitives
//!
//! Each component follows a consistent pattern:
//! - Builder function (e.g., `combobox(&ctx)`)
//! - State held in slots, owned internally unless the caller supplies one
//! - A `view()` returning a plain render model

pub mod combobox;
pub mod search_mode;

pub use combobox::{
    combobox, Combobox, ComboboxBuilder, ComboboxEvent, ComboboxOption, ComboboxOptions,
    ComboboxPhase, ComboboxView, DropdownRow, SelectCallback, Transition,
};
pub use search_mode::{
    search_mode_toggle, ParseSearchModeError, SearchMode, SearchModeToggle,
    SearchModeToggleBuilder, SearchModeView, ToggleSegment,
};
