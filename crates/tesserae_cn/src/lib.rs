//! # Tesserae Component Library (tesserae_cn)
//!
//! Headless selector components for the Tesserae front end.
//!
//! Components keep interaction state and hand back a render model; drawing
//! it is the host's job.
//!
//! - **Combobox** - filterable single-select dropdown (the author picker)
//! - **SearchModeToggle** - exact / semantic search switch
//!
//! ## Example
//!
//! ```rust
//! use tesserae_cn::prelude::*;
//! use tesserae_core::ReactiveContext;
//!
//! let ctx = ReactiveContext::new();
//! let config = CnConfig::default();
//!
//! let picker = cn::combobox(&ctx)
//!     .settings(config.combobox.clone())
//!     .option("verg", "Vergil")
//!     .option("ovid", "Ovid")
//!     .build();
//!
//! let mode = cn::search_mode_toggle(&ctx)
//!     .initial(config.search_mode.default)
//!     .build();
//!
//! picker.focus();
//! assert_eq!(picker.view(None).option_count(), 2);
//! assert_eq!(mode.mode(), SearchMode::Exact);
//! ```

pub mod components;
pub mod config;

pub use components::*;
pub use config::{CnConfig, ComboboxSettings, ConfigError, SearchModeSettings};

/// Convenience module for accessing components with `cn::` prefix
pub mod cn {
    pub use crate::components::combobox::combobox;
    pub use crate::components::search_mode::search_mode_toggle;
}

/// Everything a host usually needs
pub mod prelude {
    pub use crate::cn;
    pub use crate::components::combobox::{
        Combobox, ComboboxOption, ComboboxOptions, ComboboxPhase, ComboboxView, DropdownRow,
    };
    pub use crate::components::search_mode::{SearchMode, SearchModeToggle};
    pub use crate::config::CnConfig;
}
