//! Plain-text rendering of component views

use std::fmt::Write;

use tesserae_cn::{ComboboxPhase, ComboboxView, DropdownRow};

fn phase_name(phase: ComboboxPhase) -> &'static str {
    match phase {
        ComboboxPhase::Closed => "closed",
        ComboboxPhase::Editing => "editing",
        ComboboxPhase::Detached => "editing, list hidden",
        ComboboxPhase::Browsing => "open",
    }
}

/// Render a combobox view as indented lines
///
/// ```text
/// field: "ov"  [editing]
///   > Ovid *
///     Ovidius (disabled)
/// ```
pub fn render_combobox(view: &ComboboxView) -> String {
    let mut out = String::new();

    let field = match (&view.placeholder, view.shows_placeholder()) {
        (Some(placeholder), true) => format!("<{}>", placeholder),
        _ => format!("{:?}", view.text),
    };
    let _ = write!(out, "field: {}  [{}]", field, phase_name(view.phase));
    if view.disabled {
        out.push_str(" (disabled)");
    }
    out.push('\n');

    for row in view.dropdown.iter().flatten() {
        match row {
            DropdownRow::Option {
                label,
                selected,
                highlighted,
                disabled,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "  {} {}{}{}",
                    if *highlighted { ">" } else { " " },
                    label,
                    if *selected { " *" } else { "" },
                    if *disabled { " (disabled)" } else { "" },
                );
            }
            DropdownRow::NoMatches { text } => {
                let _ = writeln!(out, "    ({})", text);
            }
        }
    }
    out
}
