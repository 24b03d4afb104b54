//! Event scripts for `tesserae replay`
//!
//! One step per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! bounds 0 0 240 200
//! focus
//! type ov
//! key down
//! pick 0
//! click 400 10
//! blur
//! unmount
//! ```

use std::fmt;

use tesserae_core::{KeyCode, ParseKeyError, Point, Rect};
use thiserror::Error;

/// One scripted interaction
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Focus,
    Blur,
    /// Replace the field's text
    Type(String),
    /// Press on dropdown row `n`
    Pick(usize),
    /// Press anywhere on the page
    Click(Point),
    Key(KeyCode),
    Bounds(Rect),
    Mount,
    Unmount,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Focus => write!(f, "focus"),
            Step::Blur => write!(f, "blur"),
            Step::Type(text) => write!(f, "type {}", text),
            Step::Pick(row) => write!(f, "pick {}", row),
            Step::Click(p) => write!(f, "click {} {}", p.x, p.y),
            Step::Key(key) => write!(f, "key {}", key),
            Step::Bounds(r) => write!(f, "bounds {} {} {} {}", r.x, r.y, r.width, r.height),
            Step::Mount => write!(f, "mount"),
            Step::Unmount => write!(f, "unmount"),
        }
    }
}

/// Errors raised while parsing a script
#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' expects {expected}")]
    BadArguments {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: {source}")]
    Key {
        line: usize,
        #[source]
        source: ParseKeyError,
    },
}

/// Parse a whole script
pub fn parse_script(source: &str) -> Result<Vec<Step>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                None
            } else {
                Some(parse_step(idx + 1, line))
            }
        })
        .collect()
}

fn parse_step(line: usize, text: &str) -> Result<Step, ScriptError> {
    let (command, rest) = match text.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (text, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let step = match command {
        "focus" => Step::Focus,
        "blur" => Step::Blur,
        "mount" => Step::Mount,
        "unmount" => Step::Unmount,
        // Everything after the command is the text, spaces included
        "type" => Step::Type(rest.to_string()),
        "pick" => {
            let row = match args.as_slice() {
                [row] => row.parse().ok(),
                _ => None,
            };
            Step::Pick(row.ok_or(ScriptError::BadArguments {
                line,
                command: "pick",
                expected: "a row number",
            })?)
        }
        "click" => {
            let [x, y] = numbers::<2>(&args).ok_or(ScriptError::BadArguments {
                line,
                command: "click",
                expected: "<x> <y>",
            })?;
            Step::Click(Point::new(x, y))
        }
        "bounds" => {
            let [x, y, w, h] = numbers::<4>(&args).ok_or(ScriptError::BadArguments {
                line,
                command: "bounds",
                expected: "<x> <y> <width> <height>",
            })?;
            Step::Bounds(Rect::new(x, y, w, h))
        }
        "key" => {
            let [name] = args.as_slice() else {
                return Err(ScriptError::BadArguments {
                    line,
                    command: "key",
                    expected: "one of up, down, enter, escape",
                });
            };
            let key = name
                .parse::<KeyCode>()
                .map_err(|source| ScriptError::Key { line, source })?;
            Step::Key(key)
        }
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    };
    Ok(step)
}

/// Exactly `N` float arguments
fn numbers<const N: usize>(args: &[&str]) -> Option<[f32; N]> {
    if args.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.parse().ok()?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_script() {
        let steps = parse_script(
            "# pick an author\n\
             bounds 0 0 240 200\n\
             focus\n\
             \n\
             type silius ital\n\
             key Down\n\
             pick 0\n\
             click 400.5 10\n\
             blur\n\
             unmount\n",
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Step::Bounds(Rect::new(0.0, 0.0, 240.0, 200.0)),
                Step::Focus,
                Step::Type("silius ital".into()),
                Step::Key(KeyCode::ArrowDown),
                Step::Pick(0),
                Step::Click(Point::new(400.5, 10.0)),
                Step::Blur,
                Step::Unmount,
            ]
        );
    }

    #[test]
    fn test_bare_type_clears_text() {
        assert_eq!(parse_script("type").unwrap(), vec![Step::Type(String::new())]);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse_script("focus\njump 3"),
            Err(ScriptError::UnknownCommand {
                line: 2,
                command: "jump".into()
            })
        );

        let err = parse_script("\n\nclick 1").unwrap_err();
        assert_eq!(err.to_string(), "line 3: 'click' expects <x> <y>");

        assert!(matches!(
            parse_script("pick -1"),
            Err(ScriptError::BadArguments { line: 1, .. })
        ));
        assert!(matches!(
            parse_script("key space"),
            Err(ScriptError::Key { line: 1, .. })
        ));
    }

    #[test]
    fn test_step_display_matches_syntax() {
        for line in ["focus", "type ov", "pick 2", "key escape", "click 1 2"] {
            let steps = parse_script(line).unwrap();
            assert_eq!(steps[0].to_string(), line);
        }
    }
}
