//! Format-preserving JSON serialization.
//!
//! `docs.json` files in the wild carry different indentation conventions
//! (two spaces, four spaces, tabs, occasionally a stepped mix). Re-saving
//! with a fixed canonical style would drown the actual change in diff
//! noise, so the style of the existing text is detected first and the
//! mutated tree is re-emitted with that same convention.

use serde_json::Value;

use crate::TreeError;
use crate::model::NavigationDoc;

/// Number of leading lines sampled during style detection.
const SAMPLE_LINES: usize = 300;

/// Detected formatting convention of a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStyle {
    /// Indentation character, space or tab.
    pub indent_char: char,
    /// Characters added per nesting level when the progression is uniform.
    pub indent_unit: usize,
    /// Per-level increments when the progression is stepped rather than
    /// uniform; empty means uniform.
    pub increments: Vec<usize>,
    /// Whether a space follows the key/value colon.
    pub key_spacing: bool,
    /// Whether the document ends with a newline.
    pub trailing_newline: bool,
}

impl Default for JsonStyle {
    fn default() -> Self {
        Self {
            indent_char: ' ',
            indent_unit: 4,
            increments: Vec::new(),
            key_spacing: true,
            trailing_newline: true,
        }
    }
}

impl JsonStyle {
    /// Infer the style of existing JSON text.
    ///
    /// Samples indentation run lengths across the leading non-trivial
    /// lines and derives either a uniform unit or a stepped progression,
    /// plus colon spacing and the trailing-newline convention.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let mut style = Self {
            trailing_newline: text.ends_with('\n'),
            ..Self::default()
        };

        let lines: Vec<&str> = text.lines().take(SAMPLE_LINES).collect();

        let mut seen_levels: Vec<usize> = Vec::new();
        for line in &lines {
            let stripped = line.trim_start_matches([' ', '\t']);
            if stripped.is_empty() {
                continue;
            }
            let lead = &line[..line.len() - stripped.len()];
            if lead.is_empty() {
                continue;
            }
            if lead.contains('\t') {
                style.indent_char = '\t';
            }
            let count = lead.chars().count();
            if !seen_levels.contains(&count) {
                seen_levels.push(count);
            }
        }

        if !seen_levels.is_empty() {
            seen_levels.sort_unstable();
            let mut increments = Vec::with_capacity(seen_levels.len());
            let mut prev = 0;
            for level in seen_levels {
                increments.push(level - prev);
                prev = level;
            }
            let uniform = increments.windows(2).all(|w| w[0] == w[1]);
            if uniform {
                style.indent_unit = increments[0];
                style.increments.clear();
            } else {
                style.increments = increments;
            }
        }

        let colon_lines: Vec<&str> = lines
            .iter()
            .filter(|l| l.contains("\":"))
            .take(100)
            .copied()
            .collect();
        if !colon_lines.is_empty() {
            let with_space = colon_lines.iter().filter(|l| l.contains("\": ")).count();
            style.key_spacing = with_space > colon_lines.len() / 2;
        }

        style
    }

    /// Indentation string for a nesting level.
    #[must_use]
    pub fn indent(&self, level: usize) -> String {
        let count = if self.increments.is_empty() {
            self.indent_unit * level
        } else {
            // Stepped progression: sum recorded increments, extending with
            // the last one past the recorded depth.
            (0..level)
                .map(|i| {
                    self.increments
                        .get(i)
                        .or_else(|| self.increments.last())
                        .copied()
                        .unwrap_or(2)
                })
                .sum()
        };
        std::iter::repeat_n(self.indent_char, count).collect()
    }
}

/// Serialize the document using a detected style.
///
/// Arrays keep their element order (`serde_json` is built with
/// `preserve_order`); object keys come out in the model's declaration
/// order, with passthrough keys after the known ones. Use
/// [`to_string_preserving`] when the original text is available and its
/// key order must survive.
///
/// # Errors
///
/// Returns [`TreeError::Json`] if the tree cannot be represented as JSON,
/// which would indicate a model bug rather than bad input.
pub fn to_string_styled(doc: &NavigationDoc, style: &JsonStyle) -> Result<String, TreeError> {
    let value = serde_json::to_value(doc)?;
    Ok(render(&value, style))
}

/// Serialize the document, restoring the key order of the original text.
///
/// Deserializing through the typed model moves flattened passthrough keys
/// (`$schema`, `theme`, `version`, ...) behind the known ones, so the
/// re-emitted value is first realigned against the original: every object
/// emits the keys it shares with its original counterpart in the original
/// order, then any keys the reconciliation introduced. Array elements keep
/// the mutated order and are matched to their originals by identity key
/// (`language`, `dropdown`, `group`, `version`). With no structural edits
/// the output is byte-identical to the input.
///
/// # Errors
///
/// Returns [`TreeError::Json`] when `original` is not valid JSON or the
/// tree cannot be represented as JSON.
pub fn to_string_preserving(
    doc: &NavigationDoc,
    style: &JsonStyle,
    original: &str,
) -> Result<String, TreeError> {
    let reference: Value = serde_json::from_str(original)?;
    let value = reorder_like(serde_json::to_value(doc)?, &reference);
    Ok(render(&value, style))
}

fn render(value: &Value, style: &JsonStyle) -> String {
    let mut out = String::new();
    write_value(&mut out, value, style, 0);
    if style.trailing_newline {
        out.push('\n');
    }
    out
}

/// Object keys whose value identifies an array element across versions of
/// the tree.
const IDENTITY_KEYS: [&str; 4] = ["language", "dropdown", "group", "version"];

fn reorder_like(new: Value, old: &Value) -> Value {
    match (new, old) {
        (Value::Object(mut new_map), Value::Object(old_map)) => {
            let mut out = serde_json::Map::new();
            for (key, old_child) in old_map {
                if let Some(new_child) = new_map.remove(key) {
                    out.insert(key.clone(), reorder_like(new_child, old_child));
                }
            }
            // Keys the reconciliation introduced go after the surviving
            // originals, in model order.
            for (key, child) in new_map {
                out.insert(key, child);
            }
            Value::Object(out)
        }
        (Value::Array(new_items), Value::Array(old_items)) => {
            let mut claimed = vec![false; old_items.len()];
            let items = new_items
                .into_iter()
                .map(|item| match claim_counterpart(&item, old_items, &mut claimed) {
                    Some(idx) => reorder_like(item, &old_items[idx]),
                    None => item,
                })
                .collect();
            Value::Array(items)
        }
        (new, _) => new,
    }
}

/// Find and claim the original array element corresponding to `item`.
fn claim_counterpart(item: &Value, old_items: &[Value], claimed: &mut [bool]) -> Option<usize> {
    let Value::Object(map) = item else {
        // Leaf elements carry no internal key order.
        return None;
    };
    let identity = IDENTITY_KEYS.iter().find_map(|k| map.get(*k).map(|v| (*k, v)));
    for (idx, old) in old_items.iter().enumerate() {
        if claimed[idx] {
            continue;
        }
        let Value::Object(old_map) = old else { continue };
        let matches = match identity {
            Some((key, value)) => old_map.get(key) == Some(value),
            None => true,
        };
        if matches {
            claimed[idx] = true;
            return Some(idx);
        }
    }
    None
}

fn write_value(out: &mut String, value: &Value, style: &JsonStyle, level: usize) {
    let colon = if style.key_spacing { ": " } else { ":" };
    match value {
        Value::Object(map) if !map.is_empty() => {
            out.push('{');
            let child_indent = style.indent(level + 1);
            let last = map.len() - 1;
            for (i, (key, child)) in map.iter().enumerate() {
                out.push('\n');
                out.push_str(&child_indent);
                out.push_str(&escape(key));
                out.push_str(colon);
                write_value(out, child, style, level + 1);
                if i != last {
                    out.push(',');
                }
            }
            out.push('\n');
            out.push_str(&style.indent(level));
            out.push('}');
        }
        Value::Object(_) => out.push_str("{}"),
        Value::Array(items) if !items.is_empty() => {
            out.push('[');
            let child_indent = style.indent(level + 1);
            let last = items.len() - 1;
            for (i, item) in items.iter().enumerate() {
                out.push('\n');
                out.push_str(&child_indent);
                write_value(out, item, style, level + 1);
                if i != last {
                    out.push(',');
                }
            }
            out.push('\n');
            out.push_str(&style.indent(level));
            out.push(']');
        }
        Value::Array(_) => out.push_str("[]"),
        Value::String(s) => out.push_str(&escape(s)),
        other => out.push_str(&other.to_string()),
    }
}

/// JSON string escaping; non-ASCII characters stay literal, matching the
/// UTF-8 convention of the on-disk files.
fn escape(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}
