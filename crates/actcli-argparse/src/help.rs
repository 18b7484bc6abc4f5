//! Help and usage rendering.
//!
//! Everything here is pure formatting over registered definitions.

use crate::action::ActionDef;
use crate::option::OptionDef;

/// Narrowest left column.
pub const MIN_COLUMN_WIDTH: usize = 10;
/// Widest left column; longer entries overflow instead of widening the table.
pub const MAX_COLUMN_WIDTH: usize = 25;

const INDENT: &str = "  ";

/// Left column width for entries of the given lengths.
pub fn preferred_width<I>(lengths: I) -> usize
where
    I: IntoIterator<Item = usize>,
{
    let capped = lengths
        .into_iter()
        .max()
        .map_or(MAX_COLUMN_WIDTH, |longest| longest.min(MAX_COLUMN_WIDTH));
    capped.max(MIN_COLUMN_WIDTH)
}

/// Render the program-level help: description, usage and the action list.
pub fn app_help<'a, I>(script_name: &str, desc: Option<&str>, actions: I) -> String
where
    I: IntoIterator<Item = &'a ActionDef>,
{
    let mut actions: Vec<&ActionDef> = actions.into_iter().collect();
    actions.sort_by(|a, b| a.name().cmp(b.name()));

    let mut out = String::new();
    if let Some(desc) = desc.filter(|d| !d.trim().is_empty()) {
        out.push_str(&format!("{script_name}  - {}\n\n", desc.trim()));
    }
    out.push_str("Usage:\n");
    out.push_str(&format!(
        "{INDENT}{script_name} <action> [<options>] [<args>...]\n"
    ));

    let width = preferred_width(actions.iter().map(|a| a.name().chars().count()));
    let rows: Vec<String> = actions
        .iter()
        .filter_map(|a| {
            a.desc()
                .filter(|d| !d.is_empty())
                .map(|d| format!("{INDENT}{:width$} : {d}\n", a.name(), width = width))
        })
        .collect();
    if !rows.is_empty() {
        out.push_str("\nActions:\n");
        for row in rows {
            out.push_str(&row);
        }
    }
    out
}

/// Render help for one action.
///
/// With `print_action` unset the action name is left out of the header and
/// usage line (used by programs that have a single unnamed command).
pub fn action_help(action: &ActionDef, script_name: &str, print_action: bool) -> String {
    let action_str = if print_action {
        format!(" {}", action.name())
    } else {
        String::new()
    };

    let mut out = String::new();
    if let Some(desc) = action.desc() {
        out.push_str(&format!("{script_name}{action_str} - {desc}\n"));
    }
    if let Some(doc) = action.doc() {
        out.push_str(&format_doc(doc));
    }

    let options_doc = format_options(action.options());
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str("Usage:\n");
    out.push_str(&format!(
        "{INDENT}{script_name}{action_str}{}{}\n",
        if options_doc.is_empty() { "" } else { " [<options>]" },
        action.argdef().map(|a| format!(" {a}")).unwrap_or_default(),
    ));

    if !options_doc.is_empty() {
        out.push_str("\nOptions:\n");
        out.push_str(&options_doc);
    }
    out
}

/// One line per documented option (options with an empty description are hidden).
pub fn format_options(options: &[OptionDef]) -> String {
    let rows: Vec<(String, &str)> = options
        .iter()
        .filter(|o| !o.desc().is_empty())
        .map(|o| (o.format(), o.desc()))
        .collect();
    let width = preferred_width(rows.iter().map(|(left, _)| left.chars().count()));
    rows.iter()
        .map(|(left, desc)| format!("{INDENT}{left:width$} : {desc}\n"))
        .collect()
}

/// Re-indent free-form documentation by two spaces.
///
/// The indentation of the first indented line is taken as the original
/// margin and replaced on every line that carries it.
pub fn format_doc(doc: &str) -> String {
    let doc = doc.strip_prefix('\n').unwrap_or(doc).trim_end();
    if doc.is_empty() {
        return String::new();
    }
    let margin: &str = doc
        .lines()
        .find_map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            let len = line.len() - trimmed.len();
            (len > 0 && !trimmed.is_empty()).then(|| &line[..len])
        })
        .unwrap_or("");

    let mut out = String::new();
    for line in doc.lines() {
        match line.strip_prefix(margin) {
            Some(rest) if !margin.is_empty() => {
                out.push_str(INDENT);
                out.push_str(rest);
            }
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    out
}
