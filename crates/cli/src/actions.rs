//! Actions of the `actcli` demo program.

use std::fs;
use std::io;

use actcli_argparse::{
    ActionDef, App, CommandResult, HandlerSignature, Invocation, OptionDef, Value, error,
};
use anyhow::{Context, Result};

pub fn build_app() -> Result<App> {
    let mut app = App::new("actcli")
        .description("sample actions built on actcli-argparse")
        .version(env!("CARGO_PKG_VERSION"));

    for action in [hello()?, rename()?, count()?, describe()?] {
        let name = action.name().to_string();
        app.register(action)
            .with_context(|| format!("failed to register action '{name}'"))?;
    }
    Ok(app)
}

fn positive_int(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => match s.parse::<i64>() {
            Ok(n) if n > 0 => None,
            Ok(_) => Some("positive integer expected.".to_string()),
            Err(_) => Some("integer expected.".to_string()),
        },
        _ => None,
    }
}

const MAX_INDENT: i64 = 80;

fn indent_in_range(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => match s.parse::<i64>() {
            Ok(n) if n > MAX_INDENT => Some(format!("out of range (expected 1..={MAX_INDENT}).")),
            _ => None,
        },
        _ => None,
    }
}

fn to_int(value: Value) -> Result<Value, String> {
    match value {
        Value::Text(s) => s
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| "integer expected.".to_string()),
        other => Ok(other),
    }
}

fn hello() -> Result<ActionDef> {
    let indent = OptionDef::new("-i, --indent[=N]", "indent width (default 4)")?
        .arg_type("int")
        .validate(positive_int)
        .validate(indent_in_range)
        .convert(to_int);
    let action = ActionDef::define("hello [name]", "print greeting message")
        .doc(
            "
            Greets NAME, or the world when no name is given.
            ",
        )
        .option(OptionDef::new("-h, --help", "show help")?)
        .option(indent)
        .option(OptionDef::new("-u, --upper", "print in upper case")?)
        .handler(HandlerSignature::new().optional("name"), do_hello)?;
    Ok(action)
}

fn do_hello(inv: &Invocation<'_>) -> CommandResult<String> {
    if inv.options().is_set("help") {
        return inv.app().do_help(Some(inv.action().name()));
    }
    let width = match inv.options().get("indent") {
        Some(Value::Int(n)) => usize::try_from(*n).unwrap_or(0),
        Some(Value::Bool(true)) => 4,
        _ => 0,
    };
    let name = inv.arg(0).unwrap_or("world");
    let msg = format!("{:width$}Hello, {name}!", "");
    Ok(if inv.options().is_set("upper") {
        msg.to_uppercase()
    } else {
        msg
    })
}

fn rename() -> Result<ActionDef> {
    let action = ActionDef::define("rename old-name new-name", "show how a file would be renamed")
        .alias("mv")
        .option(OptionDef::new("-n, --dry-run", "only report, never touch files")?)
        .handler(
            HandlerSignature::new().param("old_name").param("new_name"),
            |inv| {
                let (old, new) = (inv.arg(0).unwrap_or_default(), inv.arg(1).unwrap_or_default());
                let prefix = if inv.options().is_set("dry-run") {
                    "[dry-run] "
                } else {
                    ""
                };
                Ok(format!("{prefix}rename: {old} -> {new}"))
            },
        )?;
    Ok(action)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counts {
    lines: usize,
    words: usize,
}

impl Counts {
    fn of(text: &str) -> Self {
        Self {
            lines: text.lines().count(),
            words: text.split_whitespace().count(),
        }
    }

    fn render(&self, with_words: bool, label: &str) -> String {
        if with_words {
            format!("{:>7} {:>7} {label}", self.lines, self.words)
        } else {
            format!("{:>7} {label}", self.lines)
        }
    }
}

fn count() -> Result<ActionDef> {
    let exclude = OptionDef::new("-x, --exclude=PATTERN", "skip files containing PATTERN")?
        .operate(|value, opts| opts.push("exclude", value));
    let action = ActionDef::define("count [file...]", "count lines (and words) of files")
        .option(OptionDef::new("-w, --words", "also count words")?)
        .option(exclude)
        .handler(HandlerSignature::new().variadic(), do_count)?;
    Ok(action)
}

fn do_count(inv: &Invocation<'_>) -> CommandResult<String> {
    let with_words = inv.options().is_set("words");
    let excluded: Vec<String> = match inv.options().get("exclude") {
        Some(Value::List(items)) => items.iter().map(Value::to_string).collect(),
        Some(other) => vec![other.to_string()],
        None => Vec::new(),
    };

    let mut files: Vec<&str> = inv
        .args()
        .iter()
        .map(String::as_str)
        .filter(|f| !excluded.iter().any(|p| f.contains(p.as_str())))
        .collect();
    if inv.args().is_empty() {
        files.push("-");
    }

    let mut lines = Vec::with_capacity(files.len() + 1);
    let mut total = Counts::default();
    for file in &files {
        let counts = Counts::of(&read_input(file)?);
        tracing::debug!(file, lines = counts.lines, words = counts.words, "counted");
        total.lines += counts.lines;
        total.words += counts.words;
        lines.push(counts.render(with_words, file));
    }
    if files.len() > 1 {
        lines.push(total.render(with_words, "total"));
    }
    Ok(lines.join("\n"))
}

fn read_input(path: &str) -> CommandResult<String> {
    let text = if path == "-" {
        io::read_to_string(io::stdin())
    } else {
        fs::read_to_string(path)
    };
    text.or_else(|e| error(format!("{path}: cannot read ({e}).")))
}

fn describe() -> Result<ActionDef> {
    let action = ActionDef::define("describe", "print program metadata as JSON")
        .option(OptionDef::new("--compact", "single-line output")?)
        .handler(HandlerSignature::new(), |inv| {
            let meta = inv.app().metadata();
            let json = if inv.options().is_set("compact") {
                meta.to_json()
            } else {
                meta.to_json_pretty()
            };
            json.or_else(|e| error(format!("failed to encode metadata ({e}).")))
        })?;
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actcli_argparse::Outcome;

    fn output(app: &App, args: &[&str]) -> String {
        match app.run(args.iter().copied()) {
            Ok(Outcome::Output(text)) => text,
            other => panic!("unexpected result for {args:?}: {other:?}"),
        }
    }

    #[test]
    fn hello_variants() {
        let app = build_app().unwrap();
        assert_eq!(output(&app, &["hello"]), "Hello, world!");
        assert_eq!(output(&app, &["hello", "-u", "alice"]), "HELLO, ALICE!");
        assert_eq!(output(&app, &["hello", "-i", "bob"]), "    Hello, bob!");
        assert_eq!(output(&app, &["hello", "-i2", "bob"]), "  Hello, bob!");
        assert_eq!(output(&app, &["hello", "--indent=3"]), "   Hello, world!");
    }

    #[test]
    fn hello_rejects_bad_indent() {
        let app = build_app().unwrap();
        let err = app.run(["hello", "-ix"]).unwrap_err();
        assert_eq!(err.message(), "-i x: integer expected.");
        let err = app.run(["hello", "--indent=0"]).unwrap_err();
        assert_eq!(err.message(), "--indent=0: positive integer expected.");
        let err = app.run(["hello", "-i70000"]).unwrap_err();
        assert_eq!(err.message(), "-i 70000: out of range (expected 1..=80).");
        assert_eq!(output(&app, &["hello", "-i80"]).len(), 80 + "Hello, world!".len());
    }

    #[test]
    fn hello_help_uses_action_help() {
        let app = build_app().unwrap();
        let text = output(&app, &["hello", "-h"]);
        assert!(text.starts_with("actcli hello - print greeting message\n"));
        assert!(text.contains("  Greets NAME, or the world when no name is given.\n"));
        assert!(text.contains("  -i, --indent[=N] : indent width (default 4)\n"));
    }

    #[test]
    fn rename_reports_plan() {
        let app = build_app().unwrap();
        assert_eq!(output(&app, &["rename", "a", "b"]), "rename: a -> b");
        assert_eq!(output(&app, &["mv", "-n", "a", "b"]), "[dry-run] rename: a -> b");
        let err = app.run(["rename", "a"]).unwrap_err();
        assert_eq!(err.message(), "argument (new-name) required.");
    }

    #[test]
    fn counts_lines_and_words() {
        let c = Counts::of("one two\nthree\n");
        assert_eq!(c, Counts { lines: 2, words: 3 });
        assert_eq!(c.render(false, "f"), "      2 f");
        assert_eq!(c.render(true, "f"), "      2       3 f");
    }

    #[test]
    fn count_reports_unreadable_file() {
        let app = build_app().unwrap();
        let err = app.run(["count", "/nonexistent/actcli-file"]).unwrap_err();
        assert!(err.message().starts_with("/nonexistent/actcli-file: cannot read"));
    }

    #[test]
    fn describe_lists_all_actions() {
        let app = build_app().unwrap();
        let meta = actcli_metadata::AppMeta::from_json(&output(&app, &["describe", "--compact"]))
            .unwrap();
        let names: Vec<&str> = meta.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["help", "hello", "rename", "count", "describe"]);
        assert_eq!(meta.action("mv").map(|a| a.name.as_str()), Some("rename"));
    }
}
