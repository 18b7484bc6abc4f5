//! Option scanning over a token queue.
//!
//! Leading option tokens are consumed from the queue; what is left is the
//! residual positional arguments, in their original order:
//! - `-` alone is a positional (stdin/stdout marker) and stops scanning
//! - `--` is consumed and stops scanning
//! - `--name` / `--name=value` are long options
//! - `-abc`, `-fFILE`, `-f FILE`, `-i4` are (bundled) short options

use std::collections::VecDeque;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CommandOptionError, CommandResult};
use crate::option::{ArgRequirement, OptionDef};
use crate::value::{OptionMap, Value};

fn long_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^--([A-Za-z0-9_][-A-Za-z0-9_]*)(?:=(.*))?$").expect("valid regex")
    })
}

/// Scans tokens against one action's option set.
#[derive(Debug, Clone, Copy)]
pub struct OptionParser<'a> {
    options: &'a [OptionDef],
}

impl<'a> OptionParser<'a> {
    pub fn new(options: &'a [OptionDef]) -> Self {
        Self { options }
    }

    fn find_by_long(&self, name: &str) -> Option<&'a OptionDef> {
        self.options.iter().find(|o| o.long() == Some(name))
    }

    fn find_by_short(&self, ch: char) -> Option<&'a OptionDef> {
        self.options.iter().find(|o| o.short() == Some(ch))
    }

    /// Consume leading option tokens from `args` and return their values.
    pub fn parse(&self, args: &mut VecDeque<String>) -> CommandResult<OptionMap> {
        let mut optdict = OptionMap::new();

        while let Some(front) = args.front() {
            if front == "-" || !front.starts_with('-') {
                break;
            }
            let Some(optstr) = args.pop_front() else {
                break;
            };
            if optstr == "--" {
                tracing::trace!("end of options");
                break;
            }
            tracing::trace!(token = %optstr, "scanning option");
            if optstr.starts_with("--") {
                self.parse_long_option(&optstr, &mut optdict)?;
            } else {
                self.parse_short_option(&optstr, args, &mut optdict)?;
            }
        }

        Ok(optdict)
    }

    fn parse_long_option(&self, optstr: &str, optdict: &mut OptionMap) -> CommandResult<()> {
        let Some(caps) = long_token_re().captures(optstr) else {
            return Err(CommandOptionError::new(format!("{optstr}: invalid option.")));
        };
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let inline = caps.get(2).map(|m| m.as_str());

        let optdef = self
            .find_by_long(name)
            .ok_or_else(|| CommandOptionError::new(format!("{optstr}: unknown option.")))?;

        let raw = match (optdef.requirement(), inline) {
            (ArgRequirement::Required, None) => {
                return Err(CommandOptionError::new(format!(
                    "{optstr}: argument required."
                )));
            }
            (ArgRequirement::Absent, Some(_)) => {
                return Err(CommandOptionError::new(format!(
                    "{optstr}: unexpected argument."
                )));
            }
            (_, Some(v)) => Value::Text(v.to_string()),
            (_, None) => Value::Bool(true),
        };

        let value = optdef
            .handle_value(raw)
            .map_err(|msg| CommandOptionError::new(format!("{optstr}: {msg}")))?;
        store(optdef, value, optdict);
        Ok(())
    }

    fn parse_short_option(
        &self,
        optstr: &str,
        args: &mut VecDeque<String>,
        optdict: &mut OptionMap,
    ) -> CommandResult<()> {
        // skip the leading '-'
        let mut rest = &optstr[1..];

        while let Some(ch) = rest.chars().next() {
            let after = &rest[ch.len_utf8()..];
            let optdef = self
                .find_by_short(ch)
                .ok_or_else(|| CommandOptionError::new(format!("-{ch}: unknown option.")))?;

            let raw = match optdef.requirement() {
                ArgRequirement::Required => {
                    rest = "";
                    if after.is_empty() {
                        let next = args.pop_front().ok_or_else(|| {
                            CommandOptionError::new(format!("-{ch}: argument required."))
                        })?;
                        Value::Text(next)
                    } else {
                        Value::Text(after.to_string())
                    }
                }
                ArgRequirement::Optional => {
                    rest = "";
                    if after.is_empty() {
                        Value::Bool(true)
                    } else {
                        Value::Text(after.to_string())
                    }
                }
                ArgRequirement::Absent => {
                    rest = after;
                    Value::Bool(true)
                }
            };

            let shown = (!raw.is_present_marker()).then(|| raw.to_string());
            let value = optdef.handle_value(raw).map_err(|msg| match &shown {
                Some(v) => CommandOptionError::new(format!("-{ch} {v}: {msg}")),
                None => CommandOptionError::new(format!("-{ch}: {msg}")),
            })?;
            store(optdef, value, optdict);
        }

        Ok(())
    }
}

fn store(optdef: &OptionDef, value: Value, optdict: &mut OptionMap) {
    match optdef.operation() {
        Some(operate) => operate(value, optdict),
        None => optdict.insert(optdef.name(), value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> VecDeque<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn residual(q: &VecDeque<String>) -> Vec<&str> {
        q.iter().map(String::as_str).collect()
    }

    fn base_options() -> Vec<OptionDef> {
        vec![
            OptionDef::new("-h, --help", "show help").unwrap(),
            OptionDef::new("-f, --file=FILE", "filename").unwrap(),
            OptionDef::new("-i, --indent[=N]", "indent width").unwrap(),
        ]
    }

    fn debug_option() -> OptionDef {
        OptionDef::new("-D, --debug[=level]", "debug level")
            .unwrap()
            .validate(|v| match v {
                Value::Text(s) if !s.chars().all(|c| c.is_ascii_digit()) => {
                    Some("integer expected.".to_string())
                }
                _ => None,
            })
            .validate(|v| match v {
                Value::Text(s) => match s.parse::<i64>() {
                    Ok(n) if (1..=3).contains(&n) => None,
                    _ => Some("out of range (expected 1..3).".to_string()),
                },
                _ => None,
            })
    }

    #[test]
    fn bundled_short_options_take_rest_of_token() {
        let opts = base_options();
        let mut q = tokens(&["-hi4", "-f", "data.txt", "rest"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert_eq!(m.get("help"), Some(&Value::Bool(true)));
        assert_eq!(m.get_str("indent"), Some("4"));
        assert_eq!(m.get_str("file"), Some("data.txt"));
        assert_eq!(m.len(), 3);
        assert_eq!(residual(&q), vec!["rest"]);
    }

    #[test]
    fn required_short_prefers_attached_value() {
        let opts = base_options();
        let mut q = tokens(&["-hffile.txt", "arg1"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert_eq!(m.get_str("file"), Some("file.txt"));
        assert!(m.is_set("help"));
        assert_eq!(residual(&q), vec!["arg1"]);
    }

    #[test]
    fn optional_short_never_consumes_next_token() {
        let opts = base_options();
        let mut q = tokens(&["-i", "4"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert_eq!(m.get("indent"), Some(&Value::Bool(true)));
        assert_eq!(residual(&q), vec!["4"]);
    }

    #[test]
    fn long_options_with_and_without_values() {
        let opts = base_options();
        let mut q = tokens(&["--help", "--file=file.txt", "--indent=4", "arg1", "arg2"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert!(m.is_set("help"));
        assert_eq!(m.get_str("file"), Some("file.txt"));
        assert_eq!(m.get_str("indent"), Some("4"));
        assert_eq!(residual(&q), vec!["arg1", "arg2"]);

        let mut q = tokens(&["--indent"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert_eq!(m.get("indent"), Some(&Value::Bool(true)));
    }

    #[test]
    fn bare_required_long_option_fails_even_with_next_token() {
        let opts = base_options();
        let mut q = tokens(&["--file", "x.txt", "arg1"]);
        let err = OptionParser::new(&opts).parse(&mut q).unwrap_err();
        assert_eq!(err.message(), "--file: argument required.");
    }

    #[test]
    fn empty_inline_value_is_not_missing() {
        let opts = base_options();
        let mut q = tokens(&["--file="]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert_eq!(m.get_str("file"), Some(""));
    }

    #[test]
    fn unexpected_argument_on_flag() {
        let opts = base_options();
        let mut q = tokens(&["--help=message"]);
        let err = OptionParser::new(&opts).parse(&mut q).unwrap_err();
        assert_eq!(err.message(), "--help=message: unexpected argument.");
    }

    #[test]
    fn unknown_options_are_rejected() {
        let opts = base_options();
        let err = OptionParser::new(&opts)
            .parse(&mut tokens(&["--verbose"]))
            .unwrap_err();
        assert_eq!(err.message(), "--verbose: unknown option.");

        let err = OptionParser::new(&opts)
            .parse(&mut tokens(&["-hx"]))
            .unwrap_err();
        assert_eq!(err.message(), "-x: unknown option.");

        let err = OptionParser::new(&opts)
            .parse(&mut tokens(&["--=x"]))
            .unwrap_err();
        assert_eq!(err.message(), "--=x: invalid option.");
    }

    #[test]
    fn required_short_at_end_of_input() {
        let opts = base_options();
        let err = OptionParser::new(&opts)
            .parse(&mut tokens(&["-hf"]))
            .unwrap_err();
        assert_eq!(err.message(), "-f: argument required.");
    }

    #[test]
    fn single_dash_halts_scanning() {
        let opts = base_options();
        let mut q = tokens(&["-", "-h"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert!(m.is_empty());
        assert_eq!(residual(&q), vec!["-", "-h"]);

        let mut q = tokens(&["-h", "-", "-i"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(residual(&q), vec!["-", "-i"]);
    }

    #[test]
    fn double_dash_is_consumed_once() {
        let opts = base_options();
        let mut q = tokens(&["-h", "--", "-i", "--", "x"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(residual(&q), vec!["-i", "--", "x"]);
    }

    #[test]
    fn scanning_stops_at_first_positional() {
        let opts = base_options();
        let mut q = tokens(&["arg", "-h"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert!(m.is_empty());
        assert_eq!(residual(&q), vec!["arg", "-h"]);
    }

    #[test]
    fn validation_errors_name_the_flag() {
        let opts = vec![debug_option()];
        let err = OptionParser::new(&opts)
            .parse(&mut tokens(&["-D9"]))
            .unwrap_err();
        assert_eq!(err.message(), "-D 9: out of range (expected 1..3).");

        let err = OptionParser::new(&opts)
            .parse(&mut tokens(&["--debug=one"]))
            .unwrap_err();
        assert_eq!(err.message(), "--debug=one: integer expected.");

        let m = OptionParser::new(&opts)
            .parse(&mut tokens(&["-D"]))
            .unwrap();
        assert!(m.is_set("debug"));
    }

    #[test]
    fn flag_only_validation_error_omits_value() {
        let opts = vec![OptionDef::new("-q, --quiet", "quiet")
            .unwrap()
            .validate(|_| Some("not allowed here.".to_string()))];
        let err = OptionParser::new(&opts)
            .parse(&mut tokens(&["-q"]))
            .unwrap_err();
        assert_eq!(err.message(), "-q: not allowed here.");
    }

    #[test]
    fn failed_validation_skips_write_back() {
        let opts = vec![OptionDef::new("-t, --tag=NAME", "tag")
            .unwrap()
            .validate(|v| (v.as_str() == Some("bad")).then(|| "rejected.".to_string()))
            .operate(|v, m| m.push("tags", v))];
        let mut q = tokens(&["-ta", "--tag=b", "-tbad"]);
        let err = OptionParser::new(&opts).parse(&mut q).unwrap_err();
        assert_eq!(err.message(), "-t bad: rejected.");

        let mut q = tokens(&["-ta", "--tag=b"]);
        let m = OptionParser::new(&opts).parse(&mut q).unwrap();
        assert!(!m.contains("tag"));
        assert_eq!(
            m.get("tags"),
            Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn converted_values_are_stored() {
        let opts = vec![OptionDef::new("-n, --lines=N", "line count")
            .unwrap()
            .convert(|v| match v {
                Value::Text(s) => s
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| "integer expected.".to_string()),
                other => Ok(other),
            })];
        let m = OptionParser::new(&opts)
            .parse(&mut tokens(&["-n", "12"]))
            .unwrap();
        assert_eq!(m.get_int("lines"), Some(12));

        let err = OptionParser::new(&opts)
            .parse(&mut tokens(&["--lines=x"]))
            .unwrap_err();
        assert_eq!(err.message(), "--lines=x: integer expected.");
    }
}
