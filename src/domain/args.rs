//! Quote-aware argument list splitting for `name(...)` fragments.

use crate::domain::error::ParseError;

/// Split an argument list on top-level commas.
///
/// Commas inside single- or double-quoted text, or inside nested
/// parentheses, do not split. A quote preceded by a backslash does not open
/// or close a quoted run. Arguments are trimmed but otherwise kept verbatim,
/// quotes included.
pub fn split_arguments(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut prev: Option<char> = None;

    for ch in input.chars() {
        let escaped = prev == Some('\\');
        match ch {
            '"' | '\'' if !escaped => {
                match quote {
                    Some(open) if open == ch => quote = None,
                    None => quote = Some(ch),
                    Some(_) => {}
                }
                current.push(ch);
            }
            '(' if quote.is_none() => {
                depth += 1;
                current.push(ch);
            }
            ')' if quote.is_none() => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if quote.is_none() && depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
        prev = Some(ch);
    }

    if !current.is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

/// Split `key=value` into its parts when `key` is a plain identifier.
///
/// `"a=b"` (quoted) and `x == y` are not named arguments.
pub fn named_argument(arg: &str) -> Option<(&str, &str)> {
    let (key, value) = arg.split_once('=')?;
    let key = key.trim();
    if !is_identifier(key) || value.starts_with('=') {
        return None;
    }
    Some((key, value.trim()))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Locate the parenthesised argument list opening at byte offset `open`.
///
/// Returns the text between the parentheses and whatever follows the closing
/// one. Quotes are honoured the same way as in [`split_arguments`].
pub fn enclosed(input: &str, open: usize) -> Result<(&str, &str), ParseError> {
    match input[open..].chars().next() {
        Some('(') => {}
        Some(ch) => return Err(ParseError::new(format!("expected '(', found '{ch}'"), open)),
        None => {
            return Err(ParseError::new("expected '(', found end of input", open));
        }
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    for (offset, ch) in input[open..].char_indices() {
        let escaped = prev == Some('\\');
        prev = Some(ch);
        match ch {
            '"' | '\'' if !escaped => match quote {
                Some(q) if q == ch => quote = None,
                None => quote = Some(ch),
                Some(_) => {}
            },
            '(' if quote.is_none() => depth += 1,
            ')' if quote.is_none() => {
                depth -= 1;
                if depth == 0 {
                    let close = open + offset;
                    return Ok((&input[open + 1..close], &input[close + 1..]));
                }
            }
            _ => {}
        }
    }

    Err(ParseError::new(
        "expected ')', found end of input",
        input.len(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_inside_double_quotes_does_not_split() {
        assert_eq!(
            split_arguments(r#"a, "b,c", d"#),
            vec!["a", r#""b,c""#, "d"]
        );
    }

    #[test]
    fn comma_inside_single_quotes_does_not_split() {
        assert_eq!(split_arguments("x, 'y, z'"), vec!["x", "'y, z'"]);
    }

    #[test]
    fn other_quote_kind_inside_quotes_is_literal() {
        assert_eq!(
            split_arguments(r#"r, "it's, fine", color=color.red"#),
            vec!["r", r#""it's, fine""#, "color=color.red"]
        );
    }

    #[test]
    fn escaped_quote_does_not_toggle() {
        assert_eq!(
            split_arguments(r#"r, "say \"hi, there\"", x"#),
            vec!["r", r#""say \"hi, there\"""#, "x"]
        );
    }

    #[test]
    fn nested_parentheses_do_not_split() {
        assert_eq!(
            split_arguments("r, color=color.new(color.red, 50)"),
            vec!["r", "color=color.new(color.red, 50)"]
        );
    }

    #[test]
    fn arguments_are_trimmed() {
        assert_eq!(split_arguments("  close ,\t14  "), vec!["close", "14"]);
    }

    #[test]
    fn empty_input_yields_no_arguments() {
        assert!(split_arguments("").is_empty());
    }

    #[test]
    fn interior_empty_argument_is_kept() {
        assert_eq!(split_arguments("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn trailing_comma_drops_nothing_after_it() {
        assert_eq!(split_arguments("a,"), vec!["a"]);
    }

    #[test]
    fn named_argument_detection() {
        assert_eq!(named_argument("color=color.red"), Some(("color", "color.red")));
        assert_eq!(named_argument("title = \"RSI\""), Some(("title", "\"RSI\"")));
        assert_eq!(named_argument("\"a=b\""), None);
        assert_eq!(named_argument("x == y"), None);
        assert_eq!(named_argument("close"), None);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("close"));
        assert!(is_identifier("_tmp1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("ta.sma"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn enclosed_finds_matching_paren() {
        let text = "plot(r, \"a (b)\") // done";
        let (inner, rest) = enclosed(text, 4).unwrap();
        assert_eq!(inner, "r, \"a (b)\"");
        assert_eq!(rest, " // done");
    }

    #[test]
    fn enclosed_handles_nesting() {
        let (inner, rest) = enclosed("f(g(1), 2)x", 1).unwrap();
        assert_eq!(inner, "g(1), 2");
        assert_eq!(rest, "x");
    }

    #[test]
    fn enclosed_reports_missing_close() {
        let err = enclosed("ta.sma(close, 3", 6).unwrap_err();
        assert!(err.message.contains("expected ')'"));
        assert_eq!(err.position, 15);
    }

    #[test]
    fn enclosed_requires_open_paren() {
        let err = enclosed("ta.sma close", 6).unwrap_err();
        assert!(err.message.contains("expected '('"));
    }
}
