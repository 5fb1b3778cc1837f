//! Scalar and container literal parsing
//!
//! Grammar accepted by [`parse_literal`]:
//!
//! ```text
//! value   := list | paren | braces | string | atom
//! list    := '[' items? ']'
//! paren   := '(' items? ')'        one item without a trailing comma is just that item
//! braces  := '{' (items | pairs)? '}'   '{}' is an empty mapping
//! pairs   := value ':' value (',' value ':' value)* ','?
//! items   := value (',' value)* ','?
//! string  := '\'' ... '\'' | '"' ... '"'
//! atom    := True | False | true | false | integer | float | complex
//! ```

use crate::value::ConcreteValue;
use num_complex::Complex64;

/// Deepest container nesting accepted before the input is given up on
const MAX_DEPTH: usize = 128;

/// Parse a whole input as one literal, or nothing
pub(crate) fn parse_literal(src: &str) -> Option<ConcreteValue> {
    let mut parser = Parser {
        src,
        pos: 0,
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos == src.len() {
        Some(value)
    } else {
        None
    }
}

/// Parse a complex number with a `j`/`J` imaginary suffix
///
/// Accepts `3j`, `-2.5J`, `1+2j`, `1e3-4j` and the parenthesised `(1+2j)`.
/// Plain reals are not complex literals here; the integer and float
/// conversions own those.
pub(crate) fn parse_complex(s: &str) -> Option<Complex64> {
    let s = s.trim();
    let s = s
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(s)
        .trim();
    let body = s.strip_suffix('j').or_else(|| s.strip_suffix('J'))?;
    if !body.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    if let Ok(im) = body.parse::<f64>() {
        return Some(Complex64::new(0.0, im));
    }

    // Split at the last sign that is not an exponent sign
    let bytes = body.as_bytes();
    let split = (1..bytes.len()).rev().find(|&i| {
        (bytes[i] == b'+' || bytes[i] == b'-') && !matches!(bytes[i - 1], b'e' | b'E')
    })?;
    let re = body[..split].parse::<f64>().ok()?;
    let im = match &body[split..] {
        "+" => 1.0,
        "-" => -1.0,
        part => part.parse::<f64>().ok()?,
    };
    Some(Complex64::new(re, im))
}

fn parse_atom(token: &str) -> Option<ConcreteValue> {
    match token {
        "True" | "true" => return Some(ConcreteValue::Boolean(true)),
        "False" | "false" => return Some(ConcreteValue::Boolean(false)),
        _ => {}
    }
    if let Ok(n) = token.parse::<i64>() {
        return Some(ConcreteValue::Integer(n));
    }
    if token.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(n) = token.parse::<f64>() {
            return Some(ConcreteValue::Float(n));
        }
    }
    parse_complex(token).map(ConcreteValue::Complex)
}

/// Set elements and mapping keys must be immutable all the way down
fn hashable(value: &ConcreteValue) -> bool {
    match value {
        ConcreteValue::Sequence(_) | ConcreteValue::Set(_) | ConcreteValue::Mapping(_) => false,
        ConcreteValue::Tuple(items) => items.iter().all(hashable),
        _ => true,
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Option<ConcreteValue> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = self.nested_value();
        self.depth -= 1;
        value
    }

    fn nested_value(&mut self) -> Option<ConcreteValue> {
        self.skip_ws();
        match self.peek()? {
            '[' => {
                self.bump();
                let (items, _) = self.items(']')?;
                Some(ConcreteValue::Sequence(items))
            }
            '(' => {
                self.bump();
                let (mut items, trailing_comma) = self.items(')')?;
                if items.len() == 1 && !trailing_comma {
                    items.pop()
                } else {
                    Some(ConcreteValue::Tuple(items))
                }
            }
            '{' => {
                self.bump();
                self.braces()
            }
            quote @ ('\'' | '"') => {
                self.bump();
                self.string(quote).map(ConcreteValue::Text)
            }
            _ => self.atom(),
        }
    }

    /// Comma separated values up to `close`; reports a trailing comma
    fn items(&mut self, close: char) -> Option<(Vec<ConcreteValue>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            if self.eat(close) {
                return Some((items, trailing_comma));
            }
            items.push(self.value()?);
            trailing_comma = self.eat(',');
            if !trailing_comma {
                return if self.eat(close) {
                    Some((items, false))
                } else {
                    None
                };
            }
        }
    }

    fn braces(&mut self) -> Option<ConcreteValue> {
        if self.eat('}') {
            return Some(ConcreteValue::Mapping(Vec::new()));
        }

        let first = self.value()?;
        if !self.eat(':') {
            // A set: continue with the remaining elements
            let mut items = vec![first];
            if self.eat(',') {
                let (rest, _) = self.items('}')?;
                items.extend(rest);
            } else if !self.eat('}') {
                return None;
            }
            if !items.iter().all(hashable) {
                return None;
            }
            return Some(ConcreteValue::set(items));
        }

        if !hashable(&first) {
            return None;
        }
        let mut entries = vec![(first, self.value()?)];
        loop {
            if self.eat('}') {
                break;
            }
            if !self.eat(',') {
                return None;
            }
            if self.eat('}') {
                break;
            }
            let key = self.value()?;
            if !hashable(&key) || !self.eat(':') {
                return None;
            }
            entries.push((key, self.value()?));
        }
        Some(ConcreteValue::mapping(entries))
    }

    fn string(&mut self, quote: char) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(out),
                '\\' => match self.bump()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    other => out.push(other),
                },
                c => out.push(c),
            }
        }
    }

    fn atom(&mut self) -> Option<ConcreteValue> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ',' | ':' | ']' | ')' | '}' | '[' | '(' | '{') {
                break;
            }
            self.bump();
        }
        parse_atom(&self.src[start..self.pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(n: i64) -> ConcreteValue {
        ConcreteValue::Integer(n)
    }

    #[test]
    fn test_parse_complex() {
        assert_eq!(parse_complex("3j"), Some(Complex64::new(0.0, 3.0)));
        assert_eq!(parse_complex("1+2j"), Some(Complex64::new(1.0, 2.0)));
        assert_eq!(parse_complex("(1-2.5J)"), Some(Complex64::new(1.0, -2.5)));
        assert_eq!(parse_complex("1e3-4j"), Some(Complex64::new(1000.0, -4.0)));
        assert_eq!(parse_complex("-j"), None);
        assert_eq!(parse_complex("5"), None);
        assert_eq!(parse_complex("banjo"), None);
    }

    #[test]
    fn test_sequences() {
        assert_eq!(
            parse_literal("[1, 2.5, 'a', True]"),
            Some(ConcreteValue::Sequence(vec![
                int(1),
                ConcreteValue::Float(2.5),
                "a".into(),
                true.into()
            ]))
        );
        assert_eq!(parse_literal("[]"), Some(ConcreteValue::Sequence(vec![])));
        assert_eq!(
            parse_literal("[[1], [2,]]"),
            Some(ConcreteValue::Sequence(vec![
                ConcreteValue::Sequence(vec![int(1)]),
                ConcreteValue::Sequence(vec![int(2)]),
            ]))
        );
    }

    #[test]
    fn test_tuples() {
        assert_eq!(
            parse_literal("(1, 2)"),
            Some(ConcreteValue::Tuple(vec![int(1), int(2)]))
        );
        assert_eq!(parse_literal("(1,)"), Some(ConcreteValue::Tuple(vec![int(1)])));
        assert_eq!(parse_literal("()"), Some(ConcreteValue::Tuple(vec![])));
        // Parentheses alone do not make a tuple
        assert_eq!(parse_literal("(7)"), Some(int(7)));
    }

    #[test]
    fn test_sets_and_mappings() {
        assert_eq!(
            parse_literal("{1, 2, 2}"),
            Some(ConcreteValue::set(vec![int(1), int(2)]))
        );
        assert_eq!(parse_literal("{}"), Some(ConcreteValue::Mapping(vec![])));
        assert_eq!(
            parse_literal("{'a': 1, \"b\": [2], 'a': 3}"),
            Some(ConcreteValue::mapping(vec![
                ("a".into(), int(3)),
                ("b".into(), ConcreteValue::Sequence(vec![int(2)])),
            ]))
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(parse_literal("[1, 2"), None);
        assert_eq!(parse_literal("[1 2]"), None);
        assert_eq!(parse_literal("{'a': }"), None);
        assert_eq!(parse_literal("[hello]"), None);
        assert_eq!(parse_literal("'unterminated"), None);
        assert_eq!(parse_literal("[1] trailing"), None);
    }

    #[test]
    fn test_unhashable_members_rejected() {
        assert_eq!(parse_literal("{[1]: 2}"), None);
        assert_eq!(parse_literal("{'a': 1, {}: 2}"), None);
        assert_eq!(parse_literal("{[1], 2}"), None);
        assert_eq!(parse_literal("{(1, [2])}"), None);
        assert_eq!(
            parse_literal("{(1, 2): [3]}"),
            Some(ConcreteValue::mapping(vec![(
                ConcreteValue::Tuple(vec![int(1), int(2)]),
                ConcreteValue::Sequence(vec![int(3)]),
            )]))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}{}", "[".repeat(200_000), "]".repeat(200_000));
        assert_eq!(parse_literal(&deep), None);
        assert_eq!(parse_literal(&"[".repeat(200_000)), None);

        let shallow = format!("{}{}", "[".repeat(100), "]".repeat(100));
        assert!(parse_literal(&shallow).is_some());
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse_literal(r"['it\'s', 'a\tb']"),
            Some(ConcreteValue::Sequence(vec!["it's".into(), "a\tb".into()]))
        );
    }
}
