//! Relaxed object-literal notation, a human-friendly superset of JSON used for
//! metadata in dictionary files and for the `internals` locale data.
//!
//! Compared to JSON it accepts unquoted identifier keys, single, double and
//! back-tick quoted strings, trailing commas and `//` / `/* */` comments.

use crate::types::{PolyglotError, PolyglotResult};
use serde_json::{Map, Number, Value};

const QUOTES: [char; 3] = ['\'', '"', '`'];

/// Default width after which [`stringify`] breaks objects and arrays over lines.
pub const DEFAULT_MAX_LENGTH: usize = 80;

/// Parses a whole input as one value. Trailing blanks and comments are allowed.
pub fn parse(input: &str) -> PolyglotResult<Value> {
    let mut parser = Parser::new(input);
    let value = parser.value()?;
    parser.skip_ignored()?;
    if parser.pos < input.len() {
        return Err(parser.error("Unexpected trailing characters"));
    }
    Ok(value)
}

/// Parses one value at the start of `input` and returns it with the number
/// of bytes consumed.
pub fn parse_prefix(input: &str) -> PolyglotResult<(Value, usize)> {
    let mut parser = Parser::new(input);
    let value = parser.value()?;
    Ok((value, parser.pos))
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, message: &str) -> PolyglotError {
        let excerpt: String = self.input[self.pos..].chars().take(20).collect();
        PolyglotError::Literal {
            offset: self.pos,
            message: format!("{message}: {excerpt}"),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ignored(&mut self) -> PolyglotResult<()> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            if self.rest().starts_with("//") {
                match self.rest().find('\n') {
                    Some(end) => self.pos += end,
                    None => self.pos = self.input.len(),
                }
            } else if self.rest().starts_with("/*") {
                match self.rest()[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error("Unterminated comment")),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn value(&mut self) -> PolyglotResult<Value> {
        self.skip_ignored()?;
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some(c) if QUOTES.contains(&c) => self.string().map(Value::String),
            Some(_) => self.literal(),
            None => Err(self.error("Unexpected end of input")),
        }
    }

    fn string(&mut self) -> PolyglotResult<String> {
        let Some(quote) = self.bump() else {
            return Err(self.error("Expected a string"));
        };
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated string")),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.error("Unterminated string")),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn literal(&mut self) -> PolyglotResult<Value> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || "_.+-".contains(c))
        {
            self.bump();
        }
        let token = &self.input[start..self.pos];
        match token {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "null" => return Ok(Value::Null),
            _ => {}
        }
        if let Ok(integer) = token.parse::<i64>() {
            return Ok(Value::Number(integer.into()));
        }
        if let Some(number) = token.parse::<f64>().ok().and_then(Number::from_f64) {
            return Ok(Value::Number(number));
        }
        self.pos = start;
        Err(self.error("Unexpected character"))
    }

    fn key(&mut self) -> PolyglotResult<String> {
        match self.peek() {
            Some(c) if QUOTES.contains(&c) => self.string(),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
                {
                    self.bump();
                }
                Ok(self.input[start..self.pos].to_string())
            }
            _ => Err(self.error("Expected a key")),
        }
    }

    fn object(&mut self) -> PolyglotResult<Value> {
        self.bump();
        let mut map = Map::new();
        loop {
            self.skip_ignored()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let key = self.key()?;
            self.skip_ignored()?;
            if self.bump() != Some(':') {
                return Err(self.error("Expected ':'"));
            }
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ignored()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => return Err(self.error("Expected ',' or '}'")),
            }
        }
    }

    fn array(&mut self) -> PolyglotResult<Value> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ignored()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_ignored()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                _ => return Err(self.error("Expected ',' or ']'")),
            }
        }
    }
}

/// Writes a value in object-literal notation. Objects and arrays longer than
/// `max_length` are broken over tab-indented lines.
pub fn stringify(value: &Value, max_length: usize) -> String {
    write_value(value, 0, 0, max_length)
}

fn write_value(value: &Value, depth: usize, column: usize, max_length: usize) -> String {
    match value {
        Value::Object(map) if !map.is_empty() => {
            let inline: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", write_key(k), write_value(v, depth + 1, 0, usize::MAX)))
                .collect();
            let single = format!("{{{}}}", inline.join(", "));
            if column + single.len() <= max_length && !single.contains('\n') {
                return single;
            }
            let lines: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    let key = write_key(k);
                    let prefix = depth + 1 + key.len() + 2;
                    format!(
                        "{}{key}: {}",
                        "\t".repeat(depth + 1),
                        write_value(v, depth + 1, prefix, max_length)
                    )
                })
                .collect();
            format!("{{\n{}\n{}}}", lines.join(",\n"), "\t".repeat(depth))
        }
        Value::Array(items) if !items.is_empty() => {
            let inline: Vec<String> = items
                .iter()
                .map(|v| write_value(v, depth + 1, 0, usize::MAX))
                .collect();
            let single = format!("[{}]", inline.join(", "));
            if column + single.len() <= max_length && !single.contains('\n') {
                return single;
            }
            let lines: Vec<String> = items
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        "\t".repeat(depth + 1),
                        write_value(v, depth + 1, depth + 1, max_length)
                    )
                })
                .collect();
            format!("[\n{}\n{}]", lines.join(",\n"), "\t".repeat(depth))
        }
        Value::Object(_) => "{}".to_string(),
        Value::Array(_) => "[]".to_string(),
        Value::String(s) => write_string(s),
        other => other.to_string(),
    }
}

fn write_key(key: &str) -> String {
    let mut chars = key.chars();
    let identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if identifier {
        key.to_string()
    } else {
        write_string(key)
    }
}

fn write_string(value: &str) -> String {
    let quote = QUOTES
        .into_iter()
        .find(|q| !value.contains(*q))
        .unwrap_or('\'');
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_relaxed_notation() {
        let value = parse(
            "{\n\tone: '$st', // first\n\ttwo: \"$nd\",\n\t/* block */ few: `$rd`, other: '$th',\n}",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({ "one": "$st", "two": "$nd", "few": "$rd", "other": "$th" })
        );
    }

    #[test]
    fn test_parse_scalars_and_arrays() {
        assert_eq!(
            parse("[1, -2.5, true, null, 'x']").unwrap(),
            json!([1, -2.5, true, null, "x"])
        );
        assert!(parse("{a: }").is_err());
        assert!(parse("{a: 1} trailing").is_err());
    }

    #[test]
    fn test_parse_prefix_reports_consumed_length() {
        let (value, used) = parse_prefix("{a: 1}:zone").unwrap();
        assert_eq!(value, json!({ "a": 1 }));
        assert_eq!(used, 6);
    }

    #[test]
    fn test_stringify_picks_a_free_quote() {
        assert_eq!(stringify(&json!("it's"), 80), "\"it's\"");
        assert_eq!(stringify(&json!({ "a b": 1, "c": "d" }), 80), "{'a b': 1, c: 'd'}");
    }

    #[test]
    fn test_stringify_breaks_long_objects() {
        let value = json!({ "note": "a rather long note that will not fit on a single line", "tag": "x" });
        let written = stringify(&value, 40);
        assert!(written.starts_with("{\n\tnote: "));
        assert_eq!(parse(&written).unwrap(), value);
    }

    #[test]
    fn test_strings_with_every_quote_round_trip() {
        let value = json!({ "text": "'\"`\\\nend" });
        assert_eq!(parse(&stringify(&value, 80)).unwrap(), value);
    }
}
