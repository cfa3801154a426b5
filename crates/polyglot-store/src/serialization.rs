//! Line-oriented text format for dictionaries.
//!
//! ```text
//! #{version: 2}
//! fld.name{note: 'the name of the person'}:
//! 	en:Name
//! 	fr{obvious: true}:Nom
//! 	hu{reviewed: false}
//! test.multiline:zone
//! 	:Line 1
//! 		Line 2
//! ```
//!
//! An optional first line `#{...}` holds dictionary metadata. Each key line
//! is `key{infos}:zone`, with `:` in keys written `::`. Each following line
//! starting with one tab is `locale{infos}:text`; the text is optional and
//! continues on lines starting with two tabs. Metadata uses the relaxed
//! object-literal notation and may span several lines.

use crate::error::{StoreError, StoreResult};
use crate::memory::{MemDictionary, MemEntry};
use polyglot_common::literal::{self, DEFAULT_MAX_LENGTH};
use polyglot_common::{Infos, Translation};
use serde_json::Value;

/// Receives the parts of a serialized dictionary in file order: for each key,
/// `on_key`, then `on_text` for each locale line, then `end_key`.
pub trait DictionaryVisitor {
    /// Dictionary-level metadata, reported before any key.
    fn on_infos(&mut self, _infos: Infos) -> StoreResult<()> {
        Ok(())
    }

    /// A key line.
    fn on_key(&mut self, key: &str, zone: &str, infos: Option<Infos>) -> StoreResult<()>;

    /// A locale line. `text` is `None` for metadata-only lines.
    fn on_text(
        &mut self,
        key: &str,
        locale: &str,
        text: Option<Translation>,
        infos: Option<Infos>,
    ) -> StoreResult<()>;

    /// All locale lines of `key` have been reported.
    fn end_key(&mut self, _key: &str) -> StoreResult<()> {
        Ok(())
    }
}

struct Cursor<'a> {
    data: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.data[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn unparsable(&self) -> StoreError {
        let line = self.data[..self.pos].matches('\n').count() + 1;
        let excerpt: String = self
            .rest()
            .chars()
            .take_while(|&c| c != '\n')
            .take(100)
            .collect();
        StoreError::Unparsable { line, excerpt }
    }

    fn until_eol(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest.find('\n').unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn end_of_line(&mut self) -> StoreResult<()> {
        match self.peek() {
            None => Ok(()),
            Some('\n') => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.unparsable()),
        }
    }

    fn infos(&mut self) -> StoreResult<Infos> {
        let (value, used) = literal::parse_prefix(self.rest()).map_err(|_| self.unparsable())?;
        match value {
            Value::Object(infos) => {
                self.pos += used;
                Ok(infos)
            }
            _ => Err(self.unparsable()),
        }
    }

    fn optional_infos(&mut self) -> StoreResult<Option<Infos>> {
        if self.peek() == Some('{') {
            self.infos().map(Some)
        } else {
            Ok(None)
        }
    }

    fn key(&mut self) -> StoreResult<String> {
        let mut key = String::new();
        loop {
            match self.peek() {
                Some(':') if self.rest().starts_with("::") => {
                    key.push(':');
                    self.pos += 2;
                }
                Some(':' | '{') => return Ok(key.trim().to_string()),
                Some('\n' | '\t') | None => return Err(self.unparsable()),
                Some(c) => {
                    key.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn locale(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| matches!(c, ':' | '{' | '\n' | '\t'))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn text(&mut self) -> String {
        let mut text = self.until_eol().to_string();
        while self.rest().starts_with("\n\t\t") {
            self.pos += 3;
            text.push('\n');
            text.push_str(self.until_eol());
        }
        text
    }
}

/// Walks serialized dictionary content, reporting its parts to `visitor`.
pub fn analyze(data: &str, visitor: &mut impl DictionaryVisitor) -> StoreResult<()> {
    let data = data.strip_prefix('\u{feff}').unwrap_or(data);
    let mut cursor = Cursor { data, pos: 0 };
    if cursor.peek() == Some('#') {
        cursor.pos += 1;
        let infos = cursor.infos()?;
        cursor.end_of_line()?;
        visitor.on_infos(infos)?;
    }
    while !cursor.at_end() {
        if cursor.peek() == Some('\n') {
            cursor.pos += 1;
            continue;
        }
        let key = cursor.key()?;
        let key_infos = cursor.optional_infos()?;
        if cursor.peek() != Some(':') {
            return Err(cursor.unparsable());
        }
        cursor.pos += 1;
        let zone = cursor.until_eol();
        cursor.end_of_line()?;
        visitor.on_key(&key, zone, key_infos)?;

        while cursor.rest().starts_with('\t') && !cursor.rest().starts_with("\t\t") {
            cursor.pos += 1;
            let locale = cursor.locale();
            let text_infos = cursor.optional_infos()?;
            let text = if cursor.peek() == Some(':') {
                cursor.pos += 1;
                Some(cursor.text())
            } else {
                None
            };
            cursor.end_of_line()?;
            visitor.on_text(&key, locale, text, text_infos)?;
        }
        visitor.end_key(&key)?;
    }
    Ok(())
}

struct DictionaryBuilder {
    dictionary: MemDictionary,
}

impl DictionaryVisitor for DictionaryBuilder {
    fn on_infos(&mut self, infos: Infos) -> StoreResult<()> {
        self.dictionary.infos = Some(infos);
        Ok(())
    }

    fn on_key(&mut self, key: &str, zone: &str, infos: Option<Infos>) -> StoreResult<()> {
        self.dictionary.entries.insert(
            key.to_string(),
            MemEntry {
                zone: zone.to_string(),
                key_infos: infos,
                ..MemEntry::default()
            },
        );
        Ok(())
    }

    fn on_text(
        &mut self,
        key: &str,
        locale: &str,
        text: Option<Translation>,
        infos: Option<Infos>,
    ) -> StoreResult<()> {
        let entry = self
            .dictionary
            .entries
            .get_mut(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;
        if let Some(text) = text {
            entry.texts.insert(locale.to_string(), text);
        }
        if let Some(infos) = infos {
            entry.text_infos.insert(locale.to_string(), infos);
        }
        Ok(())
    }
}

/// Parses serialized content into a dictionary.
pub fn deserialize(data: &str) -> StoreResult<MemDictionary> {
    let mut builder = DictionaryBuilder {
        dictionary: MemDictionary::default(),
    };
    analyze(data, &mut builder)?;
    Ok(builder.dictionary)
}

fn write_infos(infos: &Infos, indent: usize) -> String {
    let written = literal::stringify(&Value::Object(infos.clone()), DEFAULT_MAX_LENGTH);
    if indent == 0 {
        written
    } else {
        written.replace('\n', &format!("\n{}", "\t".repeat(indent)))
    }
}

/// Writes a dictionary in the text format.
pub fn serialize(dictionary: &MemDictionary) -> String {
    let mut out = String::new();
    if let Some(infos) = &dictionary.infos {
        out.push('#');
        out.push_str(&literal::stringify(&Value::Object(infos.clone()), usize::MAX));
        out.push('\n');
    }
    for (key, entry) in &dictionary.entries {
        out.push_str(&key.replace(':', "::"));
        if let Some(infos) = &entry.key_infos {
            out.push_str(&write_infos(infos, 0));
        }
        out.push(':');
        out.push_str(&entry.zone);
        out.push('\n');
        for (locale, text) in &entry.texts {
            out.push('\t');
            out.push_str(locale);
            if let Some(infos) = entry.text_infos.get(locale) {
                out.push_str(&write_infos(infos, 1));
            }
            out.push(':');
            out.push_str(&text.replace('\n', "\n\t\t"));
            out.push('\n');
        }
        for (locale, infos) in &entry.text_infos {
            if !entry.texts.contains_key(locale) {
                out.push('\t');
                out.push_str(locale);
                out.push_str(&write_infos(infos, 1));
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FILE: &str = "fld.name{note: \"the name of the person\"}:\n\ten:Name\n\tfr{obvious: true}:Nom\ntest.multiline:\n\t:Line 1\n\t\tLine 2\n";

    #[test]
    fn test_deserialize_hand_written_file() {
        let dictionary = deserialize(FILE).unwrap();
        let name = &dictionary.entries["fld.name"];
        assert_eq!(name.texts["en"], "Name");
        assert_eq!(
            name.key_infos.as_ref().unwrap()["note"],
            json!("the name of the person")
        );
        assert_eq!(name.text_infos["fr"]["obvious"], json!(true));
        assert_eq!(dictionary.entries["test.multiline"].texts[""], "Line 1\nLine 2");
    }

    #[test]
    fn test_serialize_canonical_form() {
        let mut dictionary = deserialize(FILE).unwrap();
        dictionary
            .entries
            .get_mut("fld.name")
            .unwrap()
            .texts
            .insert("hu".into(), "Név".into());
        assert_eq!(
            serialize(&dictionary),
            "fld.name{note: 'the name of the person'}:\n\ten:Name\n\tfr{obvious: true}:Nom\n\thu:Név\ntest.multiline:\n\t:Line 1\n\t\tLine 2\n"
        );
    }

    #[test]
    fn test_header_and_info_only_lines() {
        let data = "\u{feff}#{version: 2}\nfld.name:sls\n\ten:Name\n\thu{a: 3}\n";
        let dictionary = deserialize(data).unwrap();
        assert_eq!(dictionary.infos.as_ref().unwrap()["version"], json!(2));
        let entry = &dictionary.entries["fld.name"];
        assert_eq!(entry.zone, "sls");
        assert!(!entry.texts.contains_key("hu"));
        assert_eq!(entry.text_infos["hu"]["a"], json!(3));
        assert_eq!(deserialize(&serialize(&dictionary)).unwrap(), dictionary);
    }

    #[test]
    fn test_multi_line_metadata() {
        let data = "fld.name{\n\tnote: 'the name of the person'\n}:\n\tfr{\n\t\tobvious: true\n\t}:Nom\n";
        let dictionary = deserialize(data).unwrap();
        assert_eq!(dictionary.entries["fld.name"].texts["fr"], "Nom");
        assert_eq!(
            dictionary.entries["fld.name"].text_infos["fr"]["obvious"],
            json!(true)
        );
    }

    #[test]
    fn test_unparsable_reports_line() {
        let error = deserialize("fld.name:\n\ten:Name\n\tfr{obvious: }:Nom\n").unwrap_err();
        match error {
            StoreError::Unparsable { line, excerpt } => {
                assert_eq!(line, 3);
                assert_eq!(excerpt, "{obvious: }:Nom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(deserialize("no zone separator\n").is_err());
        assert!(deserialize("\ten:orphan text\n").is_err());
    }

    #[test]
    fn test_analyze_callback_order() {
        #[derive(Default)]
        struct Recorder(Vec<String>);
        impl DictionaryVisitor for Recorder {
            fn on_key(&mut self, key: &str, zone: &str, _: Option<Infos>) -> StoreResult<()> {
                self.0.push(format!("key {key}:{zone}"));
                Ok(())
            }
            fn on_text(
                &mut self,
                _: &str,
                locale: &str,
                text: Option<Translation>,
                _: Option<Infos>,
            ) -> StoreResult<()> {
                self.0.push(format!("text {locale}={}", text.unwrap_or_default()));
                Ok(())
            }
            fn end_key(&mut self, key: &str) -> StoreResult<()> {
                self.0.push(format!("end {key}"));
                Ok(())
            }
        }
        let mut recorder = Recorder::default();
        analyze(FILE, &mut recorder).unwrap();
        assert_eq!(
            recorder.0,
            vec![
                "key fld.name:",
                "text en=Name",
                "text fr=Nom",
                "end fld.name",
                "key test.multiline:",
                "text =Line 1\nLine 2",
                "end test.multiline",
            ]
        );
    }
}
