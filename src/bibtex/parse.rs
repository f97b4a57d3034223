//! BibTeX scanning implementation.
//!
//! This module walks the raw text item by item and keeps track of the source slices so
//! every entry can carry the exact text it was read from.

use crate::bibtex::ParseWarning;
use crate::bibtex::structure::{RawBibtexEntry, RawItem};
use crate::utils::line_number_at;

/// Result of scanning a whole file.
#[derive(Debug, Default)]
pub(crate) struct ScannedText {
    pub(crate) items: Vec<RawItem>,
    /// Text found before `@String` and `@Preamble` items
    pub(crate) prolog: String,
    /// Text after the last item
    pub(crate) epilog: String,
    pub(crate) warnings: Vec<ParseWarning>,
}

/// Scans BibTeX text into raw items.
///
/// Malformed items are skipped with a warning; their text stays part of the prefix of
/// the next entry. An `@` not followed by an item type and an opening delimiter is
/// plain text.
pub(crate) fn bibtex_parse(text: &str) -> ScannedText {
    let mut scanned = ScannedText::default();
    let mut scanner = Scanner::new(text);
    // Start of the text not yet attached to any item
    let mut item_start = 0;

    while let Some(offset) = text[scanner.pos..].find('@') {
        let at = scanner.pos + offset;
        scanner.pos = at + 1;

        match scanner.item(at) {
            Ok(None) => {
                scanner.pos = at + 1;
            }
            Ok(Some(RawItem::Comment)) => {
                // Comment text stays with the next entry so it survives a rewrite.
                scanner.skip_line_break();
            }
            Ok(Some(RawItem::Entry(mut entry))) => {
                scanner.skip_line_break();
                entry.serialization = text[item_start..scanner.pos].to_string();
                entry.header_offset = at - item_start;
                item_start = scanner.pos;
                scanned.items.push(RawItem::Entry(entry));
            }
            Ok(Some(item)) => {
                scanner.skip_line_break();
                scanned.prolog.push_str(&text[item_start..at]);
                item_start = scanner.pos;
                scanned.items.push(item);
            }
            Err(message) => {
                let line = line_number_at(text, at);
                tracing::warn!(line, %message, "skipping malformed item");
                scanned.warnings.push(ParseWarning::new(line, message));
                scanner.pos = at + 1;
            }
        }
    }

    scanned.epilog = text[item_start..].to_string();
    scanned
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '=' | ',' | '{' | '}' | '(' | ')' | '"' | '#' | '%' | '@' | '\'')
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected '{expected}' but found '{c}'")),
            None => Err(format!("expected '{expected}' but reached end of input")),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_line_break(&mut self) {
        let rest = &self.text[self.pos..];
        if rest.starts_with("\r\n") {
            self.pos += 2;
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        &self.text[start..self.pos]
    }

    /// Parses the item following the `@` at `at`; `pos` is just past the `@`.
    ///
    /// Returns `None` when the `@` does not open an item.
    fn item(&mut self, at: usize) -> Result<Option<RawItem>, String> {
        let item_type = self.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ':'));
        if item_type.is_empty() {
            return Ok(None);
        }
        self.skip_whitespace();
        let close = match self.peek() {
            Some('{') => '}',
            Some('(') => ')',
            _ => return Ok(None),
        };
        self.bump();

        let item = match item_type.to_lowercase().as_str() {
            "comment" => {
                self.skip_group(close)?;
                RawItem::Comment
            }
            "preamble" => {
                let value = self.value()?;
                self.skip_whitespace();
                self.expect(close)?;
                RawItem::Preamble(value)
            }
            "string" => {
                self.skip_whitespace();
                let name = self.take_while(is_name_char).to_string();
                if name.is_empty() {
                    return Err("missing string name".to_string());
                }
                self.skip_whitespace();
                self.expect('=')?;
                let value = self.value()?;
                self.skip_whitespace();
                self.expect(close)?;
                RawItem::String { name, value }
            }
            _ => self.entry(item_type, close, at)?,
        };
        Ok(Some(item))
    }

    fn entry(&mut self, entry_type: &str, close: char, at: usize) -> Result<RawItem, String> {
        let mut entry = RawBibtexEntry {
            entry_type: entry_type.to_string(),
            line: line_number_at(self.text, at),
            ..RawBibtexEntry::default()
        };

        let key = self.take_while(|c| c != ',' && c != close && c != '=' && c != '{');
        match self.peek() {
            Some(',') => {
                self.bump();
            }
            Some(c) if c == close => {}
            Some(_) => return Err("missing citation key".to_string()),
            None => return Err("unterminated entry".to_string()),
        }
        entry.key = key.trim().to_string();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(c) if c == close => {
                    self.bump();
                    return Ok(RawItem::Entry(entry));
                }
                Some(_) => {}
                None => return Err("unterminated entry".to_string()),
            }

            let name = self.take_while(is_name_char);
            if name.is_empty() {
                let found = self.peek().unwrap_or(' ');
                return Err(format!("expected a field name but found '{found}'"));
            }
            self.skip_whitespace();
            self.expect('=')?;
            let value = self.value()?;
            entry.fields.push((name.to_string(), value));

            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some(c) if c == close => return Ok(RawItem::Entry(entry)),
                Some(c) => return Err(format!("expected ',' after field '{name}' but found '{c}'")),
                None => return Err("unterminated entry".to_string()),
            }
        }
    }

    /// Parses a value made of parts joined by `#`.
    ///
    /// Braced and quoted parts are stored without their delimiters, numbers as-is and
    /// string references as `#name#`.
    fn value(&mut self) -> Result<String, String> {
        let mut value = String::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    value.push_str(self.braced('}')?);
                }
                Some('"') => {
                    self.bump();
                    value.push_str(self.braced('"')?);
                }
                Some(c) if c.is_ascii_digit() => {
                    value.push_str(self.take_while(|c| c.is_ascii_digit()));
                }
                Some(c) if is_name_char(c) => {
                    let name = self.take_while(is_name_char);
                    value.push('#');
                    value.push_str(name);
                    value.push('#');
                }
                Some(c) => return Err(format!("expected a field value but found '{c}'")),
                None => return Err("unexpected end of input in field value".to_string()),
            }

            self.skip_whitespace();
            if self.peek() == Some('#') {
                self.bump();
            } else {
                return Ok(value);
            }
        }
    }

    /// Reads up to the `terminator` at brace depth zero and consumes it.
    fn braced(&mut self, terminator: char) -> Result<&'a str, String> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut escaped = false;
        while let Some(c) = self.peek() {
            if c == terminator && depth == 0 && !escaped {
                let content = &self.text[start..self.pos];
                self.bump();
                return Ok(content);
            }
            match c {
                '\\' if !escaped => {
                    escaped = true;
                    self.bump();
                    continue;
                }
                '{' if !escaped => depth += 1,
                '}' if !escaped => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| "unbalanced '}' in field value".to_string())?;
                }
                _ => {}
            }
            escaped = false;
            self.bump();
        }
        Err("unterminated field value".to_string())
    }

    /// Skips the body of an `@comment` up to its closing delimiter.
    fn skip_group(&mut self, close: char) -> Result<(), String> {
        if close == '}' {
            self.braced('}').map(|_| ())
        } else {
            let rest = &self.text[self.pos..];
            let end = rest
                .find(')')
                .ok_or_else(|| "unterminated comment".to_string())?;
            self.pos += end + 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries(scanned: &ScannedText) -> Vec<&RawBibtexEntry> {
        scanned
            .items
            .iter()
            .filter_map(|item| match item {
                RawItem::Entry(entry) => Some(entry),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scan_entry() {
        let scanned = bibtex_parse("@Article{key,\n  Author = {Foo {Bar}},\n  year = 2001,\n}");
        let found = entries(&scanned);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entry_type, "Article");
        assert_eq!(found[0].key, "key");
        assert_eq!(
            found[0].fields,
            vec![
                ("Author".to_string(), "Foo {Bar}".to_string()),
                ("year".to_string(), "2001".to_string())
            ]
        );
        assert_eq!(scanned.epilog, "");
    }

    #[test]
    fn test_value_forms() {
        let scanned = bibtex_parse(
            "@misc(k, a = \"quoted {\"} text\", b = jan # \" 1st\", c = {x} # {y}, d = mar)",
        );
        let found = entries(&scanned);
        let values: Vec<&str> = found[0].fields.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["quoted {\"} text", "#jan# 1st", "xy", "#mar#"]);
    }

    #[test]
    fn test_serialization_slices() {
        let text = "% c\n@a{x,\n}\r\n\n@b{y,\n}\ntrailing";
        let scanned = bibtex_parse(text);
        let found = entries(&scanned);
        assert_eq!(found[0].serialization, "% c\n@a{x,\n}\r\n");
        assert_eq!(found[1].serialization, "\n@b{y,\n}\n");
        assert_eq!(scanned.epilog, "trailing");
    }

    #[test]
    fn test_strings_preamble_and_comments() {
        let text = "@String{acm = \"ACM\"}\n@preamble{\"\\foo\"}\n@comment{ignored {nested}}\n@misc{k, publisher = acm}";
        let scanned = bibtex_parse(text);
        assert_eq!(
            scanned.items[0],
            RawItem::String {
                name: "acm".to_string(),
                value: "ACM".to_string()
            }
        );
        assert_eq!(scanned.items[1], RawItem::Preamble("\\foo".to_string()));
        let found = entries(&scanned);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].serialization,
            "@comment{ignored {nested}}\n@misc{k, publisher = acm}"
        );
        assert_eq!(found[0].fields[0].1, "#acm#");
        assert_eq!(found[0].header_offset, 27);
        assert_eq!(scanned.prolog, "");
    }

    #[test]
    fn test_text_before_strings_is_kept() {
        let text = "% header\n@String{acm = {ACM}}\n% about the preamble\n@preamble{\"p\"}\n@Misc{k,\n  publisher = acm\n}\n";
        let scanned = bibtex_parse(text);
        assert_eq!(scanned.prolog, "% header\n% about the preamble\n");
        let found = entries(&scanned);
        assert_eq!(found[0].serialization, "@Misc{k,\n  publisher = acm\n}\n");
    }

    #[test]
    fn test_at_sign_in_comment_text() {
        let text = "% mail me@example.org for fixes\n@Misc{k,\n  title = {T}\n}";
        let scanned = bibtex_parse(text);
        assert!(scanned.warnings.is_empty());
        let found = entries(&scanned);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].serialization, text);
        assert_eq!(found[0].header_offset, 32);
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let text = "@article{bad,\n  title = {oops\n\n@book{good,\n  title = {Fine}\n}";
        let scanned = bibtex_parse(text);
        let found = entries(&scanned);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "good");
        assert_eq!(found[0].line, 4);
        assert_eq!(scanned.warnings.len(), 1);
        assert_eq!(scanned.warnings[0].line, 1);
    }

    #[test]
    fn test_entry_without_fields() {
        let scanned = bibtex_parse("@misc{lonely}");
        let found = entries(&scanned);
        assert_eq!(found[0].key, "lonely");
        assert!(found[0].fields.is_empty());
    }

    #[test]
    fn test_text_without_items() {
        let scanned = bibtex_parse("just some text\n");
        assert!(scanned.items.is_empty());
        assert_eq!(scanned.epilog, "just some text\n");
    }
}
