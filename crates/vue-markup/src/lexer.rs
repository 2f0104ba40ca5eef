//! Character cursor over markup source.

use source_span::Span;

/// A byte cursor over markup text. Positions are byte offsets and always sit
/// on a char boundary.
pub struct MarkupLexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> MarkupLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The text after the cursor.
    pub fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn skip_whitespace(&mut self) {
        self.consume_while(char::is_whitespace);
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    /// Step over `s` if the cursor is at it.
    pub fn consume(&mut self, s: &str) -> bool {
        let found = self.starts_with(s);
        if found {
            self.pos += s.len();
        }
        found
    }

    /// Advance while `pred` holds and return the text passed over.
    pub fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.remaining();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Advance to the next occurrence of `s`, or to the end of input.
    pub fn consume_until(&mut self, s: &str) -> &'a str {
        let rest = self.remaining();
        let len = rest.find(s).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Read a tag name.
    pub fn read_tag_name(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek_char() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.next_char();
            }
            _ => return None,
        }
        self.consume_while(|c| {
            c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.'
        });
        Some(&self.source[start..self.pos])
    }

    /// Read an attribute name, including Vue's `:`, `@`, `#` and `v-` forms.
    pub fn read_attr_name(&mut self) -> Option<&'a str> {
        let name = self.consume_while(|c| {
            !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'' | '<')
        });
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Read a quoted attribute value. Markup has no escapes inside quotes.
    pub fn read_quoted_string(&mut self) -> Option<(&'a str, char)> {
        let quote = self.peek_char()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        self.next_char();

        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == quote {
                let value = &self.source[start..self.pos];
                self.next_char();
                return Some((value, quote));
            }
            self.next_char();
        }
        None
    }

    /// Read an unquoted attribute value.
    pub fn read_unquoted_value(&mut self) -> &'a str {
        self.consume_while(|c| !c.is_whitespace() && c != '>')
    }

    /// Read raw element content up to `</closing_tag`, matched without
    /// regard to case and followed by `>`, whitespace or the end of input.
    pub fn read_raw_content(&mut self, closing_tag: &str) -> &'a str {
        let rest = self.remaining();
        let pattern = format!("</{}", closing_tag.to_ascii_lowercase());
        let lowered = rest.to_ascii_lowercase();
        let mut from = 0;
        let len = loop {
            let Some(found) = lowered[from..].find(&pattern).map(|i| i + from) else {
                break rest.len();
            };
            let after = lowered[found + pattern.len()..].chars().next();
            if after.map_or(true, |c| c == '>' || c.is_ascii_whitespace()) {
                break found;
            }
            from = found + pattern.len();
        };
        self.pos += len;
        &rest[..len]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// The span from `start` to the cursor.
    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }
}
