// src/parser.rs
//! Tokenizer for plain lookup paths such as `a.b.0.#` or `labels.app\.kubernetes\.io/name`.

/// One dot-separated step of a plain lookup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Object key, or array index when it is all digits.
    Key(String),
    /// `#`: element count of an array or key count of an object.
    Length,
}

impl Token {
    /// Array index, if this key is a plain decimal number.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Token::Key(k) if !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()) => {
                k.parse().ok()
            }
            _ => None,
        }
    }
}

pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Splits the whole input into tokens. An empty input has no tokens and
    /// therefore addresses the current value itself.
    pub fn tokens(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        if self.eof() {
            return out;
        }
        loop {
            let raw_hash = self.peek_str("#") && self.segment_len() == 1;
            let key = self.parse_segment();
            out.push(if raw_hash { Token::Length } else { Token::Key(key) });
            if !self.consume_char('.') {
                break;
            }
        }
        out
    }

    /// Reads one key up to the next unescaped `.`.
    fn parse_segment(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            if c == '.' {
                break;
            }
            self.i += c.len_utf8();
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    out.push(nc);
                    continue;
                }
            }
            out.push(c);
        }
        out
    }

    // Byte length of the raw segment at the cursor, escapes included.
    fn segment_len(&self) -> usize {
        self.s[self.i..].find('.').unwrap_or(self.s.len() - self.i)
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

/// Convenience wrapper over [`Parser::tokens`].
pub fn tokenize(path: &str) -> Vec<Token> {
    Parser::new(path).tokens()
}
