//! Hand-written recursive-descent JSON parser producing [`Value`] trees.
//!
//! A single-pass scanner keeps one token of lookahead and classifies the
//! input byte by byte; the parser proper is a pair of mutually recursive
//! object/array readers over it. Bare (unquoted) literal tokens are accepted
//! in value position in addition to quoted strings, `null`, objects and
//! arrays. Malformed input aborts the whole parse with the byte offset of
//! the offending token — there is no recovery.

use crate::error::{Error, Result};
use crate::value::{Value, ValueMap};

/// Token classes produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Comma,
    Colon,
    Null,
    Str,
    Other,
    Eof,
    Invalid,
}

struct Lexer<'a> {
    src: &'a str,
    /// Cursor, one past the current token.
    pos: usize,
    /// Class of the current lookahead token.
    tc: TokenClass,
    /// Byte offset where the current token starts; carried on errors.
    token_pos: usize,
    /// Unescaped text of the current `Str`/`Other`/`Null` token.
    token: String,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Result<Self> {
        let mut lexer = Lexer {
            src,
            pos: 0,
            tc: TokenClass::Eof,
            token_pos: 0,
            token: String::new(),
        };
        lexer.next_token()?;
        Ok(lexer)
    }

    fn can_begin_value(&self) -> bool {
        matches!(
            self.tc,
            TokenClass::BeginObject
                | TokenClass::BeginArray
                | TokenClass::Null
                | TokenClass::Str
                | TokenClass::Other
        )
    }

    fn require(&self, tc: TokenClass, expected: &str) -> Result<()> {
        if self.tc == tc {
            Ok(())
        } else {
            Err(self.fail(expected))
        }
    }

    fn fail(&self, expected: &str) -> Error {
        Error::Parse {
            offset: self.token_pos,
            expected: expected.to_string(),
        }
    }

    /// Text of the current string/literal token; advances past it.
    fn take_string(&mut self) -> Result<String> {
        let text = std::mem::take(&mut self.token);
        self.next_token()?;
        Ok(text)
    }

    /// Skip whitespace and classify the next token.
    fn next_token(&mut self) -> Result<()> {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b'\t' | b'\n' | b'\r') {
            self.pos += 1;
        }
        self.token_pos = self.pos;
        self.token.clear();
        if self.pos >= bytes.len() {
            self.tc = TokenClass::Eof;
            return Ok(());
        }
        self.tc = match bytes[self.pos] {
            b'{' => {
                self.pos += 1;
                TokenClass::BeginObject
            }
            b'}' => {
                self.pos += 1;
                TokenClass::EndObject
            }
            b'[' => {
                self.pos += 1;
                TokenClass::BeginArray
            }
            b']' => {
                self.pos += 1;
                TokenClass::EndArray
            }
            b',' => {
                self.pos += 1;
                TokenClass::Comma
            }
            b':' => {
                self.pos += 1;
                TokenClass::Colon
            }
            b'"' => {
                self.scan_quoted()?;
                TokenClass::Str
            }
            c if c < 0x20 => TokenClass::Invalid,
            _ => {
                self.scan_literal();
                if self.token == "null" {
                    TokenClass::Null
                } else {
                    TokenClass::Other
                }
            }
        };
        Ok(())
    }

    /// Consume a quoted string, unescaping into `token`. Delimiters inside
    /// the quotes are not structural.
    fn scan_quoted(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;
        let bytes = self.src.as_bytes();
        loop {
            if self.pos >= bytes.len() {
                return Err(Error::Parse {
                    offset: start,
                    expected: "closing '\"'".to_string(),
                });
            }
            match bytes[self.pos] {
                b'"' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'\\' => {
                    self.pos += 1;
                    self.scan_escape()?;
                }
                _ => {
                    // Copy a maximal run of plain characters in one slice.
                    let run = self.pos;
                    while self.pos < bytes.len()
                        && bytes[self.pos] != b'"'
                        && bytes[self.pos] != b'\\'
                    {
                        self.pos += 1;
                    }
                    self.token.push_str(&self.src[run..self.pos]);
                }
            }
        }
    }

    /// Cursor sits just past a backslash.
    fn scan_escape(&mut self) -> Result<()> {
        let offset = self.pos - 1;
        let bytes = self.src.as_bytes();
        let Some(&code) = bytes.get(self.pos) else {
            return Err(Error::Parse {
                offset,
                expected: "escape character".to_string(),
            });
        };
        self.pos += 1;
        match code {
            b'"' => self.token.push('"'),
            b'\\' => self.token.push('\\'),
            b'/' => self.token.push('/'),
            b'b' => self.token.push('\u{0008}'),
            b'f' => self.token.push('\u{000C}'),
            b'n' => self.token.push('\n'),
            b'r' => self.token.push('\r'),
            b't' => self.token.push('\t'),
            b'u' => {
                let unit = self.scan_hex4(offset)?;
                let scalar = if (0xD800..0xDC00).contains(&unit) {
                    // Surrogate pairs arrive as two consecutive \u escapes.
                    if bytes.get(self.pos) == Some(&b'\\') && bytes.get(self.pos + 1) == Some(&b'u')
                    {
                        self.pos += 2;
                        let low = self.scan_hex4(offset)?;
                        if !(0xDC00..0xE000).contains(&low) {
                            return Err(Error::Parse {
                                offset,
                                expected: "low surrogate".to_string(),
                            });
                        }
                        0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                    } else {
                        return Err(Error::Parse {
                            offset,
                            expected: "low surrogate".to_string(),
                        });
                    }
                } else if (0xDC00..0xE000).contains(&unit) {
                    return Err(Error::Parse {
                        offset,
                        expected: "high surrogate".to_string(),
                    });
                } else {
                    unit
                };
                let c = char::from_u32(scalar).ok_or_else(|| Error::Parse {
                    offset,
                    expected: "unicode scalar value".to_string(),
                })?;
                self.token.push(c);
            }
            _ => {
                return Err(Error::Parse {
                    offset,
                    expected: "valid escape character".to_string(),
                })
            }
        }
        Ok(())
    }

    fn scan_hex4(&mut self, offset: usize) -> Result<u32> {
        let end = self.pos + 4;
        let digits = self.src.get(self.pos..end).ok_or_else(|| Error::Parse {
            offset,
            expected: "four hex digits".to_string(),
        })?;
        let unit = u32::from_str_radix(digits, 16).map_err(|_| Error::Parse {
            offset,
            expected: "four hex digits".to_string(),
        })?;
        self.pos = end;
        Ok(unit)
    }

    /// Consume an unquoted run up to the next structural delimiter or
    /// whitespace.
    fn scan_literal(&mut self) {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len()
            && !matches!(
                bytes[self.pos],
                b' ' | b'\t' | b'\n' | b'\r' | b',' | b':' | b'{' | b'}' | b'[' | b']' | b'"'
            )
        {
            self.pos += 1;
        }
        self.token.push_str(&self.src[start..self.pos]);
    }
}

/// Recursive-descent parser assembling a [`Value`] tree.
pub struct TreeParser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> TreeParser<'a> {
    pub fn new(input: &'a str) -> Result<Self> {
        Ok(TreeParser {
            lexer: Lexer::new(input)?,
        })
    }

    fn read_object(&mut self) -> Result<Value> {
        self.lexer.require(TokenClass::BeginObject, "start of object")?;
        self.lexer.next_token()?;
        let mut map = ValueMap::new();
        loop {
            if self.lexer.tc == TokenClass::Comma {
                self.lexer.next_token()?;
            }
            if !self.lexer.can_begin_value() {
                break;
            }
            let key = self.lexer.take_string()?;
            self.lexer.require(TokenClass::Colon, "':'")?;
            self.lexer.next_token()?;
            let value = self.read()?;
            map.insert(key, value);
        }
        self.lexer.require(TokenClass::EndObject, "end of object")?;
        self.lexer.next_token()?;
        Ok(Value::Object(map))
    }

    fn read_array(&mut self) -> Result<Value> {
        self.lexer.require(TokenClass::BeginArray, "start of array")?;
        self.lexer.next_token()?;
        let mut items = Vec::new();
        loop {
            if self.lexer.tc == TokenClass::Comma {
                self.lexer.next_token()?;
            }
            if !self.lexer.can_begin_value() {
                break;
            }
            items.push(self.read()?);
        }
        self.lexer.require(TokenClass::EndArray, "end of array")?;
        self.lexer.next_token()?;
        Ok(Value::Array(items))
    }

    /// Read one value, dispatching on the current token class.
    pub fn read(&mut self) -> Result<Value> {
        match self.lexer.tc {
            TokenClass::Null => {
                self.lexer.next_token()?;
                Ok(Value::Null)
            }
            TokenClass::Str => Ok(Value::string(self.lexer.take_string()?)),
            TokenClass::Other => Ok(Value::literal(self.lexer.take_string()?)),
            TokenClass::BeginObject => self.read_object(),
            TokenClass::BeginArray => self.read_array(),
            _ => Err(self.lexer.fail("start of a value")),
        }
    }

    /// Read one value and require the input to be fully consumed.
    pub fn read_fully(mut self) -> Result<Value> {
        let value = self.read()?;
        self.lexer.require(TokenClass::Eof, "end of input")?;
        Ok(value)
    }
}

/// Parse a complete document into a [`Value`] tree.
///
/// Trailing non-whitespace content after the root value is a parse error.
pub fn parse(input: &str) -> Result<Value> {
    tracing::trace!(len = input.len(), "parsing document");
    TreeParser::new(input)?.read_fully()
}
