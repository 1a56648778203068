//! KeyValues text parsing.
//!
//! This module turns KeyValues text into a [`KeyValues`] forest.
//!
//! ## Overview
//!
//! The parser is a single pass over a character stream with a small lookahead:
//!
//! - **Stack machine**: open keys are kept on a stack; `}` closes the top one
//! - **Bare and quoted tokens**: `key value` and `"key" "value"` are equivalent
//! - **Escapes**: `\n`, `\r`, `\t` and `\"` inside quotes; any other escaped
//!   character stands for itself
//! - **Comments**: `//` and `/* */` between tokens (see [`ParseOptions`])
//! - **Byte accounting**: the number of bytes consumed is returned, and every
//!   error carries line, column and byte offset
//!
//! Parsing stops at the first error. There is no recovery.
//!
//! ## Usage
//!
//! ```rust
//! use keyvalues::{parse, KeyValues};
//!
//! let root = parse(r#"LightmappedGeneric{$basetexture"nature/dirtfloor001a""$surfaceprop"dirt}"#).unwrap();
//! let material = root.sub_key("lightmappedgeneric").unwrap();
//! assert_eq!(material.sub_key("$surfaceprop").unwrap().as_str(""), "dirt");
//!
//! // Or fill an existing node from any reader
//! let mut root = KeyValues::new();
//! let consumed = root.read_from("Key { subkey value }".as_bytes()).unwrap();
//! assert_eq!(consumed, 20);
//! ```

use crate::{Error, KeyValues, ParseOptions, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::str::FromStr;
use tracing::{debug, trace};

/// UTF-8 character source with lookahead and position tracking.
///
/// Only characters that have been consumed with `bump` count towards `offset`;
/// peeked characters are decoded but still "in the stream".
struct Source<R> {
    inner: R,
    lookahead: VecDeque<char>,
    offset: usize,
    line: usize,
    col: usize,
}

impl<R: BufRead> Source<R> {
    fn new(inner: R) -> Self {
        Source {
            inner,
            lookahead: VecDeque::new(),
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    fn read_byte(&mut self, at: usize) -> Result<Option<u8>> {
        loop {
            let byte = match self.inner.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io(at, e)),
            };
            if byte.is_some() {
                self.inner.consume(1);
            }
            return Ok(byte);
        }
    }

    fn decode(&mut self) -> Result<Option<char>> {
        let at = self.offset + self.lookahead.iter().map(|c| c.len_utf8()).sum::<usize>();

        let first = match self.read_byte(at)? {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let width = match first {
            0x00..=0x7F => return Ok(Some(char::from(first))),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(Error::InvalidUtf8 { offset: at }),
        };

        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self
                .read_byte(at)?
                .ok_or(Error::InvalidUtf8 { offset: at })?;
        }

        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or(Error::InvalidUtf8 { offset: at })
    }

    fn peek_nth(&mut self, n: usize) -> Result<Option<char>> {
        while self.lookahead.len() <= n {
            match self.decode()? {
                Some(ch) => self.lookahead.push_back(ch),
                None => return Ok(None),
            }
        }
        Ok(self.lookahead.get(n).copied())
    }

    fn peek(&mut self) -> Result<Option<char>> {
        self.peek_nth(0)
    }

    fn bump(&mut self) -> Result<Option<char>> {
        let ch = match self.lookahead.pop_front() {
            Some(ch) => Some(ch),
            None => self.decode()?,
        };
        if let Some(ch) = ch {
            self.offset += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        Ok(ch)
    }
}

/// The KeyValues parser.
///
/// Reads from any [`BufRead`]. Most callers want [`parse`] or
/// [`KeyValues::read_from`] instead.
///
/// # Examples
///
/// ```rust
/// use keyvalues::{KeyValues, Parser};
///
/// let mut root = KeyValues::new();
/// let mut parser = Parser::new("a 1\nb 2\n".as_bytes());
/// assert_eq!(parser.parse_into(&mut root).unwrap(), 8);
/// assert_eq!(root.len(), 2);
/// ```
pub struct Parser<R> {
    source: Source<R>,
    options: ParseOptions,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ParseOptions::default())
    }

    pub fn with_options(reader: R, options: ParseOptions) -> Self {
        Parser {
            source: Source::new(reader),
            options,
        }
    }

    /// Parses the whole stream, appending the top-level keys to `root`.
    ///
    /// Returns the number of bytes consumed. On error, keys read before the failure
    /// remain attached to `root`.
    ///
    /// # Panics
    ///
    /// Panics if `root` holds a scalar value.
    pub fn parse_into(&mut self, root: &mut KeyValues) -> Result<usize> {
        if root.is_leaf() {
            panic!(
                "cannot parse into key {:?}, which holds a value",
                root.name()
            );
        }

        let start = self.source.offset;
        let mut stack = vec![std::mem::take(root)];
        let result = self.run(&mut stack);

        while stack.len() > 1 {
            close_top(&mut stack);
        }
        if let Some(filled) = stack.pop() {
            *root = filled;
        }

        match result {
            Ok(()) => {
                let consumed = self.source.offset - start;
                debug!(bytes = consumed, keys = root.len(), "parsed keyvalues");
                Ok(consumed)
            }
            Err(err) => {
                debug!(error = %err, "keyvalues parse failed");
                Err(err)
            }
        }
    }

    fn run(&mut self, stack: &mut Vec<KeyValues>) -> Result<()> {
        loop {
            self.skip_trivia()?;

            match self.source.peek()? {
                None => {
                    return if stack.len() == 1 {
                        Ok(())
                    } else {
                        Err(self.eof(&format!("`}}` closing {} open key(s)", stack.len() - 1)))
                    };
                }
                Some('{') => return Err(self.syntax("expected a key, found `{`")),
                Some('}') => {
                    if stack.len() == 1 {
                        return Err(self.syntax("unbalanced `}`: no open key to close"));
                    }
                    self.source.bump()?;
                    close_top(stack);
                    continue;
                }
                Some(_) => {}
            }

            let key = self.read_token()?;
            trace!(key = %key, depth = stack.len() - 1, "key");
            stack.push(KeyValues::named(key));

            self.skip_trivia()?;
            match self.source.peek()? {
                None => return Err(self.eof("`{` or a value")),
                Some('{') => {
                    // Open blocks once this one opens; the root is not a block
                    if stack.len() - 1 > self.options.max_depth {
                        return Err(self.syntax(&format!(
                            "nesting too deep: more than {} open blocks",
                            self.options.max_depth
                        )));
                    }
                    self.source.bump()?;
                    if let Some(top) = stack.last_mut() {
                        top.make_container();
                    }
                }
                Some('}') => return Err(self.syntax("expected `{` or a value, found `}`")),
                Some(_) => {
                    let value = self.read_token()?;
                    if let Some(top) = stack.last_mut() {
                        top.set_string(value);
                    }
                    close_top(stack);
                }
            }
        }
    }

    /// Skips whitespace and, when enabled, comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.source.peek()? {
                Some(ch) if ch.is_whitespace() => {
                    self.source.bump()?;
                }
                Some('/') if self.options.comments => match self.source.peek_nth(1)? {
                    Some('/') => self.skip_line_comment()?,
                    Some('*') => self.skip_block_comment()?,
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) -> Result<()> {
        self.source.bump()?;
        self.source.bump()?;
        loop {
            match self.source.bump()? {
                None | Some('\n') => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        self.source.bump()?;
        self.source.bump()?;
        loop {
            match self.source.bump()? {
                None => return Err(self.eof("`*/` closing block comment")),
                Some('*') if self.source.peek()? == Some('/') => {
                    self.source.bump()?;
                    return Ok(());
                }
                Some(_) => {}
            }
        }
    }

    fn read_token(&mut self) -> Result<String> {
        match self.source.bump()? {
            Some('"') => self.read_quoted(),
            Some(first) => self.read_bare(first),
            None => Err(self.eof("a key or value")),
        }
    }

    fn read_quoted(&mut self) -> Result<String> {
        let mut token = String::new();
        loop {
            match self.source.bump()? {
                None => return Err(self.eof("`\"` closing quoted string")),
                Some('"') => return Ok(token),
                Some('\\') => match self.source.bump()? {
                    None => return Err(self.eof("escaped character")),
                    Some('n') => token.push('\n'),
                    Some('r') => token.push('\r'),
                    Some('t') => token.push('\t'),
                    Some(other) => token.push(other),
                },
                Some(ch) => token.push(ch),
            }
        }
    }

    fn read_bare(&mut self, first: char) -> Result<String> {
        let mut token = String::from(first);
        loop {
            match self.source.peek()? {
                None => return Err(self.eof("whitespace, `{`, `}` or `\"` after bare token")),
                Some(ch) if ch.is_whitespace() => {
                    self.source.bump()?;
                    return Ok(token);
                }
                Some('"' | '{' | '}') => return Ok(token),
                Some(ch) => {
                    token.push(ch);
                    self.source.bump()?;
                }
            }
        }
    }

    fn syntax(&self, msg: &str) -> Error {
        Error::syntax(self.source.line, self.source.col, self.source.offset, msg)
    }

    fn eof(&self, expected: &str) -> Error {
        Error::unexpected_eof(
            self.source.line,
            self.source.col,
            self.source.offset,
            expected,
        )
    }
}

/// Pops the finished key on top of the stack into its parent.
fn close_top(stack: &mut Vec<KeyValues>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(node) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.append(node);
        }
    }
}

/// Parses KeyValues text into a new, unnamed root node.
///
/// # Examples
///
/// ```rust
/// use keyvalues::parse;
///
/// let root = parse("Key { subkey value }\n").unwrap();
/// assert_eq!(root.to_text(), "\"Key\" {\n\t\"subkey\" \"value\"\n}\n");
/// ```
///
/// # Errors
///
/// Returns an error for unbalanced braces, misplaced `{`/`}`, or input that ends
/// inside a token, comment or open key.
pub fn parse(input: &str) -> Result<KeyValues> {
    parse_with_options(input, ParseOptions::default())
}

/// Parses KeyValues text with custom options.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_with_options(input: &str, options: ParseOptions) -> Result<KeyValues> {
    let mut root = KeyValues::new();
    Parser::with_options(input.as_bytes(), options).parse_into(&mut root)?;
    Ok(root)
}

impl KeyValues {
    /// Reads KeyValues text from `reader`, appending the top-level keys to `self`.
    ///
    /// Returns the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] with the byte offset if the reader fails, and a syntax
    /// or end-of-input error for malformed text.
    ///
    /// # Panics
    ///
    /// Panics if `self` holds a scalar value.
    pub fn read_from<R: io::Read>(&mut self, reader: R) -> Result<usize> {
        self.read_from_with_options(reader, ParseOptions::default())
    }

    /// Like [`read_from`](Self::read_from), with custom options.
    ///
    /// # Errors
    ///
    /// Same as [`read_from`](Self::read_from).
    pub fn read_from_with_options<R: io::Read>(
        &mut self,
        reader: R,
        options: ParseOptions,
    ) -> Result<usize> {
        Parser::with_options(io::BufReader::new(reader), options).parse_into(self)
    }
}

impl FromStr for KeyValues {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEFAULT_MAX_DEPTH;
    use crate::NodeExt;

    #[test]
    fn test_parse_material() {
        let root =
            parse(r#"LightmappedGeneric{$basetexture"nature/dirtfloor001a""$surfaceprop"dirt}"#)
                .unwrap();
        assert_eq!(
            root.to_text(),
            "\"LightmappedGeneric\" {\n\t\"$basetexture\" \"nature/dirtfloor001a\"\n\t\"$surfaceprop\" \"dirt\"\n}\n"
        );
    }

    #[test]
    fn test_parse_comments() {
        let input = "// Comment\n//* comment\nKey {\n//*/\n\tsubkey // comment\n\tvalue /*comment*/\n\t// comment\n}\n";
        let root = parse(input).unwrap();
        assert_eq!(root.to_text(), "\"Key\" {\n\t\"subkey\" \"value\"\n}\n");
    }

    #[test]
    fn test_comments_disabled() {
        let options = ParseOptions::new().with_comments(false);
        let root = parse_with_options("/* a */ b\n", options).unwrap();
        let names: Vec<&str> = root.children().map(|c| c.name()).collect();
        assert_eq!(names, vec!["/*", "*/"]);
        assert_eq!(root.sub_key("/*").as_str(""), "a");
        assert_eq!(root.sub_key("*/").as_str(""), "b");
    }

    #[test]
    fn test_comment_markers_inside_tokens_are_literal() {
        let root = parse("url \"http://example.com/*x*/\"\npath a//b\n").unwrap();
        assert_eq!(root.sub_key("url").as_str(""), "http://example.com/*x*/");
        assert_eq!(root.sub_key("path").as_str(""), "a//b");
    }

    #[test]
    fn test_single_slash_starts_bare_token() {
        let root = parse("/usr/bin value\n").unwrap();
        assert_eq!(root.sub_key("/usr/bin").as_str(""), "value");
    }

    #[test]
    fn test_quoted_escapes() {
        let root = parse(r#""k" "line\nnext\ttab\rcr \"q\" back\\slash \x""#).unwrap();
        assert_eq!(
            root.sub_key("k").as_str(""),
            "line\nnext\ttab\rcr \"q\" back\\slash x"
        );
    }

    #[test]
    fn test_bare_tokens_are_verbatim() {
        let root = parse("path C:\\maps\\test\n").unwrap();
        assert_eq!(root.sub_key("path").as_str(""), "C:\\maps\\test");
    }

    #[test]
    fn test_structural_chars_end_bare_tokens() {
        let root = parse("a\"b\"c{d\"e\"}").unwrap();
        assert_eq!(root.sub_key("a").as_str(""), "b");
        assert_eq!(root.sub_key("c").sub_key("d").as_str(""), "e");
    }

    #[test]
    fn test_empty_block_is_container() {
        let root = parse("Proxy {}\n").unwrap();
        let proxy = root.sub_key("Proxy").unwrap();
        assert!(proxy.is_container());
        assert_eq!(root.to_text(), "\"Proxy\" {\n}\n");
    }

    #[test]
    fn test_empty_input() {
        let root = parse("").unwrap();
        assert!(root.is_empty());
        let root = parse("  \n\t // nothing here\n").unwrap();
        assert!(root.is_empty());
    }

    #[test]
    fn test_duplicate_keys_keep_order() {
        let root = parse("a 1\nb 2\na 3\n").unwrap();
        let values: Vec<&str> = root.children().map(|c| c.as_str("")).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
        assert_eq!(root.sub_key("A").as_str(""), "1");
    }

    #[test]
    fn test_error_open_brace_without_key() {
        let err = parse("{ a b }").unwrap_err();
        match err {
            Error::Syntax { line, col, offset, ref msg } => {
                assert_eq!((line, col, offset), (1, 1, 0));
                assert!(msg.contains("expected a key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_unbalanced_close() {
        let err = parse("a b\n}").unwrap_err();
        match err {
            Error::Syntax { line, col, offset, ref msg } => {
                assert_eq!((line, col, offset), (2, 1, 4));
                assert!(msg.contains("unbalanced"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| "a{".repeat(depth) + &"}".repeat(depth);

        let root = parse(&nested(DEFAULT_MAX_DEPTH)).unwrap();
        assert_eq!(root.sub_key("a").sub_key("a").children().count(), 1);

        match parse(&nested(DEFAULT_MAX_DEPTH + 1)).unwrap_err() {
            Error::Syntax { line, col, offset, ref msg } => {
                assert_eq!((line, col, offset), (1, 258, 257));
                assert!(msg.contains("nesting too deep"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Far past the limit fails cleanly instead of building the tree
        assert!(parse(&nested(100_000)).is_err());

        let shallow = ParseOptions::new().with_max_depth(1);
        assert!(parse_with_options("a { b 1 }", shallow.clone()).is_ok());
        assert!(parse_with_options("a { b { c 1 } }", shallow).is_err());
    }

    #[test]
    fn test_error_close_after_key() {
        let err = parse("Key { sub }").unwrap_err();
        assert!(matches!(err, Error::Syntax { ref msg, .. } if msg.contains("expected `{` or a value")));
    }

    #[test]
    fn test_error_unclosed_block() {
        let err = parse("Key {\n\tsub value\n").unwrap_err();
        match err {
            Error::UnexpectedEof { ref expected, offset, .. } => {
                assert!(expected.contains("1 open key"));
                assert_eq!(offset, 17);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_key_without_value() {
        let err = parse("Key   ").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { ref expected, .. } if expected.contains("a value")));
    }

    #[test]
    fn test_error_unterminated_quote() {
        let err = parse("\"Key\" \"value").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { ref expected, .. } if expected.contains("quoted")));
    }

    #[test]
    fn test_error_bare_token_at_end_of_input() {
        let err = parse("Key value").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
        assert!(parse("Key value\n").is_ok());
        assert!(parse("Key \"value\"").is_ok());
    }

    #[test]
    fn test_error_unterminated_block_comment() {
        let err = parse("a b /* never closed").unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { ref expected, .. } if expected.contains("*/")));
    }

    #[test]
    fn test_error_invalid_utf8() {
        let mut root = KeyValues::new();
        let err = root.read_from(&b"a \xff\n"[..]).unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8 { offset: 2 }));
    }

    #[test]
    fn test_keys_before_error_are_kept() {
        let mut root = KeyValues::new();
        let result = root.read_from("first 1\nsecond { inner 2\n".as_bytes());
        assert!(result.is_err());
        assert_eq!(root.sub_key("first").as_str(""), "1");
        assert_eq!(root.sub_key("second").sub_key("inner").as_str(""), "2");
    }

    #[test]
    fn test_bytes_consumed_counts_bytes() {
        let mut root = KeyValues::new();
        // "é" is two bytes, "日本" six
        let input = "\"é\" \"日本\"\n";
        let consumed = root.read_from(input.as_bytes()).unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(root.sub_key("É").as_str(""), "日本");
    }

    #[test]
    fn test_read_from_appends_to_existing_root() {
        let mut root = KeyValues::new();
        root.new_sub_key("existing").set_int(1);
        root.read_from("added 2\n".as_bytes()).unwrap();
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn test_io_error_carries_offset() {
        struct Failing {
            served: bool,
        }

        impl io::Read for Failing {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.served {
                    return Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"));
                }
                self.served = true;
                let chunk = b"Key { a b\n";
                buf[..chunk.len()].copy_from_slice(chunk);
                Ok(chunk.len())
            }
        }

        let mut root = KeyValues::new();
        let err = root.read_from(Failing { served: false }).unwrap_err();
        match err {
            Error::Io { offset, source } => {
                assert_eq!(offset, 10);
                assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_str_trait() {
        let root: KeyValues = "Key { subkey value }".parse().unwrap();
        assert_eq!(root.sub_key("key").sub_key("SUBKEY").as_str(""), "value");
    }

    #[test]
    #[should_panic(expected = "cannot parse into key")]
    fn test_parse_into_leaf_panics() {
        let mut leaf = KeyValues::leaf("k", "v");
        let _ = leaf.read_from("a b\n".as_bytes());
    }
}
