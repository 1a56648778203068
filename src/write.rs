//! KeyValues text output.
//!
//! Output is always canonical: every name and value is quoted, one statement
//! per line, one tab per nesting level. Writing a tree and parsing it back yields
//! an equal tree, and writing it again yields identical bytes.

use crate::{Error, KeyValues, Result, Value};
use std::fmt;
use std::io;
use tracing::debug;

/// Renders the children of `root` at depth zero. The root's own name is not written.
pub(crate) fn render_forest<F: fmt::Write>(root: &KeyValues, out: &mut F) -> fmt::Result {
    for child in root.children() {
        render_node(out, child, 0)?;
    }
    Ok(())
}

fn render_node<F: fmt::Write>(out: &mut F, node: &KeyValues, depth: usize) -> fmt::Result {
    indent(out, depth)?;
    write_quoted(out, node.name())?;
    out.write_char(' ')?;

    match node.value() {
        Value::Container(children) => {
            out.write_str("{\n")?;
            for child in children {
                render_node(out, child, depth + 1)?;
            }
            indent(out, depth)?;
            out.write_str("}\n")
        }
        Value::Leaf(text) => {
            write_quoted(out, text)?;
            out.write_char('\n')
        }
        Value::Empty => out.write_str("\"\"\n"),
    }
}

fn indent<F: fmt::Write>(out: &mut F, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_char('\t')?;
    }
    Ok(())
}

/// Writes `s` between double quotes, escaping the characters the parser unescapes.
fn write_quoted<F: fmt::Write>(out: &mut F, s: &str) -> fmt::Result {
    out.write_char('"')?;

    let mut start = 0;
    for (i, ch) in s.char_indices() {
        let escaped = match ch {
            '\\' => "\\\\",
            '"' => "\\\"",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            _ => continue,
        };
        out.write_str(&s[start..i])?;
        out.write_str(escaped)?;
        start = i + ch.len_utf8();
    }
    out.write_str(&s[start..])?;

    out.write_char('"')
}

/// Bridges `fmt::Write` onto an `io::Write`, counting bytes and keeping the
/// first I/O failure, since `fmt::Error` carries no payload.
struct Adapter<'a, W> {
    inner: &'a mut W,
    written: usize,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for Adapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match self.inner.write_all(s.as_bytes()) {
            Ok(()) => {
                self.written += s.len();
                Ok(())
            }
            Err(e) => {
                self.error = Some(e);
                Err(fmt::Error)
            }
        }
    }
}

/// Streams KeyValues text to an [`io::Write`].
///
/// # Examples
///
/// ```rust
/// use keyvalues::{KeyValues, Writer};
///
/// let mut root = KeyValues::new();
/// root.new_sub_key("Key").set_string("value");
///
/// let mut writer = Writer::new(Vec::new());
/// let n = writer.write_forest(&root).unwrap();
/// assert_eq!(n, 14);
/// assert_eq!(writer.into_inner(), b"\"Key\" \"value\"\n");
/// ```
pub struct Writer<W> {
    inner: W,
    written: usize,
}

impl<W: io::Write> Writer<W> {
    pub fn new(inner: W) -> Self {
        Writer { inner, written: 0 }
    }

    /// Writes every child of `root` and returns the number of bytes written by
    /// this call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying writer fails. The offset is the
    /// number of bytes this call had written successfully before the failure.
    pub fn write_forest(&mut self, root: &KeyValues) -> Result<usize> {
        let mut adapter = Adapter {
            inner: &mut self.inner,
            written: 0,
            error: None,
        };

        let rendered = render_forest(root, &mut adapter);
        let written = adapter.written;
        let failure = adapter.error.take();
        self.written += written;

        match (rendered, failure) {
            (Ok(()), _) => {
                debug!(bytes = written, keys = root.len(), "wrote keyvalues");
                Ok(written)
            }
            (Err(_), Some(e)) => {
                debug!(bytes = written, error = %e, "keyvalues write failed");
                Err(Error::io(written, e))
            }
            (Err(_), None) => Err(Error::io(
                written,
                io::Error::new(io::ErrorKind::Other, "formatter error"),
            )),
        }
    }

    /// Total bytes written through this writer so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl KeyValues {
    /// Writes the children of this node as KeyValues text.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyvalues::KeyValues;
    ///
    /// let mut root = KeyValues::new();
    /// let block = root.new_sub_key("Key");
    /// block.new_sub_key("subkey").set_string("value");
    ///
    /// let mut out = Vec::new();
    /// root.write_to(&mut out).unwrap();
    /// assert_eq!(out, b"\"Key\" {\n\t\"subkey\" \"value\"\n}\n");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if `writer` fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<usize> {
        Writer::new(writer).write_forest(self)
    }
}
