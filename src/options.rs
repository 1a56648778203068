//! Configuration options for KeyValues parsing.
//!
//! Writing has no options: output is always the canonical form (quoted tokens,
//! one tab per nesting level). Parsing is where real-world files differ: whether
//! `//` and `/* */` comments are skipped, and how deep blocks may nest.
//!
//! ## Examples
//!
//! ```rust
//! use keyvalues::{parse_with_options, ParseOptions};
//!
//! // Comments are skipped by default
//! let root = keyvalues::parse("// header\nKey Value\n").unwrap();
//! assert_eq!(root.len(), 1);
//!
//! // With comments off, `//` is an ordinary bare token
//! let options = ParseOptions::new().with_comments(false);
//! let root = parse_with_options("// header\n", options).unwrap();
//! assert_eq!(root.sub_key("//").unwrap().as_str(""), "header");
//! ```

/// Configuration options for the KeyValues parser.
///
/// # Examples
///
/// ```rust
/// use keyvalues::ParseOptions;
///
/// let options = ParseOptions::new();
/// assert!(options.comments);
///
/// let strict = ParseOptions::new().with_comments(false);
/// assert!(!strict.comments);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Skip `// line` and `/* block */` comments between tokens.
    pub comments: bool,
    /// Maximum number of blocks open at once. Deeper input is a syntax error.
    pub max_depth: usize,
}

/// Default for [`ParseOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            comments: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Creates default options (comments skipped).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables comment skipping.
    ///
    /// Comments are only recognized where whitespace may appear, never inside a
    /// token: `a//b` is the single bare token `a//b`.
    #[must_use]
    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    /// Sets how many blocks may be open at once.
    ///
    /// Trees are dropped, written and deserialized recursively, so this bounds the
    /// stack used by everything downstream of the parser.
    ///
    /// ```rust
    /// use keyvalues::{parse_with_options, ParseOptions};
    ///
    /// let options = ParseOptions::new().with_max_depth(2);
    /// assert!(parse_with_options("a { b { c 1 } }", options.clone()).is_ok());
    /// assert!(parse_with_options("a { b { c { d 1 } } }", options).is_err());
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
