//! Recognition of placeholder tokens across their surface encodings.
//!
//! A token is an opening marker, optional whitespace, a reserved keyword,
//! optional whitespace and a closing marker. Each marker may independently be
//! written in one of three encodings:
//!
//! - literal: `{` / `}`
//! - backslash unicode: `\u007b` / `\u007d` (any number of backslashes,
//!   leading zeros and interleaved whitespace)
//! - numeric entity: `&#x7b;` / `&#123;` and their closing counterparts
//!
//! All offsets are byte offsets. Every construct in the grammar is ASCII, so
//! match boundaries always fall on `char` boundaries of the input.

/// Keywords accepted when no explicit set is configured.
pub const DEFAULT_KEYWORDS: [&str; 3] = ["str", "user", "org"];

/// Which side of the token a marker closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Open,
    Close,
}

impl Side {
    fn literal(self) -> u8 {
        match self {
            Side::Open => b'{',
            Side::Close => b'}',
        }
    }

    fn hex_digits(self) -> &'static [u8] {
        match self {
            Side::Open => b"7b",
            Side::Close => b"7d",
        }
    }

    fn decimal_digits(self) -> &'static [u8] {
        match self {
            Side::Open => b"123",
            Side::Close => b"125",
        }
    }
}

/// Surface encodings a marker can be written in, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Literal,
    BackslashUnicode,
    NumericEntity,
}

impl Encoding {
    pub const ALL: [Encoding; 3] = [
        Encoding::Literal,
        Encoding::BackslashUnicode,
        Encoding::NumericEntity,
    ];

    /// Returns the end offset of a marker in this encoding starting at `offset`.
    fn match_at(self, bytes: &[u8], offset: usize, side: Side) -> Option<usize> {
        match self {
            Encoding::Literal => (bytes.get(offset) == Some(&side.literal())).then_some(offset + 1),
            Encoding::BackslashUnicode => match_backslash_unicode(bytes, offset, side),
            Encoding::NumericEntity => match_numeric_entity(bytes, offset, side),
        }
    }
}

/// Tries every encoding at `offset` and returns the end of the first marker found.
pub fn try_match_marker(text: &str, offset: usize, side: Side) -> Option<usize> {
    marker_at(text.as_bytes(), offset, side).map(|(end, _)| end)
}

fn marker_at(bytes: &[u8], offset: usize, side: Side) -> Option<(usize, Encoding)> {
    Encoding::ALL
        .iter()
        .find_map(|encoding| encoding.match_at(bytes, offset, side).map(|end| (end, *encoding)))
}

fn match_backslash_unicode(bytes: &[u8], offset: usize, side: Side) -> Option<usize> {
    let mut i = offset;
    while bytes.get(i) == Some(&b'\\') {
        i += 1;
    }
    if i == offset {
        return None;
    }
    let i = expect_ignore_case(bytes, i, b'u')?;
    let i = skip_zeros(bytes, i);
    expect_digits(bytes, i, side.hex_digits())
}

fn match_numeric_entity(bytes: &[u8], offset: usize, side: Side) -> Option<usize> {
    if !bytes.get(offset..)?.starts_with(b"&#") {
        return None;
    }
    let mut i = skip_whitespace(bytes, offset + 2);
    let hex = matches!(bytes.get(i), Some(b'x' | b'X'));
    if hex {
        i += 1;
    }
    let i = skip_zeros(bytes, i);
    let digits = if hex {
        side.hex_digits()
    } else {
        side.decimal_digits()
    };
    let i = expect_digits(bytes, i, digits)?;
    let i = skip_whitespace(bytes, i);
    (bytes.get(i) == Some(&b';')).then_some(i + 1)
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

/// Skips leading zero digits, each optionally preceded by whitespace.
///
/// Whitespace after the last zero is left for [`expect_digits`].
fn skip_zeros(bytes: &[u8], mut i: usize) -> usize {
    loop {
        let next = skip_whitespace(bytes, i);
        if bytes.get(next) == Some(&b'0') {
            i = next + 1;
        } else {
            return i;
        }
    }
}

fn expect_ignore_case(bytes: &[u8], i: usize, expected: u8) -> Option<usize> {
    bytes
        .get(i)
        .filter(|b| b.eq_ignore_ascii_case(&expected))
        .map(|_| i + 1)
}

fn expect_digits(bytes: &[u8], mut i: usize, digits: &[u8]) -> Option<usize> {
    for digit in digits {
        i = skip_whitespace(bytes, i);
        i = expect_ignore_case(bytes, i, *digit)?;
    }
    Some(i)
}

/// One recognized occurrence of a placeholder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Offset of the first byte of the opening marker.
    pub start: usize,
    /// Offset one past the last byte of the closing marker.
    pub end: usize,
    /// Encoding of the opening marker.
    pub open: Encoding,
    /// Encoding of the closing marker.
    pub close: Encoding,
    inner_start: usize,
    inner_end: usize,
}

impl Match {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// The matched text, markers included.
    pub fn as_str<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }

    /// The text between the markers: the keyword and its surrounding whitespace.
    pub fn inner<'t>(&self, text: &'t str) -> &'t str {
        &text[self.inner_start..self.inner_end]
    }

    /// The identity used to decide whether two occurrences are the same placeholder.
    pub fn canonical_key(&self, text: &str) -> String {
        canonical_key(self.inner(text))
    }
}

/// Collapses interior whitespace, trims and lowercases a placeholder body.
pub fn canonical_key(inner: &str) -> String {
    inner
        .split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Finds placeholder tokens built around a fixed set of keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatcher {
    keywords: Vec<String>,
}

impl Default for TokenMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

impl TokenMatcher {
    /// Creates a matcher for the given keywords, compared case-insensitively.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();
        TokenMatcher { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns the token beginning exactly at `offset`, if there is one.
    pub fn match_at(&self, text: &str, offset: usize) -> Option<Match> {
        let bytes = text.as_bytes();
        let (inner_start, open) = marker_at(bytes, offset, Side::Open)?;
        let keyword_start = skip_whitespace(bytes, inner_start);

        self.keywords.iter().find_map(|keyword| {
            let keyword_end = keyword_start + keyword.len();
            let candidate = bytes.get(keyword_start..keyword_end)?;
            if !candidate.eq_ignore_ascii_case(keyword.as_bytes()) {
                return None;
            }
            let inner_end = skip_whitespace(bytes, keyword_end);
            let (end, close) = marker_at(bytes, inner_end, Side::Close)?;
            Some(Match {
                start: offset,
                end,
                open,
                close,
                inner_start,
                inner_end,
            })
        })
    }

    /// Returns the first token starting at or after `from`.
    pub fn find_from(&self, text: &str, from: usize) -> Option<Match> {
        let bytes = text.as_bytes();
        (from..bytes.len())
            .filter(|&i| matches!(bytes[i], b'{' | b'\\' | b'&'))
            .find_map(|i| self.match_at(text, i))
    }

    /// Iterates over non-overlapping tokens from left to right.
    pub fn find_iter<'m, 't>(&'m self, text: &'t str) -> Matches<'m, 't> {
        Matches {
            matcher: self,
            text,
            cursor: 0,
        }
    }
}

/// Iterator returned by [`TokenMatcher::find_iter`].
pub struct Matches<'m, 't> {
    matcher: &'m TokenMatcher,
    text: &'t str,
    cursor: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        let found = self.matcher.find_from(self.text, self.cursor)?;
        self.cursor = found.end;
        Some(found)
    }
}
