//! Byte-level tokenizer used by the request parser.
//!
//! A token is a run of bytes that are neither whitespace nor line
//! terminators. Tokens are never copied here: the tokenizer only hands out
//! [`Span`]s into the caller's buffer.

/// A view into a buffer, as an offset and a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Borrows the bytes this span covers.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start..self.end()]
    }
}

/// Outcome of a single [`next_token`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A non-empty run of non-whitespace bytes.
    Word(Span),
    /// One or more consecutive line terminators were consumed.
    LineBreak,
    /// Nothing left in the buffer.
    End,
}

fn is_eol(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Scans `buf` from `pos` for the next token.
///
/// Leading horizontal whitespace is skipped. Any run of `\r` and `\n` bytes
/// counts as a single line break, so `"\r\n\r\n"` yields one
/// [`Token::LineBreak`], not two.
///
/// Returns the token together with the position where the next scan should
/// start.
///
/// # Example
///
/// ```
/// # use shttpd::http::tokenizer::{next_token, Span, Token};
/// let (token, next) = next_token(b" TEST", 0);
/// assert_eq!(token, Token::Word(Span { start: 1, len: 4 }));
/// assert_eq!(next, 5);
/// ```
pub fn next_token(buf: &[u8], pos: usize) -> (Token, usize) {
    let mut head = pos.min(buf.len());

    while head < buf.len() && is_space(buf[head]) && !is_eol(buf[head]) {
        head += 1;
    }

    let mut eol = false;
    while head < buf.len() && is_eol(buf[head]) {
        eol = true;
        head += 1;
    }

    if eol {
        return (Token::LineBreak, head);
    }
    if head == buf.len() {
        return (Token::End, head);
    }

    let start = head;
    while head < buf.len() && !is_space(buf[head]) {
        head += 1;
    }

    (Token::Word(Span { start, len: head - start }), head)
}

/// Length of the double line break that ends at `end` (exclusive), if any.
///
/// The four byte form is preferred over the three byte forms, which are
/// preferred over `\n\n`.
fn terminator_ending_at(buf: &[u8], end: usize) -> Option<usize> {
    if end >= 4 && &buf[end - 4..end] == b"\r\n\r\n" {
        return Some(4);
    }
    if end >= 3 {
        let w = &buf[end - 3..end];
        if w == b"\r\n\n" || w == b"\n\r\n" {
            return Some(3);
        }
    }
    if end >= 2 && &buf[end - 2..end] == b"\n\n" {
        return Some(2);
    }
    None
}

/// Locates the blank line separating the header block from the body.
///
/// Scans backward from the end of `buf` and returns the offset where the
/// terminator starts. `\n\n`, `\r\n\r\n`, `\n\r\n` and `\r\n\n` are all
/// accepted.
///
/// This has no state: it is called again on every larger prefix of the
/// incoming data until it finds something.
pub fn end_of_header(buf: &[u8]) -> Option<usize> {
    find_terminator(buf).map(|(offset, _)| offset)
}

/// Like [`end_of_header`], also returning the terminator length.
pub fn find_terminator(buf: &[u8]) -> Option<(usize, usize)> {
    let mut end = buf.len();
    while end >= 2 {
        if let Some(len) = terminator_ending_at(buf, end) {
            return Some((end - len, len));
        }
        end -= 1;
    }
    None
}
