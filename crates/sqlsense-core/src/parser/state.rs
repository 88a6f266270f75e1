//! Cursor-based parser state over a token sequence.

use crate::types::{Token, TokenKind, TokenPosition};

/// A saved cursor position, handed back by [`ParserState::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// Navigation cursor over a tokenized input.
///
/// The cursor is monotonic: nothing re-reads a position behind it except via
/// an explicit [`ParserState::save`] / [`ParserState::restore`] pair used for
/// lookahead. Comment tokens are transparent to navigation — the cursor
/// skips them on construction and after every advance, so parsers never see
/// them while the reformatter still gets them in the raw token sequence.
pub struct ParserState<'a> {
    tokens: &'a [Token],
    cursor: usize,
    batch_index: usize,
}

impl<'a> ParserState<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let mut state = Self {
            tokens,
            cursor: 0,
            batch_index: 0,
        };
        state.skip_comments();
        state
    }

    fn skip_comments(&mut self) {
        while self
            .tokens
            .get(self.cursor)
            .is_some_and(|t| t.kind == TokenKind::Comment)
        {
            self.cursor += 1;
        }
    }

    /// The token at the cursor, or `None` at end of stream.
    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.cursor)
    }

    /// The `n`-th non-comment token after the cursor (`peek(0)` == `current`).
    pub fn peek(&self, n: usize) -> Option<&'a Token> {
        self.tokens[self.cursor.min(self.tokens.len())..]
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .nth(n)
    }

    /// Consumes and returns the current token.
    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        self.skip_comments();
        Some(token)
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Raw cursor index, used by progress guards and fault reports.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    pub fn next_batch(&mut self) {
        self.batch_index += 1;
    }

    /// Source position of the current token, or of the end of input.
    pub fn position(&self) -> TokenPosition {
        match self.current() {
            Some(token) => token.position,
            None => self
                .tokens
                .last()
                .map(|t| TokenPosition::new(t.position.line, t.end_column()))
                .unwrap_or_default(),
        }
    }

    /// Tests the current token against a keyword without consuming it.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.current().is_some_and(|t| t.is_keyword(keyword))
    }

    /// Tests the current token against a keyword set without consuming it.
    pub fn is_any_keyword(&self, keywords: &[&str]) -> bool {
        self.current().is_some_and(|t| t.is_any_keyword(keywords))
    }

    /// Tests the current token's kind without consuming it.
    pub fn is_type(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    /// Tests the current token against punctuation text without consuming it.
    pub fn is_punctuation(&self, text: &str) -> bool {
        self.current().is_some_and(|t| t.is_punctuation(text))
    }

    /// Saves the cursor for later [`ParserState::restore`]. The only
    /// sanctioned way to move backwards.
    pub fn save(&self) -> Mark {
        Mark(self.cursor)
    }

    pub fn restore(&mut self, mark: Mark) {
        self.cursor = mark.0;
    }

    /// Consumes a parenthesized group, tracking nesting depth.
    ///
    /// Used for `TOP(n)`, table hints and function argument lists. On
    /// unmatched parentheses the cursor stops cleanly at end of stream, so
    /// truncated input degrades instead of erroring. Returns `true` when a
    /// group was consumed (even a truncated one).
    pub fn skip_balanced_group(&mut self) -> bool {
        if !self.is_punctuation("(") {
            return false;
        }
        let mut depth = 0usize;
        while let Some(token) = self.current() {
            if token.is_punctuation("(") {
                depth += 1;
            } else if token.is_punctuation(")") {
                depth = depth.saturating_sub(1);
                self.advance();
                if depth == 0 {
                    break;
                }
                continue;
            }
            self.advance();
        }
        true
    }

    /// Consumes a run of statement terminators (`;`).
    pub fn skip_statement_terminators(&mut self) {
        while self.is_punctuation(";") {
            self.advance();
        }
    }
}
