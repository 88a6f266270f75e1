//! Lexical token types produced by the tokenizer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lexical class of a token.
///
/// The set is closed: the tokenizer maps every character of the input onto
/// one of these kinds and never fails. Characters that match no known
/// lexical unit become [`TokenKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// Reserved or clause keyword (matched case-insensitively).
    Keyword,
    /// Bare identifier, including `@variable`, `#temp` and `##globaltemp` forms.
    Identifier,
    /// `[bracket]`- or `"quote"`-delimited identifier.
    BracketId,
    /// Numeric literal.
    Number,
    /// String literal, including the `N'...'` unicode form.
    String,
    /// Single- or multi-character operator.
    Operator,
    /// Structural punctuation: parentheses, comma, dot, semicolon.
    Punctuation,
    /// Line or block comment, kept as a single token.
    Comment,
    /// Character sequence that matched no lexical rule.
    Unknown,
}

/// Source coordinates of a token. Lines and columns are 1-indexed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "camelCase")]
pub struct TokenPosition {
    pub line: u32,
    pub column: u32,
}

impl TokenPosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One lexical unit of the input text.
///
/// `text` preserves the original case; keyword tests compare
/// case-insensitively so that `select` and `SELECT` behave identically while
/// the reformatting engine still sees what the user actually typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: TokenPosition,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            position: TokenPosition::new(line, column),
        }
    }

    /// Tests whether this token is the given keyword, ignoring case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Tests whether this token is any of the given keywords, ignoring case.
    pub fn is_any_keyword(&self, keywords: &[&str]) -> bool {
        self.kind == TokenKind::Keyword
            && keywords.iter().any(|k| self.text.eq_ignore_ascii_case(k))
    }

    /// Tests whether this token is the given punctuation text.
    pub fn is_punctuation(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    /// Source column one past the last character of the token.
    ///
    /// Multi-line tokens (block comments) report an end on their first line;
    /// the classifier never anchors inside comments, so the approximation is
    /// harmless.
    pub fn end_column(&self) -> u32 {
        self.position.column + self.text.chars().count() as u32
    }
}
