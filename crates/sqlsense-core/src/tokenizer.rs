//! SQL tokenizer.
//!
//! Turns input text into a fully materialized token sequence. The output is
//! not a lazy stream because the parsers above it need arbitrary lookahead
//! and save/restore backtracking.
//!
//! Tokenization never errors: characters that match no lexical rule become
//! [`TokenKind::Unknown`] tokens and scanning continues. Unterminated
//! strings, bracket identifiers and block comments are consumed to the end
//! of input — the user is usually mid-keystroke when that happens.

use crate::types::{Token, TokenKind};

/// Keywords recognized by the tokenizer, sorted for binary search.
///
/// Matching is case-insensitive; the token keeps the original spelling.
const KEYWORDS: &[&str] = &[
    "ALL",
    "ALTER",
    "AND",
    "APPLY",
    "AS",
    "ASC",
    "BEGIN",
    "BETWEEN",
    "BY",
    "CASE",
    "CAST",
    "COMMIT",
    "CONVERT",
    "CREATE",
    "CROSS",
    "DECLARE",
    "DELETE",
    "DESC",
    "DISTINCT",
    "DROP",
    "ELSE",
    "END",
    "EXCEPT",
    "EXEC",
    "EXECUTE",
    "EXISTS",
    "FROM",
    "FULL",
    "GO",
    "GROUP",
    "HAVING",
    "IF",
    "IN",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTO",
    "IS",
    "JOIN",
    "LEFT",
    "LIKE",
    "MATCHED",
    "MERGE",
    "NATURAL",
    "NOT",
    "NULL",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "OVER",
    "PARTITION",
    "PERCENT",
    "PRINT",
    "RETURN",
    "RIGHT",
    "ROLLBACK",
    "SELECT",
    "SET",
    "TABLE",
    "THEN",
    "TOP",
    "TRAN",
    "TRANSACTION",
    "TRUNCATE",
    "UNION",
    "UPDATE",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
    "WHILE",
    "WITH",
];

/// Two-character operators, tried before single characters.
const TWO_CHAR_OPERATORS: &[&str] = &[
    "!<", "!=", "!>", "%=", "&&", "&=", "*=", "+=", "-=", "/=", "::", "<=", "<>", ">=", "^=", "|=",
    "||",
];

const SINGLE_CHAR_OPERATORS: &[char] = &[
    '+', '-', '*', '/', '%', '=', '<', '>', '!', '&', '|', '^', '~',
];

fn is_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    KEYWORDS.binary_search(&upper.as_str()).is_ok()
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '#'
}

/// Tokenizes `sql` into an ordered token sequence. Never fails.
pub fn tokenize(sql: &str) -> Vec<Token> {
    Lexer::new(sql).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(sql: &str) -> Self {
        Self {
            chars: sql.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek(0) {
            let line = self.line;
            let column = self.column;
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '-' if self.peek(1) == Some('-') => self.line_comment(line, column),
                '/' if self.peek(1) == Some('*') => self.block_comment(line, column),
                '[' => self.bracket_identifier(line, column),
                '"' => self.quoted_identifier(line, column),
                '\'' => self.string_literal(line, column, false),
                'N' | 'n' if self.peek(1) == Some('\'') => self.string_literal(line, column, true),
                c if c.is_ascii_digit() => self.number(line, column),
                '.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.number(line, column);
                }
                '@' | '#' => self.marked_identifier(line, column),
                c if is_identifier_start(c) => self.word(line, column),
                '(' | ')' | ',' | '.' | ';' => {
                    self.bump();
                    self.push(TokenKind::Punctuation, c.to_string(), line, column);
                }
                _ => self.operator_or_unknown(line, column),
            }
        }
        self.tokens
    }

    fn push(&mut self, kind: TokenKind, text: String, line: u32, column: u32) {
        self.tokens.push(Token::new(kind, text, line, column));
    }

    fn line_comment(&mut self, line: u32, column: u32) {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        self.push(TokenKind::Comment, text, line, column);
    }

    /// Block comments nest, matching T-SQL behavior. An unterminated comment
    /// runs to end of input.
    fn block_comment(&mut self, line: u32, column: u32) {
        let mut text = String::new();
        let mut depth = 0usize;
        while let Some(c) = self.peek(0) {
            if c == '/' && self.peek(1) == Some('*') {
                depth += 1;
                text.push('/');
                text.push('*');
                self.bump();
                self.bump();
            } else if c == '*' && self.peek(1) == Some('/') {
                depth -= 1;
                text.push('*');
                text.push('/');
                self.bump();
                self.bump();
                if depth == 0 {
                    break;
                }
            } else {
                text.push(c);
                self.bump();
            }
        }
        self.push(TokenKind::Comment, text, line, column);
    }

    /// `[identifier]` with `]]` escaping. Unterminated runs to end of input.
    fn bracket_identifier(&mut self, line: u32, column: u32) {
        let mut text = String::new();
        text.push('[');
        self.bump();
        while let Some(c) = self.bump() {
            text.push(c);
            if c == ']' {
                if self.peek(0) == Some(']') {
                    text.push(']');
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.push(TokenKind::BracketId, text, line, column);
    }

    /// `"identifier"` with `""` escaping (QUOTED_IDENTIFIER surface).
    fn quoted_identifier(&mut self, line: u32, column: u32) {
        let mut text = String::new();
        text.push('"');
        self.bump();
        while let Some(c) = self.bump() {
            text.push(c);
            if c == '"' {
                if self.peek(0) == Some('"') {
                    text.push('"');
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.push(TokenKind::BracketId, text, line, column);
    }

    /// `'literal'` with `''` escaping; `unicode` folds an `N` prefix in.
    fn string_literal(&mut self, line: u32, column: u32, unicode: bool) {
        let mut text = String::new();
        if unicode {
            text.push(self.bump().unwrap_or('N'));
        }
        text.push('\'');
        self.bump();
        while let Some(c) = self.bump() {
            text.push(c);
            if c == '\'' {
                if self.peek(0) == Some('\'') {
                    text.push('\'');
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.push(TokenKind::String, text, line, column);
    }

    fn number(&mut self, line: u32, column: u32) {
        let mut text = String::new();
        let mut seen_dot = false;
        while let Some(c) = self.peek(0) {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                text.push(c);
                self.bump();
            } else if (c == 'e' || c == 'E')
                && self
                    .peek(1)
                    .is_some_and(|n| n.is_ascii_digit() || n == '+' || n == '-')
            {
                text.push(c);
                self.bump();
                if let Some(sign) = self.peek(0) {
                    if sign == '+' || sign == '-' {
                        text.push(sign);
                        self.bump();
                    }
                }
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, text, line, column);
    }

    /// `@var`, `@@global`, `#temp`, `##globaltemp`. The marker is glued to
    /// the following identifier so temp/variable classification sees one
    /// token. A lone marker with nothing attached is Unknown.
    fn marked_identifier(&mut self, line: u32, column: u32) {
        let marker = self.peek(0).unwrap_or('@');
        let mut text = String::new();
        text.push(marker);
        self.bump();
        if self.peek(0) == Some(marker) {
            text.push(marker);
            self.bump();
        }
        let mut has_body = false;
        while let Some(c) = self.peek(0) {
            if is_identifier_part(c) {
                has_body = true;
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let kind = if has_body {
            TokenKind::Identifier
        } else {
            TokenKind::Unknown
        };
        self.push(kind, text, line, column);
    }

    fn word(&mut self, line: u32, column: u32) {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if is_identifier_part(c) {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let kind = if is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push(kind, text, line, column);
    }

    fn operator_or_unknown(&mut self, line: u32, column: u32) {
        if let (Some(a), Some(b)) = (self.peek(0), self.peek(1)) {
            let pair: String = [a, b].iter().collect();
            if TWO_CHAR_OPERATORS.contains(&pair.as_str()) {
                self.bump();
                self.bump();
                self.push(TokenKind::Operator, pair, line, column);
                return;
            }
        }
        let c = self.bump().unwrap_or_default();
        if SINGLE_CHAR_OPERATORS.contains(&c) {
            self.push(TokenKind::Operator, c.to_string(), line, column);
        } else {
            self.push(TokenKind::Unknown, c.to_string(), line, column);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenKind;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        tokenize(sql).into_iter().map(|t| t.kind).collect()
    }

    fn texts(sql: &str) -> Vec<String> {
        tokenize(sql).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn classifies_keywords_preserving_case() {
        let tokens = tokenize("select * From Employees");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].text, "select");
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].text, "From");
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("SELECT *\nFROM t");
        assert_eq!(tokens[0].position.line, 1);
        assert_eq!(tokens[0].position.column, 1);
        assert_eq!(tokens[2].position.line, 2);
        assert_eq!(tokens[2].position.column, 1);
        assert_eq!(tokens[3].position.line, 2);
        assert_eq!(tokens[3].position.column, 6);
    }

    #[test]
    fn bracket_identifier_is_one_token() {
        let tokens = tokenize("SELECT [My Column]] x] FROM t");
        assert_eq!(tokens[1].kind, TokenKind::BracketId);
        assert_eq!(tokens[1].text, "[My Column]] x]");
    }

    #[test]
    fn string_literal_with_doubled_quote() {
        let tokens = tokenize("SELECT 'it''s'");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, "'it''s'");
    }

    #[test]
    fn unicode_string_prefix_folds_in() {
        let tokens = tokenize("SELECT N'text'");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, "N'text'");
    }

    #[test]
    fn comments_are_single_tokens() {
        let tokens = tokenize("SELECT 1 -- trailing\n/* block\ncomment */ FROM");
        assert_eq!(tokens[2].kind, TokenKind::Comment);
        assert_eq!(tokens[2].text, "-- trailing");
        assert_eq!(tokens[3].kind, TokenKind::Comment);
        assert_eq!(tokens[4].kind, TokenKind::Keyword);
    }

    #[test]
    fn nested_block_comment() {
        let tokens = tokenize("/* a /* b */ c */ SELECT");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].text, "/* a /* b */ c */");
    }

    #[test]
    fn unterminated_constructs_run_to_end() {
        assert_eq!(kinds("'unclosed"), vec![TokenKind::String]);
        assert_eq!(kinds("[unclosed"), vec![TokenKind::BracketId]);
        assert_eq!(kinds("/* unclosed"), vec![TokenKind::Comment]);
    }

    #[test]
    fn temp_and_variable_markers_glue_to_identifier() {
        assert_eq!(texts("#tmp ##gtmp @v @@rowcount"), vec![
            "#tmp", "##gtmp", "@v", "@@rowcount"
        ]);
        assert_eq!(
            kinds("#tmp ##gtmp @v"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn multi_character_operators() {
        assert_eq!(texts("a <> b >= c != d"), vec![
            "a", "<>", "b", ">=", "c", "!=", "d"
        ]);
    }

    #[test]
    fn numbers_including_leading_dot() {
        assert_eq!(kinds("1.5 .5 10e3"), vec![
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Number
        ]);
    }

    #[test]
    fn unknown_characters_do_not_fail() {
        let tokens = tokenize("SELECT \u{00a7} FROM t");
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn keyword_table_is_sorted() {
        let mut sorted = KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEYWORDS);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }
}
