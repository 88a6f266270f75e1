//! The completion mode classifier.
//!
//! Classification looks at the token at (or just before) the cursor, the
//! clause-position interval of the enclosing statement chunk, and the
//! paren-nesting around the cursor. It runs on the result of a full parse
//! pass, so it is as tolerant of partial input as the parser itself.

use crate::parser::{parse_internal, Parsed};
use crate::types::{
    CompletionContext, CompletionMode, StatementChunk, StatementType, Token, TokenKind,
    TokenPosition,
};

/// Clause region the cursor falls inside, derived from the enclosing
/// chunk's labeled clause positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    SelectList,
    From,
    Join,
    On,
    Where,
    Other,
}

/// Classifies the cursor position in `sql` into a completion context.
///
/// `line` and `column` are 1-indexed, matching token positions. Never fails:
/// unclassifiable positions come back as [`CompletionMode::Default`], empty
/// input as [`CompletionMode::Start`].
pub fn completion_context(sql: &str, line: u32, column: u32) -> CompletionContext {
    let parsed = parse_internal(sql);
    let cursor = TokenPosition::new(line, column);
    classify(&parsed, cursor)
}

fn classify(parsed: &Parsed, cursor: TokenPosition) -> CompletionContext {
    let statements = parsed.chunks.clone();

    let before: Vec<&Token> = parsed
        .tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Comment && t.position < cursor)
        .collect();
    let Some((&last, rest)) = before.split_last() else {
        return CompletionContext {
            mode: CompletionMode::Start,
            scope: Default::default(),
            statements,
        };
    };

    // When the cursor sits inside or at the end of a word the user is still
    // typing, that word is a prefix filter; the token before it anchors the
    // classification.
    let anchor = if is_typed_prefix(last, cursor) {
        rest.last().copied()
    } else {
        Some(last)
    };

    let chunk_index = enclosing_chunk(&parsed.chunks, cursor);
    let scope = match chunk_index {
        Some(index) => {
            let mut snapshot = parsed.scopes.snapshot(parsed.chunk_frames[index]);
            snapshot.statement_type = parsed.chunks[index].statement_type;
            snapshot
        }
        None => Default::default(),
    };
    let chunk = chunk_index.map(|i| &parsed.chunks[i]);

    let mode = classify_mode(parsed, chunk, anchor, cursor);
    CompletionContext {
        mode,
        scope,
        statements,
    }
}

fn is_typed_prefix(token: &Token, cursor: TokenPosition) -> bool {
    matches!(
        token.kind,
        TokenKind::Identifier | TokenKind::Keyword | TokenKind::BracketId | TokenKind::Number
    ) && token.position.line == cursor.line
        && cursor.column <= token.end_column()
}

/// Index of the last chunk starting at or before the cursor.
fn enclosing_chunk(chunks: &[StatementChunk], cursor: TokenPosition) -> Option<usize> {
    chunks.iter().rposition(|chunk| chunk.start <= cursor)
}

fn classify_mode(
    parsed: &Parsed,
    chunk: Option<&StatementChunk>,
    anchor: Option<&Token>,
    cursor: TokenPosition,
) -> CompletionMode {
    let Some(anchor) = anchor else {
        return CompletionMode::Start;
    };
    if anchor.is_punctuation(";") || anchor.is_keyword("GO") {
        return CompletionMode::Start;
    }
    if anchor.is_keyword("EXEC") || anchor.is_keyword("EXECUTE") {
        return CompletionMode::Exec;
    }
    if chunk.is_some_and(|c| c.statement_type == StatementType::Exec) {
        return CompletionMode::Exec;
    }

    let region = chunk.map_or(Region::Other, |c| region_at(c, cursor));

    if anchor.is_punctuation(".") {
        return match region {
            Region::From => CompletionMode::FromQualified,
            Region::Join | Region::On => CompletionMode::JoinQualified,
            _ => CompletionMode::Default,
        };
    }

    if let Some(paren_region) = enclosing_function_region(parsed, chunk, cursor) {
        return match paren_region {
            Region::SelectList => CompletionMode::SelectFunction,
            Region::From | Region::Join => CompletionMode::FromFunction,
            _ => CompletionMode::Default,
        };
    }

    if anchor.is_any_keyword(&["SELECT", "DISTINCT"]) {
        return CompletionMode::AfterSelect;
    }
    if anchor.is_keyword("FROM") {
        return CompletionMode::AfterFrom;
    }
    if anchor.is_keyword("WHERE") {
        return CompletionMode::AfterWhere;
    }
    if anchor.is_any_keyword(&[
        "JOIN", "APPLY", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "NATURAL", "OUTER",
    ]) {
        return CompletionMode::AfterJoin;
    }
    if anchor.is_punctuation(",") {
        return match region {
            Region::SelectList => CompletionMode::AfterSelect,
            Region::From => CompletionMode::AfterFrom,
            _ => CompletionMode::Default,
        };
    }
    CompletionMode::Default
}

/// The clause region at the cursor: the last labeled clause position before
/// it, or the select list when none is.
fn region_at(chunk: &StatementChunk, cursor: TokenPosition) -> Region {
    let mut region = if chunk.statement_type == StatementType::Select {
        Region::SelectList
    } else {
        Region::Other
    };
    for clause in &chunk.clause_positions {
        if clause.position >= cursor {
            break;
        }
        region = match clause.label.as_str() {
            "from" => Region::From,
            "where" => Region::Where,
            label if label.starts_with("join") => Region::Join,
            label if label.starts_with("on") => Region::On,
            _ => Region::Other,
        };
    }
    region
}

/// When the cursor sits inside an unclosed parenthesized group opened right
/// after an identifier — a function call mid-typing — returns the region
/// that call started in.
fn enclosing_function_region(
    parsed: &Parsed,
    chunk: Option<&StatementChunk>,
    cursor: TokenPosition,
) -> Option<Region> {
    let chunk = chunk?;
    let mut stack: Vec<(bool, TokenPosition)> = Vec::new();
    let mut previous: Option<&Token> = None;
    for token in parsed
        .tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Comment)
    {
        if token.position < chunk.start {
            continue;
        }
        if token.position >= cursor {
            break;
        }
        if token.is_punctuation("(") {
            let after_identifier = previous.is_some_and(|p| {
                matches!(p.kind, TokenKind::Identifier | TokenKind::BracketId)
            });
            stack.push((after_identifier, token.position));
        } else if token.is_punctuation(")") {
            stack.pop();
        }
        previous = Some(token);
    }
    let (is_function, open_position) = stack.pop()?;
    if !is_function {
        return None;
    }
    Some(region_at(chunk, open_position))
}
