//! Qualified-name and alias grammar, used by every reference parser.

use crate::types::{QualifiedName, TokenKind};

use super::state::ParserState;
use super::{CLAUSE_BOUNDARY_KEYWORDS, STATEMENT_KEYWORDS};

/// Removes `[bracket]` or `"quote"` delimiters and unescapes doubled
/// closers. Bare identifiers pass through unchanged.
pub(crate) fn strip_quoting(text: &str) -> String {
    if let Some(inner) = text.strip_prefix('[') {
        inner.strip_suffix(']').unwrap_or(inner).replace("]]", "]")
    } else if let Some(inner) = text.strip_prefix('"') {
        inner
            .strip_suffix('"')
            .unwrap_or(inner)
            .replace("\"\"", "\"")
    } else {
        text.to_string()
    }
}

fn is_name_part(state: &ParserState<'_>) -> bool {
    state.is_type(TokenKind::Identifier) || state.is_type(TokenKind::BracketId)
}

/// Parses 1–4 dot-separated identifiers into a right-anchored name.
///
/// The last segment is always `name`; earlier segments fill schema, then
/// database, then server, only as present — `a.b` is schema `a`, name `b`.
/// Empty middle parts (`db..table`) leave the skipped slot unset. A trailing
/// dot with nothing after it (mid-keystroke) is consumed and the name stays
/// what was typed so far.
pub fn parse_qualified_name(state: &mut ParserState<'_>) -> Option<QualifiedName> {
    if !is_name_part(state) {
        return None;
    }
    let mut parts: Vec<Option<String>> = Vec::with_capacity(4);
    parts.push(state.advance().map(|t| strip_quoting(&t.text)));

    while parts.len() < 4 && state.is_punctuation(".") {
        state.advance();
        if is_name_part(state) {
            parts.push(state.advance().map(|t| strip_quoting(&t.text)));
        } else if state.is_punctuation(".") {
            // db..table: the empty slot stays unset
            parts.push(None);
        } else {
            break;
        }
    }

    let mut filled = parts.into_iter().rev();
    let name = filled.next().flatten().unwrap_or_default();
    let schema = filled.next().flatten();
    let database = filled.next().flatten();
    let server = filled.next().flatten();
    Some(QualifiedName {
        server,
        database,
        schema,
        name,
    })
}

/// Parses `AS alias` or a bare trailing identifier.
///
/// A bare keyword is rejected as an alias when it can only start a
/// subsequent clause or statement, so `FROM Employees WHERE` never swallows
/// `WHERE` as an alias. `@variable` tokens are never aliases.
pub fn parse_alias(state: &mut ParserState<'_>) -> Option<String> {
    if state.is_keyword("AS") {
        let mark = state.save();
        state.advance();
        if let Some(alias) = take_alias_token(state) {
            return Some(alias);
        }
        state.restore(mark);
        return None;
    }
    take_alias_token(state)
}

fn take_alias_token(state: &mut ParserState<'_>) -> Option<String> {
    let token = state.current()?;
    let accept = match token.kind {
        TokenKind::Identifier => !token.text.starts_with('@'),
        TokenKind::BracketId => true,
        TokenKind::Keyword => {
            !token.is_any_keyword(CLAUSE_BOUNDARY_KEYWORDS)
                && !token.is_any_keyword(STATEMENT_KEYWORDS)
        }
        _ => false,
    };
    if accept {
        state.advance().map(|t| strip_quoting(&t.text))
    } else {
        None
    }
}
