pub mod completion;
pub mod error;
pub mod parser;
pub mod tokenizer;
pub mod types;

// Re-export main types and functions
pub use completion::completion_context;
pub use error::ParseFault;
pub use parser::{parse_sql, parse_table_reference, parse_table_reference_with_ctes};
pub use tokenizer::tokenize;

// Re-export types explicitly
pub use types::{
    ClausePosition,
    CompletionContext,
    CompletionMode,
    ParsedScript,
    QualifiedName,
    ScopeSnapshot,
    StatementChunk,
    StatementType,
    TableReference,
    Token,
    TokenKind,
    TokenPosition,
};
