//! # Grammar Lexer
//!
//! A streaming tokenizer for yacc/BNF-style grammar descriptions.
//!
//! ## Overview
//!
//! Grammar sources are made of rule definitions separated by `:` and `|`,
//! symbol and terminal names, quoted literals, comments, and brace-delimited
//! action blocks holding host-language code. This crate turns such text into
//! an ordered stream of tokens for a downstream grammar parser.
//!
//! ## Key Features
//!
//! - **Pull-based**: one token per call, no buffering of future tokens
//! - **Action Blocks**: nested braces balanced, braces inside quoted substrings ignored
//! - **Comments Inline**: `#` line comments and `/* */` block comments are emitted as tokens
//! - **Streaming Support**: lex from any `Read` with incremental UTF-8 decoding
//! - **Diagnostics**: every error carries a position and can render a source snippet
//!
//! ## Basic Usage
//!
//! ```rust
//! use grammar_lexer::{GrammarLexer, TokenKind};
//!
//! let mut lexer = GrammarLexer::new("expr: term '+' term { emit(add) }");
//!
//! let mut texts = Vec::new();
//! loop {
//!     let token = lexer.next_token()?;
//!     if token.is_eof() {
//!         break;
//!     }
//!     texts.push(token.text().to_string());
//! }
//!
//! assert_eq!(texts, ["expr", ":", "term", "'+'", "term", " emit(add) "]);
//! # Ok::<(), grammar_lexer::LexError>(())
//! ```
//!
//! The lexer is also an [`Iterator`] over `Result<Token, LexError>` that ends
//! at end of stream:
//!
//! ```rust
//! use grammar_lexer::{tokenize, TokenKind};
//!
//! let tokens = tokenize("a: b # note\n | c")?;
//! let significant: Vec<&str> = tokens
//!     .iter()
//!     .filter(|t| !t.is_trivia())
//!     .map(|t| t.text())
//!     .collect();
//! assert_eq!(significant, ["a", ":", "b", "|", "c"]);
//! assert_eq!(tokens[3].kind(), TokenKind::LineComment);
//! # Ok::<(), grammar_lexer::LexError>(())
//! ```
//!
//! ### Streaming from Files
//!
//! ```rust,no_run
//! use grammar_lexer::lexer_from_file;
//!
//! let lexer = lexer_from_file("grammar.y")?;
//!
//! for token in lexer {
//!     let token = token?;
//!     println!("{:?} {}", token.kind(), token);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Errors are terminal: once a scan fails the lexer keeps returning the same
//! error. Each error knows where it happened:
//!
//! ```rust
//! use grammar_lexer::{tokenize, LexError};
//!
//! let source = "rule: 'unterminated";
//! match tokenize(source) {
//!     Err(err @ LexError::UnterminatedLiteral { .. }) => {
//!         assert_eq!(err.position().column, 7);
//!         let report = err.with_source_context(source);
//!         println!("{}", report);
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```
//!
//! ## Limitations
//!
//! Quoted literals have no escape sequences, so a literal cannot contain its
//! own delimiter; use the other quote style instead (`"it's"`).

pub mod error;
pub mod lexer;
pub mod source;


// Re-export main types and functions
pub use error::{EnhancedError, ErrorContext, LexError, Position, Span};
pub use lexer::{
    GrammarLexer, LexerConfig, ScanRoute, Token, TokenKind, lexer_from_file, lexer_from_reader,
    lexer_from_reader_with_config, tokenize,
};
pub use source::{CharSource, ReaderSource, StrSource};
