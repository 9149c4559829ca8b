//! Error types and position tracking for grammar scanning
//!
//! This module provides the error enum produced by the scanner together with
//! position information and source-snippet diagnostics for user feedback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Advances the position by one character
    ///
    /// Only `\n` starts a new line. A `\r` counts as an ordinary column, so
    /// `\r\n` is one line break and a lone `\r` is not a line break at all.
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            _ => {
                self.column += 1;
            }
        }
        self.offset += c.len_utf8();
    }

    /// Advances the position by multiple characters
    pub fn advance_by(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Range of source consumed for one token, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start position of the span
    pub start: Position,
    /// End position of the span
    pub end: Position,
}

impl Span {
    /// Creates a new span from start and end positions
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a span covering a single position
    pub fn single(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Returns the length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Returns true if the span is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte range of the span, for slicing the original source
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Lexical analysis errors
///
/// Every error is terminal for the scan that produced it. The lexer keeps the
/// first error and hands back a clone on each later call.
#[derive(Debug, Clone, Error)]
pub enum LexError {
    /// Quoted literal reached end of input before its closing quote
    #[error("Unterminated {quote}-quoted literal starting at {position}")]
    UnterminatedLiteral { quote: char, position: Position },

    /// Block comment reached end of input before `*/`
    #[error("Unterminated block comment starting at {position}")]
    UnterminatedComment { position: Position },

    /// Action block reached end of input with unbalanced braces
    #[error("Unterminated action block starting at {position} ({depth} unclosed brace(s))")]
    UnterminatedAction { depth: usize, position: Position },

    /// Character that cannot start any token
    #[error("Unexpected character '{character}' at {position}")]
    UnexpectedCharacter { character: char, position: Position },

    /// Read failure or malformed UTF-8 in the underlying source
    #[error("IO error at {position}: {source}")]
    Io {
        #[source]
        source: Arc<io::Error>,
        position: Position,
    },

    /// Single token grew past the configured limit
    #[error("Token starting at {position} exceeds maximum length of {limit} bytes")]
    TokenTooLong { limit: usize, position: Position },

    /// Iterator produced more tokens than the configured limit
    #[error("Token limit exceeded at {position}: {limit} tokens")]
    TokenLimitExceeded { limit: usize, position: Position },
}

impl LexError {
    /// Wraps an I/O error raised at `position`
    pub fn io(source: io::Error, position: Position) -> Self {
        LexError::Io {
            source: Arc::new(source),
            position,
        }
    }

    /// Position the error refers to
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedLiteral { position, .. }
            | LexError::UnterminatedComment { position }
            | LexError::UnterminatedAction { position, .. }
            | LexError::UnexpectedCharacter { position, .. }
            | LexError::Io { position, .. }
            | LexError::TokenTooLong { position, .. }
            | LexError::TokenLimitExceeded { position, .. } => *position,
        }
    }

    /// Returns true when the failure came from the source rather than the text
    pub fn is_io(&self) -> bool {
        matches!(self, LexError::Io { .. })
    }

    /// Generate suggestions for lexical errors
    pub fn suggest_fix(&self) -> Vec<String> {
        match self {
            LexError::UnterminatedLiteral { quote, .. } => vec![
                format!("Close the literal with a matching {}", quote),
                format!(
                    "Literals cannot contain their own delimiter; use the other quote style to embed {}",
                    quote
                ),
            ],
            LexError::UnterminatedComment { .. } => {
                vec!["Close the block comment with */".to_string()]
            }
            LexError::UnterminatedAction { depth, .. } => vec![format!(
                "Add {} closing brace(s) to balance the action block",
                depth
            )],
            LexError::UnexpectedCharacter { character: '/', .. } => {
                vec!["A lone '/' is not a token; block comments start with /*".to_string()]
            }
            LexError::UnexpectedCharacter { character, .. } => vec![format!(
                "Quote the character as a literal: '{}'",
                character
            )],
            LexError::Io { source, .. } if source.kind() == io::ErrorKind::InvalidData => {
                vec!["Ensure the input is valid UTF-8".to_string()]
            }
            _ => vec![],
        }
    }

    /// Enhances this error with context information from source text
    pub fn with_source_context(self, source: &str) -> EnhancedError {
        let position = self.position();
        let context = match &self {
            LexError::UnexpectedCharacter { character, .. } => {
                ErrorContext::for_token(source.to_string(), position, &character.to_string())
            }
            _ => ErrorContext::new(source.to_string(), Span::single(position)),
        }
        .with_suggestions(self.suggest_fix());

        let context = match &self {
            LexError::UnterminatedLiteral { .. } => context
                .with_help("Quoted literals have no escape sequences and may span lines".to_string()),
            LexError::UnterminatedAction { .. } => context.with_help(
                "Braces inside quoted substrings do not count towards action block nesting"
                    .to_string(),
            ),
            _ => context,
        };

        EnhancedError::new(self).with_context(context)
    }
}

/// Context information for enhanced error reporting
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The original source text
    pub source: String,
    /// The span where the error occurred
    pub span: Span,
    /// Suggested fixes for the error
    pub suggestions: Vec<String>,
    /// Additional help text
    pub help: Option<String>,
}

impl ErrorContext {
    /// Creates a new error context
    pub fn new(source: String, span: Span) -> Self {
        Self {
            source,
            span,
            suggestions: Vec::new(),
            help: None,
        }
    }

    /// Creates an error context for a specific token
    pub fn for_token(source: String, position: Position, token_text: &str) -> Self {
        let mut end = position;
        end.advance_by(token_text);
        Self::new(source, Span::new(position, end))
    }

    /// Adds multiple suggestions at once
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions.extend(suggestions);
        self
    }

    /// Adds help text for the error
    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Extracts the source code snippet around the error
    pub fn source_snippet(&self) -> String {
        self.extract_lines_around_span(2)
    }

    /// Extracts lines around the error span with context
    pub fn extract_lines_around_span(&self, context_lines: usize) -> String {
        let lines: Vec<&str> = self.source.lines().collect();
        if lines.is_empty() {
            return String::new();
        }

        let start_line = self
            .span
            .start
            .line
            .saturating_sub(1)
            .min(lines.len() - 1);
        let end_line = (self.span.end.line.saturating_sub(1)).min(lines.len() - 1);
        // Errors at end of input may sit on a line `lines()` does not yield
        let caret_line = start_line + 1;

        let context_start = start_line.saturating_sub(context_lines);
        let context_end = (end_line + context_lines + 1).min(lines.len());

        let mut result = String::new();
        let line_number_width = context_end.to_string().len();

        for (i, line) in lines[context_start..context_end].iter().enumerate() {
            let line_num = context_start + i + 1;
            result.push_str(&format!(
                "{:width$} | {}\n",
                line_num,
                line,
                width = line_number_width
            ));

            if line_num == caret_line {
                let clamped = caret_line != self.span.start.line;
                let column = if clamped {
                    line.chars().count() + 1
                } else {
                    self.span.start.column
                };
                let spaces = " ".repeat(line_number_width + 3 + column.saturating_sub(1));
                let length = if clamped {
                    1
                } else if self.span.start.line == self.span.end.line {
                    self.span.end.column.saturating_sub(self.span.start.column)
                } else {
                    line.chars()
                        .count()
                        .saturating_sub(self.span.start.column.saturating_sub(1))
                };
                result.push_str(&format!("{}{}  <-- Error here\n", spaces, "^".repeat(length.max(1))));
            }
        }

        result
    }

    /// Formats the error context for display
    pub fn format_error(&self, error_message: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Error at {}: {}\n\n",
            self.span.start, error_message
        ));
        output.push_str(&self.source_snippet());

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(help) = &self.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

/// Enhanced error with context information
#[derive(Debug)]
pub struct EnhancedError {
    pub error: LexError,
    pub context: Option<ErrorContext>,
}

impl EnhancedError {
    /// Creates a new enhanced error
    pub fn new(error: LexError) -> Self {
        Self {
            error,
            context: None,
        }
    }

    /// Adds context to the error
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Formats the error with context if available
    pub fn format(&self) -> String {
        let base_message = self.error.to_string();
        if let Some(ctx) = &self.context {
            ctx.format_error(&base_message)
        } else {
            base_message
        }
    }
}

impl fmt::Display for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl std::error::Error for EnhancedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
