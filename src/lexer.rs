//! Grammar lexical analyzer
//!
//! This module converts grammar-description text into a stream of tokens:
//! identifiers, single-character symbols, quoted literals, `#` line comments,
//! `/* */` block comments and `{ ... }` action blocks. Tokens are produced one
//! per call with no buffering of future tokens.

use crate::error::{LexError, Position, Span};
use crate::source::{CharSource, ReaderSource, StrSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufReader, Read};
use tracing::{debug, trace};

/// Configuration options for the lexer
#[derive(Debug, Clone)]
pub struct LexerConfig {
    /// Maximum length in bytes of a single token's text (unlimited by default)
    pub max_token_length: usize,
    /// Maximum number of tokens before end of stream (unlimited by default)
    pub max_tokens: usize,
    /// Read buffer capacity used by the reader and file constructors
    pub buffer_capacity: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            max_token_length: usize::MAX,
            max_tokens: usize::MAX,
            buffer_capacity: 8 * 1024,
        }
    }
}

/// Grammar token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Rule or symbol name: letter or `_`, then letters, digits, `_`
    Identifier,
    /// One of `: | , ; ( )`
    Symbol,
    /// `'...'` or `"..."`, delimiters included
    QuotedLiteral,
    /// `#` through end of line, terminator included
    LineComment,
    /// `/* ... */`, delimiters included
    BlockComment,
    /// Body of `{ ... }` with the outer braces stripped
    ActionBlock,
    EndOfStream,
}

impl TokenKind {
    /// Returns a string representation of the token type for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Symbol => "symbol",
            TokenKind::QuotedLiteral => "quoted literal",
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::ActionBlock => "action block",
            TokenKind::EndOfStream => "end of stream",
        }
    }

    /// Comments are kept inline in the stream; consumers filter on this
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A scanned token: its kind plus the raw text consumed for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    kind: TokenKind,
    text: String,
    span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, span: Span) -> Self {
        Self { kind, text, span }
    }

    /// Sentinel token with empty text at `position`
    pub fn end_of_stream(position: Position) -> Self {
        Self {
            kind: TokenKind::EndOfStream,
            text: String::new(),
            span: Span::single(position),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Full source range consumed, including an action block's outer braces
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfStream
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Scan routine selected by the leading character of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRoute {
    Identifier,
    Symbol,
    QuotedLiteral(char),
    LineComment,
    BlockComment,
    ActionBlock,
    EndOfStream,
    Unexpected(char),
}

impl ScanRoute {
    /// Picks the scan routine for the next significant character
    pub fn classify(lookahead: Option<char>) -> Self {
        match lookahead {
            None => ScanRoute::EndOfStream,
            Some(ch) if is_identifier_start(ch) => ScanRoute::Identifier,
            Some(':' | '|' | ',' | ';' | '(' | ')') => ScanRoute::Symbol,
            Some(quote @ ('\'' | '"')) => ScanRoute::QuotedLiteral(quote),
            Some('#') => ScanRoute::LineComment,
            // Confirmed by the block comment scanner once `*` is seen
            Some('/') => ScanRoute::BlockComment,
            Some('{') => ScanRoute::ActionBlock,
            Some(ch) => ScanRoute::Unexpected(ch),
        }
    }
}

#[inline(always)]
fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

#[inline(always)]
fn is_identifier_continue(ch: char) -> bool {
    ch == '_' || ch.is_ascii_digit() || ch.is_alphabetic()
}

#[inline(always)]
fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Quote state while scanning an action block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteMode {
    None,
    InSingle,
    InDouble,
}

impl QuoteMode {
    fn closing_quote(self) -> Option<char> {
        match self {
            QuoteMode::None => None,
            QuoteMode::InSingle => Some('\''),
            QuoteMode::InDouble => Some('"'),
        }
    }
}

#[derive(Debug)]
enum LexerState {
    Running,
    Ended,
    Failed(LexError),
}

/// Pull-based grammar tokenizer over a character source
pub struct GrammarLexer<S: CharSource> {
    source: S,
    config: LexerConfig,
    state: LexerState,
    /// Tokens produced so far, excluding the end-of-stream sentinel
    token_count: usize,
}

impl<'a> GrammarLexer<StrSource<'a>> {
    /// Creates a new lexer over a string with default configuration
    pub fn new(input: &'a str) -> Self {
        Self::from_source(StrSource::new(input), LexerConfig::default())
    }

    /// Creates a new lexer over a string with custom configuration
    pub fn with_config(input: &'a str, config: LexerConfig) -> Self {
        Self::from_source(StrSource::new(input), config)
    }
}

impl<S: CharSource> GrammarLexer<S> {
    pub fn from_source(source: S, config: LexerConfig) -> Self {
        Self {
            source,
            config,
            state: LexerState::Running,
            token_count: 0,
        }
    }

    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    /// Consumes the lexer, returning its character source
    pub fn into_source(self) -> S {
        self.source
    }

    /// Position of the next unread character
    pub fn position(&self) -> Position {
        self.source.position()
    }

    /// Returns the number of tokens produced so far
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// True once end of stream was reached or a scan failed
    pub fn is_finished(&self) -> bool {
        !matches!(self.state, LexerState::Running)
    }

    /// Returns the next token from the input
    ///
    /// After end of stream every call returns another end-of-stream token.
    /// After a failure every call returns the same error again.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        match &self.state {
            LexerState::Running => {}
            LexerState::Ended => return Ok(Token::end_of_stream(self.source.position())),
            LexerState::Failed(err) => return Err(err.clone()),
        }

        match self.scan_token() {
            Ok(token) => {
                if token.is_eof() {
                    debug!(tokens = self.token_count, "reached end of stream");
                    self.state = LexerState::Ended;
                } else {
                    self.token_count += 1;
                    trace!(kind = %token.kind, span = %token.span, "scanned token");
                }
                Ok(token)
            }
            Err(err) => {
                debug!(error = %err, tokens = self.token_count, "scan failed");
                self.state = LexerState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace()?;

        let start = self.source.position();
        let route = ScanRoute::classify(self.source.peek()?);
        if route != ScanRoute::EndOfStream {
            self.check_token_limit(start)?;
        }

        match route {
            ScanRoute::EndOfStream => Ok(Token::end_of_stream(start)),
            ScanRoute::Identifier => self.lex_identifier(start),
            ScanRoute::Symbol => self.lex_symbol(start),
            ScanRoute::QuotedLiteral(quote) => self.lex_quoted_literal(quote, start),
            ScanRoute::LineComment => self.lex_line_comment(start),
            ScanRoute::BlockComment => self.lex_block_comment(start),
            ScanRoute::ActionBlock => self.lex_action_block(start),
            ScanRoute::Unexpected(character) => Err(LexError::UnexpectedCharacter {
                character,
                position: start,
            }),
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), LexError> {
        while let Some(ch) = self.source.peek()? {
            if !is_whitespace(ch) {
                break;
            }
            self.source.advance()?;
        }
        Ok(())
    }

    #[inline(always)]
    fn check_token_limit(&self, position: Position) -> Result<(), LexError> {
        if self.token_count >= self.config.max_tokens {
            return Err(LexError::TokenLimitExceeded {
                limit: self.config.max_tokens,
                position,
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn push_checked(&self, text: &mut String, ch: char, start: Position) -> Result<(), LexError> {
        text.push(ch);
        if text.len() > self.config.max_token_length {
            return Err(LexError::TokenTooLong {
                limit: self.config.max_token_length,
                position: start,
            });
        }
        Ok(())
    }

    /// Advances one character and appends it to `text`
    fn consume_into(&mut self, text: &mut String, start: Position) -> Result<Option<char>, LexError> {
        let ch = self.source.advance()?;
        if let Some(ch) = ch {
            self.push_checked(text, ch, start)?;
        }
        Ok(ch)
    }

    fn finish(&self, kind: TokenKind, text: String, start: Position) -> Token {
        Token::new(kind, text, Span::new(start, self.source.position()))
    }

    fn lex_identifier(&mut self, start: Position) -> Result<Token, LexError> {
        let mut text = String::new();
        while let Some(ch) = self.source.peek()? {
            if !is_identifier_continue(ch) {
                break;
            }
            self.consume_into(&mut text, start)?;
        }
        Ok(self.finish(TokenKind::Identifier, text, start))
    }

    fn lex_symbol(&mut self, start: Position) -> Result<Token, LexError> {
        let mut text = String::with_capacity(1);
        self.consume_into(&mut text, start)?;
        Ok(self.finish(TokenKind::Symbol, text, start))
    }

    /// No escapes: the literal ends at the first raw occurrence of `quote`
    fn lex_quoted_literal(&mut self, quote: char, start: Position) -> Result<Token, LexError> {
        let mut text = String::new();
        self.consume_into(&mut text, start)?;

        loop {
            match self.consume_into(&mut text, start)? {
                Some(ch) if ch == quote => break,
                Some(_) => {}
                None => {
                    return Err(LexError::UnterminatedLiteral {
                        quote,
                        position: start,
                    });
                }
            }
        }

        Ok(self.finish(TokenKind::QuotedLiteral, text, start))
    }

    fn lex_line_comment(&mut self, start: Position) -> Result<Token, LexError> {
        let mut text = String::new();
        self.consume_into(&mut text, start)?;

        while let Some(ch) = self.consume_into(&mut text, start)? {
            if ch == '\n' {
                break;
            }
        }

        Ok(self.finish(TokenKind::LineComment, text, start))
    }

    /// Block comments do not nest: the first `*/` closes
    fn lex_block_comment(&mut self, start: Position) -> Result<Token, LexError> {
        let mut text = String::new();
        self.consume_into(&mut text, start)?;

        if self.source.peek()? != Some('*') {
            return Err(LexError::UnexpectedCharacter {
                character: '/',
                position: start,
            });
        }
        self.consume_into(&mut text, start)?;

        let mut after_star = false;
        loop {
            match self.consume_into(&mut text, start)? {
                Some('/') if after_star => break,
                Some(ch) => after_star = ch == '*',
                None => return Err(LexError::UnterminatedComment { position: start }),
            }
        }

        Ok(self.finish(TokenKind::BlockComment, text, start))
    }

    /// Scans `{ ... }` keeping nested braces and quoted substrings verbatim.
    /// Braces inside quotes do not count towards the depth.
    fn lex_action_block(&mut self, start: Position) -> Result<Token, LexError> {
        // Opening brace is not part of the text
        self.source.advance()?;

        let mut text = String::new();
        let mut depth: usize = 1;
        let mut quote_mode = QuoteMode::None;

        loop {
            let Some(ch) = self.source.advance()? else {
                return Err(LexError::UnterminatedAction {
                    depth,
                    position: start,
                });
            };

            match quote_mode.closing_quote() {
                Some(closing) => {
                    if ch == closing {
                        quote_mode = QuoteMode::None;
                    }
                }
                None => match ch {
                    '\'' => quote_mode = QuoteMode::InSingle,
                    '"' => quote_mode = QuoteMode::InDouble,
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                },
            }

            self.push_checked(&mut text, ch, start)?;
        }

        Ok(self.finish(TokenKind::ActionBlock, text, start))
    }
}

impl<S: CharSource> Iterator for GrammarLexer<S> {
    type Item = Result<Token, LexError>;

    /// Yields tokens up to but excluding end of stream; stops after an error
    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.is_eof() => None,
            result => Some(result),
        }
    }
}

impl<S: CharSource> std::iter::FusedIterator for GrammarLexer<S> {}

/// Tokenizes a whole string, excluding the end-of-stream sentinel
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    GrammarLexer::new(input).collect()
}

/// Creates a lexer from a Read trait object
pub fn lexer_from_reader<R: Read>(reader: R) -> GrammarLexer<ReaderSource<BufReader<R>>> {
    lexer_from_reader_with_config(reader, LexerConfig::default())
}

/// Creates a lexer from a Read trait object with custom configuration
pub fn lexer_from_reader_with_config<R: Read>(
    reader: R,
    config: LexerConfig,
) -> GrammarLexer<ReaderSource<BufReader<R>>> {
    let capacity = config.buffer_capacity.max(1024); // Minimum 1KB buffer
    let source = ReaderSource::new(BufReader::with_capacity(capacity, reader));
    GrammarLexer::from_source(source, config)
}

/// Creates a lexer from a file path
pub fn lexer_from_file<P: AsRef<std::path::Path>>(
    path: P,
) -> io::Result<GrammarLexer<ReaderSource<BufReader<std::fs::File>>>> {
    let file = std::fs::File::open(path)?;
    Ok(lexer_from_reader(file))
}
