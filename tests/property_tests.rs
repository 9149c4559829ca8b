//! Property-based tests for the grammar lexer.
//!
//! These tests use proptest to check that:
//! 1. Termination: every input ends in end of stream or an error, within a
//!    bounded number of calls (each call consumes at least one character).
//! 2. Reconstruction: for input that lexes, token spans tile the source with
//!    only whitespace between them, and token text matches the spanned source.
//! 3. Streaming agrees with in-memory lexing.

use grammar_lexer::{GrammarLexer, TokenKind, lexer_from_reader, tokenize};
use proptest::prelude::*;
use std::io::Cursor;

/// Characters that exercise every scan routine and every error path.
fn grammar_char_strategy() -> impl Strategy<Value = char> {
    prop_oneof![
        Just('a'),
        Just('Z'),
        Just('_'),
        Just('7'),
        Just(':'),
        Just('|'),
        Just(';'),
        Just('('),
        Just(')'),
        Just(','),
        Just('\''),
        Just('"'),
        Just('#'),
        Just('/'),
        Just('*'),
        Just('{'),
        Just('}'),
        Just(' '),
        Just('\n'),
        Just('\t'),
        Just('λ'),
        Just('$'),
    ]
}

fn grammar_text_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(grammar_char_strategy(), 0..64)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Well-formed grammar fragments built from valid pieces.
fn valid_piece_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z_][a-z0-9_]{0,8}").expect("valid regex"),
        prop::string::string_regex("[:|,;()]").expect("valid regex"),
        prop::string::string_regex("'[a-z \"{}]{0,6}'").expect("valid regex"),
        prop::string::string_regex("\"[a-z '{}]{0,6}\"").expect("valid regex"),
        prop::string::string_regex("#[a-z #]{0,8}\n").expect("valid regex"),
        prop::string::string_regex("/\\*[a-z \n/]{0,8}\\*/").expect("valid regex"),
        prop::string::string_regex("\\{[a-z =;]{0,4}(\\{[a-z ]{0,3}\\})?('[{]')?\\}")
            .expect("valid regex"),
    ]
}

fn valid_grammar_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(valid_piece_strategy(), 0..16).prop_map(|pieces| pieces.join(" "))
}

proptest! {
    #[test]
    fn lexing_always_terminates(input in grammar_text_strategy()) {
        let mut lexer = GrammarLexer::new(&input);
        let max_calls = input.chars().count() + 1;
        let mut finished = false;

        for _ in 0..max_calls {
            match lexer.next_token() {
                Ok(token) if token.is_eof() => {
                    finished = true;
                    break;
                }
                Ok(token) => prop_assert!(!token.text().is_empty() || token.kind() == TokenKind::ActionBlock),
                Err(_) => {
                    finished = true;
                    break;
                }
            }
        }

        prop_assert!(finished, "lexer did not finish within {} calls for {:?}", max_calls, input);
        prop_assert!(lexer.is_finished());
    }

    #[test]
    fn finished_lexer_stays_finished(input in grammar_text_strategy()) {
        let mut lexer = GrammarLexer::new(&input);
        let first_end = loop {
            match lexer.next_token() {
                Ok(token) if token.is_eof() => break Ok(()),
                Ok(_) => {}
                Err(err) => break Err(err.to_string()),
            }
        };

        for _ in 0..3 {
            match (&first_end, lexer.next_token()) {
                (Ok(()), Ok(token)) => prop_assert!(token.is_eof()),
                (Err(message), Err(err)) => prop_assert_eq!(message, &err.to_string()),
                (expected, got) => prop_assert!(false, "expected {:?}, got {:?}", expected, got),
            }
        }
    }

    #[test]
    fn spans_reconstruct_source(input in valid_grammar_strategy()) {
        let tokens = tokenize(&input).expect("valid fragments should lex");
        let mut cursor = 0;

        for token in &tokens {
            let range = token.span().range();
            prop_assert!(input[cursor..range.start].chars().all(char::is_whitespace));

            let raw = &input[range.clone()];
            if token.kind() == TokenKind::ActionBlock {
                prop_assert_eq!(raw, format!("{{{}}}", token.text()));
            } else {
                prop_assert_eq!(raw, token.text());
            }
            cursor = range.end;
        }

        prop_assert!(input[cursor..].chars().all(char::is_whitespace));
    }

    #[test]
    fn reader_agrees_with_string(input in grammar_text_strategy()) {
        let from_str: Vec<_> = GrammarLexer::new(&input)
            .map(|r| r.map_err(|e| e.to_string()))
            .collect();
        let from_reader: Vec<_> = lexer_from_reader(Cursor::new(input.clone().into_bytes()))
            .map(|r| r.map_err(|e| e.to_string()))
            .collect();
        prop_assert_eq!(from_str, from_reader);
    }
}
