//! Performance tests for grammar lexing
//!
//! These tests verify that the lexer scales linearly with input size and that
//! deeply nested action blocks do not blow up.

use grammar_lexer::{GrammarLexer, TokenKind, lexer_from_reader, tokenize};
use std::io::Cursor;
use std::time::Instant;

fn generate_grammar(rules: usize) -> String {
    let mut grammar = String::new();
    for i in 0..rules {
        grammar.push_str(&format!(
            "# rule {i}\nr{i}: a{i} 'lit {i}' b{i} {{ x = {{ y: \"}}\" }}; }}\n    | /* alt */ c{i} ;\n",
            i = i
        ));
    }
    grammar
}

#[test]
fn test_large_grammar_performance() {
    let grammar = generate_grammar(5_000);

    let start = Instant::now();
    let tokens = tokenize(&grammar).expect("generated grammar should lex");
    let duration = start.elapsed();

    println!(
        "Lexed {} bytes into {} tokens in {:?}",
        grammar.len(),
        tokens.len(),
        duration
    );

    // 11 tokens per rule: comment, r, :, a, lit, b, action, |, comment, c, ;
    assert_eq!(tokens.len(), 5_000 * 11);
    assert!(
        duration.as_secs() < 5,
        "Lexing a ~400KB grammar should take well under 5s"
    );
}

#[test]
fn test_streaming_large_grammar() {
    let grammar = generate_grammar(2_000);
    let lexer = lexer_from_reader(Cursor::new(grammar.as_bytes()));

    let mut actions = 0;
    for token in lexer {
        if token.expect("should lex").kind() == TokenKind::ActionBlock {
            actions += 1;
        }
    }
    assert_eq!(actions, 2_000);
}

#[test]
fn test_deeply_nested_action_block() {
    let depth = 10_000;
    let input = format!("{}{}", "{".repeat(depth), "}".repeat(depth));

    let start = Instant::now();
    let mut lexer = GrammarLexer::new(&input);
    let token = lexer.next_token().expect("balanced braces should lex");
    let duration = start.elapsed();

    assert_eq!(token.kind(), TokenKind::ActionBlock);
    assert_eq!(token.text().len(), 2 * (depth - 1));
    assert!(lexer.next_token().unwrap().is_eof());
    assert!(duration.as_secs() < 2, "Nested braces must scan in linear time");
}

#[test]
fn test_long_unterminated_literal_fails_fast() {
    let input = format!("'{}", "x".repeat(200_000));

    let start = Instant::now();
    let result = tokenize(&input);
    let duration = start.elapsed();

    assert!(result.is_err());
    assert!(duration.as_secs() < 2);
}
