use grammar_lexer::{GrammarLexer, TokenKind};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"# Arithmetic expressions
/* precedence is encoded
   by rule layering */
expr: expr '+' term { $$ = add($1, $3); }
    | term
    ;
term: term "*" factor { $$ = mul($1, $3); }
    | factor
    ;
factor: '(' expr ')'
      | NUMBER { $$ = num(text("}")); }
"#;

fn main() {
    // RUST_LOG=grammar_lexer=trace shows every scanned token
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let source = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => SAMPLE.to_string(),
    };

    let lexer = GrammarLexer::new(&source);

    let mut rules = 0;
    let mut actions = 0;
    let mut comments = 0;

    for result in lexer {
        let token = match result {
            Ok(token) => token,
            Err(e) => {
                eprintln!("{}", e.with_source_context(&source));
                std::process::exit(1);
            }
        };

        match token.kind() {
            TokenKind::Symbol if token.text() == ":" => rules += 1,
            TokenKind::ActionBlock => actions += 1,
            kind if kind.is_trivia() => comments += 1,
            _ => {}
        }

        println!(
            "{:>8} {:<15} {:?}",
            token.span().start.to_string(),
            token.kind().type_name(),
            token.text()
        );
    }

    println!();
    println!(
        "{} rule(s), {} action block(s), {} comment(s)",
        rules, actions, comments
    );
}
