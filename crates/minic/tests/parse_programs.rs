//! End-to-end runs of the lexer and parser over whole programs

use minic::ast::dump;
use minic::driver::run_source;
use minic::{NodeKind, TokenKind};
use pretty_assertions::assert_eq;

const FIBONACCI: &str = include_str!("../../../demos/fibonacci.c");

#[test]
fn fibonacci_demo_parses_cleanly() {
    let outcome = run_source(FIBONACCI);
    assert!(outcome.is_clean(), "{:?}", outcome.errors().collect::<Vec<_>>());
    assert_eq!(outcome.summary(), "Parsing successful!");

    let root = outcome.root();
    let kinds: Vec<_> = root.children.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Declaration,
            NodeKind::FunctionDefinition,
            NodeKind::FunctionDefinition,
            NodeKind::FunctionDefinition,
        ]
    );
    assert_eq!(root.find_all(NodeKind::IterationStatement).len(), 1);
    assert_eq!(root.find_all(NodeKind::ConditionalExpression).len(), 1);
    assert_eq!(root.find_all(NodeKind::CastExpression).len(), 1);
    assert_eq!(root.find_all(NodeKind::FunctionCall).len(), 6);
}

#[test]
fn full_tree_dump() {
    let source = "\
int total;
int add(int a, int b) {
    total += a * (b - 1);
    while (a) a--;
    return a;
}
";
    let outcome = run_source(source);
    assert!(outcome.is_clean());
    assert_eq!(
        dump(outcome.root()),
        "\
translation_unit
  declaration
    type_specifier: int
    init_declarator_list
      init_declarator
        declarator: total
  function_definition
    type_specifier: int
    declarator: add
      parameter_list
        parameter_declaration: a
          type_specifier: int
        parameter_declaration: b
          type_specifier: int
    compound_statement
      expression_statement
        assignment_expression: +=
          primary_expression: total
          multiplicative_expression: *
            primary_expression: a
            additive_expression: -
              primary_expression: b
              primary_expression: 1
      iteration_statement: while
        primary_expression: a
        expression_statement
          postfix_expression: --
            primary_expression: a
      jump_statement: return
        primary_expression: a
"
    );
}

#[test]
fn token_stream_ends_with_single_eof() {
    let outcome = run_source(FIBONACCI);
    let tokens = &outcome.lexed.tokens;
    let eofs = tokens.iter().filter(|t| t.is(TokenKind::Eof)).count();
    assert_eq!(eofs, 1);
    assert!(tokens.last().is_some_and(|t| t.is(TokenKind::Eof)));
}

#[test]
fn string_and_comment_positions() {
    let outcome = run_source("// header\nstring s = \"two\nlines\"; int y;");
    assert!(outcome.is_clean());
    let y = outcome
        .lexed
        .tokens
        .iter()
        .find(|t| t.lexeme == "y")
        .expect("y token");
    assert_eq!((y.line, y.column), (3, 13));
}

#[test]
fn unexpected_top_level_token_fails() {
    let outcome = run_source("int x;\nreturn 0;");
    assert!(!outcome.parsed.consumed);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(outcome.summary(), "Parsing failed! Unexpected token: return");
    let stopped = outcome.parsed.stopped_at.as_ref().expect("stop token");
    assert_eq!((stopped.line, stopped.column), (2, 1));
}

#[test]
fn unterminated_string_ends_input() {
    let outcome = run_source("int main() { puts(\"oops); }");
    assert_eq!(outcome.lexed.errors.len(), 1);
    assert!(outcome.lexed.errors[0].message().contains("unterminated"));
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn diagnostics_render_with_location() {
    let mut reporter = minic::DiagnosticReporter::new();
    let source = "int main() { x = ; }";
    let file_id = reporter.add_file("bad.c", source);
    let outcome = run_source(source);
    let error = outcome.errors().next().expect("one error");
    let rendered = reporter.render_to_string(file_id, error);
    assert!(rendered.contains("bad.c:1:18"), "{rendered}");
    assert!(rendered.contains("Syntax error"));
}

/// Run the pipeline on a thread whose stack matches a typical main thread
fn run_on_main_sized_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(8 << 20)
        .spawn(f)
        .expect("spawn pipeline thread")
        .join()
        .expect("pipeline thread panicked")
}

#[test]
fn long_flat_expression_parses_and_drops() {
    let (clean, depth) = run_on_main_sized_stack(|| {
        let source = format!("int main() {{ x = 1{}; }}", "+1".repeat(200_000));
        let outcome = run_source(&source);
        (outcome.is_clean(), outcome.root().depth())
    });
    assert!(clean);
    // translation_unit, function, block, statement, assignment, then the chain
    assert_eq!(depth, 5 + 200_000 + 1);
}

#[test]
fn deeply_nested_parentheses_fail_without_crashing() {
    let (code, too_deep) = run_on_main_sized_stack(|| {
        let depth = 5_000;
        let source = format!("int main() {{ x = {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
        let outcome = run_source(&source);
        let too_deep = outcome.errors().any(|e| e.message() == "nesting too deep");
        (outcome.exit_code(), too_deep)
    });
    assert_eq!(code, 1);
    assert!(too_deep);
}
