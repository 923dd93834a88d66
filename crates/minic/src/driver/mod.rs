//! Compilation driver and pipeline orchestration

use std::fmt::Write as _;

use crate::ast::{self, Node};
use crate::common::{CompileError, DiagnosticReporter};
use crate::lexer::{Lexed, Lexer, Token};
use crate::parser::{ParseOutput, Parser};

/// Options controlling what the pipeline prints along the way
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverConfig {
    /// Dump tokens after lexing
    pub dump_tokens: bool,
    /// Dump the tree after parsing
    pub dump_ast: bool,
    /// Report each phase on stderr
    pub verbose: bool,
}

/// Everything one run of the pipeline produced
#[derive(Debug)]
pub struct Outcome {
    pub lexed: Lexed,
    pub parsed: ParseOutput,
}

impl Outcome {
    pub fn root(&self) -> &Node {
        &self.parsed.root
    }

    /// Lexer diagnostics followed by parser diagnostics
    pub fn errors(&self) -> impl Iterator<Item = &CompileError> {
        self.lexed.errors.iter().chain(&self.parsed.errors)
    }

    pub fn error_count(&self) -> usize {
        self.lexed.errors.len() + self.parsed.errors.len()
    }

    /// No diagnostics anywhere and every token consumed
    pub fn is_clean(&self) -> bool {
        !self.lexed.has_errors() && self.parsed.errors.is_empty() && self.parsed.is_success()
    }

    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_clean())
    }

    /// The one-line verdict printed at the end of a run
    pub fn summary(&self) -> String {
        if self.is_clean() {
            return "Parsing successful!".to_string();
        }
        match &self.parsed.stopped_at {
            Some(token) => format!("Parsing failed! Unexpected token: {}", token.lexeme),
            None => format!("Parsing failed! {} error(s) reported", self.error_count()),
        }
    }
}

/// One line per token, in the `Token: <code>, Lexeme: ...` format
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut output = String::new();
    for token in tokens {
        let _ = writeln!(output, "{token}");
    }
    output
}

/// Lex and parse one source buffer
pub struct Pipeline<'r> {
    config: DriverConfig,
    reporter: &'r DiagnosticReporter,
    file_id: usize,
}

impl<'r> Pipeline<'r> {
    /// `file_id` must come from `reporter.add_file` for the same source
    pub fn new(config: DriverConfig, reporter: &'r DiagnosticReporter, file_id: usize) -> Self {
        Self {
            config,
            reporter,
            file_id,
        }
    }

    /// Run both phases, reporting every diagnostic through the reporter.
    /// Parsing always runs, even after lexer errors.
    pub fn run(&self, source: &str) -> Outcome {
        if self.config.verbose {
            eprintln!("Lexing...");
        }
        let lexed = Lexer::new(source).tokenize_all();
        if self.config.verbose {
            eprintln!("  {} tokens, {} lexer error(s)", lexed.tokens.len(), lexed.errors.len());
        }

        if self.config.dump_tokens {
            eprintln!("=== Tokens ===");
            eprint!("{}", dump_tokens(&lexed.tokens));
            eprintln!("=== End Tokens ===\n");
        }

        if self.config.verbose {
            eprintln!("Parsing...");
        }
        let parsed = Parser::new(&lexed.tokens).parse_all();
        if self.config.verbose {
            eprintln!(
                "  {} nodes, {} syntax error(s), fully consumed: {}",
                parsed.root.count_nodes(),
                parsed.errors.len(),
                parsed.consumed,
            );
        }

        if self.config.dump_ast {
            eprintln!("=== AST ===");
            eprint!("{}", ast::dump(&parsed.root));
            eprintln!("=== End AST ===\n");
        }

        self.reporter.report_all(self.file_id, &lexed.errors);
        self.reporter.report_all(self.file_id, &parsed.errors);
        Outcome { lexed, parsed }
    }
}

/// Run the pipeline without printing anything
pub fn run_source(source: &str) -> Outcome {
    let lexed = Lexer::new(source).tokenize_all();
    let parsed = Parser::new(&lexed.tokens).parse_all();
    Outcome { lexed, parsed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codespan_reporting::term::termcolor::ColorChoice;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_run() {
        let outcome = run_source("int main() { return 0; }");
        assert!(outcome.is_clean());
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.summary(), "Parsing successful!");
    }

    #[test]
    fn test_stopped_parse_names_token() {
        let outcome = run_source("int x; 42");
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(outcome.summary(), "Parsing failed! Unexpected token: 42");
    }

    #[test]
    fn test_lexer_error_fails_consumed_parse() {
        let outcome = run_source("int x; @");
        assert!(outcome.parsed.is_success());
        assert!(!outcome.is_clean());
        assert_eq!(outcome.summary(), "Parsing failed! 1 error(s) reported");
    }

    #[test]
    fn test_recovered_syntax_error_fails() {
        let outcome = run_source("int main() { x = ; }");
        assert!(outcome.parsed.is_success());
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_dump_tokens_format() {
        let lexed = crate::lexer::scan("x;");
        assert_eq!(
            dump_tokens(&lexed.tokens),
            format!(
                "Token: {}, Lexeme: x, Line: 1, Column: 1\n\
                 Token: {}, Lexeme: ;, Line: 1, Column: 2\n\
                 Token: {}, Lexeme: EOF, Line: 1, Column: 3\n",
                crate::lexer::TokenKind::Identifier.code(),
                crate::lexer::TokenKind::Semi.code(),
                crate::lexer::TokenKind::Eof.code(),
            )
        );
    }

    #[test]
    fn test_pipeline_reports_through_reporter() {
        let mut reporter = DiagnosticReporter::with_color(ColorChoice::Never);
        let source = "int main() { return 0; }";
        let file_id = reporter.add_file("ok.c", source);
        let outcome = Pipeline::new(DriverConfig::default(), &reporter, file_id).run(source);
        assert!(outcome.is_clean());
        assert_eq!(outcome.root().children.len(), 1);
    }
}
