use minilang::{
    ast::{AtomKind, Literal, Program, StmtKind},
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    lexer::tokenize,
    parser::{parse, parse_program, MAX_NESTING_DEPTH},
};

fn program(source: &str) -> Program {
    parse_program(source).expect("parse should succeed")
}

fn parse_error(source: &str) -> Diagnostic {
    match parse_program(source) {
        Ok(program) => panic!("expected parse error, received {program:?}"),
        Err(diag) => diag,
    }
}

#[test]
fn second_token_assign_makes_declaration() {
    let program = program("x := 1 2 +");
    assert_eq!(program.statements.len(), 1);
    match &program.statements[0].kind {
        StmtKind::Decl(decl) => {
            assert_eq!(decl.name.name, "x");
            assert_eq!(decl.expr.atoms.len(), 3);
            assert_eq!(program.statements[0].span, SourceSpan::new(0, 10));
        }
        other => panic!("expected declaration, found {other:?}"),
    }
}

#[test]
fn plain_line_is_expression() {
    let program = program("1 2 +");
    match &program.statements[0].kind {
        StmtKind::Expr(expr) => {
            assert!(matches!(expr.atoms[0].kind, AtomKind::Literal(Literal::Int(1))));
            assert!(matches!(&expr.atoms[2].kind, AtomKind::Identifier(name) if name == "+"));
        }
        other => panic!("expected expression, found {other:?}"),
    }
}

#[test]
fn declaration_may_bind_empty_expression() {
    let program = program("nothing :=");
    match &program.statements[0].kind {
        StmtKind::Decl(decl) => assert!(decl.expr.is_empty()),
        other => panic!("expected declaration, found {other:?}"),
    }
}

#[test]
fn brackets_build_quotations_and_list_blocks() {
    let program = program("[1 [2] {3}]");
    let StmtKind::Expr(expr) = &program.statements[0].kind else {
        panic!("expected expression");
    };
    let AtomKind::Quotation(inner) = &expr.atoms[0].kind else {
        panic!("expected quotation");
    };
    assert_eq!(inner.atoms.len(), 3);
    assert!(matches!(inner.atoms[1].kind, AtomKind::Quotation(_)));
    assert!(matches!(inner.atoms[2].kind, AtomKind::ListBlock(_)));
    assert_eq!(expr.atoms[0].span, SourceSpan::new(0, 11));
}

#[test]
fn newlines_separate_statements_and_blank_lines_vanish() {
    let program = program("1\n\n\nx := 2\n3\n");
    assert_eq!(program.statements.len(), 3);
    assert!(matches!(program.statements[1].kind, StmtKind::Decl(_)));
}

#[test]
fn parse_accepts_token_sequence() {
    let tokens = tokenize("a := b").expect("tokenize");
    let program = parse(tokens).expect("parse");
    assert_eq!(program.statements.len(), 1);
    assert!(parse(Vec::new()).expect("empty parse").statements.is_empty());
}

#[test]
fn display_reproduces_source_form() {
    let source = "sq := dup *\n3 [sq] \\ {1 2.5 \"s\\n\"}";
    assert_eq!(program(source).to_string(), source);
}

#[test]
fn large_floats_display_without_exponent() {
    let source = "100000000000000000000.0 0.0000001 2.0";
    assert_eq!(program(source).to_string(), source);
}

#[test]
fn nesting_up_to_the_ceiling_parses() {
    let source = format!(
        "{}{}",
        "[".repeat(MAX_NESTING_DEPTH),
        "]".repeat(MAX_NESTING_DEPTH)
    );
    assert_eq!(program(&source).statements.len(), 1);
}

#[test]
fn deeply_nested_brackets_are_rejected() {
    let source = format!("{}{}", "{".repeat(10_000), "}".repeat(10_000));
    let diag = parse_error(&source);
    assert_eq!(diag.kind, DiagnosticKind::Parse);
    assert_eq!(diag.message, "brackets nested too deeply");
    assert_eq!(
        diag.span,
        Some(SourceSpan::new(MAX_NESTING_DEPTH, MAX_NESTING_DEPTH + 1))
    );
}

#[test]
fn mismatched_brackets_are_rejected() {
    let diag = parse_error("[1 2}");
    assert_eq!(diag.kind, DiagnosticKind::Parse);
    assert_eq!(diag.message, "mismatched brackets: `[` closed by `}`");
    assert_eq!(diag.span, Some(SourceSpan::new(0, 5)));
}

#[test]
fn missing_close_bracket_reports_end_of_input() {
    let diag = parse_error("[1 2");
    assert_eq!(diag.kind, DiagnosticKind::Parse);
    assert_eq!(diag.message, "unexpected end of input, expected `]`");
    assert_eq!(diag.span, Some(SourceSpan::point(4)));
    assert_eq!(diag.notes, vec!["`[` opened at 0..1".to_string()]);
}

#[test]
fn newline_inside_brackets_ends_the_expression() {
    let diag = parse_error("{1\n2}");
    assert_eq!(diag.message, "expected `}` but found newline");
}

#[test]
fn stray_close_bracket_is_rejected() {
    let diag = parse_error("1\n] 2");
    assert_eq!(diag.message, "unexpected `]` without an opening bracket");
    let diag = parse_error("1 ] 2");
    assert_eq!(diag.message, "unexpected `]` without an opening bracket");
}

#[test]
fn parentheses_are_not_supported() {
    let diag = parse_error("(1 2)");
    assert_eq!(diag.message, "parenthesised groups are not supported");
}

#[test]
fn declaration_head_must_be_identifier() {
    let diag = parse_error("1 := 2");
    assert_eq!(
        diag.message,
        "expected a name at the start of a declaration, found literal `1`"
    );
}

#[test]
fn assign_in_expression_position_is_rejected() {
    let diag = parse_error("x y := 1");
    assert!(diag.message.starts_with("unexpected `:=`"));
    assert_eq!(diag.span, Some(SourceSpan::new(4, 6)));
}

#[test]
fn lexical_errors_pass_through_parse_program() {
    let diag = parse_error("\"open");
    assert_eq!(diag.kind, DiagnosticKind::Lexical);
}
