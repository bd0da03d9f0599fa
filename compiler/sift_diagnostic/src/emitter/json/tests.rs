use super::*;
use crate::{ErrorCode, FixIt, Substitution};
use sift_ir::Span;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message("incorrect argument label in call (have 'c:', expected 'b:')")
        .with_label(Span::new(5, 6), "incorrect label")
        .with_note("labels are matched in order")
        .with_fixit(FixIt::machine_applicable(
            "replace 'c' with 'b'",
            Substitution::new(Span::new(5, 6), "b"),
        ))
}

fn render(diagnostics: &[Diagnostic], source: Option<&SourceFile>) -> String {
    let mut output = Vec::new();
    {
        let mut emitter = JsonEmitter::new(&mut output);
        if let Some(src) = source {
            emitter = emitter.with_source(src);
        }
        emitter.begin();
        emitter.emit_all(diagnostics);
        emitter.end();
        emitter.flush();
    }
    String::from_utf8(output).unwrap()
}

#[test]
fn test_json_emitter() {
    let text = render(&[sample_diagnostic()], None);
    assert!(text.contains("\"code\": \"E2003\""));
    assert!(text.contains("\"severity\": \"error\""));
    assert!(text.contains("(have 'c:', expected 'b:')"));
    assert!(text.contains("\"applicability\": \"MachineApplicable\""));
    assert!(text.contains("\"text\": \"b\""));
    assert!(!text.contains("\"line\""));
}

#[test]
fn test_json_emitter_multiple() {
    let diag1 = Diagnostic::error(ErrorCode::E2001).with_message("error 1");
    let diag2 = Diagnostic::warning(ErrorCode::E2006).with_message("warning 1");
    let text = render(&[diag1, diag2], None);
    assert_eq!(text.matches("\"code\"").count(), 2);
    assert!(text.contains("},\n  {"));
}

#[test]
fn test_json_emitter_with_source_positions() {
    let src = SourceFile::new("labels.swift", "f(a: 1, c: 2)");
    let text = render(&[sample_diagnostic()], Some(&src));
    assert!(text.contains("\"line\": 1,"));
    assert!(text.contains("\"column\": 6,"));
}

#[test]
fn test_json_escapes_messages() {
    let diag = Diagnostic::error(ErrorCode::E2001).with_message("quote \" here");
    let text = render(&[diag], None);
    assert!(text.contains("quote \\\" here"));
}

#[test]
fn test_escaped_control_characters() {
    assert_eq!(Escaped("cannot convert 'Int'").to_string(), "cannot convert 'Int'");
    assert_eq!(Escaped("line1\nline2").to_string(), "line1\\nline2");
    assert_eq!(Escaped("path\\file").to_string(), "path\\\\file");
    assert_eq!(Escaped("\u{1}").to_string(), "\\u0001");
}

#[test]
fn test_separator() {
    assert_eq!(separator(0, 2), ",");
    assert_eq!(separator(1, 2), "");
}
