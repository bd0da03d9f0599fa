use super::*;
use crate::{ErrorCode, FixIt, Substitution};

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2007)
        .with_message("value of optional type 'Wibble?' must be unwrapped to refer to member 'wobble' of wrapped base type 'Wibble'")
        .with_label(Span::new(6, 14), "optional value")
        .with_note("chain the optional using '?' to access member 'wobble' only for non-'nil' base values")
        .with_fixit(FixIt::machine_applicable(
            "chain the optional using '?'",
            Substitution::insert(14, "?"),
        ))
}

fn render(mode: ColorMode, source: Option<&SourceFile>) -> String {
    let mut output = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, mode, false);
        if let Some(src) = source {
            emitter = emitter.with_source(src);
        }
        emitter.emit(&sample_diagnostic());
        emitter.flush();
    }
    String::from_utf8(output).unwrap()
}

#[test]
fn test_terminal_emitter_no_color() {
    let text = render(ColorMode::Never, None);
    assert!(text.starts_with("error[E2007]: value of optional type"));
    assert!(text.contains("--> 6..14: optional value"));
    assert!(text.contains("= note: chain the optional"));
    assert!(text.contains("= fix: chain the optional using '?'"));
    assert!(!text.contains("\x1b["));
}

#[test]
fn test_terminal_emitter_with_color() {
    let text = render(ColorMode::Always, None);
    assert!(text.contains("\x1b[1;31m"));
    assert!(text.contains("\x1b[0m"));
}

#[test]
fn test_terminal_emitter_with_source() {
    let src = SourceFile::new("opt.swift", "_ = i.wibble.wobble");
    let text = render(ColorMode::Never, Some(&src));
    assert!(text.contains("--> opt.swift:1:7: optional value"));
    assert!(text.contains("= fix: chain the optional using '?' {{15-15=?}}"));
}

#[test]
fn test_color_mode_resolution() {
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
}

#[test]
fn test_summary() {
    let mut output = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false);
        emitter.emit_summary(2, 1);
        emitter.emit_summary(0, 0);
    }
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text, "type checking failed: 2 errors, 1 warning\n");
}
