use super::*;

#[test]
fn builder_accumulates_parts() {
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message("missing argument label 'b:' in call")
        .with_label(Span::new(3, 5), "missing label")
        .with_secondary_label(Span::new(0, 2), "callee")
        .with_note("labels are part of the parameter list")
        .with_fixit(FixIt::machine_applicable(
            "insert label",
            Substitution::insert(3, "b: "),
        ));

    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(3, 5)));
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.notes.len(), 1);
    assert!(diag.has_machine_applicable_fix());
}

#[test]
fn primary_span_skips_secondary_labels() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_secondary_label(Span::new(0, 1), "here")
        .with_label(Span::new(4, 9), "there");
    assert_eq!(diag.primary_span(), Some(Span::new(4, 9)));
}

#[test]
fn no_primary_span_without_labels() {
    let diag = Diagnostic::error(ErrorCode::E2001).with_message("type mismatch");
    assert_eq!(diag.primary_span(), None);
}

#[test]
fn substitution_shapes() {
    let insert = Substitution::insert(7, "!");
    assert!(insert.is_insertion());
    assert!(!insert.is_removal());

    let remove = Substitution::remove(Span::new(3, 4));
    assert!(remove.is_removal());
    assert!(!remove.is_insertion());
}

#[test]
fn edits_flatten_all_fixits() {
    let diag = Diagnostic::error(ErrorCode::E2008)
        .with_fixit(
            FixIt::maybe_incorrect("compare against nil", Substitution::insert(5, "("))
                .with_edit(Substitution::insert(6, " != nil)")),
        )
        .with_fixit(FixIt::maybe_incorrect("x", Substitution::remove(Span::new(1, 2))));

    let snippets: Vec<&str> = diag.edits().map(|e| e.snippet.as_str()).collect();
    assert_eq!(snippets, vec!["(", " != nil)", ""]);
    assert!(!diag.has_machine_applicable_fix());
}

#[test]
fn display_format() {
    let diag = Diagnostic::error(ErrorCode::E2002)
        .with_message("extra argument in call")
        .with_label(Span::new(10, 11), "extra argument")
        .with_note("call takes 2 arguments");
    let text = diag.to_string();
    assert!(text.starts_with("error [E2002]: extra argument in call"));
    assert!(text.contains("--> 10..11: extra argument"));
    assert!(text.contains("= note: call takes 2 arguments"));
}
