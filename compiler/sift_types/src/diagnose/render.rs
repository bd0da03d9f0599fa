//! Messages, fix-its and notes for each category.

use sift_diagnostic::{FixIt, Substitution};
use sift_ir::{ExprId, ExprKind, Name, Span};

use super::{call_of, tied_choices, Diagnoser, Draft, FailureCategory, FailurePoint};
use crate::check::Purpose;
use crate::constraint::{Candidate, CallKind, LabelIssue, LiteralKind, LocatorElem};
use crate::error::TypeErrorKind;
use crate::failure::FailureKind;
use crate::solve::Attempt;
use crate::ty::{ParamListDisplay, Param, TupleElem, Type};

impl Diagnoser<'_> {
    pub(super) fn render(
        &self,
        category: FailureCategory,
        point: FailurePoint<'_>,
        attempts: &[Attempt],
    ) -> Draft {
        match category {
            FailureCategory::AmbiguousOverload => {
                if let Some(owner) = self.owner_of(point.failure) {
                    return self.render_ambiguous_failure(owner, point, attempts);
                }
            }
            FailureCategory::MissingMember => {
                if let Some(member) = self.instance_member_on_type(point) {
                    return self.render_instance_member(member, point.attempt);
                }
            }
            _ => {}
        }
        self.render_failure(category.error_kind(), point)
    }

    pub(super) fn generic_mismatch(&self) -> Draft {
        Draft::new(
            TypeErrorKind::TypeMismatch,
            "type mismatch in expression",
            self.arena.span(self.graph.root()),
        )
    }

    fn render_failure(&self, kind: TypeErrorKind, point: FailurePoint<'_>) -> Draft {
        let failure = point.failure;
        let attempt = point.attempt;
        let span = failure.span;
        match &failure.kind {
            FailureKind::Mismatch { from, to } | FailureKind::TupleArity { from, to } => {
                let from = attempt.resolve(from);
                let to = attempt.resolve(to);
                Draft::new(kind, self.conversion_message(point, &from, &to, None), span)
            }
            FailureKind::LiteralMismatch { literal, to, .. } => {
                let from = literal.default_type().unwrap_or(Type::Error);
                let to = attempt.resolve(to);
                let message = self.conversion_message(point, &from, &to, Some(*literal));
                Draft::new(kind, message, span)
            }
            FailureKind::NoConformance { ty, protocol } => {
                self.render_conformance(kind, point, ty, *protocol)
            }

            FailureKind::ExtraArgument {
                label, takes_none, ..
            } => {
                let message = match (takes_none, label) {
                    (true, _) => "argument passed to call that takes no arguments".to_string(),
                    (false, Some(label)) => {
                        format!("extra argument '{}' in call", self.name(*label))
                    }
                    (false, None) => "extra argument in call".to_string(),
                };
                Draft::new(kind, message, span)
            }
            FailureKind::MissingArgument {
                param_index, label, ..
            } => {
                let message = match label {
                    Some(label) => {
                        format!("missing argument for parameter '{}' in call", self.name(*label))
                    }
                    None => format!("missing argument for parameter #{} in call", param_index + 1),
                };
                Draft::new(kind, message, span)
            }
            FailureKind::Label(issue) => self.render_label(kind, issue, span, attempt),
            FailureKind::MissingInOut { ty, insert_at } => Draft::new(
                kind,
                format!(
                    "passing value of type '{}' to an inout parameter requires explicit '&'",
                    self.show(&attempt.resolve(ty))
                ),
                span,
            )
            .with_fixit(FixIt::machine_applicable(
                "insert '&'",
                Substitution::insert(*insert_at, "&"),
            )),
            FailureKind::ExtraInOut { ty, amp } => Draft::new(
                kind,
                format!(
                    "'&' used with non-inout argument of type '{}'",
                    self.show(&attempt.resolve(ty))
                ),
                span,
            )
            .with_fixit(FixIt::machine_applicable("remove '&'", Substitution::remove(*amp))),
            FailureKind::ClosureArity {
                contextual,
                expected,
                used,
            } => {
                let arguments = if *expected == 1 { "argument" } else { "arguments" };
                let message = if used < expected {
                    format!(
                        "contextual type for closure argument list expects {expected} {arguments}, which cannot be implicitly ignored"
                    )
                } else {
                    let were = if *used == 1 { "was" } else { "were" };
                    format!(
                        "contextual closure type '{}' expects {expected} {arguments}, but {used} {were} used in closure body",
                        self.show(&attempt.resolve(contextual))
                    )
                };
                Draft::new(kind, message, span)
            }
            FailureKind::ClosureResultUnresolved => Draft::new(
                kind,
                "unable to infer closure return type in current context",
                span,
            ),
            FailureKind::ClosureParamUnresolved { index } => Draft::new(
                kind,
                format!("unable to infer type of closure parameter '${index}' in current context"),
                span,
            ),
            FailureKind::NotCallable { ty } => Draft::new(
                kind,
                format!(
                    "cannot call value of non-function type '{}'",
                    self.show(&attempt.resolve(ty))
                ),
                span,
            ),

            FailureKind::MissingMember { ty, name, on_type } => {
                let what = if *on_type { "type" } else { "value of type" };
                Draft::new(
                    kind,
                    format!(
                        "{what} '{}' has no member '{}'",
                        self.show(&attempt.resolve(ty)),
                        self.name(*name)
                    ),
                    span,
                )
            }
            FailureKind::NoSubscript { ty } => Draft::new(
                kind,
                format!(
                    "value of type '{}' has no subscripts",
                    self.show(&attempt.resolve(ty))
                ),
                span,
            ),
            FailureKind::MethodAsProperty {
                name,
                is_method,
                insert_at,
            } => {
                let what = if *is_method { "method" } else { "function" };
                Draft::new(
                    kind,
                    format!(
                        "{what} '{}' was used as a property; add () to call it",
                        self.name(*name)
                    ),
                    span,
                )
                .with_fixit(FixIt::machine_applicable(
                    "add '()'",
                    Substitution::insert(*insert_at, "()"),
                ))
            }
            FailureKind::ContextualMemberArgs { name, params } => Draft::new(
                kind,
                format!(
                    "contextual member '{}' expects argument of type '{}'",
                    self.name(*name),
                    ParamListDisplay::new(params, self.env.interner())
                ),
                span,
            ),
            FailureKind::UnresolvedImplicitMember { name } => Draft::new(
                kind,
                format!(
                    "reference to member '{}' cannot be resolved without a contextual type",
                    self.name(*name)
                ),
                span,
            ),
            FailureKind::UnresolvedIdentifier { name } => Draft::new(
                kind,
                format!("use of unresolved identifier '{}'", self.name(*name)),
                span,
            ),
            FailureKind::UnresolvedOperator { op } => Draft::new(
                kind,
                format!("use of unresolved operator '{}'", self.name(*op)),
                span,
            ),
            FailureKind::Unavailable { name, message } => Draft::new(
                kind,
                format!("'{}' is unavailable: {message}", self.name(*name)),
                span,
            ),

            FailureKind::UnwrapRequired {
                optional,
                insert_at,
                suggestion,
            } => Draft::new(
                kind,
                format!(
                    "value of optional type '{}' not unwrapped; did you mean to use '!' or '?'?",
                    self.show(&attempt.resolve(optional))
                ),
                span,
            )
            .with_fixit(FixIt::maybe_incorrect(
                format!("insert '{suggestion}'"),
                Substitution::insert(*insert_at, suggestion.to_string()),
            )),
            FailureKind::ForceUnwrapNonOptional { ty, bang } => Draft::new(
                kind,
                format!(
                    "cannot force unwrap value of non-optional type '{}'",
                    self.show(&attempt.resolve(ty))
                ),
                span,
            )
            .with_fixit(FixIt::machine_applicable("remove '!'", Substitution::remove(*bang))),
            FailureKind::ChainingNonOptional { ty, question } => Draft::new(
                kind,
                format!(
                    "cannot use optional chaining on non-optional value of type '{}'",
                    self.show(&attempt.resolve(ty))
                ),
                span,
            )
            .with_fixit(FixIt::machine_applicable(
                "remove '?'",
                Substitution::remove(*question),
            )),

            FailureKind::CouldNotInfer { param, decl } => Draft::new(
                kind,
                format!("generic parameter '{}' could not be inferred", self.name(*param)),
                span,
            )
            .with_note(format!("in call to function '{}'", self.name(*decl))),
            FailureKind::NilRequiresContext => {
                Draft::new(kind, "'nil' requires a contextual type", span)
            }
            FailureKind::Underdetermined => Draft::new(
                kind,
                "type of expression is ambiguous without more context",
                span,
            ),
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Conversions
    // ════════════════════════════════════════════════════════════════

    /// Wording for `from` not converting to `to`, chosen by where the
    /// conversion came from.
    fn conversion_message(
        &self,
        point: FailurePoint<'_>,
        from: &Type,
        to: &Type,
        literal: Option<LiteralKind>,
    ) -> String {
        let locator = &point.failure.locator;
        let nil = literal == Some(LiteralKind::Nil);
        let (a, b) = (self.show(from), self.show(to));
        match locator.conversion_context() {
            Some(LocatorElem::ApplyArgument { call, .. }) => {
                if let Some(message) = self.operator_message(call, point.attempt) {
                    message
                } else if nil {
                    format!("nil is not compatible with expected argument type '{b}'")
                } else {
                    format!("cannot convert value of type '{a}' to expected argument type '{b}'")
                }
            }
            Some(LocatorElem::ContextualType) => {
                self.contextual_message(point, &a, &b, to, nil)
            }
            Some(LocatorElem::AssignSource) if nil => {
                format!("'nil' cannot be assigned to type '{b}'")
            }
            Some(LocatorElem::AssignSource) => {
                format!("cannot assign value of type '{a}' to type '{b}'")
            }
            Some(LocatorElem::TernaryBranches) => self.ternary_message(point, &a, &b),
            Some(LocatorElem::Condition) => {
                format!("cannot convert value of type '{a}' to expected condition type '{b}'")
            }
            Some(LocatorElem::ArrayElement(_)) => {
                format!("cannot convert value of type '{a}' to expected element type '{b}'")
            }
            Some(LocatorElem::SubscriptIndex) => {
                format!("cannot convert value of type '{a}' to expected argument type '{b}'")
            }
            _ => format!("cannot convert value of type '{a}' to type '{b}'"),
        }
    }

    fn contextual_message(
        &self,
        point: FailurePoint<'_>,
        a: &str,
        b: &str,
        to: &Type,
        nil: bool,
    ) -> String {
        let root = self.graph.root();
        if point.failure.locator.path.as_slice() == [LocatorElem::ContextualType] {
            if let Some(op) = operator_name(self.arena.kind(root)) {
                return format!(
                    "'{}' produces '{a}', not the expected contextual result type '{b}'",
                    self.name(op)
                );
            }
        }
        match self.cx.purpose {
            Purpose::Return if to.is_void() => {
                "unexpected non-void return value in void function".to_string()
            }
            Purpose::Return if nil => format!("'nil' is incompatible with return type '{b}'"),
            Purpose::Return => {
                format!("cannot convert return expression of type '{a}' to return type '{b}'")
            }
            Purpose::Initialization if nil => {
                format!("'nil' cannot initialize specified type '{b}'")
            }
            Purpose::Initialization => {
                format!("cannot convert value of type '{a}' to specified type '{b}'")
            }
            Purpose::Discarded => format!("cannot convert value of type '{a}' to type '{b}'"),
        }
    }

    /// Both branch types as written; falls back to the failing pair when the
    /// anchor is not a ternary.
    fn ternary_message(&self, point: FailurePoint<'_>, a: &str, b: &str) -> String {
        let (then_ty, else_ty) = match self.arena.kind(point.failure.locator.anchor) {
            ExprKind::Ternary {
                then_expr,
                else_expr,
                ..
            } => (
                self.show(&self.written_type(point.attempt, *then_expr)),
                self.show(&self.written_type(point.attempt, *else_expr)),
            ),
            _ => (a.to_string(), b.to_string()),
        };
        format!("result values in '? :' expression have mismatching types '{then_ty}' and '{else_ty}'")
    }

    /// Operand wording for a failed operator application, if `call` is one.
    fn operator_message(&self, call: ExprId, attempt: &Attempt) -> Option<String> {
        match self.arena.kind(call) {
            ExprKind::Binary { op, lhs, rhs, .. } => {
                let lhs = self.show(&self.written_type(attempt, *lhs));
                let rhs = self.show(&self.written_type(attempt, *rhs));
                let op = self.name(*op);
                Some(if lhs == rhs {
                    format!("binary operator '{op}' cannot be applied to two '{lhs}' operands")
                } else {
                    format!(
                        "binary operator '{op}' cannot be applied to operands of type '{lhs}' and '{rhs}'"
                    )
                })
            }
            ExprKind::Unary { op, operand, .. } => Some(format!(
                "unary operator '{}' cannot be applied to an operand of type '{}'",
                self.name(*op),
                self.show(&self.written_type(attempt, *operand))
            )),
            _ => None,
        }
    }

    fn render_conformance(
        &self,
        kind: TypeErrorKind,
        point: FailurePoint<'_>,
        ty: &Type,
        protocol: Name,
    ) -> Draft {
        let shown = self.show(&point.attempt.resolve(ty));
        let protocol = self.name(protocol);
        if let Some(LocatorElem::GenericParam(index)) = point.failure.locator.last() {
            if let Some(span) = self.generic_argument_span(point, index) {
                return Draft::new(
                    kind,
                    format!("argument type '{shown}' does not conform to expected type '{protocol}'"),
                    span,
                );
            }
        }
        Draft::new(
            kind,
            format!("type '{shown}' does not conform to protocol '{protocol}'"),
            point.failure.span,
        )
    }

    /// The argument passed for the `index`th generic parameter of the
    /// declaration chosen at the failure's anchor.
    fn generic_argument_span(&self, point: FailurePoint<'_>, index: u32) -> Option<Span> {
        let owner = point.failure.locator.anchor;
        let candidate = point.attempt.chosen(owner)?;
        let generic = candidate.generics.get(usize::try_from(index).ok()?)?;
        let position = candidate
            .params()?
            .iter()
            .position(|p| p.ty == Type::Param(generic.name))?;
        let call = self.graph.call_of_ref(owner)?;
        let ExprKind::Call { args, .. } = self.arena.kind(call) else {
            return None;
        };
        args.get(position).map(|arg| self.arena.span(arg.value))
    }

    fn render_label(
        &self,
        kind: TypeErrorKind,
        issue: &LabelIssue,
        span: Span,
        attempt: &Attempt,
    ) -> Draft {
        match issue {
            LabelIssue::Missing {
                expected,
                insert_at,
            } => {
                let expected = self.name(*expected);
                Draft::new(
                    kind,
                    format!("missing argument label '{expected}:' in call"),
                    span,
                )
                .with_fixit(FixIt::machine_applicable(
                    format!("insert '{expected}: '"),
                    Substitution::insert(*insert_at, format!("{expected}: ")),
                ))
            }
            LabelIssue::Wrong {
                have,
                expected,
                label_span,
            } => {
                let (have, expected) = (self.name(*have), self.name(*expected));
                Draft::new(
                    kind,
                    format!("incorrect argument label in call (have '{have}:', expected '{expected}:')"),
                    span,
                )
                .with_fixit(FixIt::machine_applicable(
                    format!("replace '{have}' with '{expected}'"),
                    Substitution::new(*label_span, expected),
                ))
            }
            LabelIssue::Extraneous { have, remove } => {
                let have = self.name(*have);
                Draft::new(
                    kind,
                    format!("extraneous argument label '{have}:' in call"),
                    span,
                )
                .with_fixit(FixIt::machine_applicable(
                    format!("remove '{have}:'"),
                    Substitution::remove(*remove),
                ))
            }
            LabelIssue::Tuple { from, to, relabel } => {
                let mut draft = Draft::new(
                    kind,
                    format!(
                        "tuple type '{}' has different element labels than '{}'",
                        self.show(&attempt.resolve(from)),
                        self.show(&attempt.resolve(to))
                    ),
                    span,
                );
                for (label_span, expected) in relabel {
                    let expected = self.name(*expected);
                    draft = draft.with_fixit(FixIt::machine_applicable(
                        format!("rename label to '{expected}'"),
                        Substitution::new(*label_span, expected),
                    ));
                }
                draft
            }
            LabelIssue::Function {
                layer,
                have,
                expected,
            } => {
                let draft = Draft::new(
                    kind,
                    format!(
                        "incorrect argument label in function type (have '{}:', expected '{}:')",
                        self.name(*have),
                        self.name(*expected)
                    ),
                    span,
                );
                if *layer == 0 {
                    draft
                } else {
                    draft.with_note(format!("in curried parameter list #{}", layer + 1))
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Members and overloads
    // ════════════════════════════════════════════════════════════════

    fn render_instance_member(&self, member: ExprId, attempt: &Attempt) -> Draft {
        let ExprKind::Member {
            base,
            name,
            name_span,
        } = self.arena.kind(member)
        else {
            return self.generic_mismatch();
        };
        let base_ty = match self.graph.expr_type(*base).map(|ty| attempt.resolve(ty)) {
            Some(Type::Metatype(inner)) => *inner,
            Some(other) => other,
            None => Type::Error,
        };
        let shown = self.show(&base_ty);
        Draft::new(
            TypeErrorKind::MissingMember,
            format!(
                "use of instance member '{}' on type '{shown}'; did you mean to use a value of type '{shown}' instead?",
                self.name(*name)
            ),
            *name_span,
        )
    }

    /// Tied attempts chose differently at `owner` and none of them works.
    fn render_ambiguous_failure(
        &self,
        owner: ExprId,
        point: FailurePoint<'_>,
        attempts: &[Attempt],
    ) -> Draft {
        let tied = tied_choices(owner, attempts);
        let candidates = point.attempt.candidates(owner).unwrap_or_default();
        let name = tied
            .first()
            .and_then(|&i| candidates.get(i))
            .map_or("", |c| self.name(c.name));

        let call = call_of(point.failure);
        let site = call.and_then(|call| self.graph.call_site(call).map(|site| (call, site)));
        let message = match site {
            Some((call, site)) => match site.kind {
                CallKind::Operator { .. } => self
                    .operator_message(call, point.attempt)
                    .unwrap_or_else(|| format!("ambiguous use of operator '{name}'")),
                CallKind::Method => format!("ambiguous reference to member '{name}'"),
                CallKind::Initializer => format!(
                    "cannot invoke initializer for type '{name}' with an argument list of type '{}'",
                    self.argument_list(call, point.attempt)
                ),
                CallKind::Function => format!(
                    "cannot invoke '{name}' with an argument list of type '{}'",
                    self.argument_list(call, point.attempt)
                ),
            },
            None => format!("ambiguous use of '{name}'"),
        };

        let lists = self.signatures(candidates, &tied);
        Draft::new(
            TypeErrorKind::AmbiguousOverload,
            message,
            self.reference_span(owner),
        )
        .with_note(format!(
            "overloads for '{name}' exist with these partially matching parameter lists: {lists}"
        ))
    }

    /// Several attempts succeed with different choices at `owner`.
    pub(super) fn render_ambiguous_solution(&self, owner: ExprId, attempts: &[Attempt]) -> Draft {
        let tied = tied_choices(owner, attempts);
        let candidates = attempts
            .first()
            .and_then(|attempt| attempt.candidates(owner))
            .unwrap_or_default();
        let name = tied
            .first()
            .and_then(|&i| candidates.get(i))
            .map_or("", |c| self.name(c.name));
        let message = match self.arena.kind(owner) {
            ExprKind::Member { .. } | ExprKind::ImplicitMember { .. } => {
                format!("ambiguous reference to member '{name}'")
            }
            ExprKind::Binary { .. } | ExprKind::Unary { .. } => {
                format!("ambiguous use of operator '{name}'")
            }
            _ => format!("ambiguous use of '{name}'"),
        };
        Draft::new(
            TypeErrorKind::AmbiguousOverload,
            message,
            self.reference_span(owner),
        )
        .with_note(format!(
            "found these candidates: {}",
            self.signatures(candidates, &tied)
        ))
    }

    /// `(label: Type, Type)` for the arguments of `call` as written.
    fn argument_list(&self, call: ExprId, attempt: &Attempt) -> String {
        let ExprKind::Call { args, .. } = self.arena.kind(call) else {
            return "()".to_string();
        };
        let elems = args
            .iter()
            .map(|arg| TupleElem {
                label: arg.label,
                ty: self.written_type(attempt, arg.value),
            })
            .collect();
        self.show(&Type::Tuple(elems))
    }

    fn signatures(&self, candidates: &[Candidate], indices: &[usize]) -> String {
        indices
            .iter()
            .filter_map(|&i| candidates.get(i))
            .map(|candidate| match candidate.params() {
                Some(params) => self.param_list(params),
                None => self.show(&candidate.ty),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    // ════════════════════════════════════════════════════════════════
    // Helpers
    // ════════════════════════════════════════════════════════════════

    /// Type of `expr` as the user wrote it: literals show their default
    /// type rather than whatever a failed attempt forced on them.
    fn written_type(&self, attempt: &Attempt, expr: ExprId) -> Type {
        let literal_default = self
            .graph
            .literals()
            .iter()
            .find(|slot| slot.expr == expr)
            .and_then(|slot| slot.kind.default_type());
        if let Some(ty) = literal_default {
            return ty;
        }
        self.graph
            .expr_type(expr)
            .map_or(Type::Error, |ty| attempt.resolve(ty))
    }

    /// Where to point at a referenced declaration.
    fn reference_span(&self, owner: ExprId) -> Span {
        match self.arena.kind(owner) {
            ExprKind::Member { name_span, .. } => *name_span,
            ExprKind::Binary { op_span, .. } | ExprKind::Unary { op_span, .. } => *op_span,
            _ => self.arena.span(owner),
        }
    }

    fn show(&self, ty: &Type) -> String {
        ty.display(self.env.interner()).to_string()
    }

    fn param_list(&self, params: &[Param]) -> String {
        ParamListDisplay::new(params, self.env.interner()).to_string()
    }

    fn name(&self, name: Name) -> &'static str {
        self.env.interner().lookup(name)
    }
}

fn operator_name(kind: &ExprKind) -> Option<Name> {
    match kind {
        ExprKind::Binary { op, .. } | ExprKind::Unary { op, .. } => Some(*op),
        _ => None,
    }
}
