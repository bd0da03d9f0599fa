//! Source-like spelling of types for diagnostics.

use std::fmt::{self, Write as _};

use sift_ir::StringInterner;

use super::{Param, Type};

/// Writes a [`Type`] the way a user would: `(Int, Float) -> Int`, `[Int]?`,
/// `(c: Int, i: A)`. Unresolved variables print as `_`.
pub struct TypeDisplay<'a> {
    ty: &'a Type,
    interner: &'a StringInterner,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(ty: &'a Type, interner: &'a StringInterner) -> Self {
        TypeDisplay { ty, interner }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self.ty, self.interner)
    }
}

/// Writes a parameter list with its labels: `(a: Int, b: inout Int)`.
///
/// Used where the labels matter to the reader, such as overload notes.
pub struct ParamListDisplay<'a> {
    params: &'a [Param],
    interner: &'a StringInterner,
}

impl<'a> ParamListDisplay<'a> {
    pub fn new(params: &'a [Param], interner: &'a StringInterner) -> Self {
        ParamListDisplay { params, interner }
    }
}

impl fmt::Display for ParamListDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if let Some(label) = param.label {
                write!(f, "{}: ", self.interner.lookup(label))?;
            }
            if param.inout {
                f.write_str("inout ")?;
            }
            write_type(f, &param.ty, self.interner)?;
        }
        f.write_char(')')
    }
}

fn write_type(f: &mut fmt::Formatter<'_>, ty: &Type, interner: &StringInterner) -> fmt::Result {
    match ty {
        Type::Primitive(p) => f.write_str(p.name()),
        Type::Tuple(elems) => {
            f.write_char('(')?;
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                if let Some(label) = elem.label {
                    write!(f, "{}: ", interner.lookup(label))?;
                }
                write_type(f, &elem.ty, interner)?;
            }
            f.write_char(')')
        }
        Type::Function { params, result } => {
            f.write_char('(')?;
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                if param.inout {
                    f.write_str("inout ")?;
                }
                write_type(f, &param.ty, interner)?;
            }
            f.write_str(") -> ")?;
            write_type(f, result, interner)
        }
        Type::Optional(inner) => {
            write_postfix_operand(f, inner, interner)?;
            f.write_char('?')
        }
        Type::Metatype(inner) => {
            write_postfix_operand(f, inner, interner)?;
            f.write_str(".Type")
        }
        Type::Nominal { name, args } => {
            let spelled = interner.lookup(*name);
            if spelled == "Array" && args.len() == 1 {
                f.write_char('[')?;
                write_type(f, &args[0], interner)?;
                return f.write_char(']');
            }
            f.write_str(spelled)?;
            if !args.is_empty() {
                f.write_char('<')?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_type(f, arg, interner)?;
                }
                f.write_char('>')?;
            }
            Ok(())
        }
        Type::Var(_) => f.write_char('_'),
        Type::Param(name) => f.write_str(interner.lookup(*name)),
        Type::Error => f.write_str("<<error type>>"),
    }
}

/// Function types need parentheses before `?` and `.Type`.
fn write_postfix_operand(
    f: &mut fmt::Formatter<'_>,
    ty: &Type,
    interner: &StringInterner,
) -> fmt::Result {
    if ty.is_function() {
        f.write_char('(')?;
        write_type(f, ty, interner)?;
        f.write_char(')')
    } else {
        write_type(f, ty, interner)
    }
}
