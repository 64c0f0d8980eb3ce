//! Built-in binary integer operations bound in the base environment.

use std::fmt;

/// Error raised when a primitive cannot produce a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Division with a zero divisor
    DivisionByZero,
    /// Result does not fit in an `i64`
    Overflow { op: &'static str, lhs: i64, rhs: i64 },
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveError::DivisionByZero => write!(f, "Division by zero"),
            PrimitiveError::Overflow { op, lhs, rhs } => {
                write!(f, "Integer overflow in ({} {} {})", op, lhs, rhs)
            }
        }
    }
}

impl std::error::Error for PrimitiveError {}

type PrimitiveFn = fn(i64, i64) -> Result<i64, PrimitiveError>;

/// A named built-in procedure of two integers.
#[derive(Clone, Copy)]
pub struct Primitive {
    name: &'static str,
    op: PrimitiveFn,
}

impl Primitive {
    pub const ADD: Primitive = Primitive { name: "+", op: add };
    pub const SUB: Primitive = Primitive { name: "-", op: sub };
    pub const MUL: Primitive = Primitive { name: "*", op: mul };
    pub const DIV: Primitive = Primitive { name: "/", op: div };
    pub const EQ: Primitive = Primitive { name: "=", op: eq };

    /// Every primitive, in the order the base environment binds them.
    pub const ALL: [Primitive; 5] = [
        Primitive::ADD,
        Primitive::SUB,
        Primitive::MUL,
        Primitive::DIV,
        Primitive::EQ,
    ];

    /// The name this primitive is bound to in the base environment.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, lhs: i64, rhs: i64) -> Result<i64, PrimitiveError> {
        (self.op)(lhs, rhs)
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Primitive({})", self.name)
    }
}

fn add(lhs: i64, rhs: i64) -> Result<i64, PrimitiveError> {
    lhs.checked_add(rhs)
        .ok_or(PrimitiveError::Overflow { op: "+", lhs, rhs })
}

fn sub(lhs: i64, rhs: i64) -> Result<i64, PrimitiveError> {
    lhs.checked_sub(rhs)
        .ok_or(PrimitiveError::Overflow { op: "-", lhs, rhs })
}

fn mul(lhs: i64, rhs: i64) -> Result<i64, PrimitiveError> {
    lhs.checked_mul(rhs)
        .ok_or(PrimitiveError::Overflow { op: "*", lhs, rhs })
}

// Truncates toward zero.
fn div(lhs: i64, rhs: i64) -> Result<i64, PrimitiveError> {
    if rhs == 0 {
        return Err(PrimitiveError::DivisionByZero);
    }
    lhs.checked_div(rhs)
        .ok_or(PrimitiveError::Overflow { op: "/", lhs, rhs })
}

fn eq(lhs: i64, rhs: i64) -> Result<i64, PrimitiveError> {
    Ok(if lhs == rhs { 1 } else { 0 })
}
