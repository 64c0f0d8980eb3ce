/// The tagged value shared by the reader, the environment and the evaluator
///
/// Every datum that flows through the front end and the register machine is a
/// [`Value`]: parsed source, bound variable values, register contents and
/// saved continuation-stack entries all use the same representation.
use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::list::List;
use crate::primitives::Primitive;

/// Universal expression/runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Integer literal or arithmetic result
    Number(i64),
    /// Symbol text (variable names, keywords, operators)
    Name(Rc<str>),
    /// Nested expression or runtime list
    List(List),
    /// Built-in binary integer operation
    Primitive(Primitive),
    /// Reference to an environment (closures, the `env` register)
    Env(Environment),
    /// Evaluator continuation label
    Label(Label),
    /// Stands for "name not bound anywhere in the chain"
    Unbound,
    /// Initial contents of every register before it is first written
    Uninitialized,
}

impl Value {
    pub fn name(text: &str) -> Self {
        Value::Name(Rc::from(text))
    }

    /// Symbol text, if this is a `Name`.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::Name(text) => Some(&**text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_env(&self) -> Option<&Environment> {
        match self {
            Value::Env(env) => Some(env),
            _ => None,
        }
    }

    /// Atoms are numbers and names.
    pub fn is_atom(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Name(_))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Name(_) => "name",
            Value::List(_) => "list",
            Value::Primitive(_) => "primitive",
            Value::Env(_) => "environment",
            Value::Label(_) => "label",
            Value::Unbound => "unbound",
            Value::Uninitialized => "uninitialized",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Name(a), Value::Name(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Primitive(a), Value::Primitive(b)) => a == b,
            (Value::Env(a), Value::Env(b)) => a.same_as(b),
            (Value::Label(a), Value::Label(b)) => a == b,
            (Value::Unbound, Value::Unbound) => true,
            (Value::Uninitialized, Value::Uninitialized) => true,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<List> for Value {
    fn from(list: List) -> Self {
        Value::List(list)
    }
}

impl From<Label> for Value {
    fn from(label: Label) -> Self {
        Value::Label(label)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Name(text) => write!(f, "{}", text),
            Value::List(list) => write!(f, "{}", list),
            Value::Primitive(prim) => write!(f, "#<primitive {}>", prim.name()),
            Value::Env(_) => write!(f, "#<environment>"),
            Value::Label(label) => write!(f, "{}", label),
            Value::Unbound => write!(f, "#<unbound>"),
            Value::Uninitialized => write!(f, "***"),
        }
    }
}

/// Continuation labels of the register-machine evaluator.
///
/// The evaluator saves one of these in the `cont` register before starting a
/// nested evaluation and dispatches on it when the nested evaluation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Done,
    IfDecide,
    DidAssignValue,
    DidDefineValue,
    DidFunc,
    AccumulateArg,
    DidLastArg,
    SequenceContinue,
    AlternateSequenceContinue,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Done => "DONE",
            Label::IfDecide => "IF_DECIDE",
            Label::DidAssignValue => "DID_ASS_VAL",
            Label::DidDefineValue => "DID_DEF_VAL",
            Label::DidFunc => "DID_FUNC",
            Label::AccumulateArg => "ACC_ARG",
            Label::DidLastArg => "DID_LAST_ARG",
            Label::SequenceContinue => "SEQ_CONT",
            Label::AlternateSequenceContinue => "ALT_SEQ_CONT",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
