/// RegLisp - reader, environments and continuation stack for a register-machine Lisp
///
/// This library is the front end and scoping substrate of a small Lisp
/// interpreter whose evaluator runs as an explicit register machine instead
/// of recursing on the native call stack.
///
/// # Architecture
///
/// 1. **Reading** (`lexer`, `parser`)
///    - A two-state automaton splits source text into `(`, `)` and symbol tokens
///    - The parser rebuilds the nesting by balance counting and produces a
///      single [`Value`]: a number, a name, or a list of values
///
/// 2. **Scoping** (`environment`)
///    - Frames of bindings chained to their enclosing environment
///    - `lookup`, `define_var`, `set_var` and `extend` implement lexical scope
///    - The base environment binds the integer primitives `+ - * / =`
///
/// 3. **Control** (`stack`, `machine`)
///    - A LIFO continuation stack of saved values with usage statistics
///    - A [`Machine`] bundling the registers, the stack and the base
///      environment into one evaluation context
///
/// # Example
///
/// ```rust
/// use reglisp::{Machine, Register, Value};
///
/// let mut machine = Machine::new();
/// machine.read("(+ 1 (* 2 3))").unwrap();
/// assert_eq!(machine.get(Register::Expr).to_string(), "(+ 1 (* 2 3))");
///
/// let env = machine.base_env().clone();
/// env.define_var("x", Value::Number(42));
/// assert_eq!(env.lookup("x"), Some(Value::Number(42)));
///
/// machine.save(Register::Expr);
/// machine.restore(Register::Val);
/// assert_eq!(machine.stats().max_depth, 1);
/// ```

pub mod config;
pub mod environment;
pub mod lexer;
pub mod list;
pub mod machine;
pub mod parser;
pub mod primitives;
pub mod stack;
pub mod value;

pub use config::{Config, ConfigError};
pub use environment::{EnvError, EnvResult, Environment, Frame};
pub use lexer::{tokenize, Token, TokenKind};
pub use list::List;
pub use machine::{Machine, Register, Registers};
pub use parser::{parse, parse_with_limit, read, ParseError, ParseResult, MAX_PARSE_DEPTH};
pub use primitives::{Primitive, PrimitiveError};
pub use stack::{ContinuationStack, StackStats};
pub use value::{Label, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_bind() {
        let expr = read("(define x 3)").unwrap();
        let items = expr.as_list().unwrap();
        assert_eq!(items.len(), 3);

        let env = Environment::base();
        let name = items.get(1).and_then(Value::as_name).unwrap();
        env.define_var(name, items.get(2).unwrap().clone());
        assert_eq!(env.lookup("x"), Some(Value::Number(3)));
    }

    #[test]
    fn test_apply_primitive_from_base_env() {
        let env = Environment::base();
        match env.lookup("*") {
            Some(Value::Primitive(prim)) => assert_eq!(prim.apply(6, 7), Ok(42)),
            other => panic!("expected primitive, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_syntax() {
        assert!(read("(+ 1").is_err());
    }
}
