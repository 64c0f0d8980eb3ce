/// Evaluation context for the register machine
///
/// A [`Machine`] owns everything an evaluator mutates: the register file, the
/// continuation stack and the base environment. Separate machines share no
/// state, so several sessions can run side by side (tests do this).
///
/// The evaluator itself lives outside this crate. It drives a machine by
/// reading and writing registers, saving registers before a nested
/// evaluation and restoring them afterwards.
use std::fmt;

use tracing::{debug, trace};

use crate::environment::Environment;
use crate::lexer::tokenize;
use crate::parser::{parse_with_limit, ParseResult, MAX_PARSE_DEPTH};
use crate::stack::{ContinuationStack, StackStats};
use crate::value::{Label, Value};

/// Names of the evaluator registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Expression being evaluated
    Expr,
    /// Result of the last evaluation
    Val,
    /// Current environment
    Env,
    /// Label to continue at when the current evaluation finishes
    Cont,
    /// Operator of the application being built
    Func,
    /// Evaluated operands accumulated so far
    Arglist,
    /// Operands not yet evaluated
    Unev,
}

impl Register {
    pub const ALL: [Register; 7] = [
        Register::Expr,
        Register::Val,
        Register::Env,
        Register::Cont,
        Register::Func,
        Register::Arglist,
        Register::Unev,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Register::Expr => "EXPR",
            Register::Val => "VAL",
            Register::Env => "ENV",
            Register::Cont => "CONT",
            Register::Func => "FUNC",
            Register::Arglist => "ARGLIST",
            Register::Unev => "UNEV",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The register file.
#[derive(Debug, Clone)]
pub struct Registers {
    pub expr: Value,
    pub val: Value,
    pub env: Value,
    pub cont: Value,
    pub func: Value,
    pub arglist: Value,
    pub unev: Value,
}

impl Registers {
    /// Fresh registers: `env` holds `env`, `cont` holds [`Label::Done`] and
    /// everything else is uninitialized.
    pub fn new(env: &Environment) -> Self {
        Registers {
            expr: Value::Uninitialized,
            val: Value::Uninitialized,
            env: Value::Env(env.clone()),
            cont: Value::Label(Label::Done),
            func: Value::Uninitialized,
            arglist: Value::Uninitialized,
            unev: Value::Uninitialized,
        }
    }

    pub fn get(&self, register: Register) -> &Value {
        match register {
            Register::Expr => &self.expr,
            Register::Val => &self.val,
            Register::Env => &self.env,
            Register::Cont => &self.cont,
            Register::Func => &self.func,
            Register::Arglist => &self.arglist,
            Register::Unev => &self.unev,
        }
    }

    pub fn get_mut(&mut self, register: Register) -> &mut Value {
        match register {
            Register::Expr => &mut self.expr,
            Register::Val => &mut self.val,
            Register::Env => &mut self.env,
            Register::Cont => &mut self.cont,
            Register::Func => &mut self.func,
            Register::Arglist => &mut self.arglist,
            Register::Unev => &mut self.unev,
        }
    }

    /// Store `value` in `register`, returning the previous contents.
    pub fn set(&mut self, register: Register, value: Value) -> Value {
        std::mem::replace(self.get_mut(register), value)
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for register in Register::ALL {
            writeln!(f, "-- {} --", register)?;
            writeln!(f, "{}", self.get(register))?;
        }
        Ok(())
    }
}

/// A register machine session.
pub struct Machine {
    base_env: Environment,
    stack: ContinuationStack,
    registers: Registers,
    max_parse_depth: usize,
}

impl Machine {
    pub fn new() -> Self {
        let base_env = Environment::base();
        let registers = Registers::new(&base_env);
        debug!(target: "reglisp::machine", "Created machine");
        Machine {
            base_env,
            stack: ContinuationStack::new(),
            registers,
            max_parse_depth: MAX_PARSE_DEPTH,
        }
    }

    /// Set the nesting limit used by [`Machine::read`].
    pub fn with_max_parse_depth(mut self, max_depth: usize) -> Self {
        self.max_parse_depth = max_depth;
        self
    }

    /// The root environment of this session. Created once, kept for the
    /// machine's lifetime.
    pub fn base_env(&self) -> &Environment {
        &self.base_env
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn get(&self, register: Register) -> &Value {
        self.registers.get(register)
    }

    pub fn set(&mut self, register: Register, value: Value) -> Value {
        self.registers.set(register, value)
    }

    pub fn stack(&self) -> &ContinuationStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut ContinuationStack {
        &mut self.stack
    }

    pub fn stats(&self) -> StackStats {
        self.stack.stats()
    }

    /// Push the current contents of `register`.
    pub fn save(&mut self, register: Register) {
        trace!(target: "reglisp::machine", %register, "save register");
        let value = self.registers.get(register).clone();
        self.stack.save(value);
    }

    /// Pop the top of the stack into `register`.
    ///
    /// Returns `false`, leaving the register untouched, if the stack is empty.
    pub fn restore(&mut self, register: Register) -> bool {
        trace!(target: "reglisp::machine", %register, "restore register");
        match self.stack.restore() {
            Some(value) => {
                self.registers.set(register, value);
                true
            }
            None => false,
        }
    }

    /// Parse `source` into the `expr` register.
    ///
    /// On error the registers are left as they were.
    pub fn read(&mut self, source: &str) -> ParseResult<&Value> {
        let expr = parse_with_limit(tokenize(source), self.max_parse_depth)?;
        debug!(target: "reglisp::machine", %expr, "Read expression");
        self.registers.expr = expr;
        Ok(&self.registers.expr)
    }

    /// Empty the stack, zero its statistics and reinitialise the registers.
    /// The base environment and its bindings are kept.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.stack.reset_stats();
        self.registers = Registers::new(&self.base_env);
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.registers, self.stack)
    }
}
