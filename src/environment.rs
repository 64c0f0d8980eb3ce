/// Lexically scoped variable environments
///
/// An [`Environment`] is a frame of bindings plus an optional enclosing
/// environment. Name resolution walks from the innermost frame outwards, so a
/// lambda body sees its parameters first, then the bindings of the
/// environment the lambda was defined in, and finally the base environment
/// with the primitives.
///
/// Frames are linked chains. New bindings are prepended and never removed:
/// redefining a name shadows the older entry, which stays in the chain but is
/// no longer reachable by lookup.
///
/// Environments are reference counted and never explicitly freed. A closure
/// stored in the frame it captures forms a cycle and lives for the rest of the
/// process.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::list::List;
use crate::primitives::Primitive;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum EnvError {
    /// `set_var` on a name bound nowhere in the chain
    Unbound(String),
    /// Parameter and argument counts differ in `extend`
    ArityMismatch { expected: usize, got: usize },
    /// A parameter in `extend` is not a name
    NotAName(Value),
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::Unbound(name) => write!(f, "unbound variable: {}", name),
            EnvError::ArityMismatch { expected, got } => {
                write!(f, "expected {} arguments, got {}", expected, got)
            }
            EnvError::NotAName(value) => {
                write!(f, "parameter must be a name, got {} {}", value.type_name(), value)
            }
        }
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

struct Binding {
    key: Rc<str>,
    value: Value,
    next: Option<Box<Binding>>,
}

/// One scope level: a chain of name/value bindings, newest first.
#[derive(Default)]
pub struct Frame {
    head: Option<Box<Binding>>,
    len: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame binding `names[i]` to `values[i]`, keeping input order.
    fn zip(names: Vec<Rc<str>>, values: Vec<Value>) -> Self {
        let mut frame = Frame::new();
        for (key, value) in names.into_iter().zip(values).rev() {
            frame.prepend(key, value);
        }
        frame
    }

    fn prepend(&mut self, key: Rc<str>, value: Value) {
        let next = self.head.take();
        self.head = Some(Box::new(Binding { key, value, next }));
        self.len += 1;
    }

    fn find(&self, name: &str) -> Option<&Value> {
        self.iter().find(|(key, _)| *key == name).map(|(_, value)| value)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Value> {
        let mut cursor = self.head.as_deref_mut();
        while let Some(binding) = cursor {
            if &*binding.key == name {
                return Some(&mut binding.value);
            }
            cursor = binding.next.as_deref_mut();
        }
        None
    }

    /// Number of entries, shadowed ones included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Bindings from newest to oldest, shadowed ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let mut cursor = self.head.as_deref();
        std::iter::from_fn(move || {
            let binding = cursor?;
            cursor = binding.next.as_deref();
            Some((&*binding.key, &binding.value))
        })
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(mut binding) = next {
            next = binding.next.take();
        }
    }
}

struct Scope {
    frame: RefCell<Frame>,
    enclosure: Option<Environment>,
}

/// Handle to one environment in the scope tree. Cloning shares the environment.
#[derive(Clone)]
pub struct Environment(Rc<Scope>);

impl Environment {
    fn with_frame(frame: Frame, enclosure: Option<Environment>) -> Self {
        Environment(Rc::new(Scope {
            frame: RefCell::new(frame),
            enclosure,
        }))
    }

    /// The root environment: `+ - * / =` bound to the integer primitives.
    pub fn base() -> Self {
        let names: Vec<Rc<str>> = Primitive::ALL.iter().map(|p| Rc::from(p.name())).collect();
        let values: Vec<Value> = Primitive::ALL.iter().copied().map(Value::Primitive).collect();
        debug!(target: "reglisp::env", "Created base environment");
        Self::with_frame(Frame::zip(names, values), None)
    }

    /// An environment with an empty frame and no enclosure.
    pub fn empty() -> Self {
        Self::with_frame(Frame::new(), None)
    }

    pub fn enclosure(&self) -> Option<&Environment> {
        self.0.enclosure.as_ref()
    }

    /// Whether both handles refer to the same environment.
    pub fn same_as(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of environments from this one up to the root, inclusive.
    pub fn depth(&self) -> usize {
        std::iter::successors(Some(self), |env| env.enclosure()).count()
    }

    /// Run `f` over this environment's own frame.
    pub fn with_frame_ref<R>(&self, f: impl FnOnce(&Frame) -> R) -> R {
        f(&self.0.frame.borrow())
    }

    /// Resolve `name`, innermost frame first. `None` if no frame binds it.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        trace!(target: "reglisp::env", name, "Looking up");
        let mut env = Some(self);
        while let Some(current) = env {
            if let Some(value) = current.0.frame.borrow().find(name) {
                return Some(value.clone());
            }
            env = current.enclosure();
        }
        debug!(target: "reglisp::env", name, "Name not bound");
        None
    }

    /// Bind `name` in this environment's own frame.
    ///
    /// No existing binding is checked; a second definition shadows the first.
    pub fn define_var(&self, name: &str, value: Value) {
        trace!(target: "reglisp::env", name, %value, "Defining");
        self.0.frame.borrow_mut().prepend(Rc::from(name), value);
    }

    /// Overwrite the nearest existing binding of `name`.
    ///
    /// If no environment in the chain binds `name`, nothing changes and
    /// [`EnvError::Unbound`] is returned after logging a warning. Callers may
    /// ignore the error and carry on.
    pub fn set_var(&self, name: &str, value: Value) -> EnvResult<()> {
        let mut env = Some(self);
        while let Some(current) = env {
            if let Some(slot) = current.0.frame.borrow_mut().find_mut(name) {
                trace!(target: "reglisp::env", name, %value, "Assigning");
                *slot = value;
                return Ok(());
            }
            env = current.enclosure();
        }
        warn!(target: "reglisp::env", name, "unbound variable -- set_var");
        Err(EnvError::Unbound(name.to_string()))
    }

    /// New child environment binding each name in `names` to the value at
    /// the same position in `values`.
    ///
    /// Both lists must have the same length and `names` may only hold names;
    /// otherwise no environment is created.
    pub fn extend(&self, names: &List, values: &List) -> EnvResult<Environment> {
        let keys = names
            .iter()
            .map(|name| match name {
                Value::Name(text) => Ok(text.clone()),
                other => Err(EnvError::NotAName(other.clone())),
            })
            .collect::<EnvResult<Vec<_>>>()?;
        let values: Vec<Value> = values.iter().cloned().collect();

        if keys.len() != values.len() {
            return Err(EnvError::ArityMismatch {
                expected: keys.len(),
                got: values.len(),
            });
        }

        debug!(target: "reglisp::env", bindings = keys.len(), depth = self.depth() + 1, "Extending environment");
        Ok(Self::with_frame(Frame::zip(keys, values), Some(self.clone())))
    }
}

impl fmt::Debug for Environment {
    // Frames may hold this very environment, so only the shape is printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.0.frame.borrow().len())
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> List {
        ns.iter().map(|n| Value::name(n)).collect()
    }

    fn nums(ns: &[i64]) -> List {
        ns.iter().map(|n| Value::Number(*n)).collect()
    }

    #[test]
    fn test_base_env_binds_primitives() {
        let env = Environment::base();
        for prim in Primitive::ALL {
            assert_eq!(env.lookup(prim.name()), Some(Value::Primitive(prim)));
        }
        assert_eq!(env.lookup("car"), None);
        assert!(env.enclosure().is_none());
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn test_define_shadows_by_recency() {
        let env = Environment::empty();
        env.define_var("x", Value::Number(1));
        env.define_var("x", Value::Number(2));
        assert_eq!(env.lookup("x"), Some(Value::Number(2)));
        // The older binding stays in the frame.
        env.with_frame_ref(|frame| assert_eq!(frame.len(), 2));
    }

    #[test]
    fn test_extend_binds_positionally() {
        let base = Environment::base();
        let env = base.extend(&names(&["a", "b"]), &nums(&[1, 2])).unwrap();
        assert_eq!(env.lookup("a"), Some(Value::Number(1)));
        assert_eq!(env.lookup("b"), Some(Value::Number(2)));
        assert_eq!(env.lookup("+"), Some(Value::Primitive(Primitive::ADD)));
        assert_eq!(env.lookup("c"), None);
        assert!(env.enclosure().unwrap().same_as(&base));

        let order: Vec<_> = env.with_frame_ref(|f| f.iter().map(|(k, _)| k.to_string()).collect());
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_extend_arity_mismatch() {
        let base = Environment::base();
        assert_eq!(
            base.extend(&names(&["a", "b"]), &nums(&[1])).unwrap_err(),
            EnvError::ArityMismatch {
                expected: 2,
                got: 1
            }
        );
        assert_eq!(
            base.extend(&names(&["a"]), &nums(&[1, 2])).unwrap_err(),
            EnvError::ArityMismatch {
                expected: 1,
                got: 2
            }
        );
    }

    #[test]
    fn test_extend_rejects_non_name_parameter() {
        let base = Environment::base();
        let err = base.extend(&nums(&[1]), &nums(&[1])).unwrap_err();
        assert_eq!(err, EnvError::NotAName(Value::Number(1)));
    }

    #[test]
    fn test_set_var_mutates_nearest_binding() {
        let outer = Environment::empty();
        outer.define_var("x", Value::Number(1));
        let middle = outer.extend(&names(&["x"]), &nums(&[2])).unwrap();
        let inner = middle.extend(&names(&["y"]), &nums(&[3])).unwrap();

        inner.set_var("x", Value::Number(20)).unwrap();
        assert_eq!(inner.lookup("x"), Some(Value::Number(20)));
        assert_eq!(middle.lookup("x"), Some(Value::Number(20)));
        assert_eq!(outer.lookup("x"), Some(Value::Number(1)));
    }

    #[test]
    fn test_set_var_unbound_changes_nothing() {
        let env = Environment::base();
        let child = env.extend(&names(&["a"]), &nums(&[1])).unwrap();
        assert_eq!(
            child.set_var("nope", Value::Number(5)),
            Err(EnvError::Unbound("nope".to_string()))
        );
        assert_eq!(child.lookup("nope"), None);
        assert_eq!(child.lookup("a"), Some(Value::Number(1)));
    }

    #[test]
    fn test_set_var_updates_newest_shadow_only() {
        let env = Environment::empty();
        env.define_var("x", Value::Number(1));
        env.define_var("x", Value::Number(2));
        env.set_var("x", Value::Number(3)).unwrap();

        let values: Vec<_> = env.with_frame_ref(|f| f.iter().map(|(_, v)| v.clone()).collect());
        assert_eq!(values, vec![Value::Number(3), Value::Number(1)]);
    }

    #[test]
    fn test_define_in_child_does_not_leak_to_parent() {
        let base = Environment::base();
        let child = base.extend(&List::nil(), &List::nil()).unwrap();
        child.define_var("local", Value::Number(9));
        assert_eq!(child.lookup("local"), Some(Value::Number(9)));
        assert_eq!(base.lookup("local"), None);
    }

    #[test]
    fn test_environment_can_hold_itself() {
        let env = Environment::base();
        env.define_var("self", Value::Env(env.clone()));
        let found = env.lookup("self").unwrap();
        assert!(found.as_env().unwrap().same_as(&env));
    }
}
