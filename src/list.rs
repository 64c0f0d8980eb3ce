/// Cons-cell lists shared by the parser, the environment and the evaluator
///
/// A `List` is an immutable chain of cells. Cells are reference counted, so
/// cloning a list (or taking its tail) never copies elements. Lists are only
/// ever built back-to-front from an already collected sequence, which means a
/// cell is fully formed before anything can observe it.
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;

use crate::value::Value;

#[derive(Debug)]
struct Cons {
    head: Value,
    tail: List,
}

/// An ordered, immutable sequence of values: `()` or `(head . tail)`.
#[derive(Clone, Default)]
pub struct List(Option<Rc<Cons>>);

impl List {
    /// The empty list.
    pub fn nil() -> Self {
        List(None)
    }

    /// Prepend `head` to `tail`.
    pub fn cons(head: Value, tail: List) -> Self {
        List(Some(Rc::new(Cons { head, tail })))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// First element, or `None` for the empty list.
    pub fn head(&self) -> Option<&Value> {
        self.0.as_ref().map(|cell| &cell.head)
    }

    /// Everything after the first element. The tail of `()` is `()`.
    pub fn tail(&self) -> List {
        match &self.0 {
            Some(cell) => cell.tail.clone(),
            None => List::nil(),
        }
    }

    /// Number of elements. Walks the chain.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            cell: self.0.as_deref(),
        }
    }

    /// Element at `index`, counting from the head.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.iter().nth(index)
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        items
            .into_iter()
            .rev()
            .fold(List::nil(), |tail, head| List::cons(head, tail))
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        List::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) if Rc::ptr_eq(a, b) => true,
            _ => self.iter().eq(other.iter()),
        }
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.iter().join(" "))
    }
}

/// Head-to-tail iterator over a [`List`].
pub struct Iter<'a> {
    cell: Option<&'a Cons>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.cell?;
        self.cell = cell.tail.0.as_deref();
        Some(&cell.head)
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Drop for List {
    // Iterative: dropping a long chain must not recurse once per cell.
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(cell) = next {
            match Rc::try_unwrap(cell) {
                Ok(mut cons) => next = cons.tail.0.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(ns: &[i64]) -> List {
        ns.iter().map(|n| Value::Number(*n)).collect()
    }

    #[test]
    fn test_nil_is_empty() {
        let list = List::nil();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.head().is_none());
        assert!(list.tail().is_empty());
    }

    #[test]
    fn test_from_vec_preserves_order() {
        let list = nums(&[1, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.head(), Some(&Value::Number(1)));
        assert_eq!(list.get(2), Some(&Value::Number(3)));
        assert_eq!(list.tail(), nums(&[2, 3]));
    }

    #[test]
    fn test_cons_shares_tail() {
        let tail = nums(&[2, 3]);
        let list = List::cons(Value::Number(1), tail.clone());
        assert_eq!(list, nums(&[1, 2, 3]));
        assert_eq!(list.tail(), tail);
    }

    #[test]
    fn test_display() {
        let inner = nums(&[2, 3]);
        let list = List::from(vec![Value::name("f"), Value::List(inner)]);
        assert_eq!(list.to_string(), "(f (2 3))");
        assert_eq!(List::nil().to_string(), "()");
    }

    #[test]
    fn test_long_list_drops_without_overflow() {
        let list: List = (0..500_000).map(Value::Number).collect();
        assert_eq!(list.len(), 500_000);
        drop(list);
    }
}
