//! Variable scopes for macro code.
//!
//! Scopes form a parent chain: builtins ← globals ← locals ← call frames.
//! Assignment always binds in the innermost scope; lookup walks outward.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::value::Value;

/// A single-threaded shared scope handle.
///
/// Every scope allocation goes through [`LocalScope::new`]. Closures and
/// call frames hold clones of the handle, so a binding made after a
/// function was defined is still visible to it.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One level of variable bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Value>,
    parent: Option<LocalScope<Scope>>,
    /// The body of a `class` statement. Functions defined inside capture
    /// the enclosing scope instead, so methods do not see class attributes
    /// as bare names.
    class_body: bool,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            parent: Some(parent),
            ..Scope::default()
        }
    }

    pub fn class_body(parent: LocalScope<Scope>) -> Self {
        Scope {
            parent: Some(parent),
            class_body: true,
            ..Scope::default()
        }
    }

    #[inline]
    pub fn is_class_body(&self) -> bool {
        self.class_body
    }

    pub fn parent(&self) -> Option<&LocalScope<Scope>> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look `name` up here and then in every parent.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref()?.borrow().lookup(name)
    }

    /// Look `name` up in this scope only.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    /// Names bound in this scope, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// The scope a function defined in `scope` closes over: the nearest
/// enclosing scope that is not a class body.
pub(crate) fn closure_scope(scope: &LocalScope<Scope>) -> LocalScope<Scope> {
    let mut current = scope.clone();
    loop {
        let parent = {
            let inner = current.borrow();
            if !inner.is_class_body() {
                break;
            }
            match inner.parent() {
                Some(parent) => parent.clone(),
                None => break,
            }
        };
        current = parent;
    }
    current
}

#[cfg(test)]
mod tests;
