//! VM Memory Model
//!
//! Lexical scopes used during VM execution. Scopes live in an index-based
//! arena; each one links to its parent by index, so the chain from the
//! current scope to the global scope is strictly linear and can never hold
//! a dangling link once a scope is dropped.

use crate::error::{SvmError, SvmResult};
use super::value::Value;

/// Binding table for one lexical scope
#[derive(Debug)]
pub struct Scope {
    bindings: Vec<(Box<[u8]>, Value)>,
    parent: Option<usize>,
}

impl Scope {
    fn new(parent: Option<usize>) -> Self {
        Scope {
            bindings: Vec::new(),
            parent,
        }
    }

    fn get(&self, name: &[u8]) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Arena of scopes; the last entry is the current scope, index 0 is global
#[derive(Debug)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
    max_bindings: usize,
}

impl ScopeChain {
    /// Create a chain holding only the global scope
    pub fn new(max_bindings: usize) -> Self {
        ScopeChain {
            scopes: vec![Scope::new(None)],
            max_bindings,
        }
    }

    /// Number of live scopes, global included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Open a child of the current scope and make it current
    pub fn push_scope(&mut self) {
        let parent = self.scopes.len() - 1;
        self.scopes.push(Scope::new(Some(parent)));
    }

    /// Close the current scope, releasing every value it binds
    pub fn pop_scope(&mut self) -> SvmResult<()> {
        if self.scopes.len() <= 1 {
            return Err(SvmError::ScopeUnderflow);
        }
        self.scopes.pop();
        Ok(())
    }

    /// Resolve `name` from the current scope outward.
    ///
    /// The returned value is a new handle owned by the caller.
    pub fn lookup(&self, name: &[u8]) -> Option<Value> {
        let mut index = Some(self.scopes.len() - 1);
        while let Some(i) = index {
            let scope = &self.scopes[i];
            if let Some(value) = scope.get(name) {
                return Some(value.clone());
            }
            index = scope.parent;
        }
        None
    }

    /// Bind `name` in the current scope only. An existing binding in that
    /// scope is overwritten and its old value released; a binding that only
    /// exists in an outer scope is shadowed, never mutated.
    pub fn bind(&mut self, name: &[u8], value: Value) -> SvmResult<()> {
        let max_bindings = self.max_bindings;
        let scope = self.current_mut();

        if let Some((_, slot)) = scope.bindings.iter_mut().find(|(key, _)| key.as_ref() == name) {
            *slot = value;
            return Ok(());
        }
        if scope.bindings.len() >= max_bindings {
            return Err(SvmError::TooManyBindings { limit: max_bindings });
        }
        scope.bindings.push((name.into(), value));
        Ok(())
    }

    pub fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
