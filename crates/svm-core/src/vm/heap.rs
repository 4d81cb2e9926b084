//! Heap Objects
//!
//! Strings and property objects live behind `Rc` handles. The strong count
//! of a handle is the object's reference count: every live `Value` that
//! refers to the object (stack slot, scope binding, property slot) owns
//! exactly one count, and the object is freed when the last one drops.
//!
//! Moving a `Value` (push, pop, bind an already-owned value) never touches
//! the count; only `clone` duplicates a handle into a second owner.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{SvmError, SvmResult};
use super::value::Value;

/// Immutable string object
pub type StringRef = Rc<[u8]>;

/// Shared, mutable property object
pub type ObjectRef = Rc<RefCell<PropertyObject>>;

/// Name -> value record with a fixed property capacity
#[derive(Debug)]
pub struct PropertyObject {
    properties: Vec<(Box<[u8]>, Value)>,
    max_properties: usize,
}

impl PropertyObject {
    pub fn new(max_properties: usize) -> Self {
        PropertyObject {
            properties: Vec::new(),
            max_properties,
        }
    }

    /// Allocate a fresh object behind a handle with count 1
    pub fn alloc(max_properties: usize) -> ObjectRef {
        Rc::new(RefCell::new(Self::new(max_properties)))
    }

    /// Handle to the property value, or `None` if absent
    pub fn get(&self, name: &[u8]) -> Option<Value> {
        self.properties
            .iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.clone())
    }

    /// Insert or overwrite a property. Returns the displaced value so the
    /// caller decides when its handle is released.
    pub fn set(&mut self, name: &[u8], value: Value) -> SvmResult<Option<Value>> {
        if let Some((_, slot)) = self.properties.iter_mut().find(|(key, _)| key.as_ref() == name) {
            return Ok(Some(std::mem::replace(slot, value)));
        }
        if self.properties.len() >= self.max_properties {
            return Err(SvmError::TooManyProperties {
                limit: self.max_properties,
            });
        }
        self.properties.push((name.into(), value));
        Ok(None)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
