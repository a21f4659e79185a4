//! Single-value ports.
//!
//! A tick moves exactly one sample across each edge. The producer keeps the
//! sample in its [`OutputPort`] and hands consumers a shared borrow of it; the
//! borrow is tied to the `&mut self` of `process`, so it cannot outlive the
//! producer's next `process` call. Consumers bind the borrowed sample into an
//! [`InputPort`], which keeps a copy (samples are `Copy` scalars) until the
//! consumer's own `process` takes it. A binding is therefore valid for one
//! tick only.

#![forbid(unsafe_code)]

use crate::error::BlockError;
use crate::sample::Sample;
use std::any::{Any, TypeId};

/// Element type of a port, comparable at graph-construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemType {
    id: TypeId,
    name: &'static str,
}

impl ItemType {
    /// Item type of `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Human-readable type name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Static description of one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    /// Port name, unique among a block's inputs.
    pub name: &'static str,
    /// Element type carried by the port.
    pub item: ItemType,
}

impl PortSpec {
    /// Describe a port named `name` carrying `T`.
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            name,
            item: ItemType::of::<T>(),
        }
    }
}

/// Type-erased view of an [`InputPort`], used by the runtime to bind values
/// without knowing the consumer's element type.
pub trait ErasedInput {
    /// Port description.
    fn spec(&self) -> PortSpec;
    /// Bind a value; fails if `value` is not of the port's element type.
    fn bind_any(&mut self, value: &dyn Any) -> Result<(), BlockError>;
    /// Whether a value is bound for the current tick.
    fn is_bound(&self) -> bool;
}

/// A named input slot holding at most one sample for the current tick.
#[derive(Debug, Clone)]
pub struct InputPort<T> {
    owner: &'static str,
    name: &'static str,
    value: Option<T>,
}

impl<T: Sample> InputPort<T> {
    /// Create an unbound port `name` on a block of type `owner`.
    pub fn new(owner: &'static str, name: &'static str) -> Self {
        Self {
            owner,
            name,
            value: None,
        }
    }

    /// Port name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bind `value` for the current tick, replacing any previous binding.
    pub fn set(&mut self, value: &T) {
        self.value = Some(*value);
    }

    /// Consume the binding, if any.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    /// Consume the binding; an unbound port is a precondition violation.
    pub fn require(&mut self) -> Result<T, BlockError> {
        self.value.take().ok_or(BlockError::PreconditionViolation {
            block: self.owner,
            port: self.name,
        })
    }
}

impl<T: Sample> ErasedInput for InputPort<T> {
    fn spec(&self) -> PortSpec {
        PortSpec::of::<T>(self.name)
    }

    fn bind_any(&mut self, value: &dyn Any) -> Result<(), BlockError> {
        match value.downcast_ref::<T>() {
            Some(v) => {
                self.set(v);
                Ok(())
            }
            None => Err(BlockError::PortTypeMismatch {
                block: self.owner,
                port: self.name,
                expected: std::any::type_name::<T>(),
            }),
        }
    }

    fn is_bound(&self) -> bool {
        self.value.is_some()
    }
}

/// Producer-owned storage for the most recent output sample.
#[derive(Debug, Clone, Default)]
pub struct OutputPort<T> {
    value: Option<T>,
}

impl<T: Sample> OutputPort<T> {
    /// Create an empty output.
    pub fn new() -> Self {
        Self { value: None }
    }

    /// Store `value` as this tick's output and lend it out.
    pub fn produce(&mut self, value: T) -> &T {
        self.value.insert(value)
    }

    /// Drop the stored output; used when a tick produces nothing.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// The last produced value, if the last tick produced one.
    pub fn last(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    #[test]
    fn require_consumes_binding() {
        let mut port = InputPort::<f32>::new("Test", "in");
        port.set(&1.0);
        assert_eq!(port.require().unwrap(), 1.0);
        assert!(matches!(
            port.require(),
            Err(BlockError::PreconditionViolation { block: "Test", port: "in" })
        ));
    }

    #[test]
    fn bind_any_checks_type() {
        let mut port = InputPort::<Complex32>::new("Test", "in");
        assert!(port.bind_any(&1.0f32).is_err());
        assert!(!port.is_bound());
        port.bind_any(&Complex32::new(1.0, 2.0)).unwrap();
        assert!(port.is_bound());
        assert_eq!(port.spec(), PortSpec::of::<Complex32>("in"));
    }

    #[test]
    fn output_holds_latest() {
        let mut out = OutputPort::<f64>::new();
        assert_eq!(*out.produce(1.0), 1.0);
        assert_eq!(*out.produce(2.0), 2.0);
        assert_eq!(out.last(), Some(&2.0));
        out.clear();
        assert_eq!(out.last(), None);
    }
}
