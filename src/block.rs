//! The block contract.
//!
//! Every block advances by exactly one logical sample per `process` call. A
//! block consumes the values bound to its input ports for the tick and
//! returns either a borrow of the sample it produced or `None` when it has
//! nothing to offer this tick.

#![forbid(unsafe_code)]

use crate::error::BlockError;
use crate::port::{ErasedInput, PortSpec};
use std::any::Any;

/// Typed block definition; implement this for new blocks.
pub trait Block: Send + 'static {
    /// Element type produced on the `out` port. Sinks use `()`.
    type Output: 'static;

    /// Block type name used in errors and logs.
    const TYPE_NAME: &'static str;

    /// Input ports, in index order.
    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    /// The output port, `None` for sinks.
    fn output_port(&self) -> Option<PortSpec> {
        Some(PortSpec::of::<Self::Output>("out"))
    }

    /// Input port by index, as listed by [`Block::input_ports`].
    fn input_mut(&mut self, _index: usize) -> Option<&mut dyn ErasedInput> {
        None
    }

    /// Bind `value` to the input named `name` for the current tick.
    ///
    /// The value is copied into the port; nothing is computed until
    /// [`Block::process`].
    fn set_input(&mut self, name: &str, value: &dyn Any) -> Result<(), BlockError> {
        let index = self
            .input_ports()
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| BlockError::UnknownPort {
                block: Self::TYPE_NAME,
                port: name.to_string(),
            })?;
        match self.input_mut(index) {
            Some(port) => port.bind_any(value),
            None => Err(BlockError::UnknownPort {
                block: Self::TYPE_NAME,
                port: name.to_string(),
            }),
        }
    }

    /// Advance one logical sample.
    ///
    /// The returned borrow stays valid until the next call on this block.
    fn process(&mut self) -> Result<Option<&Self::Output>, BlockError>;

    /// Whether the block still holds buffered output and does not need a
    /// fresh input this tick.
    fn is_output_available(&self) -> bool {
        false
    }

    /// Whether the block will never produce output again.
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Push buffered side effects out to external resources.
    fn flush(&mut self) -> Result<(), BlockError> {
        Ok(())
    }
}

/// Object-safe block, used by the graph to hold blocks of different types.
pub trait DynBlock: Send {
    /// Block type name.
    fn type_name(&self) -> &'static str;
    /// Input ports, in index order.
    fn input_ports(&self) -> Vec<PortSpec>;
    /// The output port, `None` for sinks.
    fn output_port(&self) -> Option<PortSpec>;
    /// Input port by index.
    fn input_mut(&mut self, index: usize) -> Option<&mut dyn ErasedInput>;
    /// Advance one logical sample, returning the output type-erased.
    fn process_dyn(&mut self) -> Result<Option<&dyn Any>, BlockError>;
    /// See [`Block::is_output_available`].
    fn is_output_available(&self) -> bool;
    /// See [`Block::is_exhausted`].
    fn is_exhausted(&self) -> bool;
    /// See [`Block::flush`].
    fn flush(&mut self) -> Result<(), BlockError>;
    /// Concrete block, for typed access.
    fn as_any(&self) -> &dyn Any;
    /// Concrete block, for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<B: Block> DynBlock for B {
    fn type_name(&self) -> &'static str {
        B::TYPE_NAME
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        <B as Block>::input_ports(self)
    }

    fn output_port(&self) -> Option<PortSpec> {
        <B as Block>::output_port(self)
    }

    fn input_mut(&mut self, index: usize) -> Option<&mut dyn ErasedInput> {
        <B as Block>::input_mut(self, index)
    }

    fn process_dyn(&mut self) -> Result<Option<&dyn Any>, BlockError> {
        Ok(<B as Block>::process(self)?.map(|v| v as &dyn Any))
    }

    fn is_output_available(&self) -> bool {
        <B as Block>::is_output_available(self)
    }

    fn is_exhausted(&self) -> bool {
        <B as Block>::is_exhausted(self)
    }

    fn flush(&mut self) -> Result<(), BlockError> {
        <B as Block>::flush(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{ConstantSource, Multiply};

    #[test]
    fn set_input_by_name() {
        let mut mul = Multiply::<f32>::new();
        Block::set_input(&mut mul, "left", &2.0f32).unwrap();
        Block::set_input(&mut mul, "right", &4.0f32).unwrap();
        assert_eq!(Block::process(&mut mul).unwrap(), Some(&8.0));
    }

    #[test]
    fn set_input_rejects_unknown_port() {
        let mut mul = Multiply::<f32>::new();
        let err = Block::set_input(&mut mul, "middle", &2.0f32).unwrap_err();
        assert!(matches!(err, BlockError::UnknownPort { .. }));
    }

    #[test]
    fn dyn_process_erases_output() {
        let mut src: Box<dyn DynBlock> = Box::new(ConstantSource::new(3.0f64));
        let out = src.process_dyn().unwrap().unwrap();
        assert_eq!(out.downcast_ref::<f64>(), Some(&3.0));
        assert_eq!(src.type_name(), "ConstantSource");
        assert!(src.input_ports().is_empty());
    }
}
