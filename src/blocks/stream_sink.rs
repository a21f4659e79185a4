use crate::block::Block;
use crate::error::BlockError;
use crate::port::{ErasedInput, InputPort, PortSpec};
use crate::sample::{Sample, MAX_SAMPLE_SIZE};
use std::io::Write;

/// Write raw samples to a byte stream.
///
/// # Inputs
///
/// `in`: sample to write
///
/// Each sample is written as its native-byte-order representation with a
/// single `write_all`; no header, framing or padding. The destination is
/// injected by the caller. After a failed write the sink is poisoned and
/// refuses every further write, so a broken stream never receives bytes of
/// later samples.
#[derive(Debug)]
pub struct StreamSink<T: Sample, W: Write + Send + 'static> {
    writer: W,
    input: InputPort<T>,
    n_written: u64,
    poisoned: bool,
}

impl<T: Sample, W: Write + Send + 'static> StreamSink<T, W> {
    /// Create a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            input: InputPort::new(Self::TYPE_NAME, "in"),
            n_written: 0,
            poisoned: false,
        }
    }

    /// Replace the destination, returning the previous one.
    pub fn set_stream(&mut self, writer: W) -> W {
        self.poisoned = false;
        std::mem::replace(&mut self.writer, writer)
    }

    /// Bind the sample for this tick.
    pub fn set_value(&mut self, value: &T) {
        self.input.set(value);
    }

    /// Samples written so far.
    pub fn samples_written(&self) -> u64 {
        self.n_written
    }

    /// The destination.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the sink, returning the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_error(&mut self, source: std::io::Error) -> BlockError {
        self.poisoned = true;
        BlockError::Write {
            block: Self::TYPE_NAME,
            source,
        }
    }
}

impl<T: Sample, W: Write + Send + 'static> Block for StreamSink<T, W> {
    type Output = ();
    const TYPE_NAME: &'static str = "StreamSink";

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![self.input.spec()]
    }

    fn output_port(&self) -> Option<PortSpec> {
        None
    }

    fn input_mut(&mut self, index: usize) -> Option<&mut dyn ErasedInput> {
        match index {
            0 => Some(&mut self.input),
            _ => None,
        }
    }

    fn process(&mut self) -> Result<Option<&()>, BlockError> {
        let value = self.input.require()?;
        if self.poisoned {
            return Err(self.write_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "sink failed earlier",
            )));
        }

        let mut buf = [0u8; MAX_SAMPLE_SIZE];
        value.write_ne_bytes(&mut buf);
        if let Err(e) = self.writer.write_all(&buf[..T::SIZE]) {
            return Err(self.write_error(e));
        }

        self.n_written += 1;
        Ok(None)
    }

    fn flush(&mut self) -> Result<(), BlockError> {
        if self.poisoned {
            return Ok(());
        }
        debug!("StreamSink: {} samples written", self.n_written);
        self.writer.flush().map_err(|e| self.write_error(e))
    }
}
