use crate::block::Block;
use crate::error::BlockError;
use crate::port::OutputPort;
use crate::sample::Sample;

/// Replay samples from a vector.
///
/// # Outputs
///
/// `out`: the element under the cursor
///
/// Without `repeat`, the source produces each element once and then reports
/// exhaustion forever. With `repeat`, the cursor wraps around. An empty vector
/// never produces anything, whatever the `repeat` setting.
///
/// # Usage
/// ```
/// use sdrchain::block::Block;
/// use sdrchain::blocks::VectorSource;
///
/// let mut src = VectorSource::new(vec![0.0f32, 1.0], false);
/// assert_eq!(src.process().unwrap(), Some(&0.0));
/// assert_eq!(src.process().unwrap(), Some(&1.0));
/// assert_eq!(src.process().unwrap(), None);
/// assert!(src.is_exhausted());
/// ```
#[derive(Debug, Clone)]
pub struct VectorSource<T: Sample> {
    items: Vec<T>,
    repeat: bool,
    cursor: usize,
    output: OutputPort<T>,
}

impl<T: Sample> VectorSource<T> {
    /// Create a source over `items`.
    pub fn new(items: Vec<T>, repeat: bool) -> Self {
        Self {
            items,
            repeat,
            cursor: 0,
            output: OutputPort::new(),
        }
    }

    /// Replace the backing data and rewind.
    pub fn set_data(&mut self, items: Vec<T>) {
        self.items = items;
        self.cursor = 0;
        self.output.clear();
    }

    /// Enable or disable looping and rewind.
    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
        self.cursor = 0;
        self.output.clear();
    }

    /// Backing data.
    pub fn data(&self) -> &[T] {
        &self.items
    }

    /// Whether the source loops.
    pub fn repeat(&self) -> bool {
        self.repeat
    }

    /// Index of the next element to be produced.
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl<T: Sample> Block for VectorSource<T> {
    type Output = T;
    const TYPE_NAME: &'static str = "VectorSource";

    fn process(&mut self) -> Result<Option<&T>, BlockError> {
        if self.is_exhausted() {
            self.output.clear();
            return Ok(None);
        }
        let value = self.items[self.cursor];
        self.cursor += 1;
        if self.repeat && self.cursor == self.items.len() {
            self.cursor = 0;
        }
        Ok(Some(self.output.produce(value)))
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_is_exhausted_before_first_call() {
        for repeat in [false, true] {
            let mut src = VectorSource::<f32>::new(vec![], repeat);
            assert!(src.is_exhausted());
            for _ in 0..3 {
                assert_eq!(src.process().unwrap(), None);
            }
        }
    }

    #[test]
    fn repeating_source_wraps() {
        let mut src = VectorSource::new(vec![1.0f64, 2.0, 3.0], true);
        let out: Vec<f64> = (0..7).map(|_| *src.process().unwrap().unwrap()).collect();
        assert_eq!(out, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
        assert!(!src.is_exhausted());
    }

    #[test]
    fn set_data_rewinds() {
        let mut src = VectorSource::new(vec![1.0f32], false);
        src.process().unwrap();
        assert!(src.is_exhausted());
        src.set_data(vec![5.0, 6.0]);
        assert_eq!(src.process().unwrap(), Some(&5.0));
    }
}
