use std::cell::{Cell, RefCell};

use crate::core::item::{ItemReader, ItemReaderResult, ItemWriter, ItemWriterResult};

/// An `ItemReader` over items already held in memory, read in order.
///
/// ```
/// use barcode_batch_rs::core::item::ItemReader;
/// use barcode_batch_rs::item::memory::VecItemReader;
///
/// let reader = VecItemReader::new(vec!["a", "b"]);
/// assert_eq!(reader.read().unwrap(), Some("a"));
/// assert_eq!(reader.read().unwrap(), Some("b"));
/// assert_eq!(reader.read().unwrap(), None);
/// ```
pub struct VecItemReader<T> {
    items: Vec<T>,
    position: Cell<usize>,
}

impl<T> VecItemReader<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            position: Cell::new(0),
        }
    }
}

impl<T: Clone> ItemReader<T> for VecItemReader<T> {
    fn read(&self) -> ItemReaderResult<T> {
        let item = self.items.get(self.position.get()).cloned();
        if item.is_some() {
            self.position.set(self.position.get() + 1);
        }
        Ok(item)
    }
}

/// An `ItemWriter` collecting every written item in memory.
pub struct VecItemWriter<T> {
    items: RefCell<Vec<T>>,
}

impl<T> Default for VecItemWriter<T> {
    fn default() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
        }
    }
}

impl<T: Clone> VecItemWriter<T> {
    /// Items written so far, in write order.
    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items.into_inner()
    }
}

impl<T: Clone> ItemWriter<T> for VecItemWriter<T> {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        self.items.borrow_mut().extend_from_slice(items);
        Ok(())
    }
}
