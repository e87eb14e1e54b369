use crate::error::BatchError;

/// Result of a single [`ItemReader::read`] call.
///
/// - `Ok(Some(item))`: an item was read
/// - `Ok(None)`: the reader is exhausted
/// - `Err(error)`: the current item could not be read
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

/// Result of a single [`ItemProcessor::process`] call.
pub type ItemProcessorResult<O> = Result<O, BatchError>;

/// Result of an [`ItemWriter`] operation.
pub type ItemWriterResult = Result<(), BatchError>;

/// Source of items for a step, one item at a time.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;
}

/// Business logic applied to every item between reading and writing.
pub trait ItemProcessor<I, O> {
    fn process(&self, item: &I) -> ItemProcessorResult<O>;
}

/// Output of a step, one chunk of items at a time.
///
/// `open` is called once before the first chunk, `flush` after every
/// successfully written chunk and `close` once the step is over.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}

/// Processor that hands every item over unchanged.
#[derive(Default)]
pub struct PassThroughProcessor;

impl<I: Clone> ItemProcessor<I, I> for PassThroughProcessor {
    fn process(&self, item: &I) -> ItemProcessorResult<I> {
        Ok(item.clone())
    }
}
