use std::time::{Duration, Instant};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    item::{ItemProcessor, ItemReader, ItemWriter},
};

/// Status of a chunk after a read pass.
#[derive(Debug, PartialEq)]
pub enum ChunkStatus {
    /// The reader is exhausted, the chunk holds the last items (possibly none).
    Finished,
    /// The chunk reached the configured size, more items may follow.
    Full,
}

/// Status of a step execution.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum StepStatus {
    Starting,
    Success,
    ReadError,
    ProcessorError,
    WriteError,
}

/// Counters and timing of one run of a step.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of errors encountered during reading
    pub read_error_count: usize,
    /// Number of errors encountered during processing
    pub process_error_count: usize,
    /// Number of errors encountered during writing
    pub write_error_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::default(),
            read_count: 0,
            write_count: 0,
            read_error_count: 0,
            process_error_count: 0,
            write_error_count: 0,
        }
    }
}

pub trait Step {
    /// Name used in logs and in [`BatchError::Step`].
    fn get_name(&self) -> &str;

    /// Executes the step.
    ///
    /// This method represents the main operation of the step. It coordinates
    /// reading items, processing them, and writing them out, recording counters
    /// in `step_execution`.
    ///
    /// # Returns
    /// - `Ok(())`: The step completed successfully
    /// - `Err(BatchError::Step)`: The step ended with an error status
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;
}

/// A step that reads, processes and writes items in chunks of `chunk_size`.
///
/// Read and process errors are skipped while the total number of errors stays
/// within `skip_limit`.
pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a dyn ItemReader<I>,
    /// Component responsible for processing items
    processor: &'a dyn ItemProcessor<I, O>,
    /// Component responsible for writing items to the destination
    writer: &'a dyn ItemWriter<O>,
    /// Number of items to process in each chunk
    chunk_size: u16,
    /// Maximum number of errors allowed before failing the step
    skip_limit: u16,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.status = StepStatus::Starting;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        if let Err(error) = self.writer.open() {
            warn!("Unable to open writer: {}", error);
            step_execution.status = StepStatus::WriteError;
        } else {
            step_execution.status = self.run_chunks(step_execution);
        }

        if let Err(error) = self.writer.close() {
            warn!("Unable to close writer: {}", error);
            step_execution.status = StepStatus::WriteError;
        }

        info!(
            "End of step: {}, id: {}, status: {:?}",
            step_execution.name, step_execution.id, step_execution.status
        );

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        if StepStatus::Success == step_execution.status {
            Ok(())
        } else {
            Err(BatchError::Step(step_execution.name.clone()))
        }
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    fn run_chunks(&self, step_execution: &mut StepExecution) -> StepStatus {
        loop {
            let (read_items, chunk_status) = match self.read_chunk(step_execution) {
                Ok(chunk) => chunk,
                Err(_) => return StepStatus::ReadError,
            };

            let processed_items = match self.process_chunk(step_execution, &read_items) {
                Ok(items) => items,
                Err(_) => return StepStatus::ProcessorError,
            };

            if self.write_chunk(step_execution, &processed_items).is_err() {
                return StepStatus::WriteError;
            }

            if chunk_status == ChunkStatus::Finished {
                return StepStatus::Success;
            }
        }
    }

    /// Reads up to `chunk_size` items from the reader.
    ///
    /// # Returns
    /// - `Ok((items, ChunkStatus::Full))`: the chunk is full
    /// - `Ok((items, ChunkStatus::Finished))`: there are no more items to read
    /// - `Err(BatchError)`: an error occurred and the skip limit was reached
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(self.chunk_size as usize);

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    step_execution.read_count += 1;

                    if read_items.len() >= self.chunk_size as usize {
                        debug!("End reading chunk: FULL");
                        return Ok((read_items, ChunkStatus::Full));
                    }
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return Ok((read_items, ChunkStatus::Finished));
                }
                Err(error) => {
                    warn!("Error reading item: {}", error);
                    step_execution.read_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        return Err(error);
                    }
                }
            }
        }
    }

    /// Applies the processor to each item of the chunk, skipping failures
    /// while the skip limit allows it.
    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        read_items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", read_items.len());
        let mut result = Vec::with_capacity(read_items.len());

        for item in read_items {
            match self.processor.process(item) {
                Ok(processed_item) => result.push(processed_item),
                Err(error) => {
                    warn!("Error processing item: {}", error);
                    step_execution.process_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        return Err(error);
                    }
                }
            }
        }

        Ok(result)
    }

    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        if processed_items.is_empty() {
            debug!("No items to write, skipping write call");
            return Ok(());
        }

        debug!("Writing chunk of {} items", processed_items.len());

        let result = self
            .writer
            .write(processed_items)
            .and_then(|()| self.writer.flush());

        match result {
            Ok(()) => {
                step_execution.write_count += processed_items.len();
                Ok(())
            }
            Err(error) => {
                warn!("Error writing items: {}", error);
                step_execution.write_error_count += processed_items.len();

                if self.is_skip_limit_reached(step_execution) {
                    return Err(error);
                }
                Ok(())
            }
        }
    }

    fn is_skip_limit_reached(&self, step_execution: &StepExecution) -> bool {
        step_execution.read_error_count
            + step_execution.write_error_count
            + step_execution.process_error_count
            > self.skip_limit.into()
    }
}

/// Builder for [`ChunkOrientedStep`].
pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: u16,
    skip_limit: u16,
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 10,
            skip_limit: 0,
        }
    }

    pub fn reader(mut self, reader: &'a dyn ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a dyn ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a dyn ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn chunk_size(mut self, chunk_size: u16) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn skip_limit(mut self, skip_limit: u16) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    /// Builds the step.
    ///
    /// # Errors
    /// Returns [`BatchError::Configuration`] when the reader, processor or
    /// writer is missing.
    pub fn build(self) -> Result<ChunkOrientedStep<'a, I, O>, BatchError> {
        let missing = |component: &str| {
            BatchError::Configuration(format!(
                "{} is required for building step {}",
                component, self.name
            ))
        };

        Ok(ChunkOrientedStep {
            reader: self.reader.ok_or_else(|| missing("Reader"))?,
            processor: self.processor.ok_or_else(|| missing("Processor"))?,
            writer: self.writer.ok_or_else(|| missing("Writer"))?,
            chunk_size: self.chunk_size,
            skip_limit: self.skip_limit,
            name: self.name,
        })
    }
}

/// Entry point for building steps.
///
/// ```
/// use barcode_batch_rs::core::item::PassThroughProcessor;
/// use barcode_batch_rs::core::step::{Step, StepBuilder, StepExecution, StepStatus};
/// use barcode_batch_rs::item::memory::{VecItemReader, VecItemWriter};
///
/// let reader = VecItemReader::new(vec![1, 2, 3]);
/// let writer = VecItemWriter::default();
///
/// let step = StepBuilder::new("copy")
///     .chunk::<i32, i32>(2)
///     .reader(&reader)
///     .processor(&PassThroughProcessor)
///     .writer(&writer)
///     .build()
///     .unwrap();
///
/// let mut execution = StepExecution::new(step.get_name());
/// step.execute(&mut execution).unwrap();
///
/// assert_eq!(execution.status, StepStatus::Success);
/// assert_eq!(writer.items(), vec![1, 2, 3]);
/// ```
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    /// Creates a builder; an empty name is replaced by a random one.
    pub fn new(name: &str) -> Self {
        let name = if name.is_empty() {
            build_name()
        } else {
            name.to_string()
        };
        Self { name }
    }

    pub fn chunk<'a, I, O>(self, chunk_size: u16) -> ChunkOrientedStepBuilder<'a, I, O> {
        ChunkOrientedStepBuilder::new(&self.name).chunk_size(chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::core::item::{
        ItemProcessorResult, ItemReaderResult, ItemWriterResult, PassThroughProcessor,
    };

    struct CountingReader {
        remaining: Cell<usize>,
        fail_at: Option<usize>,
    }

    impl ItemReader<usize> for CountingReader {
        fn read(&self) -> ItemReaderResult<usize> {
            let remaining = self.remaining.get();
            if remaining == 0 {
                return Ok(None);
            }
            self.remaining.set(remaining - 1);
            if self.fail_at == Some(remaining) {
                return Err(BatchError::ItemReader(format!("bad item {remaining}")));
            }
            Ok(Some(remaining))
        }
    }

    struct OddRejectingProcessor;

    impl ItemProcessor<usize, usize> for OddRejectingProcessor {
        fn process(&self, item: &usize) -> ItemProcessorResult<usize> {
            if item % 2 == 1 {
                Err(BatchError::ItemProcessor(format!("odd item {item}")))
            } else {
                Ok(*item)
            }
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        chunks: RefCell<Vec<Vec<usize>>>,
        closed: Cell<bool>,
    }

    impl ItemWriter<usize> for RecordingWriter {
        fn write(&self, items: &[usize]) -> ItemWriterResult {
            self.chunks.borrow_mut().push(items.to_vec());
            Ok(())
        }

        fn close(&self) -> ItemWriterResult {
            self.closed.set(true);
            Ok(())
        }
    }

    struct FailingWriter;

    impl ItemWriter<usize> for FailingWriter {
        fn write(&self, _items: &[usize]) -> ItemWriterResult {
            Err(BatchError::ItemWriter("disk full".to_string()))
        }
    }

    #[test]
    fn step_should_write_items_in_chunks() {
        let reader = CountingReader {
            remaining: Cell::new(5),
            fail_at: None,
        };
        let writer = RecordingWriter::default();

        let step = StepBuilder::new("chunks")
            .chunk(2)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build()
            .unwrap();

        let mut execution = StepExecution::new("chunks");
        let result = step.execute(&mut execution);

        assert!(result.is_ok());
        assert_eq!(execution.status, StepStatus::Success);
        assert_eq!(execution.read_count, 5);
        assert_eq!(execution.write_count, 5);
        assert_eq!(
            *writer.chunks.borrow(),
            vec![vec![5, 4], vec![3, 2], vec![1]]
        );
        assert!(writer.closed.get());
    }

    #[test]
    fn empty_reader_should_succeed_without_writing() {
        let reader = CountingReader {
            remaining: Cell::new(0),
            fail_at: None,
        };
        let writer = RecordingWriter::default();

        let step = StepBuilder::new("empty")
            .chunk(3)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build()
            .unwrap();

        let mut execution = StepExecution::new("empty");

        assert!(step.execute(&mut execution).is_ok());
        assert!(writer.chunks.borrow().is_empty());
        assert!(writer.closed.get());
    }

    #[test]
    fn processor_errors_within_skip_limit_should_be_skipped() {
        let reader = CountingReader {
            remaining: Cell::new(4),
            fail_at: None,
        };
        let writer = RecordingWriter::default();

        let step = StepBuilder::new("skip")
            .chunk(10)
            .reader(&reader)
            .processor(&OddRejectingProcessor)
            .writer(&writer)
            .skip_limit(2)
            .build()
            .unwrap();

        let mut execution = StepExecution::new("skip");

        assert!(step.execute(&mut execution).is_ok());
        assert_eq!(execution.process_error_count, 2);
        assert_eq!(execution.write_count, 2);
        assert_eq!(*writer.chunks.borrow(), vec![vec![4, 2]]);
    }

    #[test]
    fn processor_errors_over_skip_limit_should_fail_step() {
        let reader = CountingReader {
            remaining: Cell::new(4),
            fail_at: None,
        };
        let writer = RecordingWriter::default();

        let step = StepBuilder::new("strict")
            .chunk(10)
            .reader(&reader)
            .processor(&OddRejectingProcessor)
            .writer(&writer)
            .build()
            .unwrap();

        let mut execution = StepExecution::new("strict");
        let result = step.execute(&mut execution);

        assert!(matches!(result, Err(BatchError::Step(name)) if name == "strict"));
        assert_eq!(execution.status, StepStatus::ProcessorError);
        assert!(writer.closed.get());
    }

    #[test]
    fn read_error_should_fail_step_without_skip_limit() {
        let reader = CountingReader {
            remaining: Cell::new(3),
            fail_at: Some(2),
        };
        let writer = RecordingWriter::default();

        let step = StepBuilder::new("read")
            .chunk(10)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build()
            .unwrap();

        let mut execution = StepExecution::new("read");

        assert!(step.execute(&mut execution).is_err());
        assert_eq!(execution.status, StepStatus::ReadError);
        assert_eq!(execution.read_error_count, 1);
    }

    #[test]
    fn write_error_should_fail_step() {
        let reader = CountingReader {
            remaining: Cell::new(3),
            fail_at: None,
        };

        let step = StepBuilder::new("write")
            .chunk(10)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&FailingWriter)
            .build()
            .unwrap();

        let mut execution = StepExecution::new("write");

        assert!(step.execute(&mut execution).is_err());
        assert_eq!(execution.status, StepStatus::WriteError);
        assert_eq!(execution.write_error_count, 3);
        assert_eq!(execution.write_count, 0);
    }

    #[test]
    fn builder_should_reject_missing_writer() {
        let reader = CountingReader {
            remaining: Cell::new(1),
            fail_at: None,
        };

        let result = StepBuilder::new("incomplete")
            .chunk::<usize, usize>(1)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .build();

        assert!(matches!(result, Err(BatchError::Configuration(_))));
    }

    #[test]
    fn empty_step_name_should_be_generated() {
        let builder = StepBuilder::new("");

        assert_eq!(builder.name.len(), 8);
    }
}
