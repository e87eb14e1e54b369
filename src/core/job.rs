use std::time::{Duration, Instant};

use log::{info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
///
/// A `JobResult` is a `Result` that contains either:
/// - A successful `JobExecution` with execution details
/// - A `BatchError` indicating what went wrong
type JobResult<T> = Result<T, BatchError>;

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order.
/// The first failing step aborts the job.
///
/// # Example Usage
///
/// ```
/// use barcode_batch_rs::barcode::code::RandomCodeReaderBuilder;
/// use barcode_batch_rs::core::item::PassThroughProcessor;
/// use barcode_batch_rs::core::job::{Job, JobBuilder};
/// use barcode_batch_rs::core::step::StepBuilder;
/// use barcode_batch_rs::item::memory::VecItemWriter;
///
/// let reader = RandomCodeReaderBuilder::new().quantity(3).build();
/// let writer = VecItemWriter::default();
///
/// let step = StepBuilder::new("generate-codes")
///     .chunk(10)
///     .reader(&reader)
///     .processor(&PassThroughProcessor)
///     .writer(&writer)
///     .build()
///     .unwrap();
///
/// let job = JobBuilder::new()
///     .name("codes".to_string())
///     .start(&step)
///     .build();
///
/// let execution = job.run().unwrap();
/// assert_eq!(execution.step_executions[0].write_count, 3);
/// ```
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step succeeds
    /// - `Err(BatchError)` when a step fails
    fn run(&self) -> JobResult<JobExecution>;
}

/// Represents the execution of a job.
#[derive(Debug)]
pub struct JobExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// Executions of every step, in run order
    pub step_executions: Vec<StepExecution>,
}

/// Represents an instance of a job.
///
/// A job instance is created through the `JobBuilder` and executed by calling
/// the `run` method. The steps are executed in the order they were added.
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<&'a dyn Step>,
}

impl JobInstance<'_> {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl Job for JobInstance<'_> {
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        info!("Start of job: {}, id: {}", self.name, self.id);

        let mut step_executions = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.get_name());
            let result = step.execute(&mut step_execution);
            step_executions.push(step_execution);

            if let Err(error) = result {
                warn!("Job {} aborted: {}", self.name, error);
                return Err(error);
            }
        }

        info!("End of job: {}, id: {}", self.name, self.id);

        Ok(JobExecution {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            step_executions,
        })
    }
}

/// Builder for creating a job instance.
///
/// ```
/// use barcode_batch_rs::core::job::JobBuilder;
///
/// let job = JobBuilder::new().name("export".to_string()).build();
/// assert_eq!(job.get_name(), "export");
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    /// Collection of steps to be executed, in order
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// Identical to `next()`, reads better for the initial step.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a step to the job. Steps run in the order they are added.
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
        }
    }
}
