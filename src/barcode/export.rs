//! Archive and spreadsheet exports of a generated code list.
//!
//! Each export owns its reader, processor and writer and hands out a
//! chunk-oriented step over them, so several exports can run as the steps of
//! one job. The `export_*` functions run a single export as a one-step job.

#[cfg(any(feature = "zip", feature = "xlsx"))]
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[cfg(any(feature = "zip", feature = "xlsx"))]
use log::warn;

#[cfg(feature = "zip")]
use std::{
    fs::File,
    io::{Seek, Write},
};

#[cfg(any(feature = "zip", feature = "xlsx"))]
use crate::{
    BatchError,
    barcode::code::Code,
    core::{
        job::{Job, JobBuilder},
        step::{ChunkOrientedStep, Step, StepBuilder, StepExecution},
    },
    item::memory::VecItemReader,
};

#[cfg(feature = "zip")]
use crate::{
    barcode::image::{BarcodeImageProcessor, ImageOptions, RenderedBarcode},
    item::zip::zip_writer::{ZipItemWriter, ZipItemWriterBuilder},
};

#[cfg(feature = "xlsx")]
use crate::{
    barcode::row::{BarcodeRow, BarcodeRowProcessor},
    item::xlsx::xlsx_writer::{XlsxItemWriter, XlsxItemWriterBuilder},
};

/// Name of the worksheet holding the rows.
pub const SHEET_NAME: &str = "Barcodes";

#[cfg(any(feature = "zip", feature = "xlsx"))]
const CHUNK_SIZE: u16 = 50;

/// Product name made safe for use in a file name.
///
/// Path separators and control characters become `_`, everything else is kept.
///
/// ```
/// use barcode_batch_rs::barcode::export::file_stem;
///
/// assert_eq!(file_stem("Widget"), "Widget");
/// assert_eq!(file_stem("A/B\\C"), "A_B_C");
/// ```
pub fn file_stem(product_name: &str) -> String {
    product_name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// `<productName>-barcodes.zip`
pub fn archive_file_name(product_name: &str) -> String {
    format!("{}-barcodes.zip", file_stem(product_name))
}

/// `<productName>-barcodes.xlsx`
pub fn spreadsheet_file_name(product_name: &str) -> String {
    format!("{}-barcodes.xlsx", file_stem(product_name))
}

#[cfg(any(feature = "zip", feature = "xlsx"))]
fn target_path(dir: &Path, file_name: String) -> PathBuf {
    dir.join(file_name)
}

/// Removes the incomplete output of a failed export.
#[cfg(any(feature = "zip", feature = "xlsx"))]
fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => warn!("Removed incomplete export {}", path.display()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => warn!("Unable to remove {}: {}", path.display(), error),
    }
}

/// Renders codes and packs the images into a ZIP archive.
///
/// A code whose image cannot be rendered is left out of the archive, the
/// remaining codes are still packed.
#[cfg(feature = "zip")]
pub struct ArchiveExport<W: Write + Seek> {
    reader: VecItemReader<Code>,
    processor: BarcodeImageProcessor,
    writer: ZipItemWriter<W>,
}

#[cfg(feature = "zip")]
impl<W: Write + Seek> ArchiveExport<W> {
    pub fn new(
        product_name: &str,
        codes: &[Code],
        options: ImageOptions,
        sink: W,
    ) -> Result<Self, BatchError> {
        Ok(Self {
            reader: VecItemReader::new(codes.to_vec()),
            processor: BarcodeImageProcessor::new(options)?,
            writer: ZipItemWriterBuilder::new()
                .entry_prefix(file_stem(product_name))
                .from_writer(sink),
        })
    }

    pub fn step(&self) -> Result<ChunkOrientedStep<'_, Code, RenderedBarcode>, BatchError> {
        StepBuilder::new("export-archive")
            .chunk(CHUNK_SIZE)
            .reader(&self.reader)
            .processor(&self.processor)
            .writer(&self.writer)
            .skip_limit(u16::MAX)
            .build()
    }

    /// Returns the sink holding the finished archive.
    ///
    /// # Errors
    /// Fails when entries could not be written during `execution`.
    pub fn finish(self, execution: &StepExecution) -> Result<W, BatchError> {
        if execution.write_error_count > 0 {
            return Err(BatchError::ItemWriter(format!(
                "{} archive entries could not be written",
                execution.write_error_count
            )));
        }
        self.writer.into_inner()
    }
}

#[cfg(feature = "zip")]
impl ArchiveExport<File> {
    /// Export writing `<productName>-barcodes.zip` into `dir`.
    pub fn to_dir(
        product_name: &str,
        codes: &[Code],
        options: ImageOptions,
        dir: &Path,
    ) -> Result<(Self, PathBuf), BatchError> {
        let path = target_path(dir, archive_file_name(product_name));
        let export = Self {
            reader: VecItemReader::new(codes.to_vec()),
            processor: BarcodeImageProcessor::new(options)?,
            writer: ZipItemWriterBuilder::new()
                .entry_prefix(file_stem(product_name))
                .from_path(&path)?,
        };
        Ok((export, path))
    }
}

/// Writes one row per code into a single-sheet workbook.
#[cfg(feature = "xlsx")]
pub struct SpreadsheetExport {
    reader: VecItemReader<Code>,
    processor: BarcodeRowProcessor,
    writer: XlsxItemWriter,
}

#[cfg(feature = "xlsx")]
impl SpreadsheetExport {
    /// Export keeping the workbook in memory.
    pub fn in_memory(product_name: &str, codes: &[Code]) -> Result<Self, BatchError> {
        let writer = XlsxItemWriterBuilder::new()
            .sheet_name(SHEET_NAME)
            .to_buffer()?;
        Ok(Self::with_writer(product_name, codes, writer))
    }

    /// Export writing `<productName>-barcodes.xlsx` into `dir`.
    pub fn to_dir(
        product_name: &str,
        codes: &[Code],
        dir: &Path,
    ) -> Result<(Self, PathBuf), BatchError> {
        let path = target_path(dir, spreadsheet_file_name(product_name));
        let writer = XlsxItemWriterBuilder::new()
            .sheet_name(SHEET_NAME)
            .from_path(&path)?;
        Ok((Self::with_writer(product_name, codes, writer), path))
    }

    fn with_writer(product_name: &str, codes: &[Code], writer: XlsxItemWriter) -> Self {
        Self {
            reader: VecItemReader::new(codes.to_vec()),
            processor: BarcodeRowProcessor::new(product_name),
            writer,
        }
    }

    pub fn step(&self) -> Result<ChunkOrientedStep<'_, Code, BarcodeRow>, BatchError> {
        StepBuilder::new("export-spreadsheet")
            .chunk(CHUNK_SIZE)
            .reader(&self.reader)
            .processor(&self.processor)
            .writer(&self.writer)
            .build()
    }

    /// Workbook bytes of an in-memory export.
    pub fn into_bytes(self) -> Result<Vec<u8>, BatchError> {
        self.writer.into_inner()
    }
}

/// Runs `step` as the only step of a job and returns its execution.
#[cfg(any(feature = "zip", feature = "xlsx"))]
fn run_single(name: &str, step: &dyn Step) -> Result<StepExecution, BatchError> {
    let job = JobBuilder::new().name(name.to_string()).start(step).build();
    let mut execution = job.run()?;
    execution
        .step_executions
        .pop()
        .ok_or_else(|| BatchError::Step(name.to_string()))
}

/// Packs the barcodes of `codes` into `sink` as a ZIP archive.
#[cfg(feature = "zip")]
pub fn write_archive<W: Write + Seek>(
    product_name: &str,
    codes: &[Code],
    options: &ImageOptions,
    sink: W,
) -> Result<W, BatchError> {
    let export = ArchiveExport::new(product_name, codes, options.clone(), sink)?;
    let execution = run_single("archive", &export.step()?)?;
    export.finish(&execution)
}

/// Writes `<productName>-barcodes.zip` into `dir` and returns its path.
#[cfg(feature = "zip")]
pub fn export_archive(
    product_name: &str,
    codes: &[Code],
    options: &ImageOptions,
    dir: &Path,
) -> Result<PathBuf, BatchError> {
    let (export, path) = ArchiveExport::to_dir(product_name, codes, options.clone(), dir)?;

    let execution = export.step().and_then(|step| run_single("archive", &step));
    let result = match execution {
        Ok(execution) => export.finish(&execution).map(drop),
        Err(error) => {
            drop(export);
            Err(error)
        }
    };

    match result {
        Ok(()) => Ok(path),
        Err(error) => {
            discard(&path);
            Err(error)
        }
    }
}

/// Workbook bytes with one row per code.
#[cfg(feature = "xlsx")]
pub fn spreadsheet_bytes(product_name: &str, codes: &[Code]) -> Result<Vec<u8>, BatchError> {
    let export = SpreadsheetExport::in_memory(product_name, codes)?;
    run_single("spreadsheet", &export.step()?)?;
    export.into_bytes()
}

/// Writes `<productName>-barcodes.xlsx` into `dir` and returns its path.
#[cfg(feature = "xlsx")]
pub fn export_spreadsheet(
    product_name: &str,
    codes: &[Code],
    dir: &Path,
) -> Result<PathBuf, BatchError> {
    let (export, path) = SpreadsheetExport::to_dir(product_name, codes, dir)?;

    let result = export.step().and_then(|step| run_single("spreadsheet", &step));
    drop(export);

    match result {
        Ok(_) => Ok(path),
        Err(error) => {
            discard(&path);
            Err(error)
        }
    }
}
