use std::{
    cell::{Cell, RefCell},
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde::Serialize;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

fn writer_error(error: XlsxError) -> BatchError {
    BatchError::ItemWriter(error.to_string())
}

enum Destination {
    File(PathBuf),
    Buffer,
}

/// Writes serde records as rows of a single worksheet.
///
/// Field names of the first record become the header row. The workbook is
/// saved when the writer is closed.
pub struct XlsxItemWriter {
    worksheet: RefCell<Option<Worksheet>>,
    has_headers: Cell<bool>,
    destination: Destination,
    buffer: RefCell<Option<Vec<u8>>>,
}

impl XlsxItemWriter {
    /// Bytes of the saved workbook, for writers built with `to_buffer`.
    pub fn into_inner(self) -> Result<Vec<u8>, BatchError> {
        self.buffer
            .into_inner()
            .ok_or_else(|| BatchError::ItemWriter("workbook not saved to a buffer".to_string()))
    }

    fn save(&self, worksheet: Worksheet) -> Result<(), BatchError> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);

        match &self.destination {
            Destination::File(path) => {
                workbook.save(path).map_err(writer_error)?;
                info!("Workbook saved to {}", path.display());
            }
            Destination::Buffer => {
                let bytes = workbook.save_to_buffer().map_err(writer_error)?;
                debug!("Workbook saved to buffer ({} bytes)", bytes.len());
                *self.buffer.borrow_mut() = Some(bytes);
            }
        }
        Ok(())
    }
}

impl<R: Serialize> ItemWriter<R> for XlsxItemWriter {
    fn write(&self, items: &[R]) -> ItemWriterResult {
        let mut worksheet = self.worksheet.borrow_mut();
        let worksheet = worksheet
            .as_mut()
            .ok_or_else(|| BatchError::ItemWriter("workbook already saved".to_string()))?;

        for item in items {
            if !self.has_headers.get() {
                worksheet.serialize_headers(0, 0, item).map_err(writer_error)?;
                self.has_headers.set(true);
            }
            worksheet.serialize(item).map_err(writer_error)?;
        }

        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        if let Some(mut worksheet) = self.worksheet.borrow_mut().take() {
            worksheet.autofit();
            self.save(worksheet)?;
        }
        Ok(())
    }
}

/// Builder for [`XlsxItemWriter`].
///
/// ```
/// use barcode_batch_rs::core::item::ItemWriter;
/// use barcode_batch_rs::item::xlsx::xlsx_writer::XlsxItemWriterBuilder;
///
/// #[derive(serde::Serialize)]
/// struct Row {
///     city: &'static str,
///     pop: u32,
/// }
///
/// let writer = XlsxItemWriterBuilder::new()
///     .sheet_name("Cities")
///     .to_buffer()
///     .unwrap();
///
/// writer.write(&[Row { city: "Boston", pop: 4628910 }]).unwrap();
/// ItemWriter::<Row>::close(&writer).unwrap();
///
/// let bytes = writer.into_inner().unwrap();
/// assert!(bytes.starts_with(b"PK"));
/// ```
pub struct XlsxItemWriterBuilder {
    sheet_name: String,
}

impl Default for XlsxItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxItemWriterBuilder {
    pub fn new() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
        }
    }

    pub fn sheet_name<S: Into<String>>(mut self, name: S) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Saves the workbook to `path` on close, creating parent directories.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<XlsxItemWriter, BatchError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        self.build(Destination::File(path.to_path_buf()))
    }

    /// Keeps the workbook in memory, see [`XlsxItemWriter::into_inner`].
    pub fn to_buffer(self) -> Result<XlsxItemWriter, BatchError> {
        self.build(Destination::Buffer)
    }

    fn build(self, destination: Destination) -> Result<XlsxItemWriter, BatchError> {
        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|error| BatchError::Configuration(error.to_string()))?;

        Ok(XlsxItemWriter {
            worksheet: RefCell::new(Some(worksheet)),
            has_headers: Cell::new(false),
            destination,
            buffer: RefCell::new(None),
        })
    }
}
