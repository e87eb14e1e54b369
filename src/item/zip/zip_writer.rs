use std::{
    cell::RefCell,
    collections::HashSet,
    fs::{self, File},
    io::{Seek, Write},
    path::Path,
};

use log::{debug, info, warn};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    BatchError,
    barcode::{code::Code, image::RenderedBarcode},
    core::item::{ItemWriter, ItemWriterResult},
};

/// Writes every rendered barcode as one archive entry.
///
/// A code seen twice yields a single entry: the image of a code is always the
/// same, so the repeated one is skipped.
pub struct ZipItemWriter<W: Write + Seek> {
    archive: RefCell<Option<ZipWriter<W>>>,
    finished: RefCell<Option<W>>,
    entries: RefCell<HashSet<String>>,
    entry_prefix: String,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipItemWriter<W> {
    /// Name of the archive entry holding `code`.
    pub fn entry_name(&self, code: &Code) -> String {
        format!("{}-{}.png", self.entry_prefix, code)
    }

    /// Returns the underlying sink, finishing the archive first if the
    /// writer was never closed.
    pub fn into_inner(self) -> Result<W, BatchError> {
        if let Some(inner) = self.finished.into_inner() {
            return Ok(inner);
        }

        match self.archive.into_inner() {
            Some(archive) => archive
                .finish()
                .map_err(|error| BatchError::ItemWriter(error.to_string())),
            None => Err(BatchError::ItemWriter("archive already consumed".to_string())),
        }
    }
}

impl<W: Write + Seek> ItemWriter<RenderedBarcode> for ZipItemWriter<W> {
    fn write(&self, items: &[RenderedBarcode]) -> ItemWriterResult {
        let mut archive = self.archive.borrow_mut();
        let archive = archive
            .as_mut()
            .ok_or_else(|| BatchError::ItemWriter("archive already finished".to_string()))?;

        for item in items {
            let name = self.entry_name(&item.code);

            if self.entries.borrow().contains(&name) {
                warn!("Skipping duplicate archive entry: {}", name);
                continue;
            }

            archive
                .start_file(name.as_str(), self.options)
                .map_err(|error| BatchError::ItemWriter(format!("{name}: {error}")))?;
            archive
                .write_all(&item.png)
                .map_err(|error| BatchError::ItemWriter(format!("{name}: {error}")))?;
            self.entries.borrow_mut().insert(name.clone());

            debug!("Added archive entry: {} ({} bytes)", name, item.png.len());
        }

        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        match self.archive.borrow_mut().as_mut() {
            Some(archive) => archive
                .flush()
                .map_err(|error| BatchError::ItemWriter(error.to_string())),
            None => Ok(()),
        }
    }

    /// Writes the central directory. Further writes fail.
    fn close(&self) -> ItemWriterResult {
        if let Some(archive) = self.archive.borrow_mut().take() {
            let inner = archive
                .finish()
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
            *self.finished.borrow_mut() = Some(inner);
            info!("Archive finished");
        }
        Ok(())
    }
}

/// Builder for [`ZipItemWriter`].
pub struct ZipItemWriterBuilder {
    entry_prefix: String,
    compression_level: i32,
}

impl Default for ZipItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipItemWriterBuilder {
    pub fn new() -> Self {
        Self {
            entry_prefix: String::new(),
            compression_level: 6,
        }
    }

    /// Prefix of every entry name, usually the product name.
    pub fn entry_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.entry_prefix = prefix.into();
        self
    }

    /// Compression level, clamped to 0-9. Level 0 stores entries uncompressed.
    pub fn compression_level(mut self, level: i32) -> Self {
        self.compression_level = level.clamp(0, 9);
        self
    }

    /// Creates the archive file, and its parent directories if needed.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<ZipItemWriter<File>, BatchError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        debug!("Created archive file: {}", path.display());
        Ok(self.from_writer(file))
    }

    pub fn from_writer<W: Write + Seek>(self, wtr: W) -> ZipItemWriter<W> {
        let options = if self.compression_level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.compression_level as i64))
        };

        ZipItemWriter {
            archive: RefCell::new(Some(ZipWriter::new(wtr))),
            finished: RefCell::new(None),
            entries: RefCell::new(HashSet::new()),
            entry_prefix: self.entry_prefix,
            options,
        }
    }
}
