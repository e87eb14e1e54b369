/// ZIP support for packaging rendered barcodes.
///
/// The [`zip_writer::ZipItemWriter`] receives [`RenderedBarcode`] items from a
/// step and stores every PNG as one archive entry named
/// `<entry_prefix>-<code>.png`, in write order. The archive is finalised when
/// the step closes the writer.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use barcode_batch_rs::barcode::code::Code;
/// use barcode_batch_rs::barcode::image::{render, ImageOptions};
/// use barcode_batch_rs::core::item::ItemWriter;
/// use barcode_batch_rs::item::zip::zip_writer::ZipItemWriterBuilder;
///
/// let barcode = render(&Code::parse("4821907").unwrap(), &ImageOptions::default()).unwrap();
///
/// let writer = ZipItemWriterBuilder::new()
///     .entry_prefix("Widget")
///     .from_writer(Cursor::new(Vec::new()));
///
/// writer.write(&[barcode]).unwrap();
/// writer.close().unwrap();
///
/// let archive = zip::ZipArchive::new(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["Widget-4821907.png"]);
/// ```
///
/// [`RenderedBarcode`]: crate::barcode::image::RenderedBarcode

/// A module providing facilities for writing barcode images into ZIP archives.
pub mod zip_writer;
