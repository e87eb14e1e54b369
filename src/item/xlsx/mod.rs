/// XLSX support for writing tabular data.
///
/// [`xlsx_writer::XlsxItemWriter`] serializes serde records into the rows of a
/// single worksheet, with the field names of the first record as header row.
/// Renamed serde fields (`#[serde(rename = "...")]`) give the column titles.
/// The workbook is saved to a file or kept in memory when the step closes the
/// writer.
///
/// Workbook encoding is delegated to `rust_xlsxwriter`.

/// A module providing facilities for writing records into XLSX workbooks.
pub mod xlsx_writer;
