/// This module provides in-memory item readers and writers.
pub mod memory;

#[cfg(feature = "zip")]
#[cfg_attr(docsrs, doc(cfg(feature = "zip")))]
/// This module provides a ZIP item writer packing rendered barcodes.
pub mod zip;

#[cfg(feature = "xlsx")]
#[cfg_attr(docsrs, doc(cfg(feature = "xlsx")))]
/// This module provides an XLSX item writer.
pub mod xlsx;
