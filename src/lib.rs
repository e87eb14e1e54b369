#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Barcode Batch for Rust

 Generate random 7-digit product codes, render them as CODE128 barcodes and
 export them as a ZIP archive of PNG images or as an XLSX spreadsheet.

 ## Core Concepts

 The exports are small batch jobs:

- **Job:** a sequence of `Step`s run in order.
- **Step:** reads items, processes them and writes them out, one chunk at a time.
- **ItemReader:** the input of a step, for example the generated codes.
- **ItemProcessor:** turns a code into a rendered image or a spreadsheet row.
- **ItemWriter:** the output of a step, a ZIP archive or an XLSX workbook.

 ## Features

| **Feature** | **Description**                                         |
|-------------|---------------------------------------------------------|
| zip         | Enables the ZIP `ItemWriter` and the archive export     |
| xlsx        | Enables the XLSX `ItemWriter` and the spreadsheet export |
| cli         | Builds the `barcode-batch` command line tool            |
| full        | Enables all available features                          |

 ## Getting Started

```rust
# use barcode_batch_rs::{barcode::form::BarcodeForm, BatchError};
# use std::env::temp_dir;
fn main() -> Result<(), BatchError> {
    let mut form = BarcodeForm::new();
    form.set_product_name("Widget");
    form.set_quantity("3");

    let codes = form.generate()?;
    assert_eq!(codes.len(), 3);

    let dir = temp_dir().join("barcode-batch-getting-started");
    let archive = form.export_archive(&dir)?;
    let spreadsheet = form.export_spreadsheet(&dir)?;

    assert!(archive.ends_with("Widget-barcodes.zip"));
    assert!(spreadsheet.ends_with("Widget-barcodes.xlsx"));
    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Barcode form, code generation, rendering and exports
pub mod barcode;

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of items readers / writers (in memory, zip, xlsx)
pub mod item;
