use std::cell::Cell;

use serde::Serialize;

use crate::core::item::{ItemProcessor, ItemProcessorResult};

use super::code::Code;

/// One spreadsheet row describing a generated code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeRow {
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Barcode")]
    pub barcode: String,
    /// 1-based position of the code in the generated list
    #[serde(rename = "Serial Number")]
    pub serial_number: u32,
}

/// Numbers codes in the order they are processed, starting at 1.
pub struct BarcodeRowProcessor {
    product_name: String,
    serial: Cell<u32>,
}

impl BarcodeRowProcessor {
    pub fn new<S: Into<String>>(product_name: S) -> Self {
        Self {
            product_name: product_name.into(),
            serial: Cell::new(0),
        }
    }
}

impl ItemProcessor<Code, BarcodeRow> for BarcodeRowProcessor {
    fn process(&self, item: &Code) -> ItemProcessorResult<BarcodeRow> {
        self.serial.set(self.serial.get() + 1);

        Ok(BarcodeRow {
            product_name: self.product_name.clone(),
            barcode: item.to_string(),
            serial_number: self.serial.get(),
        })
    }
}
