#[cfg(any(feature = "zip", feature = "xlsx"))]
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::BatchError;

#[cfg(any(feature = "zip", feature = "xlsx"))]
use super::export;
use super::{
    code::{Code, CodeGenerator},
    image::ImageOptions,
};

/// State of the barcode form: product name, quantity and generated codes.
///
/// The quantity is set from raw text; text that is not an unsigned integer
/// leaves the form without a quantity and generation is refused until a valid
/// one is entered.
///
/// ```
/// use barcode_batch_rs::barcode::form::BarcodeForm;
///
/// let mut form = BarcodeForm::new();
/// form.set_product_name("Widget");
/// form.set_quantity("3");
///
/// let codes = form.generate().unwrap();
/// assert_eq!(codes.len(), 3);
///
/// form.set_quantity("three");
/// assert!(form.generate().is_err());
/// assert_eq!(form.codes().len(), 3);
/// ```
pub struct BarcodeForm {
    product_name: String,
    quantity: Option<usize>,
    codes: Vec<Code>,
    image_options: ImageOptions,
    generator: CodeGenerator,
}

impl Default for BarcodeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl BarcodeForm {
    /// Empty product name, quantity 1, no codes.
    pub fn new() -> Self {
        Self::with_generator(CodeGenerator::new())
    }

    /// A form whose generated codes are reproducible for `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_generator(CodeGenerator::with_seed(seed))
    }

    fn with_generator(generator: CodeGenerator) -> Self {
        Self {
            product_name: String::new(),
            quantity: Some(1),
            codes: Vec::new(),
            image_options: ImageOptions::default(),
            generator,
        }
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn set_product_name<S: Into<String>>(&mut self, product_name: S) {
        self.product_name = product_name.into();
    }

    /// Current quantity, `None` when the last entry was not a number.
    pub fn quantity(&self) -> Option<usize> {
        self.quantity
    }

    /// Updates the quantity from user input. Surrounding blanks are ignored.
    pub fn set_quantity(&mut self, input: &str) {
        self.quantity = input.trim().parse().ok();
        debug!("Quantity set to {:?} from {:?}", self.quantity, input);
    }

    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    pub fn image_options(&self) -> &ImageOptions {
        &self.image_options
    }

    pub fn set_image_options(&mut self, options: ImageOptions) {
        self.image_options = options;
    }

    /// Replaces the code list with `quantity` fresh random codes.
    ///
    /// # Errors
    /// Returns [`BatchError::InvalidQuantity`] when the quantity is 0, above
    /// [`MAX_QUANTITY`](super::code::MAX_QUANTITY) or not a
    /// number. The current codes are kept in that case.
    pub fn generate(&mut self) -> Result<&[Code], BatchError> {
        let quantity = self.quantity.ok_or_else(|| {
            BatchError::InvalidQuantity("quantity is not a number".to_string())
        })?;

        self.codes = self.generator.generate(quantity)?;
        info!(
            "Generated {} codes for product {:?}",
            self.codes.len(),
            self.product_name
        );
        Ok(&self.codes)
    }

    /// Writes `<productName>-barcodes.zip` into `dir`.
    #[cfg(feature = "zip")]
    pub fn export_archive<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, BatchError> {
        export::export_archive(
            &self.product_name,
            &self.codes,
            &self.image_options,
            dir.as_ref(),
        )
    }

    /// Writes `<productName>-barcodes.xlsx` into `dir`.
    #[cfg(feature = "xlsx")]
    pub fn export_spreadsheet<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, BatchError> {
        export::export_spreadsheet(&self.product_name, &self.codes, dir.as_ref())
    }
}
