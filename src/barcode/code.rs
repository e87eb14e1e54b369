use std::{
    cell::{Cell, RefCell},
    fmt,
};

use log::debug;
use rand::{
    SeedableRng,
    distr::{Distribution, Uniform},
    rngs::StdRng,
};
use serde::{Serialize, Serializer};

use crate::{
    BatchError,
    core::item::{ItemReader, ItemReaderResult},
};

/// Smallest code that can be generated.
pub const MIN_CODE: u32 = 1_000_000;

/// Largest code that can be generated.
pub const MAX_CODE: u32 = 9_999_999;

/// Number of digits of every code.
pub const CODE_LENGTH: usize = 7;

/// Largest quantity accepted by a single generation.
pub const MAX_QUANTITY: usize = 100_000;

/// A 7-digit numeric product code in `[1000000, 9999999]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);

impl Code {
    /// Parses a code from its decimal representation.
    ///
    /// ```
    /// use barcode_batch_rs::barcode::code::Code;
    ///
    /// assert!(Code::parse("4821907").is_ok());
    /// assert!(Code::parse("0821907").is_err());
    /// assert!(Code::parse("482190").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, BatchError> {
        let valid = value.len() == CODE_LENGTH
            && value.bytes().all(|b| b.is_ascii_digit())
            && !value.starts_with('0');

        if valid {
            Ok(Code(value.to_string()))
        } else {
            Err(BatchError::InvalidCode(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the code.
    pub fn value(&self) -> u32 {
        // Only 7-digit strings are ever stored.
        self.0.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    }

    fn from_value(value: u32) -> Self {
        Code(value.to_string())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Draws codes uniformly at random from `[MIN_CODE, MAX_CODE]`.
///
/// Every code is drawn independently, duplicates are kept.
pub struct CodeGenerator {
    rng: RefCell<StdRng>,
    distribution: Uniform<u32>,
}

impl CodeGenerator {
    /// Creates a generator seeded from the thread-local random source.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Creates a generator that always yields the same sequence for `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            distribution: code_distribution(),
        }
    }

    /// Draws the next code.
    pub fn next_code(&self) -> Code {
        let value = self.distribution.sample(&mut *self.rng.borrow_mut());
        Code::from_value(value)
    }

    /// Generates `quantity` codes.
    ///
    /// # Errors
    /// Returns [`BatchError::InvalidQuantity`] when `quantity` is 0 or above
    /// [`MAX_QUANTITY`].
    ///
    /// ```
    /// use barcode_batch_rs::barcode::code::CodeGenerator;
    ///
    /// let codes = CodeGenerator::new().generate(5).unwrap();
    /// assert_eq!(codes.len(), 5);
    /// assert!(CodeGenerator::new().generate(0).is_err());
    /// assert!(CodeGenerator::new().generate(usize::MAX).is_err());
    /// ```
    pub fn generate(&self, quantity: usize) -> Result<Vec<Code>, BatchError> {
        if quantity == 0 {
            return Err(BatchError::InvalidQuantity(
                "quantity must be at least 1".to_string(),
            ));
        }
        if quantity > MAX_QUANTITY {
            return Err(BatchError::InvalidQuantity(format!(
                "{quantity} exceeds the limit of {MAX_QUANTITY} codes"
            )));
        }

        let mut codes = Vec::new();
        codes
            .try_reserve_exact(quantity)
            .map_err(|error| BatchError::InvalidQuantity(format!("{quantity}: {error}")))?;
        codes.extend((0..quantity).map(|_| self.next_code()));
        debug!("Generated {} codes", codes.len());
        Ok(codes)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn code_distribution() -> Uniform<u32> {
    match Uniform::new_inclusive(MIN_CODE, MAX_CODE) {
        Ok(distribution) => distribution,
        // MIN_CODE < MAX_CODE, the range is never empty.
        Err(_) => unreachable!("empty code range"),
    }
}

/// An `ItemReader` producing a fixed number of random codes.
pub struct RandomCodeReader {
    generator: CodeGenerator,
    remaining: Cell<usize>,
}

impl ItemReader<Code> for RandomCodeReader {
    fn read(&self) -> ItemReaderResult<Code> {
        if self.remaining.get() == 0 {
            return Ok(None);
        }
        self.remaining.set(self.remaining.get() - 1);

        let code = self.generator.next_code();
        debug!("Code: {}", code);
        Ok(Some(code))
    }
}

#[derive(Default)]
pub struct RandomCodeReaderBuilder {
    quantity: usize,
    seed: Option<u64>,
}

impl RandomCodeReaderBuilder {
    pub fn new() -> RandomCodeReaderBuilder {
        RandomCodeReaderBuilder {
            quantity: 0,
            seed: None,
        }
    }

    pub fn quantity(mut self, quantity: usize) -> RandomCodeReaderBuilder {
        self.quantity = quantity;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> RandomCodeReaderBuilder {
        self.seed = seed;
        self
    }

    pub fn build(self) -> RandomCodeReader {
        let generator = match self.seed {
            Some(seed) => CodeGenerator::with_seed(seed),
            None => CodeGenerator::new(),
        };

        RandomCodeReader {
            generator,
            remaining: self.quantity.into(),
        }
    }
}
