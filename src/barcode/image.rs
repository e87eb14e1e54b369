//! Rendering of codes as CODE128 barcode images.
//!
//! A code is encoded into bar modules with `barcoders`, painted into an RGB
//! raster with `image` and returned as PNG bytes inside a [`RenderedBarcode`].
//! The rendered bytes are handed to the next component of the step, nothing is
//! looked up afterwards.
//!
//! ```
//! use barcode_batch_rs::barcode::code::Code;
//! use barcode_batch_rs::barcode::image::{render, ImageOptions};
//!
//! let code = Code::parse("4821907").unwrap();
//! let barcode = render(&code, &ImageOptions::default()).unwrap();
//!
//! assert_eq!(barcode.code, code);
//! assert_eq!(barcode.height, 10 + 100 + 2 + 14 + 10);
//! assert!(barcode.png.starts_with(&[0x89, b'P', b'N', b'G']));
//! ```

use std::{fs::File, io::Cursor, path::Path};

use barcoders::sym::code128::Code128;
use image::{ImageFormat, Rgb, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    BatchError,
    core::item::{ItemProcessor, ItemProcessorResult},
};

use super::code::{Code, MIN_CODE};

/// Prefix selecting the CODE128 B character set.
const CHARSET_B: char = 'Ɓ';

/// Rows of the built-in label font, 5 pixels wide and 7 high, one entry per digit.
const DIGIT_GLYPHS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Largest image accepted, in pixels.
pub const MAX_PIXELS: u64 = 16_000_000;

/// Visual parameters of a rendered barcode.
///
/// Missing fields take their default value when deserialized, so a style file
/// only needs the options it overrides:
///
/// ```
/// use barcode_batch_rs::barcode::image::ImageOptions;
///
/// let options = ImageOptions::from_json(r##"{ "height": 60, "background": "#fafafa" }"##).unwrap();
/// assert_eq!(options.height, 60);
/// assert_eq!(options.bar_width, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// Background colour, `#rrggbb` or `#rgb`
    pub background: String,
    /// Bar and label colour, `#rrggbb` or `#rgb`
    pub line_color: String,
    /// Width in pixels of the narrowest bar
    pub bar_width: u32,
    /// Height in pixels of the bars
    pub height: u32,
    /// Height in pixels reserved for the label
    pub font_size: u32,
    /// Quiet zone around the symbol
    pub margin: u32,
    /// Gap between the bars and the label
    pub text_margin: u32,
    /// Whether the code is printed under the bars
    pub display_value: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            line_color: "#000000".to_string(),
            bar_width: 2,
            height: 100,
            font_size: 14,
            margin: 10,
            text_margin: 2,
            display_value: true,
        }
    }
}

impl ImageOptions {
    pub fn from_json(json: &str) -> Result<Self, BatchError> {
        let options: ImageOptions = serde_json::from_str(json)
            .map_err(|error| BatchError::Configuration(error.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a JSON style file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let file = File::open(path.as_ref())?;
        let options: ImageOptions = serde_json::from_reader(file).map_err(|error| {
            BatchError::Configuration(format!("{}: {}", path.as_ref().display(), error))
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Checks the options and resolves the colours.
    fn palette(&self) -> Result<Palette, BatchError> {
        if self.bar_width == 0 {
            return Err(BatchError::Configuration(
                "bar_width must be at least 1".to_string(),
            ));
        }
        if self.height == 0 {
            return Err(BatchError::Configuration(
                "height must be at least 1".to_string(),
            ));
        }

        Ok(Palette {
            background: parse_color(&self.background)?,
            line: parse_color(&self.line_color)?,
        })
    }

    /// Checks the options against a 7-digit symbol, which always has the
    /// same number of modules.
    fn validate(&self) -> Result<Palette, BatchError> {
        let palette = self.palette()?;
        let modules = encode(&MIN_CODE.to_string())?;
        self.dimensions(modules.len())?;
        Ok(palette)
    }

    /// Width and height of the image of a symbol of `modules` modules.
    fn dimensions(&self, modules: usize) -> Result<(u32, u32), BatchError> {
        let too_large = || {
            BatchError::Configuration(format!(
                "barcode image would exceed {MAX_PIXELS} pixels"
            ))
        };

        let margins = self.margin.checked_mul(2).ok_or_else(too_large)?;
        let label = if self.display_value {
            self.text_margin
                .checked_add(self.font_size)
                .ok_or_else(too_large)?
        } else {
            0
        };

        let width = u32::try_from(modules)
            .ok()
            .and_then(|modules| modules.checked_mul(self.bar_width))
            .and_then(|bars| bars.checked_add(margins))
            .ok_or_else(too_large)?;
        let height = margins
            .checked_add(self.height)
            .and_then(|height| height.checked_add(label))
            .ok_or_else(too_large)?;

        if u64::from(width) * u64::from(height) > MAX_PIXELS {
            return Err(too_large());
        }
        Ok((width, height))
    }
}

struct Palette {
    background: Rgb<u8>,
    line: Rgb<u8>,
}

fn parse_color(value: &str) -> Result<Rgb<u8>, BatchError> {
    let invalid = || BatchError::Configuration(format!("invalid colour: {value}"));

    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

    match hex.len() {
        6 => Ok(Rgb([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ])),
        3 => {
            let short = |i: usize| channel(&hex[i..=i]).map(|c| c * 17);
            Ok(Rgb([short(0)?, short(1)?, short(2)?]))
        }
        _ => Err(invalid()),
    }
}

/// A code together with its PNG image.
#[derive(Debug, Clone)]
pub struct RenderedBarcode {
    pub code: Code,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Renders `code` as a CODE128 barcode.
///
/// The image is `modules * bar_width + 2 * margin` pixels wide and
/// `margin + height + margin` pixels high, plus `text_margin + font_size`
/// when the label is displayed. Images above [`MAX_PIXELS`] are refused.
pub fn render(code: &Code, options: &ImageOptions) -> Result<RenderedBarcode, BatchError> {
    let palette = options.palette()?;

    let modules = encode(code.as_str())?;
    let (width, height) = options.dimensions(modules.len())?;

    let mut canvas = RgbImage::from_pixel(width, height, palette.background);

    for (index, module) in modules.iter().enumerate() {
        if *module == 1 {
            let x = options.margin + index as u32 * options.bar_width;
            fill(
                &mut canvas,
                x,
                options.margin,
                options.bar_width,
                options.height,
                palette.line,
            );
        }
    }

    if options.display_value {
        draw_label(&mut canvas, code.as_str(), options, palette.line);
    }

    let mut png = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|error| BatchError::ItemProcessor(format!("{code}: {error}")))?;

    debug!(
        "Rendered {} as {}x{} PNG ({} bytes)",
        code,
        width,
        height,
        png.len()
    );

    Ok(RenderedBarcode {
        code: code.clone(),
        width,
        height,
        png,
    })
}

fn encode(value: &str) -> Result<Vec<u8>, BatchError> {
    Code128::new(format!("{CHARSET_B}{value}"))
        .map(|symbol| symbol.encode())
        .map_err(|error| BatchError::ItemProcessor(format!("{value}: {error}")))
}

fn fill(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y..(y + height).min(canvas.height()) {
        for px in x..(x + width).min(canvas.width()) {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn draw_label(canvas: &mut RgbImage, text: &str, options: &ImageOptions, color: Rgb<u8>) {
    let scale = (options.font_size / GLYPH_HEIGHT).max(1);
    let advance = (GLYPH_WIDTH + 1) * scale;
    let digits = text.bytes().filter(u8::is_ascii_digit).count() as u32;
    let text_width = (digits * advance).saturating_sub(scale);

    let left = canvas.width().saturating_sub(text_width) / 2;
    let top = options.margin
        + options.height
        + options.text_margin
        + options.font_size.saturating_sub(GLYPH_HEIGHT * scale) / 2;

    let glyphs = text
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| &DIGIT_GLYPHS[usize::from(b - b'0')]);

    for (position, glyph) in glyphs.enumerate() {
        let origin = left + position as u32 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for column in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - column)) != 0 {
                    fill(
                        canvas,
                        origin + column * scale,
                        top + row as u32 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}

/// An `ItemProcessor` turning every code into its rendered barcode.
pub struct BarcodeImageProcessor {
    options: ImageOptions,
}

impl BarcodeImageProcessor {
    /// # Errors
    /// Returns [`BatchError::Configuration`] when the options are invalid.
    pub fn new(options: ImageOptions) -> Result<Self, BatchError> {
        options.validate()?;
        Ok(Self { options })
    }
}

impl ItemProcessor<Code, RenderedBarcode> for BarcodeImageProcessor {
    fn process(&self, item: &Code) -> ItemProcessorResult<RenderedBarcode> {
        render(item, &self.options)
    }
}
