mod common;

use std::{fs, io};

use barcode_batch_rs::{
    BatchError,
    barcode::{
        code::{Code, RandomCodeReaderBuilder},
        export::{export_archive, export_spreadsheet},
        image::{BarcodeImageProcessor, ImageOptions, RenderedBarcode},
    },
    core::{
        item::{ItemWriter, ItemWriterResult},
        job::{Job, JobBuilder},
        step::{Step, StepBuilder, StepExecution, StepStatus},
    },
    item::{
        memory::VecItemWriter, xlsx::xlsx_writer::XlsxItemWriterBuilder,
        zip::zip_writer::ZipItemWriterBuilder,
    },
};
use tempfile::TempDir;

use common::full_disk_file;

/// Accepts a fixed number of chunks, then fails every write.
struct FlakyWriter {
    inner: VecItemWriter<RenderedBarcode>,
    accepted_chunks: std::cell::Cell<usize>,
}

impl ItemWriter<RenderedBarcode> for FlakyWriter {
    fn write(&self, items: &[RenderedBarcode]) -> ItemWriterResult {
        if self.accepted_chunks.get() == 0 {
            return Err(BatchError::ItemWriter("disk full".to_string()));
        }
        self.accepted_chunks.set(self.accepted_chunks.get() - 1);
        self.inner.write(items)
    }
}

#[test]
fn code_parsing_should_reject_malformed_input() {
    for input in ["", "123456", "12345678", "0123456", "12a4567", " 1234567", "-123456"] {
        assert!(
            matches!(Code::parse(input), Err(BatchError::InvalidCode(ref value)) if value == input),
            "{input:?} should be rejected"
        );
    }
}

#[test]
fn missing_style_file_should_be_an_io_error() {
    let temp_dir = TempDir::new().unwrap();

    let result = ImageOptions::from_path(temp_dir.path().join("missing.json"));

    assert!(matches!(result, Err(BatchError::Io(error)) if error.kind() == io::ErrorKind::NotFound));
}

#[test]
fn malformed_style_file_should_be_a_configuration_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("style.json");
    fs::write(&path, "{ \"height\": ").unwrap();

    let result = ImageOptions::from_path(&path);

    assert!(matches!(result, Err(BatchError::Configuration(message)) if message.contains("style.json")));
}

#[test]
fn style_with_invalid_colour_should_be_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("style.json");
    fs::write(&path, r##"{ "line_color": "#12345" }"##).unwrap();

    assert!(matches!(
        ImageOptions::from_path(&path),
        Err(BatchError::Configuration(_))
    ));
    assert!(matches!(
        ImageOptions::from_json(r#"{ "background": "transparent" }"#),
        Err(BatchError::Configuration(_))
    ));
}

#[test]
fn oversized_style_file_should_be_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("style.json");
    fs::write(&path, r#"{ "bar_width": 4294967295 }"#).unwrap();

    assert!(matches!(
        ImageOptions::from_path(&path),
        Err(BatchError::Configuration(_))
    ));
}

#[test]
fn oversized_options_should_fail_the_archive_export() {
    let temp_dir = TempDir::new().unwrap();
    let options = ImageOptions {
        height: u32::MAX - 10,
        ..ImageOptions::default()
    };
    let codes = vec![Code::parse("4821907").unwrap()];

    let result = export_archive("Widget", &codes, &options, temp_dir.path());

    assert!(matches!(result, Err(BatchError::Configuration(_))));
    assert!(!temp_dir.path().join("Widget-barcodes.zip").exists());
}

#[test]
fn zero_height_should_be_rejected_by_processor() {
    let options = ImageOptions {
        height: 0,
        ..ImageOptions::default()
    };

    assert!(matches!(
        BarcodeImageProcessor::new(options),
        Err(BatchError::Configuration(_))
    ));
}

#[test]
fn step_should_fail_once_skip_limit_is_exceeded() {
    let _ = env_logger::builder().is_test(true).try_init();

    let reader = RandomCodeReaderBuilder::new()
        .quantity(10)
        .seed(Some(3))
        .build();
    let processor = BarcodeImageProcessor::new(ImageOptions::default()).unwrap();
    let writer = FlakyWriter {
        inner: VecItemWriter::default(),
        accepted_chunks: 1.into(),
    };

    let step = StepBuilder::new("render")
        .chunk(3)
        .reader(&reader)
        .processor(&processor)
        .writer(&writer)
        .skip_limit(3)
        .build()
        .unwrap();

    let mut execution = StepExecution::new(step.get_name());
    let result = step.execute(&mut execution);

    assert!(matches!(result, Err(BatchError::Step(name)) if name == "render"));
    assert_eq!(execution.status, StepStatus::WriteError);
    assert_eq!(execution.write_count, 3);
    assert_eq!(execution.write_error_count, 6);
    assert_eq!(writer.inner.items().len(), 3);
}

#[test]
fn failing_step_should_stop_the_job() {
    let reader = RandomCodeReaderBuilder::new().quantity(2).build();
    let processor = BarcodeImageProcessor::new(ImageOptions::default()).unwrap();
    let broken = ZipItemWriterBuilder::new().from_writer(full_disk_file());
    let never_reached = VecItemWriter::<RenderedBarcode>::default();
    let second_reader = RandomCodeReaderBuilder::new().quantity(2).build();

    let first = StepBuilder::new("broken-archive")
        .chunk(10)
        .reader(&reader)
        .processor(&processor)
        .writer(&broken)
        .build()
        .unwrap();
    let second = StepBuilder::new("in-memory")
        .chunk(10)
        .reader(&second_reader)
        .processor(&processor)
        .writer(&never_reached)
        .build()
        .unwrap();

    let job = JobBuilder::new().start(&first).next(&second).build();
    let result = job.run();

    assert!(matches!(result, Err(BatchError::Step(name)) if name == "broken-archive"));
    assert!(never_reached.items().is_empty());
}

#[test]
fn spreadsheet_export_should_fail_on_unwritable_directory() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let codes = vec![Code::parse("4821907").unwrap()];
    let result = export_spreadsheet("Widget", &codes, &blocker.join("out"));

    assert!(result.is_err());
}

#[test]
fn invalid_sheet_name_should_be_a_configuration_error() {
    let result = XlsxItemWriterBuilder::new()
        .sheet_name("Bar[codes]")
        .to_buffer();

    assert!(matches!(result, Err(BatchError::Configuration(_))));
}
