//! `barcode-batch`: generate product codes and export them as barcodes.
//!
//! ```bash
//! RUST_LOG=info barcode-batch --product-name Widget --quantity 20 --out-dir ./out
//! ```

use std::path::PathBuf;

use anyhow::Context;
use barcode_batch_rs::{
    barcode::{
        code::Code,
        export::{ArchiveExport, SpreadsheetExport},
        form::BarcodeForm,
        image::ImageOptions,
    },
    core::{
        job::{Job, JobBuilder},
        step::Step,
    },
};
use clap::Parser;
use log::info;

/// Generate random 7-digit codes and export them as a PNG archive and a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "barcode-batch", version, about)]
struct Cli {
    /// Product name used in file and entry names.
    #[arg(long, default_value = "")]
    product_name: String,

    /// Number of codes to generate.
    #[arg(long, default_value = "1")]
    quantity: String,

    /// Directory receiving the exported files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write `<product>-barcodes.zip`.
    #[arg(long)]
    archive: bool,

    /// Write `<product>-barcodes.xlsx`.
    #[arg(long)]
    spreadsheet: bool,

    /// JSON file overriding the barcode image options.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Seed for reproducible codes.
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Exports to run as `(archive, spreadsheet)`. Neither flag means both.
    fn exports(&self) -> (bool, bool) {
        match (self.archive, self.spreadsheet) {
            (false, false) => (true, true),
            flags => flags,
        }
    }
}

/// Generated codes and the files written for them.
struct Outcome {
    codes: Vec<Code>,
    written: Vec<PathBuf>,
}

fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    let mut form = match cli.seed {
        Some(seed) => BarcodeForm::with_seed(seed),
        None => BarcodeForm::new(),
    };
    form.set_product_name(cli.product_name.as_str());
    form.set_quantity(&cli.quantity);

    if let Some(style) = &cli.style {
        let options = ImageOptions::from_path(style)
            .with_context(|| format!("Unable to load style {}", style.display()))?;
        form.set_image_options(options);
    }

    let codes = form.generate()?.to_vec();
    let (with_archive, with_spreadsheet) = cli.exports();

    let archive = if with_archive {
        Some(ArchiveExport::to_dir(
            form.product_name(),
            &codes,
            form.image_options().clone(),
            &cli.out_dir,
        )?)
    } else {
        None
    };
    let spreadsheet = if with_spreadsheet {
        Some(SpreadsheetExport::to_dir(
            form.product_name(),
            &codes,
            &cli.out_dir,
        )?)
    } else {
        None
    };

    let execution = {
        let archive_step = archive.as_ref().map(|(export, _)| export.step()).transpose()?;
        let spreadsheet_step = spreadsheet
            .as_ref()
            .map(|(export, _)| export.step())
            .transpose()?;

        let mut steps: Vec<&dyn Step> = Vec::new();
        if let Some(step) = &archive_step {
            steps.push(step);
        }
        if let Some(step) = &spreadsheet_step {
            steps.push(step);
        }

        let job = steps
            .into_iter()
            .fold(JobBuilder::new().name("barcode-export".to_string()), |job, step| {
                job.next(step)
            })
            .build();
        job.run().context("Export failed")?
    };

    info!("Exports done in {:?}", execution.duration);

    let mut written = Vec::new();
    if let Some((export, path)) = archive {
        let archive_execution = execution
            .step_executions
            .iter()
            .find(|step| step.name == "export-archive")
            .context("Archive step did not run")?;
        export.finish(archive_execution)?;
        written.push(path);
    }
    if let Some((_, path)) = spreadsheet {
        written.push(path);
    }

    Ok(Outcome { codes, written })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let outcome = run(&Cli::parse())?;

    for code in &outcome.codes {
        println!("{code}");
    }
    for path in &outcome.written {
        println!("{}", path.display());
    }

    Ok(())
}
