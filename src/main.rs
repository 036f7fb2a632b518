//! Labbot CLI: explain a lab report PDF, and run the offline review sheets.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};

use labbot_lib::config::AppConfig;
use labbot_lib::eval;
use labbot_lib::intelligence::ReferenceTables;
use labbot_lib::pipeline::delivery::{MessagingChannel, WhatsAppClient};
use labbot_lib::pipeline::extraction::PdfTextExtractor;
use labbot_lib::pipeline::processor::{
    deliver, ProcessedReport, ProcessingError, ProcessorSettings, ReportProcessor,
};
use labbot_lib::pipeline::speech::{GoogleTtsBackend, SpeechBackend, SpeechConfig};
use labbot_lib::pipeline::translation::{
    EchoTranslator, GoogleTranslateBackend, MedicalTranslator, TranslationConfig, Translator,
};

/// Exit code when the document holds no readable lab values.
const EXIT_NO_DATA: u8 = 2;

#[derive(Parser)]
#[command(
    name = "labbot",
    version,
    about = "Explain a printed lab report in plain words, translated and read aloud",
    after_help = "EXAMPLES:\n  \
                  labbot explain report.pdf\n  \
                  labbot explain report.pdf --lang hi --no-audio --json\n  \
                  labbot explain report.pdf --send --to 9876543210 --patient-name Asha\n  \
                  labbot eval-explanations eval/explanations_eval.csv\n  \
                  labbot eval-metrics eval/explanations_eval.csv"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain one lab report PDF
    Explain(ExplainArgs),

    /// Fill system_flag / system_explanation in an explanation review sheet
    EvalExplanations(SheetArgs),

    /// Fill system_output in a translation review sheet
    EvalTranslations(TranslationSheetArgs),

    /// Summarize doctor scores from a reviewed explanation sheet
    EvalMetrics {
        csv: PathBuf,

        /// Print metrics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ExplainArgs {
    /// Lab report PDF
    pdf: PathBuf,

    /// Target language code or name (mr, hi, marathi, ...)
    #[arg(long, default_value = labbot_lib::config::DEFAULT_TARGET_LANG)]
    lang: String,

    /// Skip speech synthesis
    #[arg(long)]
    no_audio: bool,

    /// Tag text instead of calling the translation service
    #[arg(long)]
    echo: bool,

    /// Send the summary and audio over WhatsApp
    #[arg(long)]
    send: bool,

    /// Recipient; defaults to the first mobile number found in the report
    #[arg(long, requires = "send")]
    to: Option<String>,

    /// Name used in the message greeting
    #[arg(long)]
    patient_name: Option<String>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SheetArgs {
    csv: PathBuf,

    /// Output file; defaults to rewriting the input
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct TranslationSheetArgs {
    #[command(flatten)]
    sheet: SheetArgs,

    /// Tag text instead of calling the translation service
    #[arg(long)]
    echo: bool,
}

fn main() -> ExitCode {
    labbot_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::from_env();
    let reference = load_reference(&config)?;

    match cli.command {
        Commands::Explain(args) => explain(&args, &config, &reference),
        Commands::EvalExplanations(args) => {
            let out = args.out.as_deref().unwrap_or(&args.csv);
            let summary = eval::annotate_explanations(&args.csv, out, &reference)?;
            println!(
                "Updated {} with system_flag and system_explanation ({} of {} rows).",
                out.display(),
                summary.updated,
                summary.rows
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::EvalTranslations(args) => {
            let translator = MedicalTranslator::new(
                translator_backend(args.echo)?,
                TranslationConfig::default(),
                &reference,
            );
            let out = args.sheet.out.as_deref().unwrap_or(&args.sheet.csv);
            let summary = eval::translate_rows(&args.sheet.csv, out, &translator)?;
            println!(
                "Updated {} with system_output ({} of {} rows).",
                out.display(),
                summary.updated,
                summary.rows
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::EvalMetrics { csv, json } => {
            let metrics = eval::compute_metrics(&csv)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print!("{metrics}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_reference(config: &AppConfig) -> Result<ReferenceTables> {
    match &config.reference_dir {
        Some(dir) => ReferenceTables::load(dir)
            .with_context(|| format!("loading reference tables from {}", dir.display())),
        None => Ok(ReferenceTables::builtin()),
    }
}

fn translator_backend(echo: bool) -> Result<Box<dyn Translator + Send + Sync>> {
    if echo {
        return Ok(Box::new(EchoTranslator));
    }
    let backend = GoogleTranslateBackend::with_defaults().context("building translation client")?;
    Ok(Box::new(backend))
}

fn explain(args: &ExplainArgs, config: &AppConfig, reference: &ReferenceTables) -> Result<ExitCode> {
    let bytes = read_pdf(&args.pdf)?;

    let speech: Option<Box<dyn SpeechBackend + Send + Sync>> = if args.no_audio {
        None
    } else {
        Some(Box::new(
            GoogleTtsBackend::with_defaults().context("building speech client")?,
        ))
    };

    let settings = ProcessorSettings {
        translation: TranslationConfig::for_language(&args.lang),
        speech: SpeechConfig {
            lang: args.lang.clone(),
            output_dir: config.output_dir.clone(),
            ..SpeechConfig::default()
        },
        write_audio_files: !args.no_audio,
        dump_dir: config.dump_dir.clone(),
        ..ProcessorSettings::default()
    };

    let processor = ReportProcessor::new(
        Box::new(PdfTextExtractor),
        translator_backend(args.echo)?,
        speech,
        reference,
        settings,
    );

    let report = match processor.process_pdf(&bytes) {
        Ok(report) => report,
        Err(ProcessingError::NoDataFound { pages, empty_pages }) => {
            let hint = if pages > 0 && empty_pages == pages {
                "The PDF has no text layer; it looks like a scanned image."
            } else if empty_pages > 0 {
                "Some pages have no text layer and may be scanned; the rest are in an unsupported layout."
            } else {
                "The layout may be unsupported."
            };
            eprintln!("Could not find any lab values in {}. {hint}", args.pdf.display());
            return Ok(ExitCode::from(EXIT_NO_DATA));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("processing {}", args.pdf.display()));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if args.send {
        let Some(phone) = args.to.clone().or_else(|| report.phone_numbers.first().cloned()) else {
            eprintln!("No mobile number found in the report; pass --to to send.");
            return Ok(ExitCode::FAILURE);
        };
        if !config.whatsapp.is_configured() {
            tracing::warn!("WhatsApp credentials missing; sending will fail");
        }
        let client = WhatsAppClient::new(config.whatsapp.clone()).context("building WhatsApp client")?;
        return Ok(send(&report, &client, &phone, args.patient_name.as_deref()));
    }

    Ok(ExitCode::SUCCESS)
}

fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn send(
    report: &ProcessedReport,
    channel: &dyn MessagingChannel,
    phone: &str,
    patient_name: Option<&str>,
) -> ExitCode {
    let outcome = deliver(report, channel, phone, patient_name);
    println!("\nText message: {}", outcome.text.message);
    println!("Audio message: {}", outcome.audio.message);

    if outcome.text.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_report(report: &ProcessedReport) {
    println!("Found {} lab values ({}).", report.records.len(), report.strategy.as_str());
    for w in &report.warnings {
        println!("  note: page {}: {}", w.page_number, w.warning.as_str());
    }
    for e in &report.evaluation.evaluations {
        println!(
            "  {:<28} {:>10} {:<10} {}",
            e.test.name,
            labbot_lib::intelligence::messages::format_number(e.test.value),
            e.test.unit,
            e.severity.as_str()
        );
    }

    println!("\n--- English ---\n{}", report.english_text);

    println!("\n--- Translated ---\n{}", report.localized_text);
    if let Some(err) = &report.translation_error {
        println!("(Translation failed, showing English: {err})");
    }

    if let Some(err) = &report.speech_error {
        println!("\nAudio could not be generated: {err}");
    } else if !report.audio_files.is_empty() {
        println!("\nAudio:");
        for file in &report.audio_files {
            println!("  {}", file.display());
        }
    }

    if !report.phone_numbers.is_empty() {
        println!("\nMobile numbers in report: {}", report.phone_numbers.join(", "));
    }
}
