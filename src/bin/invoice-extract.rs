//! CLI binary for invoice-extract.
//!
//! A thin shim over the library crate: maps CLI flags to `ClientConfig`,
//! drives one `UploadController` through select → submit → results, and
//! prints toasts to stderr and the result to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use invoice_extract::{
    ClientConfig, HttpExtractor, Notification, NotificationKind, Notifier, Phase, SelectedFile,
    SystemClipboard, UploadController,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal notifier ────────────────────────────────────────────────────────

/// Prints toasts to stderr and shows a spinner while an upload is in flight.
struct CliNotifier {
    quiet: bool,
    show_spinner: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliNotifier {
    fn new(quiet: bool, show_spinner: bool) -> Arc<Self> {
        Arc::new(Self {
            quiet,
            show_spinner,
            spinner: Mutex::new(None),
        })
    }

    fn start_spinner(&self) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Extracting");
        bar.set_message("waiting for the extraction service…");
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(bar);
        }
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.lock().ok().and_then(|mut slot| slot.take()) {
            bar.finish_and_clear();
        }
    }
}

impl Notifier for CliNotifier {
    fn notify(&self, n: &Notification) {
        if self.quiet && !n.is_error() {
            return;
        }
        let line = match n.kind {
            NotificationKind::Success => format!("{} {}", green("✔"), n.message),
            NotificationKind::Error => format!("{} {}", red("✘"), red(&n.message)),
            NotificationKind::Default => format!("{} {}", cyan("◆"), n.message),
        };
        eprintln!("{line}");
    }

    fn on_transition(&self, from: Phase, to: Phase) {
        if to == Phase::Submitting && self.show_spinner {
            self.start_spinner();
        } else if from == Phase::Submitting {
            self.stop_spinner();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract an invoice using the local service
  invoice-extract invoice.pdf

  # Use a deployed service and print the raw JSON
  invoice-extract --endpoint https://extract.example.com/api/upload --json scan.png

  # Also copy the JSON to the clipboard
  invoice-extract --copy-json receipt.jpg

CLIPBOARD:
  On Linux the copied text lives only as long as the process that copied it.
  With --copy-json the command keeps running after printing the result and
  exits once something else is copied (or on Ctrl-C). A clipboard manager,
  if one is running, takes the text over immediately.

ACCEPTED FILES:
  JPEG, PNG and PDF up to 10 MB (see --max-size). The type is taken from the
  file extension.

ENVIRONMENT VARIABLES:
  INVOICE_EXTRACT_ENDPOINT   Extraction service URL
  INVOICE_EXTRACT_FIELD      Multipart field name
  INVOICE_EXTRACT_TIMEOUT    Request timeout in seconds (0 disables)
  RUST_LOG                   Override the log filter
"#;

/// Upload an invoice to an extraction service and print the structured result.
#[derive(Parser, Debug)]
#[command(
    name = "invoice-extract",
    version,
    about = "Upload an invoice to an extraction service and print the structured result",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Invoice file (PDF, JPEG or PNG).
    input: PathBuf,

    /// Extraction service URL.
    #[arg(long, env = "INVOICE_EXTRACT_ENDPOINT", default_value = invoice_extract::config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Multipart field name carrying the file.
    #[arg(long, env = "INVOICE_EXTRACT_FIELD", default_value = invoice_extract::config::DEFAULT_FIELD_NAME)]
    field: String,

    /// Largest accepted file in bytes.
    #[arg(long, env = "INVOICE_EXTRACT_MAX_SIZE", default_value_t = invoice_extract::config::DEFAULT_MAX_FILE_SIZE)]
    max_size: u64,

    /// Request timeout in seconds; 0 waits forever.
    #[arg(long, env = "INVOICE_EXTRACT_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Print the raw JSON result instead of the formatted view.
    #[arg(long, env = "INVOICE_EXTRACT_JSON")]
    json: bool,

    /// Copy the JSON result to the system clipboard (on Linux, waits until
    /// the clipboard is replaced).
    #[arg(long)]
    copy_json: bool,

    /// Disable the spinner.
    #[arg(long, env = "INVOICE_EXTRACT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "INVOICE_EXTRACT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "INVOICE_EXTRACT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and toasts cover what a user needs; library INFO logs
    // would only interleave with them.
    let show_spinner = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build controller ─────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let extractor = Arc::new(HttpExtractor::new(&config).context("Failed to build HTTP client")?);
    let notifier = CliNotifier::new(cli.quiet, show_spinner);
    let clipboard = SystemClipboard::holding();
    let mut controller = UploadController::new(config, extractor)
        .with_notifier(notifier)
        .with_clipboard(Arc::new(clipboard));

    // ── Select ───────────────────────────────────────────────────────────
    // Errors from here on were already shown as toasts.
    let file = match SelectedFile::from_path(&cli.input) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{} {}", red("✘"), red(&e.to_string()));
            return Ok(ExitCode::FAILURE);
        }
    };
    if controller.select_file(file).is_err() {
        return Ok(ExitCode::FAILURE);
    }
    if !cli.quiet {
        if let Some(preview) = controller.file_preview() {
            eprintln!("{} {}  ({})", cyan("◆"), preview.name, preview.size);
        }
    }

    // ── Submit ───────────────────────────────────────────────────────────
    if controller.submit().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    // ── Results ──────────────────────────────────────────────────────────
    let Some(view) = controller.view() else {
        anyhow::bail!("extraction finished without a result");
    };
    let text = if cli.json {
        format!("{}\n", view.json)
    } else {
        view.to_text()
    };
    io::stdout()
        .lock()
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;

    if cli.copy_json {
        if clipboard.holds_until_replaced() && !cli.quiet {
            eprintln!(
                "{} Holding the clipboard until something else is copied (Ctrl-C to stop)",
                cyan("◆")
            );
        }
        if controller.copy_result_json().is_err() {
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let timeout = (cli.timeout > 0).then_some(cli.timeout);
    ClientConfig::builder()
        .endpoint(cli.endpoint.clone())
        .field_name(cli.field.clone())
        .max_file_size(cli.max_size)
        .request_timeout_secs(timeout)
        .build()
        .context("Invalid configuration")
}
