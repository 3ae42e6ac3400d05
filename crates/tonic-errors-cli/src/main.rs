//! CLI for `tonic-errors`.
//!
//! # Subcommands
//!
//! ```text
//! # Print the status → gRPC code mapping table
//! tonic-errors table
//!
//! # Show what a server boundary sends for an error
//! tonic-errors encode --status 404 --detail "user not found"
//!
//! # Decode a gRPC status message received by a client
//! tonic-errors decode '{"statusHTTP":404,"details":["user not found"]}'
//!
//! # Validate an error-handling config file
//! tonic-errors check-config config/errors.yaml
//! ```

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tonic_errors::{decode_status, grpc_code_name, AppError, Codec, ErrorsConfig, StatusTable};

/// Inspect and exercise the structured error mapping.
#[derive(Parser)]
#[command(name = "tonic-errors", version, about)]
enum Cli {
    /// Print every row of the status → gRPC code mapping table.
    Table,

    /// Encode an error the way a gRPC server boundary does.
    Encode(EncodeArgs),

    /// Decode a gRPC status message back into a structured error.
    ///
    /// Exits with an error when the message is not a structured error.
    Decode(DecodeArgs),

    /// Load and validate an error-handling config file.
    CheckConfig(CheckConfigArgs),
}

#[derive(Parser)]
struct EncodeArgs {
    /// Transport-neutral status (HTTP status semantics, 444 = client closed request).
    #[arg(short, long)]
    status: u16,

    /// Detail to attach. Repeat for several details.
    #[arg(short, long)]
    detail: Vec<String>,
}

#[derive(Parser)]
struct DecodeArgs {
    /// gRPC status message (the JSON error body).
    message: String,
}

#[derive(Parser)]
struct CheckConfigArgs {
    /// Path to the YAML config file.
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let codec = Codec::default();

    match cli {
        Cli::Table => print!("{}", render_table(codec.table())),
        Cli::Encode(args) => print!("{}", run_encode(&codec, &args)),
        Cli::Decode(args) => print!("{}", run_decode(&args)?),
        Cli::CheckConfig(args) => print!("{}", run_check_config(&args)?),
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn render_table(table: &StatusTable) -> String {
    let rows: String = table
        .entries()
        .map(|(status, code)| format!("{status} -> {}\n", grpc_code_name(code)))
        .collect();
    format!("{rows}*   -> {}\n", grpc_code_name(tonic::Code::Unknown))
}

fn run_encode(codec: &Codec, args: &EncodeArgs) -> String {
    let err = args
        .detail
        .iter()
        .fold(AppError::new(args.status), |err, detail| err.with_detail(detail.clone()));
    let status = codec.encode_status(&err);
    tracing::debug!(status = args.status, code = ?status.code(), "encoded");
    format!("code: {}\nmessage: {}\n", grpc_code_name(status.code()), status.message())
}

fn run_decode(args: &DecodeArgs) -> anyhow::Result<String> {
    let status = tonic::Status::unknown(args.message.clone());
    let Some(err) = decode_status(&status) else {
        bail!("message is not a structured error: {}", args.message);
    };
    Ok(render_decoded(&err))
}

fn render_decoded(err: &AppError) -> String {
    if err.details().is_empty() {
        return format!("status: {}\ndetails: (none)\n", err.status());
    }
    let details: String = err
        .details()
        .iter()
        .map(|detail| format!("  - {detail}\n"))
        .collect();
    format!("status: {}\ndetails:\n{details}", err.status())
}

fn run_check_config(args: &CheckConfigArgs) -> anyhow::Result<String> {
    let config = ErrorsConfig::load(&args.path)
        .with_context(|| format!("Failed to load config: {}", args.path.display()))?;

    let headers = if config.required_headers.is_empty() {
        "(none)".to_string()
    } else {
        config.required_headers.join(", ")
    };
    Ok(format!(
        "{}: ok\ndefault error: {} ({} details)\nrequired headers: {headers}\n",
        args.path.display(),
        config.default_error.status,
        config.default_error.details.len(),
    ))
}
