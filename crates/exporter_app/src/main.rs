//! Command line front end for the chat exporter.
//!
//! Usage:
//!   chat-exporter `<input>` [-o `<file>`] [-c `<config>`] [--base-url `<url>`] [--tokens]
//!
//! Markdown goes to stdout unless an output file is given; logs always go to
//! stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use exporter_engine::{
    decode_html, write_atomically, Converter, ExporterConfig, TranscriptConverter,
    TranscriptExtractor,
};
use exporter_logging::{exporter_debug, exporter_info};
use url::Url;

/// Why a run stopped, mapped onto the process exit code.
enum Failure {
    /// Conversion, configuration, decoding or output error.
    Conversion(anyhow::Error),
    /// The input file is missing or unreadable.
    Input(anyhow::Error),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Conversion(_) => 1,
            Failure::Input(_) => 2,
        }
    }

    fn error(&self) -> &anyhow::Error {
        match self {
            Failure::Conversion(err) | Failure::Input(err) => err,
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Conversion(err)
    }
}

fn cli() -> Command {
    Command::new("chat-exporter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert a saved Gemini chat page into Markdown")
        .arg_required_else_help(true)
        .arg(
            Arg::new("input")
                .help("Path to the saved HTML page")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write Markdown to this file instead of stdout")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("RON configuration file (style, source profile, indent unit)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Resolve relative link targets and image sources against this URL"),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .help("Print the extracted token stream as JSON instead of Markdown")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    exporter_logging::initialize_terminal(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("Error: {:#}", failure.error());
            ExitCode::from(failure.exit_code())
        }
    }
}

fn run(matches: &ArgMatches) -> Result<(), Failure> {
    let Some(input) = matches.get_one::<PathBuf>("input") else {
        return Err(Failure::Input(anyhow::anyhow!("no input file given")));
    };
    let bytes = fs::read(input)
        .with_context(|| format!("cannot read input file {}", input.display()))
        .map_err(Failure::Input)?;

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ExporterConfig::load(path).map_err(anyhow::Error::from)?,
        None => ExporterConfig::default(),
    };
    let converter = build_converter(&config, matches.get_one::<String>("base-url"))?;

    let decoded = decode_html(&bytes)
        .with_context(|| format!("cannot decode {}", input.display()))?;
    exporter_debug!("decoded {} as {}", input.display(), decoded.encoding_label);

    let output = converter
        .to_markdown(&decoded.html)
        .with_context(|| format!("cannot convert {}", input.display()))?;

    let rendered = if matches.get_flag("tokens") {
        let mut json = serde_json::to_string_pretty(&output.tokens)
            .context("cannot serialize token stream")?;
        json.push('\n');
        json
    } else {
        output.markdown
    };

    match matches.get_one::<PathBuf>("output") {
        Some(target) => write_output(target, &rendered)?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn build_converter(
    config: &ExporterConfig,
    base_url: Option<&String>,
) -> anyhow::Result<TranscriptConverter> {
    let Some(base_url) = base_url else {
        return Ok(TranscriptConverter::from_config(config));
    };
    let base_url =
        Url::parse(base_url).with_context(|| format!("invalid base URL {base_url:?}"))?;
    let extractor = TranscriptExtractor::new(config.profile.clone()).with_base_url(base_url);
    Ok(TranscriptConverter::new(extractor, config.style.clone())
        .with_indent_unit(config.indent_unit.clone()))
}

fn write_output(target: &Path, content: &str) -> anyhow::Result<()> {
    write_atomically(target, content)
        .with_context(|| format!("cannot write {}", target.display()))?;
    exporter_info!("Converted content written to {}.", target.display());
    Ok(())
}
