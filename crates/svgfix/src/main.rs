//! svgfix: clean up Inkscape SVG drawings for an interactive web viewer.
//!
//! Reads an Inkscape SVG, strips editor-only content, gives every element
//! a unique id, collapses inline styles into a shared stylesheet, and
//! (for schematics) redirects wire colors to CSS variables so the viewer
//! can recolor nets at runtime.
//!
//! # Usage
//!
//! ```text
//! svgfix --variant schematic -i schematic.svg -o schematic.web.svg --report
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use svgfix_pipeline::{FixupConfig, LayerPolicy, Variant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Clean up Inkscape SVG drawings for the web viewer.
///
/// The keyboard variant keeps every layer. The schematic variant keeps
/// only the schematic layer and turns `wire#<color>` group labels into
/// CSS color variables.
#[derive(Parser)]
#[command(name = "svgfix", version)]
struct Cli {
    /// Input SVG file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG file. Not created if the fixup fails.
    #[arg(short, long)]
    output: PathBuf,

    /// Which kind of drawing the input is.
    #[arg(long, value_enum, default_value_t = Preset::Keyboard)]
    variant: Preset,

    /// Label of the layer kept by the schematic variant.
    #[arg(long)]
    layer: Option<String>,

    /// Full fixup config as a JSON string.
    ///
    /// When provided, `--variant` and `--layer` are ignored. Fields left
    /// out take their keyboard defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print a diagnostics report to stdout.
    #[arg(long)]
    report: bool,

    /// Print the diagnostics report as JSON instead.
    #[arg(long)]
    json: bool,

    /// Log more (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Drawing preset selection.
#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Multi-layer keyboard drawing.
    Keyboard,
    /// Circuit schematic with a `Schematic` layer.
    Schematic,
}

impl From<Preset> for Variant {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Keyboard => Self::Keyboard,
            Preset::Schematic => Self::Schematic,
        }
    }
}

/// Build a [`FixupConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// preset flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<FixupConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let mut config = FixupConfig::from(Variant::from(cli.variant));
    if let Some(ref label) = cli.layer {
        match config.layer_policy {
            LayerPolicy::Named {
                label: ref mut kept, ..
            } => label.clone_into(kept),
            LayerPolicy::AllLayers => {
                return Err("--layer only applies to --variant schematic".to_owned());
            }
        }
    }
    Ok(config)
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let input = match std::fs::read_to_string(&cli.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };
    info!(input = %cli.input.display(), bytes = input.len(), "read input");

    let document = match svgfix_xml::parse_document(&input) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    let result = match svgfix_pipeline::fixup(document, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let svg = match svgfix_xml::write_document(&result.document) {
        Ok(svg) => svg,
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::write(&cli.output, &svg) {
        eprintln!("Error writing {}: {e}", cli.output.display());
        return ExitCode::FAILURE;
    }
    info!(output = %cli.output.display(), bytes = svg.len(), "wrote output");

    if cli.json {
        match serde_json::to_string_pretty(&result.report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else if cli.report {
        println!("{}", result.report.report());
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let base = ["svgfix", "-i", "in.svg", "-o", "out.svg"];
        Cli::try_parse_from(base.iter().chain(args)).unwrap()
    }

    #[test]
    fn default_is_keyboard() {
        let config = config_from_cli(&parse(&[])).unwrap();
        assert_eq!(config, FixupConfig::keyboard());
    }

    #[test]
    fn layer_overrides_schematic_label_only() {
        let config = config_from_cli(&parse(&["--variant", "schematic", "--layer", "Board"])).unwrap();
        assert_eq!(
            config.layer_policy,
            LayerPolicy::Named {
                label: "Board".to_owned(),
                id: "Schematic".to_owned(),
            }
        );
    }

    #[test]
    fn layer_with_keyboard_is_rejected() {
        assert!(config_from_cli(&parse(&["--layer", "Board"])).is_err());
    }

    #[test]
    fn config_json_wins_over_flags() {
        let cli = parse(&[
            "--variant",
            "schematic",
            "--config-json",
            r##"{"color_variables": true, "default_color": "#123456"}"##,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.layer_policy, LayerPolicy::AllLayers);
        assert!(config.color_variables);
        assert_eq!(config.default_color, "#123456");
    }

    #[test]
    fn bad_json_is_reported() {
        let cli = parse(&["--config-json", "{"]);
        let err = config_from_cli(&cli).unwrap_err();
        assert!(err.starts_with("Error parsing --config-json"));
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["-vv"]).verbose, 2);
    }
}
