use std::path::PathBuf;
use std::process::ExitCode;

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use clap::{Parser as ClapParser, Subcommand};
use lambdabridge::dreamcoder::{DreamCoderInput, from_dreamcoder};
use lambdabridge::engine::{CompressionOutput, CompressionRequest, to_dreamcoder};
use lambdabridge::prelude::*;
use log::info;

#[derive(ClapParser)]
#[command(name = "lambdabridge", version, about)]
pub struct Arguments {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a program and pretty-print it
    Parse {
        program: String,
        /// Line width, defaults to the terminal width
        #[arg(long)]
        width: Option<usize>,
    },
    /// Turn a DreamCoder JSON file into a compression request
    Import { input: PathBuf },
    /// Translate a compression engine's output back into DreamCoder form
    Export {
        /// Request produced by `import`
        #[arg(long)]
        request: PathBuf,
        /// JSON answer of the compression engine
        #[arg(long)]
        output: PathBuf,
    },
    /// Print the named form of an inline abstraction
    Abstraction {
        text: String,
        #[arg(long, default_value = "fn_0")]
        name: String,
        /// Print as JSON instead of `name(#0,..) := body`
        #[arg(long)]
        json: bool,
    },
}

fn report_syntax_error(source: &str, error: &SyntaxError) {
    let mut colors = ColorGenerator::new();
    let a = colors.next();

    let file = "<input>";
    let span = (file, error.span());
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_message(format!("{error}"))
        .with_label(
            Label::new(span)
                .with_message("The error occurred here")
                .with_color(a),
        )
        .finish()
        .eprint((file, Source::from(source)));
    if printed.is_err() {
        eprintln!("Error: {error}");
    }
}

fn execute(args: &Arguments, config: &TranslatorConfig) -> BridgeResult<()> {
    match &args.command {
        Command::Parse { program, width } => {
            let expr = parse(program)?;
            match width {
                Some(width) => println!("{}", expr.pretty_string(*width)),
                None => expr.pretty_print(config)?,
            }
        }
        Command::Import { input } => {
            let input = DreamCoderInput::load(input)?;
            let request = from_dreamcoder(&input, config)?;
            info!(
                "Imported {} program(s) and {} library abstraction(s)",
                request.programs.len(),
                request.mapping.len()
            );
            println!("{}", request.to_json_pretty()?);
        }
        Command::Export { request, output } => {
            let request = CompressionRequest::load(request)?;
            let output = CompressionOutput::load(output)?;
            let result = to_dreamcoder(&output, &request.mapping, config)?;
            println!("{}", result.to_json_pretty()?);
        }
        Command::Abstraction { text, name, json } => {
            let abstraction = Abstraction::from_anonymous(name, text, &NameMapping::new(), config)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&abstraction)?);
            } else {
                println!("{abstraction}");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Arguments::parse();

    let config = match TranslatorConfig::resolve(args.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {error}");
            return ExitCode::FAILURE;
        }
    };

    match execute(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(BridgeError::Syntax(error)) => {
            let source = match &args.command {
                Command::Parse { program, .. } => program.as_str(),
                Command::Abstraction { text, .. } => text.as_str(),
                _ => "",
            };
            report_syntax_error(source, &error);
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
