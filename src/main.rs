use clap::{Parser as ClapParser, Subcommand};
use rlang_core::cli::{self, CheckOptions, CheckResult, CliError};
use rlang_core::lexer::TokenizerOptions;
use rlang_core::output::JsonPrinter;
use rlang_core::parser::ParseOptions;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "rlang")]
#[command(about = "rlang - Error-tolerant R tokenizer and parser, plus the R host message codec")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of R source as JSON
    Tokenize {
        /// R file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Drop comment tokens
        #[arg(long)]
        no_comments: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the syntax tree and diagnostics of R source as JSON
    Parse {
        /// R file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Only report syntax errors, not lexical anomalies
        #[arg(long)]
        no_lexical: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Report diagnostics for R source, exiting with 1 if there are errors
    Check {
        /// R file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Only report syntax errors, not lexical anomalies
        #[arg(long)]
        no_lexical: bool,

        /// Fail on warnings too
        #[arg(long)]
        strict: bool,
    },

    /// Encode a JSON message as a hex frame
    Encode {
        /// JSON message file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },

    /// Decode a hex frame into a JSON message
    Decode {
        /// Hex frame file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'rlang docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RLANG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tokenize {
            file,
            no_comments,
            pretty,
        } => read_input(file).map(|source| {
            let tokens = cli::tokenize_to_json(&source, !no_comments);
            println!("{}", JsonPrinter::new(pretty).print(&tokens));
        }),
        Commands::Parse {
            file,
            no_lexical,
            pretty,
        } => read_input(file).map(|source| {
            let options = ParseOptions {
                tokenizer: TokenizerOptions::default(),
                report_lexical_anomalies: !no_lexical,
            };
            let ast = cli::parse_to_json(&source, options);
            println!("{}", JsonPrinter::new(pretty).print(&ast));
        }),
        Commands::Check {
            file,
            no_lexical,
            strict,
        } => run_check(file, !no_lexical, strict),
        Commands::Encode { file } => run_encode(file),
        Commands::Decode { file, pretty } => run_decode(file, pretty),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Reads `file`, or stdin when it is piped.
fn read_optional_input(file: Option<PathBuf>) -> Result<Option<String>, CliError> {
    match file {
        Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn read_input(file: Option<PathBuf>) -> Result<String, CliError> {
    read_optional_input(file)?.ok_or(CliError::NoInput)
}

fn run_check(file: Option<PathBuf>, lexical: bool, strict: bool) -> Result<(), CliError> {
    let options = CheckOptions {
        source: read_optional_input(file)?,
        lexical,
        strict,
    };

    match cli::execute_check(&options)? {
        CheckResult::Valid => println!("No problems found"),
        CheckResult::Diagnostics {
            diagnostics,
            failed,
        } => {
            for diagnostic in &diagnostics {
                println!("{}", diagnostic);
            }
            if failed {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn run_encode(file: Option<PathBuf>) -> Result<(), CliError> {
    let input = read_input(file)?;
    let value: serde_json::Value = serde_json::from_str(&input)?;
    let message = cli::message_from_json(&value)?;
    println!("{}", cli::encode_hex(&message.encode()?));
    Ok(())
}

fn run_decode(file: Option<PathBuf>, pretty: bool) -> Result<(), CliError> {
    let input = read_input(file)?;
    let message = cli::hex_to_message(&input)?;
    let json = cli::message_to_json(&message);
    println!("{}", JsonPrinter::new(pretty).print(&json));
    Ok(())
}
