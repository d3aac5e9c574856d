use clap::Parser;
use envsubst::{parse_with_options, ExpandOptions, Interpreter, ParserOptions, ProcessEnv};
use std::io::{Read, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envsubst")]
#[command(about = "Substitute shell-style parameter expansions with environment values")]
#[command(version)]
struct Cli {
    /// Expand the template given on the command line
    #[arg(short = 'c')]
    template: Option<String>,

    /// Treat references to unset variables as an error
    #[arg(short = 'u', long = "nounset")]
    nounset: bool,

    /// Maximum nesting depth of ${...} constructs
    #[arg(long = "max-depth", default_value_t = envsubst::parser::MAX_PARSER_DEPTH)]
    max_depth: usize,

    /// Print the parsed tree as JSON instead of expanding it
    #[arg(long = "ast")]
    ast: bool,

    /// Template file to expand
    #[arg()]
    file: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    // ENVSUBST_LOG=envsubst=trace shows parse and expansion events
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("ENVSUBST_LOG"))
        .with_writer(std::io::stderr)
        .init();

    // Determine template source: -c, file, or stdin
    let template = if let Some(t) = cli.template {
        t
    } else if let Some(ref file) = cli.file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: Cannot read template file: {}: {}", file, e);
                std::process::exit(1);
            }
        }
    } else {
        let mut buf = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
            eprintln!("Error: Cannot read stdin: {}", e);
            std::process::exit(1);
        }
        buf
    };

    let parser = ParserOptions {
        max_depth: cli.max_depth,
    };

    let tree = match parse_with_options(&template, parser) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("envsubst: {}", e);
            std::process::exit(1);
        }
    };

    let output = if cli.ast {
        match serde_json::to_string_pretty(&tree) {
            Ok(json) => json + "\n",
            Err(e) => {
                eprintln!("envsubst: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        let options = ExpandOptions {
            nounset: cli.nounset,
            parser,
        };
        match Interpreter::with_options(ProcessEnv, options).expand(&tree) {
            Ok(out) => out,
            Err(e) => {
                eprintln!("envsubst: {}", e);
                std::process::exit(1);
            }
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(output.as_bytes()).and_then(|_| stdout.flush()) {
        eprintln!("envsubst: error writing output: {}", e);
        std::process::exit(1);
    }
}
