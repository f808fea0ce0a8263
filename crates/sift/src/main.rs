//! Command-line interface for the sift query parser.

use std::{io, process::ExitCode};

use clap::{Parser, Subcommand};
use sift_query::parse;
use tracing::level_filters::LevelFilter;

mod output;

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Parse modal-verb search queries into structured trees")]
struct Cli {
    /// Log verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Parse a query and print its tree
    Parse {
        /// Raw query text
        query: String,

        /// Print the canonical query string instead of the tree outline
        #[arg(long)]
        canonical: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the leaf terms of a parsed query
    Leaves {
        /// Raw query text
        query: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Validate a query, printing its canonical form on success
    Check {
        /// Raw query text
        query: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            query,
            canonical,
            json,
        } => cmd_parse(&query, canonical, json),
        Commands::Leaves { query, json } => cmd_leaves(&query, json),
        Commands::Check { query } => cmd_check(&query),
    }
}

/// Initializes the tracing subscriber on stderr.
fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Implements `sift parse`.
fn cmd_parse(query: &str, canonical: bool, json: bool) -> ExitCode {
    let tree = match parse(query) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        let Some(wire) = output::WireNode::from_tree(&tree) else {
            eprintln!("error: refusing to serialize an invalid tree");
            return ExitCode::FAILURE;
        };
        return output::print_json(&wire);
    }

    if canonical {
        println!("{tree}");
    } else {
        print!("{}", output::render_tree(&tree));
    }
    ExitCode::SUCCESS
}

/// Implements `sift leaves`.
fn cmd_leaves(query: &str, json: bool) -> ExitCode {
    let tree = match parse(query) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        return output::print_json(&output::wire_leaves(&tree));
    }

    for leaf in tree.leaves() {
        println!("{}\t{}", leaf.verb(), leaf.phrase());
    }
    ExitCode::SUCCESS
}

/// Implements `sift check`.
fn cmd_check(query: &str) -> ExitCode {
    match parse(query) {
        Ok(tree) => {
            println!("{tree}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
