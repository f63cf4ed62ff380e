//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use learnflow_core::parser::TransferFormat;

#[derive(Debug, Parser)]
#[command(name = "learnflow", version, about = "Leitner flashcards with an optional shared store")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show how the collection is spread over the boxes
    Stats,
    /// List the cards due for review
    Due,
    /// Import cards from a file
    Import {
        /// csv, tsv, quizlet or json
        #[arg(short, long, default_value = "csv")]
        format: TransferFormat,
        path: PathBuf,
    },
    /// Export the collection
    Export {
        /// csv, tsv, quizlet or json
        #[arg(short, long, default_value = "json")]
        format: TransferFormat,
        /// Defaults to the format's standard file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_import_with_format() {
        let args = Args::try_parse_from(["learnflow", "import", "--format", "tsv", "cards.tsv"]).unwrap();
        match args.command {
            Command::Import { format, path } => {
                assert_eq!(format, TransferFormat::Tsv);
                assert_eq!(path, PathBuf::from("cards.tsv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn export_defaults_to_json() {
        let args = Args::try_parse_from(["learnflow", "export"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Export {
                format: TransferFormat::Json,
                output: None,
            }
        ));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["learnflow", "export", "-f", "xml"]).is_err());
    }
}
