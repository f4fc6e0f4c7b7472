use clap::{Args, Parser, Subcommand, ValueEnum};
use refile_core::OutputFormat;
use std::path::PathBuf;

/// Rule-driven batch file renamer
#[derive(Parser, Debug)]
#[command(name = "refile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output (also disabled when NO_COLOR is set)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Run as if started in <path> instead of the current working directory
    #[arg(short = 'C', global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Assume yes for all prompts (also enabled when REFILE_YES is set)
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,
}

/// Rule inputs shared by preview, apply, and save
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Mapping rule as PATTERN=REPLACEMENT. Repeatable; rules apply in the
    /// order given, each one transforming the previous rule's output
    #[arg(short = 'm', long = "map", value_name = "PATTERN=REPLACEMENT")]
    pub map: Vec<String>,

    /// Treat --map patterns as regular expressions
    #[arg(long)]
    pub regex: bool,

    /// Match --map patterns case-insensitively
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Substrings to delete from every name; a comma splits the value into
    /// multiple whole-segment patterns
    #[arg(short = 'd', long, value_name = "SEGMENTS")]
    pub delete: Option<String>,

    /// Prefix to add to the stem unless already present
    #[arg(short = 'p', long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Suffix to add to the stem (before the extension) unless already present
    #[arg(short = 's', long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Rule document (JSON) to load first; other flags layer on top of it
    #[arg(short = 'r', long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Plain-text rules to import, one PATTERN=REPLACEMENT per line
    #[arg(long, value_name = "FILE")]
    pub import: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Summary,
    Table,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Summary => Self::Summary,
            OutputFormatArg::Table => Self::Table,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what a rename would do without touching any file
    Preview {
        /// Directory whose files will be renamed
        directory: PathBuf,

        #[command(flatten)]
        rule_args: RuleArgs,

        /// Report format (defaults to the configured format)
        #[arg(short = 'o', long, value_enum)]
        output: Option<OutputFormatArg>,
    },

    /// Rename the files in a directory
    Apply {
        /// Directory whose files will be renamed
        directory: PathBuf,

        #[command(flatten)]
        rule_args: RuleArgs,

        /// Report format (defaults to the configured format)
        #[arg(short = 'o', long, value_enum)]
        output: Option<OutputFormatArg>,
    },

    /// Write the given rules to a rule document
    Save {
        /// Path of the rule document to write
        file: PathBuf,

        #[command(flatten)]
        rule_args: RuleArgs,

        /// Name stored in the document
        #[arg(long)]
        name: Option<String>,

        /// Description stored in the document
        #[arg(long)]
        description: Option<String>,

        /// Working directory stored in the document
        #[arg(long, value_name = "PATH")]
        work_path: Option<String>,
    },

    /// Print a summary of a rule document
    Show {
        /// Path of the rule document to read
        file: PathBuf,
    },

    /// Export a document's mapping rules in the plain-text form
    Export {
        /// Path of the rule document to read
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short = 'O', long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}
