use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Emit logs as bunyan-formatted JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build analytes for every run and match them across replicates, samples and blanks.
    Run(RunArgs),
    /// Annotate an external peak list with the results of a previous run.
    Annotate(AnnotateArgs),
    /// Write a template configuration file.
    WriteTemplate(WriteTemplateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Directory with the sample run files (will over-write the config file)
    #[arg(short, long)]
    pub sample_dir: Option<PathBuf>,

    /// Directory with the blank run files (will over-write the config file)
    #[arg(short, long)]
    pub blank_dir: Option<PathBuf>,

    /// Path to the output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Draw a progress bar while runs are processed
    #[arg(short, long)]
    pub progress: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AnnotateArgs {
    /// Annotation table written by the `run` command
    #[arg(short, long)]
    pub table: PathBuf,

    /// CSV file with `mz` and `rt` columns
    #[arg(short, long)]
    pub peak_list: PathBuf,

    /// Sample the peak list was measured on
    #[arg(short, long)]
    pub sample: String,

    /// Replicate number the peak list was measured on
    #[arg(short, long)]
    pub replicate: u8,

    /// Where to write the annotated CSV
    #[arg(short, long)]
    pub output_path: PathBuf,

    /// Configuration to take the tolerances from (defaults otherwise)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct WriteTemplateArgs {
    /// The path to the output file.
    #[arg(short, long)]
    pub output_path: PathBuf,
}
