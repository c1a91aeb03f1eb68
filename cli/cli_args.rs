use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Condense a project tree into LLM-ready text output.",
    long_about = "condenser scans a project directory, applies layered exclusion rules \n(directory/file/extension lists plus simplified .gitignore patterns), and \nserializes the included files into one or more size-bounded text segments \nwithout ever splitting a file across segment boundaries.",
    after_help = "EXAMPLES:\n  condenser . -o project_codebase.txt\n  condenser ./src --chunked --max-lines 5000\n  condenser . --structure-only\n  condenser . --exclude-dirs .git,target --extra-extensions generated"
)]
pub struct Cli {
    #[arg(
        value_name = "ROOT",
        help = "Project directory to scan (default: current dir)."
    )]
    pub root: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Output file path (default: <root-name>_codebase.txt; extension defaults to .txt).",
        help_heading = "Output"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        conflicts_with = "no_config",
        help = "Path/filename of the TOML config file (default: condenser.toml in the root).",
        help_heading = "Project Setup"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        conflicts_with = "config",
        help = "Disable loading any TOML config file.",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,

    #[arg(
        long,
        value_name = "LIST",
        value_delimiter = ',',
        help = "Directory names to exclude (comma-separated, replaces the configured list).",
        help_heading = "Exclusions"
    )]
    pub exclude_dirs: Option<Vec<String>>,

    #[arg(
        long,
        value_name = "LIST",
        value_delimiter = ',',
        help = "File names or glob patterns to exclude (comma-separated, replaces the configured list).",
        help_heading = "Exclusions"
    )]
    pub exclude_files: Option<Vec<String>>,

    #[arg(
        long,
        value_name = "LIST",
        value_delimiter = ',',
        help = "File extensions to exclude (comma-separated, replaces the configured list).",
        help_heading = "Exclusions"
    )]
    pub exclude_extensions: Option<Vec<String>>,

    #[arg(
        long,
        value_name = "LIST",
        value_delimiter = ',',
        help = "Additional extensions to exclude on top of the configured list.",
        help_heading = "Exclusions"
    )]
    pub extra_extensions: Vec<String>,

    #[arg(
        long,
        help = "Do not apply .gitignore rules found in the project directory.",
        help_heading = "Exclusions"
    )]
    pub no_gitignore: bool,

    #[arg(
        long,
        conflicts_with = "structure_only",
        help = "Omit the directory structure summary from the output.",
        help_heading = "Output"
    )]
    pub no_structure: bool,

    #[arg(
        long,
        help = "Generate structure-only output (no file contents).",
        help_heading = "Output"
    )]
    pub structure_only: bool,

    #[arg(
        long,
        help = "Split the output into multiple segments between file boundaries.",
        help_heading = "Output"
    )]
    pub chunked: bool,

    #[arg(
        long,
        value_name = "N",
        help = "Maximum lines per segment (effective with --chunked).",
        help_heading = "Output"
    )]
    pub max_lines: Option<usize>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence progress, warnings and informational messages.")]
    pub quiet: bool,
}
