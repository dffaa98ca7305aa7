use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Path to the configuration file (JSON, TOML or YAML) [default: config.json].",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        help = "Ignore any configuration file and use the built-in rules.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub disable_config: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterGroup {
    #[arg(
        long = "include",
        value_name = "REGEX",
        help = "Extra include pattern, appended after the configured ones (repeatable).",
        help_heading = "Filtering"
    )]
    pub include: Vec<String>,

    #[arg(
        long = "exclude",
        value_name = "REGEX",
        help = "Extra exclude pattern, appended after the configured ones (repeatable).",
        help_heading = "Filtering"
    )]
    pub exclude: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "srcflat",
    author,
    version,
    about = "Flatten a project's source files into one text file for LLM context windows.",
    long_about = "srcflat walks a project directory, selects source files with include/exclude \nregular expressions, strips line comments per file extension and concatenates \nthe results behind <<<FILENAME:path>>> markers.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  srcflat generate --project-root ./myapp --output-dir ./out\n  srcflat generate --stdout --exclude tests/\n  srcflat debug --config rules.toml\n  srcflat config --save config.json",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Aggregate the project into a single text file."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "d",
        about = "Show the effective rules and every include/skip decision without writing."
    )]
    Debug(DebugArgs),

    #[command(about = "Show or save the default configuration file.")]
    Config(ConfigArgs),

    #[command(about = "Generate shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub filters: FilterGroup,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for the output file [default: output]. The file is named after the project.",
        help_heading = "Output Control",
        conflicts_with = "output"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Exact output file path.",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Write the aggregated text to standard output instead of a file.",
        help_heading = "Output Control",
        conflicts_with_all = ["output", "output_dir"]
    )]
    pub stdout: bool,

    #[arg(
        long,
        help = "List every included file with its size and line count.",
        help_heading = "Output Control"
    )]
    pub list: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub filters: FilterGroup,

    #[arg(long, help = "Print the report as JSON.")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        value_name = "PATH",
        help = "Save the default configuration to PATH instead of printing it."
    )]
    pub save: Option<PathBuf>,

    #[arg(long, requires = "save", help = "Overwrite PATH if it already exists.")]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: bash]"
    )]
    pub shell: Option<String>,
}
