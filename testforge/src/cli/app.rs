use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use testforge_core::Stage;

#[derive(Parser, Debug)]
#[command(
    name = "testforge",
    version,
    about = "Testforge - build, diagnose and repair generated test automation",
    long_about = "Testforge drives the build and test tools over a generated Playwright/Cucumber source tree, classifies what fails, and applies a fixed catalogue of source rewrites until the suite builds and passes or the retry budget runs out."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, help = "Path to testforge.toml (defaults to ./testforge.toml)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the build, diagnose and patch loop
    #[command(about = "Build and test, repairing generated sources between attempts")]
    Run(RunArgs),

    /// Compare feature files against step definitions
    #[command(about = "Report scenario steps with no step definition and synthesize stubs")]
    Reconcile(ReconcileArgs),

    /// Classify saved build or test output
    #[command(about = "Extract diagnostics from saved tool output and show the rule for each")]
    Diagnose(DiagnoseArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Override the configured retry budget
    #[arg(long, help = "Maximum number of build attempts")]
    pub max_attempts: Option<u32>,

    /// Skip stubbing missing steps before the first build
    #[arg(long, help = "Do not reconcile steps before the first build")]
    pub no_reconcile: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Summary format")]
    pub format: OutputFormat,

    /// Also write the JSON session record here
    #[arg(long, help = "Write the session record as JSON to this path")]
    pub report: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ReconcileArgs {
    #[arg(long, help = "Feature file or directory (defaults to the configured features path)")]
    pub features: Option<PathBuf>,

    #[arg(long, help = "Step definition source (defaults to the configured path)")]
    pub steps: Option<PathBuf>,

    /// Insert the stubs instead of printing them
    #[arg(long, help = "Write synthesized stubs into the step definition source")]
    pub write: bool,
}

#[derive(Parser, Debug)]
pub struct DiagnoseArgs {
    /// File holding captured compiler or test output
    #[arg(help = "Captured output of a build or test run")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = StageArg::Compile, help = "Which invocation produced the output")]
    pub stage: StageArg,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageArg {
    Compile,
    Test,
}

impl From<StageArg> for Stage {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Compile => Stage::Compile,
            StageArg::Test => Stage::Test,
        }
    }
}
