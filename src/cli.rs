use clap::{ArgAction, Parser, Subcommand};
use sci_tools::analyser::logic::{
    Alternative, GroupOrder, JtOutcome, JtRequest, TestMethod, prepare_jt_batch, run_jt_batch,
};
use sci_tools::config::{JtSettings, SettingsOverrides};
use sci_tools::error::Result;
use std::path::PathBuf;

/// Rows shown in the console preview table.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "sci-tools", about = "Statistical screening tools for tabular data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to daily-rotated files in this directory
    #[arg(long, global = true, env = "SCI_TOOLS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Batch Jonckheere-Terpstra trend tests with Benjamini-Hochberg FDR correction
    #[command(name = "jt-test", visible_alias = "jt_test")]
    JtTest(JtTestArgs),
    /// Show version
    Version,
}

#[derive(clap::Args)]
pub struct JtTestArgs {
    /// Path to the CSV file
    pub csv_file: PathBuf,

    /// Name of the grouping column (e.g. 'Sample Type')
    #[arg(long = "group-col")]
    pub group_column: String,

    /// Group order, comma separated (e.g. 'A,B,C,D')
    #[arg(long = "order")]
    pub group_order: String,

    /// Sample identifier column to exclude [default: "Sample Name"]
    #[arg(long = "id-col")]
    pub id_column: Option<String>,

    /// Where to save the results [default: jt_results_fdr.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Direction of the alternative: two_sided, greater, less
    /// (also two-sided, increasing, decreasing) [default: two_sided]
    #[arg(long = "alt")]
    pub alternative: Option<Alternative>,

    /// Apply continuity correction to the normal approximation [default: true]
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub continuity: Option<bool>,

    /// FDR significance threshold [default: 0.05]
    #[arg(long = "fdr")]
    pub fdr_alpha: Option<f64>,

    /// How p-values are computed [default: auto]
    #[arg(long, value_enum)]
    pub method: Option<TestMethod>,

    /// JSON settings file providing defaults for the options above
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl JtTestArgs {
    fn into_request(self) -> Result<JtRequest> {
        let overrides = SettingsOverrides {
            id_column: self.id_column,
            output: self.output,
            alternative: self.alternative,
            continuity: self.continuity,
            fdr_alpha: self.fdr_alpha,
            method: self.method,
        };
        let settings = JtSettings::resolve(self.config.as_deref())?.with_overrides(overrides);

        Ok(JtRequest {
            csv_file: self.csv_file,
            group_column: self.group_column,
            group_order: self.group_order,
            settings,
        })
    }
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::JtTest(args) => handle_jt_test(args),
        Commands::Version => {
            println!("🔖 sci-tools {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn handle_jt_test(args: JtTestArgs) -> Result<()> {
    let request = args.into_request()?;
    let alpha = request.settings.fdr_alpha;

    let batch = prepare_jt_batch(&request)?;
    if !batch.targets.is_empty() {
        print_banner(batch.targets.len(), &batch.order);
    }

    match run_jt_batch(&request, batch)? {
        JtOutcome::NoNumericColumns => {
            println!("Warning: no numeric columns found for analysis.");
        }
        JtOutcome::NoResults { .. } => {
            println!("No results to process.");
        }
        JtOutcome::Completed { report, .. } => {
            println!("{}", report.preview_table(PREVIEW_ROWS));

            println!("\nSummary:");
            for line in report.summary_lines() {
                println!("{line}");
            }
            println!(
                "\nSuccess! Results with FDR (q<{alpha}) saved to: {}",
                request.settings.output.display()
            );
        }
    }
    Ok(())
}

fn print_banner(count: usize, order: &GroupOrder) {
    println!(
        "Analyzing {count} variables, group order: {:?}",
        order.labels()
    );
}
