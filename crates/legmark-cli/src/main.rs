mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "legmark",
    version,
    about = "Convert legislative bill PDFs to markdown, keeping struck-through text as ~~deletions~~"
)]
struct Cli {
    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one PDF (or a layout JSON from `extract`) to markdown
    Convert {
        /// Path to PDF or extracted layout JSON
        input_file: PathBuf,

        /// Output format: markdown (default) or json
        #[arg(short, long, default_value = "markdown")]
        output: String,

        /// Write the markdown to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Drop struck words instead of wrapping them in ~~
        #[arg(long)]
        omit_struck: bool,

        /// Layout options JSON (see `legmark options`)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,
    },
    /// Extract word boxes, drawings and strike detection without building markdown
    Extract {
        /// Path to PDF file
        pdf_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Only show this page (1-based)
        #[arg(short, long)]
        page: Option<usize>,

        /// Write extracted layouts to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Convert every PDF in a directory
    Batch {
        /// Directory containing *.pdf files
        input_dir: PathBuf,

        /// Directory for the <name>.md outputs
        output_dir: PathBuf,

        /// Re-convert documents that already have markdown
        #[arg(long)]
        overwrite: bool,

        /// Worker threads (default: one per core)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Drop struck words instead of wrapping them in ~~
        #[arg(long)]
        omit_struck: bool,

        /// Layout options JSON (see `legmark options`)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// Output format for the run summary: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Print the default layout options as JSON
    Options,
    /// Inspect question sets used for bill question answering
    Questions {
        #[command(subcommand)]
        action: QuestionsAction,
    },
    /// Plan amendment merges
    Amend {
        #[command(subcommand)]
        action: AmendAction,
    },
}

#[derive(Subcommand)]
enum QuestionsAction {
    /// List predefined question sets
    List,
    /// Show the questions of a preset
    Show {
        /// Preset name (e.g., "maryland")
        preset: String,
    },
    /// Print the JSON schema answers must follow
    Schema {
        /// Preset name
        preset: String,
    },
    /// Validate a custom question set file
    Validate {
        /// Path to JSON question set
        file: PathBuf,
    },
    /// Print the system prompt for a preset
    Prompt {
        /// Preset name
        preset: String,
    },
    /// Check a model's answer JSON against a question set
    Check {
        /// Path to the answer JSON
        answer_file: PathBuf,

        /// Preset name
        #[arg(short, long, default_value = "maryland")]
        preset: String,
    },
}

#[derive(Subcommand)]
enum AmendAction {
    /// List bills with amendments and the order they apply in
    Plan {
        /// Directory of converted markdown
        md_dir: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input_file,
            output,
            out,
            omit_struck,
            options,
        } => commands::convert::run(input_file, &output, out, omit_struck, options),
        Commands::Extract {
            pdf_file,
            output,
            page,
            out,
        } => commands::extract::run(pdf_file, &output, page, out),
        Commands::Batch {
            input_dir,
            output_dir,
            overwrite,
            jobs,
            omit_struck,
            options,
            output,
        } => commands::batch::run(
            input_dir,
            output_dir,
            overwrite,
            jobs,
            omit_struck,
            options,
            &output,
        ),
        Commands::Options => commands::convert::print_default_options(),
        Commands::Questions { action } => match action {
            QuestionsAction::List => commands::questions::list(),
            QuestionsAction::Show { preset } => commands::questions::show(&preset),
            QuestionsAction::Schema { preset } => commands::questions::schema(&preset),
            QuestionsAction::Validate { file } => commands::questions::validate(&file),
            QuestionsAction::Prompt { preset } => commands::questions::prompt(&preset),
            QuestionsAction::Check {
                answer_file,
                preset,
            } => commands::questions::check(&answer_file, &preset),
        },
        Commands::Amend { action } => match action {
            AmendAction::Plan { md_dir } => commands::amend::plan(&md_dir),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
