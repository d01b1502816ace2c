use clap::Parser;
use colored::Colorize;
use dirsweep::{
    DEFAULT_TARGET, Interaction, Outcome, Plan, ReclamationResult, SizedMatch, SweepConfig,
    format_size, prompt, sweep,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "dirsweep")]
#[command(about = "Find every folder with a given name, show how much space it takes, and delete it")]
#[command(version)]
struct Cli {
    /// Base path to scan (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Folder name to match
    #[arg(short, long, default_value = DEFAULT_TARGET)]
    name: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,

    /// List matches without prompting or deleting
    #[arg(long)]
    dry_run: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<&Cli> for SweepConfig {
    fn from(cli: &Cli) -> Self {
        SweepConfig::new(&cli.path, &cli.name)
            .force(cli.force)
            .dry_run(cli.dry_run)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[derive(Default)]
struct Console {
    bar: Option<ProgressBar>,
}

impl Interaction for Console {
    fn planned(&mut self, plan: &Plan) {
        println!(
            "\nFound {} '{}' folder(s):\n",
            plan.matches.len().to_string().green().bold(),
            plan.name
        );
        for item in &plan.matches {
            println!(
                "{:<12} {}",
                item.size_human(),
                plan.relative(&item.path).display()
            );
        }
        println!(
            "\n{} {}\n",
            "Total space to be freed:".bold(),
            format_size(plan.total_size()).green().bold()
        );
    }

    fn confirm(&mut self, _plan: &Plan) -> io::Result<bool> {
        prompt::ask("Do you want to delete these folders?")
    }

    fn deleting(&mut self, plan: &Plan) {
        println!("\n{}", "Deleting folders...".red().bold());
        let bar = ProgressBar::new(plan.matches.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.red} {pos}/{len} {wide_msg}") {
            bar.set_style(style);
        }
        self.bar = Some(bar);
    }

    fn item_done(&mut self, item: &SizedMatch, outcome: Result<(), &io::Error>) {
        let Some(bar) = &self.bar else {
            return;
        };
        bar.inc(1);
        bar.set_message(item.path.display().to_string());
        if let Err(err) = outcome {
            bar.suspend(|| {
                eprintln!(
                    "{} Failed to delete {}: {}",
                    "error:".red().bold(),
                    item.path.display(),
                    err
                );
            });
        }
    }
}

fn print_summary(result: &ReclamationResult) {
    println!("\n{}", "=== Summary ===".bold());
    println!("Folders deleted: {}", result.deleted.to_string().green());
    if result.failed > 0 {
        println!("Failed deletions: {}", result.failed.to_string().red());
    }
    println!("Space freed: {}", result.freed_human().green().bold());
    println!("{}", "Cleanup completed!".green().bold());
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = SweepConfig::from(&cli);
    config.root = sweep::resolve_root(&config.root).unwrap_or_else(|err| {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    });
    println!(
        "\n{} for '{}' folders in '{}'...",
        "Scanning".cyan().bold(),
        config.name,
        config.root.display()
    );

    let mut console = Console::default();
    let outcome = sweep::run(&config, &mut console);
    if let Some(bar) = console.bar.take() {
        bar.finish_and_clear();
    }

    match outcome {
        Ok(Outcome::NothingFound(plan)) => {
            println!("{}", format!("No '{}' folders found.", plan.name).yellow());
        }
        Ok(Outcome::DryRun(_)) => {
            println!("{}", "Dry run - nothing was deleted.".yellow());
        }
        Ok(Outcome::Aborted(_)) => {
            println!("{}", "Aborted. No folders were deleted.".yellow());
        }
        Ok(Outcome::Completed { result, .. }) => print_summary(&result),
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            std::process::exit(1);
        }
    }
}
