//! SPECTRE - coordinated multi-view explorer for classifier embeddings
//!
//! CLI commands:
//! - gui: Launch the native dashboard (default)
//! - list: List configured datasets
//! - view: Print a projection's Top-K legend
//! - confusion: Print an aggregated confusion matrix
//! - palette: Print category color assignments

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use spectre::catalog::ProjectionKind;
use spectre::config::{Config, Env};
use spectre::ingest::Datasets;
use spectre::layout::{MemoryStore, YamlPrefs};
use spectre::state::Dashboard;
use spectre::views::DisplayMode;
use spectre::{gui, logging};

#[derive(Parser)]
#[command(name = "spectre")]
#[command(about = "Coordinated views over classifier embeddings, accuracy and confusion data")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to dashboard.yaml config
    #[arg(short, long, default_value = "dashboard.yaml", global = true)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the native dashboard
    Gui,

    /// List configured datasets and whether their files exist
    List,

    /// Print the Top-K legend of a projection
    View {
        #[arg(short, long, value_enum, default_value = "cls")]
        dataset: DatasetArg,

        #[arg(short = 'k', long, default_value = "20")]
        top_k: i64,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the Top-K + Other confusion matrix
    Confusion {
        #[arg(long, default_value = "1")]
        k: u32,

        #[arg(short = 't', long, default_value = "20")]
        top_k: i64,

        #[arg(short, long, value_enum, default_value = "row")]
        mode: ModeArg,

        #[arg(long)]
        json: bool,
    },

    /// Print category -> color assignments after loading every dataset
    Palette {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DatasetArg {
    Cls,
    Tani,
}

impl From<DatasetArg> for ProjectionKind {
    fn from(arg: DatasetArg) -> Self {
        match arg {
            DatasetArg::Cls => ProjectionKind::Cls,
            DatasetArg::Tani => ProjectionKind::Tani,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Counts,
    Row,
}

impl From<ModeArg> for DisplayMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Counts => DisplayMode::Counts,
            ModeArg::Row => DisplayMode::RowNormalized,
        }
    }
}

#[derive(Serialize)]
struct LegendEntry<'a> {
    category: &'a str,
    color: String,
    count: usize,
}

#[derive(Serialize)]
struct PaletteEntry<'a> {
    category: &'a str,
    color: String,
}

#[derive(Serialize)]
struct ConfusionOut<'a> {
    k: u32,
    mode: DisplayMode,
    labels: &'a [String],
    z: &'a [Vec<f64>],
    cmax: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env = Env::load();

    logging::init_logging(&env.log_dir);
    tracing::info!("SPECTRE starting up");
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    let config = Config::load_or_default(&cli.config)?;
    tracing::info!("Config loaded, data directory {:?}", env.data_dir);

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => {
            let datasets = Datasets::load(&env.data_dir, &config.data);
            let store = YamlPrefs::new(&env.prefs_path);
            tracing::info!("Split preferences stored in {:?}", store.path());
            let dashboard = Dashboard::new(&config, datasets, Box::new(store));
            tracing::info!("Launching native dashboard");
            gui::run_dashboard(dashboard)?;
        }

        Commands::List => list_datasets(&config, &env.data_dir),

        Commands::View { dataset, top_k, json } => {
            let dashboard = one_shot(&config, &env.data_dir);
            print_view(dashboard, dataset.into(), top_k, json)?;
        }

        Commands::Confusion { k, top_k, mode, json } => {
            let dashboard = one_shot(&config, &env.data_dir);
            print_confusion(dashboard, k, top_k, mode.into(), json)?;
        }

        Commands::Palette { json } => {
            let dashboard = one_shot(&config, &env.data_dir);
            print_palette(&dashboard, json)?;
        }
    }

    Ok(())
}

/// Dashboard with in-memory preferences, for commands that exit immediately
fn one_shot(config: &Config, data_dir: &Path) -> Dashboard {
    let datasets = Datasets::load(data_dir, &config.data);
    Dashboard::new(config, datasets, Box::new(MemoryStore::default()))
}

fn list_datasets(config: &Config, data_dir: &Path) {
    println!("\n=== Datasets in {} ===\n", data_dir.display());
    for (name, file) in config.data.entries() {
        let present = data_dir.join(file).is_file();
        let marker = if present { "ok" } else { "missing" };
        println!("  {:<28} {:<28} [{}]", name, file, marker);
    }
    println!();
}

fn print_view(mut dashboard: Dashboard, kind: ProjectionKind, top_k: i64, json: bool) -> anyhow::Result<()> {
    dashboard.set_top_k(top_k);
    let Some(view) = dashboard.projection_view(kind) else {
        println!("No {} data", kind.label());
        return Ok(());
    };
    let registry = dashboard.registry();
    let entries: Vec<LegendEntry> = view
        .legend
        .iter()
        .map(|c| LegendEntry {
            category: c,
            color: registry.color_of(c).to_hex(),
            count: view.totals.get(c).copied().unwrap_or(0),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let sampled = if dashboard.datasets().sampled.contains(&kind) { " (synthetic sample)" } else { "" };
    println!(
        "\n=== {} - Top-{} of {} classes, {} points{} ===\n",
        kind.label(),
        dashboard.controls().top_k,
        view.totals.len(),
        view.samples.len(),
        sampled
    );
    for e in &entries {
        println!("  {}  {:<40} {:>6}", e.color, e.category, e.count);
    }
    println!();
    Ok(())
}

fn print_confusion(
    mut dashboard: Dashboard,
    k: u32,
    top_k: i64,
    mode: DisplayMode,
    json: bool,
) -> anyhow::Result<()> {
    if !dashboard.set_cm_k(k) {
        anyhow::bail!("Unsupported k={} (expected one of 1, 5, 10)", k);
    }
    dashboard.set_cm_top_k(top_k);
    dashboard.set_cm_mode(mode);
    let view = dashboard.confusion();

    if json {
        let out = ConfusionOut { k, mode, labels: &view.labels, z: &view.z, cmax: view.cmax };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n=== {} ===\n", dashboard.confusion_title());
    if view.is_empty() {
        println!("  (no counts loaded)\n");
        return Ok(());
    }
    let decimals = match mode {
        DisplayMode::RowNormalized => 3,
        DisplayMode::Counts => 0,
    };
    for (label, row) in view.labels.iter().zip(&view.z) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>8.*}", decimals, v)).collect();
        println!("  {:<32} {}", label, cells.join(" "));
    }
    println!("\n  color ceiling: {:.3}\n", view.cmax);
    Ok(())
}

fn print_palette(dashboard: &Dashboard, json: bool) -> anyhow::Result<()> {
    let entries: Vec<PaletteEntry> = dashboard
        .registry()
        .assignments()
        .map(|(category, color)| PaletteEntry { category, color: color.to_hex() })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("\n=== {} categories ===\n", entries.len());
        for e in &entries {
            println!("  {}  {}", e.color, e.category);
        }
        println!();
    }
    Ok(())
}
