use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use tracing::error;

use visual_csv::config::{AppConfig, DB_PATH_ENV, STAGE_DELAY_ENV};
use visual_csv::logging::init_logging;
use visual_csv::usecase::services::analytics_service::ChartAxes;
use visual_csv::usecase::services::import_service::ImportStage;
use visual_csv::{CsvEngine, DatasetId, DatasetStore, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "visual-csv", version, about = "Import, browse and export CSV files")]
struct Cli {
    /// SQLite database file holding imported datasets
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<PathBuf>,

    /// Pause between import stages, in milliseconds
    #[arg(long, global = true, env = STAGE_DELAY_ENV, default_value_t = 0)]
    stage_delay_ms: u64,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a .csv file as a new dataset
    Import { file: PathBuf },
    /// List stored datasets
    List,
    /// Show one page of a dataset
    Show {
        id: String,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Numeric column statistics over all rows
    Stats { id: String },
    /// Sampled chart series over the filtered rows
    Chart {
        id: String,
        /// Category column for the x axis
        #[arg(long)]
        x: Option<String>,
        /// Numeric column to plot (repeatable, up to 5)
        #[arg(long)]
        y: Vec<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Write the filtered rows to <name>[_filtered].csv
    Export {
        id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Delete a dataset
    Delete { id: String },
}

#[derive(Args, Debug, Default)]
struct ViewArgs {
    /// Case-insensitive search across all columns
    #[arg(long)]
    search: Option<String>,
    /// Column filter as COLUMN=VALUE (repeatable)
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
    /// Column to sort by
    #[arg(long)]
    sort: Option<String>,
    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    desc: bool,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long)]
    page_size: Option<usize>,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{raw}'"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The CLI still works when a subscriber is already installed.
    let _ = init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        error!(error = %err, "command failed");
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(cli.db, cli.stage_delay_ms)?;
    let store = SqliteStore::new(&config.db_path);
    store
        .init()
        .with_context(|| format!("failed to open dataset store {}", config.db_path.display()))?;

    let mut engine = CsvEngine::new(Arc::new(store), config.engine_config());
    engine.load_datasets().await;
    ensure_ok(&engine)?;

    match cli.command {
        Command::Import { file } => {
            let mut progress = engine.subscribe_progress();
            let printer = tokio::spawn(async move {
                while progress.changed().await.is_ok() {
                    let current = *progress.borrow_and_update();
                    if current.stage != ImportStage::Idle {
                        eprintln!("[{:>3}%] {}", current.percent, current.stage.label());
                    }
                }
            });

            engine.import_csv_file(&file).await;
            printer.abort();
            ensure_ok(&engine)?;

            if let Some(dataset) = engine.state().active_dataset() {
                println!(
                    "imported {} as {} ({} rows, {} columns)",
                    dataset.name,
                    dataset.id,
                    dataset.row_count,
                    dataset.columns.len()
                );
            }
        }
        Command::List => {
            let mut table = Table::new();
            table.set_header(vec!["id", "name", "rows", "columns", "created"]);
            for dataset in &engine.state().datasets {
                table.add_row(vec![
                    dataset.id.to_string(),
                    dataset.name.clone(),
                    dataset.row_count.to_string(),
                    dataset.columns.len().to_string(),
                    format_created_at(dataset.created_at),
                ]);
            }
            println!("{table}");
        }
        Command::Show { id, view } => {
            open_view(&mut engine, &id, &view).await?;
            print_page(&engine);
        }
        Command::Stats { id } => {
            open_view(&mut engine, &id, &ViewArgs::default()).await?;
            let stats = engine.column_stats();
            if stats.is_empty() {
                println!("no numeric columns");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec![
                "column", "unique", "empty", "min", "max", "mean", "sum", "filled",
            ]);
            for stat in stats {
                table.add_row(vec![
                    stat.name,
                    stat.unique_count.to_string(),
                    stat.empty_count.to_string(),
                    stat.min.to_string(),
                    stat.max.to_string(),
                    format!("{:.2}", stat.mean),
                    format!("{:.2}", stat.sum),
                    format!("{:.0}%", stat.fill_percent),
                ]);
            }
            println!("{table}");
        }
        Command::Chart { id, x, y, view } => {
            open_view(&mut engine, &id, &view).await?;
            let Some(mut axes) = engine.default_chart_axes() else {
                println!("dataset has no columns");
                return Ok(());
            };
            if let Some(x) = x {
                axes.x = x;
            }
            if !y.is_empty() {
                axes = ChartAxes { x: axes.x, y: Vec::new() };
                for column in &y {
                    axes.toggle_y(column);
                }
            }

            let series = engine.chart_series(&axes);
            let mut header = vec![series.x_column.clone()];
            header.extend(series.y_columns.iter().cloned());
            let mut table = Table::new();
            table.set_header(header);
            for point in series.points {
                let mut cells = vec![point.label];
                cells.extend(point.values.iter().map(ToString::to_string));
                table.add_row(cells);
            }
            println!("{table}");
        }
        Command::Export { id, out, view } => {
            open_view(&mut engine, &id, &view).await?;
            let path = engine.export_filtered(&out);
            ensure_ok(&engine)?;
            if let Some(path) = path {
                println!("exported {} rows to {}", engine.total_filtered_rows(), path.display());
            }
        }
        Command::Delete { id } => {
            engine.remove_dataset(&DatasetId::from(id.as_str())).await;
            ensure_ok(&engine)?;
            println!("deleted {id}");
        }
    }

    Ok(())
}

fn ensure_ok(engine: &CsvEngine) -> Result<()> {
    match engine.error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

async fn open_view(engine: &mut CsvEngine, id: &str, view: &ViewArgs) -> Result<()> {
    engine.select_dataset(&DatasetId::from(id)).await;
    ensure_ok(engine)?;

    if let Some(page_size) = view.page_size {
        engine.set_page_size(page_size);
    }
    if let Some(search) = &view.search {
        engine.set_global_search(search);
    }
    for (column, value) in &view.filters {
        engine.set_column_filter(column, value);
    }
    if let Some(column) = &view.sort {
        engine.set_sort(column);
        if view.desc {
            engine.set_sort(column);
        }
    }
    engine.set_page(view.page);
    Ok(())
}

fn print_page(engine: &CsvEngine) {
    let state = engine.state();
    let mut table = Table::new();
    table.set_header(state.columns.clone());
    for row in engine.paginated_rows() {
        table.add_row(
            state
                .columns
                .iter()
                .map(|column| row.get(column).to_string())
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    println!(
        "page {} of {} ({} of {} rows)",
        state.pagination.page,
        engine.total_pages(),
        engine.total_filtered_rows(),
        state.all_rows.len()
    );
}

fn format_created_at(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|created| created.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}
