use anyhow::{bail, Context, Result};
use spacex_to_sqlite::{
    cli::{Cli, Commands},
    config::{default_db_path, Settings},
    graphql::{GraphqlClient, Source},
    pipeline::{self, RunReport},
    schema::table_names,
    ui::{LogUi, Phase, Ui, UiApp},
    writer::SqliteWriter,
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.uses_tui());

    match cli.command {
        Commands::Sync {
            output_db,
            endpoint,
            on_error,
            tui,
        } => {
            let settings = Settings::resolve(output_db, &endpoint, on_error)?;
            let client = GraphqlClient::new(&settings.endpoint, settings.timeout)
                .context("Failed to create HTTP client")?;
            let start = Instant::now();

            let report = if tui {
                let mut ui = UiApp::new()?;
                match sync(&client, &settings, &mut ui) {
                    Ok(report) => {
                        ui.finish(&format!("Loaded {} rows", report.loaded_rows()))?;
                        report
                    }
                    Err(err) => {
                        ui.restore()?;
                        return Err(err);
                    }
                }
            } else {
                sync(&client, &settings, &mut LogUi::new())?
            };

            println!(
                "\nSynced {:?} from {} in {:.1}s\n{}",
                settings.db_path,
                settings.endpoint,
                start.elapsed().as_secs_f64(),
                report
            );

            if !report.is_complete() {
                let failed: Vec<String> = report.failures().map(|(k, _)| k.to_string()).collect();
                bail!("Failed to load: {}", failed.join(", "));
            }
        }

        Commands::Init { output_db } => {
            let db_path = match output_db {
                Some(path) => path,
                None => default_db_path()?,
            };
            let mut writer = SqliteWriter::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?;
            for (table, status) in writer.create_schema()? {
                println!("  {:<11} {}", table, status);
            }
            writer.close()?;
        }

        Commands::Fetch { kind, endpoint } => {
            let client = GraphqlClient::new(&endpoint.endpoint, endpoint.request_timeout())
                .context("Failed to create HTTP client")?;
            let table = client
                .fetch(kind)
                .with_context(|| format!("Failed to fetch {}", kind))?;

            eprintln!("{} rows, columns: {}", table.len(), table.columns().join(", "));
            for row in table.to_json_rows() {
                println!("{}", row);
            }
        }

        Commands::Query { kind } => {
            print!("{}", kind.query());
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

/// Open the database and run the pipeline, reporting through `ui`
fn sync(client: &GraphqlClient, settings: &Settings, ui: &mut impl Ui) -> Result<RunReport> {
    ui.set_phase(Phase::Connecting);
    ui.set_info(format!("{} -> {}", client.endpoint(), settings.db_path.display()));

    let mut writer = SqliteWriter::open(&settings.db_path)
        .with_context(|| format!("Failed to open database {:?}", settings.db_path))?;

    let report = pipeline::run(client, &mut writer, settings.policy, ui)
        .context("Sync failed, nothing was committed")?;

    writer.close()?;
    Ok(report)
}

fn init_logging(tui: bool) {
    let default_level = if tui { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
