use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use artographer_export::{ExportOptions, OpenError, export_user_logs, open_database, render_summary};

/// Extract a participant's event logs and write one JSON file per
/// system/task combination.
#[derive(Parser, Debug)]
#[command(name = "artographer-export")]
#[command(version, about, long_about = None)]
struct Cli {
    /// User ID to extract logs for (e.g. P1, P2)
    user_id: String,

    /// Path to the SQLite database
    #[arg(long, default_value = "database.db", env = "ARTOGRAPHER_DB_PATH")]
    db: PathBuf,

    /// Directory to write the per-task JSON files into
    #[arg(long, default_value = "user_logs")]
    output_dir: PathBuf,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artographer=warn".into()),
        )
        .init();

    let db = match open_database(&cli.db) {
        Ok(db) => db,
        Err(e @ OpenError::NotFound(_)) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        Err(OpenError::Database(e)) => return Err(e),
    };

    println!("Extracting logs for user: {}", cli.user_id);
    println!("From database: {}", cli.db.display());

    let options = ExportOptions {
        user_id: cli.user_id,
        output_dir: cli.output_dir,
        pretty: cli.pretty,
    };

    let Some(export) = export_user_logs(&db, &options)? else {
        println!("No logs found for user {}", options.user_id);
        return Ok(());
    };

    for file in &export.files {
        println!("Created: {} ({} logs)", file.path.display(), file.log_count);
    }

    print!("{}", render_summary(&options.user_id, &export.groups));

    println!("\n{}", "=".repeat(50));
    println!(
        "Successfully created {} files in {}",
        export.files.len(),
        options.output_dir.display()
    );
    Ok(())
}
