//! Headless table: seats the configured players and keeps dealing until Ctrl+C.
//!
//! Usage: rivertable-table [SETTINGS.json]

use rivertable_table::{init_logging, TableEvent, TableService, TableSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(std::env::var_os("RIVERTABLE_LOG_JSON").is_some())?;

    let settings = match std::env::args().nth(1) {
        Some(path) => TableSettings::from_json(&std::fs::read_to_string(&path)?)?,
        None => TableSettings {
            log_dir: Some(std::path::PathBuf::from("logs")),
            ..TableSettings::default()
        },
    };

    let (handle, task) = TableService::spawn(settings)?;
    let mut events = handle.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(err) => tracing::warn!(error = %err, "unprintable event"),
            }
            if matches!(event, TableEvent::Stopped { .. }) {
                break;
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down table");
    if let Some(path) = handle.shutdown().await? {
        eprintln!("round log saved to {}", path.display());
    }
    task.await?;
    printer.await?;
    Ok(())
}
