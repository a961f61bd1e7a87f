use clap::Subcommand;
use pomonoise_core::storage::worklog::DEFAULT_HISTORY_LIMIT;
use pomonoise_core::WorkLog;

#[derive(Subcommand)]
pub enum LogAction {
    /// List recent focus sessions, newest first
    List {
        /// Maximum number of entries
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Total focus minutes for a day
    Today,
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let log = WorkLog::open()?;
    match action {
        LogAction::List { limit, json } => {
            let records = log.recent(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("no sessions logged yet");
            } else {
                for r in &records {
                    println!(
                        "{}  {}  {:>3} min  {}",
                        r.entry.date, r.entry.time_range, r.entry.duration_minutes, r.entry.task_name
                    );
                }
            }
        }
        LogAction::Today => {
            let today = chrono::Local::now().format("%Y-%m-%d").to_string();
            let minutes = log.minutes_on(&today)?;
            println!("{today}: {minutes} min");
        }
    }
    Ok(())
}
