use clap::Subcommand;
use taskfocus_core::format::format_window;
use chrono::Utc;
use taskfocus_core::{Config, FocusReport, HttpGateway, TaskGateway, TaskStatus};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List your tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Only show tasks with this status
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Change a task's status
    Status {
        /// Task ID
        id: String,
        /// New status: todo, in-progress, completed, expired
        status: TaskStatus,
    },
    /// Show focused-time statistics for a task
    FocusStats {
        /// Task ID
        id: String,
    },
    /// Show task counts and focused time over the last 7 days
    Analytics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let gateway = HttpGateway::from_config(&config.api)?;

    match action {
        TaskAction::List { json, status } => {
            let user_id = user_id(&config)?;
            let tasks: Vec<_> = gateway
                .fetch_tasks(user_id)
                .await?
                .into_iter()
                .filter(|t| status.map_or(true, |s| t.status == s))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    println!("{:<26} {:<12} {}", task.id, task.status.as_str(), task.name);
                    println!("{:<26} {}", "", format_window(task));
                }
            }
        }
        TaskAction::Status { id, status } => {
            let task = gateway.update_task_status(&id, status).await?;
            println!("Task updated: {} [{}]", task.name, task.status);
        }
        TaskAction::FocusStats { id } => {
            let stats = gateway.focused_time_stats(&id).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        TaskAction::Analytics { json } => {
            let user_id = user_id(&config)?;
            let today = Utc::now().date_naive();
            let (status_count, daily, summary) = tokio::try_join!(
                gateway.task_status_count(user_id),
                gateway.focused_time_by_date(user_id, today),
                gateway.focused_time_summary(user_id),
            )?;
            let report = FocusReport {
                status_count,
                daily,
                summary,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }
    Ok(())
}

fn user_id(config: &Config) -> Result<&str, &'static str> {
    config
        .api
        .user_id
        .as_deref()
        .ok_or("api.user_id is not set; run `config set api.user_id <id>`")
}

fn print_report(report: &FocusReport) {
    println!("Tasks ({} total)", report.status_count.total());
    for status in [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Expired,
    ] {
        println!("  {:<12} {}", status.as_str(), report.status_count.get(status));
    }
    println!();
    println!("Focus time (minutes)");
    for day in &report.daily {
        println!("  {}  {:>8.2}", day.date.format("%d/%m/%Y"), day.minutes);
    }
    println!();
    println!(
        "Last 7 days: {:.2} min focused, {} estimated",
        report.summary.focused_minutes, report.summary.estimated_time
    );
}
