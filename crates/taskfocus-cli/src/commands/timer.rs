use std::sync::Arc;

use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use taskfocus_core::format::{format_clock, format_window};
use taskfocus_core::{
    Config, Durations, FocusTimeRecorder, HttpGateway, MemoryGateway, PomodoroSession,
    SessionDriver, SessionError, SessionHandle, SessionSnapshot, Task, TaskGateway, TaskStatus,
};

const HELP: &str = "commands: start | pause | toggle | switch | reset | progress | complete | status | help | quit";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run an interactive Pomodoro session against a task.
    ///
    /// Reads commands from stdin and prints session events as JSON lines.
    Run {
        /// Task ID to focus on
        #[arg(long)]
        task_id: String,
        /// Keep tasks and focused time in memory instead of the task service
        #[arg(long)]
        offline: bool,
        /// Task name used in offline mode
        #[arg(long, default_value = "Offline task")]
        name: String,
        /// Override the configured work session length (minutes)
        #[arg(long)]
        work_min: Option<u32>,
        /// Override the configured break session length (minutes)
        #[arg(long)]
        break_min: Option<u32>,
    },
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Start,
    Pause,
    Toggle,
    Switch,
    Reset,
    Progress,
    Complete,
    Status,
    Help,
    Quit,
}

impl std::str::FromStr for Input {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" | "resume" => Ok(Input::Start),
            "pause" | "stop" => Ok(Input::Pause),
            "toggle" | "t" => Ok(Input::Toggle),
            "switch" | "s" => Ok(Input::Switch),
            "reset" | "r" => Ok(Input::Reset),
            "progress" | "in-progress" => Ok(Input::Progress),
            "complete" | "done" => Ok(Input::Complete),
            "status" | "" => Ok(Input::Status),
            "help" | "?" => Ok(Input::Help),
            "quit" | "exit" | "q" => Ok(Input::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}

pub async fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            task_id,
            offline,
            name,
            work_min,
            break_min,
        } => {
            let config = Config::load()?;
            let defaults = config.durations();
            let durations = Durations::new(
                work_min.unwrap_or(defaults.work_min),
                break_min.unwrap_or(defaults.break_min),
            );
            if durations.work_min == 0 || durations.break_min == 0 {
                return Err("session lengths must be at least 1 minute".into());
            }

            if offline {
                let task = Task::new(task_id, name, TaskStatus::Todo);
                let gateway = Arc::new(MemoryGateway::with_tasks([task.clone()]));
                drive(task, durations, Arc::clone(&gateway), gateway).await
            } else {
                let gateway = Arc::new(HttpGateway::from_config(&config.api)?);
                let user_id = config
                    .api
                    .user_id
                    .clone()
                    .ok_or("api.user_id is not set; run `config set api.user_id <id>` or use --offline")?;
                let task = gateway
                    .fetch_tasks(&user_id)
                    .await?
                    .into_iter()
                    .find(|t| t.id == task_id)
                    .ok_or_else(|| format!("task not found: {task_id}"))?;
                drive(task, durations, Arc::clone(&gateway), gateway).await
            }
        }
    }
}

async fn drive<T, R>(
    task: Task,
    durations: Durations,
    tasks: Arc<T>,
    recorder: Arc<R>,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: TaskGateway + 'static,
    R: FocusTimeRecorder + 'static,
{
    eprintln!("{} [{}]", task.name, task.status);
    eprintln!("{}", format_window(&task));
    eprintln!(
        "work {} / break {}",
        format_clock(durations.secs(taskfocus_core::SessionKind::Work)),
        format_clock(durations.secs(taskfocus_core::SessionKind::Break)),
    );
    eprintln!("{HELP}");

    let session = PomodoroSession::new(durations, Some(task));
    let (handle, mut events) = SessionDriver::spawn(session, tasks, recorder);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Input>() {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => eprintln!("{HELP}"),
                    Ok(input) => match dispatch(&handle, input).await {
                        Ok(snapshot) => print_json(&snapshot)?,
                        Err(e) => eprintln!("error: {e}"),
                    },
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            Some(event) = events.recv() => print_json(&event)?,
        }
    }

    let snapshot = handle.close().await?;
    while let Ok(event) = events.try_recv() {
        print_json(&event)?;
    }
    print_json(&snapshot)?;
    Ok(())
}

async fn dispatch(handle: &SessionHandle, input: Input) -> Result<SessionSnapshot, SessionError> {
    debug!(?input, "timer command");
    match input {
        Input::Start | Input::Pause => {
            let current = handle.snapshot().await?;
            let wants_running = input == Input::Start;
            if current.running == wants_running {
                Ok(current)
            } else {
                handle.toggle_running().await
            }
        }
        Input::Toggle => handle.toggle_running().await,
        Input::Switch => handle.switch_kind().await,
        Input::Reset => handle.reset().await,
        Input::Progress => handle.mark_in_progress().await,
        Input::Complete => handle.mark_completed().await,
        Input::Status | Input::Help | Input::Quit => handle.snapshot().await,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
