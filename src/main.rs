use anyhow::{anyhow, bail, Context};
use ats_client::{
    config::{get_config, init_config},
    services::preferences_service::PreferencesStore,
    views::activity_log::EMPTY_TIMELINE_MESSAGE,
    AppState,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const USAGE: &str = "usage: ats-console <command>

commands:
  dashboard                         summary cards and recent notifications
  notifications                     full notification list
  dismiss <activity-id>             dismiss a notification
  board <job-id>                    pipeline columns for a job
  timeline <job-id>                 job audit log
  move <job-id> <candidate-id> <stage>
  departments [search]              department list
  team                              team members
  logout                            forget the token and local preferences";

enum Command {
    Dashboard,
    Notifications,
    Dismiss(String),
    Board(Uuid),
    Timeline(Uuid),
    Move {
        job_id: Uuid,
        candidate_id: Uuid,
        stage: String,
    },
    Departments(Option<String>),
    Team,
    Logout,
}

fn parse_uuid(raw: Option<String>, what: &str) -> anyhow::Result<Uuid> {
    let raw = raw.ok_or_else(|| anyhow!("missing {}\n\n{}", what, USAGE))?;
    Uuid::parse_str(&raw).with_context(|| format!("invalid {}: {}", what, raw))
}

fn parse_command(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let Some(name) = args.next() else {
        bail!("{}", USAGE);
    };
    let command = match name.as_str() {
        "dashboard" => Command::Dashboard,
        "notifications" => Command::Notifications,
        "dismiss" => Command::Dismiss(
            args.next()
                .ok_or_else(|| anyhow!("missing activity id\n\n{}", USAGE))?,
        ),
        "board" => Command::Board(parse_uuid(args.next(), "job id")?),
        "timeline" => Command::Timeline(parse_uuid(args.next(), "job id")?),
        "move" => Command::Move {
            job_id: parse_uuid(args.next(), "job id")?,
            candidate_id: parse_uuid(args.next(), "candidate id")?,
            stage: args
                .next()
                .ok_or_else(|| anyhow!("missing stage\n\n{}", USAGE))?,
        },
        "departments" => Command::Departments(args.next()),
        "team" => Command::Team,
        "logout" => Command::Logout,
        other => bail!("unknown command: {}\n\n{}", other, USAGE),
    };
    Ok(command)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let json_logs = std::env::var("ATS_LOG_FORMAT").is_ok_and(|v| v == "json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    init_config()?;
    let config = get_config()?;
    let command = parse_command(std::env::args().skip(1))?;

    let state = AppState::new(config)?;
    let mut preferences = PreferencesStore::load(&config.preferences_path).await?;
    if preferences.should_show_welcome() {
        println!("Welcome! Run `ats-console dashboard` to see what happened recently.\n");
        preferences.mark_welcome_seen().await?;
    }

    match command {
        Command::Dashboard => {
            let view = state.dashboard();
            view.load().await?;
            let cards = view.cards();
            if let Some(overview) = cards.overview.ready() {
                println!(
                    "Jobs: {} ({} active)  Candidates: {}  Hires: {}",
                    overview.total_jobs,
                    overview.active_jobs,
                    overview.total_candidates,
                    overview.hires_count
                );
            }
            if let Some(actions) = cards.actions_taken.ready() {
                for action in actions {
                    println!("  {:<30} {} actions", action.name, action.actions_count);
                }
            }
            if let Some(performance) = cards.my_performance.ready() {
                for month in performance.months_chronological() {
                    println!(
                        "  {:<10} {} jobs, {} applications",
                        month.month, month.jobs_created, month.applications_received
                    );
                }
            }
            println!("\nNotifications ({} unread)", view.notifications().unread_count());
            for item in view.recent() {
                println!("  [{}] {}", item.id, item.title);
            }
            if view.has_more() {
                println!("  ...");
            }
            if let Some(err) = view.notifications().error() {
                println!("  ! {}", err);
            }
        }
        Command::Notifications => {
            let center = state.notifications();
            center.refresh().await?;
            for item in center.notifications() {
                let marker = if item.unread { "*" } else { " " };
                println!("{} [{}] {}", marker, item.id, item.title);
                if let Some(description) = &item.description {
                    println!("      {}", description);
                }
            }
        }
        Command::Dismiss(id) => {
            let center = state.notifications();
            center.refresh().await?;
            let outcome = center.dismiss(&id).await?;
            info!(?outcome, id = %id, "Dismiss finished");
            println!("{:?}", outcome);
        }
        Command::Board(job_id) => {
            let board = state.job_board(job_id);
            board.load().await?;
            for column in board.columns() {
                println!("{} ({})", column.stage.name, column.applications.len());
                for app in &column.applications {
                    println!("  {} {}", app.candidate_id, app.candidate_name());
                }
            }
            let orphaned = board.orphaned_applications();
            if !orphaned.is_empty() {
                println!("Outside the pipeline ({})", orphaned.len());
            }
        }
        Command::Timeline(job_id) => {
            let board = state.job_board(job_id);
            board.load().await?;
            let timeline = board.activity_timeline();
            if timeline.is_empty() {
                println!("{}", EMPTY_TIMELINE_MESSAGE);
            }
            for entry in timeline {
                println!(
                    "{}  {}",
                    entry.timestamp_label.as_deref().unwrap_or("-"),
                    entry.headline
                );
                for row in entry.diff {
                    println!("    {}: {} -> {}", row.label, row.old, row.new);
                }
            }
        }
        Command::Move {
            job_id,
            candidate_id,
            stage,
        } => {
            let board = state.job_board(job_id);
            board.load().await?;
            board.move_candidate(candidate_id, &stage).await?;
            println!(
                "{} is now in {}",
                candidate_id,
                board.stage_of(candidate_id).unwrap_or(stage)
            );
        }
        Command::Departments(search) => {
            let view = state.departments();
            view.load().await?;
            if let Some(search) = search {
                view.set_search(search);
            }
            for dept in view.visible() {
                println!(
                    "{:<30} {:<10} {:>3} jobs {:>3} members  {}",
                    dept.name,
                    dept.status.label(),
                    dept.total_jobs_count,
                    dept.total_members_count,
                    dept.owner_name().unwrap_or("Unassigned")
                );
            }
        }
        Command::Team => {
            let view = state.team();
            view.load().await?;
            for user in view.users() {
                println!("{:<30} {:<30} {}", user.display_name(), user.email, user.role.label());
            }
        }
        Command::Logout => {
            state.logout(&mut preferences).await?;
            println!("Logged out.");
        }
    }

    Ok(())
}
