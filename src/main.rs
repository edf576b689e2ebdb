use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog::config::ApiConfig;
use catalog::controller::{CatalogController, Intent, PageSize, QueryState, SortSpec};
use catalog::models::{LoginRequest, RegisterRequest};
use catalog::services::{CourseDraft, SubmitOutcome};
use catalog::session;
use catalog::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "catalog", version, about = "Browse, search and publish courses")]
struct Cli {
    /// Base URL of the course API
    #[arg(long, env = "CATALOG_API_URL", global = true)]
    api_url: Option<String>,

    /// Per-request timeout
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one page of the catalog
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        #[arg(long, default_value = "title,asc")]
        sort: String,
    },
    /// Print courses matching a query
    Search { query: String },
    /// Interactive catalog browser
    Browse,
    /// Create a course
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        instructor: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CATALOG_PASSWORD")]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CATALOG_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "catalog=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match cli.api_url {
        Some(url) => ApiConfig::new(url)?,
        None => ApiConfig::new_from_env()?,
    };
    let config = match cli.timeout_secs {
        Some(secs) => config.with_timeout(Some(Duration::from_secs(secs))),
        None => config,
    };
    info!("using course api at {}", config.base_url);

    let state = AppState::connect(config)?;
    let mut stdout = std::io::stdout();

    match cli.command {
        Command::List { page, size, sort } => {
            let query = QueryState {
                page: page.saturating_sub(1),
                size: PageSize::try_from(size)?,
                sort: sort.parse::<SortSpec>()?,
                ..QueryState::default()
            };
            let mut controller = CatalogController::with_state(state.transport.clone(), query);
            let call = controller.start();
            controller.complete(call.finish().await);
            session::render(&controller, &mut stdout)?;
            Ok(exit_code(controller.display().error.is_none()))
        }
        Command::Search { query } => {
            let mut controller = state.catalog();
            controller.apply(Intent::EditSearch(query));
            if let Some(call) = controller.apply(Intent::SubmitSearch) {
                controller.complete(call.finish().await);
            }
            session::render(&controller, &mut stdout)?;
            Ok(exit_code(controller.display().error.is_none()))
        }
        Command::Browse => {
            let stdin = BufReader::new(tokio::io::stdin());
            println!("{}", session::HELP);
            session::run(state.catalog(), stdin, stdout).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Create {
            title,
            description,
            instructor,
            tags,
        } => {
            let mut draft = CourseDraft::new(title, description, instructor);
            for tag in &tags {
                draft.add_tag(tag);
            }
            let outcome = state.course_creator().submit(&mut draft).await;
            report(outcome, |course| {
                println!("Course created successfully!");
                println!("  id:          {}", course.id);
                println!("  title:       {}", course.title);
                println!("  description: {}", course.description_label());
                println!("  instructor:  {}", course.instructor_label());
                if course.tags.is_empty() {
                    println!("  tags:        No tags added");
                } else {
                    println!("  tags:        {}", course.tags.join(", "));
                }
            })
        }
        Command::Login { username, password } => {
            let outcome = state
                .authenticator()
                .login(LoginRequest { username, password })
                .await;
            report(outcome, |session| {
                println!("Login successful!");
                println!("{}", session.token);
            })
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let outcome = state
                .authenticator()
                .register(RegisterRequest {
                    username,
                    email,
                    password,
                })
                .await;
            report(outcome, |()| {
                println!("Registration successful! You can now login with your credentials.");
            })
        }
    }
}

fn report<T>(
    outcome: SubmitOutcome<T>,
    on_accepted: impl FnOnce(T),
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match outcome {
        SubmitOutcome::Accepted(value) => {
            on_accepted(value);
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Rejected(message) => {
            eprintln!("{}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
