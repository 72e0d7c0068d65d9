use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use katha_core::model::{ChapterId, ParseIdError, QuizStep, Scene};
use katha_core::scroll::{Viewport, stacked_regions};
use services::{ApiConfig, AppServices, Clock, ConfigError, QuizServiceError, ReaderConfig};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};

const DEFAULT_DB_URL: &str = "sqlite://katha.sqlite3";
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_SCENE_HEIGHT: f64 = 900.0;
const DEFAULT_VIEWPORT: f64 = 800.0;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArg { what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidChapterId(ParseIdError),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArg { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "{flag} expects a positive number, got {raw:?}")
            }
            ArgsError::InvalidChapterId(err) => write!(f, "{err}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_positive(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<f64, ArgsError> {
    let raw = require_value(args, flag)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ArgsError::InvalidNumber { flag, raw }),
    }
}

fn parse_chapter_id(raw: Option<String>) -> Result<ChapterId, ArgsError> {
    raw.ok_or(ArgsError::MissingArg { what: "<chapter-id>" })?
        .parse()
        .map_err(ArgsError::InvalidChapterId)
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  katha [--db <sqlite_url>] [--api <url>] [--log <filter>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  continue                                  show where you left off (default)");
    eprintln!("  progress [list|clear|remove <chapter-id>] manage the local reading list");
    eprintln!("  login --email <email> --password <pw>");
    eprintln!("  logout");
    eprintln!("  whoami");
    eprintln!("  stories [--category <name>] [--query <text>]");
    eprintln!("  read <chapter-id> [--scene-height <px>] [--viewport <px>]");
    eprintln!("  quiz                                      take the archetype quiz");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --log {DEFAULT_LOG_FILTER}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  KATHA_DB_URL, KATHA_API_BASE_URL, KATHA_HTTP_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq)]
enum ProgressAction {
    List,
    Clear,
    Remove(ChapterId),
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Continue,
    Progress(ProgressAction),
    Login { email: String, password: String },
    Logout,
    Whoami,
    Stories {
        category: Option<String>,
        query: Option<String>,
    },
    Read {
        chapter_id: ChapterId,
        scene_height: f64,
        viewport: f64,
    },
    Quiz,
}

impl Command {
    fn parse(name: &str, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let command = match name {
            "continue" => Self::Continue,
            "progress" => {
                let action = match args.next().as_deref() {
                    None | Some("list") => ProgressAction::List,
                    Some("clear") => ProgressAction::Clear,
                    Some("remove") => ProgressAction::Remove(parse_chapter_id(args.next())?),
                    Some(other) => return Err(ArgsError::UnknownArg(other.to_owned())),
                };
                Self::Progress(action)
            }
            "login" => {
                let mut email = None;
                let mut password = None;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--email" => email = Some(require_value(args, "--email")?),
                        "--password" => password = Some(require_value(args, "--password")?),
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Self::Login {
                    email: email.ok_or(ArgsError::MissingArg { what: "--email" })?,
                    password: password.ok_or(ArgsError::MissingArg { what: "--password" })?,
                }
            }
            "logout" => Self::Logout,
            "whoami" => Self::Whoami,
            "stories" => {
                let mut category = None;
                let mut query = None;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--category" => category = Some(require_value(args, "--category")?),
                        "--query" => query = Some(require_value(args, "--query")?),
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Self::Stories { category, query }
            }
            "read" => {
                let chapter_id = parse_chapter_id(args.next())?;
                let mut scene_height = DEFAULT_SCENE_HEIGHT;
                let mut viewport = DEFAULT_VIEWPORT;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--scene-height" => {
                            scene_height = require_positive(args, "--scene-height")?;
                        }
                        "--viewport" => viewport = require_positive(args, "--viewport")?,
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Self::Read {
                    chapter_id,
                    scene_height,
                    viewport,
                }
            }
            "quiz" => Self::Quiz,
            other => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        if let Some(extra) = args.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        Ok(command)
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    api_base: Option<String>,
    log_filter: Option<String>,
    command: Command,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("KATHA_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut api_base = None;
        let mut log_filter = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => api_base = Some(require_value(args, "--api")?),
                "--log" => log_filter = Some(require_value(args, "--log")?),
                "--help" | "-h" => return Ok(None),
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                name => {
                    let command = Command::parse(name, args)?;
                    return Ok(Some(Self {
                        db_url,
                        api_base,
                        log_filter,
                        command,
                    }));
                }
            }
        }

        Ok(Some(Self {
            db_url,
            api_base,
            log_filter,
            command: Command::Continue,
        }))
    }

    fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        let env = ApiConfig::from_env()?;
        match &self.api_base {
            Some(base) => ApiConfig::new(base.as_str(), env.timeout),
            None => Ok(env),
        }
    }
}

fn init_tracing(filter: Option<&str>) {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            log_fmt::layer()
                .with_target(true)
                .with_writer(io::stderr)
                .with_filter(env_filter),
        )
        .init();
}

fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// sqlx refuses to open a missing file, so create it (and its directory) first.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let raw = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let raw = raw.split('?').next().unwrap_or(raw);
    if raw.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        }
        .into());
    }

    let path = Path::new(raw);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    Ok(())
}

fn snippet(scene: &Scene) -> String {
    let text = scene.caption.as_deref().unwrap_or_else(|| scene.original_text());
    let mut short: String = text.chars().take(72).collect();
    if short.len() < text.len() {
        short.push('…');
    }
    short
}

async fn show_progress(app: &AppServices, action: ProgressAction) {
    match action {
        ProgressAction::List => {
            let entries = app.progress().get_all().await;
            if entries.is_empty() {
                println!("No reading progress yet.");
            }
            for entry in entries {
                println!(
                    "{:>4}%  chapter {:<5} {}  (read {})",
                    entry.progress.value(),
                    entry.chapter_id,
                    entry.chapter_title,
                    entry.last_read.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ProgressAction::Clear => {
            app.progress().clear_all().await;
            println!("Reading progress cleared.");
        }
        ProgressAction::Remove(chapter_id) => {
            app.progress().remove_for_chapter(chapter_id).await;
            println!("Removed chapter {chapter_id} from reading progress.");
        }
    }
}

/// Scroll offsets for a simulated read, starting with the viewport midpoint
/// on the centre of scene `resume`. Steps never exceed one scene, so every
/// later scene passes under the midpoint.
fn scroll_offsets(
    total: usize,
    resume: usize,
    scene_height: f64,
    viewport_height: f64,
) -> Vec<f64> {
    let stride = viewport_height.min(scene_height);
    let midpoint = viewport_height / 2.0;
    let document_height = scene_height * total as f64;
    let mut scroll_y = scene_height * (resume as f64 + 0.5) - midpoint;
    let mut offsets = Vec::new();
    while scroll_y + midpoint < document_height {
        offsets.push(scroll_y);
        scroll_y += stride;
    }
    offsets
}

async fn read_chapter(
    app: &AppServices,
    reader_config: ReaderConfig,
    chapter_id: ChapterId,
    scene_height: f64,
    viewport_height: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = app.open_chapter(chapter_id).await?;
    let total = reader.scenes().len();
    let resume = reader.resume_index().await.unwrap_or(0);
    println!("{}", reader.chapter().title);
    if resume > 0 {
        println!("Resuming at scene {} of {total}", resume + 1);
    }

    let heights = vec![scene_height; total];
    let viewport = Viewport::new(viewport_height);
    let started = Instant::now();

    // timestamps are spaced so no step is throttled
    let offsets = scroll_offsets(total, resume, scene_height, viewport_height);
    for (step, scroll_y) in (0_u32..).zip(offsets) {
        let at = started + reader_config.sample_interval * step;
        let regions = stacked_regions(&heights, scroll_y);
        if let Some(transition) = reader.on_scroll(viewport, &regions, at).await? {
            let scene = &reader.scenes()[transition.index];
            println!(
                "[{:>4}] scene {}/{total}: {}",
                transition.progress.to_string(),
                transition.index + 1,
                snippet(scene)
            );
        }
    }
    reader.flush().await?;

    if let Some(next) = reader.chapter().next_chapter_id {
        println!("Next: katha read {next}");
    }
    Ok(())
}

fn prompt_line(lines: &mut impl Iterator<Item = io::Result<String>>) -> io::Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    lines.next().transpose()
}

async fn take_quiz(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let mut quiz = app.quiz();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(question) = quiz.current_question() {
        println!();
        println!("{}", question.prompt);
        for (n, option) in question.options.iter().enumerate() {
            println!("  {}. {}", n + 1, option.text);
        }

        let Some(line) = prompt_line(&mut lines)? else {
            println!("Quiz abandoned.");
            return Ok(());
        };
        let picked = line.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1));
        let Some(picked) = picked else {
            println!("Pick a number between 1 and {}.", question.options.len());
            continue;
        };
        match quiz.answer_option(picked) {
            Ok(QuizStep::Next(_)) => {}
            Ok(QuizStep::Finished(archetype)) => {
                println!();
                println!("You are {archetype}.");
                println!("{}", archetype.description());
            }
            Err(QuizServiceError::Quiz(err)) => println!("{err}"),
            Err(err) => return Err(err.into()),
        }
    }

    if app.session().current_user().is_none() {
        println!("Sign in with `katha login` to save your archetype.");
        return Ok(());
    }
    let user = quiz.submit().await?;
    info!(user_id = %user.id, "archetype saved");
    println!("Saved to your profile.");
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = match Args::parse(&mut argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    init_tracing(parsed.log_filter.as_deref());
    let api_config = parsed.api_config()?;
    let reader_config = ReaderConfig::default();
    debug!(db = %parsed.db_url, api = %api_config.base_url, "starting");

    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::system(), api_config, reader_config)
        .await?;

    let outcome = execute(&app, reader_config, parsed.command).await;
    app.shutdown().await;
    outcome
}

async fn execute(
    app: &AppServices,
    reader_config: ReaderConfig,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Continue => match app.progress().get_most_recent().await {
            Some(entry) => {
                println!("{} ({}%)", entry.chapter_title, entry.progress.value());
                println!("Continue with: katha read {}", entry.chapter_id);
            }
            None => println!("Nothing to continue yet. Try `katha stories`."),
        },
        Command::Progress(action) => show_progress(app, action).await,
        Command::Login { email, password } => {
            let auth = app.api().login(&email, &password).await?;
            println!("Signed in as {}.", auth.user.name);
            if auth.user.archetype.is_none() {
                println!("Discover your archetype with `katha quiz`.");
            }
        }
        Command::Logout => {
            app.api().logout().await?;
            println!("Signed out.");
        }
        Command::Whoami => {
            if !app.session().is_authenticated() {
                println!("Not signed in.");
                return Ok(());
            }
            let user = app.api().get_current_user().await?;
            println!("{} (id {})", user.name, user.id);
            println!(
                "XP {}  streak {} days (best {})  stories read {}",
                user.total_xp, user.current_streak_days, user.longest_streak_days, user.stories_read
            );
            if let Some(archetype) = user.archetype {
                println!("{archetype}");
            }
        }
        Command::Stories { category, query } => {
            let stories = app
                .api()
                .get_stories(category.as_deref(), query.as_deref())
                .await?;
            let assets = app.api().config().assets();
            for story in stories {
                println!("{:>5}  {}", story.id, story.title);
                if let Some(cover) = assets.resolve(story.cover_image_url.as_deref()) {
                    println!("       {cover}");
                }
            }
        }
        Command::Read {
            chapter_id,
            scene_height,
            viewport,
        } => read_chapter(app, reader_config, chapter_id, scene_height, viewport).await?,
        Command::Quiz => take_quiz(app).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn defaults_to_continue() {
        let args = parse(&[]).unwrap().unwrap();
        assert_eq!(args.command, Command::Continue);
    }

    #[test]
    fn global_flags_precede_command() {
        let args = parse(&["--api", "http://example.test/api", "--log", "debug", "read", "12"])
            .unwrap()
            .unwrap();
        assert_eq!(args.api_base.as_deref(), Some("http://example.test/api"));
        assert_eq!(args.log_filter.as_deref(), Some("debug"));
        assert_eq!(
            args.command,
            Command::Read {
                chapter_id: ChapterId::new(12),
                scene_height: DEFAULT_SCENE_HEIGHT,
                viewport: DEFAULT_VIEWPORT,
            }
        );
    }

    #[test]
    fn progress_remove_needs_an_id() {
        assert!(matches!(
            parse(&["progress", "remove"]),
            Err(ArgsError::MissingArg { .. })
        ));
        assert!(matches!(
            parse(&["progress", "remove", "x"]),
            Err(ArgsError::InvalidChapterId(_))
        ));
        let args = parse(&["progress", "remove", "4"]).unwrap().unwrap();
        assert_eq!(args.command, Command::Progress(ProgressAction::Remove(ChapterId::new(4))));
    }

    #[test]
    fn login_requires_both_credentials() {
        assert!(matches!(
            parse(&["login", "--email", "a@b.c"]),
            Err(ArgsError::MissingArg { what: "--password" })
        ));
    }

    #[test]
    fn rejects_non_positive_heights() {
        assert!(matches!(
            parse(&["read", "3", "--viewport", "0"]),
            Err(ArgsError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse(&["--help"]).unwrap().is_none());
        assert!(matches!(parse(&["dance"]), Err(ArgsError::UnknownCommand(_))));
    }

    #[test]
    fn relative_db_paths_become_absolute() {
        let url = normalize_sqlite_url("data/katha.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/katha.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    fn scenes_under_midpoint(
        offsets: &[f64],
        scene_height: f64,
        viewport_height: f64,
    ) -> Vec<usize> {
        let heights = [scene_height; 6];
        let viewport = Viewport::new(viewport_height);
        let mut seen = Vec::new();
        for &scroll_y in offsets {
            let regions = stacked_regions(&heights, scroll_y);
            let active = katha_core::scroll::active_scene_index(viewport, &regions);
            if let Some(index) = active.filter(|index| seen.last() != Some(index)) {
                seen.push(index);
            }
        }
        seen
    }

    #[test]
    fn tall_viewport_still_passes_every_scene() {
        let offsets = scroll_offsets(6, 0, 500.0, 2000.0);
        assert_eq!(scenes_under_midpoint(&offsets, 500.0, 2000.0), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn short_viewport_resumes_at_saved_scene() {
        let offsets = scroll_offsets(6, 2, 900.0, 800.0);
        assert_eq!(scenes_under_midpoint(&offsets, 900.0, 800.0), vec![2, 3, 4, 5]);
    }
}
