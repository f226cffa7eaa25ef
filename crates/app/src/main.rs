use std::fmt;
use std::sync::Arc;

use backend::{BackendConfig, EnrollmentApi, HttpBackend};
use player_core::model::CourseId;
use services::{LessonView, PlayerLoopService, PlayerSession};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCourseId { raw: String },
    MissingToken,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid --course-id value: {raw}"),
            ArgsError::MissingToken => {
                write!(f, "no API token (set PLAYER_API_TOKEN or pass --token)")
            }
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play    [--course-id <id>] [--base-url <url>] [--token <t>]");
    eprintln!("  cargo run -p app -- courses [--base-url <url>] [--token <t>]");
    eprintln!();
    eprintln!("Defaults for play:");
    eprintln!("  --course-id 1");
    eprintln!("  --base-url  http://localhost:5000/api");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PLAYER_API_BASE_URL, PLAYER_API_TOKEN, PLAYER_COURSE_ID");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Courses,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "courses" => Some(Self::Courses),
            _ => None,
        }
    }
}

struct Args {
    config: BackendConfig,
    course_id: CourseId,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut config = BackendConfig::from_env();
        let mut base_url = None;
        let mut token = None;
        let mut course_id = std::env::var("PLAYER_COURSE_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| CourseId::new(1), CourseId::new);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--course-id" => {
                    let value = require_value(args, "--course-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCourseId { raw: value.clone() })?;
                    course_id = CourseId::new(parsed);
                }
                "--base-url" => {
                    base_url = Some(require_value(args, "--base-url")?);
                }
                "--token" => {
                    token = Some(require_value(args, "--token")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        // Flags override the environment; the token has no default.
        if let Some(url) = base_url {
            match &mut config {
                Some(config) => config.base_url = url,
                None => {
                    config = token
                        .take()
                        .map(|token| BackendConfig::new(url, token));
                }
            }
        }
        if let Some(token) = token {
            match &mut config {
                Some(config) => config.auth_token = token,
                None => {
                    config = Some(BackendConfig::new("http://localhost:5000/api", token));
                }
            }
        }

        let config = config.ok_or(ArgsError::MissingToken)?;
        Ok(Self { config, course_id })
    }
}

fn describe(view: &LessonView<'_>, position_label: &str) -> String {
    match view {
        LessonView::Video { title, url } => format!("{position_label} [video] {title} ({url})"),
        LessonView::TextHtml { title, html } => {
            format!("{position_label} [text]  {title} ({} bytes of html)", html.len())
        }
        LessonView::TextBullets { title, bullets } => {
            format!("{position_label} [text]  {title} ({} bullet points)", bullets.len())
        }
        LessonView::Quiz {
            title, questions, ..
        } => format!(
            "{position_label} [quiz]  {title} ({} questions, answer interactively)",
            questions.len()
        ),
        LessonView::QuizResults {
            title,
            score,
            total,
            passed,
        } => format!(
            "{position_label} [quiz]  {title}: {score}/{total}, {}",
            if *passed { "passed" } else { "not passed" }
        ),
        LessonView::Roleplay { title, persona, .. } => {
            format!("{position_label} [role]  {title} (persona: {persona})")
        }
        LessonView::Empty => format!("{position_label} this course has no lessons yet"),
    }
}

fn print_step(session: &PlayerSession) {
    let progress = session.progress();
    let label = format!(
        "[{}.{} {:>3}%]",
        progress.position.module, progress.position.lesson, progress.percent
    );
    println!("{}", describe(&session.view(), &label));
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let api = Arc::new(HttpBackend::new(parsed.config));

    match cmd {
        Command::Courses => {
            let courses = api.list_courses().await?;
            for course in &courses {
                println!(
                    "{:>4}  {} ({} modules, {} lessons)",
                    course.id,
                    course.title,
                    course.total_modules(),
                    course.total_lessons()
                );
            }
            Ok(())
        }
        Command::Play => {
            tracing::info!(course_id = %parsed.course_id, "mounting player");
            let player = PlayerLoopService::new(api);
            let mut session = player.start(parsed.course_id).await?;

            println!("{}", session.course().title);
            print_step(&session);
            while player.advance(&mut session).await.is_some() {
                print_step(&session);
            }

            let progress = session.progress();
            println!(
                "reached the last lesson: {}/{} modules, {}%",
                progress.position.module + 1,
                progress.total_modules,
                progress.percent
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
