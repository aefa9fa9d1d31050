use std::fmt;
use std::path::Path;
use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{ExamOutcome, ExamRules, OptionLetter, Question};
use services::{ExamFlow, ExamSession, ExamTimer, TimerEvent};
use storage::bank;
use storage::repository::{HistoryRepository, InMemoryHistory};
use storage::sqlite::SqliteStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
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

struct Args {
    bank_path: String,
    db_url: String,
    practice: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--bank <path>] [--db <sqlite_url>] [--practice]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --bank data/questions.json");
    eprintln!("  --db sqlite:exam-history.sqlite3");
    eprintln!();
    eprintln!("  --practice disables the countdown timer.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_BANK_PATH, EXAM_DB_URL");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut bank_path =
            std::env::var("EXAM_BANK_PATH").unwrap_or_else(|_| "data/questions.json".into());
        let mut db_url = std::env::var("EXAM_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://exam-history.sqlite3".into(), normalize_sqlite_url);
        let mut practice = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank" => {
                    bank_path = require_value(args, "--bank")?;
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--practice" => {
                    practice = true;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            bank_path,
            db_url,
            practice,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Open the history store, falling back to a throwaway in-memory ledger.
///
/// History is best-effort by contract, so an unusable database downgrades
/// the run instead of aborting it.
async fn open_history(db_url: &str) -> Arc<dyn HistoryRepository> {
    let prepared = prepare_sqlite_file(db_url);
    match prepared {
        Ok(()) => match SqliteStore::open(db_url).await {
            Ok(store) => return Arc::new(store),
            Err(err) => {
                tracing::warn!(error = %err, "history storage unavailable, continuing without it");
            }
        },
        Err(err) => {
            tracing::warn!(error = %err, "history storage unavailable, continuing without it");
        }
    }
    Arc::new(InMemoryHistory::new())
}

fn format_time(seconds: u32) -> String {
    let min = seconds / 60;
    let sec = seconds % 60;
    format!("{min:02}:{sec:02}")
}

fn render_question(session: &ExamSession, remaining: Option<u32>) {
    let Some(question) = session.current_question() else {
        return;
    };
    let progress = session.progress();

    println!();
    match remaining {
        Some(secs) => println!(
            "Question {}/{}  [{} left]",
            progress.position + 1,
            progress.total,
            format_time(secs)
        ),
        None => println!("Question {}/{}", progress.position + 1, progress.total),
    }
    println!("{}", question.text());
    for letter in OptionLetter::ALL {
        println!("  {letter}. {}", question.answers().text(letter));
    }
    print!("Your answer (A/B/C): ");
    use std::io::Write as _;
    let _ = std::io::stdout().flush();
}

fn render_outcome(questions: &[Question], rules: &ExamRules, outcome: &ExamOutcome) {
    println!();
    println!("{}", if outcome.passed() { "PASSED" } else { "FAILED" });
    println!(
        "Score: {}/{}",
        outcome.total_correct(),
        questions.len()
    );
    println!(
        "Priority section: {}",
        if outcome.priority().errors == 0 {
            "no errors"
        } else {
            "failed (no errors allowed)"
        }
    );
    println!(
        "General section errors: {} (allowed {})",
        outcome.general().errors,
        rules.allowed_general_errors()
    );
    if outcome.time_expired() {
        println!("The time limit ran out.");
    }

    println!();
    for (idx, (question, review)) in questions.iter().zip(outcome.reviews()).enumerate() {
        println!("Question {}. {}", idx + 1, question.text());
        match review.chosen {
            Some(letter) => println!(
                "  Your answer: {letter}. {} {}",
                question.answers().text(letter),
                if review.is_correct { "(correct)" } else { "(wrong)" }
            ),
            None => println!("  Your answer: none (wrong)"),
        }
        if !review.is_correct {
            println!(
                "  Correct answer: {}. {}",
                review.correct,
                question.answers().text(review.correct)
            );
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let pool = bank::load_bank(Path::new(&args.bank_path))?;
    println!("Question bank loaded ({} questions).", pool.len());

    let history = open_history(&args.db_url).await;
    let flow = ExamFlow::new(
        Clock::default_clock(),
        ExamRules::default_for_licensing(),
        history,
    );

    let mut session = flow.start_exam(&pool).await?;
    let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();
    let mut timer = ExamTimer::new();
    let mut remaining = None;
    if args.practice {
        println!("Practice mode: no time limit.");
    } else {
        let limit = flow.rules().time_limit_secs();
        remaining = Some(limit);
        timer.start(limit, timer_tx);
        println!("Exam mode: {} on the clock.", format_time(limit));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !session.is_complete() {
        render_question(&session, remaining);

        loop {
            tokio::select! {
                event = timer_rx.recv(), if !args.practice => {
                    match event {
                        Some(TimerEvent::Tick { remaining_secs }) => {
                            remaining = Some(remaining_secs);
                        }
                        Some(TimerEvent::Expired) => {
                            println!();
                            println!("Time is up.");
                            flow.finish_expired(&mut session)?;
                            break;
                        }
                        None => {}
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        println!();
                        println!("Input closed, exam abandoned.");
                        return Ok(());
                    };
                    match line.parse::<OptionLetter>() {
                        Ok(letter) => {
                            flow.submit_answer(&mut session, letter)?;
                            break;
                        }
                        Err(_) => {
                            print!("Please answer A, B or C: ");
                            use std::io::Write as _;
                            let _ = std::io::stdout().flush();
                        }
                    }
                }
            }
        }
    }
    timer.stop();

    let outcome = flow.outcome(&session)?;
    render_outcome(session.questions(), flow.rules(), &outcome);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
