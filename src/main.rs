use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use trivia::{
    init_logging, load_questions_csv, seed_default_categories, setup_database, Config, QuestionDraft,
    QuestionRepository, QuizOutcome, TriviaService, ANY_CATEGORY,
};

#[derive(Parser)]
#[command(name = "trivia", version, about = "Trivia question store administration")]
struct Cli {
    /// Config file (defaults to ./trivia.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and the default categories
    Init,

    /// Import questions from a CSV file (question,answer,category,difficulty)
    Import { csv: PathBuf },

    /// List one page of questions
    List {
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Case-insensitive search over question text
    Search { term: String },

    /// Add a single question
    Add {
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
        #[arg(long)]
        category: i64,
        #[arg(long, default_value = "1")]
        difficulty: i64,
    },

    /// Delete a question by id
    Delete { id: i64 },

    /// Play a quiz round in the terminal
    Quiz {
        /// Category id, 0 for any
        #[arg(long, default_value_t = ANY_CATEGORY)]
        category: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config);

    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?;
    info!(path = %config.database_path.display(), "database opened");

    match cli.command {
        Commands::Init => run_init(&conn),
        Commands::Import { csv } => run_import(&conn, &csv),
        Commands::List { page } => run_list(&conn, page),
        Commands::Search { term } => run_search(&conn, &term),
        Commands::Add {
            question,
            answer,
            category,
            difficulty,
        } => run_add(&conn, QuestionDraft::new(&question, &answer, category, difficulty)),
        Commands::Delete { id } => run_delete(&conn, id),
        Commands::Quiz { category } => run_quiz(&conn, &config, category),
    }
}

fn run_init(conn: &Connection) -> Result<()> {
    setup_database(conn).context("Failed to set up schema")?;
    let seeded = seed_default_categories(conn)?;
    println!("✓ Database initialized with WAL mode");
    println!("✓ Categories added: {}", seeded);
    Ok(())
}

fn run_import(conn: &Connection, csv: &Path) -> Result<()> {
    setup_database(conn)?;

    println!("📂 Loading CSV...");
    let drafts = load_questions_csv(csv).with_context(|| format!("Failed to import {:?}", csv))?;
    println!("✓ Loaded {} questions", drafts.len());

    let repo = QuestionRepository::new(conn);
    let inserted = repo.insert_all(&drafts)?;
    println!("✓ Inserted: {} questions", inserted.len());
    println!("✓ Database contains {} questions", repo.count()?);
    Ok(())
}

fn run_list(conn: &Connection, page: usize) -> Result<()> {
    let listing = TriviaService::new(conn).list_questions(page)?;
    if !listing.has_results() {
        println!("No questions yet. Run `trivia import <csv>` or `trivia add` first.");
        return Ok(());
    }

    println!("📄 Page {}/{} ({} questions)", listing.page, listing.total_pages, listing.total_questions);
    for q in &listing.questions {
        let label = listing.categories.get(&q.category).map(String::as_str).unwrap_or("?");
        println!("{:>5}  [{:<13}] d{}  {}", q.id, label, q.difficulty, q.question);
    }
    Ok(())
}

fn run_search(conn: &Connection, term: &str) -> Result<()> {
    let results = TriviaService::new(conn).search(term)?;
    println!("🔍 {} match(es) for {:?}", results.total_questions, term);
    for q in &results.questions {
        println!("{:>5}  {}", q.id, q.question);
    }
    Ok(())
}

fn run_add(conn: &Connection, draft: QuestionDraft) -> Result<()> {
    let created = TriviaService::new(conn).create_question(&draft, 1)?;
    println!("✓ Question {} added ({} total)", created.created.id, created.total_questions);
    Ok(())
}

fn run_delete(conn: &Connection, id: i64) -> Result<()> {
    let deleted = TriviaService::new(conn).delete_question(id)?;
    println!("✓ Question {} deleted", deleted);
    Ok(())
}

fn run_quiz(conn: &Connection, config: &Config, category: i64) -> Result<()> {
    let service = TriviaService::new(conn).with_strategy(config.quiz_strategy);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let mut previous = HashSet::new();
    let mut correct = 0;

    println!("🎯 Quiz time! Empty answer quits.\n");
    loop {
        let question = match service.play_quiz(category, &previous)? {
            QuizOutcome::Found(q) => q,
            QuizOutcome::Exhausted => {
                println!("No questions left in this category.");
                break;
            }
        };

        print!("Q{}: {}\n> ", previous.len() + 1, question.question);
        io::stdout().flush()?;

        let answer = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if answer.trim().is_empty() {
            break;
        }

        previous.insert(question.id);
        if answer.trim().eq_ignore_ascii_case(question.answer.trim()) {
            correct += 1;
            println!("✅ Correct!\n");
        } else {
            println!("❌ The answer was: {}\n", question.answer);
        }
    }

    println!("Score: {}/{}", correct, previous.len());
    Ok(())
}
