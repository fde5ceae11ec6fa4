//! Course review CLI
//!
//! Local entry point for schedule updates, queries and reviews.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use course_review::{
    error::{AppError, Result},
    models::{Config, Term},
    pipeline::{self, UpdateQueue, Updater},
    services::{RegistrarClient, ScheduleParser, ScheduleSource},
    storage::{CourseFilter, InstructorFilter, NewReview, Store, TeachingFilter},
    utils::report,
};
use serde::Serialize;

/// course-review - registrar schedule scraper and review store
#[derive(Parser, Debug)]
#[command(
    name = "course-review",
    version,
    about = "Course schedule scraper and review store"
)]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape one term and reconcile it into the store
    Update {
        #[command(flatten)]
        target: TermArgs,
    },

    /// Queue updates for several terms on the background worker
    Batch {
        /// Year to scrape (default: current year)
        #[arg(long)]
        year: Option<String>,

        /// Terms to scrape (f/fall, s/spring, x/summer)
        #[arg(long, num_args = 1.., required = true)]
        terms: Vec<Term>,
    },

    /// Scrape one term into a `,,`-delimited file without touching the store
    Scrape {
        #[command(flatten)]
        target: TermArgs,

        /// Output file (default: {year}{TERM})
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find courses
    Courses {
        #[arg(long, default_value = "%")]
        subject: String,
        #[arg(long, default_value = "%")]
        course_no: String,
    },

    /// Find instructors
    Instructors {
        #[arg(long, default_value = "%")]
        email: String,
        #[arg(long, default_value = "%")]
        first_name: String,
        #[arg(long, default_value = "%")]
        middle_name: String,
        #[arg(long, default_value = "%")]
        last_name: String,
    },

    /// Find teaching sessions
    Teachings {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Find reviews
    Reviews {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Post a review for a teaching session
    Review {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        teaching_id: i64,
        #[arg(long)]
        instructor_rating: i64,
        #[arg(long)]
        difficulty_rating: i64,
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Validate configuration
    Validate,
}

#[derive(Args, Debug)]
struct TermArgs {
    /// Year to scrape (default: current year)
    #[arg(long)]
    year: Option<String>,

    /// Term to scrape (f/fall, s/spring, x/summer)
    #[arg(long)]
    term: Term,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Year pattern
    #[arg(long, default_value = "%")]
    year: String,
    #[arg(long)]
    semester: Option<Term>,
    #[arg(long)]
    instructor_id: Option<i64>,
    #[arg(long)]
    course_id: Option<i64>,
}

impl From<FilterArgs> for TeachingFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            year: args.year,
            semester: args.semester,
            instructor_id: args.instructor_id,
            course_id: args.course_id,
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn current_year() -> String {
    chrono::Local::now().year().to_string()
}

/// Print query results as `{"count": n, "<key>": [...]}`.
fn print_results<T: Serialize>(key: &str, label: &str, rows: &[T]) -> Result<()> {
    if rows.is_empty() {
        log::info!("No {} was found with the given parameters", label);
        return Ok(());
    }
    let mut body = serde_json::Map::new();
    body.insert("count".to_string(), rows.len().into());
    body.insert(key.to_string(), serde_json::to_value(rows)?);
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn open_store(config: &Config) -> Result<Arc<Store>> {
    let store = Store::from_config(&config.database)?;
    log::debug!("Opened store {:?}", store.target());
    Ok(Arc::new(store))
}

fn build_updater(config: &Config) -> Result<Updater> {
    let client = RegistrarClient::from_config(&config.registrar)?;
    Updater::new(client, open_store(config)?)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Update { target } => {
            let year = target.year.unwrap_or_else(current_year);
            report::header(&format!("Updating {} {}", year, target.term));

            let updater = build_updater(&config)?;
            let summary = updater.run_update(&year, target.term).await?;

            report::summary(
                "Rows added",
                &[
                    ("Courses", summary.courses.to_string()),
                    ("Instructors", summary.instructors.to_string()),
                    ("Teachings", summary.teachings.to_string()),
                ],
            );
        }

        Command::Batch { year, terms } => {
            let year = year.unwrap_or_else(current_year);
            let updater = Arc::new(build_updater(&config)?);
            let queue = UpdateQueue::spawn(Arc::clone(&updater));

            for term in &terms {
                queue.submit(&year, *term)?;
            }

            let processed = queue.shutdown().await?;
            let counts = updater.store().counts()?;
            report::summary(
                &format!("Processed {} of {} queued updates", processed, terms.len()),
                &[
                    ("Courses", counts.courses.to_string()),
                    ("Instructors", counts.instructors.to_string()),
                    ("Teachings", counts.teachings.to_string()),
                ],
            );
        }

        Command::Scrape { target, output } => {
            let year = target.year.unwrap_or_else(current_year);
            pipeline::validate_year(&year)?;
            let output =
                output.unwrap_or_else(|| PathBuf::from(format!("{}{}", year, target.term)));

            report::step(1, 2, "Fetch - Requesting schedule");
            let client = RegistrarClient::from_config(&config.registrar)?;
            let parser = ScheduleParser::new()?;
            let markup = client.fetch(&year, target.term).await?;

            report::step(2, 2, "Parse - Extracting sections");
            let sections = if markup.is_empty() {
                Default::default()
            } else {
                parser.parse(&markup).ok_or_else(|| AppError::InvalidTerm {
                    year: year.clone(),
                    term: target.term,
                })?
            };

            pipeline::write_sections(&output, &sections)?;
            log::info!("Wrote {} sections to {}", sections.len(), output.display());
        }

        Command::Courses { subject, course_no } => {
            let store = open_store(&config)?;
            let rows = store.find_courses(&CourseFilter { subject, course_no })?;
            print_results("courses", "course", &rows)?;
        }

        Command::Instructors {
            email,
            first_name,
            middle_name,
            last_name,
        } => {
            let store = open_store(&config)?;
            let rows = store.find_instructors(&InstructorFilter {
                email,
                first_name,
                middle_name,
                last_name,
            })?;
            print_results("instructors", "instructor", &rows)?;
        }

        Command::Teachings { filter } => {
            let store = open_store(&config)?;
            let rows = store.find_teachings(&filter.into())?;
            print_results("teachings", "teaching", &rows)?;
        }

        Command::Reviews { filter } => {
            let store = open_store(&config)?;
            let rows = store.find_reviews(&filter.into())?;
            print_results("reviews", "review", &rows)?;
        }

        Command::Review {
            user_id,
            teaching_id,
            instructor_rating,
            difficulty_rating,
            comment,
        } => {
            let store = open_store(&config)?;
            let review_id = store.insert_review(&NewReview {
                user_id,
                teaching_id,
                instructor_rating,
                difficulty_rating,
                comment,
            })?;
            println!("{}", serde_json::json!({ "review_id": review_id }));
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            if !config.registrar.template_path.exists() {
                log::warn!(
                    "Request template {} not found; the built-in template will be used",
                    config.registrar.template_path.display()
                );
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
