use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fuzzy_performance::config::load_config;
use fuzzy_performance::evaluate::evaluate;
use fuzzy_performance::import::load_csv;
use fuzzy_performance::membership::sample_curve;
use fuzzy_performance::models::{Classification, Metric, StudentRecord};
use fuzzy_performance::{report, response, Engine};

#[derive(Parser)]
#[command(name = "fuzzy-performance")]
#[command(about = "Fuzzy-logic classifier for student academic performance", long_about = None)]
struct Cli {
    /// TOML file with engine settings (falls back to FUZZY_PERFORMANCE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log rule firings and other debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one student and print the JSON response
    Classify {
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long)]
        gpa: Option<f64>,
        #[arg(long)]
        cca: Option<f64>,
        #[arg(long)]
        attendance: Option<f64>,
        #[arg(long)]
        midterm: Option<f64>,
        #[arg(long)]
        final_exam: Option<f64>,
        /// Print the full result, including fired rules
        #[arg(long)]
        trace: bool,
    },
    /// Classify every row of a CSV export
    Batch {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Emit one JSON response per line instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report for a CSV export
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        cohort: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print sampled membership curves for one metric as JSON
    Curves {
        #[arg(long)]
        metric: Metric,
        #[arg(long, default_value_t = 401)]
        points: usize,
    },
    /// List the rule base
    Rules,
    /// Compare predictions with the labels of a CSV export
    Evaluate {
        #[arg(long)]
        csv: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let engine = Engine::new(&config).context("engine config rejected")?;

    match cli.command {
        Commands::Classify {
            user_id,
            gpa,
            cca,
            attendance,
            midterm,
            final_exam,
            trace,
        } => {
            let record = StudentRecord {
                user_id,
                name: None,
                gpa,
                cca,
                attendance,
                midterm,
                final_exam,
                performance: None,
            };
            let result = engine.classify_record(&record)?;
            let json = if trace {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string_pretty(&response::success(user_id, &result))?
            };
            println!("{json}");
        }
        Commands::Batch { csv, limit, json } => {
            let records = load_csv(&csv)?;
            let assessments = engine.classify_batch(records);

            if json {
                for assessment in &assessments {
                    println!(
                        "{}",
                        serde_json::to_string(&response::from_assessment(assessment))?
                    );
                }
                return Ok(());
            }

            if assessments.is_empty() {
                println!("No students found in {}.", csv.display());
                return Ok(());
            }

            println!("Classified {} students:", assessments.len());
            for assessment in assessments.iter().take(limit) {
                let name = assessment.student.display_name();
                match &assessment.outcome {
                    Ok(result) => match (result.category, result.crisp_score) {
                        (Classification::Undetermined, _) | (_, None) => {
                            println!("- {} {}", name, result.category)
                        }
                        (category, Some(score)) => {
                            println!("- {} {} (score {:.2})", name, category, score)
                        }
                    },
                    Err(err) => println!("- {} rejected: {}", name, err),
                }
            }

            println!();
            for summary in report::summarize_by_category(&assessments) {
                println!("{}: {}", summary.category, summary.count);
            }
            tracing::info!(rows = assessments.len(), "batch classified");
        }
        Commands::Report { csv, cohort, out } => {
            let records = load_csv(&csv)?;
            let assessments = engine.classify_batch(records);
            let generated_on = chrono::Local::now().date_naive();
            let report = report::build_report(cohort.as_deref(), generated_on, &assessments);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Curves { metric, points } => {
            let curve = sample_curve(engine.partitions(), metric, points);
            println!("{}", serde_json::to_string_pretty(&curve)?);
        }
        Commands::Rules => {
            for (index, rule) in engine.rules().iter().enumerate() {
                println!("R{:<3} {}", index + 1, rule);
            }
        }
        Commands::Evaluate { csv } => {
            let records = load_csv(&csv)?;
            let assessments = engine.classify_batch(records);
            let evaluation = evaluate(&assessments);
            print!("{}", evaluation.render());
            tracing::info!(
                labeled = evaluation.labeled(),
                correct = evaluation.correct(),
                "evaluation finished"
            );
        }
    }

    Ok(())
}
