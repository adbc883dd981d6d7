//! Lexicon CLI
//!
//! Looks up and imports words from the dictionary providers into
//! PostgreSQL, and replays cached provider responses with `backfill`.
//!
//! # Usage
//!
//! ```bash
//! # Apply the schema
//! lexicon migrate
//!
//! # Fast lookup (not persisted)
//! lexicon lookup run --source azvocab
//!
//! # Full import
//! lexicon import run --source oxford --json
//!
//! # Fill derived fields from cached responses
//! lexicon backfill --dry-run --batch-size 50
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;

use lexicon::backfill::{BackfillOptions, BackfillPipeline, BackfillReport};
use lexicon::core::Word;
use lexicon::http::ReqwestTransport;
use lexicon::persistence::{DatabaseConfig, DatabaseManager};
use lexicon::{ImportResult, LexiconConfig, LookupFactory};

#[derive(Parser)]
#[command(name = "lexicon")]
#[command(version = "0.1.0")]
#[command(about = "Multi-source dictionary lookup, import and backfill")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a word from a provider without persisting it
    Lookup {
        term: String,

        /// Dictionary source: azvocab, oxford, freedictionary
        #[arg(long, short = 's', default_value = "azvocab")]
        source: String,

        /// Language code (defaults to LEXICON_DEFAULT_LANGUAGE)
        #[arg(long, short = 'l')]
        language: Option<String>,
    },

    /// Fetch every matching entry and persist the resulting words
    Import {
        term: String,

        #[arg(long, short = 's', default_value = "azvocab")]
        source: String,
    },

    /// Fill derived word fields from cached provider responses
    Backfill {
        /// Run every step except the final write
        #[arg(long, short = 'n')]
        dry_run: bool,

        #[arg(long, short = 'b')]
        batch_size: Option<usize>,

        /// Language of the words to update
        #[arg(long, short = 'l')]
        language: Option<String>,
    },

    /// Apply database migrations
    Migrate,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.command, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                println!("{}", json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, as_json: bool) -> anyhow::Result<()> {
    let mut config = LexiconConfig::from_env();
    let db = DatabaseManager::new(DatabaseConfig::default()).await?;

    match command {
        Commands::Migrate => {
            db.run_migrations().await?;
            if as_json {
                println!("{}", json!({ "migrated": true }));
            } else {
                println!("{} schema is up to date", "Migrated:".green().bold());
            }
        }

        Commands::Lookup {
            term,
            source,
            language,
        } => {
            // The process exits right after printing, so a background import
            // would be cut off. Use `import` to persist.
            config.fetch.background_enrichment = false;
            let factory = build_factory(&config, &db)?;
            let word = factory
                .lookup(&term, &source, language.as_deref())
                .await?;
            match word {
                Some(word) if as_json => println!("{}", serde_json::to_string_pretty(&word_json(&word))?),
                Some(word) => print_word(&word),
                None if as_json => println!("{}", json!({ "found": false, "term": term })),
                None => println!("{} '{}' in {}", "Not found:".yellow().bold(), term, source),
            }
        }

        Commands::Import { term, source } => {
            let factory = build_factory(&config, &db)?;
            let results = factory.import(&term, &source).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_import(&term, &results);
            }
        }

        Commands::Backfill {
            dry_run,
            batch_size,
            language,
        } => {
            let options = BackfillOptions {
                dry_run,
                batch_size: batch_size.unwrap_or(config.backfill_batch_size),
                language: language.unwrap_or_else(|| config.default_language.clone()),
            };
            let pipeline = BackfillPipeline::new(
                Arc::new(db.raw_response_store()),
                Arc::new(db.backfill_store()),
            );
            let report = pipeline.run(&options).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, dry_run);
            }
        }
    }

    db.close().await;
    Ok(())
}

fn build_factory(config: &LexiconConfig, db: &DatabaseManager) -> anyhow::Result<LookupFactory> {
    let transport = Arc::new(ReqwestTransport::new(config.http_timeout)?);
    Ok(LookupFactory::from_config(
        config,
        transport,
        Arc::new(db.raw_response_store()),
        Arc::new(db.word_repository()),
    ))
}

// =============================================================================
// OUTPUT
// =============================================================================

fn word_json(word: &Word) -> serde_json::Value {
    json!({
        "id": word.id(),
        "text": word.text(),
        "normalizedText": word.normalized_text(),
        "language": word.language(),
        "source": word.source(),
        "frequencyRank": word.frequency_rank(),
        "frequencyCount": word.frequency_count(),
        "inflections": word.inflections(),
        "wordFamily": word.word_family(),
        "pronunciations": word.pronunciations().iter().map(|p| json!({
            "ipa": p.ipa(),
            "audioUrl": p.audio_url(),
            "region": p.region(),
        })).collect::<Vec<_>>(),
        "senses": word.senses_in_display_order().into_iter().map(|s| json!({
            "senseIndex": s.sense_index(),
            "partOfSpeech": s.part_of_speech(),
            "definition": s.definition(),
            "shortDefinition": s.short_definition(),
            "localizedDefinition": s.localized_definition(),
            "cefrLevel": s.cefr_level(),
            "relations": s.relations(),
            "examples": s.examples().iter().map(|e| json!({
                "text": e.text(),
                "translation": e.translation(),
            })).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
    })
}

fn print_word(word: &Word) {
    println!("\n{} ({})", word.text().bold(), word.source().dimmed());

    let prons: Vec<String> = word
        .pronunciations()
        .iter()
        .filter_map(|p| {
            let ipa = p.ipa()?;
            Some(match p.region() {
                Some(region) => format!("{} {}", region.cyan(), ipa),
                None => ipa.to_string(),
            })
        })
        .collect();
    if !prons.is_empty() {
        println!("  {}", prons.join("  "));
    }

    for sense in word.senses_in_display_order() {
        let level = sense
            .cefr_level()
            .map(|l| format!(" [{}]", l))
            .unwrap_or_default();
        println!(
            "\n  {}. {}{}",
            sense.sense_index() + 1,
            sense.part_of_speech().italic().green(),
            level.yellow()
        );
        println!("     {}", sense.definition());
        if let Some(localized) = sense.localized_definition() {
            println!("     {}", localized.dimmed());
        }
        for example in sense.examples() {
            println!("     {} {}", "•".dimmed(), example.text().italic());
        }
    }

    if let Some(family) = word.word_family() {
        if !family.is_empty() {
            println!("\n  {}", "Word family:".cyan());
            for (pos, forms) in family {
                println!("     {}: {}", pos, forms.join(", "));
            }
        }
    }
    println!();
}

fn print_import(term: &str, results: &[ImportResult]) {
    if results.is_empty() {
        println!("{} nothing imported for '{}'", "Not found:".yellow().bold(), term);
        return;
    }
    for r in results {
        let status = if r.created {
            "Created:".green().bold()
        } else {
            "Updated:".cyan().bold()
        };
        println!(
            "{} {} ({}) senses +{}, pronunciations +{}, examples +{}, details merged {}",
            status,
            r.text,
            r.word_id,
            r.senses_created,
            r.pronunciations_created,
            r.examples_created,
            r.details_merged
        );
    }
}

fn print_report(report: &BackfillReport, dry_run: bool) {
    let title = if dry_run { "Backfill (dry run)" } else { "Backfill" };
    println!("\n{}", title.cyan().bold());
    println!("  {:<10} {}", "processed", report.total_processed);
    println!("  {:<10} {}", "updated", report.updated_count.to_string().green());
    println!("  {:<10} {}", "skipped", report.skipped_count);
    let errors = report.error_count.to_string();
    println!(
        "  {:<10} {}",
        "errors",
        if report.error_count > 0 { errors.red() } else { errors.normal() }
    );
}
