mod inspect;

use clap::{Parser, Subcommand, ValueEnum};
use inspect::{catalog_json, catalog_text, schema_json, schema_text};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use survey_spec::{
    Catalog, FormSession, QuestionDocument, Selection, catalog_schema, document_schema, resolve,
    validate_document, validate_resolved,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Site-survey question pack admin CLI",
    long_about = "Validates question documents, previews resolved schemas per equipment selection, and inspects the equipment catalog"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SchemaKind {
    Questions,
    Catalog,
}

#[derive(Subcommand)]
enum Command {
    /// Check a question document, and every catalog model against it.
    Validate {
        /// Path to the question document JSON.
        #[arg(long, value_name = "QUESTIONS")]
        questions: PathBuf,
        /// Optional catalog JSON; every model in it is resolved and checked.
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<PathBuf>,
    },
    /// Resolve one selection and print the schema with its submission gate.
    Resolve {
        /// Path to the question document JSON.
        #[arg(long, value_name = "QUESTIONS")]
        questions: PathBuf,
        /// Catalog JSON; lets --make/--model be catalog keys.
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<PathBuf>,
        /// Category label. When omitted the catalog derives it from the model.
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        /// Optional JSON object of answers to seed the session with.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Fill unanswered defaults before printing.
        #[arg(long)]
        prefill: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the equipment catalog with normalized dimensions.
    Catalog {
        /// Path to the catalog JSON.
        #[arg(long, value_name = "CATALOG")]
        catalog: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the JSON Schema for authored documents.
    Schema {
        #[arg(long, value_enum, default_value_t = SchemaKind::Questions)]
        kind: SchemaKind,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Validate { questions, catalog } => run_validate(questions, catalog),
        Command::Resolve {
            questions,
            catalog,
            category,
            make,
            model,
            answers,
            prefill,
            format,
        } => run_resolve(questions, catalog, category, make, model, answers, prefill, format),
        Command::Catalog { catalog, format } => run_catalog(catalog, format),
        Command::Schema { kind } => run_schema(kind),
    }
}

fn run_validate(questions_path: PathBuf, catalog_path: Option<PathBuf>) -> CliResult<()> {
    let document = load_questions(&questions_path)?;
    let mut failures = 0usize;

    let document_errors = validate_document(&document);
    if !document_errors.is_empty() {
        println!("Document errors:");
        for error in &document_errors {
            println!("  {}", error);
        }
        failures += document_errors.len();
    }

    if let Some(path) = catalog_path {
        let catalog = load_catalog(&path)?;
        for (make_key, model_key) in catalog.equipment_keys() {
            let Some(selection) = catalog.selection_for(make_key, model_key) else {
                continue;
            };
            match resolve(&document, &selection) {
                Ok(schema) => {
                    let errors = validate_resolved(&schema);
                    if !errors.is_empty() {
                        println!("Errors for {}:", selection);
                        for error in &errors {
                            println!("  {}", error);
                        }
                        failures += errors.len();
                    }
                }
                Err(error) => {
                    println!("Resolution failed for {}: {}", selection, error);
                    failures += 1;
                }
            }
        }
    }

    println!(
        "Validation result: {}",
        if failures == 0 { "valid" } else { "invalid" }
    );
    if failures == 0 {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn run_resolve(
    questions_path: PathBuf,
    catalog_path: Option<PathBuf>,
    category: Option<String>,
    make: String,
    model: String,
    answers_path: Option<PathBuf>,
    prefill: bool,
    format: OutputFormat,
) -> CliResult<()> {
    let document = load_questions(&questions_path)?;
    let catalog = match &catalog_path {
        Some(path) => load_catalog(path)?,
        None => Catalog::default(),
    };

    let selection = match category {
        Some(category) => Selection::new(category, make, model),
        None => catalog.selection_for(&make, &model).ok_or_else(|| {
            format!(
                "catalog has no model '{}' for make '{}'; pass --category to resolve by label",
                model, make
            )
        })?,
    };

    let mut session = FormSession::new(document, catalog, selection)?;

    if let Some(path) = answers_path {
        let contents = fs::read_to_string(path)?;
        let answers: Value = serde_json::from_str(&contents)?;
        let Value::Object(entries) = answers else {
            return Err("answers file must contain a JSON object".into());
        };
        for (name, value) in entries {
            session.set_answer(name, value);
        }
    }

    if prefill {
        session.prefill_defaults();
    }

    match format {
        OutputFormat::Text => println!("{}", schema_text(&session)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&schema_json(&session))?)
        }
    }
    Ok(())
}

fn run_catalog(catalog_path: PathBuf, format: OutputFormat) -> CliResult<()> {
    let catalog = load_catalog(&catalog_path)?;
    match format {
        OutputFormat::Text => println!("{}", catalog_text(&catalog)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&catalog_json(&catalog))?)
        }
    }
    Ok(())
}

fn run_schema(kind: SchemaKind) -> CliResult<()> {
    let schema = match kind {
        SchemaKind::Questions => document_schema(),
        SchemaKind::Catalog => catalog_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn load_questions(path: &Path) -> CliResult<QuestionDocument> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn load_catalog(path: &Path) -> CliResult<Catalog> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
