//! Element templates CLI
//!
//! Usage:
//!   element-templates [OPTIONS] [FILES]...
//!
//! Validates element template documents against the bundled JSON
//! schema and registers the ones that pass. Each rejected template is
//! reported through the log stream, one line per broken rule. Reads
//! stdin when no file is given.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use element_templates::schema::{SCHEMA_PACKAGE, SCHEMA_VERSION};
use element_templates::{
    parse_templates, register_template, TemplateRegistry, TemplateSchema, Validator,
};

#[derive(Parser)]
#[command(name = "element-templates")]
#[command(about = "Validation for Camunda 8 element templates")]
struct Cli {
    /// Template files, each a single template or an array of templates
    /// (reads from stdin if not provided)
    files: Vec<PathBuf>,

    /// Validate against a schema file instead of the bundled one
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    // Rejections are logged at warn level, so they show by default
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.files.is_empty() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    // Load the structural schema
    let schema = match &cli.schema {
        Some(path) => match TemplateSchema::from_file(path, SCHEMA_PACKAGE, SCHEMA_VERSION) {
            Ok(schema) => schema,
            Err(e) => {
                eprintln!("Error loading schema '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => TemplateSchema::bundled(),
    };

    // Read input
    let mut documents: Vec<(String, String)> = Vec::new();
    if cli.files.is_empty() {
        let mut buffer = String::new();
        match io::stdin().read_to_string(&mut buffer) {
            Ok(_) => documents.push(("<stdin>".to_string(), buffer)),
            Err(e) => {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        for path in &cli.files {
            match fs::read_to_string(path) {
                Ok(content) => documents.push((path.display().to_string(), content)),
                Err(e) => {
                    eprintln!("Error reading file '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
    }

    // Validate every template against one shared registry, so
    // uniqueness holds across all given files
    let validator = Validator::new().with_schema(schema);
    let mut registry = TemplateRegistry::new();

    let mut accepted = 0usize;
    let mut rejected = 0usize;

    for (label, content) in &documents {
        let templates = match parse_templates(content) {
            Ok(templates) => templates,
            Err(e) => {
                eprintln!("Error parsing '{}': {}", label, e);
                rejected += 1;
                continue;
            }
        };

        for template in templates {
            if register_template(&validator, &mut registry, template).is_ok() {
                accepted += 1;
            } else {
                rejected += 1;
            }
        }
    }

    println!("{} template(s) accepted, {} rejected", accepted, rejected);

    if rejected > 0 {
        std::process::exit(1);
    }
}

fn print_intro() {
    println!(
        r#"Element templates - validation for Camunda 8 element templates

USAGE:
    element-templates [OPTIONS] [FILES]...
    cat template.json | element-templates

Each file holds one template or an array of templates. Every template
is checked for $schema presence and support, schema version
compatibility, id/version uniqueness, element-type applicability and
JSON schema compliance. Rejected templates are logged one rule at a
time; the exit code is 1 when any template is rejected.

OPTIONS:
    -s, --schema <FILE>   Validate against a schema file instead of the bundled one
    -v, --verbose         Increase log verbosity (-v info, -vv debug, -vvv trace)
    -h, --help            Print help

QUICK START:
    element-templates templates/*.json"#
    );
}
