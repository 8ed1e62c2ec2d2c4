//! Ontograph CLI
//!
//! Command-line interface for:
//! - Transforming an XML Schema into an OWL/SKOS ontology (Turtle out)
//! - Inspecting the produced ontology (entity statistics)

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use ontograph_owl::{NameEncoding, SpecialCases, Transformer};
use ontograph_rdf::turtle;
use ontograph_xsd::parse_schema;

#[derive(Parser)]
#[command(name = "ontograph")]
#[command(author, version, about = "Ontograph: XSD to OWL/SKOS transformation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform an XSD file into a Turtle ontology.
    Transform {
        /// Input XSD file
        input: PathBuf,
        /// Output Turtle file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Base namespace for minted IRIs
        #[arg(long, default_value = "http://example.org/ontology#")]
        base_uri: String,
        /// Whitespace policy for minted fragments
        /// (underscore | dash | plus | percent | camelcase)
        #[arg(long, default_value = "underscore")]
        encoding: NameEncoding,
        /// Special-case table (JSON)
        #[arg(long)]
        special_cases: Option<PathBuf>,
        /// Print entity statistics to stderr after the transformation
        #[arg(long)]
        stats: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Transform {
            input,
            out,
            base_uri,
            encoding,
            special_cases,
            stats,
        } => transform(input, out, base_uri, encoding, special_cases, stats),
    }
}

fn transform(
    input: PathBuf,
    out: Option<PathBuf>,
    base_uri: String,
    encoding: NameEncoding,
    special_cases: Option<PathBuf>,
    stats: bool,
) -> Result<()> {
    let xsd = fs::read_to_string(&input)
        .with_context(|| format!("reading schema {}", input.display()))?;
    let tree = parse_schema(&xsd).with_context(|| format!("parsing {}", input.display()))?;

    let special = match special_cases {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading special cases {}", path.display()))?;
            SpecialCases::from_json(&json)
                .with_context(|| format!("parsing special cases {}", path.display()))?
        }
        None => SpecialCases::default(),
    };

    let transformer = Transformer::new()
        .with_encoding(encoding)
        .with_special_cases(special);
    let store = transformer.transform(&tree, &base_uri);

    if stats {
        let index_base = normalized_base(&base_uri);
        let stats = ontology_stats(&store);
        eprintln!("{}", format!("ontology @ {index_base}").bold());
        for (label, count) in stats {
            eprintln!("  {label}: {count}");
        }
    }

    let ttl = turtle::write_turtle(&store, Some(&normalized_base(&base_uri)));
    match out {
        Some(path) => {
            fs::write(&path, ttl).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "{} {}",
                "wrote".green(),
                path.display()
            );
        }
        None => print!("{ttl}"),
    }
    Ok(())
}

fn normalized_base(base_uri: &str) -> String {
    if base_uri.ends_with('#') || base_uri.ends_with('/') {
        base_uri.to_string()
    } else {
        format!("{base_uri}#")
    }
}

fn ontology_stats(store: &ontograph_rdf::TripleStore) -> Vec<(&'static str, usize)> {
    use ontograph_rdf::{vocab, Term};
    let count = |type_iri: &str| {
        store
            .subjects_with(vocab::RDF_TYPE, &Term::iri(type_iri))
            .len()
    };
    vec![
        ("classes", count(vocab::OWL_CLASS)),
        ("datatype properties", count(vocab::OWL_DATATYPE_PROPERTY)),
        ("object properties", count(vocab::OWL_OBJECT_PROPERTY)),
        ("concept schemes", count(vocab::SKOS_CONCEPT_SCHEME)),
        ("concepts", count(vocab::SKOS_CONCEPT)),
        ("triples", store.len()),
    ]
}
