//! CrossWOZ gallery CLI
//!
//! Usage:
//!   gallery targets                                   # List selectable files
//!   gallery render -f train.json -e 1 -o page.html    # Render one example
//!   gallery render -f database/hotel_db.json          # Render a database table
//!   gallery highlight -i doc.json --title "NER"       # Highlight entity spans

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use crosswoz_gallery::browser::{BrowseOutcome, KEY_EXAMPLE, KEY_FILE, KEY_TYPES};
use crosswoz_gallery::config::ENV_DATA_DIR;
use crosswoz_gallery::highlight::{AnnotatedDoc, ColorSpec, EntityDoc, EntityInput};
use crosswoz_gallery::{
    DatasetBrowser, DatasetStore, EntityHighlighter, GalleryConfig, Page, Surface, Target,
};

#[derive(Parser)]
#[command(name = "gallery")]
#[command(about = "Render CrossWOZ gallery pages to static HTML")]
struct Cli {
    /// YAML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding {train,val,test}.json and database/
    #[arg(short = 'd', long, global = true, env = ENV_DATA_DIR)]
    data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the selectable dataset files
    Targets,

    /// Render a split example or database table
    Render {
        /// File to render, e.g. train.json or database/hotel_db.json
        #[arg(short = 'f', long)]
        file: String,

        /// Example id (defaults to the first matching example)
        #[arg(short = 'e', long)]
        example: Option<String>,

        /// Restrict to these example types (repeatable)
        #[arg(short = 't', long = "types")]
        types: Vec<String>,

        /// Output file (stdout when omitted)
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },

    /// Highlight entities of a JSON document ({text, ents} or annotated tokens)
    Highlight {
        #[arg(short = 'i', long)]
        input: PathBuf,

        #[arg(long)]
        title: Option<String>,

        /// Colors as a JSON list or label-to-color object
        #[arg(long)]
        colors: Option<String>,

        /// Labels to highlight (repeatable; all when omitted)
        #[arg(short = 'l', long = "label")]
        labels: Vec<String>,

        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HighlightInput {
    Parsed(EntityDoc),
    Annotated(AnnotatedDoc),
}

impl From<HighlightInput> for EntityInput {
    fn from(input: HighlightInput) -> Self {
        match input {
            HighlightInput::Parsed(doc) => EntityInput::PreParsed(doc),
            HighlightInput::Annotated(doc) => EntityInput::Annotated(doc),
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "crosswoz_gallery=debug"
    } else {
        "crosswoz_gallery=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = GalleryConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config = config.data_dir(dir);
    }

    match cli.command {
        Command::Targets => {
            for target in Target::all() {
                println!("{:<30} {}", target.file_name(), target.kind());
            }
            Ok(())
        }
        Command::Render {
            file,
            example,
            types,
            out,
        } => {
            let mut pairs = vec![(KEY_FILE.to_string(), file)];
            pairs.extend(types.into_iter().map(|t| (KEY_TYPES.to_string(), t)));
            if let Some(id) = example.clone() {
                pairs.push((KEY_EXAMPLE.to_string(), id));
            }

            let store = Arc::new(DatasetStore::new(&config.data_dir));
            let browser = DatasetBrowser::new(store).with_title(config.page_title.clone());
            let mut page = Page::from_query(browser.title(), pairs);
            let outcome = browser.visualize(&mut page)?;
            tracing::debug!("Render outcome: {:?}", outcome);

            if let (Some(requested), BrowseOutcome::Dialogue { example_id, .. }) =
                (&example, &outcome)
            {
                if example_id.as_ref() != Some(requested) {
                    anyhow::bail!("example '{}' is not among the selected examples", requested);
                }
            }
            write_output(out.as_deref(), &page.to_html())
        }
        Command::Highlight {
            input,
            title,
            colors,
            labels,
            out,
        } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let doc: HighlightInput = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", input.display()))?;
            let colors: Option<ColorSpec> = colors
                .map(|c| serde_json::from_str(&c))
                .transpose()
                .context("parsing --colors")?;

            let pairs: Vec<(String, String)> =
                labels.into_iter().map(|l| ("labels".to_string(), l)).collect();
            let mut page = Page::from_query("Entity Highlighter", pairs);
            page.sidebar_title("Entity Highlighter");
            EntityHighlighter::new().highlight(&mut page, doc, title.as_deref(), colors.as_ref())?;
            write_output(out.as_deref(), &page.to_html())
        }
    }
}

fn write_output(out: Option<&Path>, html: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}
