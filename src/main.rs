use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use slidedeck_tools::config::Config;
use slidedeck_tools::facade::{DeckTools, ToolOutput};
use slidedeck_tools::model::SlideDescriptor;
use slidedeck_tools::store::DeckStore;
use slidedeck_tools::{Result, ToolError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

/// Executes one command and prints its outcome. Returns whether it succeeded.
fn run(cli: Cli) -> Result<bool> {
    let mut config = Config::from_env();
    if let Some(decks_dir) = cli.decks_dir {
        config = config.with_decks_dir(decks_dir);
    }
    init_tracing(&config.log_filter)?;

    let tools = DeckTools::new(DeckStore::new(config.decks_dir.clone()));
    let output = execute(&tools, cli.command)?;
    if cli.json {
        println!("{}", output.to_json());
    } else {
        println!("{}", output.render());
    }
    Ok(output.is_ok())
}

fn execute(tools: &DeckTools, command: Command) -> Result<ToolOutput> {
    Ok(match command {
        Command::Create { name, purpose } => tools.create_deck(&name, &purpose),
        Command::Clone { source, target } => tools.clone_deck(&source, &target),
        Command::Delete { name } => tools.delete_deck(&name),
        Command::List => tools.list_decks(),
        Command::Generate { name, slides } => {
            let slides: Vec<SlideDescriptor> = load_json(&slides)?;
            tools.generate_slides(&name, &slides)
        }
        Command::Validate { name } => tools.validate_deck(&name),
        Command::AddImage { name, title, image } => tools.add_image_slide(&name, &title, &image),
        Command::AppendSlide { name, slide } => {
            let slide: SlideDescriptor = load_json(&slide)?;
            tools.append_slide(&name, &slide)
        }
        Command::RemoveSlide { name, index } => tools.remove_slide(&name, index),
        Command::Package { name, target } => tools.package_deck(&name, &target),
        Command::ExportPdf { name } => tools.export_pdf(&name),
    })
}

fn init_tracing(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Create, generate, validate, and package slide decks."
)]
struct Cli {
    /// Directory holding every deck. Overrides SLIDEDECK_DECKS_DIR.
    #[arg(long, global = true)]
    decks_dir: Option<PathBuf>,

    /// Print a JSON envelope with an explicit ok/error discriminant.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialise a new deck folder.
    Create {
        name: String,
        /// Purpose recorded in the deck metadata.
        #[arg(long, default_value = "")]
        purpose: String,
    },
    /// Copy an existing deck under a new name.
    Clone { source: String, target: String },
    /// Remove a deck and all of its files.
    Delete { name: String },
    /// List all decks.
    List,
    /// Generate the deck's presentation from a JSON array of slide descriptors.
    Generate {
        name: String,
        /// Path to the descriptor file.
        #[arg(long)]
        slides: PathBuf,
    },
    /// Validate the deck's generated presentation.
    Validate { name: String },
    /// Append a slide showing an image from the deck's assets folder.
    AddImage {
        name: String,
        #[arg(long)]
        title: String,
        /// File name inside `assets/`.
        #[arg(long)]
        image: String,
    },
    /// Append one slide described by a JSON object.
    AppendSlide {
        name: String,
        #[arg(long)]
        slide: PathBuf,
    },
    /// Remove the slide at a 0-based position.
    RemoveSlide { name: String, index: usize },
    /// Copy the presentation and assets into `<target>/<name>_dist`.
    Package {
        name: String,
        #[arg(long)]
        target: PathBuf,
    },
    /// Write the placeholder PDF export.
    ExportPdf { name: String },
}
