use std::path::PathBuf;

use catalog::{JsonFileProjectStore, ProjectDraft, ProjectQuery, ProjectStatus};
use clap::{Parser, Subcommand};
use foundation::{GeoPoint, Id};
use layers::LayerSlot;
use serde_json::json;
use tools::{ProjectSession, SessionError};
use tracing_subscriber::EnvFilter;
use viewport::{HeadlessEngine, RenderTarget, ViewportConfig, ViewportError};

const DEFAULT_STORE: &str = "saved_projects.json";

type Session = ProjectSession<JsonFileProjectStore, HeadlessEngine>;

#[derive(Debug, Parser)]
#[command(name = "geoprojects", about = "Browse and manage geotagged projects")]
struct Cli {
    /// Project store file. Defaults to $GEOPROJECTS_STORE, then saved_projects.json.
    #[arg(long)]
    store: Option<PathBuf>,
    /// JSON file with viewport settings; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List projects, newest first.
    List {
        /// Show only these statuses (repeatable).
        #[arg(long)]
        status: Vec<ProjectStatus>,
    },
    /// Add a project at a location.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        author: String,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, default_value = "unverified")]
        status: ProjectStatus,
        #[arg(long, default_value_t = 0)]
        rating: u32,
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Delete a project.
    Delete { id: String },
    /// Increase a verified project's rating by one.
    Rate { id: String },
    /// Render the map headlessly and print layers and camera as JSON.
    View {
        #[command(flatten)]
        size: ViewSize,
    },
    /// Like `view`, after centering the map on one project.
    Focus {
        id: String,
        #[command(flatten)]
        size: ViewSize,
    },
}

#[derive(Debug, Clone, Copy, clap::Args)]
struct ViewSize {
    #[arg(long, default_value_t = 1024.0)]
    width: f64,
    #[arg(long, default_value_t = 768.0)]
    height: f64,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("project {0} not found")]
    NotFound(Id),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let store_path = cli
        .store
        .or_else(|| std::env::var_os("GEOPROJECTS_STORE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
    let store = JsonFileProjectStore::open(&store_path).map_err(SessionError::from)?;
    let mut session: Session = ProjectSession::new(store, config)?;

    match cli.command {
        Command::List { status } => cmd_list(&session, status),
        Command::Add {
            name,
            author,
            lon,
            lat,
            status,
            rating,
            image_url,
        } => {
            let draft = ProjectDraft {
                name,
                author,
                image_url,
                status,
                rating,
            };
            cmd_add(&mut session, draft, GeoPoint::new(lon, lat))
        }
        Command::Delete { id } => {
            let id = Id::from(id);
            if !session.delete(&id)? {
                return Err(CliError::NotFound(id));
            }
            println!("deleted {id}");
            Ok(())
        }
        Command::Rate { id } => {
            let id = Id::from(id);
            let rating = session.increase_rating(&id)?;
            println!("{id} rating {rating}");
            Ok(())
        }
        Command::View { size } => cmd_view(&mut session, size, None),
        Command::Focus { id, size } => cmd_view(&mut session, size, Some(Id::from(id))),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<ViewportConfig, CliError> {
    let Some(path) = path else {
        return Ok(ViewportConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn cmd_list(session: &Session, statuses: Vec<ProjectStatus>) -> Result<(), CliError> {
    let query = statuses
        .into_iter()
        .fold(ProjectQuery::all(), |q, s| q.with_status(s));
    let counts = session.counts()?;
    println!(
        "{} ({}) | {} ({}) | {} ({})",
        ProjectStatus::Verified.label(),
        counts.verified,
        ProjectStatus::Pending.label(),
        counts.pending,
        ProjectStatus::Unverified.label(),
        counts.unverified,
    );
    for p in session.list(&query)? {
        let rating = if p.is_rateable() {
            format!("  *{}", p.rating_label())
        } else {
            String::new()
        };
        println!(
            "{}  [{}]  {} / {}  {}{}",
            p.id, p.status, p.name, p.author, p.coordinates, rating
        );
    }
    Ok(())
}

fn cmd_add(session: &mut Session, draft: ProjectDraft, at: GeoPoint) -> Result<(), CliError> {
    session.begin_placement()?;
    session.handle_map_click(at)?;
    *session.draft_mut() = draft;
    let project = session.submit()?;
    println!("{}", project.id);
    Ok(())
}

fn cmd_view(session: &mut Session, size: ViewSize, focus: Option<Id>) -> Result<(), CliError> {
    let target = RenderTarget::new("geoprojects", size.width, size.height);
    session.mount(Some(&target))?;
    session.settle()?;
    if let Some(id) = focus {
        session.focus_project(&id)?;
        session.settle()?;
    }

    let viewport = session.viewport();
    let camera = viewport.camera();
    let center = camera
        .center_geo()
        .map_err(|e| SessionError::from(ViewportError::from(e)))?;
    let layers: Vec<_> = match viewport.engine() {
        Some(engine) => LayerSlot::ALL
            .iter()
            .map(|slot| {
                json!({
                    "slot": slot,
                    "zIndex": slot.z_index(),
                    "features": engine.layer(*slot),
                })
            })
            .collect(),
        None => Vec::new(),
    };
    let out = json!({
        "camera": { "center": center, "zoom": camera.zoom },
        "layers": layers,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    session.unmount();
    Ok(())
}
