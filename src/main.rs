use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;

use orb::config::OrbConfig;
use orb::errors::OrbError;
use orb::intake::{self, DoodleInput};
use orb::storage::sqlite::SqliteStore;

#[derive(Parser)]
#[command(name = "orb", version, about = "An anonymous scrying orb")]
struct Cli {
    /// Output results as JSON
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and uploads directory
    Init,

    /// Submit text, a canvas drawing payload, or an image file
    Submit {
        /// Text content (trimmed, at most 2000 characters kept)
        #[arg(short, long)]
        text: Option<String>,

        /// Path to a PNG, JPG, or GIF file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Canvas data URL (data:image/...;base64,...)
        #[arg(short, long)]
        canvas: Option<String>,
    },

    /// Receive one random vision from the orb
    Scry,

    /// Show how many submissions the orb holds
    Stats,

    /// Write a stored doodle image to a file
    Image {
        /// Stored filename, as recorded on a submission
        filename: String,

        /// Destination path (defaults to the filename in the current dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct StatusResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    submission_id: Option<i64>,
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            eprintln!("{}", serde_json::json!({"error": e.to_string()}));
        } else {
            eprintln!("error: {}", e);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> orb::errors::Result<()> {
    let config = OrbConfig::new();
    let json = cli.json;

    match cli.command {
        Commands::Init => cmd_init(&config, json),
        Commands::Submit { text, file, canvas } => {
            cmd_submit(&config, text, file, canvas, json)
        }
        Commands::Scry => cmd_scry(&config, json),
        Commands::Stats => cmd_stats(&config, json),
        Commands::Image { filename, out } => cmd_image(&config, &filename, out, json),
    }
}

fn open_store(config: &OrbConfig) -> orb::errors::Result<SqliteStore> {
    SqliteStore::open(&config.db_path)
}

fn print_status(status: &StatusResponse, json: bool) {
    if json {
        println!("{}", serde_json::to_string(status).unwrap());
    } else {
        println!("{}", status.message);
    }
}

fn cmd_init(config: &OrbConfig, json: bool) -> orb::errors::Result<()> {
    std::fs::create_dir_all(&config.uploads_dir)?;
    open_store(config)?;
    print_status(
        &StatusResponse {
            success: true,
            message: format!("Orb ready at {}.", config.base_dir.display()),
            submission_id: None,
        },
        json,
    );
    Ok(())
}

fn cmd_submit(
    config: &OrbConfig,
    text: Option<String>,
    file: Option<PathBuf>,
    canvas: Option<String>,
    json: bool,
) -> orb::errors::Result<()> {
    let upload = match file {
        Some(path) => {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let bytes = std::fs::read(&path)
                .map_err(|e| OrbError::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
            Some((bytes, filename))
        }
        None => None,
    };

    let doodle = DoodleInput::resolve(canvas, upload)?;
    let store = open_store(config)?;
    let submission = intake::submit_intake(config, &store, text.as_deref(), doodle)?;

    print_status(
        &StatusResponse {
            success: true,
            message: format!("The orb has received your offering (#{}).", submission.id),
            submission_id: Some(submission.id),
        },
        json,
    );
    Ok(())
}

fn cmd_scry(config: &OrbConfig, json: bool) -> orb::errors::Result<()> {
    let store = open_store(config)?;
    match intake::fetch_vision(&store)? {
        Some(submission) => {
            if json {
                println!("{}", serde_json::to_string(&submission).unwrap());
                return Ok(());
            }
            println!(
                "Vision #{} ({}) from {}",
                submission.id,
                submission.kind.as_str(),
                submission.created_at.format("%Y-%m-%d %H:%M")
            );
            if let Some(text) = &submission.text_content {
                println!("{}", text);
            }
            if let Some(filename) = &submission.doodle_filename {
                println!("doodle: {}", filename);
            }
        }
        None => print_status(
            &StatusResponse {
                success: false,
                message: "The orb is empty... no visions to see.".to_string(),
                submission_id: None,
            },
            json,
        ),
    }
    Ok(())
}

fn cmd_stats(config: &OrbConfig, json: bool) -> orb::errors::Result<()> {
    let store = open_store(config)?;
    let total = intake::fetch_stats(&store)?;
    if json {
        println!("{}", serde_json::json!({"total_submissions": total}));
    } else {
        println!("Total submissions: {}", total);
    }
    Ok(())
}

fn cmd_image(
    config: &OrbConfig,
    filename: &str,
    out: Option<PathBuf>,
    json: bool,
) -> orb::errors::Result<()> {
    let bytes = intake::serve_image(config, filename)?;
    let out = out.unwrap_or_else(|| PathBuf::from(filename));
    let mut file = std::fs::File::create(&out)?;
    file.write_all(&bytes)?;
    print_status(
        &StatusResponse {
            success: true,
            message: format!("Wrote {} bytes to {}.", bytes.len(), out.display()),
            submission_id: None,
        },
        json,
    );
    Ok(())
}
