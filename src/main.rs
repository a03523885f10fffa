//!
//! agendo shell binary
//! --------------------
//! Entry point owning the application lifecycle: build the context, run the
//! single startup session resolution, then hand off to the interactive
//! shell. One-shot route resolution is available for scripting.

use std::env;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use agendo::app::App;
use agendo::cli;
use agendo::config::Config;
use agendo::routing::Resolution;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api-url <url>] [--state-dir <dir>] [--open <path>]\n\nFlags:\n  --api-url <url>      Backend REST API base (default: $AGENDO_API_URL or http://127.0.0.1:4000)\n  --state-dir <dir>    Durable client state directory (default: $AGENDO_STATE_DIR or .agendo)\n  --open <path>        Resolve one path through the route table and exit\n  -h, --help           Show this help\n\nWithout --open, an interactive shell starts; type 'help' inside it."
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut config = Config::from_env();
    let mut open: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api-url" => {
                if i + 1 >= args.len() { eprintln!("--api-url requires a value"); print_usage(&program); std::process::exit(2); }
                config.api_url = args[i + 1].clone();
                i += 2; continue;
            }
            "--state-dir" => {
                if i + 1 >= args.len() { eprintln!("--state-dir requires a value"); print_usage(&program); std::process::exit(2); }
                config.state_dir = args[i + 1].clone().into();
                i += 2; continue;
            }
            "--open" => {
                if i + 1 >= args.len() { eprintln!("--open requires a path"); print_usage(&program); std::process::exit(2); }
                open = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "agendo",
        "agendo starting: RUST_LOG='{}', api_url='{}', state_dir='{}'",
        rust_log, config.api_url, config.state_dir.display()
    );

    let app = App::new(config)?;
    app.initialize().await?;

    if let Some(path) = open {
        match app.resolve(&path) {
            Resolution::Render(entry) => println!("render {} (route {})", path, entry.path),
            Resolution::Redirect(target) => println!("redirect -> {}", target),
        }
        return Ok(());
    }

    match app.session.identity() {
        Some(id) => info!(target: "agendo", "restored session for {} ({})", id.email, id.role),
        None => info!(target: "agendo", "no persisted session"),
    }

    let result = cli::run_shell(&app).await;
    app.teardown();
    result
}
