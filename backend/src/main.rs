//! Droparea server CLI
//!
//! ```bash
//! droparea-server serve                          # POST /upload on port 3000
//! droparea-server serve --port 8080 --max-size-kb 2048
//! droparea-server serve --static-dir frontend/dist
//! ```
//!
//! Every flag falls back to its `DROPAREA_*` environment variable, and a
//! `.env` file is loaded first when present.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use droparea_server::ServerConfig;

#[derive(Parser)]
#[command(name = "droparea-server")]
#[command(about = "Reference upload endpoint for the droparea widget", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on [env: DROPAREA_PORT, default: 3000]
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory receiving uploads [env: DROPAREA_UPLOAD_DIR, default: uploads]
        #[arg(short, long)]
        upload_dir: Option<PathBuf>,

        /// Largest accepted file in KB [env: DROPAREA_MAX_SIZE_KB, default: 10240]
        #[arg(short, long)]
        max_size_kb: Option<u64>,

        /// Directory served at / [env: DROPAREA_STATIC_DIR]
        #[arg(short, long)]
        static_dir: Option<PathBuf>,
    },

    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env();

    let result = match cli.command {
        Commands::Serve {
            port,
            upload_dir,
            max_size_kb,
            static_dir,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = upload_dir {
                config.upload_dir = dir;
            }
            if let Some(kb) = max_size_kb {
                config.max_size_kb = kb;
            }
            if static_dir.is_some() {
                config.static_dir = static_dir;
            }
            droparea_server::start_server(config).await
        }

        Commands::Config => {
            cmd_config(&config);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_config(config: &ServerConfig) {
    println!("port:        {}", config.port);
    println!("upload_dir:  {}", config.upload_dir.display());
    println!("max_size_kb: {}", config.max_size_kb);
    match &config.static_dir {
        Some(dir) => println!("static_dir:  {}", dir.display()),
        None => println!("static_dir:  (none)"),
    }
}
