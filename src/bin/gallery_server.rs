//! CrossWOZ gallery server
//!
//! ## Usage
//!
//! ```bash
//! CROSSWOZ_DATA_DIR=~/datasets/crosswoz cargo run --bin gallery_server
//! cargo run --bin gallery_server -- --data-dir ./data --bind 0.0.0.0:8501 --preload
//!
//! curl http://localhost:8501/api/targets
//! curl 'http://localhost:8501/api/examples?file=train.json'
//! open 'http://localhost:8501/?file=val.json'
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crosswoz_gallery::config::{ENV_BIND, ENV_DATA_DIR};
use crosswoz_gallery::server::{create_router, AppState};
use crosswoz_gallery::{DatasetBrowser, DatasetStore, GalleryConfig};

#[derive(Parser)]
#[command(name = "gallery_server")]
#[command(about = "Serve the CrossWOZ dataset gallery over HTTP")]
struct Args {
    /// YAML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Directory holding {train,val,test}.json and database/
    #[arg(short = 'd', long, env = ENV_DATA_DIR)]
    data_dir: Option<PathBuf>,

    /// Address to listen on
    #[arg(short = 'b', long, env = ENV_BIND)]
    bind: Option<SocketAddr>,

    /// Read every dataset file before accepting requests
    #[arg(long)]
    preload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "crosswoz_gallery=info,gallery_server=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = GalleryConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = args.data_dir {
        config = config.data_dir(dir);
    }
    if let Some(addr) = args.bind {
        config = config.bind_addr(addr);
    }
    if args.preload {
        config = config.preload(true);
    }

    tracing::info!("Starting CrossWOZ gallery");
    tracing::info!("Data directory: {}", config.data_dir.display());

    let store = Arc::new(DatasetStore::new(&config.data_dir));
    if config.preload {
        let preload_store = store.clone();
        tokio::task::spawn_blocking(move || preload_store.preload())
            .await?
            .context("preloading dataset files")?;
    }

    let browser = DatasetBrowser::new(store).with_title(config.page_title.clone());
    let app = create_router(AppState::new(browser));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("Gallery listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn env_of(id: &str) -> Option<String> {
        Args::command()
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .and_then(|arg| arg.get_env())
            .map(|env| env.to_string_lossy().into_owned())
    }

    #[test]
    fn test_flags_fall_back_to_environment() {
        assert_eq!(env_of("data_dir").as_deref(), Some(ENV_DATA_DIR));
        assert_eq!(env_of("bind").as_deref(), Some(ENV_BIND));
    }

    #[test]
    fn test_flags_parse() {
        let args = Args::try_parse_from([
            "gallery_server",
            "--data-dir",
            "/srv/crosswoz",
            "--bind",
            "0.0.0.0:9000",
            "--preload",
        ])
        .unwrap();
        assert_eq!(args.data_dir, Some(PathBuf::from("/srv/crosswoz")));
        assert_eq!(args.bind.map(|a| a.port()), Some(9000));
        assert!(args.preload);
    }
}
