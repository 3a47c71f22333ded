use anyhow::Context;
use backend::api;
use clap::Parser;
use opening_trainer::core::init_tracing;
use opening_trainer::session::Opponent;
use opening_trainer::{
    FallbackMoveSource, NoFallback, OpeningCatalog, OpeningTrieIndex, TrainerConfig, UciFallback,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Chess opening trainer HTTP service
#[derive(Parser, Debug)]
#[command(name = "trainer-backend", version, about)]
struct Cli {
    /// Optional JSON config file; flags and environment override it
    #[arg(long, env = "TRAINER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of recorded openings (*.pgn)
    #[arg(long, env = "OPENINGS_DIR")]
    openings_dir: Option<PathBuf>,

    /// UCI engine executable used once a game leaves theory
    #[arg(long, env = "STOCKFISH_PATH")]
    engine_path: Option<PathBuf>,

    /// Engine think budget per reply, in milliseconds
    #[arg(long, env = "ENGINE_BUDGET_MS")]
    engine_budget_ms: Option<u64>,

    /// Address to listen on
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<SocketAddr>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long)]
    log_filter: Option<String>,

    /// Fixed seed for the opponent's random choices
    #[arg(long, env = "TRAINER_SEED")]
    seed: Option<u64>,
}

impl Cli {
    fn into_config(self) -> TrainerConfig {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::load_or_default(path),
            None => TrainerConfig::default(),
        };
        if let Some(dir) = self.openings_dir {
            config.openings_dir = dir;
        }
        if self.engine_path.is_some() {
            config.engine_path = self.engine_path;
        }
        if let Some(budget) = self.engine_budget_ms {
            config.engine_budget_ms = budget;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(filter) = self.log_filter {
            config.log_filter = filter;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Cli::parse().into_config();
    init_tracing(&config.log_filter);

    let mut catalog = OpeningCatalog::new();
    let mut index = OpeningTrieIndex::new();
    let loaded = catalog
        .load_dir(&mut index, &config.openings_dir)
        .with_context(|| format!("reading openings from {:?}", config.openings_dir))?;
    info!(
        "[API] {} openings indexed into {} trie nodes",
        loaded,
        index.len()
    );

    let fallback: Arc<dyn FallbackMoveSource> =
        match UciFallback::discover(config.engine_path.as_deref()) {
            Some(engine) => Arc::new(engine),
            None => {
                warn!("[API] No UCI engine found, off-book replies will be random");
                Arc::new(NoFallback)
            }
        };
    let opponent = Opponent::new(fallback, config.engine_budget());

    let state = api::AppState::new(catalog, index, opponent, config.seed);
    let app = api::router(state);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!("[API] Listening on {}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
