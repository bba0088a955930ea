use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use order_status_engine::config::Config;
use order_status_engine::db::Db;
use order_status_engine::error::Error;
use order_status_engine::request::{self, Response};

#[cfg(feature = "redis_db")]
async fn init_db(config: &Config) -> Result<Db, Error> {
    log::info!("Connecting to {}", config.redis_url);
    Db::new(config).await
}

#[cfg(not(feature = "redis_db"))]
async fn init_db(_config: &Config) -> Result<Db, Error> {
    log::warn!("Using in-memory store, orders are lost on exit");
    Ok(Db::new())
}

/// Reads one request per line from stdin, answers one response per line
#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    log::info!("Starting order service...");

    let config = Config::from_env();
    let mut db = init_db(&config).await?;

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue
        }

        let response = match request::parse_line(&line) {
            Ok(req) => request::handle(&mut db, req).await,
            Err(e) => {
                log::warn!("bad request {line:?}: {e}");
                Response::error(format!("Could not parse request: {e}"))
            },
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    log::info!("stdin closed, bye");
    Ok(())
}
