//! RPC command: serve the message protocol as JSON lines.

use super::open_cache;
use crate::config::Config;
use crate::fx;
use crate::protocol::{Response, Session};
use crate::scrape::{PageClient, PageFetch, PricingTable};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Answers one JSON request per input line with one JSON response line.
pub struct RpcCommand {
    config: Config,
}

impl RpcCommand {
    /// Creates a new rpc command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Loads the optional pricing page, then serves stdin/stdout until EOF.
    pub async fn execute(&self, url: Option<&str>) -> Result<usize> {
        let table = match url {
            Some(url) => {
                let client = PageClient::new(&self.config).context("Failed to create HTTP client")?;
                Some(self.load_table(&client, url).await?)
            }
            None => None,
        };

        let source = fx::rate_source(&self.config).context("Failed to create rate source")?;
        let mut session = Session::new(&self.config, source, open_cache(&self.config), table);

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        serve(&mut session, stdin, tokio::io::stdout()).await
    }

    /// Fetches and parses the pricing table served to the session.
    pub async fn load_table<F: PageFetch + ?Sized>(&self, client: &F, url: &str) -> Result<PricingTable> {
        let html = client.fetch(url).await?;
        let table = PricingTable::parse(&html)?;
        info!("Loaded pricing table with {} rows", table.rows.len());
        Ok(table)
    }
}

/// Serves requests until the reader is exhausted. Returns the number of
/// requests answered. Blank lines are skipped.
pub async fn serve<R, W>(session: &mut Session, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = session.handle_line(line).await;
        let mut encoded = serde_json::to_string(&response).unwrap_or_else(|e| {
            serde_json::to_string(&Response::Error { message: e.to_string() })
                .unwrap_or_else(|_| r#"{"status":"error","message":"encoding failed"}"#.to_string())
        });
        encoded.push('\n');

        writer.write_all(encoded.as_bytes()).await.context("Failed to write response")?;
        writer.flush().await.context("Failed to flush response")?;
        handled += 1;
    }

    debug!("Input closed after {} requests", handled);
    Ok(handled)
}
