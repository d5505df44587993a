use anyhow::Result;
use roundtable::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
