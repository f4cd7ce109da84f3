//! x-context: Convert AI coding assistant context files between tool formats

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    x_context::cli::run().await
}
