use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    buildwise_cli::main_entry().await
}
