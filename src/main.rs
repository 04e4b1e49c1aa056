use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    asciigen::cli::run_cli().await
}
