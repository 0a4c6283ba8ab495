use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dropbox_cli::main_entry().await
}
