use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    trilium_mcp::cli::run().await?;
    Ok(())
}
