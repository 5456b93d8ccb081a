use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    sims_dashboard::run().await
}
