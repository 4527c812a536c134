// BloodLens: Entry Point

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bloodlens_lib::run().await
}
