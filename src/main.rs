#[tokio::main]
async fn main() -> anyhow::Result<()> {
    aiminder::bootstrapper::run().await
}
