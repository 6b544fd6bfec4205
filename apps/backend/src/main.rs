#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wordeasy_backend::run().await
}
