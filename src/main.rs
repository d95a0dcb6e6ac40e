#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = examonline_rust::run().await {
        eprintln!("examonline-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
