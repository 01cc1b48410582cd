#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment; absence is fine.
    let _ = dotenvy::dotenv();

    if let Err(e) = blueprint_server::run().await {
        eprintln!("blueprint-server failed to start: {e}");
        std::process::exit(1);
    }
}
