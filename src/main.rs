#[tokio::main]
async fn main() {
    if let Err(e) = catenis_message_inspector::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
