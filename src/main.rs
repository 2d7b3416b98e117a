#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Delegate to the runtime entry point.
    grab_core::run_with_config().await
}
