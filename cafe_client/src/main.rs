#[tokio::main]
async fn main() -> std::io::Result<()> {
    cafe_client::run_with_config().await
}
