#[tokio::main]
async fn main() {
    mikrozaim::start_server().await;
}
