use sensorbuf::app::startup;

#[tokio::main]
async fn main() {
    std::process::exit(startup::startup().await);
}
