//! Entry point: read the environment configuration once and run the App.

use twintop::app::App;
use twintop::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    App::new(&config).run().await
}
