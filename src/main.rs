use std::sync::Arc;

use tracing_subscriber::{EnvFilter, FmtSubscriber};
use voxgate::pipeline::VoicePipeline;
use voxgate::{Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Arc::new(Config::from_env());
    tracing::info!(
        model = %config.generate_model,
        bridge = %config.bridge_url,
        "voxgate starting"
    );

    let pipeline = Arc::new(VoicePipeline::new(Arc::clone(&config)));
    let server = Server::new(config, pipeline);
    server.run().await?;

    tracing::info!("exiting");
    Ok(())
}
