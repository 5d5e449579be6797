use anyhow::Context;
use log::info;
use tokio::{net::TcpListener, signal};

use tabular_serve::{Dispatcher, ServeConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServeConfig::from_env()?;
    let schema = config.schema.load()?;
    let model = predictor::load(&config.model_path)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;

    info!(
        "serving {} with schema '{}' ({} columns)",
        model.kind(),
        schema.name(),
        schema.width()
    );
    let dispatcher = Dispatcher::new(schema, model)?;

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening at {addr}");

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async {
            if signal::ctrl_c().await.is_ok() {
                info!("received ctrl-c, shutting down");
            }
        })
        .await?;

    info!("wrapping up");
    Ok(())
}
