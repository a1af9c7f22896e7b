use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use deal_pulse::argument_parsing::Args;
use deal_pulse::{PipelineService, StartupError, SystemClock, VistaClient, routes};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deal_pulse=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "shutting down");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), StartupError> {
    let config = args.remote_config()?;
    let client = VistaClient::new(&config)?;
    let service = Arc::new(PipelineService::new(
        client,
        SystemClock,
        args.query_settings(),
    ));

    let app = routes::router(service);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    info!(
        addr = %listener.local_addr()?,
        remote = config.base_url(),
        "listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
