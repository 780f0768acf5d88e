use docintake::{
    api, auth::GcpAuth, config, http, intake::IntakeService, logging, tools::DocumentTools,
};
use std::future::IntoFuture;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::net::TcpListener;

const SERVER_PORT_RANGE: RangeInclusive<u16> = 4100..=4199;
const TOOLS_PORT_RANGE: RangeInclusive<u16> = 4200..=4299;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init_tracing(logging::ConsoleTarget::Stdout);
    let config = config::load_config().expect("Failed to load configuration");

    let client = http::build_client().expect("Failed to build HTTP client");
    let auth = Arc::new(
        GcpAuth::from_config(&config.gcp)
            .await
            .expect("Failed to resolve Google credentials"),
    );
    let intake = IntakeService::from_config(&config.intake, &config.gcp, client.clone(), auth)
        .expect("Failed to initialize intake service");
    let tools = DocumentTools::connect(&config.tools, &config.gcp, client)
        .await
        .expect("Failed to initialize document tools");

    let app = api::create_router(Arc::new(intake), config.intake.failure_mode);
    let tool_app = api::create_tool_router(Arc::new(tools));

    let (listener, port) = bind_listener(
        Ipv4Addr::UNSPECIFIED.into(),
        config.server_port,
        SERVER_PORT_RANGE,
    )
    .await
    .expect("Failed to bind intake listener");
    let (tool_listener, tool_port) = bind_listener(
        Ipv4Addr::LOCALHOST.into(),
        config.tools_port,
        TOOLS_PORT_RANGE,
    )
    .await
    .expect("Failed to bind tool listener");
    tracing::info!(
        failure_mode = ?config.intake.failure_mode,
        "Listening on http://0.0.0.0:{}",
        port
    );
    tracing::info!("Tools listening on http://127.0.0.1:{}", tool_port);

    tokio::try_join!(
        axum::serve(listener, app).into_future(),
        axum::serve(tool_listener, tool_app).into_future(),
    )
    .expect("Server terminated unexpectedly");
}

async fn bind_listener(
    address: IpAddr,
    configured: Option<u16>,
    range: RangeInclusive<u16>,
) -> Result<(TcpListener, u16), std::io::Error> {
    if let Some(port) = configured {
        return TcpListener::bind((address, port))
            .await
            .map(|listener| (listener, port));
    }

    let (first, last) = (*range.start(), *range.end());
    for port in range {
        match TcpListener::bind((address, port)).await {
            Ok(listener) => {
                tracing::debug!(%address, port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        format!("No available port found in range {first}-{last}"),
    ))
}
