// Calendar Gateway Server
//
// OAuth broker and calendar proxy for the Microsoft Graph calendar API.

use calendar_gateway::config::Settings;
use calendar_gateway::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("Calendar Gateway Server");
    println!();

    let settings = Settings::load()?;
    println!("[OK] Configuration loaded: client_id={}", settings.client_id);
    if let Some(tenant) = &settings.tenant_id {
        println!("[OK] Tenant: {}", tenant);
    }

    server::start_server(settings).await
}
