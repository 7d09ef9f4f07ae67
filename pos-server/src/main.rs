use pos_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. dotenv, configuration, logging
    let config = setup_environment()?;
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "POS server starting..."
    );

    // 2. database and managers
    let state = ServerState::initialize(&config)?;

    // 3. HTTP
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
