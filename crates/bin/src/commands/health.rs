//! Health check command - checks a running Nelson server.

use std::time::Duration;

use nelson::client::ChatClient;

use crate::cli::HealthArgs;

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ChatClient::with_timeout(&args.url, Duration::from_secs(args.timeout))?;

    match client.health().await {
        Ok(health) if health.status == "healthy" => {
            println!(
                "healthy: version {} answering from {}",
                health.version, health.source
            );
            Ok(())
        }
        Ok(health) => {
            eprintln!("unhealthy: server returned status {}", health.status);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("unhealthy: {} ({e})", client.base_url());
            std::process::exit(1);
        }
    }
}
