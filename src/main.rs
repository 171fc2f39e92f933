use futures::{StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::BroadcastStream;

use order_dispatch::cli::{self, Command};
use order_dispatch::{ControllerConfig, OrderController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ControllerConfig::from_env()?;

    eprintln!("Order controller v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Processing time: {:?}", config.processing_time);
    eprintln!("   Dispatch mode: {}", config.dispatch_mode);
    eprintln!("   Type 'help' for commands.\n");

    let controller = OrderController::new(config);
    let mut events = BroadcastStream::new(controller.subscribe());

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });
    let mut input = Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }));

    eprint!("> ");
    loop {
        tokio::select! {
            line = input.next() => {
                let Some(line) = line else { break };
                let line = line.trim();
                if line.is_empty() {
                    eprint!("> ");
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => match cli::execute(&controller, command).await? {
                        Some(output) => println!("{output}"),
                        None => break,
                    },
                    Err(e) => eprintln!("{e} (try 'help')"),
                }
                eprint!("> ");
            }
            Some(event) = events.next() => match event {
                Ok(event) => eprintln!("  * {event}"),
                Err(e) => tracing::warn!("Event stream: {}", e),
            },
        }
    }

    controller.shutdown().await;
    Ok(())
}
