use clap::Parser;
use futures::{future, StreamExt};
use queue_dispatcher::config::ConsumerOptions;
use queue_dispatcher::models::{QueueEntry, Semantic};
use queue_dispatcher::rpc::Consumer;
use rand::Rng;
use tarpc::context;
use tarpc::server::{self, Channel};
use tokio_serde::formats::Json;
use tracing::info;

/// Implements the consumer-facing `procedure` handler. `fault_rate` drives a
/// synthetic fault injection: under at-least-once semantics a fraction of
/// calls return an error (retry signal); under timeout-based semantics the
/// same fraction instead sleep past the caller's timeout. Both are exactly
/// what exercises the dispatcher's two retry paths end to end.
#[derive(Clone)]
struct ConsumerServer {
    fault_rate: f64,
    fault_delay: std::time::Duration,
}

impl Consumer for ConsumerServer {
    async fn procedure(self, _: context::Context, entry: QueueEntry) -> Result<QueueEntry, String> {
        let roll: f64 = rand::thread_rng().gen_range(0.0..1.0);
        if roll < self.fault_rate {
            match entry.semantic {
                Semantic::AtLeastOnce => {
                    info!("injecting fault: returning error for seq {}", entry.seq);
                    return Err("injected fault".to_string());
                }
                Semantic::TimeoutBased => {
                    info!("injecting fault: delaying reply for seq {}", entry.seq);
                    tokio::time::sleep(self.fault_delay).await;
                }
            }
        }

        info!("received value from the queue: {}", entry.message);
        Ok(entry)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let opts = ConsumerOptions::parse();
    let server = ConsumerServer {
        fault_rate: opts.fault_rate,
        fault_delay: std::time::Duration::from_secs(opts.fault_delay_secs),
    };

    let listener = tarpc::serde_transport::tcp::listen(&opts.listen, Json::default).await?;
    info!("consumerd listening on {}", opts.listen);

    listener
        .filter_map(|r| future::ready(r.ok()))
        .map(server::BaseChannel::with_defaults)
        .map(|channel| {
            let server = server.clone();
            channel.execute(server.serve()).for_each(|fut| async move {
                tokio::spawn(fut);
            })
        })
        .buffer_unordered(10)
        .for_each(|_| async {})
        .await;

    Ok(())
}
