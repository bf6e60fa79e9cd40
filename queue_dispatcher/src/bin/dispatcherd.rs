use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use futures::{future, StreamExt};
use queue_dispatcher::config::DispatcherOptions;
use queue_dispatcher::dispatcher::QueueDispatcher;
use queue_dispatcher::pool::ConsumerPool;
use queue_dispatcher::queue::ReadyQueue;
use queue_dispatcher::rpc::{ConsumerClient, ConsumerHandle, ConsumerRpc, Queue};
use queue_dispatcher::server::QueueServer;
use tarpc::server::{self, Channel};
use tokio_serde::formats::Json;
use tokio_util::sync::CancellationToken;
use tracing::info;

async fn connect_consumer(addr: &str) -> anyhow::Result<Arc<dyn ConsumerRpc>> {
    let transport = tarpc::serde_transport::tcp::connect(addr, Json::default).await?;
    let tarpc::client::NewClient { client, dispatch } =
        ConsumerClient::new(tarpc::client::Config::default(), transport);
    tokio::spawn(dispatch);
    Ok(Arc::new(ConsumerHandle::new(client)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let opts = DispatcherOptions::parse();
    let queue = Arc::new(ReadyQueue::new());

    let mut consumers = Vec::with_capacity(opts.consumers.len());
    for addr in &opts.consumers {
        consumers.push(connect_consumer(addr).await?);
    }
    let pool = Arc::new(ConsumerPool::new(consumers));

    let listener = tarpc::serde_transport::tcp::listen(&opts.listen, Json::default).await?;
    info!("dispatcherd listening for producers on {}", opts.listen);
    let server_queue = queue.clone();
    tokio::spawn(async move {
        listener
            .filter_map(|r| future::ready(r.ok()))
            .map(server::BaseChannel::with_defaults)
            .map(|channel| {
                let server = QueueServer::new(server_queue.clone());
                channel.execute(server.serve()).for_each(|fut| async move {
                    tokio::spawn(fut);
                })
            })
            .buffer_unordered(10)
            .for_each(|_| async {})
            .await;
    });

    let cancellation = CancellationToken::new();
    let dispatcher = QueueDispatcher::new(queue, pool);
    let handle = dispatcher.spawn(Duration::from_millis(opts.idle_poll_millis), cancellation.clone());

    tokio::signal::ctrl_c().await?;
    cancellation.cancel();
    let _ = handle.await;

    Ok(())
}
