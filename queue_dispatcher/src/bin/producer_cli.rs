use clap::Parser;
use queue_dispatcher::config::{ProducerCommand, ProducerOptions};
use queue_dispatcher::models::QueueEntry;
use queue_dispatcher::rpc::QueueClient;
use tarpc::context;
use tokio_serde::formats::Json;

/// One-shot client with two modes: enqueue a message, or print a snapshot
/// of the queue.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = ProducerOptions::parse();

    let transport = tarpc::serde_transport::tcp::connect(&opts.server, Json::default).await?;
    let tarpc::client::NewClient { client, dispatch } =
        QueueClient::new(tarpc::client::Config::default(), transport);
    tokio::spawn(dispatch);

    match opts.command {
        ProducerCommand::Insert { message, semantic, timeout_secs } => {
            let entry = QueueEntry::new(message, semantic.into(), timeout_secs);
            let stored = client.queue_insert(context::current(), entry).await?;
            println!("enqueued as seq {}", stored.seq);
        }
        ProducerCommand::Queue => {
            let snapshot = client.get_queue(context::current()).await?;
            for entry in snapshot {
                println!(
                    "seq={} message={} visible={} semantic={:?} timeout={}s",
                    entry.seq, entry.message, entry.visible, entry.semantic, entry.timeout_secs
                );
            }
        }
    }

    Ok(())
}
