use clap::Parser;

/// CLI surface for `dispatcherd`: a listen address plus the ordered list of
/// consumer addresses to dial into the pool.
#[derive(Debug, Parser)]
#[command(name = "dispatcherd", about = "queue dispatcher: producer-facing RPC server")]
pub struct DispatcherOptions {
    /// Address the producer-facing Queue service listens on.
    #[arg(long, default_value = "127.0.0.1:6000")]
    pub listen: String,

    /// Addresses of consumer processes to dial, in pool order.
    #[arg(long = "consumer", required = true)]
    pub consumers: Vec<String>,

    /// How long the dispatch loop sleeps when the queue is empty or the pool is unusable.
    #[arg(long, default_value_t = 200)]
    pub idle_poll_millis: u64,
}

/// CLI surface for `consumerd`.
#[derive(Debug, Parser)]
#[command(name = "consumerd", about = "queue dispatcher: consumer-facing RPC server")]
pub struct ConsumerOptions {
    #[arg(long, default_value = "127.0.0.1:7000")]
    pub listen: String,

    /// Synthetic fault probability in `[0.0, 1.0]`: under at-least-once
    /// semantics a fraction of calls return an error, under timeout-based
    /// semantics the same fraction delay instead. Disabled (0.0) outside of
    /// test harnesses.
    #[arg(long, default_value_t = 0.0)]
    pub fault_rate: f64,

    /// Delay injected for the timeout-based fault path.
    #[arg(long, default_value_t = 2)]
    pub fault_delay_secs: u64,
}

/// CLI surface for `producer_cli`'s two modes: enqueue a message, or print a
/// snapshot of the queue.
#[derive(Debug, Parser)]
#[command(name = "producer_cli", about = "one-shot client for the queue dispatcher")]
pub struct ProducerOptions {
    #[arg(long, default_value = "127.0.0.1:6000")]
    pub server: String,

    #[command(subcommand)]
    pub command: ProducerCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum ProducerCommand {
    /// Enqueue a message.
    Insert {
        message: String,
        #[arg(value_enum)]
        semantic: SemanticArg,
        timeout_secs: u64,
    },
    /// Print a snapshot of the queue.
    Queue,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SemanticArg {
    AtLeastOnce,
    TimeoutBased,
}

impl From<SemanticArg> for crate::models::Semantic {
    fn from(value: SemanticArg) -> Self {
        match value {
            SemanticArg::AtLeastOnce => crate::models::Semantic::AtLeastOnce,
            SemanticArg::TimeoutBased => crate::models::Semantic::TimeoutBased,
        }
    }
}
