//! promptgraph CLI binary entry point.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use promptgraph::adapter::TokenConsumer;
use promptgraph::agent::EchoTokenSource;
use promptgraph::cli::{init_tracing, load_config, ChatArgs, Cli, Commands, InfoArgs};
use promptgraph::error::GraphError;
use promptgraph::session::{AgentSupport, GraphAgentSupport, Session};

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse_args();

    let result = match cli.command {
        Commands::Chat(args) => handle_chat(args).await,
        Commands::Info(args) => handle_info(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Prints chunks as they arrive and remembers a failure.
#[derive(Default)]
struct StdoutConsumer {
    failure: Mutex<Option<GraphError>>,
}

impl TokenConsumer for StdoutConsumer {
    fn on_next(&self, token: &str) {
        print!("{token}");
        let _ = std::io::stdout().flush();
    }

    fn on_complete(&self) {
        println!(); // newline after streaming
    }

    fn on_error(&self, error: GraphError) {
        println!();
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(error);
    }
}

async fn handle_chat(args: ChatArgs) -> Result<(), GraphError> {
    let config = load_config(args.config.as_ref())?;
    let links = args.links()?;
    let prompt = args.prompt.clone().unwrap_or_default();

    let support = GraphAgentSupport::with_token_source(Arc::new(EchoTokenSource), config);
    let working_dir = std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf());
    let session = support.create_session(
        &uuid::Uuid::new_v4().to_string(),
        &working_dir,
        HashMap::new(),
    );

    let consumer = StdoutConsumer::default();
    session.stream_prompt(&prompt, &links, &consumer).await;

    match consumer.failure.into_inner().unwrap_or_else(|p| p.into_inner()) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_info(args: InfoArgs) -> Result<(), GraphError> {
    let config = load_config(args.config.as_ref())?;
    let info = GraphAgentSupport::with_token_source(Arc::new(EchoTokenSource), config).agent_info();
    println!("{} {}", info.name, info.version);
    Ok(())
}
