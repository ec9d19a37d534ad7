use clap::Parser;
use columnist::{AppState, app, init_logging};
use llm::AnthropicClient;
use std::{env, net::SocketAddr, sync::Arc};
use tts::{DEFAULT_VOICE_ID, ElevenLabsTts};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Address to bind the HTTP server
    #[arg(long, default_value = "127.0.0.1:5000")]
    addr: String,
    /// Model used to write columns
    #[arg(long, env = "ANTHROPIC_MODEL", default_value = "claude-sonnet-4-5")]
    model: String,
    /// Token budget per answer
    #[arg(long, env = "MAX_TOKENS", default_value_t = 1024)]
    max_tokens: u32,
    /// Voice used to read columns aloud
    #[arg(long, env = "ELEVENLABS_VOICE_ID", default_value = DEFAULT_VOICE_ID)]
    voice_id: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    // Credentials are resolved once here and injected; a missing key
    // surfaces at call time, not at startup.
    let llm = Arc::new(AnthropicClient::new(env::var("ANTHROPIC_API_KEY").ok()));
    let tts = Arc::new(ElevenLabsTts::new(env::var("ELEVENLABS_API_KEY").ok()));

    let state = AppState {
        llm,
        tts,
        model: cli.model,
        max_tokens: cli.max_tokens,
        voice_id: cli.voice_id,
    };
    let app = app(state);

    let addr: SocketAddr = cli.addr.parse()?;
    println!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
