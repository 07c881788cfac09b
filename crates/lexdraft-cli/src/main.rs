use lexdraft_cli::{app::App, config::Config, logging::init_logging};
use lexdraft_llm::ClientFactory;
use lexdraft_session::{Conversation, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config.logging);

    tracing::info!("Starting lexdraft");

    let client = ClientFactory::create_client(config.openai_config())?;

    let conversation = Conversation::builder()
        .client(client)
        .assistant_id(config.assistant_id.clone())
        .run_instructions(config.assistant.instructions.clone())
        .poll_policy(config.poll.to_policy())
        .title_model(config.title.model.clone())
        .title_max_tokens(config.title.max_tokens)
        .build()?;

    let store = SessionStore::new();
    let (session_id, session) = store.create().await;
    tracing::info!(%session_id, "Session ready");

    let app = App::new(conversation, session);
    let mut stdout = std::io::stdout();
    app.run(tokio::io::stdin(), &mut stdout).await?;

    store.remove(&session_id).await;
    Ok(())
}
