use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use voicemaps::api::ApiServerBuilder;
use voicemaps::voice::{
    CommandSynthesizer, ConsoleRecognizer, RecognitionOptions, SpeechCapture, SpeechSynthesizer,
    VoiceFeedback,
};
use voicemaps::{
    AgentOutcome, AgentReply, Capability, Config, ConversationLog, MapsAgent, MockPlaceLookup,
    SessionOutcome, VoiceSession,
};

/// `VoiceMaps` - Voice-controlled map search assistant
#[derive(Parser)]
#[command(name = "voicemaps", version, about)]
struct Cli {
    /// Port to listen on (overrides `VOICEMAPS_PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Location searched when a command names none
    #[arg(short, long)]
    location: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Read commands from the console and speak the replies
    Listen,
    /// Answer a single command
    Ask {
        /// Command text, e.g. "find me a coffee shop"
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,
    },
    /// Search places directly
    Places {
        /// Search query
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voicemaps=info",
        1 => "info,voicemaps=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(port) = cli.port {
        config.api_server.port = port;
    }
    if let Some(location) = cli.location {
        config.lookup.default_location = location;
    }
    tracing::debug!(?config, "loaded configuration");

    let agent = Arc::new(MapsAgent::new(
        Arc::new(MockPlaceLookup::new(config.lookup.delay)),
        Arc::new(ConversationLog::new()),
        config.lookup.default_location.clone(),
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, agent).await,
        Command::Listen => listen(&config, agent).await,
        Command::Ask { phrase } => ask(&agent, &phrase.join(" ")).await,
        Command::Places { query } => places(&agent, &query.join(" ")).await,
    }
}

async fn serve(config: Config, agent: Arc<MapsAgent>) -> anyhow::Result<()> {
    config.validate()?;

    let server = ApiServerBuilder::new(agent)
        .port(config.api_server.port)
        .static_dir(config.api_server.static_dir)
        .voice(config.voice)
        .build();

    tracing::info!("voicemaps ready");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

/// Console loop: each line read is one recognition session
async fn listen(config: &Config, agent: Arc<MapsAgent>) -> anyhow::Result<()> {
    let recognizer = Arc::new(ConsoleRecognizer::new());
    let options = RecognitionOptions {
        lang: config.voice.lang.clone(),
        ..RecognitionOptions::default()
    };
    let capture = Capability::Supported(SpeechCapture::new(recognizer.clone(), options));

    let synthesizer = if config.voice.enabled {
        CommandSynthesizer::detect().map(|s| Arc::new(s) as Arc<dyn SpeechSynthesizer>)
    } else {
        Capability::unsupported("voice output disabled")
    };
    let feedback = VoiceFeedback::new(synthesizer, config.voice.params, &config.voice.lang);

    let session_id = uuid::Uuid::new_v4().to_string();
    let session = VoiceSession::new(session_id, agent, capture, feedback);

    println!("Say a command (type it and press enter). Ctrl-D to quit.");

    while !recognizer.is_closed() {
        let outcome = tokio::select! {
            outcome = session.listen() => outcome,
            _ = tokio::signal::ctrl_c() => {
                session.stop();
                break;
            }
        };

        match outcome {
            SessionOutcome::Reply(reply) => print_reply(&reply),
            SessionOutcome::Status(message) if !recognizer.is_closed() => println!("{message}"),
            SessionOutcome::Status(_) | SessionOutcome::Cancelled | SessionOutcome::Superseded => {}
        }
    }

    tracing::info!(
        session_id = session.session_id(),
        messages = session.history().len(),
        "session ended"
    );
    Ok(())
}

async fn ask(agent: &MapsAgent, phrase: &str) -> anyhow::Result<()> {
    let outcome = agent
        .handle("cli", phrase, None, &CancellationToken::new())
        .await?;

    if let AgentOutcome::Reply(reply) = outcome {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    }
    Ok(())
}

async fn places(agent: &MapsAgent, query: &str) -> anyhow::Result<()> {
    let places = agent.lookup(query, agent.default_location()).await?;
    println!("{}", serde_json::to_string_pretty(&places)?);
    Ok(())
}

fn print_reply(reply: &AgentReply) {
    println!("{}", reply.response);
    for place in &reply.places {
        println!(
            "  {} ({:.1}) - {}, {}, {}",
            place.name, place.rating, place.address, place.hours, place.distance
        );
    }
}
