use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use b6_rider_bot::application::messaging::MessageRouter;
use b6_rider_bot::application::services::{
    AutoResponder, BroadcastScheduler, FlightInquiryService, QuestionService, StartupAnnouncer,
};
use b6_rider_bot::domain::entities::{InboundMessage, KNOWLEDGE};
use b6_rider_bot::domain::traits::Transport;
use b6_rider_bot::infrastructure::adapters::{ConsoleAdapter, WhatsAppAdapter};
use b6_rider_bot::infrastructure::config::Config;
use b6_rider_bot::infrastructure::storage::MemorySessionStore;
use b6_rider_bot::infrastructure::web::{StatusBoard, StatusServer};

#[derive(Parser)]
#[command(name = "b6-rider-bot")]
#[command(about = "WhatsApp assistant for the B6 Pass Riders group", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Read messages from stdin instead of the WhatsApp gateway
        #[arg(long)]
        console: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { console } => {
            if let Err(e) = run_bot(&cli.config, console) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("b6-rider-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn load_config(path: &str) -> Config {
    let config = if std::path::Path::new(path).exists() {
        Config::load(path)
            .map(Config::with_env)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            })
    } else {
        Config::load_env()
    };

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }
    config
}

fn run_bot(config_path: &str, console: bool) -> std::io::Result<()> {
    let config = load_config(config_path);
    tracing::info!("Starting {} for \"{}\"", config.bot.name, config.bot.group_name);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve(config, console));
    Ok(())
}

async fn serve(config: Config, console: bool) {
    let (tx, mut rx) = mpsc::channel::<InboundMessage>(256);
    let board = Arc::new(StatusBoard::new(&config.bot.name, &config.bot.group_name));

    let transport: Arc<dyn Transport> = if console || !config.whatsapp.enabled {
        Arc::new(ConsoleAdapter::new(&config.bot.group_name, tx.clone()))
    } else {
        Arc::new(WhatsAppAdapter::new(config.whatsapp.clone(), Arc::clone(&board)))
    };
    let info = transport.info();
    tracing::info!("Using {} transport ({})", info.platform, info.name);

    if config.server.enabled {
        let server = Arc::new(StatusServer::new(Arc::clone(&board), tx.clone()));
        let bind = config.server.bind.clone();
        let board = Arc::clone(&board);
        tokio::spawn(async move {
            if let Err(e) = server.run(&bind).await {
                tracing::error!("Status server stopped: {}", e);
                board.record_error(&e).await;
            }
        });
    }
    drop(tx);

    spawn_when_ready(&config, Arc::clone(&transport), Arc::clone(&board));

    let mut router = MessageRouter::new(
        Arc::clone(&transport),
        MemorySessionStore::new().with_idle_limit(config.bot.session_idle_minutes),
        FlightInquiryService::new(config.admin_chat_id()),
        QuestionService::new(&KNOWLEDGE),
        AutoResponder::new(
            config
                .auto_responses
                .iter()
                .map(|entry| (entry.keyword.clone(), entry.reply.clone())),
        ),
        config.bot.dedup_capacity,
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!("Starting message loop...");
    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else {
                    tracing::info!("No more message sources, shutting down");
                    break;
                };
                let id = message.id.clone();
                match router.handle(message).await {
                    Ok(route) => tracing::debug!("Message {} routed to {:?}", id, route),
                    Err(e) => {
                        tracing::error!("Error handling message {}: {}", id, e);
                        board.record_error(&e).await;
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }
}

/// Connect the transport, then start broadcasts and the startup announcement
fn spawn_when_ready(config: &Config, transport: Arc<dyn Transport>, board: Arc<StatusBoard>) {
    let scheduler = BroadcastScheduler::from_config(&config.bot.group_name, &config.broadcasts);
    let announcer = config.startup.enabled.then(|| StartupAnnouncer {
        bot_name: config.bot.name.clone(),
        group_name: config.bot.group_name.clone(),
        admin_chat_id: config.admin_chat_id(),
        admin_delay: Duration::from_secs(config.startup.admin_delay_secs),
        group_delay: Duration::from_secs(config.startup.group_delay_secs),
    });

    tokio::spawn(async move {
        if let Err(e) = transport.start().await {
            tracing::error!("Failed to start transport: {}", e);
            board.record_error(&e).await;
            return;
        }
        board.set_connected(true).await;

        let jobs = scheduler.spawn(Arc::clone(&transport));
        tracing::info!("{} broadcast(s) scheduled", jobs.len());
        if let Some(announcer) = announcer {
            announcer.spawn(transport);
        }
    });
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("{}", e),
    }
}
