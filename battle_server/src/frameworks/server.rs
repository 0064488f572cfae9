// Framework bootstrap for the battle server runtime.

use crate::domain::{BattleMap, ClassicRules, RandomDice};
use crate::frameworks::config::{self, ServerSettings};
use crate::interface_adapters::net::{Hub, NetworkHost, WsHubHost};
use crate::interface_adapters::{CommandRegistry, CommandTransportAdapter, TransportPublisher};
use crate::use_cases::{Command, CommandPublisher, ServerGame, game_task};

use std::{io::Result, net::SocketAddr, sync::Arc};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// A started server: hub host plus the game task it feeds.
pub struct BattleServer {
    host: WsHubHost,
    game_shutdown: Arc<Notify>,
    game: JoinHandle<ServerGame>,
}

impl BattleServer {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.host.local_addr()
    }

    pub async fn shutdown(mut self) {
        self.host.stop().await;
        self.game_shutdown.notify_one();
        match self.game.await {
            Ok(game) => info!(turn = game.turn(), phase = ?game.phase(), "game finished"),
            Err(e) => error!(error = %e, "game task failed"),
        }
    }
}

pub async fn start(settings: ServerSettings) -> Result<BattleServer> {
    let mut host = WsHubHost::new(settings.bind, Hub::new(config::HUB_BROADCAST_CAPACITY));
    host.start(settings.port).await?;
    let transport = host
        .publisher()
        .ok_or_else(|| std::io::Error::other("hub host started without a publisher"))?;

    let adapter = Arc::new(CommandTransportAdapter::new(Arc::new(CommandRegistry::standard())));
    adapter.add_transport(transport);
    let publisher = Arc::new(TransportPublisher::new(adapter));

    // Inbound commands go to the single game task.
    let (command_tx, command_rx) = mpsc::channel::<Command>(config::COMMAND_CHANNEL_CAPACITY);
    publisher.subscribe(Arc::new(move |command: &Command| {
        match command_tx.try_send(command.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(command)) => {
                warn!(command = command.type_tag(), "command channel full; dropping command");
            }
            Err(mpsc::error::TrySendError::Closed(command)) => {
                debug!(command = command.type_tag(), "game task gone; dropping command");
            }
        }
    }));

    let mut game = ServerGame::new(
        publisher,
        Box::new(RandomDice::new(settings.dice_seed)),
        Arc::new(ClassicRules),
        settings.options,
    );
    game.set_battle_map(BattleMap::clear(settings.map_width, settings.map_height));
    info!(
        game_id = %game.id(),
        physical_attacks = settings.options.physical_attacks,
        seeded = settings.dice_seed.is_some(),
        "game created"
    );

    let game_shutdown = Arc::new(Notify::new());
    let game = tokio::spawn(game_task(game, command_rx, game_shutdown.clone()));

    Ok(BattleServer {
        host,
        game_shutdown,
        game,
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let server = start(ServerSettings::from_env()).await?;
    if let Some(address) = server.local_addr() {
        info!(%address, "battle server ready");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
    server.shutdown().await;
    Ok(())
}
