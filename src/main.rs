use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dephy_interact::config::Cli;
use dephy_interact::model::{ConnectionLog, ConnectionParams, LogEntry};
use dephy_interact::rings::{self, ControlChannel, RingsRpcClient};
use dephy_interact::session::{
    spawn_session, spawn_weight_command, AppEvent, AppSender, SessionOptions, WEIGHT_SENT_MESSAGE,
};
use dephy_interact::settings::Settings;
use dephy_interact::tui::{init_tui_logger, Action, App, Event, EventHandler, LogEvent};
use log::{debug, error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load settings, using defaults: {}", e);
        Settings::default()
    });
    let settings = cli.merge(settings);

    let channel: Arc<dyn ControlChannel> = Arc::new(RingsRpcClient::new(settings.rings_endpoint.clone())?);
    let options = SessionOptions {
        verify_hash: settings.verify_hash,
        ..SessionOptions::default()
    };

    if cli.headless {
        run_headless(&cli, &settings, channel, options).await
    } else {
        run_tui(&cli, &settings, channel, options).await
    }
}

fn save_settings_if_requested(cli: &Cli, settings: &Settings) {
    if cli.save_settings {
        if let Err(e) = settings.save() {
            warn!("Failed to save settings: {}", e);
        }
    }
}

async fn run_headless(
    cli: &Cli,
    settings: &Settings,
    channel: Arc<dyn ControlChannel>,
    options: SessionOptions,
) -> Result<()> {
    init_tui_logger(&settings.log_dir, true)?;
    info!("=== DePHY Interact starting (headless) ===");
    save_settings_if_requested(cli, settings);

    let device = cli.device.as_deref().unwrap_or_default();
    let params = ConnectionParams::from_input(device, "", "", &settings.connection_defaults())?;
    info!("Watching {} via {}", params.did(), params.relay_address);

    match rings::node_info(channel.as_ref()).await {
        Ok(node) => debug!("Rings node info: {}", node),
        Err(e) => warn!("Rings node at {} did not answer nodeInfo: {}", settings.rings_endpoint, e),
    }

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    spawn_session(&params, channel.clone(), &options, sender.clone(), cancel.clone());

    let mut log = ConnectionLog::new(settings.log_capacity);
    let mut pending_weight = cli.weight.clone();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = receiver.recv() => {
                let Some(event) = event else { break };
                let appended = match event {
                    AppEvent::Info(message) => {
                        log.message(message);
                        true
                    }
                    AppEvent::Feed(decoded) => {
                        log.prepend(LogEntry::Event(decoded));
                        true
                    }
                    AppEvent::ControlReady => {
                        if let Some(weight) = pending_weight.take() {
                            spawn_weight_command(Some(channel.clone()), params.device.clone(), weight, sender.clone());
                        }
                        false
                    }
                    AppEvent::CommandSent(_) => {
                        log.message(WEIGHT_SENT_MESSAGE);
                        true
                    }
                    AppEvent::CommandFailed(e) => {
                        eprintln!("Failed to send P2P message: {}", e);
                        false
                    }
                    AppEvent::Failed(e) => {
                        eprintln!("Session error: {}", e);
                        false
                    }
                    AppEvent::Log(..) => false,
                };
                if appended {
                    if let Some(entry) = log.latest() {
                        println!("{}", entry.render());
                    }
                }
            }
        }
    }

    info!("Shutting down...");
    cancel.cancel();
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    Ok(())
}

async fn run_tui(
    cli: &Cli,
    settings: &Settings,
    channel: Arc<dyn ControlChannel>,
    options: SessionOptions,
) -> Result<()> {
    // Setup terminal FIRST before any initialization
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let (app_sender, mut app_receiver) = mpsc::unbounded_channel();
    let cancel_token = CancellationToken::new();

    let tui_logger = init_tui_logger(&settings.log_dir, false)?;
    info!("=== DePHY Interact starting ===");
    info!(
        "Log files: {}/info.log and {}/error.log",
        tui_logger.log_dir().display(),
        tui_logger.log_dir().display()
    );
    save_settings_if_requested(cli, settings);

    let (log_sender, mut log_receiver) = mpsc::unbounded_channel();
    let app_sender_for_logs = app_sender.clone();
    let cancel_token_logs = cancel_token.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel_token_logs.cancelled() => break,
                log_event = log_receiver.recv() => {
                    match log_event {
                        Some(LogEvent::Log(msg, level)) => {
                            let _ = app_sender_for_logs.send(AppEvent::Log(msg, level));
                        }
                        None => break,
                    }
                }
            }
        }
    });
    tui_logger.set_sender(log_sender);

    let mut event_handler = EventHandler::new(cli.tick_rate(), cancel_token.clone());
    let mut app = App::new(settings.connection_defaults(), settings.log_capacity, cli.device.clone());

    let result = run_app(
        &mut terminal,
        &mut app,
        &mut event_handler,
        &mut app_receiver,
        app_sender,
        channel,
        options,
        cancel_token.clone(),
    )
    .await;

    info!("Shutting down application...");
    cancel_token.cancel();
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = terminal.show_cursor();

    if let Err(e) = &result {
        error!("Application error: {}", e);
    }
    result
}

#[allow(clippy::too_many_arguments)]
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_handler: &mut EventHandler,
    app_receiver: &mut mpsc::UnboundedReceiver<AppEvent>,
    app_sender: AppSender,
    channel: Arc<dyn ControlChannel>,
    options: SessionOptions,
    cancel_token: CancellationToken,
) -> Result<()> {
    loop {
        terminal.draw(|f| dephy_interact::tui::ui::render(app, f))?;

        tokio::select! {
            Some(event) = event_handler.next() => {
                match event {
                    Event::Key(key) => match app.handle_key(key) {
                        Some(Action::Connect(params)) => {
                            info!("Connecting to {} via {}", params.did(), params.relay_address);
                            spawn_session(&params, channel.clone(), &options, app_sender.clone(), cancel_token.clone());
                        }
                        Some(Action::SendWeight(input)) => {
                            if let Some(params) = &app.params {
                                let ready = app.control_ready.then(|| channel.clone());
                                spawn_weight_command(ready, params.device.clone(), input, app_sender.clone());
                            }
                        }
                        Some(Action::Quit) | None => {}
                    },
                    Event::Tick => app.on_tick(Instant::now()),
                    Event::Resize => {}
                }
            }
            Some(event) = app_receiver.recv() => {
                app.handle_app_event(event);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
