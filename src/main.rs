use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crossterm::{
    event::{self, poll, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use agentive::app::{handle_key_event, Action, AppState, Config, GlobalConfig};
use agentive::transport::{HttpTransport, TurnTransport};
use agentive::ui::AppWidget;

fn init_tracing(global: &GlobalConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(global.log_level.directive().parse()?);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("/tmp/agentive-debug.log")
        .ok();

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let first_launch = !Config::config_path()?.exists();
    let mut config = Config::load()?;
    config.apply_overrides(Config::endpoint_from_env(), std::env::args().nth(1));

    init_tracing(&config.global)?;
    tracing::info!("=== Agentive starting ===");
    tracing::info!(
        "Endpoint: {} ({} history)",
        config.server.endpoint,
        config.server.history_mode.display_name()
    );

    if first_launch {
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {:#}", e);
        }
    }

    let http = HttpTransport::new(
        config.server.endpoint.clone(),
        Duration::from_secs(config.server.timeout_secs),
    )?;
    let endpoint = http.endpoint().to_string();
    let transport: Arc<dyn TurnTransport> = Arc::new(http);

    let tick_interval = Duration::from_millis(config.ui.tick_rate_ms.max(16));
    let conflicts = config.keybinds.find_conflicts();

    let mut state = AppState::new(config);
    for (a, b) in conflicts {
        state.log_warn(format!("Keybind conflict: {} and {}", a, b));
    }
    if first_launch {
        state.show_info("Wrote default config to ~/.agentive/config.toml");
    }
    state.log_info(format!("Talking to {}", endpoint));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let result = run(
        &mut terminal,
        &mut state,
        &transport,
        &action_tx,
        &mut action_rx,
        tick_interval,
    )
    .await;

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    tracing::info!("=== Agentive exiting ===");
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    transport: &Arc<dyn TurnTransport>,
    action_tx: &mpsc::UnboundedSender<Action>,
    action_rx: &mut mpsc::UnboundedReceiver<Action>,
    tick_interval: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| AppWidget::new(&*state).render(f))?;

        let poll_timeout = tick_interval.saturating_sub(last_tick.elapsed());
        if poll(poll_timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = handle_key_event(key, state) {
                        action_tx.send(action)?;
                    }
                }
                Event::Paste(text) => action_tx.send(Action::Paste(text))?,
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_interval {
            action_tx.send(Action::Tick)?;
            last_tick = Instant::now();
        }

        while let Ok(action) = action_rx.try_recv() {
            if let Err(e) = process_action(action, state, transport, action_tx) {
                state.log_error(format!("Action error: {}", e));
            }
        }

        if !state.running {
            return Ok(());
        }
    }
}

fn process_action(
    action: Action,
    state: &mut AppState,
    transport: &Arc<dyn TurnTransport>,
    action_tx: &mpsc::UnboundedSender<Action>,
) -> Result<()> {
    match action {
        Action::Quit => {
            state.running = false;
        }
        Action::InputChar(c) => state.input_char(c),
        Action::InputBackspace => state.input_backspace(),
        Action::InputClear => state.input_buffer.clear(),
        Action::Paste(text) => state.paste(&text),
        Action::SubmitInput => {
            let text = state.input_buffer.clone();
            action_tx.send(Action::Submit { text })?;
        }
        Action::ActivateFocused => {
            if let Some(choice) = state.focused() {
                action_tx.send(Action::Submit { text: choice.reply })?;
            }
        }
        Action::Submit { text } => {
            if let Some(pending) = state.start_turn(&text) {
                let transport = Arc::clone(transport);
                let tx = action_tx.clone();
                tokio::spawn(async move {
                    let result = transport.exchange(&pending.request).await;
                    let _ = tx.send(Action::ReplyReceived {
                        turn_id: pending.turn_id,
                        result,
                    });
                });
            }
        }
        Action::ReplyReceived { turn_id, result } => {
            state.finish_turn(turn_id, result);
        }
        Action::FocusNext => state.focus_next(),
        Action::FocusPrev => state.focus_prev(),
        Action::ClearFocus => state.clear_focus(),
        Action::ScrollUp => state.scroll_up(),
        Action::ScrollDown => state.scroll_down(),
        Action::ToggleLogs => state.show_logs = !state.show_logs,
        Action::ToggleHelp => state.show_help = !state.show_help,
        Action::Tick => {
            state.advance_animation();
            state.expire_toast();
        }
    }
    Ok(())
}
