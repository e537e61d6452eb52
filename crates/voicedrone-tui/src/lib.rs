pub mod app;
pub mod log_layer;
pub mod sink;
pub mod ui;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use voicedrone_command::PresentationEffect;
use voicedrone_core::{HandPosition, SharedCell, SpeechInput, SurfaceSize};

pub use app::App;
pub use log_layer::TuiLogLayer;
pub use sink::ChannelSink;

/// Handles the UI shares with the rest of the application.
pub struct TuiContext {
    pub effects: mpsc::UnboundedReceiver<PresentationEffect>,
    pub speech_input: Option<mpsc::UnboundedSender<SpeechInput>>,
    pub hand: SharedCell<HandPosition>,
    pub surface: SharedCell<SurfaceSize>,
    pub log_buffer: Arc<Mutex<VecDeque<String>>>,
}

/// Run the TUI event loop until the user quits or a terminate effect arrives.
pub async fn run(ctx: TuiContext) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let result = run_loop(&mut terminal, ctx).await;
    ratatui::restore();
    result
}

async fn run_loop(terminal: &mut DefaultTerminal, mut ctx: TuiContext) -> std::io::Result<()> {
    let mut app = App::new(Arc::clone(&ctx.log_buffer));

    loop {
        while let Ok(effect) = ctx.effects.try_recv() {
            app.apply(effect);
        }
        if app.should_quit {
            break;
        }

        let size = terminal.size()?;
        let surface = ui::surface_size(ratatui::layout::Rect::new(0, 0, size.width, size.height));
        if surface != app.surface {
            ctx.surface.set(surface);
            app.surface = surface;
        }
        app.hand = ctx.hand.get();

        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Short poll so hand movement and feedback keep rendering
        if event::poll(std::time::Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key) {
                        app::AppAction::Quit => break,
                        app::AppAction::Utterance(text) => {
                            tracing::debug!(%text, "typed utterance");
                            if let Some(tx) = ctx.speech_input.as_ref() {
                                let _ = tx.send(SpeechInput::Transcript(text));
                            }
                        }
                        app::AppAction::None => {}
                    }
                }
            }
        }
    }

    Ok(())
}
