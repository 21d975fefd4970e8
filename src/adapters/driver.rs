//! Tokio drivers for the market session and the arcade loop.
//!
//! Both reducers are pure; this module owns the clocks. A session runs in a
//! single task so that ticks, user commands and the news resume timer are
//! handled one at a time and a slow render can never overlap the next tick.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::arcade::{self, ArcadeConfig, GameState, Input};
use crate::domain::error::SimError;
use crate::domain::market::{self, Effect, MarketAction, MarketState, Notice, Transition};
use crate::ports::data_port::SeriesSource;
use crate::ports::display_port::Display;

/// Repeating clock that exists only while started. Stopping drops the
/// interval, so no tick can fire after `stop` returns.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// No-op while already running, so the cadence is not disturbed.
    pub fn start(&mut self) {
        if self.interval.is_none() {
            let mut interval = time::interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(interval);
        }
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn reset(&mut self) {
        self.stop();
        self.start();
    }

    pub fn set_running(&mut self, running: bool) {
        if running {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Resolves on the next tick; never resolves while stopped.
    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(interval) => interval.tick().await,
            None => std::future::pending().await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Action(MarketAction),
    /// Load another instrument and start over.
    SwitchSymbol(String),
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Return once playback reaches the last bar instead of waiting for
    /// more commands.
    pub quit_on_finish: bool,
}

/// Drive a market session until the user quits, the command channel closes,
/// or (with `quit_on_finish`) playback ends. Returns the final state.
pub async fn run_market(
    initial: Transition,
    source: &dyn SeriesSource,
    mut commands: mpsc::Receiver<SessionCommand>,
    display: &mut dyn Display,
    options: SessionOptions,
) -> Result<MarketState, SimError> {
    let mut ticker = Ticker::new(initial.state.config().tick_interval);
    let mut resume: Option<(NaiveDate, Instant)> = None;
    let mut commands_open = true;

    let mut state = apply(initial, display, &mut resume)?;
    ticker.set_running(state.is_running());

    loop {
        let transition = tokio::select! {
            _ = ticker.tick() => {
                debug!(index = state.cursor().index(), "tick");
                market::reduce(&state, MarketAction::Tick)
            }
            date = resume_due(resume) => {
                resume = None;
                info!(%date, "resuming after news");
                market::reduce(&state, MarketAction::AutoResume { date })
            }
            cmd = commands.recv(), if commands_open => match cmd {
                Some(SessionCommand::Action(action)) => {
                    if action == MarketAction::Reset {
                        resume = None;
                    }
                    market::reduce(&state, action)
                }
                Some(SessionCommand::SwitchSymbol(symbol)) => {
                    match switch_symbol(&state, source, &symbol) {
                        Ok(t) => {
                            resume = None;
                            t
                        }
                        Err(e) => {
                            warn!(%symbol, error = %e, "switch failed");
                            Transition {
                                state: state.clone(),
                                effects: vec![Effect::Notice(Notice::Warning(e.to_string()))],
                            }
                        }
                    }
                }
                Some(SessionCommand::Quit) => break,
                None => {
                    commands_open = false;
                    let idle = !state.is_running() && resume.is_none();
                    if !options.quit_on_finish || idle {
                        break;
                    }
                    continue;
                }
            },
        };

        let finished = transition.effects.contains(&Effect::Finished);
        state = apply(transition, display, &mut resume)?;
        ticker.set_running(state.is_running());

        if finished && options.quit_on_finish {
            break;
        }
        if !commands_open && !state.is_running() && resume.is_none() {
            break;
        }
    }

    info!(
        symbol = state.symbol(),
        index = state.cursor().index(),
        profit = state.portfolio().snapshot(state.current_price()).total_profit,
        "session ended"
    );
    Ok(state)
}

fn switch_symbol(
    state: &MarketState,
    source: &dyn SeriesSource,
    symbol: &str,
) -> Result<Transition, SimError> {
    let bars = source.load_series(symbol)?;
    info!(symbol, bars = bars.len(), "switched instrument");
    Ok(MarketState::load(
        symbol,
        bars,
        state.news(),
        state.config().clone(),
    ))
}

async fn resume_due(pending: Option<(NaiveDate, Instant)>) -> NaiveDate {
    match pending {
        Some((date, at)) => {
            time::sleep_until(at).await;
            date
        }
        None => std::future::pending().await,
    }
}

/// Interpret effects, then render the new state.
fn apply(
    transition: Transition,
    display: &mut dyn Display,
    resume: &mut Option<(NaiveDate, Instant)>,
) -> Result<MarketState, SimError> {
    let Transition { state, effects } = transition;
    for effect in &effects {
        match effect {
            Effect::Notice(notice) => {
                match notice {
                    Notice::Warning(msg) => warn!(symbol = state.symbol(), "{msg}"),
                    Notice::News(item) => info!(date = %item.date, "news pause"),
                    Notice::Cross(event) => info!(kind = %event.kind, "{}", event.message),
                    Notice::Trade { side, fill } => {
                        info!(?side, quantity = fill.quantity, price = fill.price, "trade")
                    }
                    Notice::Info(_) => {}
                }
                display.notice(notice)?;
            }
            Effect::ScheduleResume { date, after } => {
                *resume = Some((*date, Instant::now() + *after));
            }
            Effect::Finished => {
                info!(symbol = state.symbol(), "reached the last bar");
                display.notice(&Notice::Info("reached the last trading day".into()))?;
            }
        }
    }
    display.market_frame(&state.frame())?;
    Ok(state)
}

#[derive(Debug, Clone, Copy)]
pub struct ArcadeRun {
    pub period: Duration,
    /// Give up after this many ticks even if the game is still running.
    pub max_ticks: u64,
    /// Render one frame in this many; terminal frames always render.
    pub render_every: u64,
}

impl Default for ArcadeRun {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(16),
            max_ticks: 20_000,
            render_every: 1,
        }
    }
}

/// Run the arcade loop on a fixed tick until the game ends or `max_ticks`
/// is reached.
pub async fn run_arcade(
    config: &ArcadeConfig,
    mut input: impl FnMut(&GameState) -> Input,
    display: &mut dyn Display,
    run: ArcadeRun,
) -> Result<GameState, SimError> {
    let mut ticker = Ticker::new(run.period);
    ticker.start();
    let mut state = GameState::new(config);
    let render_every = run.render_every.max(1);
    display.arcade_frame(&state)?;

    while !state.is_terminal() && state.ticks < run.max_ticks {
        ticker.tick().await;
        let next = arcade::reduce(&state, input(&state), config);
        if next.score != state.score {
            debug!(score = next.score, alive = next.alive_count(), "hit");
        }
        state = next;
        if state.is_terminal() || state.ticks % render_every == 0 {
            display.arcade_frame(&state)?;
        }
    }

    info!(
        ticks = state.ticks,
        score = state.score,
        phase = ?state.phase(),
        "arcade run ended"
    );
    Ok(state)
}
