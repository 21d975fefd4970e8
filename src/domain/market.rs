//! Market replay session: one immutable state record advanced by [`reduce`].
//!
//! The reducer never sleeps, logs or touches I/O. Anything that has to happen
//! outside the state (timers, notices, end of playback) is returned as an
//! [`Effect`] for the driver to interpret.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use super::cross::{self, CrossEvent, LONG_PERIOD, SHORT_PERIOD};
use super::news::{NEWS_PAUSE, NewsBook, NewsItem, NewsTrigger};
use super::ohlcv::Bar;
use super::playback::PlaybackCursor;
use super::portfolio::{Portfolio, PortfolioSnapshot};
use super::position::Fill;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000_000.0;
pub const DEFAULT_LOT_SIZE: u64 = 100;
pub const DEFAULT_TICK: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub initial_capital: f64,
    pub lot_size: u64,
    pub initial_quantity: u64,
    pub short_period: usize,
    pub long_period: usize,
    pub tick_interval: Duration,
    pub news_pause: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            lot_size: DEFAULT_LOT_SIZE,
            initial_quantity: DEFAULT_LOT_SIZE,
            short_period: SHORT_PERIOD,
            long_period: LONG_PERIOD,
            tick_interval: DEFAULT_TICK,
            news_pause: NEWS_PAUSE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketAction {
    Tick,
    Play,
    Pause,
    TogglePlay,
    /// Fired by the driver once a news pause has elapsed.
    AutoResume { date: NaiveDate },
    /// Change the order size by this many shares, floored at zero.
    AdjustQuantity(i64),
    Buy,
    Sell,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    /// A rejected action; state is unchanged.
    Warning(String),
    News(NewsItem),
    Cross(CrossEvent),
    Trade { side: Side, fill: Fill },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notice(Notice),
    /// Dispatch `AutoResume { date }` after `after` has elapsed.
    ScheduleResume { date: NaiveDate, after: Duration },
    /// Playback reached the last bar.
    Finished,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub state: MarketState,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone)]
pub struct MarketState {
    symbol: String,
    series: Arc<[Bar]>,
    news: Arc<NewsBook>,
    config: MarketConfig,
    cursor: PlaybackCursor,
    portfolio: Portfolio,
    quantity: u64,
    crosses: Vec<CrossEvent>,
    news_trigger: NewsTrigger,
}

impl MarketState {
    /// Fresh session positioned on the first bar. The returned effects carry
    /// the news pause for the first bar, if it has news.
    pub fn load(
        symbol: impl Into<String>,
        series: impl Into<Arc<[Bar]>>,
        news: Arc<NewsBook>,
        config: MarketConfig,
    ) -> Transition {
        let series = series.into();
        let mut state = MarketState {
            symbol: symbol.into(),
            cursor: PlaybackCursor::new(series.len()),
            portfolio: Portfolio::new(config.initial_capital),
            quantity: config.initial_quantity,
            crosses: Vec::new(),
            news_trigger: NewsTrigger::default(),
            series,
            news,
            config,
        };
        let mut effects = Vec::new();
        if let Some(bar) = state.current_bar().cloned() {
            state.portfolio.record_pnl(bar.time(), bar.close);
            state.check_news(&bar, &mut effects);
        }
        Transition { state, effects }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn series(&self) -> &[Bar] {
        &self.series
    }

    pub fn news(&self) -> Arc<NewsBook> {
        Arc::clone(&self.news)
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn crosses(&self) -> &[CrossEvent] {
        &self.crosses
    }

    pub fn news_trigger(&self) -> NewsTrigger {
        self.news_trigger
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.cursor.is_running()
    }

    pub fn current_bar(&self) -> Option<&Bar> {
        self.series.get(self.cursor.index())
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_bar().map(|b| b.date)
    }

    /// Close of the current bar, or zero before any data is loaded.
    pub fn current_price(&self) -> f64 {
        self.current_bar().map(|b| b.close).unwrap_or(0.0)
    }

    pub fn visible(&self) -> &[Bar] {
        self.cursor.visible(&self.series)
    }

    pub fn frame(&self) -> MarketFrame<'_> {
        let price = self.current_price();
        let date = self.current_date();
        let time = self.current_bar().map(Bar::time);
        MarketFrame {
            symbol: &self.symbol,
            date,
            price,
            index: self.cursor.index(),
            len: self.series.len(),
            running: self.cursor.is_running(),
            quantity: self.quantity,
            visible: self.visible(),
            crosses: &self.crosses,
            latest_cross: time.and_then(|t| cross::latest_at(&self.crosses, t)),
            news_today: date.and_then(|d| self.news.get(d)),
            news_history: date
                .map(|d| self.news.history_until(d))
                .unwrap_or_default(),
            portfolio: self.portfolio.snapshot(price),
        }
    }

    fn check_news(&mut self, bar: &Bar, effects: &mut Vec<Effect>) {
        let Some(message) = self.news_trigger.check(bar.date, &self.news) else {
            return;
        };
        self.cursor.stop();
        effects.push(Effect::Notice(Notice::News(NewsItem {
            date: bar.date,
            message: message.to_string(),
        })));
        effects.push(Effect::ScheduleResume {
            date: bar.date,
            after: self.config.news_pause,
        });
    }

    fn refresh_crosses(&mut self, effects: &mut Vec<Effect>) {
        let visible = self.cursor.visible(&self.series);
        let crosses =
            cross::detect_crosses(visible, self.config.short_period, self.config.long_period);
        for event in crosses.iter().skip(self.crosses.len()) {
            effects.push(Effect::Notice(Notice::Cross(event.clone())));
        }
        self.crosses = crosses;
    }
}

/// Advance `state` by one action.
pub fn reduce(state: &MarketState, action: MarketAction) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        MarketAction::Tick => {
            if !next.cursor.is_running() {
                return Transition {
                    state: next,
                    effects,
                };
            }
            if next.cursor.advance() {
                if let Some(bar) = next.current_bar().cloned() {
                    next.refresh_crosses(&mut effects);
                    next.portfolio.record_pnl(bar.time(), bar.close);
                    next.check_news(&bar, &mut effects);
                }
            }
            if next.cursor.at_end() {
                next.cursor.stop();
                effects.push(Effect::Finished);
            }
        }
        MarketAction::Play => start(&mut next, &mut effects),
        MarketAction::Pause => next.cursor.stop(),
        MarketAction::TogglePlay => {
            if next.cursor.is_running() {
                next.cursor.stop();
            } else {
                start(&mut next, &mut effects);
            }
        }
        MarketAction::AutoResume { date } => {
            if next.current_date() == Some(date) {
                next.cursor.start();
            }
        }
        MarketAction::AdjustQuantity(delta) => {
            next.quantity = next.quantity.saturating_add_signed(delta);
        }
        MarketAction::Buy => trade(&mut next, Side::Buy, &mut effects),
        MarketAction::Sell => trade(&mut next, Side::Sell, &mut effects),
        MarketAction::Reset => {
            return MarketState::load(
                next.symbol,
                next.series,
                next.news,
                next.config,
            );
        }
    }

    Transition {
        state: next,
        effects,
    }
}

fn start(state: &mut MarketState, effects: &mut Vec<Effect>) {
    if !state.has_data() {
        effects.push(Effect::Notice(Notice::Warning("no data loaded".into())));
        return;
    }
    if !state.cursor.start() {
        effects.push(Effect::Notice(Notice::Info(
            "already at the last trading day".into(),
        )));
    }
}

fn trade(state: &mut MarketState, side: Side, effects: &mut Vec<Effect>) {
    let Some(bar) = state.current_bar().cloned() else {
        effects.push(Effect::Notice(Notice::Warning("no data loaded".into())));
        return;
    };
    let position = &mut state.portfolio.position;
    let result = match side {
        Side::Buy => position.buy(state.quantity, bar.close),
        Side::Sell => position.sell(state.quantity, bar.close),
    };
    match result {
        Ok(fill) => {
            state.portfolio.record_pnl(bar.time(), bar.close);
            effects.push(Effect::Notice(Notice::Trade { side, fill }));
        }
        Err(e) => effects.push(Effect::Notice(Notice::Warning(e.to_string()))),
    }
}

/// Everything the display layer needs for one render.
#[derive(Debug, Clone)]
pub struct MarketFrame<'a> {
    pub symbol: &'a str,
    pub date: Option<NaiveDate>,
    pub price: f64,
    pub index: usize,
    pub len: usize,
    pub running: bool,
    pub quantity: u64,
    pub visible: &'a [Bar],
    pub crosses: &'a [CrossEvent],
    pub latest_cross: Option<&'a CrossEvent>,
    pub news_today: Option<&'a str>,
    pub news_history: Vec<NewsItem>,
    pub portfolio: PortfolioSnapshot,
}
