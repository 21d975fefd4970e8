//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::driver::{self, ArcadeRun, SessionCommand, SessionOptions};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_display::{TextDisplay, format_money, write_comparison};
use crate::domain::arcade::{ArcadeConfig, Autopilot, Phase};
use crate::domain::benchmark::{
    Comparison, DEFAULT_MONTHLY_AMOUNT, compare, monthly_investment,
};
use crate::domain::config_validation::{
    validate_arcade_config, validate_benchmark_config, validate_market_config,
};
use crate::domain::cross::detect_crosses;
use crate::domain::error::SimError;
use crate::domain::market::{
    DEFAULT_INITIAL_CAPITAL, DEFAULT_LOT_SIZE, DEFAULT_TICK, MarketAction, MarketConfig,
    MarketState, Transition,
};
use crate::domain::news::{NEWS_PAUSE, NewsBook};
use crate::domain::portfolio::PnlPoint;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::SeriesSource;

#[derive(Parser, Debug)]
#[command(name = "stocksim", about = "Historical stock replay and trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a price series and trade it from the keyboard
    Play {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Start playing immediately and exit at the last bar. Also set by
        /// `[market] autoplay`.
        #[arg(long)]
        autoplay: bool,
    },
    /// List every moving-average cross in a series
    Crosses {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Summarise a fixed monthly investment into the benchmark symbol
    Benchmark {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data file
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run the invaders demo on autopilot
    Arcade {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        max_ticks: Option<u64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Play {
            config,
            symbol,
            autoplay,
        } => run_play(&config, symbol.as_deref(), autoplay),
        Command::Crosses { config, symbol } => run_crosses(&config, symbol.as_deref()),
        Command::Benchmark { config } => run_benchmark(&config),
        Command::Symbols { config } => run_symbols(&config),
        Command::Arcade { config, max_ticks } => run_arcade(config.as_deref(), max_ticks),
        Command::Validate { config } => run_validate(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SimError> {
    FileConfigAdapter::from_file(path)
}

pub fn build_market_config(adapter: &dyn ConfigPort) -> Result<MarketConfig, SimError> {
    validate_market_config(adapter)?;
    let defaults = MarketConfig::default();
    Ok(MarketConfig {
        initial_capital: adapter.get_double("market", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        lot_size: adapter.get_int("market", "lot_size", DEFAULT_LOT_SIZE as i64) as u64,
        initial_quantity: adapter.get_int("market", "initial_quantity", DEFAULT_LOT_SIZE as i64)
            as u64,
        short_period: adapter.get_int("market", "short_period", defaults.short_period as i64)
            as usize,
        long_period: adapter.get_int("market", "long_period", defaults.long_period as i64) as usize,
        tick_interval: adapter.get_duration_ms("market", "tick_ms", DEFAULT_TICK),
        news_pause: adapter.get_duration_ms("market", "news_pause_ms", NEWS_PAUSE),
    })
}

pub fn build_arcade_run(
    adapter: Option<&dyn ConfigPort>,
    max_ticks: Option<u64>,
) -> Result<ArcadeRun, SimError> {
    let mut run = ArcadeRun::default();
    if let Some(adapter) = adapter {
        validate_arcade_config(adapter)?;
        run.period = adapter.get_duration_ms("arcade", "tick_ms", run.period);
    }
    if let Some(max) = max_ticks {
        run.max_ticks = max;
    }
    // Roughly one status line per half second of game time.
    run.render_every = (500 / run.period.as_millis().max(1)).max(1) as u64;
    Ok(run)
}

/// Relative paths in the config resolve against the config file's directory.
pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        return path;
    }
    match config_path.parent() {
        Some(dir) => dir.join(path),
        None => path,
    }
}

fn required(adapter: &dyn ConfigPort, section: &str, key: &str) -> Result<String, SimError> {
    adapter
        .get_string(section, key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SimError::missing(section, key))
}

fn data_source(config_path: &Path, adapter: &dyn ConfigPort) -> Result<CsvAdapter, SimError> {
    let data_path = required(adapter, "market", "data_path")?;
    Ok(CsvAdapter::new(resolve_path(config_path, &data_path)))
}

fn load_news(config_path: &Path, adapter: &dyn ConfigPort) -> Result<NewsBook, SimError> {
    match adapter
        .get_string("market", "news_path")
        .filter(|s| !s.trim().is_empty())
    {
        Some(p) => CsvAdapter::load_news(&resolve_path(config_path, &p)),
        None => Ok(NewsBook::new()),
    }
}

/// Load the configured (or overridden) symbol into a fresh session.
pub fn open_session(
    config_path: &Path,
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<(CsvAdapter, Transition), SimError> {
    let config = build_market_config(adapter)?;
    let source = data_source(config_path, adapter)?;
    let symbol = match symbol_override {
        Some(s) => s.to_string(),
        None => required(adapter, "market", "symbol")?,
    };
    let bars = source.load_series(&symbol)?;
    if bars.is_empty() {
        return Err(SimError::NoData { symbol });
    }
    let news = Arc::new(load_news(config_path, adapter)?);
    eprintln!(
        "Loaded {} bars for {} ({} news items)",
        bars.len(),
        symbol,
        news.len()
    );
    let transition = MarketState::load(symbol, bars, news, config);
    Ok((source, transition))
}

/// The player's P/L curve lined up against monthly investing in the
/// `[benchmark]` symbol. `None` when no benchmark is configured.
pub fn compare_with_benchmark(
    adapter: &dyn ConfigPort,
    source: &dyn SeriesSource,
    pnl_curve: &[PnlPoint],
) -> Result<Option<(String, Vec<Comparison>)>, SimError> {
    if adapter.get_string("benchmark", "symbol").is_none() {
        return Ok(None);
    }
    validate_benchmark_config(adapter)?;
    let symbol = required(adapter, "benchmark", "symbol")?;
    let amount = adapter.get_double("benchmark", "monthly_amount", DEFAULT_MONTHLY_AMOUNT);
    let bars = source.load_series(&symbol)?;
    let rows = compare(pnl_curve, &monthly_investment(&bars, amount));
    Ok(Some((symbol, rows)))
}

/// `--autoplay` or `[market] autoplay = true`.
pub fn autoplay_requested(flag: bool, adapter: &dyn ConfigPort) -> bool {
    flag || adapter.get_bool("market", "autoplay", false)
}

/// Map one line of keyboard input to a session command.
pub fn parse_command(line: &str, lot_size: u64) -> Option<SessionCommand> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("sym ") {
        let symbol = rest.trim();
        return (!symbol.is_empty()).then(|| SessionCommand::SwitchSymbol(symbol.to_string()));
    }
    let lot = lot_size as i64;
    let action = match line {
        "p" => MarketAction::TogglePlay,
        "b" => MarketAction::Buy,
        "s" => MarketAction::Sell,
        "+" => MarketAction::AdjustQuantity(lot),
        "-" => MarketAction::AdjustQuantity(-lot),
        "r" => MarketAction::Reset,
        "q" => return Some(SessionCommand::Quit),
        _ => return None,
    };
    Some(SessionCommand::Action(action))
}

const HELP: &str = "commands: p play/pause, b buy, s sell, +/- lot, r reset, sym NAME, q quit";

fn runtime() -> Result<tokio::runtime::Runtime, SimError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?)
}

fn run_play(config_path: &Path, symbol: Option<&str>, autoplay: bool) -> Result<(), SimError> {
    let adapter = load_config(config_path)?;
    if adapter.get_string("benchmark", "symbol").is_some() {
        validate_benchmark_config(&adapter)?;
    }
    let autoplay = autoplay_requested(autoplay, &adapter);
    let (source, initial) = open_session(config_path, &adapter, symbol)?;
    let lot_size = initial.state.config().lot_size;

    let rt = runtime()?;
    let result = rt.block_on(async {
        let (tx, rx) = mpsc::channel(32);
        if autoplay {
            tx.try_send(SessionCommand::Action(MarketAction::Play))
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            drop(tx);
        } else {
            eprintln!("{HELP}");
            tokio::spawn(read_commands(tx, lot_size));
        }

        let mut display = TextDisplay::new(std::io::stdout());
        let state = driver::run_market(
            initial,
            &source,
            rx,
            &mut display,
            SessionOptions {
                quit_on_finish: autoplay,
            },
        )
        .await?;

        let snapshot = state.portfolio().snapshot(state.current_price());
        eprintln!("\n=== Session Summary ===");
        eprintln!("Symbol:           {}", state.symbol());
        eprintln!("Cash:             {}", format_money(snapshot.cash));
        eprintln!("Shares:           {}", snapshot.shares);
        eprintln!("Realized P/L:     {}", format_money(snapshot.realized_profit));
        eprintln!("Unrealized P/L:   {}", format_money(snapshot.unrealized_pnl));
        eprintln!("Total P/L:        {}", format_money(snapshot.total_profit));
        eprintln!(
            "Return:           {:.2}%",
            state.portfolio().return_pct(state.current_price()) * 100.0
        );

        match compare_with_benchmark(&adapter, &source, &state.portfolio().pnl_curve) {
            Ok(Some((bench, rows))) => write_comparison(&mut std::io::stderr(), &bench, &rows)?,
            Ok(None) => {}
            Err(e) => eprintln!("warning: benchmark comparison skipped: {e}"),
        }
        Ok::<(), SimError>(())
    });
    // The stdin reader may still be parked on a blocking read.
    rt.shutdown_background();
    result
}

async fn read_commands(tx: mpsc::Sender<SessionCommand>, lot_size: u64) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line, lot_size) {
            Some(cmd) => {
                let quit = cmd == SessionCommand::Quit;
                if tx.send(cmd).await.is_err() || quit {
                    return;
                }
            }
            None => eprintln!("unknown command {:?}; {HELP}", line.trim()),
        }
    }
}

fn run_crosses(config_path: &Path, symbol: Option<&str>) -> Result<(), SimError> {
    let adapter = load_config(config_path)?;
    let (_, initial) = open_session(config_path, &adapter, symbol)?;
    let state = initial.state;
    let config = state.config();

    let events = detect_crosses(state.series(), config.short_period, config.long_period);
    for event in &events {
        println!("{}", event.message);
    }
    eprintln!(
        "{} crosses of SMA({}) and SMA({}) in {} bars",
        events.len(),
        config.short_period,
        config.long_period,
        state.series().len()
    );
    Ok(())
}

fn run_benchmark(config_path: &Path) -> Result<(), SimError> {
    let adapter = load_config(config_path)?;
    validate_benchmark_config(&adapter)?;
    let source = data_source(config_path, &adapter)?;
    let symbol = required(&adapter, "benchmark", "symbol")?;
    let amount = adapter.get_double("benchmark", "monthly_amount", DEFAULT_MONTHLY_AMOUNT);

    let bars = source.load_series(&symbol)?;
    if bars.is_empty() {
        return Err(SimError::NoData { symbol });
    }
    let points = monthly_investment(&bars, amount);

    let mut last_month = String::new();
    for (bar, point) in bars.iter().zip(&points) {
        let month = bar.date.format("%Y-%m").to_string();
        if month != last_month {
            println!(
                "{}  invested {:>16}  value {:>16}  profit {:>16}",
                month,
                format_money(point.invested),
                format_money(point.value),
                format_money(point.profit)
            );
            last_month = month;
        }
    }

    if let Some(last) = points.last() {
        let pct = if last.invested > 0.0 {
            last.profit / last.invested * 100.0
        } else {
            0.0
        };
        eprintln!("\n=== Benchmark {} ===", symbol);
        eprintln!("Monthly amount:   {}", format_money(amount));
        eprintln!("Invested:         {}", format_money(last.invested));
        eprintln!("Value:            {}", format_money(last.value));
        eprintln!("Profit:           {} ({:.2}%)", format_money(last.profit), pct);
    }
    Ok(())
}

fn run_symbols(config_path: &Path) -> Result<(), SimError> {
    let adapter = load_config(config_path)?;
    let source = data_source(config_path, &adapter)?;
    let symbols = source.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found in {}", source.path().display());
        return Ok(());
    }
    for symbol in &symbols {
        println!("{}", symbol);
    }
    eprintln!("{} symbols found", symbols.len());
    Ok(())
}

fn run_arcade(config_path: Option<&Path>, max_ticks: Option<u64>) -> Result<(), SimError> {
    let adapter = config_path.map(load_config).transpose()?;
    let run = build_arcade_run(adapter.as_ref().map(|a| a as &dyn ConfigPort), max_ticks)?;
    let config = ArcadeConfig::default();

    let state = runtime()?.block_on(async {
        let mut pilot = Autopilot::new();
        let mut display = TextDisplay::new(std::io::stdout());
        driver::run_arcade(
            &config,
            |s| pilot.next_input(s, &config),
            &mut display,
            run,
        )
        .await
    })?;

    let outcome = match state.phase() {
        Phase::Victory => "victory",
        Phase::Defeat => "defeat",
        Phase::Running => "stopped",
    };
    eprintln!(
        "Arcade {} after {} ticks ({:.1}s at {}ms): score {}",
        outcome,
        state.ticks,
        (state.ticks as u128 * run.period.as_millis()) as f64 / 1000.0,
        run.period.as_millis(),
        state.score
    );
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SimError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(config_path)?;

    let config = build_market_config(&adapter)?;
    eprintln!(
        "  market: SMA({}) / SMA({}), tick {}ms, lot {}",
        config.short_period,
        config.long_period,
        config.tick_interval.as_millis(),
        config.lot_size
    );

    if adapter.get_string("benchmark", "symbol").is_some() {
        validate_benchmark_config(&adapter)?;
        eprintln!("  benchmark: ok");
    }
    let arcade = build_arcade_run(Some(&adapter), None)?;
    eprintln!("  arcade: tick {}ms", arcade.period.as_millis());

    if let Some(p) = adapter.get_string("market", "news_path") {
        let news = CsvAdapter::load_news(&resolve_path(config_path, &p))?;
        eprintln!("  news: {} items", news.len());
    }

    eprintln!("Config validated successfully");
    Ok(())
}
