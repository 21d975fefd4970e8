//! Line-oriented terminal rendering.

use std::io::Write;

use crate::domain::arcade::{GameState, Phase};
use crate::domain::benchmark::Comparison;
use crate::domain::error::SimError;
use crate::domain::market::{MarketFrame, Notice, Side};
use crate::ports::display_port::Display;

pub struct TextDisplay<W: Write> {
    out: W,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for TextDisplay<W> {
    fn market_frame(&mut self, frame: &MarketFrame<'_>) -> Result<(), SimError> {
        let Some(date) = frame.date else {
            writeln!(self.out, "{}: no data loaded", frame.symbol)?;
            return Ok(());
        };
        let p = &frame.portfolio;
        writeln!(
            self.out,
            "{} {} {:>10} [{}/{}] {} qty {} | cash {} shares {} avg {} | unrealized {} realized {} total {}",
            date.format("%Y-%m-%d"),
            frame.symbol,
            format_money(frame.price),
            frame.index + 1,
            frame.len,
            if frame.running { "playing" } else { "paused" },
            frame.quantity,
            format_money(p.cash),
            p.shares,
            format_money(p.average_cost),
            format_signed(p.unrealized_pnl),
            format_signed(p.realized_profit),
            format_signed(p.total_profit),
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn notice(&mut self, notice: &Notice) -> Result<(), SimError> {
        match notice {
            Notice::Info(msg) => writeln!(self.out, "info: {msg}")?,
            Notice::Warning(msg) => writeln!(self.out, "warning: {msg}")?,
            Notice::News(item) => writeln!(
                self.out,
                "NEWS {}: {}",
                item.date.format("%Y-%m-%d"),
                item.message
            )?,
            Notice::Cross(event) => writeln!(self.out, "signal: {}", event.message)?,
            Notice::Trade {
                side: Side::Buy,
                fill,
            } => writeln!(
                self.out,
                "bought {} @ {} for {}",
                fill.quantity,
                format_money(fill.price),
                format_money(fill.value)
            )?,
            Notice::Trade {
                side: Side::Sell,
                fill,
            } => writeln!(
                self.out,
                "sold {} @ {} for {} (realized {})",
                fill.quantity,
                format_money(fill.price),
                format_money(fill.value),
                format_signed(fill.realized)
            )?,
        }
        self.out.flush()?;
        Ok(())
    }

    fn arcade_frame(&mut self, state: &GameState) -> Result<(), SimError> {
        let phase = match state.phase() {
            Phase::Running => "running",
            Phase::Victory => "VICTORY",
            Phase::Defeat => "GAME OVER",
        };
        writeln!(
            self.out,
            "tick {:>5} score {:>4} invaders {:>2} bullets {} speed {:.2} player {:.1} {}",
            state.ticks,
            state.score,
            state.alive_count(),
            state.bullets.len(),
            state.speed,
            state.player_x,
            phase
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// End-of-session "you vs benchmark" summary over the aligned rows.
pub fn write_comparison<W: Write>(
    out: &mut W,
    symbol: &str,
    rows: &[Comparison],
) -> Result<(), SimError> {
    writeln!(out, "\n=== You vs {symbol} (monthly investing) ===")?;
    let Some(last) = rows.last() else {
        writeln!(out, "No trading days in common with {symbol}")?;
        return Ok(());
    };
    let ahead = rows.iter().filter(|r| r.lead() > 0.0).count();
    writeln!(out, "Your P/L:         {}", format_signed(last.player))?;
    writeln!(out, "Benchmark P/L:    {}", format_signed(last.benchmark))?;
    writeln!(out, "Lead:             {}", format_signed(last.lead()))?;
    writeln!(out, "Days ahead:       {}/{}", ahead, rows.len())?;
    out.flush()?;
    Ok(())
}

/// Two decimals with thousands separators.
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

fn format_signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_money(value))
    } else {
        format_money(value)
    }
}
