// =============================================================================
// Console presentation
// =============================================================================
//
// Plain-text rendering of a batch for the `scan` command. Colour is a pure
// function of the trend / status being printed; passing `color = false`
// produces the same text without escape codes.
// =============================================================================

use std::fmt::Write;

use crate::battle::BattleOutcome;
use crate::report::BattleReport;
use crate::types::{AttackStatus, HealthStatus, Timeframe, TrendLabel};

const RESET: &str = "\x1b[0m";
const SEPARATOR_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Green,
    Yellow,
    Cyan,
    Plain,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Red => "\x1b[31m",
            Tone::Green => "\x1b[32m",
            Tone::Yellow => "\x1b[33m",
            Tone::Cyan => "\x1b[36m",
            Tone::Plain => "",
        }
    }

    pub fn for_trend(trend: &TrendLabel) -> Self {
        match trend {
            TrendLabel::Bullish => Tone::Green,
            TrendLabel::Bearish | TrendLabel::Error(_) => Tone::Red,
            TrendLabel::Neutral => Tone::Yellow,
        }
    }

    pub fn for_health(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Strong => Tone::Green,
            HealthStatus::Caution => Tone::Yellow,
            HealthStatus::Critical => Tone::Red,
        }
    }

    pub fn for_attack(status: AttackStatus) -> Self {
        match status {
            AttackStatus::High => Tone::Red,
            AttackStatus::Medium => Tone::Yellow,
            AttackStatus::Low => Tone::Plain,
        }
    }
}

pub fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color || tone == Tone::Plain {
        return text.to_string();
    }
    format!("{}{text}{RESET}", tone.code())
}

pub fn render_header(timeframe: Timeframe, limit: u32, symbols: usize, color: bool) -> String {
    format!(
        "{}\n{}\n\n{}\n",
        paint("🕹️ Crypto Battle Arena - Quick Report 🕹️", Tone::Red, color),
        paint(
            &format!("⚔️ Scanning the {symbols} strongest fighters on the battlefield! ⚔️"),
            Tone::Yellow,
            color
        ),
        paint(
            &format!("📊 Battle Reports (Timeframe: {timeframe}, {limit} candles)"),
            Tone::Cyan,
            color
        ),
    )
}

/// One report block, terminated by the separator line.
pub fn render_report(report: &BattleReport, timeframe: Timeframe, color: bool) -> String {
    let price = |v: &f64| format!("{v:.2}");
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        paint(
            &format!("⚔️ {} ({timeframe}) - Battle Report ⚔️", report.symbol),
            Tone::Red,
            color
        )
    );
    let _ = writeln!(
        out,
        "{}",
        paint(&report.trend.headline(), Tone::for_trend(&report.trend), color)
    );
    let _ = writeln!(out, "💰 Current Price: {}", report.current_price.render_with(price));

    let health = report
        .price_health
        .render_with(|h| h.render(|bar| paint(bar, Tone::for_health(h.status), color)));
    let _ = writeln!(out, "🩸 Price HP: {health}");
    let _ = writeln!(out, "🎯 Swing High: {}", report.swing_high.render_with(price));
    let _ = writeln!(out, "🎯 Swing Low: {}", report.swing_low.render_with(price));

    let attack = report
        .price_attack
        .render_with(|a| paint(&a.render(), Tone::for_attack(a.status), color));
    let _ = writeln!(out, "💥 Price ATK: {attack}");
    let _ = writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH));
    out
}

/// The whole batch: header, messages, then every report block.
pub fn render_outcome(outcome: &BattleOutcome, color: bool) -> String {
    let mut out = render_header(
        outcome.timeframe,
        outcome.limit,
        outcome.reports.len(),
        color,
    );
    out.push('\n');

    for message in outcome.messages() {
        let _ = writeln!(out, "{}", paint(&format!("⚠️ {message}"), Tone::Red, color));
    }
    for report in &outcome.reports {
        out.push_str(&render_report(report, outcome.timeframe, color));
        out.push('\n');
    }
    out
}
