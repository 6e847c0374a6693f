// =============================================================================
// HTML battle page
// =============================================================================
//
// Server-rendered page: the timeframe / limit form, any messages, and one
// card per report. Every dynamic string goes through `escape_html`.
// =============================================================================

use std::fmt::Write;

use crate::battle::BattleOutcome;
use crate::report::BattleReport;
use crate::runtime_config::{MAX_LIMIT, MIN_LIMIT};
use crate::types::{Timeframe, TrendLabel};

const STYLE: &str = r#"
body { background: #14141f; color: #e8e8f0; font-family: "Segoe UI", sans-serif; margin: 0; padding: 24px; }
h1 { color: #ff5a5a; margin-bottom: 4px; }
.subtitle { color: #f5c542; margin-top: 0; }
form { margin: 16px 0; display: flex; gap: 12px; align-items: center; }
select, input, button { background: #22223a; color: inherit; border: 1px solid #444; padding: 6px 10px; border-radius: 4px; }
.notice { background: #4a1f1f; border-left: 4px solid #ff5a5a; padding: 8px 12px; margin: 6px 0; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 16px; }
.card { background: #1d1d2e; border-radius: 8px; padding: 14px; }
.card h2 { font-size: 1.05em; margin: 0 0 8px; color: #ff8080; }
.bullish { color: #4cd964; } .bearish { color: #ff5a5a; } .neutral { color: #f5c542; } .error { color: #ff9f43; }
.bar { font-family: monospace; color: #4cd964; }
footer { margin-top: 24px; color: #777; font-size: 0.85em; }
"#;

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn trend_class(trend: &TrendLabel) -> &'static str {
    match trend {
        TrendLabel::Bullish => "bullish",
        TrendLabel::Bearish => "bearish",
        TrendLabel::Neutral => "neutral",
        TrendLabel::Error(_) => "error",
    }
}

fn render_card(out: &mut String, report: &BattleReport, timeframe: Timeframe) {
    let price = |v: &f64| format!("{v:.2}");
    let health = report
        .price_health
        .render_with(|h| h.render(|bar| format!(r#"<span class="bar">{bar}</span>"#)));

    // `write!` into a String cannot fail.
    let _ = write!(
        out,
        r#"<div class="card">
<h2>⚔️ {symbol} ({timeframe}) - Battle Report ⚔️</h2>
<p class="{class}">{trend}</p>
<p>💰 Current Price: {current}</p>
<p>🩸 Price HP: {health}</p>
<p>🎯 Swing High: {high}</p>
<p>🎯 Swing Low: {low}</p>
<p>💥 Price ATK: {attack}</p>
</div>
"#,
        symbol = escape_html(&report.symbol),
        class = trend_class(&report.trend),
        trend = escape_html(&report.trend.headline()),
        current = report.current_price.render_with(price),
        high = report.swing_high.render_with(price),
        low = report.swing_low.render_with(price),
        attack = escape_html(&report.price_attack.render_with(|a| a.render())),
    );
}

/// Render the complete page for one batch.
pub fn render_page(outcome: &BattleOutcome) -> String {
    let mut out = String::with_capacity(4096 + outcome.reports.len() * 512);

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Crypto Battle Arena</title>
<style>{STYLE}</style>
</head>
<body>
<h1>🕹️ Crypto Battle Arena - Battle Report 🕹️</h1>
<p class="subtitle">⚔️ Scanning the strongest fighters on the battlefield! ⚔️</p>
<form method="post" action="/">
<label for="timeframe">Timeframe</label>
<select id="timeframe" name="timeframe">
"#
    );

    for tf in Timeframe::ALL {
        let selected = if tf == outcome.timeframe { " selected" } else { "" };
        let _ = writeln!(out, r#"<option value="{tf}"{selected}>{tf}</option>"#);
    }

    let _ = write!(
        out,
        r#"</select>
<label for="limit">Candles</label>
<input id="limit" name="limit" type="number" min="{MIN_LIMIT}" max="{MAX_LIMIT}" value="{limit}">
<button type="submit">⚔️ Fight!</button>
</form>
"#,
        limit = outcome.limit,
    );

    for message in outcome.messages() {
        let _ = writeln!(out, r#"<div class="notice">⚠️ {}</div>"#, escape_html(message));
    }

    out.push_str("<div class=\"grid\">\n");
    for report in &outcome.reports {
        render_card(&mut out, report, outcome.timeframe);
    }
    out.push_str("</div>\n");

    let _ = write!(
        out,
        "<footer>Generated at {} UTC</footer>\n</body>\n</html>\n",
        outcome.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    out
}
