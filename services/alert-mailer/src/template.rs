//! Rendering an alert into subject, plain-text and HTML bodies

use crate::alert::AlertNotification;

/// Link included in every message
pub const DASHBOARD_URL: &str = "http://localhost:3000";

const POSITIVE_COLOR: &str = "#10b981";
const NEGATIVE_COLOR: &str = "#ef4444";

/// A rendered email, consumed by one transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render `alert` into an email. Pure and deterministic.
pub fn render_message(alert: &AlertNotification) -> RenderedMessage {
    RenderedMessage {
        subject: render_subject(alert),
        text: render_text(alert),
        html: render_html(alert),
    }
}

fn render_subject(alert: &AlertNotification) -> String {
    format!(
        "{} Meme Stock Alert: {} - {} Priority",
        alert.priority.glyph(),
        alert.ticker,
        alert.priority.label()
    )
}

fn render_text(alert: &AlertNotification) -> String {
    format!(
        "MEME STOCK ALERT - {label} PRIORITY\n\
         \n\
         Stock: {ticker}\n\
         Price: {price} ({change})\n\
         Social Mentions: {mentions}\n\
         Volume Ratio: {ratio} average\n\
         Detected: {detected}\n\
         \n\
         View full dashboard: {url}\n",
        label = alert.priority.label(),
        ticker = alert.ticker,
        price = format_price(alert.current_price),
        change = format_percent_change(alert.price_change),
        mentions = alert.mention_count,
        ratio = format_volume_ratio(alert.volume_ratio),
        detected = format_detected(alert),
        url = DASHBOARD_URL,
    )
}

fn render_html(alert: &AlertNotification) -> String {
    let accent = alert.priority.color();
    let change_accent = change_color(alert.price_change);
    let ticker = escape_html(&alert.ticker);
    let price = format_price(alert.current_price);
    let change = format_percent_change(alert.price_change);
    let ratio = format_volume_ratio(alert.volume_ratio);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Meme Stock Alert</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 20px; border-radius: 8px 8px 0 0; }}
        .content {{ background: #f8f9fa; padding: 30px; border-radius: 0 0 8px 8px; }}
        .alert-card {{ background: white; border-radius: 8px; padding: 20px; margin: 20px 0; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .ticker {{ font-size: 28px; font-weight: bold; color: {accent}; }}
        .priority {{ display: inline-block; padding: 4px 12px; border-radius: 20px; font-size: 12px; font-weight: bold; text-transform: uppercase; background: {accent}20; color: {accent}; }}
        .stats {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(120px, 1fr)); gap: 15px; margin: 20px 0; }}
        .stat {{ text-align: center; padding: 15px; background: #f1f3f4; border-radius: 8px; }}
        .stat-value {{ font-size: 24px; font-weight: bold; color: #1a1a1a; }}
        .stat-label {{ font-size: 12px; color: #666; text-transform: uppercase; margin-top: 5px; }}
        .price {{ font-size: 32px; font-weight: bold; color: {change_accent}; }}
        .change {{ font-size: 16px; color: {change_accent}; }}
        .footer {{ text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; color: #666; font-size: 12px; }}
        .cta-button {{ display: inline-block; background: #3b82f6; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; font-weight: bold; margin: 20px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>&#x1F680; Meme Stock Alert</h1>
            <p>Real-time social sentiment analysis detected unusual activity</p>
        </div>
        <div class="content">
            <div class="alert-card">
                <div style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px;">
                    <div class="ticker">${ticker}</div>
                    <span class="priority">{priority}</span>
                </div>
                <div style="text-align: center; margin: 20px 0;">
                    <div class="price">{price}</div>
                    <div class="change">{change}</div>
                </div>
                <div class="stats">
                    <div class="stat">
                        <div class="stat-value">{mentions}</div>
                        <div class="stat-label">Mentions</div>
                    </div>
                    <div class="stat">
                        <div class="stat-value">{ratio}</div>
                        <div class="stat-label">Volume Ratio</div>
                    </div>
                    <div class="stat">
                        <div class="stat-value">{detected_short}</div>
                        <div class="stat-label">Detected</div>
                    </div>
                </div>
                <div style="text-align: center;">
                    <a href="{url}" class="cta-button">View Dashboard</a>
                </div>
            </div>
            <div style="background: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;">
                <h3 style="margin: 0 0 10px 0; color: #374151;">&#x1F4CA; Alert Details</h3>
                <p style="margin: 5px 0; color: #6b7280;">
                    <strong>Stock:</strong> {ticker}<br>
                    <strong>Priority:</strong> {label}<br>
                    <strong>Social Mentions:</strong> {mentions} mentions detected<br>
                    <strong>Volume Spike:</strong> {ratio} average volume<br>
                    <strong>Current Price:</strong> {price} ({change})<br>
                    <strong>Detected:</strong> {detected}
                </p>
            </div>
        </div>
        <div class="footer">
            <p>This alert was generated by the Meme Stock Alerts Dashboard</p>
            <p>To unsubscribe or modify settings, visit your dashboard settings</p>
        </div>
    </div>
</body>
</html>
"#,
        priority = alert.priority.as_str(),
        label = alert.priority.label(),
        mentions = alert.mention_count,
        detected_short = alert.detected_at.format("%H:%M UTC"),
        detected = format_detected(alert),
        url = DASHBOARD_URL,
    )
}

/// `$` and exactly two decimals
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Two decimals with an explicit `+` for non-negative changes
pub fn format_percent_change(change: f64) -> String {
    if change >= 0.0 {
        // abs() folds -0.0 into "+0.00"
        format!("+{:.2}%", change.abs())
    } else {
        format!("{:.2}%", change)
    }
}

/// One decimal with a trailing `x`
pub fn format_volume_ratio(ratio: f64) -> String {
    format!("{:.1}x", ratio)
}

fn change_color(change: f64) -> &'static str {
    if change >= 0.0 {
        POSITIVE_COLOR
    } else {
        NEGATIVE_COLOR
    }
}

fn format_detected(alert: &AlertNotification) -> String {
    alert
        .detected_at
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
