use async_trait::async_trait;
use common::config::TelegramSettings;
use common::models::{SignalKind, TradeSignal};
use common::sinks::Notifier;
use teloxide::prelude::*;
use tracing::{error, info};

/// Pushes signal alerts to a single Telegram chat.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(settings: &TelegramSettings) -> Self {
        Self {
            bot: Bot::new(&settings.bot_token),
            chat_id: ChatId(settings.chat_id),
        }
    }

    /// `None` when credentials are missing; the caller runs without alerts.
    pub fn from_settings(settings: Option<&TelegramSettings>) -> Option<Self> {
        match settings {
            Some(settings) => Some(Self::new(settings)),
            None => {
                error!("Telegram credentials not configured. Skipping alert.");
                None
            }
        }
    }
}

fn emoji(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::Buy => "🚀",
        SignalKind::Sell => "🔻",
        SignalKind::Hold => "🤝",
    }
}

pub fn format_alert(ticker: &str, signal: &TradeSignal) -> String {
    let mut msg = format!(
        "{} {} Signal: {} | Confidence: {:.0}%",
        emoji(signal.signal()),
        signal.signal().as_str().to_uppercase(),
        ticker.to_uppercase(),
        signal.confidence() * 100.0
    );
    if let Some(stop_loss) = signal.stop_loss() {
        msg.push_str(&format!(" | Stop Loss: ${:.2}", stop_loss));
    }
    msg.push_str(&format!("\nReason: {}", signal.reasoning()));
    msg
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, ticker: &str, signal: &TradeSignal) -> anyhow::Result<()> {
        let text = format_alert(ticker, signal);
        if let Err(e) = self.bot.send_message(self.chat_id, text).await {
            error!("Failed to send Telegram message: {}", e);
            return Err(e.into());
        }
        info!("Telegram alert sent for {}", ticker);
        Ok(())
    }
}
