use crate::error::{Result, WintrackError};
use crate::events::{WindowEvent, WindowField, WindowId};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::info;

use super::r#trait::WindowTrackerTrait;

/// Dry-run трекер: без X-сервера, эмулирует жизненный цикл окон
/// синтетическими событиями
pub struct DryRunTracker {
    events_tx: mpsc::UnboundedSender<WindowEvent>,
}

impl DryRunTracker {
    pub fn new(events_tx: mpsc::UnboundedSender<WindowEvent>) -> Self {
        Self { events_tx }
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Dry-run режим - WindowTracker работает в режиме эмуляции");

        let fake_windows: [(WindowId, &str); 4] = [
            (0x10, "Terminal - dry_run"),
            (0x11, "Browser - dry_run"),
            (0x12, "Editor - dry_run"),
            (0x13, "Game - dry_run"),
        ];

        let mut index = 0;
        let mut interval = interval(Duration::from_secs(10));

        loop {
            interval.tick().await;

            let (xid, name) = fake_windows[index];
            let previous = fake_windows[(index + fake_windows.len() - 1) % fake_windows.len()];

            info!("Dry-run: эмулируем появление окна 0x{:x} '{}'", xid, name);
            self.send(WindowEvent::added(xid, Some(name.to_string())))?;
            self.send(WindowEvent::field_changed(
                xid,
                WindowField::Name,
                Some(name.to_string()),
                Some(format!("{} (renamed)", name)),
            ))?;
            self.send(WindowEvent::removed(previous.0, Some(previous.1.to_string())))?;

            index = (index + 1) % fake_windows.len();
        }
    }

    fn send(&self, event: WindowEvent) -> Result<()> {
        if self.events_tx.send(event).is_err() {
            return WintrackError::internal("канал событий закрыт потребителем");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl WindowTrackerTrait for DryRunTracker {
    async fn run(mut self: Box<Self>) -> Result<()> {
        (*self).run().await
    }
}
