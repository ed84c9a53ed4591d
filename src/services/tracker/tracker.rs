use crate::config::Config;
use crate::error::{Result, WintrackError};
use crate::events::WindowEvent;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use super::atoms::AtomTable;
use super::dispatch::dispatch_event;
use super::display::{DisplayServer, X11Display};
use super::reconcile::process_client_list;
use super::registry::WindowRegistry;
use super::r#trait::WindowTrackerTrait;

/// Боевой трекер: держит соединение с X-сервером и гоняет ядро
/// (сверка + диспетчеризация) внутри одного цикла. Реестр разделяется
/// с потребителями через RwLock, но пишет в него только этот сервис.
pub struct X11WindowTracker {
    config: Arc<Config>,
    registry: Arc<RwLock<WindowRegistry>>,
    events_tx: mpsc::UnboundedSender<WindowEvent>,
    display: X11Display,
    atoms: AtomTable,
}

impl X11WindowTracker {
    pub fn new(
        config: Arc<Config>,
        registry: Arc<RwLock<WindowRegistry>>,
        events_tx: mpsc::UnboundedSender<WindowEvent>,
    ) -> Result<Self> {
        info!("Инициализация X11WindowTracker");

        let display = X11Display::connect(config.display_name())?;

        // Единственный батч разрешения атомов за весь жизненный цикл процесса
        let atoms = AtomTable::intern(&display)?;

        Ok(Self {
            config,
            registry,
            events_tx,
            display,
            atoms,
        })
    }

    pub async fn run(self) -> Result<()> {
        let root = self.display.root_window();
        info!("X11WindowTracker запущен (root 0x{:x})", root);

        if !self.display.watch_properties(root)? {
            return Err(WintrackError::ServiceUnavailable(
                "корневое окно отвергло подписку на PropertyNotify".to_string(),
            ));
        }

        // Первичное наполнение реестра из текущего списка клиентов
        let seed_events = {
            let mut registry = self.registry.write();
            process_client_list(&self.display, &self.atoms, &mut registry)?
        };
        info!("Начальная сверка: {} окон в реестре", self.registry.read().len());
        self.forward_events(seed_events)?;

        let mut interval = interval(Duration::from_millis(self.config.display.poll_interval_ms));

        loop {
            interval.tick().await;

            // Выгребаем всё, что доставил X-сервер, строго в порядке доставки;
            // каждое событие обрабатывается синхронно и до конца
            while let Some(event) = self.display.poll_event()? {
                let emitted = {
                    let mut registry = self.registry.write();
                    dispatch_event(&self.display, &self.atoms, &mut registry, &event)?
                };
                self.forward_events(emitted)?;
            }
        }
    }

    fn forward_events(&self, events: Vec<WindowEvent>) -> Result<()> {
        for event in events {
            debug!("Исходящее событие: {}", event);
            if self.events_tx.send(event).is_err() {
                return WintrackError::internal("канал событий закрыт потребителем");
            }
        }
        Ok(())
    }
}

impl Drop for X11WindowTracker {
    fn drop(&mut self) {
        info!("X11WindowTracker завершает работу");
    }
}

#[async_trait::async_trait]
impl WindowTrackerTrait for X11WindowTracker {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run().await
    }
}
