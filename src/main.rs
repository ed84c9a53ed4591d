use anyhow::Result;
use clap::Parser;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

mod config;
mod error;
mod events;
mod services;

use config::Config;
use services::{create_window_tracker, WindowRegistry};

#[derive(Parser, Debug)]
#[command(name = "wintrack")]
#[command(about = "Живой реестр окон X11, синхронизируемый со списком клиентов")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "wintrack.toml")]
    config: String,

    /// Режим сухого запуска (без подключения к X-серверу)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Инициализация системы логирования
    init_tracing(&args.log_level)?;

    info!("Запуск wintrack v{}", env!("CARGO_PKG_VERSION"));

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - подключение к X-серверу отключено");
    }

    // Реестр создаётся на старте и живёт до завершения процесса;
    // трекер пишет, потребители читают
    let registry = Arc::new(RwLock::new(WindowRegistry::new()));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let tracker = create_window_tracker(config.clone(), registry.clone(), events_tx, args.dry_run)?;

    info!("Все компоненты инициализированы");

    let tracker_handle = tokio::spawn(async move {
        if let Err(e) = tracker.run().await {
            error!("Ошибка в WindowTracker: {}", e);
        }
    });

    // Потребитель исходящих событий: логирует их и текущий размер реестра
    let consumer_registry = registry.clone();
    let consumer_handle = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            info!("{}", event);
            debug!("В реестре {} окон", consumer_registry.read().len());
        }
    });

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Прерываем задачи: подписки на PropertyNotify снимет сам X-сервер
    // при закрытии соединения
    tracker_handle.abort();
    consumer_handle.abort();

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = tracker_handle.await;
        let _ = consumer_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("wintrack завершил работу");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
