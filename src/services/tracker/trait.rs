use crate::config::Config;
use crate::error::Result;
use crate::events::WindowEvent;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::registry::WindowRegistry;

/// Trait for window trackers that can run in different modes
#[async_trait::async_trait]
pub trait WindowTrackerTrait {
    /// Run the window tracker
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate window tracker based on the dry_run flag
pub fn create_window_tracker(
    config: Arc<Config>,
    registry: Arc<RwLock<WindowRegistry>>,
    events_tx: mpsc::UnboundedSender<WindowEvent>,
    dry_run: bool,
) -> Result<Box<dyn WindowTrackerTrait + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_run::DryRunTracker::new(events_tx)))
    } else {
        Ok(Box::new(super::tracker::X11WindowTracker::new(
            config, registry, events_tx,
        )?))
    }
}
