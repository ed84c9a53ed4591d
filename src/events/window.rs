use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор окна X11 (XID), стабилен на время жизни окна
pub type WindowId = u32;

/// Отслеживаемое поле записи окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowField {
    Name,
    ClassName,
    BinName,
    IcccmState,
    Transient,
    NetState,
}

impl fmt::Display for WindowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WindowField::Name => "name",
            WindowField::ClassName => "class",
            WindowField::BinName => "bin",
            WindowField::IcccmState => "icccm-state",
            WindowField::Transient => "transient",
            WindowField::NetState => "ewmh-state",
        };
        write!(f, "{}", s)
    }
}

/// Изменение свойства корневого окна, не затрагивающее реестр
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootActivity {
    ActiveWindow,
    ShowingDesktop,
    ToppedApplication,
}

impl fmt::Display for RootActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RootActivity::ActiveWindow => "active window changed",
            RootActivity::ShowingDesktop => "desktop showing state toggled",
            RootActivity::ToppedApplication => "topped application changed",
        };
        write!(f, "{}", s)
    }
}

/// Тип события реестра окон
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEventKind {
    Added {
        xid: WindowId,
        name: Option<String>,
    },
    Removed {
        xid: WindowId,
        name: Option<String>,
    },
    FieldChanged {
        xid: WindowId,
        field: WindowField,
        old: Option<String>,
        new: Option<String>,
    },
    RootChanged {
        activity: RootActivity,
    },
}

/// Событие реестра окон — единственная исходящая поверхность ядра
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEvent {
    pub kind: WindowEventKind,
    pub timestamp: std::time::Instant,
}

impl WindowEvent {
    pub fn new(kind: WindowEventKind) -> Self {
        Self {
            kind,
            timestamp: std::time::Instant::now(),
        }
    }

    pub fn added(xid: WindowId, name: Option<String>) -> Self {
        Self::new(WindowEventKind::Added { xid, name })
    }

    pub fn removed(xid: WindowId, name: Option<String>) -> Self {
        Self::new(WindowEventKind::Removed { xid, name })
    }

    pub fn field_changed(
        xid: WindowId,
        field: WindowField,
        old: Option<String>,
        new: Option<String>,
    ) -> Self {
        Self::new(WindowEventKind::FieldChanged {
            xid,
            field,
            old,
            new,
        })
    }

    pub fn root_changed(activity: RootActivity) -> Self {
        Self::new(WindowEventKind::RootChanged { activity })
    }
}

fn name_or_unknown(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("Unknown")
}

impl fmt::Display for WindowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WindowEventKind::Added { xid, name } => {
                write!(f, "@@ Adding window: xid 0x{:x}, name '{}'", xid, name_or_unknown(name))
            }
            WindowEventKind::Removed { xid, name } => {
                write!(f, "@@ Removing window: xid 0x{:x}, name '{}'", xid, name_or_unknown(name))
            }
            WindowEventKind::FieldChanged { xid, field, old, new } => {
                write!(
                    f,
                    "## Window 0x{:x} changed {}: '{}' -> '{}'",
                    xid,
                    field,
                    old.as_deref().unwrap_or("-"),
                    new.as_deref().unwrap_or("-"),
                )
            }
            WindowEventKind::RootChanged { activity } => {
                write!(f, "## Root: {}", activity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_constructors() {
        let event = WindowEvent::added(0x10, Some("Terminal".to_string()));
        assert_eq!(
            event.kind,
            WindowEventKind::Added {
                xid: 0x10,
                name: Some("Terminal".to_string())
            }
        );

        let event = WindowEvent::root_changed(RootActivity::ActiveWindow);
        assert_eq!(
            event.kind,
            WindowEventKind::RootChanged {
                activity: RootActivity::ActiveWindow
            }
        );
    }

    #[test]
    fn test_event_display() {
        let event = WindowEvent::added(0x10, None);
        assert_eq!(event.to_string(), "@@ Adding window: xid 0x10, name 'Unknown'");

        let event = WindowEvent::field_changed(
            0x11,
            WindowField::Name,
            Some("old".to_string()),
            Some("new".to_string()),
        );
        assert_eq!(
            event.to_string(),
            "## Window 0x11 changed name: 'old' -> 'new'"
        );
    }
}
