use crate::error::Result;
use crate::events::WindowId;
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, ChangeWindowAttributesAux, ConnectionExt, EventMask};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

/// Сырое содержимое свойства, как его вернул сервер
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    /// Фактический тип свойства; 0 (None) — свойства нет
    pub type_: Atom,
    pub format: u8,
    pub n_items: u32,
    pub bytes: Vec<u8>,
}

/// Событие дисплея, доставляемое диспетчеру
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    PropertyChanged { window: WindowId, atom: Atom },
    Other,
}

/// Граница с X-сервером: единственное место, где выполняются round trip'ы.
/// Реализуется X11Display в бою и MockDisplay в тестах.
pub trait DisplayServer: Send {
    fn root_window(&self) -> WindowId;

    /// Один конвейерный батч InternAtom: сначала все запросы, затем все ответы
    fn intern_atoms(&self, names: &[&str]) -> Result<Vec<Atom>>;

    /// Чтение свойства с ловушкой ошибок: любая ошибка на стороне сервера
    /// (чаще всего BadWindow для исчезнувшего окна) превращается в None
    fn get_property(&self, window: WindowId, prop: Atom, type_: Atom) -> Option<RawProperty>;

    /// Подписка на PropertyNotify окна. Ok(false) — сервер отверг подписку
    /// (окно уже исчезло), Err — проблема соединения
    fn watch_properties(&self, window: WindowId) -> Result<bool>;

    /// Снятие подписки; безопасно для уже исчезнувшего окна
    fn unwatch_properties(&self, window: WindowId);

    fn poll_event(&self) -> Result<Option<DisplayEvent>>;
}

pub struct X11Display {
    conn: RustConnection,
    root: WindowId,
}

impl X11Display {
    pub fn connect(display_name: Option<&str>) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(display_name)?;
        let root = conn.setup().roots[screen_num].root;
        debug!("Подключились к X-серверу, экран {}, root 0x{:x}", screen_num, root);
        Ok(Self { conn, root })
    }
}

impl DisplayServer for X11Display {
    fn root_window(&self) -> WindowId {
        self.root
    }

    fn intern_atoms(&self, names: &[&str]) -> Result<Vec<Atom>> {
        let cookies = names
            .iter()
            .map(|name| self.conn.intern_atom(false, name.as_bytes()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut atoms = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            atoms.push(cookie.reply()?.atom);
        }
        Ok(atoms)
    }

    fn get_property(&self, window: WindowId, prop: Atom, type_: Atom) -> Option<RawProperty> {
        // Ловушка ошибок вокруг ровно одного round trip: окно могло исчезнуть
        // между листингом и запросом, транзакционных гарантий у протокола нет
        let cookie = self
            .conn
            .get_property(false, window, prop, type_, 0, u32::MAX)
            .ok()?;
        let reply = cookie.reply().ok()?;

        Some(RawProperty {
            type_: reply.type_,
            format: reply.format,
            n_items: reply.value_len,
            bytes: reply.value,
        })
    }

    fn watch_properties(&self, window: WindowId) -> Result<bool> {
        let aux = ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE);
        let cookie = self.conn.change_window_attributes(window, &aux)?;

        // check() форсирует round trip: для исчезнувшего окна придёт BadWindow
        match cookie.check() {
            Ok(()) => Ok(true),
            Err(x11rb::errors::ReplyError::X11Error(err)) => {
                debug!("Подписка на 0x{:x} отвергнута сервером: {:?}", window, err.error_kind);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn unwatch_properties(&self, window: WindowId) {
        let aux = ChangeWindowAttributesAux::new().event_mask(EventMask::NO_EVENT);
        if let Ok(cookie) = self.conn.change_window_attributes(window, &aux) {
            // Окно может быть уже уничтожено — ошибка здесь не интересна
            let _ = cookie.check();
        }
    }

    fn poll_event(&self) -> Result<Option<DisplayEvent>> {
        match self.conn.poll_for_event()? {
            Some(Event::PropertyNotify(ev)) => Ok(Some(DisplayEvent::PropertyChanged {
                window: ev.window,
                atom: ev.atom,
            })),
            Some(_) => Ok(Some(DisplayEvent::Other)),
            None => Ok(None),
        }
    }
}
