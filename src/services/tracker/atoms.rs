use crate::error::{Result, WintrackError};
use tracing::debug;
use x11rb::protocol::xproto::Atom;

use super::display::DisplayServer;

/// Закрытый набор имён свойств, которыми оперирует ядро.
/// Порядок должен совпадать с порядком полей в AtomTable::intern.
pub const ATOM_NAMES: [&str; 10] = [
    "WM_CLASS", // ICCCM
    "WM_NAME",
    "WM_STATE",
    "WM_TRANSIENT_FOR",
    "_NET_WM_STATE", // EWMH
    "_NET_WM_STATE_MODAL",
    "_NET_SHOWING_DESKTOP",
    "_NET_ACTIVE_WINDOW",
    "_NET_CLIENT_LIST",
    "_MB_CURRENT_APP_WINDOW", // Matchbox
];

/// Таблица атомов: заполняется один раз на старте, дальше только чтение
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomTable {
    pub wm_class: Atom,
    pub wm_name: Atom,
    pub wm_state: Atom,
    pub wm_transient_for: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_modal: Atom,
    pub net_showing_desktop: Atom,
    pub net_active_window: Atom,
    pub net_client_list: Atom,
    pub mb_current_app_window: Atom,
}

impl AtomTable {
    /// Разрешить весь набор имён одним батчем. Неудача фатальна: без
    /// атомов ядру нечем адресовать свойства. Сервер создаёт неизвестные
    /// атомы по требованию, поэтому "не поддерживается" здесь не ловится.
    pub fn intern(display: &dyn DisplayServer) -> Result<Self> {
        let atoms = display.intern_atoms(&ATOM_NAMES)?;

        if atoms.len() != ATOM_NAMES.len() {
            return WintrackError::internal(format!(
                "Сервер вернул {} атомов вместо {}",
                atoms.len(),
                ATOM_NAMES.len()
            ));
        }

        debug!("Разрешено {} атомов одним батчем", atoms.len());

        Ok(Self {
            wm_class: atoms[0],
            wm_name: atoms[1],
            wm_state: atoms[2],
            wm_transient_for: atoms[3],
            net_wm_state: atoms[4],
            net_wm_state_modal: atoms[5],
            net_showing_desktop: atoms[6],
            net_active_window: atoms[7],
            net_client_list: atoms[8],
            mb_current_app_window: atoms[9],
        })
    }

    /// Входит ли атом в отслеживаемый для окон набор. Дешёвая проверка,
    /// выполняемая до поиска в реестре.
    pub fn is_tracked(&self, atom: Atom) -> bool {
        atom == self.wm_class
            || atom == self.wm_name
            || atom == self.wm_state
            || atom == self.wm_transient_for
            || atom == self.net_wm_state
    }
}
