use crate::error::Result;
use crate::events::WindowId;
use bitflags::bitflags;
use std::collections::HashMap;
use tracing::{debug, error};
use x11rb::protocol::xproto::AtomEnum;

use super::atoms::AtomTable;
use super::display::DisplayServer;
use super::property::fetch_validated;

/// ICCCM WM_STATE: NormalState = 1, IconicState = 3
pub const ICCCM_STATE_ICONIC: u32 = 3;

bitflags! {
    /// Маска полей записи для (пере)синхронизации
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyncFields: u32 {
        const NAME        = 1 << 1;
        const CLASS       = 1 << 2;
        const TRANSIENT   = 1 << 3;
        const ICCCM_STATE = 1 << 4;
        const NET_STATE   = 1 << 5;
    }
}

/// Запись об одном отслеживаемом окне
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub xid: WindowId,
    pub name: Option<String>,
    pub bin_name: Option<String>,
    pub class_name: Option<String>,
    pub transient_for: Option<WindowId>,

    // Флаги по умолчанию false; для is_killable и shows_startup_banner
    // источника синхронизации нет (см. DESIGN.md)
    #[allow(dead_code)]
    pub is_killable: bool,
    pub is_minimised: bool,
    pub is_modal: bool,
    #[allow(dead_code)]
    pub shows_startup_banner: bool,
}

impl WindowRecord {
    pub fn new(xid: WindowId) -> Self {
        Self {
            xid,
            name: None,
            bin_name: None,
            class_name: None,
            transient_for: None,
            is_killable: false,
            is_minimised: false,
            is_modal: false,
            shows_startup_banner: false,
        }
    }

    /// Пересинхронизировать указанные поля из свойств окна. Недоступное
    /// или некорректное свойство сбрасывает поле — частичного доверия нет.
    pub fn sync(&mut self, display: &dyn DisplayServer, atoms: &AtomTable, fields: SyncFields) {
        if fields.contains(SyncFields::NAME) {
            self.name = fetch_validated(
                display,
                self.xid,
                atoms.wm_name,
                u32::from(AtomEnum::STRING),
                8,
                0,
            )
            .and_then(|data| data.text());
        }

        if fields.contains(SyncFields::CLASS) {
            let pair = fetch_validated(
                display,
                self.xid,
                atoms.wm_class,
                u32::from(AtomEnum::STRING),
                8,
                0,
            )
            .map(|data| data.text_pair());

            match pair {
                Some((bin, class)) => {
                    self.bin_name = bin;
                    self.class_name = class;
                }
                None => {
                    self.bin_name = None;
                    self.class_name = None;
                }
            }
        }

        if fields.contains(SyncFields::TRANSIENT) {
            self.transient_for = fetch_validated(
                display,
                self.xid,
                atoms.wm_transient_for,
                u32::from(AtomEnum::WINDOW),
                32,
                1,
            )
            .and_then(|data| data.first32());
        }

        if fields.contains(SyncFields::ICCCM_STATE) {
            // WM_STATE типизировано собственным атомом; состояние — первый элемент
            self.is_minimised = fetch_validated(display, self.xid, atoms.wm_state, atoms.wm_state, 32, 0)
                .and_then(|data| data.first32())
                .map(|state| state == ICCCM_STATE_ICONIC)
                .unwrap_or(false);
        }

        if fields.contains(SyncFields::NET_STATE) {
            self.is_modal = fetch_validated(
                display,
                self.xid,
                atoms.net_wm_state,
                u32::from(AtomEnum::ATOM),
                32,
                0,
            )
            .map(|data| data.value32().contains(&atoms.net_wm_state_modal))
            .unwrap_or(false);
        }
    }
}

/// Реестр отслеживаемых окон: xid -> запись. Владеет жизненным циклом
/// записей; мутируется только reconciler'ом и диспетчером событий.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, WindowRecord>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
        }
    }

    /// Добавить окно: полная синхронизация всех полей, затем подписка на
    /// PropertyNotify. Всё-или-ничего: отказ подписки (окно уже исчезло)
    /// отбрасывает запись целиком, в реестр ничего не попадает — Ok(None).
    pub fn add(
        &mut self,
        display: &dyn DisplayServer,
        atoms: &AtomTable,
        xid: WindowId,
    ) -> Result<Option<&WindowRecord>> {
        if self.windows.contains_key(&xid) {
            // Reconciler гарантирует уникальность; повторный add — логическая ошибка
            error!("Повторный add для уже отслеживаемого окна 0x{:x}", xid);
            return Ok(None);
        }

        let mut record = WindowRecord::new(xid);
        record.sync(display, atoms, SyncFields::all());

        if !display.watch_properties(xid)? {
            debug!("*** Отменяем add для 0x{:x}: окно уже исчезло ***", xid);
            return Ok(None);
        }

        Ok(Some(self.windows.entry(xid).or_insert(record)))
    }

    /// Убрать окно из реестра, сняв подписку. Идемпотентно: отсутствующий
    /// xid — no-op.
    pub fn remove(&mut self, display: &dyn DisplayServer, xid: WindowId) -> Option<WindowRecord> {
        let record = self.windows.remove(&xid)?;
        display.unwatch_properties(xid);
        Some(record)
    }

    pub fn lookup(&self, xid: WindowId) -> Option<&WindowRecord> {
        self.windows.get(&xid)
    }

    pub fn lookup_mut(&mut self, xid: WindowId) -> Option<&mut WindowRecord> {
        self.windows.get_mut(&xid)
    }

    pub fn contains(&self, xid: WindowId) -> bool {
        self.windows.contains_key(&xid)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn xids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }
}
