//! MockDisplay: скриптуемая реализация DisplayServer для юнит-тестов.
//! Свойства задаются заранее, ошибки сервера и отказы подписки имитируются
//! по списку, количество round trip'ов подсчитывается.

use crate::error::Result;
use crate::events::WindowId;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use x11rb::protocol::xproto::{Atom, AtomEnum};

use super::display::{DisplayEvent, DisplayServer, RawProperty};

pub struct MockDisplay {
    root: WindowId,
    atoms: RefCell<HashMap<String, Atom>>,
    properties: RefCell<HashMap<(WindowId, Atom), RawProperty>>,
    failing: RefCell<HashSet<(WindowId, Atom)>>,
    watch_refused: RefCell<HashSet<WindowId>>,
    pub watched: RefCell<Vec<WindowId>>,
    pub unwatched: RefCell<Vec<WindowId>>,
    pub fetch_count: Cell<usize>,
}

impl MockDisplay {
    pub fn new(root: WindowId) -> Self {
        Self {
            root,
            atoms: RefCell::new(HashMap::new()),
            properties: RefCell::new(HashMap::new()),
            failing: RefCell::new(HashSet::new()),
            watch_refused: RefCell::new(HashSet::new()),
            watched: RefCell::new(Vec::new()),
            unwatched: RefCell::new(Vec::new()),
            fetch_count: Cell::new(0),
        }
    }

    pub fn set_raw(&self, window: WindowId, prop: Atom, raw: RawProperty) {
        self.properties.borrow_mut().insert((window, prop), raw);
    }

    /// Текстовое свойство типа STRING (WM_NAME)
    pub fn set_text(&self, window: WindowId, prop: Atom, value: &str) {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        let n_items = bytes.len() as u32;
        self.set_raw(
            window,
            prop,
            RawProperty {
                type_: u32::from(AtomEnum::STRING),
                format: 8,
                n_items,
                bytes,
            },
        );
    }

    /// Пара строк WM_CLASS (instance, class)
    pub fn set_text_pair(&self, window: WindowId, prop: Atom, instance: &str, class: &str) {
        let mut bytes = instance.as_bytes().to_vec();
        bytes.push(0);
        bytes.extend_from_slice(class.as_bytes());
        bytes.push(0);
        let n_items = bytes.len() as u32;
        self.set_raw(
            window,
            prop,
            RawProperty {
                type_: u32::from(AtomEnum::STRING),
                format: 8,
                n_items,
                bytes,
            },
        );
    }

    /// Список идентификаторов окон (тип WINDOW, формат 32)
    pub fn set_window_list(&self, window: WindowId, prop: Atom, xids: &[WindowId]) {
        let bytes: Vec<u8> = xids.iter().flat_map(|xid| xid.to_ne_bytes()).collect();
        self.set_raw(
            window,
            prop,
            RawProperty {
                type_: u32::from(AtomEnum::WINDOW),
                format: 32,
                n_items: xids.len() as u32,
                bytes,
            },
        );
    }

    /// 32-битные значения произвольного типа (WM_STATE, _NET_WM_STATE)
    pub fn set_values32(&self, window: WindowId, prop: Atom, type_: Atom, values: &[u32]) {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        self.set_raw(
            window,
            prop,
            RawProperty {
                type_,
                format: 32,
                n_items: values.len() as u32,
                bytes,
            },
        );
    }

    pub fn remove_property(&self, window: WindowId, prop: Atom) {
        self.properties.borrow_mut().remove(&(window, prop));
    }

    /// Имитировать ошибку сервера при чтении конкретного свойства
    pub fn fail_property(&self, window: WindowId, prop: Atom) {
        self.failing.borrow_mut().insert((window, prop));
    }

    /// Имитировать BadWindow на подписке (окно исчезло до add)
    pub fn refuse_watch(&self, window: WindowId) {
        self.watch_refused.borrow_mut().insert(window);
    }
}

impl DisplayServer for MockDisplay {
    fn root_window(&self) -> WindowId {
        self.root
    }

    fn intern_atoms(&self, names: &[&str]) -> Result<Vec<Atom>> {
        let mut atoms = self.atoms.borrow_mut();
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let next = 100 + atoms.len() as Atom;
            let atom = *atoms.entry((*name).to_string()).or_insert(next);
            out.push(atom);
        }
        Ok(out)
    }

    fn get_property(&self, window: WindowId, prop: Atom, type_: Atom) -> Option<RawProperty> {
        self.fetch_count.set(self.fetch_count.get() + 1);

        if self.failing.borrow().contains(&(window, prop)) {
            return None;
        }

        let properties = self.properties.borrow();
        let raw = match properties.get(&(window, prop)) {
            Some(raw) => raw.clone(),
            // Отсутствующее свойство: сервер отвечает type None и пустым телом
            None => RawProperty {
                type_: 0,
                format: 0,
                n_items: 0,
                bytes: Vec::new(),
            },
        };

        // Как XGetWindowProperty: при несовпадении запрошенного типа тело не выдаётся
        if type_ != 0 && raw.type_ != 0 && raw.type_ != type_ {
            return Some(RawProperty {
                type_: raw.type_,
                format: raw.format,
                n_items: 0,
                bytes: Vec::new(),
            });
        }

        Some(raw)
    }

    fn watch_properties(&self, window: WindowId) -> Result<bool> {
        if self.watch_refused.borrow().contains(&window) {
            return Ok(false);
        }
        self.watched.borrow_mut().push(window);
        Ok(true)
    }

    fn unwatch_properties(&self, window: WindowId) {
        self.unwatched.borrow_mut().push(window);
    }

    fn poll_event(&self) -> Result<Option<DisplayEvent>> {
        // Тесты подают DisplayEvent напрямую в диспетчер
        Ok(None)
    }
}
