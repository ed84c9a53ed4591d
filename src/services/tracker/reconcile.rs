use crate::error::Result;
use crate::events::{WindowEvent, WindowId};
use std::collections::HashSet;
use tracing::debug;
use x11rb::protocol::xproto::AtomEnum;

use super::atoms::AtomTable;
use super::display::DisplayServer;
use super::property::fetch_validated;
use super::registry::WindowRegistry;

/// Сверка реестра с авторитетным списком клиентов корневого окна.
///
/// Неудачное чтение _NET_CLIENT_LIST ничего не меняет: «список недоступен
/// в этом раунде» — не то же самое, что «список пуст». Успешный ответ с
/// нулём элементов, напротив, легитимно опустошает реестр. Следующее
/// PropertyNotify по списку — естественная повторная попытка.
pub fn process_client_list(
    display: &dyn DisplayServer,
    atoms: &AtomTable,
    registry: &mut WindowRegistry,
) -> Result<Vec<WindowEvent>> {
    let list = match fetch_validated(
        display,
        display.root_window(),
        atoms.net_client_list,
        u32::from(AtomEnum::WINDOW),
        32,
        0, // длина списка не ограничена — читаем целиком
    ) {
        Some(data) => data.value32(),
        None => {
            debug!("_NET_CLIENT_LIST недоступен — пропускаем раунд сверки");
            return Ok(Vec::new());
        }
    };

    let mut events = Vec::new();
    let listed: HashSet<WindowId> = list.iter().copied().collect();

    // Окна реестра, исчезнувшие из списка клиентов
    for xid in registry.xids() {
        if !listed.contains(&xid) {
            if let Some(record) = registry.remove(display, xid) {
                events.push(WindowEvent::removed(xid, record.name));
            }
        }
    }

    // Новые окна из списка
    for xid in list {
        if !registry.contains(xid) {
            if let Some(record) = registry.add(display, atoms, xid)? {
                events.push(WindowEvent::added(xid, record.name.clone()));
            }
        }
    }

    Ok(events)
}
