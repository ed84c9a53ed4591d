use crate::error::Result;
use crate::events::{RootActivity, WindowEvent, WindowField, WindowId};
use tracing::debug;
use x11rb::protocol::xproto::Atom;

use super::atoms::AtomTable;
use super::display::{DisplayEvent, DisplayServer};
use super::reconcile::process_client_list;
use super::registry::{SyncFields, WindowRecord, WindowRegistry};

/// Маршрутизация одного события дисплея.
///
/// Не-property события отбрасываются первыми, до любых проверок. Дальше
/// два контекста: свойства корневого окна (сверка списка клиентов либо
/// информационное уведомление) и свойства отслеживаемых окон (точечная
/// пересинхронизация одного поля).
pub fn dispatch_event(
    display: &dyn DisplayServer,
    atoms: &AtomTable,
    registry: &mut WindowRegistry,
    event: &DisplayEvent,
) -> Result<Vec<WindowEvent>> {
    let (window, atom) = match event {
        DisplayEvent::PropertyChanged { window, atom } => (*window, *atom),
        DisplayEvent::Other => return Ok(Vec::new()),
    };

    if window == display.root_window() {
        return dispatch_root(display, atoms, registry, atom);
    }

    // Дешёвое сравнение атомов до предположительно более дорогого
    // поиска в реестре
    if !atoms.is_tracked(atom) {
        return Ok(Vec::new());
    }

    let Some(record) = registry.lookup_mut(window) else {
        // Окно не отслеживается: ещё не попало в список клиентов или уже ушло
        return Ok(Vec::new());
    };

    Ok(resync_field(display, atoms, record, atom))
}

fn dispatch_root(
    display: &dyn DisplayServer,
    atoms: &AtomTable,
    registry: &mut WindowRegistry,
    atom: Atom,
) -> Result<Vec<WindowEvent>> {
    if atom == atoms.net_client_list {
        return process_client_list(display, atoms, registry);
    }

    let activity = if atom == atoms.net_active_window {
        Some(RootActivity::ActiveWindow)
    } else if atom == atoms.net_showing_desktop {
        Some(RootActivity::ShowingDesktop)
    } else if atom == atoms.mb_current_app_window {
        Some(RootActivity::ToppedApplication)
    } else {
        None
    };

    Ok(activity
        .map(WindowEvent::root_changed)
        .into_iter()
        .collect())
}

/// Точечная пересинхронизация: перечитывается только поле, затронутое
/// изменившимся свойством, и на каждое реально изменившееся значение
/// выпускается событие (xid, поле, старое, новое).
fn resync_field(
    display: &dyn DisplayServer,
    atoms: &AtomTable,
    record: &mut WindowRecord,
    atom: Atom,
) -> Vec<WindowEvent> {
    let xid = record.xid;
    let mut events = Vec::new();

    if atom == atoms.wm_name {
        let old = record.name.clone();
        record.sync(display, atoms, SyncFields::NAME);
        push_if_changed(&mut events, xid, WindowField::Name, old, record.name.clone());
    } else if atom == atoms.wm_class {
        let old_bin = record.bin_name.clone();
        let old_class = record.class_name.clone();
        record.sync(display, atoms, SyncFields::CLASS);
        push_if_changed(&mut events, xid, WindowField::BinName, old_bin, record.bin_name.clone());
        push_if_changed(
            &mut events,
            xid,
            WindowField::ClassName,
            old_class,
            record.class_name.clone(),
        );
    } else if atom == atoms.wm_transient_for {
        let old = record.transient_for;
        record.sync(display, atoms, SyncFields::TRANSIENT);
        push_if_changed(
            &mut events,
            xid,
            WindowField::Transient,
            old.map(fmt_xid),
            record.transient_for.map(fmt_xid),
        );
    } else if atom == atoms.wm_state {
        let old = record.is_minimised;
        record.sync(display, atoms, SyncFields::ICCCM_STATE);
        push_if_changed(
            &mut events,
            xid,
            WindowField::IcccmState,
            Some(fmt_icccm(old)),
            Some(fmt_icccm(record.is_minimised)),
        );
    } else if atom == atoms.net_wm_state {
        let old = record.is_modal;
        record.sync(display, atoms, SyncFields::NET_STATE);
        push_if_changed(
            &mut events,
            xid,
            WindowField::NetState,
            Some(fmt_modal(old)),
            Some(fmt_modal(record.is_modal)),
        );
    }

    if events.is_empty() {
        debug!("Свойство окна 0x{:x} перечитано без изменений", xid);
    }

    events
}

fn push_if_changed(
    events: &mut Vec<WindowEvent>,
    xid: WindowId,
    field: WindowField,
    old: Option<String>,
    new: Option<String>,
) {
    if old != new {
        events.push(WindowEvent::field_changed(xid, field, old, new));
    }
}

fn fmt_xid(xid: WindowId) -> String {
    format!("0x{:x}", xid)
}

fn fmt_icccm(minimised: bool) -> String {
    if minimised { "iconic" } else { "normal" }.to_string()
}

fn fmt_modal(modal: bool) -> String {
    if modal { "modal" } else { "non-modal" }.to_string()
}
