use crate::events::WindowId;
use x11rb::protocol::xproto::Atom;

use super::display::DisplayServer;

/// Проверенное содержимое свойства. Владеет байтами ответа.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyData {
    pub format: u8,
    pub n_items: u32,
    bytes: Vec<u8>,
}

/// Проверенное чтение одного свойства одного окна за один round trip.
///
/// Валидация по порядку: ответ получен (ошибки сервера перехвачены на
/// границе DisplayServer), тип совпал с запрошенным, свойство существует,
/// формат совпал (если expected_format != 0), количество элементов
/// совпало (если expected_n_items != 0). Любое несовпадение — None:
/// неожиданным данным не доверяем даже частично, для вызывающего это
/// неотличимо от отсутствия свойства.
pub fn fetch_validated(
    display: &dyn DisplayServer,
    window: WindowId,
    prop: Atom,
    type_: Atom,
    expected_format: u8,
    expected_n_items: u32,
) -> Option<PropertyData> {
    let raw = display.get_property(window, prop, type_)?;

    // type 0 в ответе означает "свойства нет"; ненулевой запрошенный тип
    // обязан совпасть с фактическим
    if raw.type_ == 0 {
        return None;
    }
    if type_ != 0 && raw.type_ != type_ {
        return None;
    }

    if expected_format != 0 && raw.format != expected_format {
        return None;
    }

    if expected_n_items != 0 && raw.n_items != expected_n_items {
        return None;
    }

    Some(PropertyData {
        format: raw.format,
        n_items: raw.n_items,
        bytes: raw.bytes,
    })
}

impl PropertyData {
    /// 32-битные элементы свойства (идентификаторы окон, атомы, значения)
    pub fn value32(&self) -> Vec<u32> {
        self.bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    /// Первый 32-битный элемент
    pub fn first32(&self) -> Option<u32> {
        self.value32().first().copied()
    }

    /// Текстовое свойство: байты до первого NUL
    pub fn text(&self) -> Option<String> {
        if self.format != 8 {
            return None;
        }
        let end = self.bytes.iter().position(|&b| b == 0).unwrap_or(self.bytes.len());
        if end == 0 {
            return None;
        }
        Some(String::from_utf8_lossy(&self.bytes[..end]).into_owned())
    }

    /// Пара NUL-терминированных строк (WM_CLASS: instance, class)
    pub fn text_pair(&self) -> (Option<String>, Option<String>) {
        if self.format != 8 {
            return (None, None);
        }
        let mut parts = self
            .bytes
            .split(|&b| b == 0)
            .filter(|part| !part.is_empty())
            .map(|part| String::from_utf8_lossy(part).into_owned());
        (parts.next(), parts.next())
    }
}

#[cfg(test)]
mod tests {
    use super::super::display::RawProperty;
    use super::super::mock::MockDisplay;
    use super::*;
    use x11rb::protocol::xproto::AtomEnum;

    const PROP: Atom = 200;
    const WIN: WindowId = 0x10;

    fn string_atom() -> Atom {
        u32::from(AtomEnum::STRING)
    }

    #[test]
    fn test_fetch_ok() {
        let display = MockDisplay::new(0x1);
        display.set_raw(
            WIN,
            PROP,
            RawProperty {
                type_: string_atom(),
                format: 8,
                n_items: 5,
                bytes: b"hello\0".to_vec(),
            },
        );

        let data = fetch_validated(&display, WIN, PROP, string_atom(), 8, 0).unwrap();
        assert_eq!(data.text(), Some("hello".to_string()));
    }

    #[test]
    fn test_fetch_format_mismatch_is_not_found() {
        let display = MockDisplay::new(0x1);
        display.set_raw(
            WIN,
            PROP,
            RawProperty {
                type_: string_atom(),
                format: 8,
                n_items: 5,
                bytes: b"hello\0".to_vec(),
            },
        );

        assert!(fetch_validated(&display, WIN, PROP, string_atom(), 32, 0).is_none());
    }

    #[test]
    fn test_fetch_count_mismatch_is_not_found() {
        let display = MockDisplay::new(0x1);
        display.set_raw(
            WIN,
            PROP,
            RawProperty {
                type_: u32::from(AtomEnum::WINDOW),
                format: 32,
                n_items: 2,
                bytes: vec![0; 8],
            },
        );

        assert!(fetch_validated(&display, WIN, PROP, u32::from(AtomEnum::WINDOW), 32, 1).is_none());
    }

    #[test]
    fn test_fetch_type_mismatch_is_not_found() {
        let display = MockDisplay::new(0x1);
        display.set_raw(
            WIN,
            PROP,
            RawProperty {
                type_: u32::from(AtomEnum::CARDINAL),
                format: 32,
                n_items: 1,
                bytes: vec![0; 4],
            },
        );

        assert!(fetch_validated(&display, WIN, PROP, u32::from(AtomEnum::WINDOW), 32, 0).is_none());
    }

    #[test]
    fn test_fetch_server_error_is_not_found() {
        let display = MockDisplay::new(0x1);
        // Свойство не задано вовсе — эквивалент исчезнувшего окна
        assert!(fetch_validated(&display, WIN, PROP, string_atom(), 8, 0).is_none());
    }

    #[test]
    fn test_empty_list_is_distinct_from_failure() {
        let display = MockDisplay::new(0x1);
        display.set_raw(
            WIN,
            PROP,
            RawProperty {
                type_: u32::from(AtomEnum::WINDOW),
                format: 32,
                n_items: 0,
                bytes: Vec::new(),
            },
        );

        // Пустой список — успешный ответ с нулём элементов, не None
        let data = fetch_validated(&display, WIN, PROP, u32::from(AtomEnum::WINDOW), 32, 0).unwrap();
        assert_eq!(data.n_items, 0);
        assert!(data.value32().is_empty());
    }

    #[test]
    fn test_text_pair() {
        let display = MockDisplay::new(0x1);
        display.set_raw(
            WIN,
            PROP,
            RawProperty {
                type_: string_atom(),
                format: 8,
                n_items: 13,
                bytes: b"xterm\0XTerm\0".to_vec(),
            },
        );

        let data = fetch_validated(&display, WIN, PROP, string_atom(), 8, 0).unwrap();
        assert_eq!(
            data.text_pair(),
            (Some("xterm".to_string()), Some("XTerm".to_string()))
        );
    }
}
