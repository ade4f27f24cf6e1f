//! Platform-agnostic input event types.
//!
//! Every backend maps its native input to this enum. The core never
//! sees raw platform input, and backends drop anything the shell does not
//! react to.

/// A platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse wheel moved. Positive `dy` means the wheel was turned away
    /// from the user (content should move down / scroll toward the top).
    Wheel { dx: i32, dy: i32 },
    /// Text typed on a physical keyboard. May hold more than one char
    /// when an input method commits a composed string.
    TextInput(String),
    /// Backspace / delete-left.
    Backspace,
    /// Enter / Return: navigate to the typed URL.
    Confirm,
    /// User requested quit (window close, etc.).
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_event_fields() {
        let e = InputEvent::Wheel { dx: 0, dy: -3 };
        if let InputEvent::Wheel { dx, dy } = e {
            assert_eq!(dx, 0);
            assert_eq!(dy, -3);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn text_input_holds_composed_string() {
        let e = InputEvent::TextInput("é".to_string());
        assert_eq!(e, InputEvent::TextInput("é".into()));
    }

    #[test]
    fn all_event_variants_distinct() {
        let events = vec![
            InputEvent::Wheel { dx: 0, dy: 0 },
            InputEvent::TextInput("x".into()),
            InputEvent::Backspace,
            InputEvent::Confirm,
            InputEvent::Quit,
        ];
        for (i, a) in events.iter().enumerate() {
            for (j, b) in events.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "variants {i} and {j} should differ");
                }
            }
        }
    }
}
