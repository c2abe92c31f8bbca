use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tickerboard::input::{
    is_interrupt, parse_main_command, parse_picker_command, PickerCommand, UiCommand,
};

#[test]
fn parse_main_command_maps_case_insensitive_char_keys() {
    assert_eq!(parse_main_command(&KeyCode::Char('a')), Some(UiCommand::OpenPicker));
    assert_eq!(parse_main_command(&KeyCode::Char('A')), Some(UiCommand::OpenPicker));
    assert_eq!(
        parse_main_command(&KeyCode::Char('X')),
        Some(UiCommand::RemoveSelected)
    );
    assert_eq!(parse_main_command(&KeyCode::Char('q')), Some(UiCommand::Quit));
    assert_eq!(parse_main_command(&KeyCode::Char('z')), None);
}

#[test]
fn parse_main_command_maps_navigation_keys() {
    assert_eq!(parse_main_command(&KeyCode::Left), Some(UiCommand::SelectPrev));
    assert_eq!(parse_main_command(&KeyCode::Char('l')), Some(UiCommand::SelectNext));
    assert_eq!(
        parse_main_command(&KeyCode::Delete),
        Some(UiCommand::RemoveSelected)
    );
}

#[test]
fn parse_picker_command_routes_letters_to_search() {
    assert_eq!(
        parse_picker_command(&KeyCode::Char('q')),
        Some(PickerCommand::Type('q'))
    );
    assert_eq!(parse_picker_command(&KeyCode::Enter), Some(PickerCommand::Confirm));
    assert_eq!(parse_picker_command(&KeyCode::Esc), Some(PickerCommand::Close));
    assert_eq!(
        parse_picker_command(&KeyCode::Backspace),
        Some(PickerCommand::Backspace)
    );
    assert_eq!(parse_picker_command(&KeyCode::Char(' ')), None);
}

#[test]
/// Verifies Ctrl+C is recognized as an interrupt while plain 'c' is not,
/// so it quits even with the picker open.
fn ctrl_c_key_event_is_interrupt() {
    assert!(is_interrupt(&KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL
    )));
    assert!(is_interrupt(&KeyEvent::new(
        KeyCode::Char('C'),
        KeyModifiers::CONTROL | KeyModifiers::SHIFT
    )));
    assert!(!is_interrupt(&KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::NONE
    )));
    assert!(!is_interrupt(&KeyEvent::new(
        KeyCode::Char('x'),
        KeyModifiers::CONTROL
    )));
}
