use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    OpenPicker,
    RemoveSelected,
    SelectPrev,
    SelectNext,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerCommand {
    Up,
    Down,
    Confirm,
    Close,
    Backspace,
    Type(char),
}

/// Raw mode delivers Ctrl+C as a key event instead of SIGINT.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Left | KeyCode::Up => Some(UiCommand::SelectPrev),
        KeyCode::Right | KeyCode::Down => Some(UiCommand::SelectNext),
        KeyCode::Delete => Some(UiCommand::RemoveSelected),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' | '+' => Some(UiCommand::OpenPicker),
            'x' => Some(UiCommand::RemoveSelected),
            'h' | 'k' => Some(UiCommand::SelectPrev),
            'l' | 'j' => Some(UiCommand::SelectNext),
            'q' => Some(UiCommand::Quit),
            _ => None,
        },
        _ => None,
    }
}

/// While the picker is open, letters and digits feed the search query.
pub fn parse_picker_command(key_code: &KeyCode) -> Option<PickerCommand> {
    match key_code {
        KeyCode::Up => Some(PickerCommand::Up),
        KeyCode::Down => Some(PickerCommand::Down),
        KeyCode::Enter => Some(PickerCommand::Confirm),
        KeyCode::Esc => Some(PickerCommand::Close),
        KeyCode::Backspace => Some(PickerCommand::Backspace),
        KeyCode::Char(c) if c.is_ascii_alphanumeric() => Some(PickerCommand::Type(*c)),
        _ => None,
    }
}
