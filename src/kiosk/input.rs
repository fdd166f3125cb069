//! Operator commands typed on the kiosk terminal.

use super::models::MenuChoice;
use super::runtime::KioskEvent;

pub const HELP: &str = "Befehle: 1/2 Menü wählen, x abbrechen, n Eingabe zeigen, \
h Eingabe verbergen, p <nummer> Personalnummer senden, q beenden";

/// Parses one input line. Unknown commands yield `None`.
pub fn parse_command(line: &str) -> Option<KioskEvent> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        "1" if rest.is_empty() => Some(KioskEvent::SelectMenu(MenuChoice::First)),
        "2" if rest.is_empty() => Some(KioskEvent::SelectMenu(MenuChoice::Second)),
        "x" => Some(KioskEvent::DismissChoice),
        "n" => Some(KioskEvent::ShowInput),
        "h" => Some(KioskEvent::HideInput),
        "p" if !rest.is_empty() => Some(KioskEvent::SubmitPersonalNumber(rest.to_string())),
        "q" => Some(KioskEvent::Shutdown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("1"),
            Some(KioskEvent::SelectMenu(MenuChoice::First))
        );
        assert_eq!(
            parse_command(" 2 \n"),
            Some(KioskEvent::SelectMenu(MenuChoice::Second))
        );
        assert_eq!(parse_command("X"), Some(KioskEvent::DismissChoice));
        assert_eq!(parse_command("n"), Some(KioskEvent::ShowInput));
        assert_eq!(parse_command("h"), Some(KioskEvent::HideInput));
        assert_eq!(parse_command("Q"), Some(KioskEvent::Shutdown));
        assert_eq!(
            parse_command("p   4711 "),
            Some(KioskEvent::SubmitPersonalNumber("4711".into()))
        );
    }

    #[test]
    fn test_unknown_commands() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("p"), None);
        assert_eq!(parse_command("3"), None);
        assert_eq!(parse_command("1 2"), None);
        assert_eq!(parse_command("hello"), None);
    }
}
