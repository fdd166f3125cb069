//! Output side of the kiosk.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::{debug, info};

use super::models::{MenuView, StatusMessage};
use super::texts;

/// Everything the controller can change on screen.
pub trait KioskDisplay: Send + Sync + 'static {
    fn show_status(&self, status: &StatusMessage);
    fn hide_status(&self);
    /// Opens the choice overlay with the two menu names.
    fn show_menu_choice(&self, menu1: &str, menu2: &str);
    fn hide_menu_choice(&self);
    fn render_menu(&self, view: &MenuView);
    fn set_input_visible(&self, visible: bool);
}

/// Prints the kiosk screen to stdout.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    // Menu refreshes repeat every few seconds; only changes are printed.
    last_menu: Mutex<Option<MenuView>>,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        // A closed stdout only loses screen output.
        let _ = writeln!(stdout, "{text}");
        let _ = stdout.flush();
    }
}

impl KioskDisplay for TerminalDisplay {
    fn show_status(&self, status: &StatusMessage) {
        info!(kind = ?status.kind, title = %status.title, "Status shown");
        let mut text = format!("[{}] {}", status.kind.icon(), status.title);
        if !status.subtitle.is_empty() {
            text.push_str("\n    ");
            text.push_str(&status.subtitle);
        }
        self.print(&text);
    }

    fn hide_status(&self) {
        debug!("Status hidden");
    }

    fn show_menu_choice(&self, menu1: &str, menu2: &str) {
        self.print(&format!(
            "Bitte Menü wählen:\n  1) {}: {menu1}\n  2) {}: {menu2}\n  x) Abbrechen",
            texts::MENU_1_LABEL,
            texts::MENU_2_LABEL
        ));
    }

    fn hide_menu_choice(&self) {
        debug!("Menu choice hidden");
    }

    fn render_menu(&self, view: &MenuView) {
        if let Ok(mut last) = self.last_menu.lock() {
            if last.as_ref() == Some(view) {
                return;
            }
            *last = Some(view.clone());
        }
        self.print(&format!("== Heute ==\n{}", view.lines().join("\n")));
    }

    fn set_input_visible(&self, visible: bool) {
        if visible {
            self.print("Personalnummer eingeben: p <nummer>");
        } else {
            debug!("Input panel hidden");
        }
    }
}
