//! Headless driver for the touch-screen registration kiosk.
//!
//! The kiosk registers people for today's lunch either by RFID card or by a
//! typed personal number. When two menus are offered the backend answers with
//! a pending choice, which the kiosk resolves through a choice overlay.
//!
//! [`KioskController`] holds the registration state machine,
//! [`KioskRuntime`] owns it and drives it from the RFID ticker, the menu
//! ticker and operator events, one at a time.

pub mod api;
mod controller;
pub mod display;
mod errors;
pub mod input;
pub mod models;
mod runtime;
mod session;

pub use api::{CardRegistration, HttpKioskApi, KioskApi, PersonalNumberRegistration};
pub use controller::KioskController;
pub use display::{KioskDisplay, TerminalDisplay};
pub use errors::{KioskError, KioskResult};
pub use models::{MenuChoice, MenuSnapshot, MenuView, StatusKind, StatusMessage};
pub use runtime::{KioskEvent, KioskHandle, KioskRuntime};
pub use session::MenuChoiceSession;

/// Operator-facing texts shown on the kiosk.
pub mod texts {
    pub const MENU_1_LABEL: &str = "Menü 1";
    pub const MENU_2_LABEL: &str = "Menü 2";
    pub const MENU_NOT_SET: &str = "Nicht gesetzt";
    pub const NO_MENU: &str = "Kein Menü verfügbar";
    pub const REGISTERED: &str = "Angemeldet!";
    pub const UNREGISTERED: &str = "Abgemeldet";
    pub const ERROR_TITLE: &str = "Fehler";
    pub const NUMBER_NOT_FOUND: &str = "Personalnummer nicht gefunden";
    pub const REGISTRATION_FAILED: &str = "Anmeldung fehlgeschlagen";
    pub const MENU_UNAVAILABLE: &str = "Menü konnte nicht geladen werden";
}
