//! Wire types of the kiosk endpoints and the decisions derived from them.
//!
//! Replies are decoded leniently: absent or `null` fields degrade to empty
//! strings or `false` instead of failing the flow.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::texts;

/// Backend user id, sent back verbatim when a menu choice is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => UserId(n.to_string()),
            Raw::Text(s) => UserId(s),
        })
    }
}

/// One of the two menus offered when dual menus are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    First,
    Second,
}

impl MenuChoice {
    pub fn number(self) -> u8 {
        match self {
            MenuChoice::First => 1,
            MenuChoice::Second => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(MenuChoice::First),
            2 => Some(MenuChoice::Second),
            _ => None,
        }
    }
}

impl Serialize for MenuChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Warning,
    Cancel,
    Info,
}

impl StatusKind {
    /// Maps the backend's status string; unknown or missing values warn.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some("success") => StatusKind::Success,
            Some("error") => StatusKind::Error,
            Some("cancel") => StatusKind::Cancel,
            Some("info") => StatusKind::Info,
            _ => StatusKind::Warning,
        }
    }

    pub fn icon(self) -> char {
        match self {
            StatusKind::Success => '✓',
            StatusKind::Error => '✗',
            _ => '⚠',
        }
    }
}

/// A popup shown to the person at the kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub title: String,
    pub subtitle: String,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }

    pub fn error(subtitle: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, texts::ERROR_TITLE, subtitle)
    }
}

/// Two menus offered to a user who has not chosen yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChoice {
    pub user_id: UserId,
    pub menu1: String,
    pub menu2: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationDecision {
    /// Registration finished one way or another.
    Outcome(StatusMessage),
    /// The user has to pick one of two menus first.
    MenuChoice(PendingChoice),
}

/// `GET /rfid_scan`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub card_id: Option<String>,
}

impl ScanResult {
    /// The presented card, if any. An empty id counts as no card.
    pub fn card(&self) -> Option<&str> {
        self.card_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// `POST /register`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardRegistrationReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub need_menu_choice: Option<bool>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub menu1: Option<String>,
    #[serde(default)]
    pub menu2: Option<String>,
}

impl CardRegistrationReply {
    pub fn needs_menu_choice(&self) -> bool {
        self.need_menu_choice.unwrap_or(false)
    }

    /// The popup for this reply: title from `message`, subtitle from `name`.
    pub fn status(&self) -> StatusMessage {
        StatusMessage::new(
            StatusKind::from_status(self.status.as_deref()),
            self.message.clone().unwrap_or_default(),
            self.name.clone().unwrap_or_default(),
        )
    }

    pub fn decision(self) -> RegistrationDecision {
        if self.needs_menu_choice() {
            RegistrationDecision::MenuChoice(PendingChoice {
                user_id: self.user_id.unwrap_or_default(),
                menu1: self.menu1.unwrap_or_default(),
                menu2: self.menu2.unwrap_or_default(),
            })
        } else {
            RegistrationDecision::Outcome(self.status())
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /api/register`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalNumberReply {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub registered: Option<bool>,
    #[serde(default)]
    pub need_menu_choice: Option<bool>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub menu1: Option<String>,
    #[serde(default)]
    pub menu2: Option<String>,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

/// What a personal-number submission led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualDecision {
    Accepted(RegistrationDecision),
    Rejected(StatusMessage),
}

impl PersonalNumberReply {
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(false)
    }

    pub fn user_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_default()
    }

    fn rejection(&self) -> StatusMessage {
        let message = self
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| texts::NUMBER_NOT_FOUND.to_string());
        StatusMessage::error(message)
    }

    pub fn decision(self) -> ManualDecision {
        if !self.is_success() {
            return ManualDecision::Rejected(self.rejection());
        }

        if self.need_menu_choice.unwrap_or(false) {
            return ManualDecision::Accepted(RegistrationDecision::MenuChoice(PendingChoice {
                user_id: self.user_id.unwrap_or_default(),
                menu1: self.menu1.unwrap_or_default(),
                menu2: self.menu2.unwrap_or_default(),
            }));
        }

        let status = if self.registered.unwrap_or(false) {
            StatusMessage::new(StatusKind::Success, texts::REGISTERED, self.user_name())
        } else {
            StatusMessage::new(StatusKind::Warning, texts::UNREGISTERED, self.user_name())
        };
        ManualDecision::Accepted(RegistrationDecision::Outcome(status))
    }

    /// The popup after a menu was chosen for a personal number.
    pub fn choice_status(&self) -> StatusMessage {
        if self.is_success() {
            StatusMessage::new(StatusKind::Success, texts::REGISTERED, self.user_name())
        } else {
            self.rejection()
        }
    }
}

/// `GET /menu/data`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuSnapshot {
    #[serde(default)]
    pub zwei_menues_aktiv: Option<bool>,
    #[serde(default)]
    pub menu1: Option<String>,
    #[serde(default)]
    pub menu2: Option<String>,
    #[serde(default)]
    pub menu: Option<String>,
}

impl MenuSnapshot {
    pub fn view(&self) -> MenuView {
        if self.zwei_menues_aktiv.unwrap_or(false) {
            return MenuView::Dual {
                menu1: non_empty_or(&self.menu1, texts::MENU_NOT_SET),
                menu2: non_empty_or(&self.menu2, texts::MENU_NOT_SET),
            };
        }

        match self.menu.as_deref().filter(|m| !m.is_empty()) {
            Some(menu) => MenuView::Single(menu.to_string()),
            None => MenuView::Placeholder,
        }
    }
}

fn non_empty_or(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// The menu area of the kiosk. All strings are plain text, never markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuView {
    Dual { menu1: String, menu2: String },
    Single(String),
    Placeholder,
}

impl MenuView {
    /// Text lines in display order.
    pub fn lines(&self) -> Vec<String> {
        match self {
            MenuView::Dual { menu1, menu2 } => vec![
                format!("{}: {}", texts::MENU_1_LABEL, menu1),
                format!("{}: {}", texts::MENU_2_LABEL, menu2),
            ],
            MenuView::Single(menu) => vec![menu.clone()],
            MenuView::Placeholder => vec![texts::NO_MENU.to_string()],
        }
    }
}
