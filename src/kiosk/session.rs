use super::models::UserId;

/// A menu choice the kiosk is waiting for. At most one exists at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MenuChoiceSession {
    #[default]
    None,
    CardPending {
        user_id: UserId,
        card_id: String,
    },
    PersonalNumberPending {
        user_id: UserId,
        personal_number: String,
    },
}

impl MenuChoiceSession {
    pub fn is_active(&self) -> bool {
        !matches!(self, MenuChoiceSession::None)
    }

    /// Leaves `None` behind and returns what was pending.
    pub fn take(&mut self) -> MenuChoiceSession {
        std::mem::take(self)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            MenuChoiceSession::None => None,
            MenuChoiceSession::CardPending { user_id, .. }
            | MenuChoiceSession::PersonalNumberPending { user_id, .. } => Some(user_id),
        }
    }
}
