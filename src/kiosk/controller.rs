use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::api::{CardRegistration, KioskApi, PersonalNumberRegistration};
use super::display::KioskDisplay;
use super::models::{
    ManualDecision, MenuChoice, PendingChoice, RegistrationDecision, StatusMessage,
};
use super::runtime::KioskEvent;
use super::session::MenuChoiceSession;
use super::texts;

/// Registration state machine of one kiosk.
///
/// Owned by a single task; every operation runs to completion before the next
/// one starts, so the session needs no locking.
pub struct KioskController<A, D> {
    api: A,
    display: Arc<D>,
    session: MenuChoiceSession,
    input_visible: bool,
    status_display: Duration,
    status_generation: Arc<AtomicU64>,
}

impl<A: KioskApi, D: KioskDisplay> KioskController<A, D> {
    pub fn new(api: A, display: Arc<D>, status_display: Duration) -> Self {
        Self {
            api,
            display,
            session: MenuChoiceSession::None,
            input_visible: false,
            status_display,
            status_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn session(&self) -> &MenuChoiceSession {
        &self.session
    }

    pub fn input_visible(&self) -> bool {
        self.input_visible
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn display(&self) -> &Arc<D> {
        &self.display
    }

    /// Applies one operator event. `Shutdown` is handled by the runtime.
    pub async fn handle(&mut self, event: KioskEvent) {
        match event {
            KioskEvent::SelectMenu(choice) => self.select_menu(choice).await,
            KioskEvent::DismissChoice => self.dismiss_choice(),
            KioskEvent::SubmitPersonalNumber(number) => self.submit_personal_number(&number).await,
            KioskEvent::ShowInput => self.show_input(),
            KioskEvent::HideInput => self.hide_input(),
            KioskEvent::Shutdown => {}
        }
    }

    /// Checks the reader once and registers a presented card.
    ///
    /// Reader and backend failures are treated as "no card".
    pub async fn poll_rfid(&mut self) {
        let scan = match self.api.scan().await {
            Ok(scan) => scan,
            Err(e) => {
                debug!(error = %e, "RFID scan unavailable");
                return;
            }
        };
        let Some(card_id) = scan.card().map(str::to_string) else {
            return;
        };

        info!(card_id = %card_id, "Card presented");
        let reply = match self.api.register_card(&CardRegistration::scan(&card_id)).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!(card_id = %card_id, error = %e, "Card registration failed");
                return;
            }
        };

        match reply.decision() {
            RegistrationDecision::MenuChoice(PendingChoice {
                user_id,
                menu1,
                menu2,
            }) => {
                self.open_choice(
                    MenuChoiceSession::CardPending { user_id, card_id },
                    &menu1,
                    &menu2,
                );
            }
            RegistrationDecision::Outcome(status) => self.show_status(status),
        }
    }

    /// Fetches the current menu and renders it.
    pub async fn refresh_menu(&mut self) {
        match self.api.menu().await {
            Ok(snapshot) => self.display.render_menu(&snapshot.view()),
            Err(e) => {
                warn!(error = %e, "Menu refresh failed");
                self.show_status(StatusMessage::error(texts::MENU_UNAVAILABLE));
            }
        }
    }

    /// Registers by typed personal number. Blank input is ignored.
    #[instrument(skip(self))]
    pub async fn submit_personal_number(&mut self, personal_number: &str) {
        let personal_number = personal_number.trim();
        if personal_number.is_empty() {
            return;
        }

        let registration = PersonalNumberRegistration::new(personal_number);
        let reply = match self.api.register_personal_number(&registration).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Personal number registration failed");
                self.show_status(StatusMessage::error(texts::REGISTRATION_FAILED));
                return;
            }
        };

        match reply.decision() {
            ManualDecision::Accepted(RegistrationDecision::MenuChoice(PendingChoice {
                user_id,
                menu1,
                menu2,
            })) => {
                self.open_choice(
                    MenuChoiceSession::PersonalNumberPending {
                        user_id,
                        personal_number: personal_number.to_string(),
                    },
                    &menu1,
                    &menu2,
                );
                self.hide_input();
            }
            ManualDecision::Accepted(RegistrationDecision::Outcome(status)) => {
                self.show_status(status);
                self.hide_input();
                self.refresh_menu().await;
            }
            ManualDecision::Rejected(status) => self.show_status(status),
        }
    }

    /// Resolves the pending choice. The session is cleared whatever the
    /// backend answers.
    pub async fn select_menu(&mut self, choice: MenuChoice) {
        self.display.hide_menu_choice();

        match self.session.take() {
            MenuChoiceSession::None => {
                debug!(choice = choice.number(), "Menu selected without a pending choice");
            }
            MenuChoiceSession::PersonalNumberPending {
                personal_number, ..
            } => {
                let registration =
                    PersonalNumberRegistration::new(personal_number).with_choice(choice);
                let status = match self.api.register_personal_number(&registration).await {
                    Ok(reply) => reply.choice_status(),
                    Err(e) => {
                        warn!(error = %e, "Menu choice registration failed");
                        StatusMessage::error(texts::REGISTRATION_FAILED)
                    }
                };
                self.show_status(status);
                self.refresh_menu().await;
            }
            MenuChoiceSession::CardPending { user_id, card_id } => {
                let registration = CardRegistration::choice(user_id, card_id, choice);
                let status = match self.api.register_card(&registration).await {
                    Ok(reply) => reply.status(),
                    Err(e) => {
                        warn!(error = %e, "Menu choice registration failed");
                        StatusMessage::error(texts::REGISTRATION_FAILED)
                    }
                };
                self.show_status(status);
                self.refresh_menu().await;
            }
        }
    }

    /// Closes the choice overlay and forgets the pending choice.
    pub fn dismiss_choice(&mut self) {
        self.display.hide_menu_choice();
        if self.session.take().is_active() {
            info!("Menu choice dismissed");
        }
    }

    pub fn show_input(&mut self) {
        self.input_visible = true;
        self.display.set_input_visible(true);
    }

    pub fn hide_input(&mut self) {
        self.input_visible = false;
        self.display.set_input_visible(false);
    }

    fn open_choice(&mut self, session: MenuChoiceSession, menu1: &str, menu2: &str) {
        if self.session.is_active() {
            warn!(
                previous = ?self.session.user_id(),
                "Replacing a pending menu choice"
            );
        }
        self.session = session;
        self.display.show_menu_choice(menu1, menu2);
    }

    /// Shows a status popup and schedules it to hide. A newer popup
    /// invalidates the timers of all older ones.
    fn show_status(&self, status: StatusMessage) {
        self.display.show_status(&status);
        let generation = self.status_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let current = Arc::clone(&self.status_generation);
        let display = Arc::clone(&self.display);
        let delay = self.status_display;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == generation {
                display.hide_status();
            }
        });
    }
}
