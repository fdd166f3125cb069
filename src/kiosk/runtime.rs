use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::api::KioskApi;
use super::controller::KioskController;
use super::display::KioskDisplay;
use super::errors::{KioskError, KioskResult};
use super::models::MenuChoice;

const EVENT_BUFFER: usize = 32;

/// Operator actions delivered to the running kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskEvent {
    SelectMenu(MenuChoice),
    DismissChoice,
    SubmitPersonalNumber(String),
    ShowInput,
    HideInput,
    Shutdown,
}

/// Sends events to a [`KioskRuntime`].
#[derive(Debug, Clone)]
pub struct KioskHandle {
    sender: mpsc::Sender<KioskEvent>,
}

impl KioskHandle {
    pub async fn send(&self, event: KioskEvent) -> KioskResult<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| KioskError::Stopped)
    }

    pub async fn select_menu(&self, choice: MenuChoice) -> KioskResult<()> {
        self.send(KioskEvent::SelectMenu(choice)).await
    }

    pub async fn submit_personal_number(&self, number: impl Into<String>) -> KioskResult<()> {
        self.send(KioskEvent::SubmitPersonalNumber(number.into()))
            .await
    }

    pub async fn shutdown(&self) -> KioskResult<()> {
        self.send(KioskEvent::Shutdown).await
    }
}

/// Single task driving a [`KioskController`] from two tickers and the
/// operator's events.
pub struct KioskRuntime<A, D> {
    controller: KioskController<A, D>,
    events: mpsc::Receiver<KioskEvent>,
    rfid_interval: Duration,
    menu_interval: Duration,
}

impl<A: KioskApi, D: KioskDisplay> KioskRuntime<A, D> {
    pub fn new(
        controller: KioskController<A, D>,
        rfid_interval: Duration,
        menu_interval: Duration,
    ) -> (Self, KioskHandle) {
        let (sender, events) = mpsc::channel(EVENT_BUFFER);
        let runtime = Self {
            controller,
            events,
            rfid_interval,
            menu_interval,
        };
        (runtime, KioskHandle { sender })
    }

    /// Runs until `Shutdown` arrives or every handle is dropped, then hands
    /// the controller back.
    pub async fn run(mut self) -> KioskController<A, D> {
        info!(
            rfid_interval_ms = self.rfid_interval.as_millis() as u64,
            menu_interval_ms = self.menu_interval.as_millis() as u64,
            "Kiosk started"
        );
        self.controller.refresh_menu().await;

        // Each tick awaits its request; late ticks are delayed, never burst.
        let start = time::Instant::now();
        let mut rfid = time::interval_at(start + self.rfid_interval, self.rfid_interval);
        rfid.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut menu = time::interval_at(start + self.menu_interval, self.menu_interval);
        menu.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                event = self.events.recv() => match event {
                    Some(KioskEvent::Shutdown) | None => break,
                    Some(event) => {
                        debug!(?event, "Kiosk event");
                        self.controller.handle(event).await;
                    }
                },
                _ = rfid.tick() => self.controller.poll_rfid().await,
                _ = menu.tick() => self.controller.refresh_menu().await,
            }
        }

        info!("Kiosk stopped");
        self.controller
    }
}
