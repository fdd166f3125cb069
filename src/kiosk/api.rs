use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde::Serialize;
use tracing::debug;

use super::errors::{KioskError, KioskResult};
use super::models::{
    CardRegistrationReply, MenuChoice, MenuSnapshot, PersonalNumberReply, ScanResult, UserId,
};

/// Backend endpoints the kiosk talks to.
#[async_trait]
pub trait KioskApi: Send + Sync + 'static {
    /// `GET /rfid_scan`
    async fn scan(&self) -> KioskResult<ScanResult>;

    /// `POST /register` as a form.
    async fn register_card(&self, registration: &CardRegistration)
    -> KioskResult<CardRegistrationReply>;

    /// `POST /api/register` as JSON.
    async fn register_personal_number(
        &self,
        registration: &PersonalNumberRegistration,
    ) -> KioskResult<PersonalNumberReply>;

    /// `GET /menu/data`
    async fn menu(&self) -> KioskResult<MenuSnapshot>;
}

/// Form body of a card registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRegistration {
    pub card_id: String,
    pub user_id: Option<UserId>,
    pub menu_choice: Option<MenuChoice>,
}

impl CardRegistration {
    /// First post after a card was presented.
    pub fn scan(card_id: impl Into<String>) -> Self {
        Self {
            card_id: card_id.into(),
            user_id: None,
            menu_choice: None,
        }
    }

    /// Resolves a pending card session with the picked menu.
    pub fn choice(user_id: UserId, card_id: impl Into<String>, choice: MenuChoice) -> Self {
        Self {
            card_id: card_id.into(),
            user_id: Some(user_id),
            menu_choice: Some(choice),
        }
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn to_form(&self) -> String {
        let mut pairs = Vec::with_capacity(3);
        if let Some(user_id) = &self.user_id {
            pairs.push(format!("user_id={}", urlencoding::encode(user_id.as_str())));
        }
        pairs.push(format!("card_id={}", urlencoding::encode(&self.card_id)));
        if let Some(choice) = self.menu_choice {
            pairs.push(format!("menu_choice={}", choice.number()));
        }
        pairs.join("&")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalNumberRegistration {
    pub personal_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_choice: Option<MenuChoice>,
}

impl PersonalNumberRegistration {
    pub fn new(personal_number: impl Into<String>) -> Self {
        Self {
            personal_number: personal_number.into(),
            menu_choice: None,
        }
    }

    pub fn with_choice(mut self, choice: MenuChoice) -> Self {
        self.menu_choice = Some(choice);
        self
    }
}

/// [`KioskApi`] over HTTP against the FoodBot backend.
#[derive(Debug, Clone)]
pub struct HttpKioskApi {
    client: Client,
    base_url: Url,
}

impl HttpKioskApi {
    pub fn new(base_url: &str) -> KioskResult<Self> {
        // Relative joins drop the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| KioskError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> KioskResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| KioskError::InvalidUrl(format!("{path}: {e}")))
    }
}

#[async_trait]
impl KioskApi for HttpKioskApi {
    async fn scan(&self) -> KioskResult<ScanResult> {
        let response = self.client.get(self.endpoint("rfid_scan")?).send().await?;
        if !response.status().is_success() {
            return Err(KioskError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    async fn register_card(
        &self,
        registration: &CardRegistration,
    ) -> KioskResult<CardRegistrationReply> {
        let form = registration.to_form();
        debug!(body = %form, "Posting card registration");

        let response = self
            .client
            .post(self.endpoint("register")?)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("X-Requested-With", "XMLHttpRequest")
            .header(header::ACCEPT, "application/json")
            .body(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(KioskError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    async fn register_personal_number(
        &self,
        registration: &PersonalNumberRegistration,
    ) -> KioskResult<PersonalNumberReply> {
        let response = self
            .client
            .post(self.endpoint("api/register")?)
            .json(registration)
            .send()
            .await?;

        // Unknown numbers come back as 404 with a JSON body explaining why.
        let status = response.status();
        match response.json::<PersonalNumberReply>().await {
            Ok(reply) => Ok(reply),
            Err(_) if !status.is_success() => Err(KioskError::Status(status.as_u16())),
            Err(e) => Err(e.into()),
        }
    }

    async fn menu(&self) -> KioskResult<MenuSnapshot> {
        let response = self
            .client
            .get(self.endpoint("menu/data")?)
            .query(&[("t", chrono::Utc::now().timestamp_millis())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(KioskError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}
