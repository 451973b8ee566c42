use eyre::{bail, Result};
use serde::Deserialize;
use serde_json::json;

use acbridge_core::dispatch;

const API_BASE: &str = "https://api.telegram.org";

lazy_static! {
    static ref KEYBOARD: serde_json::Value = json!(dispatch::keyboard_rows());
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub first_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

pub struct Telegram {
    client: reqwest::Client,
    base: String,
}

impl Telegram {
    pub fn new(token: &str) -> Telegram {
        Telegram {
            client: reqwest::Client::new(),
            base: format!("{}/bot{}", API_BASE, token),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base, method)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response: ApiResponse<T> = self
            .client
            .post(self.url(method))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        if !response.ok {
            bail!(
                "{} failed: {}",
                method,
                response.description.unwrap_or_default()
            );
        }
        match response.result {
            Some(result) => Ok(result),
            None => bail!("{} returned no result", method),
        }
    }

    /// Long poll for new updates. `offset` acknowledges everything
    /// before it; pass a zero `timeout` to only commit the offset.
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call::<serde_json::Value>(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn send_message_with_keyboard(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call::<serde_json::Value>(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
                "reply_markup": {
                    "keyboard": KEYBOARD.clone(),
                    "resize_keyboard": true,
                },
            }),
        )
        .await?;
        Ok(())
    }
}
