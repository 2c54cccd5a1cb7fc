use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::types::Course;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("recipient {chat_id} rejected the message: {status}")]
    Rejected { chat_id: String, status: StatusCode },
}

/// Capability: deliver a text payload to every subscribed recipient.
#[async_trait]
pub trait Notifier {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError>;
}

/// Telegram Bot API sink. Recipients are chat ids; delivery is sequential
/// and the first failure propagates, so a partial send never looks like
/// success.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_ids: Vec<String>,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_ids: Vec<String>) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            bot_token,
            chat_ids,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        for chat_id in &self.chat_ids {
            let response = self
                .client
                .post(&url)
                .form(&[("chat_id", chat_id.as_str()), ("text", text)])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(NotifyError::Rejected {
                    chat_id: chat_id.clone(),
                    status: response.status(),
                });
            }
            log::debug!("notified chat {chat_id}");
        }

        Ok(())
    }
}

/// Message for newly listed courses: a header naming the watch, then one
/// line per course.
pub fn format_added_message(watch_name: &str, added: &[Course]) -> String {
    let mut message = format!("[{}] Neue Kurse im Katalog ({}):", watch_name, added.len());
    for course in added {
        message.push_str("\n- ");
        message.push_str(&course.to_string());
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, title: &str) -> Course {
        Course {
            course_id: id.to_string(),
            title: title.to_string(),
            raw_text: format!("{id} {title}"),
        }
    }

    #[test]
    fn message_lists_every_added_course() {
        let added = [
            course("FK2.604-A", "Ring schmieden"),
            course("FK2.664-C", "Kette löten"),
        ];

        let message = format_added_message("Goldschmieden", &added);

        assert_eq!(
            message,
            "[Goldschmieden] Neue Kurse im Katalog (2):\n\
             - FK2.604-A | Ring schmieden\n\
             - FK2.664-C | Kette löten"
        );
    }

    #[test]
    fn untitled_course_falls_back_to_its_id() {
        let added = [course("FK2.604-A", "")];
        let message = format_added_message("Schmuck", &added);
        assert_eq!(message, "[Schmuck] Neue Kurse im Katalog (1):\n- FK2.604-A");
    }
}
