//! Scheduled group broadcasts and the startup announcement

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;

use crate::application::errors::BotError;
use crate::application::services::schedule::CronSchedule;
use crate::domain::entities::Chat;
use crate::domain::traits::Transport;
use crate::infrastructure::config::BroadcastConfig;

/// A validated broadcast entry
#[derive(Debug, Clone)]
pub struct BroadcastJob {
    /// Position in the configured list, for logs
    pub index: usize,
    pub schedule: CronSchedule,
    pub message: String,
}

/// Owns the broadcast jobs and the group they target
pub struct BroadcastScheduler {
    group_name: String,
    jobs: Vec<BroadcastJob>,
}

impl BroadcastScheduler {
    /// Build jobs from config; incomplete or unparsable entries are skipped
    pub fn from_config(group_name: impl Into<String>, entries: &[BroadcastConfig]) -> Self {
        let mut jobs = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            let schedule = entry.schedule.as_deref().map(str::trim).filter(|s| !s.is_empty());
            let message = entry.message.as_deref().filter(|m| !m.trim().is_empty());
            let (Some(schedule), Some(message)) = (schedule, message) else {
                tracing::warn!("Skipping invalid broadcast at index {}", index);
                continue;
            };

            match CronSchedule::parse(schedule) {
                Ok(schedule) => {
                    let preview: String = message.chars().take(20).collect();
                    tracing::info!(
                        "Scheduling broadcast #{}: \"{}...\" at {}",
                        index + 1,
                        preview,
                        schedule.expression()
                    );
                    jobs.push(BroadcastJob {
                        index,
                        schedule,
                        message: message.to_string(),
                    });
                }
                Err(e) => tracing::warn!("Skipping broadcast at index {}: {}", index, e),
            }
        }

        Self {
            group_name: group_name.into(),
            jobs,
        }
    }

    pub fn jobs(&self) -> &[BroadcastJob] {
        &self.jobs
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// Start one task per job; each runs until the process exits
    pub fn spawn(self, transport: Arc<dyn Transport>) -> Vec<JoinHandle<()>> {
        if self.jobs.is_empty() {
            tracing::warn!("No broadcasts configured");
        }

        let group_name = Arc::new(self.group_name);
        self.jobs
            .into_iter()
            .map(|job| {
                let transport = Arc::clone(&transport);
                let group_name = Arc::clone(&group_name);
                tokio::spawn(async move {
                    loop {
                        let now = Local::now();
                        let Some(next) = job.schedule.next_after(&now) else {
                            tracing::warn!("Broadcast #{} has no upcoming run", job.index + 1);
                            break;
                        };
                        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                        tracing::debug!("Broadcast #{} next runs at {}", job.index + 1, next);
                        tokio::time::sleep(wait).await;

                        tracing::info!("Running scheduled broadcast #{}...", job.index + 1);
                        fire(&job, transport.as_ref(), &group_name).await;
                    }
                })
            })
            .collect()
    }
}

/// Deliver one job now; failures are logged and reported as `false`
pub async fn fire(job: &BroadcastJob, transport: &dyn Transport, group_name: &str) -> bool {
    match post_to_group(transport, group_name, &job.message).await {
        Ok(chat) => {
            tracing::info!("Broadcast #{} sent to {}", job.index + 1, chat.name);
            true
        }
        Err(BotError::NotFound(_)) => {
            tracing::warn!("Group \"{}\" not found. Could not send broadcast.", group_name);
            false
        }
        Err(e) => {
            tracing::error!("Error sending broadcast #{}: {}", job.index + 1, e);
            false
        }
    }
}

/// Find the group by its exact trimmed name and post `text` to it
pub async fn post_to_group(
    transport: &dyn Transport,
    group_name: &str,
    text: &str,
) -> Result<Chat, BotError> {
    let chats = transport.get_chats().await?;
    let group = chats
        .into_iter()
        .find(|chat| chat.is_named_group(group_name))
        .ok_or_else(|| BotError::NotFound(format!("group \"{}\"", group_name.trim())))?;

    transport.send_message(&group.id, text).await?;
    Ok(group)
}

/// Announces the bot to the admin and the group once connected
pub struct StartupAnnouncer {
    pub bot_name: String,
    pub group_name: String,
    pub admin_chat_id: Option<String>,
    pub admin_delay: Duration,
    pub group_delay: Duration,
}

impl StartupAnnouncer {
    pub fn spawn(self, transport: Arc<dyn Transport>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let admin = async {
                tokio::time::sleep(self.admin_delay).await;
                self.announce_admin(transport.as_ref()).await;
            };
            let group = async {
                tokio::time::sleep(self.group_delay).await;
                self.announce_group(transport.as_ref()).await;
            };
            tokio::join!(admin, group);
        })
    }

    pub fn admin_message(&self) -> String {
        format!("🤖 {} is now online and connected!", self.bot_name)
    }

    pub fn group_message(&self) -> String {
        format!(
            "🤖 *{} is Online!*\n\n\
             Here are the available commands:\n\
             ✈️ *!flight* - Start a flight load inquiry\n\
             ❓ *!question* - View Rider Rules, Priority List & Roster\n\
             🏓 *!ping* - Check if bot is active",
            self.bot_name
        )
    }

    pub async fn announce_admin(&self, transport: &dyn Transport) -> bool {
        let Some(admin) = &self.admin_chat_id else {
            return false;
        };
        tracing::info!("Attempting to send startup message to: {}", admin);
        match transport.send_message(admin, &self.admin_message()).await {
            Ok(id) => {
                tracing::info!("Startup message sent to admin. Message ID: {}", id);
                true
            }
            Err(e) => {
                tracing::error!("Failed to send startup message to admin: {}", e);
                false
            }
        }
    }

    pub async fn announce_group(&self, transport: &dyn Transport) -> bool {
        if let Ok(chats) = transport.get_chats().await {
            let groups: Vec<&str> = chats.iter().filter(|c| c.is_group).map(|c| c.name.as_str()).collect();
            tracing::debug!("Available groups: {:?}", groups);
        }

        match post_to_group(transport, &self.group_name, &self.group_message()).await {
            Ok(chat) => {
                tracing::info!("Startup message sent to group: {}", chat.name);
                true
            }
            Err(e) => {
                tracing::warn!("Could not announce startup in \"{}\": {}", self.group_name, e);
                false
            }
        }
    }
}
