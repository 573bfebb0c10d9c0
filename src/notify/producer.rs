//! Notification producer - renders delivery messages and appends them to the queue.

use std::path::{Path, PathBuf};

use crate::domain::{Judgment, NotificationEvent, SignupRecord, SolutionRecord};
use crate::error::{DeliveryError, Result};
use crate::storage::append_line;

/// Characters of the original request quoted in a delivery message
pub const CHALLENGE_EXCERPT_CHARS: usize = 150;

/// Appends `NotificationEvent`s to the queue file.
#[derive(Debug, Clone)]
pub struct QueueProducer {
    queue_path: PathBuf,
}

impl QueueProducer {
    pub fn new(queue_path: impl AsRef<Path>) -> Self {
        Self {
            queue_path: queue_path.as_ref().to_path_buf(),
        }
    }

    pub fn queue_path(&self) -> &Path {
        &self.queue_path
    }

    /// Append one event. Existing lines are never touched.
    pub fn enqueue(&self, event: &NotificationEvent) -> Result<()> {
        append_line(&self.queue_path, event).map_err(|e| {
            DeliveryError::Queue(format!(
                "Failed to append to {}: {}",
                self.queue_path.display(),
                e
            ))
        })
    }

    /// Render and enqueue the delivery notification for one processed sign-up.
    pub fn notify_delivery(
        &self,
        signup: &SignupRecord,
        solution: &SolutionRecord,
        judgment: &Judgment,
    ) -> Result<NotificationEvent> {
        let event = NotificationEvent::delivery(render_delivery_message(signup, solution, judgment));
        self.enqueue(&event)?;
        log::info!("Delivery notification queued for {}", signup.email);
        Ok(event)
    }
}

/// Human-readable delivery message (Telegram HTML markup).
pub fn render_delivery_message(signup: &SignupRecord, solution: &SolutionRecord, judgment: &Judgment) -> String {
    format!(
        "<b>AUTOMATION DELIVERED</b>\n\n\
         <b>Client:</b> {name}\n\
         <b>Email:</b> {email}\n\
         <b>Company:</b> {company}\n\n\
         <b>SOLUTION:</b>\n\
         Type: <code>{category}</code>\n\
         Priority: {priority}/5\n\
         Effort: {effort}\n\
         ROI: {roi}\n\n\
         <b>Automation ID:</b> <code>{id}</code>\n\n\
         <b>Challenge:</b>\n\
         <pre>{excerpt}</pre>\n\n\
         <b>Next step:</b> awaiting feedback within 24h",
        name = signup.name,
        email = signup.email,
        company = signup.company,
        category = judgment.category(),
        priority = judgment.priority(),
        effort = judgment.effort(),
        roi = judgment.estimated_roi(),
        id = solution.id,
        excerpt = excerpt(&signup.challenge, CHALLENGE_EXCERPT_CHARS),
    )
}

/// First `max_chars` characters of `text`, with `...` when something was cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
