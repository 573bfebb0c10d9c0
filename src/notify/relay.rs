//! Notification relay - forwards queued delivery events to the outbound file.
//!
//! The relay polls the queue file on a fixed interval. When the file's size or
//! mtime changes it reads every complete line past its cursor, republishes the
//! unsent events, and persists the new cursor. The queue file itself is never
//! rewritten; the cursor is what marks lines as consumed, so a restart does not
//! re-deliver anything.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::domain::{NotificationEvent, OutboundMessage};
use crate::error::{DeliveryError, Result};
use crate::storage::{append_line, read_json_or_default, read_lines_from, write_json_atomic};

/// Configuration for the relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Queue file written by the processor
    pub queue_path: PathBuf,
    /// Outbound file this relay appends to
    pub outbound_path: PathBuf,
    /// Where the consumed offset is persisted
    pub cursor_path: PathBuf,
    /// Fixed recipient every outbound message is addressed to
    pub recipient: String,
    pub poll_interval: Duration,
}

/// How far into the queue file the relay has consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayCursor {
    pub offset: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Outcome of a single poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Complete lines consumed this poll
    pub lines_read: usize,
    /// Events appended to the outbound file
    pub republished: usize,
    /// Events that were already flagged as sent
    pub already_sent: usize,
    /// Lines that did not parse as an event
    pub malformed: usize,
}

/// Size and mtime of the queue file at the last poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

pub struct Relay {
    config: RelayConfig,
    cursor: RelayCursor,
    last_seen: Option<FileStamp>,
}

impl Relay {
    /// Create a relay, resuming from the persisted cursor if there is one.
    pub fn new(config: RelayConfig) -> Self {
        let cursor: RelayCursor = read_json_or_default(&config.cursor_path);
        Self {
            config,
            cursor,
            last_seen: None,
        }
    }

    pub fn cursor(&self) -> &RelayCursor {
        &self.cursor
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    fn stamp(&self) -> Result<Option<FileStamp>> {
        match fs::metadata(&self.config.queue_path) {
            Ok(meta) => Ok(Some(FileStamp {
                len: meta.len(),
                modified: meta.modified().ok(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Poll only if the queue file changed since the last poll.
    ///
    /// The first call after construction always polls so a backlog written
    /// while the relay was down is picked up.
    pub fn poll_if_changed(&mut self) -> Result<Option<PollReport>> {
        let stamp = self.stamp()?;
        if stamp.is_none() {
            self.last_seen = None;
            return Ok(None);
        }
        if stamp == self.last_seen {
            return Ok(None);
        }

        let report = self.poll_once()?;
        self.last_seen = stamp;
        Ok(Some(report))
    }

    /// Consume every complete line past the cursor.
    pub fn poll_once(&mut self) -> Result<PollReport> {
        let mut report = PollReport::default();

        let len = self.stamp()?.map(|s| s.len).unwrap_or(0);
        if len < self.cursor.offset {
            log::warn!(
                "Queue file {} shrank below cursor ({} < {}), starting over",
                self.config.queue_path.display(),
                len,
                self.cursor.offset
            );
            self.cursor.offset = 0;
        }

        let Some(batch) = read_lines_from(&self.config.queue_path, self.cursor.offset)? else {
            return Ok(report);
        };

        for (line, end) in batch.lines.iter().zip(batch.line_ends.iter()) {
            if !line.trim().is_empty() {
                match serde_json::from_str::<NotificationEvent>(line) {
                    Ok(event) if event.sent => report.already_sent += 1,
                    Ok(event) => {
                        log::info!("New notification detected: {:?}", event.kind);
                        if let Err(e) = self.republish(&event) {
                            // Stop here; this line is retried on the next poll
                            self.save_cursor()?;
                            return Err(e);
                        }
                        report.republished += 1;
                    }
                    Err(e) => {
                        log::debug!("Skipping malformed queue line: {}", e);
                        report.malformed += 1;
                    }
                }
            }
            report.lines_read += 1;
            self.cursor.offset = *end;
        }

        if report.lines_read > 0 {
            self.save_cursor()?;
        }

        Ok(report)
    }

    fn republish(&self, event: &NotificationEvent) -> Result<()> {
        let outbound = OutboundMessage::pending(&self.config.recipient, &event.message);
        append_line(&self.config.outbound_path, &outbound).map_err(|e| {
            DeliveryError::Relay(format!(
                "Failed to append to {}: {}",
                self.config.outbound_path.display(),
                e
            ))
        })?;
        log::info!("Notification queued for {}", self.config.recipient);
        Ok(())
    }

    fn save_cursor(&mut self) -> Result<()> {
        self.cursor.updated_at = Some(Utc::now());
        write_json_atomic(&self.config.cursor_path, &self.cursor)
    }

    /// Poll on the configured interval until `shutdown` flips to true.
    ///
    /// Poll errors are logged and the loop keeps going.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!(
            queue = %self.config.queue_path.display(),
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "Watching notification queue"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.poll_if_changed() {
                        Ok(Some(report)) if report.lines_read > 0 => {
                            tracing::info!(
                                republished = report.republished,
                                already_sent = report.already_sent,
                                malformed = report.malformed,
                                offset = self.cursor.offset,
                                "Queue poll complete"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!(error = %e, "Queue poll failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(offset = self.cursor.offset, "Relay stopped");
        Ok(())
    }
}
