//! Recognizer implementations
//!
//! - [`ConsoleRecognizer`]: each activation reads one typed line from stdin
//! - [`ScriptedRecognizer`]: replays queued event lists, one per activation

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::capture::{RecognitionEvent, RecognitionOptions, Recognizer};
use crate::{Error, Result};

/// Channel capacity for one recognition session
const EVENT_BUFFER: usize = 8;

/// Reads typed lines from stdin in place of recognized speech
///
/// A blank line reports `no-speech`. Once stdin reaches end of file the
/// recognizer reports `End` and [`ConsoleRecognizer::is_closed`] turns true.
pub struct ConsoleRecognizer {
    lines: Arc<tokio::sync::Mutex<Lines<BufReader<Stdin>>>>,
    closed: Arc<AtomicBool>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Default for ConsoleRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleRecognizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Arc::new(tokio::sync::Mutex::new(
                BufReader::new(tokio::io::stdin()).lines(),
            )),
            closed: Arc::new(AtomicBool::new(false)),
            reader: Mutex::new(None),
        }
    }

    /// Whether stdin has been exhausted
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Recognizer for ConsoleRecognizer {
    fn start(&self, _options: &RecognitionOptions) -> Result<mpsc::Receiver<RecognitionEvent>> {
        if self.is_closed() {
            return Err(Error::Recognition("console input closed".to_string()));
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let lines = Arc::clone(&self.lines);
        let closed = Arc::clone(&self.closed);

        let handle = tokio::spawn(async move {
            let next = lines.lock().await.next_line().await;
            let event = match next {
                Ok(Some(line)) if line.trim().is_empty() => RecognitionEvent::Error {
                    code: "no-speech".to_string(),
                },
                Ok(Some(line)) => RecognitionEvent::Result {
                    transcript: line,
                    confidence: None,
                },
                Ok(None) => {
                    closed.store(true, Ordering::Release);
                    RecognitionEvent::End
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read console input");
                    RecognitionEvent::Error {
                        code: "audio-capture".to_string(),
                    }
                }
            };

            let _ = tx.send(event).await;
            let _ = tx.send(RecognitionEvent::End).await;
        });

        let previous = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }

        Ok(rx)
    }

    fn abort(&self) {
        if let Some(handle) = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

/// One queued activation
enum Script {
    Events(Vec<RecognitionEvent>),
    /// Never produces an event; the session stays open until aborted
    Pending,
}

/// Replays scripted recognition sessions
#[derive(Default)]
pub struct ScriptedRecognizer {
    script: Mutex<VecDeque<Script>>,
    held: Mutex<Vec<mpsc::Sender<RecognitionEvent>>>,
    starts: AtomicUsize,
    aborts: AtomicUsize,
}

impl ScriptedRecognizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the events for the next activation
    pub fn push(&self, events: Vec<RecognitionEvent>) {
        self.queue(Script::Events(events));
    }

    /// Queue an activation that recognizes `transcript`
    pub fn push_transcript(&self, transcript: &str) {
        self.push(vec![
            RecognitionEvent::Result {
                transcript: transcript.to_string(),
                confidence: Some(0.9),
            },
            RecognitionEvent::End,
        ]);
    }

    /// Queue an activation that fails with a platform error code
    pub fn push_error(&self, code: &str) {
        self.push(vec![
            RecognitionEvent::Error {
                code: code.to_string(),
            },
            RecognitionEvent::End,
        ]);
    }

    /// Queue an activation that waits until aborted
    pub fn push_pending(&self) {
        self.queue(Script::Pending);
    }

    /// Number of activations started
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Number of aborts requested
    #[must_use]
    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }

    fn queue(&self, script: Script) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(script);
    }
}

impl Recognizer for ScriptedRecognizer {
    fn start(&self, _options: &RecognitionOptions) -> Result<mpsc::Receiver<RecognitionEvent>> {
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| Error::Recognition("no scripted session".to_string()))?;

        self.starts.fetch_add(1, Ordering::SeqCst);

        match next {
            Script::Events(events) => {
                let (tx, rx) = mpsc::channel(events.len().max(1));
                for event in events {
                    tx.try_send(event)
                        .map_err(|e| Error::Recognition(e.to_string()))?;
                }
                Ok(rx)
            }
            Script::Pending => {
                let (tx, rx) = mpsc::channel(EVENT_BUFFER);
                self.held
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(tx);
                Ok(rx)
            }
        }
    }

    fn abort(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_sessions_play_in_order() {
        let recognizer = ScriptedRecognizer::new();
        recognizer.push_transcript("first");
        recognizer.push_error("no-speech");

        let options = RecognitionOptions::default();

        let mut rx = recognizer.start(&options).unwrap();
        assert!(matches!(
            rx.recv().await,
            Some(RecognitionEvent::Result { transcript, .. }) if transcript == "first"
        ));
        assert_eq!(rx.recv().await, Some(RecognitionEvent::End));
        assert_eq!(rx.recv().await, None);

        let mut rx = recognizer.start(&options).unwrap();
        assert_eq!(
            rx.recv().await,
            Some(RecognitionEvent::Error {
                code: "no-speech".to_string()
            })
        );

        assert!(recognizer.start(&options).is_err());
        assert_eq!(recognizer.start_count(), 2);
    }

    #[tokio::test]
    async fn test_pending_session_closes_on_abort() {
        let recognizer = ScriptedRecognizer::new();
        recognizer.push_pending();

        let mut rx = recognizer.start(&RecognitionOptions::default()).unwrap();
        assert!(rx.try_recv().is_err());

        recognizer.abort();
        assert_eq!(rx.recv().await, None);
        assert_eq!(recognizer.abort_count(), 1);
    }
}
