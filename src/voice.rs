//! Voice Boundary
//!
//! Speech recognition is an external collaborator: some engine (a browser
//! API, a phone keyboard, a desktop recognizer) produces final transcripts
//! and delivers them here. This module defines the transcript-source trait
//! the rest of the crate consumes, plus the two built-in sources.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::debug;

/// Final transcript with confidence score
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    pub confidence: f32,
}

/// Minimum confidence threshold (below this, transcripts are discarded)
pub const MIN_CONFIDENCE: f32 = 0.5;

/// Trait for transcript producers
#[async_trait]
pub trait TranscriptSource: Send {
    /// Next accepted transcript, or `None` when the source is exhausted.
    /// Implementations filter out transcripts below [`MIN_CONFIDENCE`].
    async fn next(&mut self) -> Option<Transcript>;
}

/// Transcripts delivered over a channel by an embedding application
pub struct ChannelSource {
    rx: mpsc::Receiver<Transcript>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Transcript>) -> Self {
        Self { rx }
    }

    /// Build a source together with its sending half
    pub fn pair(buffer: usize) -> (mpsc::Sender<Transcript>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

#[async_trait]
impl TranscriptSource for ChannelSource {
    async fn next(&mut self) -> Option<Transcript> {
        while let Some(transcript) = self.rx.recv().await {
            if transcript.confidence >= MIN_CONFIDENCE {
                return Some(transcript);
            }
            debug!(
                "Discarding low-confidence transcript ({:.2}): '{}'",
                transcript.confidence, transcript.text
            );
        }
        None
    }
}

/// Typed queries from stdin, for the CLI. Lines carry full confidence.
pub struct LineSource {
    lines: Lines<BufReader<Stdin>>,
}

impl LineSource {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl TranscriptSource for LineSource {
    async fn next(&mut self) -> Option<Transcript> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(Transcript {
                        text: line,
                        confidence: 1.0,
                    });
                }
                Ok(None) | Err(_) => return None,
            }
        }
    }
}

/// Map a speech-engine error code to a short, recoverable user message
pub fn recognition_error_message(code: &str) -> &'static str {
    match code {
        "no-speech" => "I didn't hear anything. Try again.",
        "audio-capture" => "No microphone was found.",
        "not-allowed" => "Microphone access was denied.",
        "network" => "Voice search needs a network connection.",
        _ => "Voice search is not available right now.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source_filters_low_confidence() {
        let (tx, mut source) = ChannelSource::pair(4);
        tx.send(Transcript {
            text: "garbled".to_string(),
            confidence: 0.2,
        })
        .await
        .expect("send");
        tx.send(Transcript {
            text: "where is balme library".to_string(),
            confidence: 0.9,
        })
        .await
        .expect("send");
        drop(tx);

        let accepted = source.next().await.expect("transcript");
        assert_eq!(accepted.text, "where is balme library");
        assert!(source.next().await.is_none());
    }

    #[tokio::test]
    async fn test_channel_source_end_of_stream() {
        let (tx, mut source) = ChannelSource::pair(1);
        drop(tx);
        assert!(source.next().await.is_none());
    }

    #[test]
    fn test_recognition_error_messages() {
        assert_eq!(
            recognition_error_message("no-speech"),
            "I didn't hear anything. Try again."
        );
        assert_eq!(
            recognition_error_message("anything-else"),
            "Voice search is not available right now."
        );
    }
}
