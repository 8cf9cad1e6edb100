use std::time::Duration;

use agent_realtime::types::SessionConfig;
use agent_realtime::{Config, Notification, TranscribeClient};
use tracing::Level;

/// 100ms of 16-bit mono PCM at the default 24kHz session rate.
const CHUNK_SIZE: usize = 4800;

#[tokio::main]
async fn main() {
    dotenvy::dotenv_override().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .expect("usage: transcribe <pcm16-mono-24khz-file>");
    let audio = std::fs::read(&path).expect("failed to read audio file");
    println!("streaming {} bytes from {}", audio.len(), path);

    let session = SessionConfig::new("gpt-4o-transcribe").with_language("en");
    let mut client = TranscribeClient::new(Config::new(), session);

    let state = client.connect().await.expect("failed to connect");
    println!("connected: session={:?}", state.session_id);

    let mut notifications = client.notifications();
    let printer = tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            match notification {
                Notification::Transcript { text, is_final } => {
                    if is_final {
                        println!("transcript: {}", text);
                    } else {
                        println!("... {}", text);
                    }
                }
                Notification::Error { message, .. } => {
                    eprintln!("server error: {}", message);
                }
                Notification::Closed { code, reason } => {
                    println!("closed: code={:?} reason={:?}", code, reason);
                    break;
                }
                _ => {}
            }
        }
    });

    for chunk in audio.chunks(CHUNK_SIZE) {
        client
            .append_input_audio(chunk)
            .await
            .expect("failed to append audio");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    client
        .commit_input_audio()
        .await
        .expect("failed to commit audio");

    // Leave the connection up long enough for the final transcript.
    tokio::time::sleep(Duration::from_secs(5)).await;
    client.close().await;
    let _ = tokio::time::timeout(Duration::from_secs(2), printer).await;
}
