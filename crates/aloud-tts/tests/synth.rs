//! Synthesis integration tests — drive full turns against a mock upstream.
//!
//! Run with: `cargo test -p aloud-tts --test synth`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use aloud_core::error::AloudError;
use aloud_tts::{SpeechRequest, Synthesizer};

const AUDIO_A: &[u8] = &[0x01, 0x02, 0x03];
const AUDIO_B: &[u8] = &[0x04, 0x05];

const METADATA_BODY: &str = r#"{"Metadata":[{"Type":"WordBoundary","Data":{"Offset":1000000,"Duration":5000000,"text":{"Text":"hello","Length":5,"BoundaryType":"WordBoundary"}}},{"Type":"SentenceBoundary","Data":{"Offset":1000000,"Duration":5000000,"text":{"Text":"hello","Length":5,"BoundaryType":"SentenceBoundary"}}}]}"#;

#[derive(Clone, Copy)]
enum Upstream {
    Healthy,
    DropAfterTurnStart,
}

fn binary_audio_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(b"X-RequestId:000\r\nContent-Type:audio/mpeg\r\nPath:audio\r\n");
    frame.extend_from_slice(payload);
    frame
}

/// Start a mock read-aloud upstream. Returns its ws:// endpoint and a
/// counter of completed upgrade handshakes.
async fn start_upstream(behavior: Upstream) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handshakes = Arc::new(AtomicUsize::new(0));
    let counter = handshakes.clone();

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            counter.fetch_add(1, Ordering::SeqCst);

            tokio::spawn(async move {
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

                // Serve turns until the client goes away. Audio is only
                // sent after both outbound frames of a turn have arrived.
                loop {
                    let Some(Ok(Message::Text(first))) = ws.next().await else {
                        return;
                    };
                    assert!(
                        first.as_str().contains("Path:speech.config"),
                        "first frame must be speech.config"
                    );

                    let Some(Ok(Message::Text(second))) = ws.next().await else {
                        return;
                    };
                    assert!(
                        second.as_str().contains("Path:ssml"),
                        "second frame must be ssml"
                    );

                    ws.send(Message::text("X-RequestId:000\r\nPath:turn.start\r\n\r\n{}"))
                        .await
                        .unwrap();

                    match behavior {
                        Upstream::Healthy => {
                            ws.send(Message::binary(binary_audio_frame(AUDIO_A)))
                                .await
                                .unwrap();
                            ws.send(Message::text(format!(
                                "X-RequestId:000\r\nContent-Type:application/json; charset=utf-8\r\nPath:audio.metadata\r\n\r\n{METADATA_BODY}"
                            )))
                            .await
                            .unwrap();
                            ws.send(Message::binary(binary_audio_frame(AUDIO_B)))
                                .await
                                .unwrap();
                            ws.send(Message::text("X-RequestId:000\r\nPath:turn.end\r\n\r\n"))
                                .await
                                .unwrap();
                        }
                        Upstream::DropAfterTurnStart => {
                            let _ = ws.close(None).await;
                            return;
                        }
                    }
                }
            });
        }
    });

    (format!("ws://127.0.0.1:{port}/synth"), handshakes)
}

#[tokio::test]
async fn test_turn_aggregates_audio_and_subtitles() {
    let (endpoint, _handshakes) = start_upstream(Upstream::Healthy).await;
    let synth = Synthesizer::new(endpoint);

    let result = synth
        .synthesize(&SpeechRequest::new("hello", "en-US-AriaNeural"))
        .await
        .expect("turn should complete");

    // Audio equals the concatenation of the binary fragments in arrival order
    assert_eq!(result.audio.len(), 2);
    assert_eq!(result.audio_bytes(), [AUDIO_A, AUDIO_B].concat());

    // Both subtitle tracks carry the boundary event
    assert!(result.word_subtitle.starts_with("WEBVTT"));
    assert!(result
        .word_subtitle
        .contains("00:00:00.1000000 --> 00:00:00.6000000\r\nhello"));
    assert!(result
        .sentence_subtitle
        .contains("00:00:00.1000000 --> 00:00:00.6000000\r\nhello"));
}

#[tokio::test]
async fn test_back_to_back_calls_share_one_handshake() {
    let (endpoint, handshakes) = start_upstream(Upstream::Healthy).await;
    let synth = Synthesizer::new(endpoint);

    let req = SpeechRequest::new("hello", "en-US-AriaNeural");
    let (a, b) = tokio::join!(synth.synthesize(&req), synth.synthesize(&req));
    a.expect("first turn should complete");
    b.expect("second turn should complete");

    assert_eq!(handshakes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_drop_mid_turn_fails_and_clears_cache() {
    let (endpoint, handshakes) = start_upstream(Upstream::DropAfterTurnStart).await;
    let synth = Synthesizer::new(endpoint);
    let req = SpeechRequest::new("hello", "en-US-AriaNeural");

    let err = synth.synthesize(&req).await.err().expect("turn should fail");
    assert!(matches!(err, AloudError::Synthesis(_)), "got {err:?}");
    assert_eq!(handshakes.load(Ordering::SeqCst), 1);

    // The slot was invalidated, so the next call re-handshakes
    let _ = synth.synthesize(&req).await;
    assert_eq!(handshakes.load(Ordering::SeqCst), 2);
}
