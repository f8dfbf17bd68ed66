use std::fs;
use std::time::Instant;

use emoji_core_wasm::{replay_native, synthesize_conversations, SentimentConfig};

fn main() {
    // Relative to the crate root when run via `cargo run --example bench_real`.
    let raw = match std::env::var("BENCH_FILE") {
        Ok(path) => {
            fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e))
        }
        Err(_) => serde_json::to_string(&synthesize_conversations(2000, Some(1)))
            .expect("serialize synthetic conversations"),
    };
    println!("Loaded {} bytes of conversations", raw.len());

    for i in 0..3 {
        let start = Instant::now();
        match replay_native(&raw, SentimentConfig::default(), Some(42)) {
            Ok(json) => {
                if i == 0 {
                    println!("Success! JSON length: {}", json.len());
                }
            }
            Err(e) => {
                println!("Error: {}", e);
            }
        }
        println!("Run {}: {:?}", i + 1, start.elapsed());
    }
}
