//! ID generation utilities
//!
//! Solution ids must stay unique even when several are generated within the
//! same millisecond, so every id carries a process-wide sequence number next to
//! the timestamp and a random suffix.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Next value of the process-wide sequence
fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Generate a unique solution ID
///
/// Format: `sol-{timestamp_ms}-{sequence}-{random_hex}`
/// Example: `sol-1738300800123-7-a1b2`
pub fn generate_solution_id() -> String {
    let timestamp = now_ms();
    let random: u16 = rand::rng().random();
    format!("sol-{}-{}-{:04x}", timestamp, next_sequence(), random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_now_ms_returns_reasonable_timestamp() {
        let ts = now_ms();
        assert!(ts > 1577836800000); // 2020-01-01
        assert!(ts < 4102444800000); // 2100-01-01
    }

    #[test]
    fn test_generate_solution_id_format() {
        let id = generate_solution_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "sol");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[3].len(), 4);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_solution_id_unique_in_tight_loop() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_solution_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let a = next_sequence();
        let b = next_sequence();
        assert!(b > a);
    }
}
