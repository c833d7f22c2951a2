use chrono::{DateTime, Utc};

/// Returns the current wall-clock time used for `created` / `updated` stamps.
pub fn current_time() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_time_is_monotonic_enough() {
        let first = current_time();
        let second = current_time();
        assert!(second >= first);
    }
}
