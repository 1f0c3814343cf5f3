use analytecore::ConfirmationGate;
use std::io::{
    BufRead,
    Write,
};
use std::sync::Mutex;
use tracing::warn;

/// Asks the operator on the terminal before duplicate scan entries are dropped.
///
/// Runs are built in parallel, the lock keeps their prompts from interleaving.
#[derive(Debug, Default)]
pub struct StdinGate {
    lock: Mutex<()>,
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl ConfirmationGate for StdinGate {
    fn confirm_duplicate_resolution(&self, affected_peaks: usize) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut stderr = std::io::stderr();
        let _ = write!(
            stderr,
            "{} peaks have multiple data points for a single scan. \
             Keep only the data point closest to each peak's mean mass? [y/N] ",
            affected_peaks
        );
        let _ = stderr.flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!("Could not read the confirmation answer: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes("  YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }
}
