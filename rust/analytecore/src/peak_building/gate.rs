/// Decision point before destructive duplicate-scan resolution.
///
/// Runs are processed on worker threads, so implementations must be `Sync`.
/// Blocking implementations (eg. prompting an operator) are allowed.
pub trait ConfirmationGate: Sync {
    fn confirm_duplicate_resolution(&self, affected_peaks: usize) -> bool;
}

/// Always allows duplicate resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn confirm_duplicate_resolution(&self, _affected_peaks: usize) -> bool {
        true
    }
}

/// Always declines, aborting any run that needs duplicate resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decline;

impl ConfirmationGate for Decline {
    fn confirm_duplicate_resolution(&self, _affected_peaks: usize) -> bool {
        false
    }
}

impl<F> ConfirmationGate for F
where
    F: Fn(usize) -> bool + Sync,
{
    fn confirm_duplicate_resolution(&self, affected_peaks: usize) -> bool {
        self(affected_peaks)
    }
}
