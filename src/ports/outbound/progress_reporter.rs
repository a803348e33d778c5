/// ProgressReporter port for reporting progress during a walk
///
/// This port abstracts progress reporting (e.g., to stderr) so that
/// user feedback never mixes with the payload written to stdout.
pub trait ProgressReporter {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress with a current/total pair
    ///
    /// # Arguments
    /// * `current` - Current progress value
    /// * `total` - Total expected value
    /// * `message` - Optional message to include
    fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}
