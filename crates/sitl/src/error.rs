/// Errors that can occur while driving the simulated rig.
#[derive(Debug, thiserror::Error)]
pub enum SitlError {
    #[error("kernel error: {0}")]
    Kernel(&'static str),

    #[error("scenario timed out waiting for {0}")]
    Timeout(&'static str),
}
