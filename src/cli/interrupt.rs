use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::IplistError;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static SIGNAL_INSTALL_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

pub fn install_handler() -> Result<(), IplistError> {
    let result = SIGNAL_INSTALL_RESULT.get_or_init(|| {
        ctrlc::set_handler(|| {
            INTERRUPTED.store(true, Ordering::SeqCst);
        })
        .map_err(|err| err.to_string())
    });

    result
        .clone()
        .map_err(|reason| IplistError::SignalHandlerInstall { reason })
}

fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Checked between files so a long batch stops at a file boundary.
pub fn ensure_not_interrupted() -> Result<(), IplistError> {
    if was_interrupted() {
        Err(IplistError::Interrupted)
    } else {
        Ok(())
    }
}
