//! The single place where operation failures become result envelopes.

use futures::FutureExt;
use serde_json::Value;
use std::any::{type_name, Any};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{error, info};

use crate::envelope::ToolEnvelope;
use crate::error::{NotionError, Result};

const GENERIC_OPERATION: &str = "notion operation";

/// Runs `operation` in place and turns its outcome into a [`ToolEnvelope`].
///
/// Emits exactly one log record: `info` on success, `error` on failure.
/// Errors of every origin and panics raised while building or polling the
/// operation all end up as a failed envelope; this function never fails.
pub async fn safe_execute<F, Fut>(label: Option<&str>, operation: F) -> ToolEnvelope
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let name = describe_operation::<F>(label);

    let outcome = match std::panic::catch_unwind(AssertUnwindSafe(operation)) {
        Ok(future) => match AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(panic_error(payload)),
        },
        Err(payload) => Err(panic_error(payload)),
    };

    match outcome {
        Ok(data) => {
            info!(operation = %name, "Success calling {}", name);
            ToolEnvelope::success(data)
        }
        Err(e) => {
            let origin = if e.is_remote() { "remote" } else { "local" };
            error!(
                operation = %name,
                origin,
                error = ?e,
                "Error calling {}: {}",
                name,
                e
            );
            ToolEnvelope::failure(e.to_string())
        }
    }
}

fn describe_operation<F>(label: Option<&str>) -> String {
    if let Some(label) = label.filter(|l| !l.trim().is_empty()) {
        return label.to_string();
    }

    let mut name = type_name::<F>();
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }

    if name.is_empty() || name.contains("{{closure}}") {
        GENERIC_OPERATION.to_string()
    } else {
        name.to_string()
    }
}

fn panic_error(payload: Box<dyn Any + Send>) -> NotionError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    NotionError::Panicked(message)
}
