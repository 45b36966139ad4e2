// Catches processor panics so one bad item cannot take a worker down
use std::any::Any;
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

/// Outcome of a guarded call
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// The call returned (its own `Result` may still be an error)
    Success(T),
    /// The call unwound; carries the panic payload as text
    Panicked(String),
}

/// Run `f`, turning an unwinding panic into [`PanicGuardResult::Panicked`]
///
/// Only unwinding panics are caught; the release profile must not set
/// `panic = "abort"`.
///
/// # Example
/// ```text
/// match execute_guarded(AssertUnwindSafe(|| processor.process(item))) {
///     PanicGuardResult::Success(outcome) => outcome,
///     PanicGuardResult::Panicked(msg) => Err(ProcessError::Panicked(msg)),
/// }
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    catch_unwind(f).map_or_else(
        |payload| {
            let msg = payload_message(payload.as_ref());
            error!(panic_msg = %msg, "Processor panicked");
            PanicGuardResult::Panicked(msg)
        },
        PanicGuardResult::Success,
    )
}

/// `panic!` payloads are `&str` or `String`; anything else has no text
fn payload_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_value_through() {
        match execute_guarded(|| 41 + 1) {
            PanicGuardResult::Success(v) => assert_eq!(v, 42),
            PanicGuardResult::Panicked(msg) => panic!("unexpected panic: {}", msg),
        }
    }

    #[test]
    fn test_string_panic_message_is_captured() {
        let item = "broken.jpg";
        let result: PanicGuardResult<()> = execute_guarded(move || panic!("cannot decode {}", item));

        match result {
            PanicGuardResult::Panicked(msg) => assert_eq!(msg, "cannot decode broken.jpg"),
            PanicGuardResult::Success(_) => panic!("panic was not caught"),
        }
    }

    #[test]
    fn test_non_string_payload() {
        let result: PanicGuardResult<()> = execute_guarded(|| std::panic::panic_any(7u32));
        assert!(matches!(result, PanicGuardResult::Panicked(msg) if msg == "unknown panic payload"));
    }

    #[test]
    fn test_static_str_panic_message_is_captured() {
        let result: PanicGuardResult<()> = execute_guarded(|| panic!("boom"));
        assert!(matches!(result, PanicGuardResult::Panicked(msg) if msg == "boom"));
    }
}
