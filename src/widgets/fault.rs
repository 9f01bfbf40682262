//! Per-widget fault containment
//!
//! A failing widget shows a fallback in its own slot; siblings and the page
//! keep rendering.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

use super::registry::WidgetError;

/// Heading of the fallback shown in place of a failed widget
pub const FAULT_HEADING: &str = "Something went wrong";

/// A contained widget failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct WidgetFault {
    pub message: String,
}

impl From<WidgetError> for WidgetFault {
    fn from(e: WidgetError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// Run a render step, turning both errors and panics into a [`WidgetFault`]
pub fn contain<T>(render: impl FnOnce() -> Result<T, WidgetError>) -> Result<T, WidgetFault> {
    match catch_unwind(AssertUnwindSafe(render)) {
        Ok(result) => result.map_err(WidgetFault::from),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(error = %message, "Widget render panicked");
            Err(WidgetFault { message })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "widget panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        assert_eq!(contain(|| Ok::<_, WidgetError>(3)), Ok(3));
    }

    #[test]
    fn test_error_is_contained() {
        let fault = contain(|| Err::<(), _>(WidgetError::UnknownKind("gauge".into()))).unwrap_err();
        assert_eq!(fault.message, "Unknown widget type: gauge");
    }

    #[test]
    fn test_panic_is_contained() {
        let fault = contain::<()>(|| panic!("row {} missing", 3)).unwrap_err();
        assert_eq!(fault.message, "row 3 missing");

        let siblings: Vec<_> = (0..3)
            .map(|i| contain(|| if i == 1 { panic!("boom") } else { Ok(i) }))
            .collect();
        assert_eq!(siblings[0], Ok(0));
        assert!(siblings[1].is_err());
        assert_eq!(siblings[2], Ok(2));
    }
}
