// Session end notification

use std::fmt;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    /// The user logged out explicitly
    LoggedOut,
    /// The access token was rejected and could not be renewed
    Expired,
    /// Tokens were issued but the login could not be completed
    LoginIncomplete,
}

impl fmt::Display for SessionEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEndReason::LoggedOut => f.write_str("logged out"),
            SessionEndReason::Expired => f.write_str("session expired"),
            SessionEndReason::LoginIncomplete => f.write_str("login incomplete"),
        }
    }
}

/// Called after session state has been cleared.
///
/// The UI layer decides what ending a session looks like (going back to the
/// login screen, printing a notice, ...). Implementations must not call back
/// into the client synchronously.
pub trait SessionExpiredHandler: Send + Sync {
    fn on_session_end(&self, reason: SessionEndReason);
}

/// Handler that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl SessionExpiredHandler for LoggingHandler {
    fn on_session_end(&self, reason: SessionEndReason) {
        match reason {
            SessionEndReason::LoggedOut => tracing::info!("Session ended: {}", reason),
            SessionEndReason::Expired => {
                tracing::warn!("Session ended: {}, login required", reason)
            }
            SessionEndReason::LoginIncomplete => tracing::debug!("Session ended: {}", reason),
        }
    }
}

impl<F> SessionExpiredHandler for F
where
    F: Fn(SessionEndReason) + Send + Sync,
{
    fn on_session_end(&self, reason: SessionEndReason) {
        self(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = move |reason: SessionEndReason| sink.lock().unwrap().push(reason);

        handler.on_session_end(SessionEndReason::Expired);
        handler.on_session_end(SessionEndReason::LoggedOut);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![SessionEndReason::Expired, SessionEndReason::LoggedOut]
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(SessionEndReason::Expired.to_string(), "session expired");
        assert_eq!(SessionEndReason::LoggedOut.to_string(), "logged out");
        assert_eq!(SessionEndReason::LoginIncomplete.to_string(), "login incomplete");
    }
}
