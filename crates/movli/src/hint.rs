use movli_core::{SessionStatus, Snapshot};

/// Shown instead of the conversation while nobody is signed in.
pub const SIGNED_OUT_HINT: &str = "Please log in to chat (/login).";

/// Shown to a signed-in user whose conversation is still empty.
pub const WELCOME_HINT: &str =
    "Ask me to recommend a movie, or tell me what you're in the mood for!";

/// Returns the placeholder to draw in place of the conversation, if any.
///
/// Nothing is shown while a request is outstanding or once the
/// conversation has messages.
pub fn empty_state(snapshot: &Snapshot) -> Option<&'static str> {
    match snapshot.status {
        SessionStatus::LoggedOut => Some(SIGNED_OUT_HINT),
        SessionStatus::Idle if snapshot.messages.is_empty() => {
            Some(WELCOME_HINT)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use movli_model::{Identity, Message};

    use super::*;

    fn snapshot(status: SessionStatus, messages: Vec<Message>) -> Snapshot {
        Snapshot {
            pending: status.is_pending(),
            identity: (status != SessionStatus::LoggedOut)
                .then(|| Identity::new("alice")),
            messages,
            status,
            draft: String::new(),
        }
    }

    #[test]
    fn test_empty_state() {
        let logged_out = snapshot(SessionStatus::LoggedOut, vec![]);
        assert_eq!(empty_state(&logged_out), Some(SIGNED_OUT_HINT));

        let fresh = snapshot(SessionStatus::Idle, vec![]);
        assert_eq!(empty_state(&fresh), Some(WELCOME_HINT));

        let loading = snapshot(SessionStatus::HydratingHistory, vec![]);
        assert_eq!(empty_state(&loading), None);

        let chatting = snapshot(SessionStatus::Idle, vec![Message::user("hi")]);
        assert_eq!(empty_state(&chatting), None);
    }
}
