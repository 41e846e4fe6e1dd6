//! Client hub: the explicit subscriber list the engine broadcasts to.
//!
//! Each client session holds the sending half of an unbounded channel;
//! the session's owner consumes the receiving half. Sessions start
//! uncontrolled — they belong to whatever engine version was active when
//! they opened — and become controlled when a new version claims them
//! during activation. Broadcasts go to controlled sessions only and
//! return the list of recipients.

use shelter_core::ClientMessage;
use tokio::sync::{Mutex, mpsc};

pub type ClientId = u64;

/// Result of [`ClientHub::focus_or_open`].
#[derive(Debug)]
pub enum WindowOutcome {
    /// An existing session was told to focus its window.
    Focused(ClientId),
    /// No session existed; a new controlled one was opened. The receiver
    /// is the new window's message stream.
    Opened(ClientId, mpsc::UnboundedReceiver<ClientMessage>),
}

struct Session {
    id: ClientId,
    controlled: bool,
    sender: mpsc::UnboundedSender<ClientMessage>,
}

#[derive(Default)]
struct HubInner {
    next_id: ClientId,
    sessions: Vec<Session>,
}

/// Registry of live client sessions.
#[derive(Default)]
pub struct ClientHub {
    inner: Mutex<HubInner>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, initially uncontrolled session.
    pub async fn subscribe(&self) -> (ClientId, mpsc::UnboundedReceiver<ClientMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.sessions.push(Session { id, controlled: false, sender });
        (id, receiver)
    }

    /// Take control of every session. Returns how many were claimed
    /// (previously uncontrolled).
    pub async fn claim_all(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let mut claimed = 0;
        for session in &mut inner.sessions {
            if !session.controlled {
                session.controlled = true;
                claimed += 1;
            }
        }
        claimed
    }

    /// Post a message to every controlled session.
    ///
    /// Sessions whose receiver is gone are dropped from the hub. Returns
    /// the ids that actually received the message.
    pub async fn broadcast(&self, message: ClientMessage) -> Vec<ClientId> {
        let mut inner = self.inner.lock().await;
        let mut recipients = Vec::new();
        inner.sessions.retain(|session| {
            if !session.controlled {
                return true;
            }
            match session.sender.send(message.clone()) {
                Ok(()) => {
                    recipients.push(session.id);
                    true
                }
                Err(_) => false,
            }
        });
        recipients
    }

    /// Post a message to one session. Returns false if the session is
    /// gone or its receiver was dropped.
    pub async fn post(&self, id: ClientId, message: ClientMessage) -> bool {
        let inner = self.inner.lock().await;
        inner
            .sessions
            .iter()
            .find(|s| s.id == id)
            .is_some_and(|s| s.sender.send(message).is_ok())
    }

    /// Focus an existing session's window, or open a new one.
    pub async fn focus_or_open(&self, url: &str) -> WindowOutcome {
        {
            let inner = self.inner.lock().await;
            if let Some(session) = inner.sessions.iter().find(|s| s.sender.send(ClientMessage::WindowFocus { url: url.to_string() }).is_ok()) {
                return WindowOutcome::Focused(session.id);
            }
        }

        let (id, receiver) = self.subscribe().await;
        self.inner
            .lock()
            .await
            .sessions
            .iter_mut()
            .filter(|s| s.id == id)
            .for_each(|s| s.controlled = true);
        WindowOutcome::Opened(id, receiver)
    }

    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    pub async fn controlled_count(&self) -> usize {
        self.inner
            .lock()
            .await
            .sessions
            .iter()
            .filter(|s| s.controlled)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_starts_uncontrolled() {
        let hub = ClientHub::new();
        let (_id, _rx) = hub.subscribe().await;
        assert_eq!(hub.session_count().await, 1);
        assert_eq!(hub.controlled_count().await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_skips_uncontrolled() {
        let hub = ClientHub::new();
        let (_id, mut rx) = hub.subscribe().await;

        let recipients = hub.broadcast(ClientMessage::SkipWaiting).await;
        assert!(recipients.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_claim_then_broadcast() {
        let hub = ClientHub::new();
        let (id1, mut rx1) = hub.subscribe().await;
        let (id2, mut rx2) = hub.subscribe().await;

        assert_eq!(hub.claim_all().await, 2);
        assert_eq!(hub.claim_all().await, 0); // already controlled

        let msg = ClientMessage::BackgroundSync { tag: "sync".into() };
        let recipients = hub.broadcast(msg.clone()).await;
        assert_eq!(recipients, vec![id1, id2]);
        assert_eq!(rx1.try_recv().unwrap(), msg);
        assert_eq!(rx2.try_recv().unwrap(), msg);
    }

    #[tokio::test]
    async fn test_broadcast_prunes_dead_sessions() {
        let hub = ClientHub::new();
        let (_id1, rx1) = hub.subscribe().await;
        let (id2, mut rx2) = hub.subscribe().await;
        hub.claim_all().await;

        drop(rx1);
        let recipients = hub.broadcast(ClientMessage::SkipWaiting).await;
        assert_eq!(recipients, vec![id2]);
        assert_eq!(hub.session_count().await, 1);
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_post_to_one_session() {
        let hub = ClientHub::new();
        let (id1, mut rx1) = hub.subscribe().await;
        let (_id2, mut rx2) = hub.subscribe().await;

        assert!(hub.post(id1, ClientMessage::SkipWaiting).await);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());

        assert!(!hub.post(999, ClientMessage::SkipWaiting).await);
    }

    #[tokio::test]
    async fn test_focus_existing_session() {
        let hub = ClientHub::new();
        let (id, mut rx) = hub.subscribe().await;

        match hub.focus_or_open("./").await {
            WindowOutcome::Focused(focused) => assert_eq!(focused, id),
            WindowOutcome::Opened(..) => panic!("expected focus"),
        }
        assert_eq!(rx.try_recv().unwrap(), ClientMessage::WindowFocus { url: "./".into() });
    }

    #[tokio::test]
    async fn test_open_when_no_sessions() {
        let hub = ClientHub::new();
        match hub.focus_or_open("./").await {
            WindowOutcome::Opened(_id, _rx) => {
                assert_eq!(hub.session_count().await, 1);
                assert_eq!(hub.controlled_count().await, 1);
            }
            WindowOutcome::Focused(_) => panic!("expected open"),
        }
    }
}
