//! Lifecycle state machine.
//!
//! `New → Installing → Waiting → Activating → Activated`. The controller
//! only guards transitions; the work (prefetching, partition cleanup,
//! claiming clients) lives on [`crate::Engine`]. A failed install rolls
//! back to `New` so the attempt can be retried; a failed activation rolls
//! back to `Waiting`.
//!
//! "Ready to take over" (`Waiting`) is deliberately decoupled from "took
//! over" (`Activated`): the controlling client decides when to issue
//! skip-waiting, so a version never activates while entries it would
//! invalidate are in flight.

use shelter_core::Error;
use tokio::sync::RwLock;

/// Engine lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    New,
    Installing,
    Waiting,
    Activating,
    Activated,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::New => "new",
            LifecycleState::Installing => "installing",
            LifecycleState::Waiting => "waiting",
            LifecycleState::Activating => "activating",
            LifecycleState::Activated => "activated",
        }
    }
}

/// Guards lifecycle transitions.
#[derive(Debug)]
pub struct LifecycleController {
    state: RwLock<LifecycleState>,
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleController {
    pub fn new() -> Self {
        Self { state: RwLock::new(LifecycleState::New) }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    async fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::Lifecycle(format!(
                "cannot move to {} from {}, expected {}",
                to.as_str(),
                state.as_str(),
                from.as_str()
            )));
        }
        *state = to;
        Ok(())
    }

    pub async fn begin_install(&self) -> Result<(), Error> {
        self.transition(LifecycleState::New, LifecycleState::Installing).await
    }

    pub async fn finish_install(&self) -> Result<(), Error> {
        self.transition(LifecycleState::Installing, LifecycleState::Waiting)
            .await
    }

    /// Roll a failed install back so it can be retried.
    pub async fn fail_install(&self) {
        *self.state.write().await = LifecycleState::New;
    }

    pub async fn begin_activate(&self) -> Result<(), Error> {
        self.transition(LifecycleState::Waiting, LifecycleState::Activating)
            .await
    }

    pub async fn finish_activate(&self) -> Result<(), Error> {
        self.transition(LifecycleState::Activating, LifecycleState::Activated)
            .await
    }

    /// Roll a failed activation back to waiting.
    pub async fn fail_activate(&self) {
        *self.state.write().await = LifecycleState::Waiting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_transition_sequence() {
        let ctl = LifecycleController::new();
        assert_eq!(ctl.state().await, LifecycleState::New);

        ctl.begin_install().await.unwrap();
        assert_eq!(ctl.state().await, LifecycleState::Installing);

        ctl.finish_install().await.unwrap();
        assert_eq!(ctl.state().await, LifecycleState::Waiting);

        ctl.begin_activate().await.unwrap();
        assert_eq!(ctl.state().await, LifecycleState::Activating);

        ctl.finish_activate().await.unwrap();
        assert_eq!(ctl.state().await, LifecycleState::Activated);
    }

    #[tokio::test]
    async fn test_activate_before_install_rejected() {
        let ctl = LifecycleController::new();
        let result = ctl.begin_activate().await;
        assert!(matches!(result, Err(Error::Lifecycle(_))));
    }

    #[tokio::test]
    async fn test_double_install_rejected() {
        let ctl = LifecycleController::new();
        ctl.begin_install().await.unwrap();
        assert!(matches!(ctl.begin_install().await, Err(Error::Lifecycle(_))));
    }

    #[tokio::test]
    async fn test_fail_install_allows_retry() {
        let ctl = LifecycleController::new();
        ctl.begin_install().await.unwrap();
        ctl.fail_install().await;
        assert_eq!(ctl.state().await, LifecycleState::New);
        assert!(ctl.begin_install().await.is_ok());
    }
}
