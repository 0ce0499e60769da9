//! Single-flight gate over the shared "enter login name" prompt.
//!
//! There is exactly one prompt surface in the workspace. A second request
//! while one is outstanding is answered with [`PromptOutcome::Cancelled`]
//! immediately instead of being queued.

use crate::error::PromptError;
use crate::tab::TabId;
use meshterm_config::{Config, LoginNameStore};
use meshterm_directory::Device;
use tokio::sync::oneshot;

/// How a credential prompt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// The user confirmed a non-empty login name.
    Confirmed(String),
    /// The user cancelled, the prompt was superseded, or it was never shown.
    Cancelled,
}

/// What the presentation layer shows while a prompt is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    /// Tab that requested the prompt
    pub owner: TabId,
    /// Device the login is for
    pub device_name: String,
    /// Initial contents of the input field
    pub prefill: String,
}

struct OpenPrompt {
    view: PromptView,
    reply: oneshot::Sender<PromptOutcome>,
}

/// Awaitable answer to [`ModalArbiter::prompt`].
pub struct PendingPrompt {
    rx: oneshot::Receiver<PromptOutcome>,
}

impl PendingPrompt {
    fn resolved(outcome: PromptOutcome) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(outcome);
        Self { rx }
    }

    /// Wait for the prompt to be confirmed or cancelled.
    pub async fn outcome(self) -> PromptOutcome {
        self.rx.await.unwrap_or(PromptOutcome::Cancelled)
    }

    /// Non-blocking check; `None` while the prompt is still open.
    #[cfg(test)]
    pub fn try_outcome(&mut self) -> Option<PromptOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(PromptOutcome::Cancelled),
        }
    }
}

/// Owner of the single credential prompt.
#[derive(Default)]
pub struct ModalArbiter {
    open: Option<OpenPrompt>,
}

impl ModalArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the prompt for `device` on behalf of tab `owner`.
    ///
    /// If a prompt is already outstanding the returned [`PendingPrompt`] is
    /// already resolved as cancelled.
    pub fn prompt(&mut self, owner: TabId, device: &Device, prefill: String) -> PendingPrompt {
        if let Some(open) = &self.open {
            log::debug!(
                "Prompt for tab {} rejected: tab {} already has the prompt",
                owner,
                open.view.owner
            );
            return PendingPrompt::resolved(PromptOutcome::Cancelled);
        }

        let (reply, rx) = oneshot::channel();
        self.open = Some(OpenPrompt {
            view: PromptView {
                owner,
                device_name: device.display_name.clone(),
                prefill,
            },
            reply,
        });
        log::debug!("Prompt opened for tab {} ({})", owner, device.name);
        PendingPrompt { rx }
    }

    /// Confirm the open prompt. Blank input keeps the prompt open.
    pub fn confirm(&mut self, input: &str) -> Result<(), PromptError> {
        let login = input.trim();
        if self.open.is_none() {
            return Err(PromptError::NotOpen);
        }
        if login.is_empty() {
            return Err(PromptError::EmptyLoginName);
        }
        self.resolve(PromptOutcome::Confirmed(login.to_string()));
        Ok(())
    }

    /// Cancel the open prompt, if any.
    pub fn cancel(&mut self) {
        self.resolve(PromptOutcome::Cancelled);
    }

    /// Cancel the open prompt only if `owner` requested it.
    pub fn cancel_for(&mut self, owner: TabId) {
        if self.current().is_some_and(|view| view.owner == owner) {
            self.cancel();
        }
    }

    /// The prompt currently shown, if any.
    pub fn current(&self) -> Option<&PromptView> {
        self.open.as_ref().map(|open| &open.view)
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn resolve(&mut self, outcome: PromptOutcome) {
        // Gate is released before the waiter observes the outcome
        if let Some(open) = self.open.take() {
            let _ = open.reply.send(outcome);
        }
    }
}

/// Initial prompt contents: the remembered login for this device, else the
/// configured default for its OS, else empty.
pub fn prefill_for(device: &Device, store: &LoginNameStore, config: &Config) -> String {
    store
        .get(device.identity())
        .or_else(|| config.default_login_for_os(&device.os))
        .unwrap_or_default()
        .to_string()
}
