//! Simulated camera privacy consent.
//!
//! Mirrors the platform flow: access starts out undetermined, the first
//! request shows a (virtual) prompt, and the answer sticks. Denied and
//! restricted states never prompt again.

use parking_lot::Mutex;

use photo_capture_core::traits::camera_platform::AuthorizationStatus;

/// How the simulated user answers the consent prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Allow,
    Deny,
}

/// Consent state for the virtual camera stack.
pub struct AccessPrompt {
    status: Mutex<AuthorizationStatus>,
    answer: PromptAnswer,
    prompts: Mutex<usize>,
}

impl AccessPrompt {
    pub fn new(status: AuthorizationStatus, answer: PromptAnswer) -> Self {
        Self {
            status: Mutex::new(status),
            answer,
            prompts: Mutex::new(0),
        }
    }

    /// Already authorized; never prompts.
    pub fn granted() -> Self {
        Self::new(AuthorizationStatus::Authorized, PromptAnswer::Allow)
    }

    pub fn status(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    /// Ask for access. Prompts only while undetermined.
    pub fn request(&self) -> bool {
        let mut status = self.status.lock();
        if *status == AuthorizationStatus::NotDetermined {
            *self.prompts.lock() += 1;
            *status = match self.answer {
                PromptAnswer::Allow => AuthorizationStatus::Authorized,
                PromptAnswer::Deny => AuthorizationStatus::Denied,
            };
            log::info!("Camera access prompt answered: {:?}", *status);
        }
        status.is_authorized()
    }

    /// Number of prompts shown so far.
    pub fn prompts(&self) -> usize {
        *self.prompts.lock()
    }
}

impl Default for AccessPrompt {
    fn default() -> Self {
        Self::granted()
    }
}
