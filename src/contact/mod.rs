/// Contact form state machine
///
/// Independent of the gallery. The UI layer feeds field edits and the
/// submit action in; the relay result comes back through `finish`.

pub mod relay;

use relay::{RelayPayload, SubmitError};

pub const SENDING_MESSAGE: &str = "Sending message...";
pub const SENT_MESSAGE: &str = "✓ Message sent successfully! I'll get back to you soon.";
pub const PLACEHOLDER_KEY_MESSAGE: &str =
    "⚠ Please add your form relay access key to the config file first.";

/// The four user-editable fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactFields {
    /// Returns a user-facing message for the first invalid field
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("Please enter your name.");
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("Please enter a valid email address.");
        }
        if self.subject.trim().is_empty() {
            return Err("Please enter a subject.");
        }
        if self.message.trim().is_empty() {
            return Err("Please enter a message.");
        }
        Ok(())
    }
}

/// Status line under the form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Sending,
    Sent,
    Failed(String),
}

impl FormStatus {
    pub fn text(&self) -> &str {
        match self {
            FormStatus::Idle => "",
            FormStatus::Sending => SENDING_MESSAGE,
            FormStatus::Sent => SENT_MESSAGE,
            FormStatus::Failed(message) => message,
        }
    }
}

/// What to do after a finished submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Clear the status after the configured delay; carries the status generation
    ClearStatusLater(u64),
    Nothing,
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub fields: ContactFields,
    status: FormStatus,
    submitting: bool,
    /// Bumped on every status change so stale clear timers are ignored
    generation: u64,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        !self.submitting
    }

    fn set_status(&mut self, status: FormStatus) {
        self.status = status;
        self.generation += 1;
    }

    /// Start a submission. Returns the payload to send, or None if nothing should be sent.
    pub fn submit(&mut self, access_key: &str) -> Option<RelayPayload> {
        if self.submitting {
            return None;
        }
        if let Err(message) = self.fields.validate() {
            self.set_status(FormStatus::Failed(message.to_string()));
            return None;
        }

        self.submitting = true;
        self.set_status(FormStatus::Sending);
        Some(RelayPayload::new(access_key, &self.fields))
    }

    /// Apply the relay's verdict
    ///
    /// The submit control is re-enabled whatever the outcome.
    pub fn finish(
        &mut self,
        result: Result<(), SubmitError>,
        key_is_placeholder: bool,
        contact_email: &str,
    ) -> Followup {
        self.submitting = false;

        match result {
            Ok(()) => {
                tracing::info!("contact form sent");
                self.fields = ContactFields::default();
                self.set_status(FormStatus::Sent);
                Followup::ClearStatusLater(self.generation)
            }
            Err(error) => {
                tracing::error!(%error, "form submission error");
                let message = if key_is_placeholder {
                    PLACEHOLDER_KEY_MESSAGE.to_string()
                } else {
                    format!(
                        "✗ Failed to send message. Please try again or email directly at {}",
                        contact_email
                    )
                };
                self.set_status(FormStatus::Failed(message));
                Followup::Nothing
            }
        }
    }

    /// Clear the status if nothing newer replaced it since the timer started
    pub fn clear_status(&mut self, generation: u64) {
        if generation == self.generation {
            self.status = FormStatus::Idle;
        }
    }
}
