//! Session data for the organisation-selection handoff flow.
//!
//! A relying application opens a session describing who is selecting,
//! where to redirect afterwards, and which organisations may be chosen.
//! The exact camelCase JSON shape here is what gets persisted in the
//! distributed cache and must round-trip losslessly.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Heading and hint text shown on the selection page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPrompt {
    /// Page heading (e.g. "Choose an organisation").
    pub heading: String,

    /// Supporting hint text under the heading.
    pub hint: String,
}

/// One selectable organisation, as summarized for the selection page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationOption {
    /// Stable identifier the callback payload reports back.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Registered organisation number, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_number: Option<String>,
}

/// The data held for one handoff session.
///
/// Created by the relying application's session-creation call, read any
/// number of times until the selection completes, then invalidated.
/// `expires` is always `created` plus the configured session timeout.
///
/// # Example
///
/// ```rust
/// use handoff_session::SessionData;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// let data = SessionData::new(
///     "acme",
///     Uuid::new_v4(),
///     "https://app.acme.example/callback",
///     Duration::minutes(10),
/// );
/// assert_eq!(data.expires, data.created + Duration::minutes(10));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    /// When the session was created.
    pub created: DateTime<Utc>,

    /// Absolute expiry: `created` + configured timeout.
    pub expires: DateTime<Utc>,

    /// Identifier of the relying application.
    pub client_id: String,

    /// Opaque identifier of the user performing the selection.
    pub user_id: Uuid,

    /// Absolute URL the browser is redirected to with the signed payload.
    pub callback_url: String,

    /// Heading and hint shown on the selection page.
    pub prompt: SelectionPrompt,

    /// Ordered list of selectable organisations.
    pub organisation_options: Vec<OrganisationOption>,

    /// Whether the user may cancel instead of selecting.
    pub allow_cancel: bool,
}

impl SessionData {
    /// Create session data expiring `timeout` after now.
    ///
    /// # Arguments
    ///
    /// * `client_id` - Identifier of the relying application
    /// * `user_id` - Opaque user identifier
    /// * `callback_url` - Absolute callback URL
    /// * `timeout` - Session lifetime
    pub fn new(
        client_id: impl Into<String>,
        user_id: Uuid,
        callback_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let created = Utc::now();
        Self {
            created,
            expires: created + timeout,
            client_id: client_id.into(),
            user_id,
            callback_url: callback_url.into(),
            prompt: SelectionPrompt::default(),
            organisation_options: Vec::new(),
            allow_cancel: true,
        }
    }

    /// Set the selection-page prompt.
    pub fn with_prompt(mut self, heading: impl Into<String>, hint: impl Into<String>) -> Self {
        self.prompt = SelectionPrompt {
            heading: heading.into(),
            hint: hint.into(),
        };
        self
    }

    /// Set the selectable organisations.
    pub fn with_options(mut self, options: Vec<OrganisationOption>) -> Self {
        self.organisation_options = options;
        self
    }

    /// Set whether the user may cancel the selection.
    pub fn with_allow_cancel(mut self, allow_cancel: bool) -> Self {
        self.allow_cancel = allow_cancel;
        self
    }

    /// Check whether the session has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires
    }
}
