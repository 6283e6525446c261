use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::domain::PriorityTier;

/// Notification transports a lead can fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Customer confirmation e-mail.
    Email,
    /// Staff-facing alert posted to the internal webhook.
    InternalAlert,
    /// Customer text message.
    Sms,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::InternalAlert, Channel::Sms];

    /// Channels attempted for a tier. Each tier's set contains every lower tier's set.
    pub fn eligible_for(tier: PriorityTier) -> &'static [Channel] {
        match tier {
            PriorityTier::Low => &[Channel::Email],
            PriorityTier::Medium => &[Channel::Email, Channel::InternalAlert],
            PriorityTier::High | PriorityTier::Emergency => {
                &[Channel::Email, Channel::InternalAlert, Channel::Sms]
            }
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::InternalAlert => "internal_alert",
            Channel::Sms => "sms",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
