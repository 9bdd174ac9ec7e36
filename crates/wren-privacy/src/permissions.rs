//! Permission answers
//!
//! | Capability    | Answer                                         |
//! | Geolocation   | Deny in ephemeral views or after mixed content |
//! | Notifications | Allow (desktop notification policy applies)    |
//! | Anything else | No answer, the engine default applies          |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionKind {
    Geolocation,
    Notifications,
    UserMedia,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    Allow,
    Deny,
}

/// What the policy knows about the requesting view
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionContext {
    /// View does not persist any data
    pub ephemeral: bool,
    /// Insecure content was loaded into the current page
    pub insecure_content: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PermissionPolicy;

impl PermissionPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, kind: PermissionKind, context: PermissionContext) -> Option<PermissionState> {
        match kind {
            PermissionKind::Geolocation => {
                if context.ephemeral || context.insecure_content {
                    Some(PermissionState::Deny)
                } else {
                    Some(PermissionState::Allow)
                }
            }
            PermissionKind::Notifications => Some(PermissionState::Allow),
            PermissionKind::UserMedia | PermissionKind::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geolocation() {
        let policy = PermissionPolicy::new();

        assert_eq!(
            policy.decide(PermissionKind::Geolocation, PermissionContext::default()),
            Some(PermissionState::Allow)
        );

        let ephemeral = PermissionContext {
            ephemeral: true,
            ..Default::default()
        };
        assert_eq!(
            policy.decide(PermissionKind::Geolocation, ephemeral),
            Some(PermissionState::Deny)
        );

        let mixed = PermissionContext {
            insecure_content: true,
            ..Default::default()
        };
        assert_eq!(
            policy.decide(PermissionKind::Geolocation, mixed),
            Some(PermissionState::Deny)
        );
    }

    #[test]
    fn test_other_kinds() {
        let policy = PermissionPolicy::new();
        let ephemeral = PermissionContext {
            ephemeral: true,
            insecure_content: true,
        };

        assert_eq!(
            policy.decide(PermissionKind::Notifications, ephemeral),
            Some(PermissionState::Allow)
        );
        assert_eq!(policy.decide(PermissionKind::UserMedia, ephemeral), None);
        assert_eq!(policy.decide(PermissionKind::Other, ephemeral), None);
    }
}
