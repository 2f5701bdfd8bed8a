use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use super::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushPermission {
    Granted,
    Denied,
    /// Not yet decided; resolved once at startup.
    Prompt,
}

impl FromStr for PushPermission {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "granted" => Ok(PushPermission::Granted),
            "denied" => Ok(PushPermission::Denied),
            "prompt" => Ok(PushPermission::Prompt),
            other => Err(format!("unknown push permission {other:?}")),
        }
    }
}

/// Stand-in for a platform push service. Delivery is logged rather than
/// sent anywhere; what matters to callers is the permission gating.
pub struct PushGateway {
    granted: AtomicBool,
    pending_prompt: AtomicBool,
}

impl PushGateway {
    pub fn new(permission: PushPermission) -> Self {
        Self {
            granted: AtomicBool::new(permission == PushPermission::Granted),
            pending_prompt: AtomicBool::new(permission == PushPermission::Prompt),
        }
    }

    /// Resolve a pending prompt. Called once at startup; a no-op when the
    /// permission was already granted or denied. The demo platform always
    /// says yes.
    pub fn request_permission(&self) {
        if self.pending_prompt.swap(false, Ordering::SeqCst) {
            self.granted.store(true, Ordering::SeqCst);
            info!("push permission granted");
        }
    }

    /// Returns whether the notice went out.
    pub fn deliver(&self, notice: &Notice) -> bool {
        if !self.granted.load(Ordering::SeqCst) {
            return false;
        }
        debug!(title = %notice.title, body = %notice.body, "push notification sent");
        true
    }
}
