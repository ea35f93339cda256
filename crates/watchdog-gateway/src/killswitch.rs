//! Process-local kill switch: when active, the gate allows every call
//! through with reason "bypass" and never issues an approval token.
//! Toggling is an audit event — the reason and operator identity are
//! retained alongside the flag itself so a later audit can explain why
//! enforcement was off.

use parking_lot::RwLock;
use tracing::warn;

struct KillSwitchState {
    active: bool,
    reason: Option<String>,
    operator: Option<String>,
}

pub struct KillSwitch {
    state: RwLock<KillSwitchState>,
}

impl KillSwitch {
    pub fn new(default_active: bool) -> Self {
        KillSwitch {
            state: RwLock::new(KillSwitchState {
                active: default_active,
                reason: None,
                operator: None,
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.read().active
    }

    pub fn activate(&self, reason: impl Into<String>, operator: impl Into<String>) {
        let reason = reason.into();
        let operator = operator.into();
        warn!(%reason, %operator, "kill switch activated");
        let mut state = self.state.write();
        state.active = true;
        state.reason = Some(reason);
        state.operator = Some(operator);
    }

    pub fn deactivate(&self, operator: impl Into<String>) {
        let operator = operator.into();
        warn!(%operator, "kill switch deactivated");
        let mut state = self.state.write();
        state.active = false;
        state.reason = None;
        state.operator = Some(operator);
    }

    pub fn reason(&self) -> Option<String> {
        self.state.read().reason.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inactive_by_default() {
        let ks = KillSwitch::new(false);
        assert!(!ks.is_active());
    }

    #[test]
    fn activation_records_reason_and_operator() {
        let ks = KillSwitch::new(false);
        ks.activate("incident response", "operator@example.com");
        assert!(ks.is_active());
        assert_eq!(ks.reason(), Some("incident response".to_string()));
    }

    #[test]
    fn deactivation_clears_the_reason() {
        let ks = KillSwitch::new(false);
        ks.activate("test", "operator");
        ks.deactivate("operator");
        assert!(!ks.is_active());
        assert_eq!(ks.reason(), None);
    }
}
