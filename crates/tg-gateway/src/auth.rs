//! Owner/guest/unknown role resolution, ported 1:1 from
//! `original_source/tg_gateway/src/auth.cpp`. Guest sessions are resolved
//! by the caller consulting `guest::GuestStore::is_guest_active` — this
//! module only knows about the fixed owner id and the command allowlist.

use soulscout_core::command::Role;

const OWNER_ONLY_COMMANDS: &[&str] = &["silence", "resume", "add_wallet", "remove_wallet", "guest"];

pub struct Authenticator {
    owner_id: i64,
}

impl Authenticator {
    pub fn new(owner_id: i64) -> Self {
        Self { owner_id }
    }

    /// Resolves the base role from identity alone. Guest status (PIN
    /// redemption) is layered on top by the caller since it depends on
    /// session state this module doesn't hold.
    pub fn authenticate(&self, tg_user_id: i64) -> Role {
        if tg_user_id == self.owner_id {
            Role::Owner
        } else {
            Role::Unknown
        }
    }

    pub fn is_command_allowed(&self, cmd: &str, role: Role) -> bool {
        match role {
            Role::Owner => true,
            Role::Guest => !Self::is_owner_only_command(cmd),
            Role::Unknown => cmd == "start" || cmd == "help",
        }
    }

    fn is_owner_only_command(cmd: &str) -> bool {
        OWNER_ONLY_COMMANDS.contains(&cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_resolves_to_owner_role() {
        let auth = Authenticator::new(42);
        assert_eq!(auth.authenticate(42), Role::Owner);
    }

    #[test]
    fn other_ids_resolve_to_unknown() {
        let auth = Authenticator::new(42);
        assert_eq!(auth.authenticate(7), Role::Unknown);
    }

    #[test]
    fn owner_can_do_anything() {
        let auth = Authenticator::new(42);
        assert!(auth.is_command_allowed("silence", Role::Owner));
        assert!(auth.is_command_allowed("balance", Role::Owner));
    }

    #[test]
    fn guest_cannot_use_owner_only_commands() {
        let auth = Authenticator::new(42);
        assert!(!auth.is_command_allowed("silence", Role::Guest));
        assert!(!auth.is_command_allowed("add_wallet", Role::Guest));
        assert!(auth.is_command_allowed("balance", Role::Guest));
        assert!(auth.is_command_allowed("signals", Role::Guest));
    }

    #[test]
    fn unknown_only_gets_start_and_help() {
        let auth = Authenticator::new(42);
        assert!(auth.is_command_allowed("start", Role::Unknown));
        assert!(auth.is_command_allowed("help", Role::Unknown));
        assert!(!auth.is_command_allowed("balance", Role::Unknown));
    }
}
