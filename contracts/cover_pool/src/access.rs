use crate::error::Error;
use crate::storage::Storage;
use soroban_sdk::{Address, Env};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Owner,
    Governance,
    ClaimManager,
}

/// Fails with `Unauthorized` unless `caller` holds `role`, then requires its
/// signature.
pub fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), Error> {
    require_any_role(env, caller, &[role])
}

pub fn require_any_role(env: &Env, caller: &Address, roles: &[Role]) -> Result<(), Error> {
    let stored = Storage::get_roles(env)?;
    let allowed = roles.iter().any(|role| {
        let holder = match role {
            Role::Owner => &stored.owner,
            Role::Governance => &stored.governance,
            Role::ClaimManager => &stored.claim_manager,
        };
        holder == caller
    });
    if !allowed {
        return Err(Error::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}
