use crate::notify::notify_user_created;
use crate::userdb::{Identity, User, UsersRepository};

use super::context::AuthContext;
use super::errors::CoordinationError;

/// Find-or-create the local user for `identity`. The flag is `true` when the user is new.
pub async fn find_or_create(
    users: &dyn UsersRepository,
    identity: &Identity,
) -> Result<(User, bool), CoordinationError> {
    Ok(users.find_or_create_user(identity).await?)
}

/// Reconcile `identity` and announce the user if this call created it.
pub(super) async fn reconcile_identity(
    ctx: &AuthContext,
    identity: &Identity,
) -> Result<User, CoordinationError> {
    let (user, created) = find_or_create(ctx.users.as_ref(), identity).await?;
    if created {
        notify_user_created(ctx.notifier.clone(), user.clone());
    }
    Ok(user)
}
