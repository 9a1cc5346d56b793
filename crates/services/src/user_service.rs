//! User service: account administration.

use common::UserId;
use domain::{Actor, NewUser, User, UserChanges};
use store::Store;

use crate::error::{Result, ServiceError};

/// Service for managing user accounts. Admin only.
pub struct UserService<S: Store> {
    store: S,
}

impl<S: Store> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn authorize(actor: Actor) -> Result<()> {
        if !actor.role.can_manage_users() {
            return Err(ServiceError::forbidden("manage users"));
        }
        Ok(())
    }

    /// Registers a user. The password is hashed before it reaches the store.
    #[tracing::instrument(skip(self, input), fields(actor = %actor.user_id, role = %input.role))]
    pub async fn create_user(&self, actor: Actor, input: NewUser) -> Result<User> {
        Self::authorize(actor)?;
        let user = self.store.insert_user(input.into_record()?).await?;
        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Updates name, role and active flag. The email is immutable.
    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn update_user(
        &self,
        actor: Actor,
        id: UserId,
        changes: UserChanges,
    ) -> Result<User> {
        Self::authorize(actor)?;
        Ok(self.store.update_user(id, changes.validate()?).await?)
    }

    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn deactivate_user(&self, actor: Actor, id: UserId) -> Result<User> {
        Self::authorize(actor)?;
        let user = self.store.deactivate_user(id).await?;
        tracing::info!(user_id = %id, "user deactivated");
        Ok(user)
    }
}
