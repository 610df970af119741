use uuid::Uuid;

use tourbook_shared::Masked;

use crate::credentials::{hash_password, verify_password};
use crate::identity::{Caller, Role};
use crate::models::{normalize_email, NewUser, Registration, User};
use crate::repository::UserRepository;
use crate::{CoreError, CoreResult};

/// Create a USER account from a public sign-up.
pub async fn register(users: &dyn UserRepository, registration: Registration) -> CoreResult<User> {
    registration.validate()?;

    let user = users
        .create_user(NewUser {
            name: registration
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            email: normalize_email(&registration.email),
            password_hash: hash_password(&registration.password)?,
            role: Role::User,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.id, Masked(user.email.as_str()));
    Ok(user)
}

/// Check credentials. Unknown email and wrong password fail the same way.
pub async fn authenticate(users: &dyn UserRepository, email: &str, password: &str) -> CoreResult<User> {
    let record = users.find_by_email(&normalize_email(email)).await?;

    match record {
        Some(record) if verify_password(password, &record.password_hash) => Ok(record.user),
        _ => Err(CoreError::Unauthenticated("Invalid email or password".to_string())),
    }
}

/// Change another user's role. Admins cannot change their own role.
pub async fn change_role(
    users: &dyn UserRepository,
    caller: &Caller,
    target_id: Uuid,
    requested: &str,
) -> CoreResult<User> {
    caller.require_admin()?;
    let role: Role = requested.parse()?;

    if caller.id == target_id {
        return Err(CoreError::InvalidInput("You cannot change your own role".to_string()));
    }

    users.update_role(target_id, role).await
}
