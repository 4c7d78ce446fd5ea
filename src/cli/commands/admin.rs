//! Create admin command handler

use crate::config::Config;
use crate::models::Role;
use crate::services::{AuthError, NewAccount};
use crate::state::SharedState;

pub async fn cmd_create_admin(
    config: Config,
    email: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let result = state
        .auth_service
        .create_account(NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::Admin,
            phone: None,
        })
        .await;

    match result {
        Ok(user) => {
            println!("✓ Created admin '{}' <{}> (ID: {})", user.username, user.email, user.id);
            Ok(())
        }
        Err(AuthError::EmailTaken) => {
            println!("An account with email {email} already exists.");
            Ok(())
        }
        Err(AuthError::Policy(e)) => {
            println!("Password rejected: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
