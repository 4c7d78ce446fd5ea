//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::task;
use tracing::{info, warn};

use crate::db::{NewUser, Store, TokenRecord};
use crate::models::{Credentials, Role, User};
use crate::security::{
    Claims, FieldCipher, Identity, LoginThrottle, OtpError, PasswordPolicy, TokenIssuer,
    check_strength, is_password_expired, otp,
};
use crate::services::activity::{ActivityLogService, actions};
use crate::services::auth_service::{
    AuthError, AuthService, LoginOutcome, NewAccount, SessionInfo, UserSummary,
};
use crate::services::notifier::{Notifier, send_best_effort, templates};

/// Lower-cased and trimmed; the form emails are stored and looked up in.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// OTP checks share the login throttle under their own namespace.
fn otp_key(user_id: i32) -> String {
    format!("otp:{user_id}")
}

pub struct SeaOrmAuthService {
    store: Store,
    policy: PasswordPolicy,
    tokens: TokenIssuer,
    cipher: FieldCipher,
    notifier: Arc<dyn Notifier>,
    activity: ActivityLogService,
    throttle: Arc<LoginThrottle>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        policy: PasswordPolicy,
        tokens: TokenIssuer,
        cipher: FieldCipher,
        notifier: Arc<dyn Notifier>,
        throttle: Arc<LoginThrottle>,
    ) -> Self {
        Self {
            activity: ActivityLogService::new(store.clone()),
            store,
            policy,
            tokens,
            cipher,
            notifier,
            throttle,
        }
    }

    /// Runs the password policy on the blocking pool; Argon2 is CPU-bound.
    async fn apply_password(
        &self,
        mut credentials: Credentials,
        plaintext: &str,
    ) -> Result<Credentials, AuthError> {
        let policy = self.policy.clone();
        let plaintext = plaintext.to_string();

        task::spawn_blocking(move || {
            policy
                .set_password(&mut credentials, &plaintext, Utc::now())
                .map(|()| credentials)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))?
        .map_err(AuthError::from)
    }

    async fn check_password(hash: &str, plaintext: &str) -> Result<bool, AuthError> {
        let hash = hash.to_string();
        let plaintext = plaintext.to_string();

        task::spawn_blocking(move || PasswordPolicy::verify(&hash, &plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task panicked: {e}")))
    }

    async fn user_by_email(&self, email: &str) -> Result<User, AuthError> {
        self.store
            .get_user_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn mint_session(&self, user: &User) -> Result<SessionInfo, AuthError> {
        let now = Utc::now();
        let issued = self
            .tokens
            .issue(&Identity::from(user), now)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.store
            .record_token(TokenRecord {
                user_id: user.id,
                jti: issued.claims.jti.clone(),
                token_hash: issued.hash(),
                issued_at: issued.issued_at(),
                expires_at: issued.expires_at(),
            })
            .await?;

        Ok(SessionInfo {
            expires_at: issued.expires_at().to_rfc3339(),
            token: issued.token,
            user: UserSummary::from(user),
            password_expired: is_password_expired(&user.credentials, now),
        })
    }

    async fn failed_login(&self, key: &str) -> AuthError {
        self.throttle.record_failure(key).await;
        metrics::counter!("auth_login_failures_total").increment(1);
        if let Err(e) = self
            .activity
            .record(None, actions::USER_LOGIN_FAILED, json!({ "email": key }))
            .await
        {
            warn!(error = %e, "Failed to record login failure");
        }
        AuthError::InvalidCredentials
    }

    /// Checks `code` against the pending challenge. The returned credentials
    /// have the challenge cleared and are not yet saved. Too many mismatches
    /// discard the challenge and lock OTP checks for the user.
    async fn consume_otp(&self, user: &User, code: &str) -> Result<Credentials, AuthError> {
        let key = otp_key(user.id);
        if let Some(remaining) = self.throttle.check(&key).await {
            return Err(AuthError::TooManyAttempts {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }

        let mut credentials = user.credentials.clone();
        match otp::verify(&mut credentials, code, Utc::now()) {
            Ok(()) => {
                self.throttle.record_success(&key).await;
                Ok(credentials)
            }
            Err(OtpError::Mismatch) => {
                let Some(lockout) = self.throttle.record_failure(&key).await else {
                    return Err(OtpError::Mismatch.into());
                };
                self.store.save_otp(user.id, None).await?;
                warn!(user_id = user.id, "OTP attempts exhausted, challenge discarded");
                Err(AuthError::TooManyAttempts {
                    retry_after_secs: lockout.as_secs().max(1),
                })
            }
            Err(e) => {
                if credentials.otp != user.credentials.otp {
                    self.store.save_otp(user.id, credentials.otp.as_ref()).await?;
                }
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn create_account(&self, account: NewAccount) -> Result<User, AuthError> {
        let email = normalize_email(&account.email);
        if self.store.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let credentials = self
            .apply_password(Credentials::default(), &account.password)
            .await?;

        let phone = account
            .phone
            .as_deref()
            .map(|p| self.cipher.encrypt(p))
            .transpose()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = self
            .store
            .create_user(NewUser {
                username: account.username.trim().to_string(),
                email,
                role: account.role,
                phone,
                credentials,
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "Account created");
        Ok(user)
    }

    async fn register(&self, account: NewAccount) -> Result<i32, AuthError> {
        let user = self
            .create_account(NewAccount {
                role: Role::User,
                ..account
            })
            .await?;

        let mut credentials = user.credentials.clone();
        let code = otp::issue(&mut credentials, Utc::now());
        self.store.save_otp(user.id, credentials.otp.as_ref()).await?;

        let (subject, body) = templates::registration_otp(&code);
        send_best_effort(self.notifier.as_ref(), &user.email, subject, &body).await;

        self.activity
            .record(
                Some(user.id),
                actions::USER_REGISTER,
                json!({ "email": user.email, "username": user.username }),
            )
            .await?;

        Ok(user.id)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let key = normalize_email(email);

        if let Some(remaining) = self.throttle.check(&key).await {
            return Err(AuthError::TooManyAttempts {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }

        let Some(user) = self.store.get_user_by_email(&key).await? else {
            return Err(self.failed_login(&key).await);
        };

        if !Self::check_password(&user.credentials.password_hash, password).await? {
            return Err(self.failed_login(&key).await);
        }

        self.throttle.record_success(&key).await;

        if user.role.is_admin() {
            let session = self.mint_session(&user).await?;
            self.activity
                .record(
                    Some(user.id),
                    actions::ADMIN_LOGIN_SUCCESS,
                    json!({ "email": user.email }),
                )
                .await?;
            return Ok(LoginOutcome::Session(session));
        }

        let mut credentials = user.credentials.clone();
        let code = otp::issue(&mut credentials, Utc::now());
        self.store.save_otp(user.id, credentials.otp.as_ref()).await?;

        let (subject, body) = templates::login_otp(&user.username, &code);
        send_best_effort(self.notifier.as_ref(), &user.email, subject, &body).await;

        self.activity
            .record(Some(user.id), actions::USER_LOGIN_OTP_SENT, json!({}))
            .await?;

        Ok(LoginOutcome::MfaRequired { user_id: user.id })
    }

    async fn verify_login_otp(&self, user_id: i32, code: &str) -> Result<SessionInfo, AuthError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let credentials = self.consume_otp(&user, code).await?;
        self.store.save_otp(user.id, credentials.otp.as_ref()).await?;

        let session = self.mint_session(&user).await?;

        self.activity
            .record(
                Some(user.id),
                actions::USER_LOGIN_SUCCESS,
                json!({ "email": user.email }),
            )
            .await?;

        let (subject, body) = templates::login_success(&user.username);
        send_best_effort(self.notifier.as_ref(), &user.email, subject, &body).await;

        Ok(session)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let user = self.user_by_email(email).await?;

        let mut credentials = user.credentials.clone();
        let code = otp::issue(&mut credentials, Utc::now());
        self.store.save_otp(user.id, credentials.otp.as_ref()).await?;

        let (subject, body) = templates::password_reset_otp(&code);
        send_best_effort(self.notifier.as_ref(), &user.email, subject, &body).await;

        self.activity
            .record(
                Some(user.id),
                actions::USER_FORGOT_PASSWORD_OTP_SENT,
                json!({ "email": user.email }),
            )
            .await?;

        Ok(())
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self.user_by_email(email).await?;

        check_strength(new_password)?;

        let credentials = self.consume_otp(&user, code).await?;

        // Persisted together with the cleared OTP, or not at all.
        let credentials = self.apply_password(credentials, new_password).await?;
        self.store.save_credentials(user.id, &credentials).await?;

        self.activity
            .record(
                Some(user.id),
                actions::USER_PASSWORD_RESET,
                json!({ "email": user.email }),
            )
            .await?;

        info!(user_id = user.id, "Password reset");
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !Self::check_password(&user.credentials.password_hash, current_password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let credentials = self
            .apply_password(user.credentials.clone(), new_password)
            .await?;
        self.store.save_credentials(user.id, &credentials).await?;

        self.activity
            .record(Some(user.id), actions::USER_PASSWORD_CHANGED, json!({}))
            .await?;

        info!(user_id = user.id, "Password changed");
        Ok(())
    }

    async fn logout(&self, user_id: i32) -> Result<(), AuthError> {
        self.activity
            .record(Some(user_id), actions::USER_LOGOUT, json!({}))
            .await?;
        Ok(())
    }

    fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens
            .verify(token)
            .map_err(|_| AuthError::InvalidToken)
    }

    async fn current_user(&self, user_id: i32) -> Result<UserSummary, AuthError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserSummary::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
