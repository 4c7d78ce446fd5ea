use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::db::Store;
use crate::security::{FieldCipher, LoginThrottle, PasswordPolicy, TokenIssuer};
use crate::services::{
    ActivityLogService, AuthService, BookingService, LogNotifier, Notifier, PaymentGateway,
    SeaOrmAuthService, SeaOrmBookingService, SeaOrmUserService, SeaOrmWishlistService,
    SmtpNotifier, StripeGateway, UserService, WishlistService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub booking_service: Arc<dyn BookingService>,

    pub user_service: Arc<dyn UserService>,

    pub wishlist_service: Arc<dyn WishlistService>,

    pub activity: ActivityLogService,
}

impl SharedState {
    /// Builds the real collaborators from config: SMTP when mail is enabled,
    /// otherwise mail goes to the log.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let notifier: Arc<dyn Notifier> = if config.mail.enabled {
            Arc::new(SmtpNotifier::from_config(&config.mail)?)
        } else {
            Arc::new(LogNotifier)
        };
        let gateway: Arc<dyn PaymentGateway> =
            Arc::new(StripeGateway::from_config(&config.payments)?);

        Self::with_collaborators(config, notifier, gateway).await
    }

    pub async fn with_collaborators(
        config: Config,
        notifier: Arc<dyn Notifier>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let policy = PasswordPolicy::new(&config.security)?;
        let tokens = TokenIssuer::from_config(&config.security);
        let cipher = FieldCipher::from_hex(&config.security.encryption_key)
            .context("Invalid security.encryption_key")?;
        let throttle = Arc::new(LoginThrottle::new(&config.security.auth_throttle));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            policy,
            tokens,
            cipher.clone(),
            notifier.clone(),
            throttle,
        )) as Arc<dyn AuthService>;

        let booking_service = Arc::new(SeaOrmBookingService::new(
            store.clone(),
            notifier,
            gateway,
            config.payments.currency.clone(),
        )) as Arc<dyn BookingService>;

        let user_service =
            Arc::new(SeaOrmUserService::new(store.clone(), cipher)) as Arc<dyn UserService>;

        let wishlist_service =
            Arc::new(SeaOrmWishlistService::new(store.clone())) as Arc<dyn WishlistService>;

        Ok(Self {
            config: Arc::new(config),
            activity: ActivityLogService::new(store.clone()),
            store,
            auth_service,
            booking_service,
            user_service,
            wishlist_service,
        })
    }
}
