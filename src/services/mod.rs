pub mod activity;
pub use activity::ActivityLogService;

pub mod notifier;
pub use notifier::{LogNotifier, Notifier, SmtpNotifier};

pub mod payment_gateway;
pub use payment_gateway::{CheckoutRequest, CheckoutSession, PaymentGateway, StripeGateway};

pub mod webhook;
pub use webhook::{WebhookError, WebhookEvent};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AuthError, AuthService, LoginOutcome, NewAccount, SessionInfo, UserSummary,
};
pub use auth_service_impl::SeaOrmAuthService;

pub mod booking_service;
pub mod booking_service_impl;
pub use booking_service::{
    BookingError, BookingService, CreateBooking, ReconcileError, ReconcileOutcome,
};
pub use booking_service_impl::SeaOrmBookingService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{ProfileUpdate, UserError, UserProfile, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod wishlist_service;
pub mod wishlist_service_impl;
pub use wishlist_service::{WishlistError, WishlistService};
pub use wishlist_service_impl::SeaOrmWishlistService;
