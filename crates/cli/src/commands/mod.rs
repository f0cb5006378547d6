//! CLI command implementations.

pub mod browse;
pub mod cart;
pub mod catalog;

use qkart_core::{IdError, ProductId};
use qkart_storefront::Storefront;
use qkart_storefront::config::StorefrontConfig;
use qkart_storefront::error::{CartError, CatalogError, report, set_sentry_user};
use qkart_storefront::session::Session;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Invalid product ID: {0}")]
    InvalidProductId(#[from] IdError),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// Message safe to show to the visitor.
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(e) => e.user_message().to_string(),
            Self::Cart(e) => e.user_message(),
            Self::InvalidProductId(_) | Self::Io(_) => self.to_string(),
        }
    }

    /// Log the error and capture backend failures to Sentry.
    pub fn report(&self) {
        match self {
            Self::Catalog(e) => report(e),
            Self::Cart(e) => report(e),
            Self::InvalidProductId(_) | Self::Io(_) => {
                tracing::error!(error = %self, "Command failed");
            }
        }
    }
}

/// What every command runs against.
pub struct Context {
    pub storefront: Storefront,
    pub session: Option<Session>,
}

impl Context {
    pub fn new(config: StorefrontConfig) -> Self {
        let session = config.session.as_ref().map(Session::from);
        if let Some(username) = session.as_ref().and_then(Session::username) {
            set_sentry_user(username);
        }

        Self {
            storefront: Storefront::new(config),
            session,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

fn parse_product_id(value: &str) -> Result<ProductId, CommandError> {
    Ok(ProductId::parse(value.trim())?)
}
