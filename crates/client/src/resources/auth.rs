//! Login and registration.

use tracing::instrument;

use crate::ApiClient;
use crate::error::ApiError;
use crate::types::{Credentials, LoginResponse, Registration};

impl ApiClient {
    /// Exchange shopper credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns the server's message (e.g. "Invalid credentials") on rejection.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.post("auth/login", &Credentials { email, password })
            .await
    }

    /// Create a shopper account. The response carries a token like login.
    ///
    /// # Errors
    ///
    /// Returns the server's message on rejection.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        self.post(
            "auth/register",
            &Registration {
                name,
                email,
                password,
            },
        )
        .await
    }

    /// Exchange administrator credentials for an admin bearer token.
    ///
    /// # Errors
    ///
    /// Returns the server's message on rejection.
    #[instrument(skip(self, password))]
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        self.post("admin/login", &Credentials { email, password })
            .await
    }
}
