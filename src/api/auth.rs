use crate::client::{ApiClient, ClientError};
use crate::models::{AuthResponse, LoginDto, SignupDto, SignupResponse, User};
use crate::session::Session;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginDto) -> Result<AuthResponse, ClientError> {
        self.client.post("/api/auth/login", credentials).await
    }

    pub async fn register(&self, user: &SignupDto) -> Result<SignupResponse, ClientError> {
        self.client.post("/api/auth/signup", user).await
    }

    pub async fn current_user(&self, token: &str) -> Result<User, ClientError> {
        let session = Session {
            token: token.to_string(),
            user: None,
        };
        self.client
            .with_session(&session)
            .get("/api/users/me")
            .await
    }
}
