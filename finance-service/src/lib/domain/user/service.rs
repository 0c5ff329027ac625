use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::IssuedToken;
use chrono::Utc;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Password hashing and verification run on the blocking pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Shared hasher and token issuer
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let password_hash =
            tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
                .await
                .map_err(|e| UserError::Unknown(e.to_string()))?
                .map_err(|e| UserError::PasswordHashing(e.to_string()))?;

        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn login(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<(User, IssuedToken), UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();

        let Some(user) = self.repository.find_by_email(email).await? else {
            // Same hashing work as a wrong password for a known address
            tokio::task::spawn_blocking(move || authenticator.reject_unknown(&password))
                .await
                .map_err(|e| UserError::Unknown(e.to_string()))?;
            return Err(UserError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let principal = user.id.0;

        let issued = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &principal)
        })
        .await
        .map_err(|e| UserError::Unknown(e.to_string()))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::debug!(user_id = %user.id, "Login rejected: password mismatch");
                UserError::InvalidCredentials
            }
            AuthenticationError::PasswordError(err) => UserError::PasswordHashing(err.to_string()),
            AuthenticationError::JwtError(err) => UserError::TokenIssuance(err.to_string()),
        })?;

        Ok((user, issued))
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use auth::HashCost;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::UserName;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(
            Authenticator::with_hash_cost(
                b"test-secret-key-for-jwt-signing-at-least-32-bytes",
                Duration::hours(24),
                HashCost {
                    memory_kib: 256,
                    iterations: 1,
                    parallelism: 1,
                },
            )
            .unwrap(),
        )
    }

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::new(raw.to_string()).unwrap()
    }

    fn register_command() -> RegisterUserCommand {
        RegisterUserCommand::new(
            UserName::new("Ann Lee".to_string()).unwrap(),
            email("ann@example.com"),
            "password123".to_string(),
        )
    }

    fn stored_user(authenticator: &Authenticator, password: &str) -> User {
        User {
            id: UserId::new(),
            name: UserName::new("Ann Lee".to_string()).unwrap(),
            email: email("ann@example.com"),
            password_hash: authenticator.hash_password(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .withf(|email| email.as_str() == "ann@example.com")
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|user| {
                user.name.as_str() == "Ann Lee"
                    && user.email.as_str() == "ann@example.com"
                    && user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), authenticator());

        let user = service.register(register_command()).await.unwrap();
        assert_eq!(user.name.as_str(), "Ann Lee");
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_stores_nothing() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = authenticator();
        let existing = stored_user(&authenticator, "whatever1");

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), authenticator);

        let result = service.register(register_command()).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_propagates_storage_conflict() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .times(1)
            .returning(|user| Err(UserError::EmailAlreadyExists(user.email.to_string())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.register(register_command()).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_login_success_issues_token_for_user() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "password123");
        let user_id = user.id;

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let (user, issued) = service
            .login(&email("ann@example.com"), "password123")
            .await
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(authenticator.verify_token(&issued.token), Ok(user_id.0));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "password123");

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), authenticator);

        let result = service
            .login(&email("ann@example.com"), "password124")
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_matches_wrong_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service
            .login(&email("nobody@example.com"), "password123")
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_user_storage_failure_is_not_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::DatabaseError(_))));
    }
}
