//! Signup and credential checks.

use std::sync::Arc;

use super::Repositories;
use crate::domain::{NewUser, User};
use crate::error::{DomainError, RepoError};
use crate::forms::{FormErrors, LoginForm, SignupForm, USERNAME_TAKEN};
use crate::ports::PasswordService;

#[derive(Clone)]
pub struct AccountService {
    repos: Repositories,
    passwords: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(repos: Repositories, passwords: Arc<dyn PasswordService>) -> Self {
        Self { repos, passwords }
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<User, DomainError> {
        form.clean().map_err(DomainError::InvalidForm)?;

        let username = form.username.trim();
        if self.repos.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::InvalidForm(username_taken()));
        }

        let password_hash = self.passwords.hash(&form.password1)?;
        let user = self
            .repos
            .users
            .create(NewUser::new(
                username.to_string(),
                form.email.trim().to_string(),
                password_hash,
            ))
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent signup for the same name.
                RepoError::Constraint(_) => DomainError::InvalidForm(username_taken()),
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username/password pair. Wrong credentials come back as a form
    /// error so the login page can be redisplayed.
    pub async fn authenticate(&self, form: &LoginForm) -> Result<User, DomainError> {
        form.clean().map_err(DomainError::InvalidForm)?;

        let Some(user) = self.repos.users.find_by_username(form.username.trim()).await? else {
            return Err(DomainError::InvalidForm(LoginForm::bad_credentials()));
        };
        if !self.passwords.verify(&form.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(DomainError::InvalidForm(LoginForm::bad_credentials()));
        }
        Ok(user)
    }

    /// The account behind a session, if it still exists.
    pub async fn session_user(&self, user_id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.repos.users.find_by_id(user_id).await?)
    }
}

fn username_taken() -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add("username", USERNAME_TAKEN);
    errors
}
