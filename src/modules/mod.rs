pub mod auth;
pub mod books;

use std::sync::Arc;

use folio_authz::{Authenticator, PasswordHasher};
use folio_db::DbPool;
use folio_kernel::{settings::Settings, ModuleRegistry};

/// Register the auth core module and the book catalog with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    pool: &DbPool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let tokens = Arc::new(auth::token_service(&settings.auth)?);
    let users = auth::store::UserStore::new(pool.clone());

    registry.register_core(auth::create_module(auth::AuthState {
        users: users.clone(),
        hasher: PasswordHasher::new(settings.auth.bcrypt_cost),
        tokens: tokens.clone(),
    }));

    registry.register_custom(books::create_module(books::BooksState {
        repo: books::repository::BookRepository::new(pool.clone()),
        auth: Authenticator::new(tokens, Arc::new(users)),
    }));

    Ok(())
}
