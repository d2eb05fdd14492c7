//! In-memory account and session store

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    Account, AccountId, AccountStore, AuthStore, AuthTransaction, DomainError, Session,
    SessionStore,
};

#[derive(Debug, Default)]
struct AuthState {
    accounts: HashMap<AccountId, Account>,
    /// Index for username -> account ID lookup
    username_index: HashMap<String, AccountId>,
    /// Index for email -> account ID lookup
    email_index: HashMap<String, AccountId>,
    /// Sessions keyed by token
    sessions: HashMap<String, Session>,
    /// Index for account ID -> session tokens
    account_sessions: HashMap<AccountId, HashSet<String>>,
}

impl AuthState {
    fn index_account(&mut self, account: Account) {
        let id = *account.id();
        self.username_index.insert(account.username().to_string(), id);
        self.email_index.insert(account.email().to_string(), id);
        self.accounts.insert(id, account);
    }

    fn unindex_account(&mut self, id: &AccountId) -> Option<Account> {
        let account = self.accounts.remove(id)?;

        if self.username_index.get(account.username()) == Some(id) {
            self.username_index.remove(account.username());
        }
        if self.email_index.get(account.email()) == Some(id) {
            self.email_index.remove(account.email());
        }

        Some(account)
    }

    fn remove_sessions_for(&mut self, id: &AccountId) {
        for token in self.account_sessions.remove(id).unwrap_or_default() {
            self.sessions.remove(&token);
        }
    }

    fn put_session(&mut self, session: Session) {
        let token = session.token().to_string();

        if let Some(old) = self.sessions.get(&token) {
            if let Some(tokens) = self.account_sessions.get_mut(old.account_id()) {
                tokens.remove(&token);
            }
        }

        self.account_sessions
            .entry(*session.account_id())
            .or_default()
            .insert(token.clone());
        self.sessions.insert(token, session);
    }
}

/// Thread-safe in-memory store
///
/// Transactions buffer their writes and hold no lock while open. Reads see
/// committed data overlaid with the transaction's own writes; `commit`
/// re-checks uniqueness and existence against the latest committed state
/// before applying, so conflicting writers fail instead of waiting.
/// Data is lost when the process terminates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthStore {
    state: Arc<RwLock<AuthState>>,
}

impl InMemoryAuthStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial accounts
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let mut state = AuthState::default();

        for account in accounts {
            state.index_account(account);
        }

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl AuthStore for InMemoryAuthStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, DomainError> {
        Ok(InMemoryTransaction {
            state: self.state.clone(),
            accounts: HashMap::new(),
            sessions: HashMap::new(),
            purged: HashSet::new(),
        })
    }
}

#[derive(Debug, Clone)]
enum AccountWrite {
    Insert(Account),
    Update(Account),
    Delete,
}

impl AccountWrite {
    fn account(&self) -> Option<&Account> {
        match self {
            Self::Insert(account) | Self::Update(account) => Some(account),
            Self::Delete => None,
        }
    }
}

#[derive(Debug, Clone)]
enum SessionWrite {
    Insert(Session),
    Update(Session),
}

impl SessionWrite {
    fn session(&self) -> &Session {
        match self {
            Self::Insert(session) | Self::Update(session) => session,
        }
    }
}

/// Open transaction on an [`InMemoryAuthStore`]
#[derive(Debug)]
pub struct InMemoryTransaction {
    state: Arc<RwLock<AuthState>>,
    accounts: HashMap<AccountId, AccountWrite>,
    sessions: HashMap<String, SessionWrite>,
    /// Accounts whose committed sessions this transaction removed
    purged: HashSet<AccountId>,
}

impl InMemoryTransaction {
    fn account_deleted(&self, id: &AccountId) -> bool {
        matches!(self.accounts.get(id), Some(AccountWrite::Delete))
    }

    /// Committed sessions of `id` are invisible once purged or cascaded away
    fn sessions_hidden(&self, id: &AccountId) -> bool {
        self.purged.contains(id) || self.account_deleted(id)
    }

    /// Whether a committed owner of `value` gives it up in this transaction
    fn releases(&self, owner: &AccountId, value: &str, key: fn(&Account) -> &str) -> bool {
        match self.accounts.get(owner) {
            Some(write) => write.account().is_none_or(|account| key(account) != value),
            None => false,
        }
    }

    fn lookup(
        &self,
        state: &AuthState,
        index: &HashMap<String, AccountId>,
        value: &str,
        key: fn(&Account) -> &str,
    ) -> Option<Account> {
        let pending = self
            .accounts
            .values()
            .filter_map(AccountWrite::account)
            .find(|account| key(account) == value);

        if let Some(account) = pending {
            return Some(account.clone());
        }

        index
            .get(value)
            .filter(|id| !self.accounts.contains_key(*id))
            .and_then(|id| state.accounts.get(id))
            .cloned()
    }

    fn visible_account(&self, state: &AuthState, id: &AccountId) -> Option<Account> {
        match self.accounts.get(id) {
            Some(write) => write.account().cloned(),
            None => state.accounts.get(id).cloned(),
        }
    }

    fn visible_session(&self, state: &AuthState, token: &str) -> Option<Session> {
        match self.sessions.get(token) {
            Some(write) => Some(write.session().clone()),
            None => state
                .sessions
                .get(token)
                .filter(|session| !self.sessions_hidden(session.account_id()))
                .cloned(),
        }
    }

    /// Whether another committed account still holds `value` once this transaction applies
    fn taken(
        &self,
        index: &HashMap<String, AccountId>,
        id: &AccountId,
        value: &str,
        key: fn(&Account) -> &str,
    ) -> bool {
        index
            .get(value)
            .is_some_and(|owner| owner != id && !self.releases(owner, value, key))
    }

    fn duplicate_in(&self, state: &AuthState, account: &Account) -> Option<DomainError> {
        let id = account.id();

        if self.taken(&state.username_index, id, account.username(), Account::username) {
            return Some(DomainError::duplicate(
                "username",
                format!("Username '{}' already exists", account.username()),
            ));
        }

        if self.taken(&state.email_index, id, account.email(), Account::email) {
            return Some(DomainError::duplicate(
                "email",
                format!("Email '{}' already exists", account.email()),
            ));
        }

        None
    }

    /// Check buffered writes against the latest committed state
    fn validate(&self, state: &AuthState) -> Result<(), DomainError> {
        for (id, write) in &self.accounts {
            match write {
                AccountWrite::Insert(_) if state.accounts.contains_key(id) => {
                    return Err(DomainError::duplicate(
                        "id",
                        format!("Account with ID '{}' already exists", id),
                    ));
                }
                AccountWrite::Update(_) if !state.accounts.contains_key(id) => {
                    return Err(DomainError::not_found(format!("Account '{}' not found", id)));
                }
                _ => {}
            }

            if let Some(account) = write.account() {
                if let Some(err) = self.duplicate_in(state, account) {
                    return Err(err);
                }
            }
        }

        for (token, write) in &self.sessions {
            let committed = state
                .sessions
                .get(token)
                .filter(|session| !self.sessions_hidden(session.account_id()));

            match write {
                SessionWrite::Insert(_) if committed.is_some() => {
                    return Err(DomainError::duplicate("token", "Session token already exists"));
                }
                SessionWrite::Update(session) if committed.is_none() => {
                    return Err(DomainError::not_found(format!(
                        "Session '{}' not found",
                        session.id()
                    )));
                }
                _ => {}
            }

            let owner = write.session().account_id();
            let owner_exists = match self.accounts.get(owner) {
                Some(write) => write.account().is_some(),
                None => state.accounts.contains_key(owner),
            };

            if !owner_exists {
                return Err(DomainError::not_found(format!(
                    "Account '{}' not found",
                    owner
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl AuthTransaction for InMemoryTransaction {
    async fn commit(self) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        self.validate(&state)?;

        for id in &self.purged {
            state.remove_sessions_for(id);
        }

        for (id, write) in &self.accounts {
            state.unindex_account(id);

            if matches!(write, AccountWrite::Delete) {
                state.remove_sessions_for(id);
            }
        }

        for write in self.accounts.into_values() {
            if let AccountWrite::Insert(account) | AccountWrite::Update(account) = write {
                state.index_account(account);
            }
        }

        for write in self.sessions.into_values() {
            let (SessionWrite::Insert(session) | SessionWrite::Update(session)) = write;
            state.put_session(session);
        }

        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryTransaction {
    async fn find_account_by_id(&mut self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let state = self.state.read().await;
        Ok(self.visible_account(&state, id))
    }

    async fn find_account_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Account>, DomainError> {
        let state = self.state.read().await;
        Ok(self.lookup(&state, &state.username_index, username, Account::username))
    }

    async fn find_account_by_email(&mut self, email: &str) -> Result<Option<Account>, DomainError> {
        let state = self.state.read().await;
        Ok(self.lookup(&state, &state.email_index, email, Account::email))
    }

    async fn insert_account(&mut self, account: Account) -> Result<Account, DomainError> {
        let id = *account.id();

        {
            let state = self.state.read().await;

            if self.visible_account(&state, &id).is_some() {
                return Err(DomainError::duplicate(
                    "id",
                    format!("Account with ID '{}' already exists", id),
                ));
            }

            let username = account.username();
            if self
                .lookup(&state, &state.username_index, username, Account::username)
                .is_some()
            {
                return Err(DomainError::duplicate(
                    "username",
                    format!("Username '{}' already exists", username),
                ));
            }

            let email = account.email();
            if self
                .lookup(&state, &state.email_index, email, Account::email)
                .is_some()
            {
                return Err(DomainError::duplicate(
                    "email",
                    format!("Email '{}' already exists", email),
                ));
            }
        }

        let write = match self.accounts.get(&id) {
            // deleted earlier in this transaction; the committed row is replaced
            Some(AccountWrite::Delete) => AccountWrite::Update(account.clone()),
            _ => AccountWrite::Insert(account.clone()),
        };
        self.accounts.insert(id, write);

        Ok(account)
    }

    async fn update_account(&mut self, account: &Account) -> Result<Account, DomainError> {
        let id = *account.id();

        {
            let state = self.state.read().await;

            if self.visible_account(&state, &id).is_none() {
                return Err(DomainError::not_found(format!("Account '{}' not found", id)));
            }

            let username = account.username();
            let owner = self.lookup(&state, &state.username_index, username, Account::username);
            if owner.is_some_and(|owner| owner.id() != &id) {
                return Err(DomainError::duplicate(
                    "username",
                    format!("Username '{}' already exists", username),
                ));
            }

            let email = account.email();
            let owner = self.lookup(&state, &state.email_index, email, Account::email);
            if owner.is_some_and(|owner| owner.id() != &id) {
                return Err(DomainError::duplicate(
                    "email",
                    format!("Email '{}' already exists", email),
                ));
            }
        }

        let write = match self.accounts.get(&id) {
            Some(AccountWrite::Insert(_)) => AccountWrite::Insert(account.clone()),
            _ => AccountWrite::Update(account.clone()),
        };
        self.accounts.insert(id, write);

        Ok(account.clone())
    }

    async fn delete_account(&mut self, id: &AccountId) -> Result<bool, DomainError> {
        let exists = {
            let state = self.state.read().await;
            self.visible_account(&state, id).is_some()
        };

        if !exists {
            return Ok(false);
        }

        if matches!(self.accounts.get(id), Some(AccountWrite::Insert(_))) {
            self.accounts.remove(id);
        } else {
            self.accounts.insert(*id, AccountWrite::Delete);
        }
        self.sessions.retain(|_, write| write.session().account_id() != id);

        Ok(true)
    }
}

#[async_trait]
impl SessionStore for InMemoryTransaction {
    async fn find_session_by_token(&mut self, token: &str) -> Result<Option<Session>, DomainError> {
        let state = self.state.read().await;
        Ok(self.visible_session(&state, token))
    }

    async fn insert_session(&mut self, session: Session) -> Result<Session, DomainError> {
        {
            let state = self.state.read().await;

            if self.visible_session(&state, session.token()).is_some() {
                return Err(DomainError::duplicate("token", "Session token already exists"));
            }

            if self.visible_account(&state, session.account_id()).is_none() {
                return Err(DomainError::not_found(format!(
                    "Account '{}' not found",
                    session.account_id()
                )));
            }
        }

        self.sessions.insert(
            session.token().to_string(),
            SessionWrite::Insert(session.clone()),
        );

        Ok(session)
    }

    async fn update_session(&mut self, session: &Session) -> Result<Session, DomainError> {
        let write = match self.sessions.get(session.token()) {
            Some(SessionWrite::Insert(_)) => SessionWrite::Insert(session.clone()),
            Some(SessionWrite::Update(_)) => SessionWrite::Update(session.clone()),
            None => {
                let state = self.state.read().await;

                if self.visible_session(&state, session.token()).is_none() {
                    return Err(DomainError::not_found(format!(
                        "Session '{}' not found",
                        session.id()
                    )));
                }

                SessionWrite::Update(session.clone())
            }
        };

        self.sessions.insert(session.token().to_string(), write);

        Ok(session.clone())
    }

    async fn delete_sessions_for_account(
        &mut self,
        account_id: &AccountId,
    ) -> Result<u64, DomainError> {
        let committed = if self.sessions_hidden(account_id) {
            0
        } else {
            let state = self.state.read().await;
            state
                .account_sessions
                .get(account_id)
                .map_or(0, HashSet::len)
        };

        let pending = self
            .sessions
            .values()
            .filter(|write| {
                matches!(write, SessionWrite::Insert(s) if s.account_id() == account_id)
            })
            .count();

        self.sessions
            .retain(|_, write| write.session().account_id() != account_id);
        self.purged.insert(*account_id);

        Ok((committed + pending) as u64)
    }
}
