use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::host::{Identity, RemoteHost, RemoteRepo};

/// Shared inner state of [MockHost], inspectable from tests while the
/// workflow owns the boxed client.
#[derive(Debug, Default)]
pub struct MockHostState {
    /// Identity returned by `get_user`; `None` simulates a bad token.
    pub user: Option<Identity>,
    /// Organizations the user belongs to.
    pub orgs: Vec<Identity>,
    /// Existing repositories keyed by "login/name".
    pub repos: HashMap<String, RemoteRepo>,
    /// Token bound via `set_token`.
    pub token: Option<String>,
    /// Repositories created through the client, as "login/name".
    pub created: Vec<String>,
    /// When true, creation calls return `None`.
    pub fail_creation: bool,
}

/// In-memory hosting platform for tests
pub struct MockHost {
    state: Rc<RefCell<MockHostState>>,
}

impl MockHost {
    /// Mock host whose authenticated user is `login`.
    pub fn with_user(login: &str) -> Self {
        let state = MockHostState {
            user: Some(Identity {
                login: login.to_string(),
            }),
            ..Default::default()
        };
        MockHost {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Build from pre-assembled state.
    pub fn from_state(state: MockHostState) -> Self {
        MockHost {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Handle onto the shared state for later inspection.
    pub fn state(&self) -> Rc<RefCell<MockHostState>> {
        Rc::clone(&self.state)
    }

    /// A second client over the same state (the workflow consumes clients
    /// by value).
    pub fn clone_handle(&self) -> Self {
        MockHost {
            state: Rc::clone(&self.state),
        }
    }

    fn key(login: &str, name: &str) -> String {
        format!("{}/{}", login, name)
    }
}

impl RemoteHost for MockHost {
    fn set_token(&mut self, token: &str) {
        self.state.borrow_mut().token = Some(token.to_string());
    }

    fn get_user(&self) -> Result<Option<Identity>> {
        Ok(self.state.borrow().user.clone())
    }

    fn get_orgs(&self) -> Result<Vec<Identity>> {
        Ok(self.state.borrow().orgs.clone())
    }

    fn get_repo(&self, login: &str, name: &str) -> Result<Option<RemoteRepo>> {
        Ok(self.state.borrow().repos.get(&Self::key(login, name)).cloned())
    }

    fn create_repo(&self, name: &str) -> Result<Option<RemoteRepo>> {
        let login = match self.state.borrow().user.clone() {
            Some(user) => user.login,
            None => return Ok(None),
        };
        self.create_under(&login, name)
    }

    fn create_org_repo(&self, name: &str, org: &str) -> Result<Option<RemoteRepo>> {
        self.create_under(org, name)
    }

    fn remote_url(&self, login: &str, name: &str) -> String {
        format!("git@mock.example:{}/{}.git", login, name)
    }

    fn token_help_url(&self) -> &str {
        "https://mock.example/tokens"
    }

    fn ssh_keys_url(&self) -> &str {
        "https://mock.example/keys"
    }

    fn ssh_keys_help_url(&self) -> &str {
        "https://mock.example/keys/help"
    }
}

impl MockHost {
    fn create_under(&self, login: &str, name: &str) -> Result<Option<RemoteRepo>> {
        let mut state = self.state.borrow_mut();
        if state.fail_creation {
            return Ok(None);
        }

        let key = Self::key(login, name);
        let repo = RemoteRepo {
            full_name: key.clone(),
            ssh_url: format!("git@mock.example:{}.git", key),
        };
        state.repos.insert(key.clone(), repo.clone());
        state.created.push(key);
        Ok(Some(repo))
    }
}
