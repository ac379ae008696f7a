//! Workflow engine: the ordered `prepare` / `commit` / `publish` operations.
//!
//! Every step is idempotent and safe to re-run, but steps within one
//! operation execute in a fixed order because later steps assume earlier
//! postconditions (identity before ownership, ownership before repository
//! resolution, branch resolution before sync). All collaborators are
//! consumed behind traits; the hosting client variant is chosen once, when
//! the platform choice is resolved.

use crate::branch::{self, Channel};
use crate::cache::{self, CredentialStore};
use crate::context::{OwnerKind, RepositoryContext};
use crate::error::{Result, ShipError};
use crate::git::GitOps;
use crate::guard;
use crate::host::{HostKind, Identity, RemoteHost};
use crate::ignore;
use crate::prompt::Prompt;
use crate::publish::{Builder, PublishTarget};
use crate::sync;
use crate::ui;

/// Per-category force flags. A set flag supersedes the cached value and
/// always re-prompts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshFlags {
    pub server: bool,
    pub token: bool,
    pub owner: bool,
    pub publisher: bool,
}

/// Builds the concrete hosting client once the platform choice is known.
pub type HostFactory = Box<dyn Fn(HostKind) -> Result<Box<dyn RemoteHost>>>;

/// Drives the prepare → commit → publish workflow over injected
/// collaborators.
pub struct Workflow {
    ctx: RepositoryContext,
    store: CredentialStore,
    refresh: RefreshFlags,
    git: Box<dyn GitOps>,
    prompt: Box<dyn Prompt>,
    hosts: HostFactory,
}

impl Workflow {
    pub fn new(
        ctx: RepositoryContext,
        store: CredentialStore,
        refresh: RefreshFlags,
        git: Box<dyn GitOps>,
        prompt: Box<dyn Prompt>,
        hosts: HostFactory,
    ) -> Self {
        Workflow {
            ctx,
            store,
            refresh,
            git,
            prompt,
            hosts,
        }
    }

    /// The resolved context after an operation has run.
    pub fn ctx(&self) -> &RepositoryContext {
        &self.ctx
    }

    /// Resolve credentials and identity, ensure the remote repository
    /// exists, and initialize local git state.
    pub fn prepare(&mut self) -> Result<()> {
        let kind = self.resolve_host_kind()?;
        let mut host = (self.hosts)(kind)?;

        self.resolve_token(host.as_mut())?;

        let user = host
            .get_user()?
            .ok_or(ShipError::IdentityResolutionFailed)?;
        let orgs = host.get_orgs()?;
        ui::display_success(&format!("Authenticated as {}", user.login));

        self.resolve_ownership(&user, &orgs)?;
        self.resolve_repository(host.as_ref())?;

        if ignore::ensure_ignore_file(&self.ctx.dir)? {
            ui::display_success(".gitignore written with default patterns");
        }

        self.init_local_repo(host.as_ref())?;
        Ok(())
    }

    /// Commit pending changes and synchronize the versioned working branch.
    pub fn commit(&mut self, channel: Channel) -> Result<()> {
        // The host is needed for SSH remediation links; normally this is a
        // pure cache read.
        let kind = self.resolve_host_kind()?;
        let host = (self.hosts)(kind)?;

        branch::resolve_version(self.git.as_mut(), &mut self.ctx, channel)?;
        branch::check_stash(self.git.as_mut())?;

        guard::check_conflicted(self.git.as_mut())?;
        guard::check_not_committed(self.git.as_mut(), self.prompt.as_ref())?;

        branch::checkout_branch(self.git.as_mut(), &self.ctx)?;

        // Bring master into the working branch before publishing from it
        sync::pull(self.git.as_mut(), host.as_ref(), "master", false)?;
        guard::check_conflicted(self.git.as_mut())?;

        let branch_ref = format!("refs/heads/{}", self.ctx.branch);
        if self.git.list_remote_refs()?.iter().any(|r| r == &branch_ref) {
            sync::pull(self.git.as_mut(), host.as_ref(), &self.ctx.branch, false)?;
            guard::check_conflicted(self.git.as_mut())?;
        }

        sync::push(self.git.as_mut(), &self.ctx.branch)?;
        ui::display_success(&format!("Pushed {} to origin", self.ctx.branch));
        Ok(())
    }

    /// Select the publish target and hand off to the build collaborator.
    pub fn publish<F>(&mut self, production: bool, make_builder: F) -> Result<PublishTarget>
    where
        F: FnOnce(&RepositoryContext, PublishTarget, bool) -> Box<dyn Builder>,
    {
        let target = self.resolve_target()?;

        let mut builder = make_builder(&self.ctx, target, production);
        builder.prepare()?;
        builder.init()?;
        builder.build()?;

        ui::display_success("Publish pipeline completed");
        Ok(target)
    }

    fn resolve_host_kind(&mut self) -> Result<HostKind> {
        if !self.refresh.server {
            if let Some(kind) = self.store.read(cache::SERVER).and_then(|v| HostKind::parse(&v)) {
                return Ok(kind);
            }
        }

        let labels: Vec<&str> = HostKind::ALL.iter().map(|kind| kind.label()).collect();
        let index = self
            .prompt
            .select("Where should this project be hosted?", &labels)?;
        let kind = HostKind::ALL[index];
        self.store.write(cache::SERVER, kind.as_str())?;
        Ok(kind)
    }

    fn resolve_token(&mut self, host: &mut dyn RemoteHost) -> Result<()> {
        let cached = if self.refresh.token {
            None
        } else {
            self.store.read(cache::TOKEN)
        };

        let token = match cached {
            Some(token) => token,
            None => {
                ui::display_status(&format!(
                    "A personal access token is required, create one at {}",
                    host.token_help_url()
                ));
                let token = self.prompt.password("Access token")?;
                self.store.write(cache::TOKEN, &token)?;
                token
            }
        };

        host.set_token(&token);
        Ok(())
    }

    fn resolve_ownership(&mut self, user: &Identity, orgs: &[Identity]) -> Result<()> {
        if !self.refresh.owner {
            let cached_kind = self.store.read(cache::OWNER).and_then(|v| OwnerKind::parse(&v));
            let cached_login = self.store.read(cache::LOGIN);
            if let (Some(owner), Some(login)) = (cached_kind, cached_login) {
                self.ctx.owner = owner;
                self.ctx.login = login;
                return Ok(());
            }
        }

        // The organization option only exists for accounts that have one;
        // a single-entry list resolves without prompting.
        let mut choices = vec!["personal"];
        if !orgs.is_empty() {
            choices.push("organization");
        }
        let index = if choices.len() == 1 {
            0
        } else {
            self.prompt
                .select("Publish under which account?", &choices)?
        };

        let (owner, login) = if index == 0 {
            (OwnerKind::Personal, user.login.clone())
        } else {
            let names: Vec<&str> = orgs.iter().map(|org| org.login.as_str()).collect();
            let picked = if names.len() == 1 {
                0
            } else {
                self.prompt.select("Select an organization", &names)?
            };
            (OwnerKind::Organization, orgs[picked].login.clone())
        };

        self.store.write(cache::OWNER, owner.as_str())?;
        self.store.write(cache::LOGIN, &login)?;
        self.ctx.owner = owner;
        self.ctx.login = login;
        Ok(())
    }

    fn resolve_repository(&mut self, host: &dyn RemoteHost) -> Result<()> {
        let login = self.ctx.login.clone();
        let name = self.ctx.name.clone();

        match host.get_repo(&login, &name)? {
            Some(repo) => {
                ui::display_success(&format!("Remote repository {} found", repo.full_name));
            }
            None => {
                ui::display_status(&format!("Creating remote repository {}/{}", login, name));
                let created = match self.ctx.owner {
                    OwnerKind::Personal => host.create_repo(&name)?,
                    OwnerKind::Organization => host.create_org_repo(&name, &login)?,
                };
                match created {
                    Some(repo) => {
                        ui::display_success(&format!("Created {}", repo.full_name));
                    }
                    None => {
                        return Err(ShipError::RemoteRepoCreationFailed {
                            owner: login,
                            name,
                        });
                    }
                }
            }
        }

        self.ctx.remote_url = host.remote_url(&self.ctx.login, &self.ctx.name);
        Ok(())
    }

    fn init_local_repo(&mut self, host: &dyn RemoteHost) -> Result<()> {
        let fresh = !self.git.is_initialized();
        if fresh {
            self.git.init()?;
            ui::display_success("Initialized local repository");
        }

        // Idempotent: keep an already-registered origin
        let has_origin = self.git.remotes()?.iter().any(|name| name == "origin");
        if !has_origin {
            self.git.add_remote("origin", &self.ctx.remote_url)?;
        }

        if fresh {
            guard::check_not_committed(self.git.as_mut(), self.prompt.as_ref())?;

            let remote_has_master = self
                .git
                .list_remote_refs()?
                .iter()
                .any(|r| r == "refs/heads/master");
            if remote_has_master {
                sync::pull(self.git.as_mut(), host, "master", true)?;
            }

            sync::push(self.git.as_mut(), "master")?;
            ui::display_success("Pushed master to origin");
        }

        Ok(())
    }

    fn resolve_target(&mut self) -> Result<PublishTarget> {
        if !self.refresh.publisher {
            if let Some(target) = self
                .store
                .read(cache::PUBLISHER)
                .and_then(|v| PublishTarget::parse(&v))
            {
                return Ok(target);
            }
        }

        let labels: Vec<&str> = PublishTarget::ALL.iter().map(|t| t.label()).collect();
        let index = self
            .prompt
            .select("Where should the build be published?", &labels)?;
        let target = PublishTarget::ALL[index];
        self.store.write(cache::PUBLISHER, target.as_str())?;
        Ok(target)
    }
}
