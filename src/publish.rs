//! Publish targets and the downstream build collaborator boundary.
//!
//! The workflow only selects a target and drives the three-phase
//! `prepare → init → build` contract; what a builder does inside each
//! phase is its own business.

use crate::context::RepositoryContext;
use crate::error::Result;
use crate::ui;

/// Where a published build is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishTarget {
    /// Object-storage-based static hosting
    Cos,
}

impl PublishTarget {
    pub const ALL: [PublishTarget; 1] = [PublishTarget::Cos];

    /// Stable cache value for this target.
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishTarget::Cos => "cos",
        }
    }

    /// Human-readable label for choice lists.
    pub fn label(&self) -> &'static str {
        match self {
            PublishTarget::Cos => "Object storage (COS)",
        }
    }

    /// Parse a cached target value. Unknown values read as absent.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cos" => Some(PublishTarget::Cos),
            _ => None,
        }
    }
}

/// Three-phase build/publish contract driven by the workflow engine.
pub trait Builder {
    fn prepare(&mut self) -> Result<()>;
    fn init(&mut self) -> Result<()>;
    fn build(&mut self) -> Result<()>;
}

/// Builder for the object-storage target.
pub struct CosBuilder {
    ctx: RepositoryContext,
    target: PublishTarget,
    production: bool,
}

impl CosBuilder {
    pub fn new(ctx: &RepositoryContext, target: PublishTarget, production: bool) -> Self {
        CosBuilder {
            ctx: ctx.clone(),
            target,
            production,
        }
    }

    fn profile(&self) -> &'static str {
        if self.production {
            "production"
        } else {
            "preview"
        }
    }
}

impl Builder for CosBuilder {
    fn prepare(&mut self) -> Result<()> {
        ui::display_status(&format!(
            "Preparing {} build of {} for {}",
            self.profile(),
            self.ctx.name,
            self.target.label()
        ));
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        ui::display_status(&format!(
            "Initializing build pipeline in {}",
            self.ctx.dir.display()
        ));
        Ok(())
    }

    fn build(&mut self) -> Result<()> {
        let branch = if self.ctx.branch.is_empty() {
            "master"
        } else {
            self.ctx.branch.as_str()
        };
        ui::display_status(&format!("Building {} from branch {}", self.ctx.name, branch));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_round_trip() {
        for target in PublishTarget::ALL {
            assert_eq!(PublishTarget::parse(target.as_str()), Some(target));
        }
        assert_eq!(PublishTarget::parse("ftp"), None);
    }

    #[test]
    fn test_cos_builder_phases_run() {
        let ctx = RepositoryContext::new("/tmp/site");
        let mut builder = CosBuilder::new(&ctx, PublishTarget::Cos, true);
        builder.prepare().unwrap();
        builder.init().unwrap();
        builder.build().unwrap();
    }
}
