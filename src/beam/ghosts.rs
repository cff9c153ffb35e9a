// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Ghosts: secondary beams owned by a primary beam.

use std::rc::Rc;

use log::debug;

use super::{Beam, BeamError, GhostOptions, Role};

/// `<parent>_<tag>`, or whichever of the two isn't empty.
fn ghost_name(parent: Option<&str>, tag: Option<&str>) -> Option<String> {
    let parent = parent.filter(|p| !p.is_empty());
    match tag.filter(|t| !t.is_empty()) {
        Some(tag) => match parent {
            Some(parent) => Some(format!("{parent}_{tag}")),
            None => Some(tag.to_string()),
        },
        None => parent.map(|p| p.to_string()),
    }
}

impl Beam {
    /// Spawn a ghost of this beam. The ghost's configuration is a snapshot of
    /// this beam's current configuration (except `idx`), with the overrides
    /// in `opts` applied. The ghost's `ghost_idx` is this beam's ghost count,
    /// which is then incremented.
    ///
    /// Fails if this beam is itself a ghost.
    pub fn create_ghost(&mut self, opts: GhostOptions) -> Result<&mut Beam, BeamError> {
        if self.is_ghost() {
            return Err(BeamError::GhostOfGhost);
        }

        let mut ghost_opts = self.options();
        ghost_opts.idx = None;
        let name = ghost_name(self.name.as_deref(), opts.tag.as_deref());
        opts.apply(&mut ghost_opts);
        ghost_opts.name = name;
        let parent = self.label();
        let tools = Rc::clone(&self.tools);

        match &mut self.role {
            Role::Ghost { .. } => Err(BeamError::GhostOfGhost),
            Role::Primary {
                ghost_count,
                ghosts,
            } => {
                let ghost = Beam::build(
                    ghost_opts,
                    Role::Ghost {
                        ghost_idx: *ghost_count,
                    },
                    tools,
                )?;
                debug!(
                    "Created ghost {} of {parent} with ghost_idx {ghost_count}",
                    ghost.label()
                );
                *ghost_count += 1;
                let i = ghosts.len();
                ghosts.push(ghost);
                Ok(&mut ghosts[i])
            }
        }
    }

    /// Make this beam use the same coefficients as `partner` (computing them
    /// if necessary). The coefficients are shared, not copied; a change made
    /// through one beam's handle is seen by the other. `btype`, `lmax`,
    /// `mmax` and `amplitude` are also copied. If both beams are ghosts, this
    /// beam also takes `partner`'s `ghost_idx`.
    pub fn reuse_blm(&mut self, partner: &mut Beam) -> Result<(), BeamError> {
        let blm = partner.blm()?;
        if let (Role::Ghost { ghost_idx }, Role::Ghost { ghost_idx: partner_idx }) =
            (&mut self.role, &partner.role)
        {
            *ghost_idx = *partner_idx;
        }

        self.blm = Some(blm);
        self.btype = partner.btype;
        self.lmax = partner.lmax;
        self.mmax = partner.mmax.min(partner.lmax);
        self.amplitude = partner.amplitude;
        Ok(())
    }

    /// The `ghost_idx` the next ghost will get. `None` for a ghost.
    pub fn ghost_count(&self) -> Option<usize> {
        match self.role {
            Role::Primary { ghost_count, .. } => Some(ghost_count),
            Role::Ghost { .. } => None,
        }
    }

    pub fn set_ghost_count(&mut self, count: usize) -> Result<(), BeamError> {
        match &mut self.role {
            Role::Primary { ghost_count, .. } => {
                *ghost_count = count;
                Ok(())
            }
            Role::Ghost { .. } => Err(BeamError::GhostCountOnGhost),
        }
    }

    /// `None` for a primary beam.
    pub fn ghost_idx(&self) -> Option<usize> {
        match self.role {
            Role::Primary { .. } => None,
            Role::Ghost { ghost_idx } => Some(ghost_idx),
        }
    }

    pub fn set_ghost_idx(&mut self, idx: usize) -> Result<(), BeamError> {
        match &mut self.role {
            Role::Primary { .. } => Err(BeamError::GhostIdxOnPrimary),
            Role::Ghost { ghost_idx } => {
                *ghost_idx = idx;
                Ok(())
            }
        }
    }

    /// The ghosts of this beam, in order of creation. Always empty for a
    /// ghost.
    pub fn ghosts(&self) -> &[Beam] {
        match &self.role {
            Role::Primary { ghosts, .. } => ghosts,
            Role::Ghost { .. } => &[],
        }
    }

    pub fn ghosts_mut(&mut self) -> &mut [Beam] {
        match &mut self.role {
            Role::Primary { ghosts, .. } => ghosts,
            Role::Ghost { .. } => &mut [],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ghost_name;

    #[test]
    fn test_ghost_name() {
        assert_eq!(ghost_name(Some("det"), Some("ghost")).as_deref(), Some("det_ghost"));
        assert_eq!(ghost_name(None, Some("ghost")).as_deref(), Some("ghost"));
        assert_eq!(ghost_name(Some(""), Some("ghost")).as_deref(), Some("ghost"));
        assert_eq!(ghost_name(Some("det"), Some("")).as_deref(), Some("det"));
        assert_eq!(ghost_name(Some("det"), None).as_deref(), Some("det"));
        assert_eq!(ghost_name(None, None), None);
    }
}
