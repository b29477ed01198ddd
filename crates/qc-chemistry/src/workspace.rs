//! Per-solve scratch and the pool that hands it out.

use qc_kinetics::KineticsScratch;
use qc_ode::{OdeSolver, OdeSolverKind};
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Everything one cell solve writes to: the `[c, T, p]` buffer, kernel
/// buffers and the ODE engine's stage storage.
#[derive(Debug)]
pub struct Workspace {
    pub(crate) ctp: Vec<f64>,
    pub(crate) kinetics: KineticsScratch,
    pub(crate) ode: OdeSolver,
}

impl Workspace {
    pub(crate) fn new(kinetics: KineticsScratch, solver: OdeSolverKind) -> Self {
        let n_eqns = kinetics.n_species() + 2;
        Self {
            ctp: vec![0.0; n_eqns],
            kinetics,
            ode: OdeSolver::new(solver, n_eqns),
        }
    }

    pub fn n_species(&self) -> usize {
        self.kinetics.n_species()
    }

    pub fn solver(&self) -> OdeSolverKind {
        self.ode.kind()
    }
}

/// Free list of workspaces shared by concurrent solves.
#[derive(Debug, Default)]
pub(crate) struct WorkspacePool {
    free: Mutex<Vec<Workspace>>,
}

impl WorkspacePool {
    /// Take a workspace, building one with `make` if none is free.
    pub(crate) fn checkout(&self, make: impl FnOnce() -> Workspace) -> PooledWorkspace<'_> {
        // A poisoned list still holds intact workspaces.
        let recycled = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        PooledWorkspace {
            pool: self,
            workspace: Some(recycled.unwrap_or_else(make)),
        }
    }

    pub(crate) fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn give_back(&self, workspace: Workspace) {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(workspace);
    }
}

/// Exclusive loan of a pooled workspace; returned on drop.
pub(crate) struct PooledWorkspace<'a> {
    pool: &'a WorkspacePool,
    workspace: Option<Workspace>,
}

impl Deref for PooledWorkspace<'_> {
    type Target = Workspace;

    fn deref(&self) -> &Workspace {
        self.workspace
            .as_ref()
            .unwrap_or_else(|| unreachable!("workspace taken before drop"))
    }
}

impl DerefMut for PooledWorkspace<'_> {
    fn deref_mut(&mut self) -> &mut Workspace {
        self.workspace
            .as_mut()
            .unwrap_or_else(|| unreachable!("workspace taken before drop"))
    }
}

impl Drop for PooledWorkspace<'_> {
    fn drop(&mut self) {
        if let Some(workspace) = self.workspace.take() {
            self.pool.give_back(workspace);
        }
    }
}
