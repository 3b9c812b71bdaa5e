use carve_chunk::{BorderCache, ChunkBuf, ChunkCoord};

/// Mesh lifecycle of one resident chunk.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HostState {
    /// The committed mesh matches the current voxel data.
    Clean,
    /// Voxel data changed since the last commit; a remesh is owed.
    Dirty,
    /// A job for revision `rev` is queued or running.
    Computing { rev: u64 },
}

/// One chunk slot in the world grid: the authoritative voxel buffer,
/// the cached neighbor border planes, and the remesh bookkeeping.
///
/// `rev` counts edits; `built_rev` is the revision of the last mesh the
/// grid committed. A finished job is applied only if its revision still
/// matches `rev`, so stale results from superseded jobs are discarded
/// instead of overwriting newer geometry.
pub struct ChunkHost {
    pub coord: ChunkCoord,
    pub buf: ChunkBuf,
    pub borders: BorderCache,
    pub state: HostState,
    pub rev: u64,
    pub built_rev: u64,
    /// Next remesh should take the priority lane.
    pub urgent: bool,
}

impl ChunkHost {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            buf: ChunkBuf::new(coord),
            borders: BorderCache::new(),
            state: HostState::Clean,
            rev: 0,
            built_rev: 0,
            urgent: false,
        }
    }

    /// Records an edit: bumps the revision and marks the chunk for
    /// remeshing. A chunk already `Computing` stays in flight; its
    /// result will arrive with an older revision and be rescheduled.
    pub fn mark_dirty(&mut self, urgent: bool) {
        self.rev += 1;
        self.urgent |= urgent;
        if !matches!(self.state, HostState::Computing { .. }) {
            self.state = HostState::Dirty;
        }
    }

    /// Whether `update` should schedule a job for this chunk now.
    pub fn wants_schedule(&self) -> bool {
        matches!(self.state, HostState::Dirty)
    }

    pub fn on_scheduled(&mut self) {
        self.state = HostState::Computing { rev: self.rev };
        self.urgent = false;
    }

    /// Handles a finished job for revision `out_rev`. Returns `true`
    /// when the result is current and its mesh should be committed.
    pub fn on_result(&mut self, out_rev: u64) -> bool {
        match self.state {
            HostState::Computing { rev } if rev == out_rev => {
                if self.rev == out_rev {
                    self.built_rev = out_rev;
                    self.state = HostState::Clean;
                    true
                } else {
                    // Edited while the job ran; remesh again.
                    self.state = HostState::Dirty;
                    false
                }
            }
            // A newer job replaced this one, or the result raced a
            // state change. Drop it.
            _ => false,
        }
    }
}
