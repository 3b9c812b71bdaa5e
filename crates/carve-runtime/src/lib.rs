//! Mesh job queues and worker orchestration.
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TryRecvError, select, unbounded};

use carve_chunk::{BorderCache, ChunkBuf, ChunkCoord};
use carve_mesh::{MeshOut, build_chunk_mesh};
use carve_paint::PaintSnapshot;
use carve_voxel::MeshPalette;

/// Everything a worker needs to remesh one chunk. Snapshots only, no
/// shared mutable state crosses the channel.
#[derive(Clone)]
pub struct MeshJob {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub job_id: u64,
    pub buf: ChunkBuf,
    pub borders: BorderCache,
    pub palette: Arc<MeshPalette>,
    pub overlay: Option<PaintSnapshot>,
    pub seed: u64,
}

pub struct JobOut {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub job_id: u64,
    pub kind: JobKind,
    /// None when the chunk produced no geometry.
    pub mesh: Option<MeshOut>,
    pub t_total_ms: u32,
    pub t_mesh_ms: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Lane {
    Edit,
    Bg,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobKind {
    Edit,
    Bg,
}

fn process_mesh_job(job: MeshJob, lane: Lane, tx: &Sender<JobOut>) {
    let MeshJob {
        coord,
        rev,
        job_id,
        buf,
        borders,
        palette,
        overlay,
        seed,
    } = job;

    let t_job_start = Instant::now();
    let kind = match lane {
        Lane::Edit => JobKind::Edit,
        Lane::Bg => JobKind::Bg,
    };

    if !buf.has_non_air() {
        let t_total_ms = t_job_start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
        let _ = tx.send(JobOut {
            coord,
            rev,
            job_id,
            kind,
            mesh: None,
            t_total_ms,
            t_mesh_ms: 0,
        });
        return;
    }

    let t0 = Instant::now();
    let mesh = build_chunk_mesh(&buf, &borders, &palette, overlay.as_ref(), seed);
    let t_mesh_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    let t_total_ms = t_job_start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    log::trace!(
        "meshed chunk ({},{},{}) rev={} in {}ms",
        coord.cx,
        coord.cy,
        coord.cz,
        rev,
        t_mesh_ms
    );
    let _ = tx.send(JobOut {
        coord,
        rev,
        job_id,
        kind,
        mesh: if mesh.is_empty() { None } else { Some(mesh) },
        t_total_ms,
        t_mesh_ms,
    });
}

/// Owns the worker pools and the job/result channels. Results are
/// pulled by polling [`Runtime::drain_worker_results`]; nothing calls
/// back into the caller.
pub struct Runtime {
    job_tx_edit: Sender<MeshJob>,
    job_tx_bg: Sender<MeshJob>,
    res_rx: Receiver<JobOut>,
    _edit_pool: Option<Arc<rayon::ThreadPool>>,
    bg_pool: Option<Arc<rayon::ThreadPool>>,
    q_edit: Arc<AtomicUsize>,
    q_bg: Arc<AtomicUsize>,
    inflight_edit: Arc<AtomicUsize>,
    inflight_bg: Arc<AtomicUsize>,
    pub w_edit: usize,
    pub w_bg: usize,
}

impl Runtime {
    pub fn new() -> Self {
        let worker_count: usize = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(8);
        let w_edit = 1usize;
        let w_bg = worker_count.saturating_sub(w_edit).max(1);
        Self::with_workers(w_edit, w_bg)
    }

    pub fn with_workers(w_edit: usize, w_bg: usize) -> Self {
        // With no workers at all, submitted jobs would queue forever.
        let w_edit = if w_edit == 0 && w_bg == 0 { 1 } else { w_edit };
        let (job_tx_edit, job_rx_edit) = unbounded::<MeshJob>();
        let (job_tx_bg, job_rx_bg) = unbounded::<MeshJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();

        let q_edit_ctr = Arc::new(AtomicUsize::new(0));
        let q_bg_ctr = Arc::new(AtomicUsize::new(0));
        let inflight_edit_ctr = Arc::new(AtomicUsize::new(0));
        let inflight_bg_ctr = Arc::new(AtomicUsize::new(0));

        let edit_pool = if w_edit > 0 {
            let pool = Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(w_edit)
                    .thread_name(|i| format!("carve-edit-{i}"))
                    .build()
                    .expect("edit pool"),
            );
            for _ in 0..w_edit {
                let rx = job_rx_edit.clone();
                let tx = res_tx.clone();
                let q_edit = q_edit_ctr.clone();
                let inflight_edit = inflight_edit_ctr.clone();
                pool.spawn(move || {
                    while let Ok(job) = rx.recv() {
                        q_edit.fetch_sub(1, Ordering::Relaxed);
                        inflight_edit.fetch_add(1, Ordering::Relaxed);
                        process_mesh_job(job, Lane::Edit, &tx);
                        inflight_edit.fetch_sub(1, Ordering::Relaxed);
                    }
                });
            }
            Some(pool)
        } else {
            None
        };

        let bg_pool = if w_bg > 0 {
            let pool = Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(w_bg)
                    .thread_name(|i| format!("carve-bg-{i}"))
                    .build()
                    .expect("bg pool"),
            );
            for _ in 0..w_bg {
                let bg_rx = job_rx_bg.clone();
                let edit_rx = job_rx_edit.clone();
                let tx = res_tx.clone();
                let q_bg = q_bg_ctr.clone();
                let inflight_bg = inflight_bg_ctr.clone();
                let q_edit = q_edit_ctr.clone();
                let inflight_edit = inflight_edit_ctr.clone();
                pool.spawn(move || {
                    loop {
                        // Steal edit work first so edits never wait
                        // behind a backlog of background remeshes.
                        match edit_rx.try_recv() {
                            Ok(job) => {
                                q_edit.fetch_sub(1, Ordering::Relaxed);
                                inflight_edit.fetch_add(1, Ordering::Relaxed);
                                process_mesh_job(job, Lane::Edit, &tx);
                                inflight_edit.fetch_sub(1, Ordering::Relaxed);
                                continue;
                            }
                            Err(TryRecvError::Disconnected) => {
                                while let Ok(job) = bg_rx.recv() {
                                    q_bg.fetch_sub(1, Ordering::Relaxed);
                                    inflight_bg.fetch_add(1, Ordering::Relaxed);
                                    process_mesh_job(job, Lane::Bg, &tx);
                                    inflight_bg.fetch_sub(1, Ordering::Relaxed);
                                }
                                break;
                            }
                            Err(TryRecvError::Empty) => {}
                        }

                        select! {
                            recv(edit_rx) -> res => match res {
                                Ok(job) => {
                                    q_edit.fetch_sub(1, Ordering::Relaxed);
                                    inflight_edit.fetch_add(1, Ordering::Relaxed);
                                    process_mesh_job(job, Lane::Edit, &tx);
                                    inflight_edit.fetch_sub(1, Ordering::Relaxed);
                                }
                                Err(_) => {}
                            },
                            recv(bg_rx) -> res => match res {
                                Ok(job) => {
                                    q_bg.fetch_sub(1, Ordering::Relaxed);
                                    inflight_bg.fetch_add(1, Ordering::Relaxed);
                                    process_mesh_job(job, Lane::Bg, &tx);
                                    inflight_bg.fetch_sub(1, Ordering::Relaxed);
                                }
                                Err(_) => break,
                            },
                        }
                    }
                });
            }
            Some(pool)
        } else {
            None
        };

        Self {
            job_tx_edit,
            job_tx_bg,
            res_rx,
            _edit_pool: edit_pool,
            bg_pool,
            q_edit: q_edit_ctr,
            q_bg: q_bg_ctr,
            inflight_edit: inflight_edit_ctr,
            inflight_bg: inflight_bg_ctr,
            w_edit,
            w_bg,
        }
    }

    pub fn submit_mesh_job_edit(&self, job: MeshJob) {
        self.q_edit.fetch_add(1, Ordering::Relaxed);
        if self.job_tx_edit.send(job).is_err() {
            self.q_edit.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub fn submit_mesh_job_bg(&self, job: MeshJob) {
        if self.bg_pool.is_some() {
            self.q_bg.fetch_add(1, Ordering::Relaxed);
            if self.job_tx_bg.send(job).is_err() {
                self.q_bg.fetch_sub(1, Ordering::Relaxed);
            }
        } else {
            self.submit_mesh_job_edit(job);
        }
    }

    /// Non-blocking; returns every completed result currently queued.
    pub fn drain_worker_results(&self) -> Vec<JobOut> {
        self.res_rx.try_iter().collect()
    }

    pub fn queue_debug_counts(&self) -> (usize, usize, usize, usize) {
        (
            self.q_edit.load(Ordering::Relaxed),
            self.inflight_edit.load(Ordering::Relaxed),
            self.q_bg.load(Ordering::Relaxed),
            self.inflight_bg.load(Ordering::Relaxed),
        )
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carve_voxel::{TypeDef, Voxel};
    use std::time::Duration;

    fn palette() -> Arc<MeshPalette> {
        let stone = TypeDef {
            id: 1,
            name: "stone".to_string(),
            base_color: [128, 128, 128, 255],
            default_slice: 0,
            faces: Default::default(),
            transparent: false,
            paintable: false,
        };
        Arc::new(MeshPalette::from_defs(&[Some(TypeDef::air()), Some(stone)]))
    }

    fn job(coord: ChunkCoord, rev: u64, job_id: u64, buf: ChunkBuf) -> MeshJob {
        MeshJob {
            coord,
            rev,
            job_id,
            buf,
            borders: BorderCache::new(),
            palette: palette(),
            overlay: None,
            seed: 0,
        }
    }

    fn wait_results(rt: &Runtime, n: usize) -> Vec<JobOut> {
        let mut out = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while out.len() < n && Instant::now() < deadline {
            out.extend(rt.drain_worker_results());
            thread::sleep(Duration::from_millis(1));
        }
        out
    }

    #[test]
    fn empty_chunk_reports_no_mesh() {
        let rt = Runtime::with_workers(1, 1);
        let coord = ChunkCoord::new(0, 0, 0);
        rt.submit_mesh_job_bg(job(coord, 1, 7, ChunkBuf::new(coord)));
        let results = wait_results(&rt, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].coord, coord);
        assert_eq!(results[0].rev, 1);
        assert_eq!(results[0].job_id, 7);
        assert!(results[0].mesh.is_none());
    }

    #[test]
    fn populated_chunk_returns_geometry() {
        let rt = Runtime::with_workers(1, 1);
        let coord = ChunkCoord::new(2, 0, -1);
        let mut buf = ChunkBuf::new(coord);
        buf.set(3, 3, 3, Voxel::new(1));
        rt.submit_mesh_job_edit(job(coord, 4, 1, buf));
        let results = wait_results(&rt, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, JobKind::Edit);
        let mesh = results[0].mesh.as_ref().unwrap();
        assert_eq!(mesh.quad_count(), 6);
    }

    #[test]
    fn zero_worker_config_still_processes_jobs() {
        let rt = Runtime::with_workers(0, 0);
        assert!(rt.w_edit >= 1);
        let coord = ChunkCoord::new(0, 0, 0);
        let mut buf = ChunkBuf::new(coord);
        buf.set(1, 1, 1, Voxel::new(1));
        rt.submit_mesh_job_bg(job(coord, 1, 0, buf.clone()));
        rt.submit_mesh_job_edit(job(coord, 2, 1, buf));
        let results = wait_results(&rt, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn bg_only_config_steals_from_the_edit_lane() {
        let rt = Runtime::with_workers(0, 1);
        let coord = ChunkCoord::new(1, 0, 0);
        let mut buf = ChunkBuf::new(coord);
        buf.set(0, 0, 0, Voxel::new(1));
        rt.submit_mesh_job_edit(job(coord, 1, 9, buf));
        let results = wait_results(&rt, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].job_id, 9);
    }

    #[test]
    fn all_submitted_jobs_complete() {
        let rt = Runtime::with_workers(1, 2);
        for i in 0..20u64 {
            let coord = ChunkCoord::new(i as i32, 0, 0);
            let mut buf = ChunkBuf::new(coord);
            buf.set(0, 0, 0, Voxel::new(1));
            rt.submit_mesh_job_bg(job(coord, 1, i, buf));
        }
        let results = wait_results(&rt, 20);
        assert_eq!(results.len(), 20);
        let (q_edit, inflight_edit, q_bg, inflight_bg) = rt.queue_debug_counts();
        assert_eq!(q_edit + inflight_edit + q_bg + inflight_bg, 0);
    }
}
