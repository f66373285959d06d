//! Optional core pinning for pipeline stage threads, behind the
//! `pin-threads` feature (off by default so tests run on any machine).
//! Adapted from the teacher's `perf::cpu` module.

#[cfg(feature = "pin-threads")]
pub fn pin_current_thread_to_core(core_index: usize) {
    if let Some(cores) = core_affinity::get_core_ids() {
        if let Some(core) = cores.get(core_index) {
            core_affinity::set_for_current(*core);
        } else {
            tracing::warn!(core_index, "no core at requested index, skipping pin");
        }
    }
}

#[cfg(not(feature = "pin-threads"))]
pub fn pin_current_thread_to_core(_core_index: usize) {}
