#![allow(clippy::missing_safety_doc)]

use std::ptr;

use parley_agent::{
    Action, LinearAdditiveUtilitySpace, NegotiationSession, SessionEvent, StrategyCfg,
};
use parley_model::{Bid, Domain, IssueSpec, ModelCfg};

/// FFI ABI version for parley_ffi.
///
/// Bump this when any `#[repr(C)]` struct layout or exported function
/// signature changes.
pub const PARLEY_FFI_VERSION: u32 = 1;

#[no_mangle]
pub extern "C" fn parley_ffi_version() -> u32 {
    PARLEY_FFI_VERSION
}

// Estimate-trace wire format identification.
const TRACE_MAGIC: u32 = 0x3159_4C50; // "PLY1" little-endian
const TRACE_VERSION: u32 = 1;

/// Opaque handle exposed over FFI.
#[repr(C)]
pub struct PlySession {
    inner: NegotiationSession<LinearAdditiveUtilitySpace>,
    issue_count: usize,
}

/// FFI string view (UTF-8 bytes).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PlyStr {
    pub ptr: *const u8,
    pub len: usize,
}

impl PlyStr {
    fn as_str(&self) -> Option<&str> {
        if self.ptr.is_null() {
            return None;
        }
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        std::str::from_utf8(bytes).ok()
    }
}

/// One issue of the domain catalogue: a name plus its value names.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PlyIssue {
    pub name: PlyStr,
    pub values_ptr: *const PlyStr,
    pub values_len: usize,
}

/// Model configuration for FFI (mirrors `ModelCfg`).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PlyCfg {
    pub max_window_size: u32,
    pub warmup_bids: u32,
    pub update_interval: u32,
    pub stability_alpha: f64,
    pub window_stride: u32,
}

#[no_mangle]
pub extern "C" fn parley_cfg_default() -> PlyCfg {
    let d = ModelCfg::default();
    PlyCfg {
        max_window_size: d.max_window_size as u32,
        warmup_bids: d.warmup_bids as u32,
        update_interval: d.update_interval as u32,
        stability_alpha: d.stability_alpha,
        window_stride: d.window_stride as u32,
    }
}

fn cfg_from_ffi(c: PlyCfg) -> ModelCfg {
    ModelCfg {
        max_window_size: c.max_window_size as usize,
        warmup_bids: c.warmup_bids as usize,
        update_interval: c.update_interval.max(1) as usize,
        stability_alpha: c.stability_alpha,
        window_stride: c.window_stride.max(1) as usize,
    }
}

/// The agent's move for one turn. `accept != 0` means accept the standing
/// offer and `values_ptr` is null; otherwise `values_ptr`/`values_len` hold
/// the counter bid (one value index per issue) and must be freed with
/// `parley_action_free`.
#[repr(C)]
pub struct PlyAction {
    pub accept: u8,
    pub values_ptr: *mut u32,
    pub values_len: usize,
}

/// Owned byte buffer (for the estimate trace).
#[repr(C)]
pub struct PlyBytes {
    pub ptr: *mut u8,
    pub len: usize,
}

/// Create a new session handle.
///
/// `issues` describes the domain catalogue. `own_weights` holds one issue
/// weight per issue; `own_values` holds the agent's per-value utilities,
/// concatenated per issue in catalogue order. Returns null when any input
/// is malformed.
#[no_mangle]
pub unsafe extern "C" fn parley_session_new(
    issues_ptr: *const PlyIssue,
    issues_len: usize,
    own_weights_ptr: *const f64,
    own_values_ptr: *const f64,
    cfg: PlyCfg,
) -> *mut PlySession {
    if issues_ptr.is_null() || issues_len == 0 || own_weights_ptr.is_null() || own_values_ptr.is_null()
    {
        return ptr::null_mut();
    }

    let issues = std::slice::from_raw_parts(issues_ptr, issues_len);
    let mut specs: Vec<IssueSpec> = Vec::with_capacity(issues_len);
    let mut total_values = 0usize;
    for issue in issues {
        let name = match issue.name.as_str() {
            Some(s) => s.to_string(),
            None => return ptr::null_mut(),
        };
        if issue.values_ptr.is_null() || issue.values_len == 0 {
            return ptr::null_mut();
        }
        let value_views = std::slice::from_raw_parts(issue.values_ptr, issue.values_len);
        let mut values = Vec::with_capacity(issue.values_len);
        for v in value_views {
            match v.as_str() {
                Some(s) => values.push(s.to_string()),
                None => return ptr::null_mut(),
            }
        }
        total_values += values.len();
        specs.push(IssueSpec::new(name, values));
    }

    let domain = match Domain::new(specs) {
        Ok(d) => d,
        Err(_) => return ptr::null_mut(),
    };

    let weights = std::slice::from_raw_parts(own_weights_ptr, issues_len).to_vec();
    let flat_values = std::slice::from_raw_parts(own_values_ptr, total_values);
    let mut values: Vec<Vec<f64>> = Vec::with_capacity(issues_len);
    let mut offset = 0usize;
    for issue in 0..issues_len {
        let n = domain
            .issue(issue)
            .expect("issue index bounded by issues_len")
            .values
            .len();
        values.push(flat_values[offset..offset + n].to_vec());
        offset += n;
    }

    let profile = match LinearAdditiveUtilitySpace::new(&domain, weights, values) {
        Ok(p) => p,
        Err(_) => return ptr::null_mut(),
    };

    let session = NegotiationSession::new(
        domain,
        profile,
        cfg_from_ffi(cfg),
        StrategyCfg::default(),
    );
    Box::into_raw(Box::new(PlySession {
        inner: session,
        issue_count: issues_len,
    }))
}

#[no_mangle]
pub unsafe extern "C" fn parley_session_free(h: *mut PlySession) {
    if !h.is_null() {
        drop(Box::from_raw(h));
    }
}

/// Feed one received counterpart offer (one value index per issue).
/// Returns 0 on success, negative on malformed input.
#[no_mangle]
pub unsafe extern "C" fn parley_offer_received(
    h: *mut PlySession,
    values_ptr: *const u32,
    values_len: usize,
    progress: f64,
) -> i32 {
    if h.is_null() || values_ptr.is_null() {
        return -1;
    }
    let handle = &mut *h;
    if values_len != handle.issue_count {
        return -2;
    }
    let values = std::slice::from_raw_parts(values_ptr, values_len).to_vec();
    let bid = match Bid::new(handle.inner.domain(), values) {
        Ok(b) => b,
        Err(_) => return -3,
    };
    handle
        .inner
        .handle(SessionEvent::OpponentOffer { bid, progress });
    0
}

/// Ask the agent for its move. Returns an owned action (free with
/// `parley_action_free` when `accept == 0`).
#[no_mangle]
pub unsafe extern "C" fn parley_your_turn(h: *mut PlySession, progress: f64) -> PlyAction {
    if h.is_null() {
        return PlyAction {
            accept: 0,
            values_ptr: ptr::null_mut(),
            values_len: 0,
        };
    }
    let handle = &mut *h;
    match handle.inner.handle(SessionEvent::YourTurn { progress }) {
        Some(Action::Accept) => PlyAction {
            accept: 1,
            values_ptr: ptr::null_mut(),
            values_len: 0,
        },
        Some(Action::Offer(bid)) => {
            let mut values = bid.values().to_vec().into_boxed_slice();
            let values_ptr = values.as_mut_ptr();
            let values_len = values.len();
            std::mem::forget(values);
            PlyAction {
                accept: 0,
                values_ptr,
                values_len,
            }
        }
        None => PlyAction {
            accept: 0,
            values_ptr: ptr::null_mut(),
            values_len: 0,
        },
    }
}

#[no_mangle]
pub unsafe extern "C" fn parley_action_free(a: PlyAction) {
    if !a.values_ptr.is_null() {
        let slice_ptr = std::ptr::slice_from_raw_parts_mut(a.values_ptr, a.values_len);
        drop(Box::from_raw(slice_ptr));
    }
}

/// Mark the session finished (agreement or deadline).
#[no_mangle]
pub unsafe extern "C" fn parley_session_finish(h: *mut PlySession) {
    if !h.is_null() {
        (*h).inner.handle(SessionEvent::Finished);
    }
}

/// Copy the current issue weight estimate into `out_ptr` (capacity `cap`).
/// Returns the number of weights written, or -1 on bad input. Before the
/// first received offer there is no model yet and 0 is written.
#[no_mangle]
pub unsafe extern "C" fn parley_weights(h: *mut PlySession, out_ptr: *mut f64, cap: usize) -> i32 {
    if h.is_null() || out_ptr.is_null() {
        return -1;
    }
    let handle = &*h;
    let Some(model) = handle.inner.model() else {
        return 0;
    };
    let weights = model.issue_weights();
    if cap < weights.len() {
        return -1;
    }
    let out = std::slice::from_raw_parts_mut(out_ptr, weights.len());
    out.copy_from_slice(weights);
    weights.len() as i32
}

/// Estimation confidence in [0, 1); -1.0 on a null handle, 0.0 before the
/// first received offer.
#[no_mangle]
pub unsafe extern "C" fn parley_confidence(h: *mut PlySession) -> f64 {
    if h.is_null() {
        return -1.0;
    }
    (*h).inner.model().map(|m| m.confidence()).unwrap_or(0.0)
}

/// Concedence score; 0.0 before the first received offer, NaN on null.
#[no_mangle]
pub unsafe extern "C" fn parley_concedence(h: *mut PlySession) -> f64 {
    if h.is_null() {
        return f64::NAN;
    }
    (*h)
        .inner
        .model()
        .map(|m| m.concedence_score())
        .unwrap_or(0.0)
}

/// Estimated opponent utility of a bid under the current model state.
/// Returns -1.0 on bad input or before the first received offer.
#[no_mangle]
pub unsafe extern "C" fn parley_evaluate(
    h: *mut PlySession,
    values_ptr: *const u32,
    values_len: usize,
) -> f64 {
    if h.is_null() || values_ptr.is_null() {
        return -1.0;
    }
    let handle = &*h;
    let Some(model) = handle.inner.model() else {
        return -1.0;
    };
    if values_len != handle.issue_count {
        return -1.0;
    }
    let values = std::slice::from_raw_parts(values_ptr, values_len).to_vec();
    match Bid::new(model.domain(), values) {
        Ok(bid) => model.evaluate(&bid),
        Err(_) => -1.0,
    }
}

/// Estimate trace format (binary, little-endian):
/// [u32 magic = "PLY1"][u32 version = 1][u32 count]
/// repeated count times:
///   [f64 progress][f64 confidence][f64 concedence][u32 n][n x f64 weights]
#[no_mangle]
pub unsafe extern "C" fn parley_trace(h: *mut PlySession) -> PlyBytes {
    if h.is_null() {
        return PlyBytes {
            ptr: ptr::null_mut(),
            len: 0,
        };
    }
    let handle = &*h;
    let trace = handle.inner.trace();

    let mut buf: Vec<u8> = Vec::new();
    buf.extend_from_slice(&TRACE_MAGIC.to_le_bytes());
    buf.extend_from_slice(&TRACE_VERSION.to_le_bytes());
    buf.extend_from_slice(&(trace.len() as u32).to_le_bytes());

    for entry in trace {
        buf.extend_from_slice(&entry.progress.to_le_bytes());
        buf.extend_from_slice(&entry.confidence.to_le_bytes());
        buf.extend_from_slice(&entry.concedence.to_le_bytes());
        buf.extend_from_slice(&(entry.weights.len() as u32).to_le_bytes());
        for w in &entry.weights {
            buf.extend_from_slice(&w.to_le_bytes());
        }
    }

    let mut boxed = buf.into_boxed_slice();
    let ptr = boxed.as_mut_ptr();
    let len = boxed.len();
    std::mem::forget(boxed);

    PlyBytes { ptr, len }
}

#[no_mangle]
pub unsafe extern "C" fn parley_bytes_free(b: PlyBytes) {
    if !b.ptr.is_null() {
        let slice_ptr = std::ptr::slice_from_raw_parts_mut(b.ptr, b.len);
        drop(Box::from_raw(slice_ptr));
    }
}
