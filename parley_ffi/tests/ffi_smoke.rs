//! FFI smoke tests.
//!
//! These tests call the exported `extern "C"` functions directly (as an
//! external consumer would), to validate:
//! - ABI surface compiles and links
//! - allocation/free symmetry for returned buffers
//! - the estimate trace framing is well-formed

use std::ptr;

use parley_ffi::*;

fn s(s: &str) -> PlyStr {
    PlyStr {
        ptr: s.as_ptr(),
        len: s.len(),
    }
}

fn two_issue_domain() -> (Vec<PlyStr>, Vec<PlyStr>) {
    (
        vec![s("high"), s("low")],
        vec![s("fast"), s("slow")],
    )
}

unsafe fn new_session() -> (*mut PlySession, Vec<PlyStr>, Vec<PlyStr>) {
    let (price_values, delivery_values) = two_issue_domain();
    let issues = [
        PlyIssue {
            name: s("price"),
            values_ptr: price_values.as_ptr(),
            values_len: price_values.len(),
        },
        PlyIssue {
            name: s("delivery"),
            values_ptr: delivery_values.as_ptr(),
            values_len: delivery_values.len(),
        },
    ];
    let own_weights = [0.6_f64, 0.4];
    let own_values = [1.0_f64, 0.2, 1.0, 0.5];

    let h = parley_session_new(
        issues.as_ptr(),
        issues.len(),
        own_weights.as_ptr(),
        own_values.as_ptr(),
        parley_cfg_default(),
    );
    (h, price_values, delivery_values)
}

#[test]
fn ffi_version_and_default_cfg() {
    assert_eq!(parley_ffi_version(), PARLEY_FFI_VERSION);

    let cfg = parley_cfg_default();
    assert_eq!(cfg.warmup_bids, 30);
    assert_eq!(cfg.update_interval, 5);
    assert!(cfg.stability_alpha > 0.0 && cfg.stability_alpha < 1.0);
}

#[test]
fn ffi_null_inputs_are_rejected() {
    let h = unsafe {
        parley_session_new(
            ptr::null(),
            0,
            ptr::null(),
            ptr::null(),
            parley_cfg_default(),
        )
    };
    assert!(h.is_null());
    assert!(unsafe { parley_confidence(ptr::null_mut()) } < 0.0);
}

#[test]
fn ffi_session_offer_turn_and_free() {
    let (h, _pv, _dv) = unsafe { new_session() };
    assert!(!h.is_null());

    // Counterpart opens with its apparent favorite.
    let offer = [1u32, 1];
    let rc = unsafe { parley_offer_received(h, offer.as_ptr(), offer.len(), 0.05) };
    assert_eq!(rc, 0);

    // Arity mismatch is rejected.
    let bad = [1u32];
    let rc = unsafe { parley_offer_received(h, bad.as_ptr(), bad.len(), 0.06) };
    assert!(rc < 0);

    // Our move: counter with the top own-utility bid.
    let action = unsafe { parley_your_turn(h, 0.1) };
    assert_eq!(action.accept, 0);
    assert_eq!(action.values_len, 2);
    let values = unsafe { std::slice::from_raw_parts(action.values_ptr, action.values_len) };
    assert_eq!(values, &[0, 0]);
    unsafe { parley_action_free(action) };

    // Model queries work once an offer has been observed.
    let mut weights = [0.0_f64; 2];
    let n = unsafe { parley_weights(h, weights.as_mut_ptr(), weights.len()) };
    assert_eq!(n, 2);
    assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);

    let u = unsafe { parley_evaluate(h, offer.as_ptr(), offer.len()) };
    assert!(u >= 0.0 && u <= 1.0 + 1e-9);

    unsafe { parley_session_free(h) };
}

#[test]
fn ffi_trace_export_is_framed_and_freed() {
    let (h, _pv, _dv) = unsafe { new_session() };
    assert!(!h.is_null());

    // Enough observations to cross warm-up and trigger recomputes.
    for i in 0..35u32 {
        let offer = [(i / 10) % 2, 0u32];
        let rc =
            unsafe { parley_offer_received(h, offer.as_ptr(), offer.len(), f64::from(i) / 40.0) };
        assert_eq!(rc, 0);
    }

    let bytes = unsafe { parley_trace(h) };
    assert!(!bytes.ptr.is_null());
    assert!(bytes.len >= 12);

    let data = unsafe { std::slice::from_raw_parts(bytes.ptr, bytes.len) };
    let magic = u32::from_le_bytes(data[0..4].try_into().unwrap());
    let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
    let count = u32::from_le_bytes(data[8..12].try_into().unwrap());
    assert_eq!(magic, 0x3159_4C50);
    assert_eq!(version, 1);
    // Default cadence recomputes at the 30th and 35th observed bids.
    assert_eq!(count, 2);

    unsafe { parley_bytes_free(bytes) };
    unsafe { parley_session_finish(h) };
    unsafe { parley_session_free(h) };
}
