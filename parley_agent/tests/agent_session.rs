use parley_agent::*;
use parley_model::{Bid, Domain, IssueSpec, ModelCfg};

fn domain() -> Domain {
    Domain::new(vec![
        IssueSpec::new("price", vec!["high".into(), "low".into()]),
        IssueSpec::new("delivery", vec!["fast".into(), "slow".into()]),
    ])
    .expect("non-degenerate domain")
}

fn profile(d: &Domain) -> LinearAdditiveUtilitySpace {
    LinearAdditiveUtilitySpace::new(
        d,
        vec![0.6, 0.4],
        vec![vec![1.0, 0.2], vec![1.0, 0.5]],
    )
    .expect("profile matches domain")
}

fn bid(d: &Domain, values: &[u32]) -> Bid {
    Bid::new(d, values.to_vec()).expect("bid fits domain")
}

#[test]
fn utility_space_shape_is_validated() {
    let d = domain();
    assert!(LinearAdditiveUtilitySpace::new(&d, vec![1.0], vec![vec![1.0, 0.2]]).is_err());
    assert!(
        LinearAdditiveUtilitySpace::new(&d, vec![0.5, 0.5], vec![vec![1.0], vec![1.0, 0.5]])
            .is_err()
    );
    assert!(
        LinearAdditiveUtilitySpace::new(&d, vec![0.0, 0.0], vec![vec![1.0, 0.2], vec![1.0, 0.5]])
            .is_err()
    );
}

#[test]
fn utility_space_normalizes_weights() {
    let d = domain();
    let us = LinearAdditiveUtilitySpace::new(
        &d,
        vec![3.0, 2.0],
        vec![vec![1.0, 0.2], vec![1.0, 0.5]],
    )
    .expect("valid profile");
    let u = us.utility(&bid(&d, &[0, 0]));
    assert!((u - 1.0).abs() < 1e-12);
}

#[test]
fn bid_space_enumeration_and_bucketing() {
    let d = domain();
    let us = profile(&d);
    let all = enumerate_bids(&d);
    assert_eq!(all.len(), 4);

    let stages = BidStages::build(&d, &us);
    assert_eq!(stages.best(), Some(&bid(&d, &[0, 0])));
    // Only the top-utility bid lives in stage 0.
    assert_eq!(stages.up_to(0).count(), 1);
    assert_eq!(stages.up_to(19).count(), 4);
}

#[test]
fn accept_only_near_deadline_on_a_strict_improvement() {
    let d = domain();
    let us = profile(&d);
    let stages = BidStages::build(&d, &us);
    let strategy = BiddingStrategy::new(stages, StrategyCfg::default());

    let best = bid(&d, &[0, 0]);
    let worse = bid(&d, &[0, 1]);
    assert!(strategy.should_accept(&best, &worse, &us, 0.9));
    assert!(!strategy.should_accept(&best, &worse, &us, 0.5));
    assert!(!strategy.should_accept(&best, &best, &us, 0.9));
}

#[test]
fn session_opens_with_its_best_bid() {
    let d = domain();
    let mut session = NegotiationSession::new(
        d.clone(),
        profile(&d),
        ModelCfg::default(),
        StrategyCfg::default(),
    );
    let action = session.handle(SessionEvent::YourTurn { progress: 0.0 });
    assert_eq!(action, Some(Action::Offer(bid(&d, &[0, 0]))));
}

#[test]
fn session_does_not_repeat_recent_offers() {
    let d = domain();
    let mut session = NegotiationSession::new(
        d.clone(),
        profile(&d),
        ModelCfg::default(),
        StrategyCfg::default(),
    );
    session.handle(SessionEvent::OpponentOffer {
        bid: bid(&d, &[1, 1]),
        progress: 0.05,
    });
    let first = session.handle(SessionEvent::YourTurn { progress: 0.1 });
    let second = session.handle(SessionEvent::YourTurn { progress: 0.15 });
    assert_eq!(first, Some(Action::Offer(bid(&d, &[0, 0]))));
    assert_ne!(first, second, "back-to-back turns must not repeat the offer");
}

#[test]
fn session_accepts_a_late_winning_offer() {
    let d = domain();
    let mut session = NegotiationSession::new(
        d.clone(),
        profile(&d),
        ModelCfg::default(),
        StrategyCfg::default(),
    );

    session.handle(SessionEvent::OpponentOffer {
        bid: bid(&d, &[1, 1]),
        progress: 0.1,
    });
    session.handle(SessionEvent::YourTurn { progress: 0.15 });
    session.handle(SessionEvent::OpponentOffer {
        bid: bid(&d, &[1, 1]),
        progress: 0.2,
    });
    // Second counter is a lower-utility bid (top bucket was just proposed).
    session.handle(SessionEvent::YourTurn { progress: 0.25 });

    // The counterpart caves and offers our best bid past the accept gate.
    session.handle(SessionEvent::OpponentOffer {
        bid: bid(&d, &[0, 0]),
        progress: 0.85,
    });
    let action = session.handle(SessionEvent::YourTurn { progress: 0.86 });
    assert_eq!(action, Some(Action::Accept));
}

#[test]
fn finished_session_goes_quiet() {
    let d = domain();
    let mut session = NegotiationSession::new(
        d.clone(),
        profile(&d),
        ModelCfg::default(),
        StrategyCfg::default(),
    );
    session.handle(SessionEvent::Finished);
    assert!(session.is_finished());
    assert_eq!(session.handle(SessionEvent::YourTurn { progress: 0.5 }), None);
}

#[test]
fn trace_captures_every_recompute_and_round_trips() {
    let d = domain();
    let mut session = NegotiationSession::new(
        d.clone(),
        profile(&d),
        ModelCfg::default(),
        StrategyCfg::default(),
    );
    for i in 0..35u32 {
        session.handle(SessionEvent::OpponentOffer {
            bid: bid(&d, &[(i / 10) % 2, 0]),
            progress: f64::from(i) / 40.0,
        });
    }
    // Default cadence: recomputes at the 30th and 35th observed bids.
    let trace = session.trace();
    assert_eq!(trace.len(), 2);
    for entry in trace {
        assert_eq!(entry.weights.len(), 2);
        let sum: f64 = entry.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    let exported = session.export_trace();
    let json = serde_json::to_string(&exported).expect("trace serializes");
    let back: EstimateTrace = serde_json::from_str(&json).expect("trace deserializes");
    assert_eq!(back.entries.len(), exported.entries.len());
}
