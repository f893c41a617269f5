//! End-to-end behavior of the echo cycle over a mock port.

mod common;

use common::Harness;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serial_echo::diagnostic::Direction;
use serial_echo::engine::EngineState;
use serial_echo::error::EchoError;
use serial_echo::modem::{FlowStrategy, ModemSignals};
use tokio_test::{assert_pending, task};

#[tokio::test]
async fn test_short_frame_round_trip() {
    let mut h = Harness::new(12);
    let input = b"test_conn!";
    h.port.enqueue_read(input);

    assert_eq!(
        h.engine.step().await.unwrap(),
        EngineState::Writing { len: 10 }
    );
    assert_eq!(h.engine.step().await.unwrap(), EngineState::Reading);
    assert_eq!(h.port.get_write_log(), vec![input.to_vec()]);

    // Nothing left on the line: the next read has to wait.
    let mut next = task::spawn(h.engine.step());
    assert_pending!(next.poll());
    drop(next);

    assert_eq!(h.port.available_bytes(), 0);
    assert!(h
        .sink
        .lines()
        .contains(&"Write message: test_conn! | Message length: 10".to_string()));
}

#[tokio::test]
async fn test_embedded_zero_and_non_ascii_bytes() {
    let mut h = Harness::new(12);
    let input = "tē_\0č#".as_bytes();
    h.port.enqueue_read(input);

    h.cycle().await;

    assert_eq!(h.echoed(), input);
    assert!(h
        .sink
        .lines()
        .contains(&"Read message: t[C4][93]_[\\0][C4][8D]# | Message length: 8".to_string()));
}

#[tokio::test]
async fn test_oversized_input_spans_cycles() {
    let mut h = Harness::new(12);
    let input = b"test_connection$";
    h.port.enqueue_read(input);

    h.cycle().await;
    h.cycle().await;

    let log = h.port.get_write_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], b"test_connect".to_vec());
    assert_eq!(log[1], b"ion$".to_vec());
    assert_eq!(h.echoed(), input.to_vec());
}

#[tokio::test]
async fn test_read_fault_stops_the_cycle() {
    let mut h = Harness::new(12);
    h.port.fail_next_read();

    let err = h.engine.step().await.unwrap_err();
    assert!(matches!(
        err,
        EchoError::TransferFailed {
            direction: Direction::Read,
            ..
        }
    ));
    assert_eq!(h.engine.state(), EngineState::Failed);

    // Data arriving afterwards is never touched.
    h.port.enqueue_read(b"late");
    let reads_before = h.port.modem_reads();
    assert_eq!(h.engine.step().await.unwrap(), EngineState::Failed);
    assert_eq!(h.port.modem_reads(), reads_before);
    assert!(h.port.get_write_log().is_empty());
    assert_eq!(h.port.available_bytes(), 4);
}

#[tokio::test]
async fn test_write_fault_stops_the_cycle() {
    let mut h = Harness::new(12);
    h.port.enqueue_read(b"abc");
    h.port.fail_next_write();

    let err = h.engine.run().await.unwrap_err();
    assert!(matches!(
        err,
        EchoError::TransferFailed {
            direction: Direction::Write,
            ..
        }
    ));
    assert_eq!(h.engine.state(), EngineState::Failed);
    assert!(err.report().contains("simulated write fault"));
}

#[tokio::test]
async fn test_signal_query_fault_is_fatal() {
    let mut h = Harness::new(12);
    h.port.fail_next_modem_read();
    h.port.enqueue_read(b"abc");

    let err = h.engine.step().await.unwrap_err();
    assert!(matches!(err, EchoError::SignalQueryFailed(_)));
    assert_eq!(h.engine.state(), EngineState::Failed);
    // The read was never issued.
    assert_eq!(h.port.available_bytes(), 3);
}

#[tokio::test]
async fn test_signal_set_fault_is_fatal() {
    let mut h = Harness::new(12);
    h.port.set_lines(ModemSignals::CTS);
    h.port.fail_next_modem_set();

    let err = h.engine.step().await.unwrap_err();
    assert!(matches!(err, EchoError::SignalSetFailed { raised: true, .. }));
    assert_eq!(err.to_string(), "RTS couldn't be set");
    assert_eq!(h.engine.state(), EngineState::Failed);
}

#[tokio::test]
async fn test_rts_follows_cts_across_cycles() {
    let mut h = Harness::new(12);
    h.port.set_lines(ModemSignals::CTS | ModemSignals::DSR);
    h.port.enqueue_read(b"Send RTS1!");
    h.cycle().await;

    assert!(h.port.lines().contains(ModemSignals::RTS));

    // Remote drops CTS: the next flow-control step lowers RTS.
    h.port.set_lines(ModemSignals::DSR | ModemSignals::RTS);
    h.port.enqueue_read(b"Send RTS0!");
    h.cycle().await;

    assert!(!h.port.lines().contains(ModemSignals::RTS));
    assert_eq!(h.port.signal_log().last(), Some(&(ModemSignals::RTS, false)));
}

#[tokio::test]
async fn test_glitch_reading_does_not_drop_rts() {
    let mut h = Harness::new(12);
    h.port.set_lines(ModemSignals::CTS);
    h.port.script_reading(ModemSignals::CTS);
    h.port.script_reading(ModemSignals::empty());
    h.port.enqueue_read(b"x");

    h.cycle().await;

    assert_eq!(h.port.signal_log(), vec![(ModemSignals::RTS, true)]);
    let state = h.engine.modem_state();
    assert_eq!(state.current, ModemSignals::empty());
    assert_eq!(state.previous, ModemSignals::CTS);
    assert!(h.sink.lines().contains(&"Skipped RTS".to_string()));
}

#[tokio::test]
async fn test_ungated_strategy_lowers_rts_on_zero_reading() {
    let mut h = Harness::with_strategy(12, FlowStrategy::MirrorCtsAlways);
    h.port.script_reading(ModemSignals::CTS);
    h.port.script_reading(ModemSignals::empty());
    h.port.enqueue_read(b"x");

    h.cycle().await;

    assert_eq!(
        h.port.signal_log(),
        vec![(ModemSignals::RTS, true), (ModemSignals::RTS, false)]
    );
    assert_eq!(h.engine.modem_state().previous, ModemSignals::CTS);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn echo_is_identity_within_a_frame(bytes in proptest::collection::vec(any::<u8>(), 1..=12)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let echoed = runtime.block_on(async {
            let mut h = Harness::new(12);
            h.port.enqueue_read(&bytes);
            h.cycle().await;
            h.port.get_write_log()
        });

        prop_assert_eq!(echoed, vec![bytes]);
    }

    #[test]
    fn oversized_input_moves_one_frame_per_cycle(
        bytes in proptest::collection::vec(any::<u8>(), 13..48),
        frame_size in 1usize..=12,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let log = runtime.block_on(async {
            let mut h = Harness::new(frame_size);
            h.port.enqueue_read(&bytes);
            let cycles = bytes.len().div_ceil(frame_size);
            for _ in 0..cycles {
                h.cycle().await;
            }
            h.port.get_write_log()
        });

        prop_assert!(log.iter().all(|chunk| chunk.len() <= frame_size));
        prop_assert!(log[..log.len() - 1].iter().all(|chunk| chunk.len() == frame_size));
        prop_assert_eq!(log.concat(), bytes);
    }
}
