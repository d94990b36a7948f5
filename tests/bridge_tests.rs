mod common;

use common::{collect_statuses, next_status, scripted_reader, FailingSink, MockHttp, SharedSink};
use quadbot::infrastructure::serial::SerialEndpoint;
use quadbot::{BridgeOptions, CommandBridge, HttpOutcome, RobotCommand, Transport};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn serial_bridge(endpoint: SerialEndpoint) -> CommandBridge {
    let options = BridgeOptions {
        poll_interval: Duration::from_millis(5),
        max_in_flight: 4,
    };
    assert_ok!(CommandBridge::new(Transport::Serial(Some(endpoint)), options))
}

fn wireless_bridge(http: Arc<MockHttp>) -> CommandBridge {
    assert_ok!(CommandBridge::new(
        Transport::Wireless(http),
        BridgeOptions::default()
    ))
}

/// Serial bridge tests
#[cfg(test)]
mod serial_tests {
    use super::*;

    #[tokio::test]
    async fn test_status_lines_delivered_in_order() {
        let (reader, script) = scripted_reader();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, SharedSink::default()));
        let mut rx = collect_statuses(&bridge);

        script.push("STATUS:ready\ngarbage\nSTATUS:done\n");

        assert_eq!(next_status(&mut rx).await.as_deref(), Some("ready"));
        assert_eq!(next_status(&mut rx).await.as_deref(), Some("done"));

        bridge.shutdown().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_status_split_across_reads() {
        let (reader, script) = scripted_reader();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, SharedSink::default()));
        let mut rx = collect_statuses(&bridge);

        script.push("STATUS:Limb 2 ");
        script.push("Calibrated\r\n");

        assert_eq!(
            next_status(&mut rx).await.as_deref(),
            Some("Limb 2 Calibrated")
        );
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_undecodable_line_skipped() {
        let (reader, script) = scripted_reader();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, SharedSink::default()));
        let mut rx = collect_statuses(&bridge);

        script.push(b"STATUS:\xff\xfe\n".to_vec());
        script.push("STATUS:ok\n");

        assert_eq!(next_status(&mut rx).await.as_deref(), Some("ok"));
        bridge.shutdown().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_read_fault_reported_once() {
        let (reader, script) = scripted_reader();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, SharedSink::default()));
        let mut rx = collect_statuses(&bridge);

        script.push("STATUS:ready\n");
        script.fail(io::ErrorKind::BrokenPipe);

        assert_eq!(next_status(&mut rx).await.as_deref(), Some("ready"));
        assert_eq!(
            next_status(&mut rx).await.as_deref(),
            Some("Error: Serial connection lost.")
        );

        // the loop has stopped reading
        let reads = script.reads();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(script.reads(), reads);
        assert!(!bridge.is_polling());
        assert!(!bridge.is_serial_connected());

        // later sends fail fast
        bridge.send_command("STAND_UP");
        assert_eq!(
            next_status(&mut rx).await.as_deref(),
            Some("Serial port not connected.")
        );

        bridge.shutdown().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_replaced_observer_receives_nothing() {
        let (reader, script) = scripted_reader();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, SharedSink::default()));

        let mut first = collect_statuses(&bridge);
        script.push("STATUS:one\n");
        assert_eq!(next_status(&mut first).await.as_deref(), Some("one"));

        let mut second = collect_statuses(&bridge);
        script.push("STATUS:two\n");
        assert_eq!(next_status(&mut second).await.as_deref(), Some("two"));
        assert!(first.try_recv().is_err());

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_successful_write_reports_nothing() {
        let (reader, _script) = scripted_reader();
        let sink = SharedSink::default();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, sink.clone()));
        let mut rx = collect_statuses(&bridge);

        bridge.send_command(RobotCommand::stand_up());
        bridge.shutdown().await;

        assert_eq!(sink.contents(), "STAND_UP\n");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_command_sent_verbatim() {
        let (reader, _script) = scripted_reader();
        let sink = SharedSink::default();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, sink.clone()));

        bridge.send_command("ROTATE_M1_CW:1500_500");
        bridge.send_command("STOP_M1_M2_MOTORS");
        bridge.shutdown().await;

        assert_eq!(sink.contents(), "ROTATE_M1_CW:1500_500\nSTOP_M1_M2_MOTORS\n");
    }

    #[tokio::test]
    async fn test_closed_endpoint_reports_not_connected() {
        let (reader, _script) = scripted_reader();
        let sink = SharedSink::default();
        let endpoint = SerialEndpoint::from_streams("mem", reader, sink.clone());
        assert!(endpoint.close());

        let mut bridge = serial_bridge(endpoint);
        let mut rx = collect_statuses(&bridge);

        bridge.send_command("SIT_DOWN");
        bridge.shutdown().await;

        assert_eq!(rx.try_recv().ok().as_deref(), Some("Serial port not connected."));
        assert!(rx.try_recv().is_err());
        assert!(sink.contents().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_reported() {
        let (reader, _script) = scripted_reader();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, FailingSink));
        let mut rx = collect_statuses(&bridge);

        bridge.send_command("STAND_UP");
        bridge.shutdown().await;

        assert_eq!(
            rx.try_recv().ok().as_deref(),
            Some("Error: Serial write failed.")
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_statuses_without_observer_are_dropped() {
        let (reader, script) = scripted_reader();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, SharedSink::default()));

        script.push("STATUS:early\n");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut rx = collect_statuses(&bridge);
        script.push("STATUS:late\n");
        assert_eq!(next_status(&mut rx).await.as_deref(), Some("late"));

        bridge.shutdown().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_twice_is_harmless() {
        let (reader, _script) = scripted_reader();
        let mut bridge = serial_bridge(SerialEndpoint::from_streams("mem", reader, SharedSink::default()));
        assert!(bridge.is_polling());

        bridge.shutdown().await;
        bridge.shutdown().await;
        assert!(!bridge.is_polling());
        assert!(!bridge.is_serial_connected());
    }
}

/// Wireless bridge tests
#[cfg(test)]
mod wireless_tests {
    use super::*;

    async fn report_for(outcome: HttpOutcome) -> Option<String> {
        let mut bridge = wireless_bridge(Arc::new(MockHttp::new(outcome)));
        let mut rx = collect_statuses(&bridge);

        bridge.send_command("STAND_UP");
        let status = next_status(&mut rx).await;

        bridge.shutdown().await;
        assert!(rx.try_recv().is_err());
        status
    }

    #[tokio::test]
    async fn test_outcome_messages() {
        assert_eq!(
            report_for(HttpOutcome::Success(200)).await.as_deref(),
            Some("Command Sent Successfully (HTTP)")
        );
        assert_eq!(
            report_for(HttpOutcome::Success(500)).await.as_deref(),
            Some("Error: HTTP 500")
        );
        assert_eq!(
            report_for(HttpOutcome::Timeout).await.as_deref(),
            Some("Error: HTTP Request Timed Out")
        );
        assert_eq!(
            report_for(HttpOutcome::ConnectionFailed).await.as_deref(),
            Some("Error: Connection Failed")
        );
        assert_eq!(
            report_for(HttpOutcome::OtherError("bad url".to_string()))
                .await
                .as_deref(),
            Some("Error: bad url")
        );
    }

    #[tokio::test]
    async fn test_send_does_not_wait_for_response() {
        let http = Arc::new(MockHttp::delayed(
            HttpOutcome::Success(200),
            Duration::from_millis(200),
        ));
        let mut bridge = wireless_bridge(Arc::clone(&http));
        let mut rx = collect_statuses(&bridge);

        let started = std::time::Instant::now();
        bridge.send_command("START_WALKING");
        bridge.send_command("STOP_GAIT");
        bridge.send_command("SET_SPEED:200");
        assert!(started.elapsed() < Duration::from_millis(100));

        for _ in 0..3 {
            assert_eq!(
                next_status(&mut rx).await.as_deref(),
                Some("Command Sent Successfully (HTTP)")
            );
        }

        let mut paths = http.paths();
        paths.sort();
        assert_eq!(paths, vec!["SET_SPEED:200", "START_WALKING", "STOP_GAIT"]);

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_wireless_never_polls() {
        let mut bridge = wireless_bridge(Arc::new(MockHttp::new(HttpOutcome::Success(200))));
        assert!(!bridge.is_polling());
        assert!(!bridge.is_serial_connected());
        bridge.shutdown().await;
    }
}
