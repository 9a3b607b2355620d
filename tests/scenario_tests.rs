mod common;

use common::{Scenario, ScriptError};

const THREE_PROCESS: &str = "
// p2 forwards after hearing from p1; p3 sees the forward first.
send p1 p3 E1
send p1 p2 E2
recv p2 E2
send p2 p3 E3
recv p3 E3
recv p3 E1
";

#[test]
fn three_process_forward_is_held_then_released() {
    let scenario = Scenario::run(THREE_PROCESS).unwrap();
    assert_eq!(scenario.delivered_at("p2"), ["E2"]);
    assert_eq!(scenario.delivered_at("p3"), ["E1", "E3"]);
    assert_eq!(scenario.held_at("p3"), 0);
}

#[test]
fn scenario_stops_midway_with_message_held() {
    let mut scenario = Scenario::new();
    for line in THREE_PROCESS.lines() {
        scenario.step(line).unwrap();
        if line.trim() == "recv p3 E3" {
            break;
        }
    }
    assert!(scenario.delivered_at("p3").is_empty());
    assert_eq!(scenario.held_at("p3"), 1);

    scenario.step("recv p3 E1").unwrap();
    assert_eq!(scenario.delivered_at("p3"), ["E1", "E3"]);
    assert_eq!(scenario.held_at("p3"), 0);
}

#[test]
fn multicast_copies_are_ordered_against_forwards() {
    let scenario = Scenario::run(
        "
        send p1 p2,p3 m1
        recv p2 m1
        send p2 p3 m2
        recv p3 m2
        recv p3 m1
        ",
    )
    .unwrap();
    assert_eq!(scenario.delivered_at("p2"), ["m1"]);
    assert_eq!(scenario.delivered_at("p3"), ["m1", "m2"]);
}

#[test]
fn reversed_chain_unwinds_on_first_message() {
    let scenario = Scenario::run(
        "
        send p1 p2 a
        send p1 p2 b
        send p1 p2 c
        recv p2 c
        recv p2 b
        recv p2 a
        ",
    )
    .unwrap();
    assert_eq!(scenario.delivered_at("p2"), ["a", "b", "c"]);
}

#[test]
fn final_clocks_survive_a_text_round_trip() {
    let scenario = Scenario::run(THREE_PROCESS).unwrap();
    for name in ["p1", "p2", "p3"] {
        let clock = scenario.handler(name).unwrap().clock();
        let text = clock.to_string();
        let restored = causal_order::VectorTimeStamp::restore(None, &text);
        assert_eq!(restored.to_string(), text);
    }
}

#[test]
fn script_errors_are_reported() {
    assert!(matches!(Scenario::run("launch p1"), Err(ScriptError::Syntax(_))));
    assert!(matches!(Scenario::run("recv p9 x"), Err(ScriptError::UnknownReceiver(_))));
    assert!(matches!(
        Scenario::run("send p1 p2 x\nrecv p2 y"),
        Err(ScriptError::UnknownMessage(_))
    ));
    assert!(matches!(
        Scenario::run("send p1 p2 x\nsend p3 p2 x"),
        Err(ScriptError::DuplicateMessage(_))
    ));
}
