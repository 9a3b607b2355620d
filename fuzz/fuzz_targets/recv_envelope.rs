#![no_main]

// Drives three handlers with an arbitrary schedule of sends and receives.
// Every delivered payload must have been sent to that process exactly once
// and no payload may be delivered twice.

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use causal_order::{CausallyOrderedMessage, CausallyOrderedMsgHandler};

const PROCESSES: [&str; 3] = ["p0", "p1", "p2"];

#[derive(Arbitrary, Debug, Clone)]
enum Step {
    Send { from: u8, to: u8 },
    Multicast { from: u8 },
    Recv { pick: u8 },
}

#[derive(Arbitrary, Debug, Clone)]
struct Schedule {
    steps: Vec<Step>,
}

fuzz_target!(|schedule: Schedule| {
    let handlers: Vec<_> = PROCESSES
        .iter()
        .map(|p| CausallyOrderedMsgHandler::<u32>::new(*p))
        .collect();
    let mut in_flight: Vec<(usize, CausallyOrderedMessage<u32>)> = Vec::new();
    let mut delivered: HashSet<(usize, u32)> = HashSet::new();
    let mut next = 0u32;

    for step in schedule.steps.into_iter().take(256) {
        match step {
            Step::Send { from, to } => {
                let (from, to) = (from as usize % 3, to as usize % 3);
                if from == to {
                    continue;
                }
                let msg = handlers[from].send_message(next, PROCESSES[to]).unwrap();
                in_flight.push((to, msg));
                next += 1;
            }
            Step::Multicast { from } => {
                let from = from as usize % 3;
                let targets: Vec<usize> = (0..3).filter(|i| *i != from).collect();
                let names: Vec<&str> = targets.iter().map(|i| PROCESSES[*i]).collect();
                let msgs = handlers[from].send_multicast(next, &names).unwrap();
                in_flight.extend(targets.into_iter().zip(msgs));
                next += 1;
            }
            Step::Recv { pick } => {
                if in_flight.is_empty() {
                    continue;
                }
                let (to, msg) = in_flight.swap_remove(pick as usize % in_flight.len());
                for payload in handlers[to].recv_message(msg) {
                    assert!(payload < next);
                    assert!(delivered.insert((to, payload)), "payload delivered twice");
                }
            }
        }
    }
});
