#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use causal_order::LogicalClock;

#[derive(Arbitrary, Debug, Clone)]
struct Pair {
    left: Vec<u32>,
    right: Vec<u32>,
    ticks: u8,
}

fuzz_target!(|pair: Pair| {
    let a = LogicalClock::from_digits(pair.left);
    let b = LogicalClock::from_digits(pair.right);

    assert!(!a.is_less_than(&a));
    assert!(!(a.is_less_than(&b) && b.is_less_than(&a)));
    assert_eq!(a.is_less_than(&b), a < b);

    let mut c = a.clone();
    for _ in 0..pair.ticks {
        let before = c.clone();
        c.tick();
        assert!(before.is_less_than(&c));
    }

    assert_eq!(LogicalClock::from_wire(&a.to_string()).unwrap(), a);
});
