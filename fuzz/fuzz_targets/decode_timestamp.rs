#![no_main]

// Arbitrary text through the strict and lossy timestamp decoders. Whatever
// the strict decoder accepts must re-encode to something it accepts again
// with the same content.

use libfuzzer_sys::fuzz_target;
use causal_order::VectorTimeStamp;

fuzz_target!(|text: &str| {
    let lossy = VectorTimeStamp::from_wire_lossy(text);
    match VectorTimeStamp::from_wire(text) {
        Ok(stamp) => {
            assert_eq!(stamp, lossy);
            let again = VectorTimeStamp::from_wire(&stamp.to_string()).unwrap();
            assert_eq!(again, stamp);
        }
        Err(_) => assert_eq!(lossy, VectorTimeStamp::new("")),
    }
    let _ = VectorTimeStamp::restore(Some("fuzz"), text);
});
