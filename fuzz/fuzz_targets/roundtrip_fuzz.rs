#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut framed = Vec::with_capacity(data.len() + 1);
    framed.push(earl::etf::FORMAT_VERSION);
    framed.extend_from_slice(data);

    let Ok(term) = earl::unpack(&framed) else {
        return;
    };
    // Functions and malformed exports have no encoding.
    let Ok(packed) = earl::pack(&term) else {
        return;
    };

    // One pass normalizes tags; after that the encoding is a fixed point.
    let again = earl::unpack(&packed).unwrap();
    assert_eq!(earl::pack(&again).unwrap(), packed);
});
