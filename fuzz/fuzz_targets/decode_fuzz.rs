#![no_main]
use earl::DecodeOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must only ever produce errors.
    let _ = earl::unpack(data);

    // Same bytes behind a valid version byte, with every option flipped on.
    let mut framed = Vec::with_capacity(data.len() + 1);
    framed.push(earl::etf::FORMAT_VERSION);
    framed.extend_from_slice(data);
    let opts = DecodeOptions {
        big_int_as_string: true,
        atom_as_string: true,
        map_as_object: true,
        max_depth: 64,
    };
    if let Ok((_, used)) = earl::unpack_prefix(&framed, &opts) {
        assert!(used <= framed.len());
    }
});
