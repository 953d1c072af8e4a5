use earl::term::atom;
use earl::{DecodeError, DecodeOptions, Pid, Reference, Term};
use num_bigint::BigInt;

fn roundtrip(term: &Term) -> Term {
    let bytes = earl::pack(term).unwrap();
    earl::unpack(&bytes).unwrap()
}

fn sample_terms() -> Vec<Term> {
    vec![
        Term::Boolean(true),
        Term::Boolean(false),
        Term::Nil,
        Term::Integer(0),
        Term::Integer(-128),
        Term::Integer(i32::MAX.into()),
        Term::Integer(i32::MIN.into()),
        Term::Float(-0.5),
        Term::Float(1e300),
        Term::BigInt(BigInt::from(u64::MAX)),
        Term::Binary(String::new()),
        Term::Binary("snow ☃".into()),
        Term::atom("hello"),
        Term::List(vec![]),
        Term::List(vec![Term::Integer(1), Term::Binary("two".into()), Term::Nil]),
        Term::ByteList(b"chars".to_vec()),
        Term::Map(vec![
            (Term::atom("k"), Term::Integer(1)),
            (Term::Integer(2), Term::List(vec![Term::Boolean(false)])),
        ]),
        Term::Pid(Pid {
            node: "n@h".into(),
            id: 42,
            serial: 7,
            creation: 0xDEAD_BEEF,
        }),
        Term::Reference(Reference {
            node: "n@h".into(),
            creation: 3,
            ids: vec![1, 2, 3],
        }),
    ]
}

#[test]
fn representable_values_roundtrip() {
    for term in sample_terms() {
        assert_eq!(roundtrip(&term), term, "term {term}");
    }
}

#[test]
fn atoms_compare_by_name_across_calls() {
    let bytes = earl::pack(&Term::atom("atom_roundtrip_name")).unwrap();
    let first = earl::unpack(&bytes).unwrap();
    let second = earl::unpack(&bytes).unwrap();
    assert_eq!(first, second);
    let (Term::Atom(a), Term::Atom(b)) = (&first, &second) else {
        panic!("expected atoms");
    };
    // Both are alive, so they share one table entry.
    assert!(a.same_identity(b));
    assert!(atom::is_interned("atom_roundtrip_name"));
}

#[test]
fn bigint_sign_and_width_boundaries() {
    let as_string = DecodeOptions {
        big_int_as_string: true,
        ..Default::default()
    };
    let one = BigInt::from(1);
    let values = [
        BigInt::from(0),
        one.clone(),
        &one << 32,
        &one << 64,
        &one << 128,
    ];
    for v in values {
        for n in [v.clone(), -v] {
            let bytes = earl::pack(&Term::BigInt(n.clone())).unwrap();
            assert_eq!(earl::unpack(&bytes).unwrap(), Term::BigInt(n.clone()));
            assert_eq!(
                earl::unpack_with(&bytes, &as_string).unwrap(),
                Term::Binary(n.to_string())
            );
        }
    }
}

#[test]
fn small_integer_ff_is_minus_one() {
    assert_eq!(earl::unpack(&[131, 97, 0xFF]).unwrap(), Term::Integer(-1));
}

#[test]
fn improper_list_roundtrip() {
    let term = Term::improper(
        [Term::Integer(1), Term::atom("two")],
        Term::Binary("tail".into()),
    );
    let decoded = roundtrip(&term);
    assert_eq!(decoded, term);
    assert!(!decoded.is_proper_list());
}

#[test]
fn tuple_decodes_like_list() {
    let tuple = roundtrip(&Term::tuple([Term::Integer(42)]));
    let list = roundtrip(&Term::List(vec![Term::Integer(42)]));
    assert_eq!(tuple, list);
}

#[test]
fn special_atom_names() {
    let cases = [
        (Term::Boolean(true), &b"true"[..]),
        (Term::Boolean(false), &b"false"[..]),
        (Term::Nil, &b"nil"[..]),
    ];
    for (term, name) in cases {
        let bytes = earl::pack(&term).unwrap();
        let mut expected = vec![131, 115, name.len() as u8];
        expected.extend_from_slice(name);
        assert_eq!(bytes, expected);
        assert_eq!(earl::unpack(&bytes).unwrap(), term);
    }
}

#[test]
fn keyed_structure_literal_bytes() {
    let obj = Term::Object(vec![("a".into(), Term::Integer(1))]);
    assert_eq!(
        earl::pack(&obj).unwrap(),
        [131, 116, 0, 0, 0, 1, 109, 0, 0, 0, 1, 97, 97, 1]
    );
}

#[test]
fn invalid_header_is_rejected() {
    assert_eq!(
        earl::unpack(&[0, 97, 1]),
        Err(DecodeError::InvalidHeader(0))
    );
}

#[test]
fn every_truncation_fails() {
    let term = Term::List(vec![
        Term::Map(vec![(Term::atom("key"), Term::Float(2.5))]),
        Term::BigInt(BigInt::from(1) << 100),
        Term::improper([Term::Binary("x".into())], Term::Integer(300)),
        Term::Reference(Reference {
            node: "n@h".into(),
            creation: 1,
            ids: vec![9, 8],
        }),
    ]);
    let bytes = earl::pack(&term).unwrap();
    for len in 1..bytes.len() {
        assert!(
            matches!(
                earl::unpack(&bytes[..len]),
                Err(DecodeError::TruncatedInput { .. })
            ),
            "prefix of {len} bytes"
        );
    }
}

#[test]
fn concatenated_terms_walk_with_prefix() {
    let mut stream = Vec::new();
    for i in 0..5 {
        stream.extend(earl::pack(&Term::Integer(i * 100)).unwrap());
    }
    let opts = DecodeOptions::default();
    let mut offset = 0;
    let mut seen = Vec::new();
    while offset < stream.len() {
        let (term, used) = earl::unpack_prefix(&stream[offset..], &opts).unwrap();
        seen.push(term);
        offset += used;
    }
    assert_eq!(seen, (0..5).map(|i| Term::Integer(i * 100)).collect::<Vec<_>>());
}

#[test]
fn function_is_not_encodable() {
    let bytes = [
        131, 112, 0, 0, 0, 0, 0, // size, arity
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // uniq
        0, 0, 0, 0, 0, 0, 0, 0, // index, num_free
        115, 1, b'm', 97, 0, 97, 0, // module, old_index, old_uniq
        88, 115, 1, b'n', 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, // owner
    ];
    let fun = earl::unpack(&bytes).unwrap();
    assert!(matches!(fun, Term::Function(_)));
    assert!(matches!(
        earl::pack(&fun),
        Err(earl::EncodeError::UnsupportedValue(_))
    ));
}

#[test]
fn wide_integer_encodes_as_float() {
    let wide = Term::Integer(1 << 40);
    assert_eq!(roundtrip(&wide), Term::Float((1u64 << 40) as f64));
    // Host conversions keep full precision instead.
    assert_eq!(roundtrip(&Term::from(1i64 << 40)), Term::BigInt(BigInt::from(1i64 << 40)));
}

#[cfg(feature = "zlib")]
#[test]
fn compressed_roundtrip_and_truncation() {
    use earl::EncodeOptions;

    let term = Term::List((0..500).map(|i| Term::Binary(format!("item-{}", i % 7))).collect());
    let opts = EncodeOptions {
        compression: Some(9),
        ..Default::default()
    };
    let packed = earl::pack_with(&term, &opts).unwrap();
    let plain = earl::pack(&term).unwrap();
    assert!(packed.len() < plain.len());
    assert_eq!(packed[1], earl::etf::tag::COMPRESSED);
    assert_eq!(earl::unpack(&packed).unwrap(), term);
    for len in 1..packed.len() {
        assert!(
            matches!(
                earl::unpack(&packed[..len]),
                Err(DecodeError::TruncatedInput { .. })
            ),
            "prefix of {len} bytes"
        );
    }
}
