//! End-to-end codec scenarios over golden vectors.

use aricodec_core::amm::{AdmModule, AdmObject, FormalParam};
use aricodec_core::ari::AriType;
use aricodec_core::catalog::Catalog;
use aricodec_core::nickname::{Converter, Mode};
use aricodec_core::text::{self, ParseErrorKind};
use aricodec_core::types::{SemType, TypeRef, TypeUse};
use aricodec_core::{cbor, transform};

fn hex(data: &str) -> Vec<u8> {
    (0..data.len())
        .step_by(2)
        .map(|ix| u8::from_str_radix(&data[ix..ix + 2], 16).unwrap())
        .collect()
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02X}")).collect()
}

/// The ietf/dtnma-agent module with the enumerations the byte vectors
/// assume.
fn agent_catalog() -> Catalog {
    let mut module = AdmModule {
        org_name: "ietf".into(),
        org_enum: Some(1),
        name: "dtnma-agent".into(),
        model_enum: Some(1),
        revisions: vec!["2024-06-25".into()],
        ..AdmModule::default()
    };
    let mut edd = AdmObject::new(AriType::Edd, "sw-version");
    edd.enum_ = Some(1);
    edd.typeobj = Some(SemType::builtin(AriType::Textstr));
    module.objects.push(edd);
    let mut ctrl = AdmObject::new(AriType::Ctrl, "inspect");
    ctrl.enum_ = Some(5);
    ctrl.parameters.push(FormalParam {
        name: "ref".into(),
        typeobj: SemType::Use(TypeUse {
            base: TypeRef::AnyRef,
            units: None,
            constraints: Vec::new(),
        }),
        default: None,
    });
    module.objects.push(ctrl);
    let mut cat = Catalog::new();
    cat.load_module(module);
    cat
}

/// S1: text execset with named references encodes to the exact bytes
/// once nicknames are applied.
#[test]
fn scenario_execset_to_cbor() {
    let text_form = "ari:/EXECSET/n=123;(//ietf/dtnma-agent/CTRL/inspect(//ietf/dtnma-agent/EDD/sw-version))";
    let mut ari = text::decode(text_form).unwrap();

    let cat = agent_catalog();
    cat.check_ari(&ari).unwrap();
    Converter::new(Mode::ToEnum, &cat, true).convert(&mut ari).unwrap();

    let bytes = cbor::encode(&ari).unwrap();
    assert_eq!(to_hex(&bytes), "821482187B8501012205818401012301");

    // and the bytes decode to the same value
    let back = cbor::decode(&bytes).unwrap();
    assert_eq!(back, ari);
}

/// S2: the null value is one byte.
#[test]
fn scenario_null() {
    let ari = text::decode("ari:/NULL").unwrap();
    assert_eq!(cbor::encode(&ari).unwrap(), hex("F6"));
    assert_eq!(cbor::encode(&text::decode("null").unwrap()).unwrap(), hex("F6"));
    // the explicitly typed form stays typed
    let typed = text::decode("ari:/NULL/null").unwrap();
    assert_eq!(cbor::encode(&typed).unwrap(), hex("8200F6"));
}

/// S3: typed INT literal.
#[test]
fn scenario_typed_int() {
    let ari = text::decode("ari:/INT/-7").unwrap();
    assert_eq!(to_hex(&cbor::encode(&ari).unwrap()), "820426");
}

/// S4: numeric object id round-trips, and resolves to the symbolic name
/// when the catalog knows the enumeration.
#[test]
fn scenario_numeric_object_id() {
    let ari = text::decode("ari://ietf/dtnma-agent/CTRL/!5").unwrap();
    assert_eq!(ari.to_string(), "ari://ietf/dtnma-agent/CTRL/5");

    let cat = agent_catalog();
    let mut named = ari.clone();
    Converter::new(Mode::ToName, &cat, false).convert(&mut named).unwrap();
    assert_eq!(named.to_string(), "ari://ietf/dtnma-agent/CTRL/inspect");

    // unknown enumerations re-emit numeric
    let mut unknown = text::decode("ari://ietf/dtnma-agent/CTRL/99").unwrap();
    Converter::new(Mode::ToName, &cat, false).convert(&mut unknown).unwrap();
    assert_eq!(unknown.to_string(), "ari://ietf/dtnma-agent/CTRL/99");
}

/// S5: duplicate AM keys are a parse error.
#[test]
fn scenario_duplicate_map_key() {
    let err = text::decode("ari:/AM/(1=a,1=b)").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::DuplicateMapKey);
}

/// S6: a 2-column, 4-row table survives both forms.
#[test]
fn scenario_table_roundtrip() {
    let text_form = "/TBL/c=2;(1,2)(3,4)(5,6)(7,8)";
    let ari = text::decode(text_form).unwrap();

    let via_text = text::decode(&ari.to_string()).unwrap();
    assert_eq!(via_text, ari);

    let bytes = cbor::encode(&ari).unwrap();
    let via_cbor = cbor::decode(&bytes).unwrap();
    assert_eq!(via_cbor, ari);

    let lit = via_cbor.as_literal().unwrap();
    let aricodec_core::ari::Value::Table(table) = &lit.value else {
        panic!("not a table");
    };
    assert_eq!((table.cols(), table.rows()), (2, 4));
}

/// Property 3: inputs differing only in whitespace or in
/// percent-encoding of unreserved characters encode identically.
#[test]
fn cross_form_determinism() {
    let variants = [
        "/AC/(1,hi,/INT/10)",
        " /AC/( 1 , hi , /INT/10 ) ",
        "/AC/(1,%68%69,/INT/10)",
    ];
    let reference = cbor::encode(&text::decode(variants[0]).unwrap()).unwrap();
    for variant in &variants[1..] {
        let bytes = cbor::encode(&text::decode(variant).unwrap()).unwrap();
        assert_eq!(bytes, reference, "for variant {variant:?}");
    }
}

/// Property 7: a loaded module is observable both through lookup and
/// through module iteration.
#[test]
fn catalog_monotonicity() {
    let cat = agent_catalog();
    let via_lookup = cat
        .resolve_by_name("ietf", "dtnma-agent", None, AriType::Ctrl, "inspect")
        .unwrap();
    let via_iter = cat
        .modules()
        .flat_map(|m| m.objects.iter())
        .find(|o| o.kind == AriType::Ctrl && o.name == "inspect")
        .unwrap();
    assert_eq!(via_lookup, via_iter);
}

/// Canonical text rendering of assorted forms.
#[test]
fn text_canonical_forms() {
    let cases = [
        ("ari:/EXECSET/n=1234;(//example/adm/CTRL/name)", "/EXECSET/n=1234;(//example/adm/CTRL/name)"),
        ("ari://65536/65536/VAR/0", "ari://65536/65536/VAR/0"),
        ("ari://org/model/VAR/hello()", "ari://org/model/VAR/hello()"),
        (
            "ari://ietf/bp-agent/CTRL/reset_all_counts()",
            "ari://ietf/bp-agent/CTRL/reset_all_counts()",
        ),
    ];
    for (input, expected) in cases {
        let ari = text::decode(input).unwrap();
        assert_eq!(ari.to_string(), expected, "for {input:?}");
    }
}

/// Binary loopback over assorted wire shapes.
#[test]
fn cbor_loopback_vectors() {
    for data in [
        "F7",
        "F6",
        "8200F6",
        "820429",
        "8208F94900",
        "820A686869207468657265",
        "820C1A2B450625",
        "821182F6821183F7820417821180",
        "8212A303F50A626869626F6804",
        "82138703010203040506",
        "8214821904D2846474657374647465737422626869",
        "85647465737464746573746431323334216474686174",
    ] {
        let ari = cbor::decode(&hex(data)).expect(data);
        assert_eq!(to_hex(&cbor::encode(&ari).unwrap()), data, "loopback {data}");
    }
}

/// Transform idempotence (properties 4 and 5).
#[test]
fn transform_properties() {
    let mut module = AdmModule {
        org_name: "example".into(),
        name: "test-adm".into(),
        model_enum: Some(3),
        revisions: vec!["2024-01-01".into()],
        ..AdmModule::default()
    };
    for name in ["zeta", "alpha", "mid"] {
        module.objects.push(AdmObject::new(AriType::Edd, name));
    }
    module.objects.push(AdmObject::new(AriType::Typedef, "t"));

    let enumerated = transform::add_enum(module);
    assert!(enumerated.objects.iter().all(|o| o.enum_.is_some()));
    assert_eq!(enumerated, transform::add_enum(enumerated.clone()));

    let canon = transform::canonicalize(enumerated);
    assert_eq!(canon, transform::canonicalize(canon.clone()));
    // typedef group precedes EDD group
    assert_eq!(canon.objects[0].kind, AriType::Typedef);
}
