//! CBOR to ARI decoding.

use super::raw::{self, RawItem, Writer};
use super::{DecodeError, DecodeErrorKind};
use crate::ari::{
    Ari, AriMap, AriType, ExecSet, IdSegment, Identity, Literal, Reference, Report, RptSet, Table,
    TimeVal, Value,
};

/// Preferences for binary decoding variations.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions {
    /// Pass unrecognized tagged items through as opaque CBOR literals
    /// instead of failing.
    pub allow_unknown_tags: bool,
}

/// Binary-form decoder.
///
/// One call consumes exactly one CBOR data item; trailing bytes are an
/// error. Object references come out unresolved.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

/// Decode one ARI with default options.
///
/// # Errors
///
/// [`DecodeError`] with the failing byte offset.
pub fn decode(data: &[u8]) -> Result<Ari, DecodeError> {
    Decoder::default().decode(data)
}

impl Decoder {
    /// Create a decoder with explicit options.
    #[must_use]
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decode one ARI from one CBOR data item.
    ///
    /// # Errors
    ///
    /// [`DecodeError`] with the failing byte offset.
    pub fn decode(&self, data: &[u8]) -> Result<Ari, DecodeError> {
        let (item, used) = raw::read_one(data)?;
        if used != data.len() {
            return Err(DecodeError::new(DecodeErrorKind::TrailingBytes, used));
        }
        self.item_to_ari(&item)
    }

    fn item_to_ari(&self, item: &RawItem) -> Result<Ari, DecodeError> {
        match item {
            RawItem::Array(items) => match items.len() {
                2 if items[0].as_int().is_some() => self.typed_literal(items),
                4..=6 => self.reference(items),
                _ => Err(shape("array is neither typed literal nor reference")),
            },
            RawItem::Map(_) => Err(shape("bare map")),
            RawItem::Tag(n, _) => {
                if self.options.allow_unknown_tags {
                    let mut w = Writer::new();
                    write_raw(&mut w, item);
                    let lit = Literal {
                        type_id: Some(AriType::Cbor),
                        value: Value::Bytes(w.into_bytes()),
                    };
                    Ok(Ari::Literal(lit))
                } else {
                    Err(DecodeError::new(DecodeErrorKind::UnknownTag(*n), 0))
                }
            }
            _ => {
                let value = primitive_value(item).ok_or_else(|| shape("unsupported item"))?;
                Ok(Ari::Literal(Literal::untyped(value)))
            }
        }
    }

    fn typed_literal(&self, items: &[RawItem]) -> Result<Ari, DecodeError> {
        let code = items[0].as_int().ok_or_else(|| shape("type code"))?;
        let type_id = i64::try_from(code)
            .ok()
            .and_then(AriType::from_code)
            .filter(|t| t.is_literal())
            .ok_or_else(|| shape("unknown literal type code"))?;

        let value = match type_id {
            AriType::Ac => {
                let RawItem::Array(subs) = &items[1] else {
                    return Err(shape("AC value must be an array"));
                };
                let list = subs
                    .iter()
                    .map(|sub| self.item_to_ari(sub))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::List(list)
            }
            AriType::Am => {
                let RawItem::Map(entries) = &items[1] else {
                    return Err(shape("AM value must be a map"));
                };
                let mut map = AriMap::new();
                for (key_item, val_item) in entries {
                    let key_val =
                        primitive_value(key_item).ok_or_else(|| shape("AM key"))?;
                    let key = Ari::Literal(Literal::untyped(key_val));
                    let value = self.item_to_ari(val_item)?;
                    map.insert(key, value)
                        .map_err(|err| DecodeError::new(DecodeErrorKind::Invariant(err), 0))?;
                }
                Value::Map(map)
            }
            AriType::Tbl => {
                let RawItem::Array(subs) = &items[1] else {
                    return Err(shape("TBL value must be an array"));
                };
                let Some(first) = subs.first() else {
                    return Err(shape("TBL missing column count"));
                };
                let cols = first
                    .as_int()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| shape("TBL column count"))?;
                let cells = subs[1..]
                    .iter()
                    .map(|sub| self.item_to_ari(sub))
                    .collect::<Result<Vec<_>, _>>()?;
                let table = Table::new(cols, cells)
                    .map_err(|err| DecodeError::new(DecodeErrorKind::Invariant(err), 0))?;
                Value::Table(table)
            }
            AriType::Execset => {
                let RawItem::Array(subs) = &items[1] else {
                    return Err(shape("EXECSET value must be an array"));
                };
                let Some(nonce_item) = subs.first() else {
                    return Err(shape("EXECSET missing nonce"));
                };
                let nonce =
                    primitive_value(nonce_item).ok_or_else(|| shape("EXECSET nonce"))?;
                let targets = subs[1..]
                    .iter()
                    .map(|sub| self.item_to_ari(sub))
                    .collect::<Result<Vec<_>, _>>()?;
                let es = ExecSet::new(Literal::untyped(nonce), targets)
                    .map_err(|err| DecodeError::new(DecodeErrorKind::Invariant(err), 0))?;
                Value::ExecSet(es)
            }
            AriType::Rptset => {
                let RawItem::Array(subs) = &items[1] else {
                    return Err(shape("RPTSET value must be an array"));
                };
                if subs.len() < 2 {
                    return Err(shape("RPTSET too short"));
                }
                let nonce =
                    primitive_value(&subs[0]).ok_or_else(|| shape("RPTSET nonce"))?;
                let ref_time = timeval(&subs[1])?;
                let reports = subs[2..]
                    .iter()
                    .map(|sub| self.report(sub))
                    .collect::<Result<Vec<_>, _>>()?;
                let rs = RptSet::new(Literal::untyped(nonce), ref_time, reports)
                    .map_err(|err| DecodeError::new(DecodeErrorKind::Invariant(err), 0))?;
                Value::RptSet(rs)
            }
            AriType::Tp | AriType::Td => {
                let tv = timeval(&items[1])?;
                if type_id == AriType::Tp {
                    Value::Tp(tv)
                } else {
                    Value::Td(tv)
                }
            }
            _ => primitive_value(&items[1]).ok_or_else(|| shape("literal value"))?,
        };

        let lit = Literal::typed(type_id, value)
            .map_err(|err| DecodeError::new(DecodeErrorKind::Type(err), 0))?;
        Ok(Ari::Literal(lit))
    }

    fn report(&self, item: &RawItem) -> Result<Report, DecodeError> {
        let RawItem::Array(subs) = item else {
            return Err(shape("report must be an array"));
        };
        if subs.len() < 2 {
            return Err(shape("report too short"));
        }
        let rel_time = timeval(&subs[0])?;
        let source = self.item_to_ari(&subs[1])?;
        let items = subs[2..]
            .iter()
            .map(|sub| self.item_to_ari(sub))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Report { rel_time, source, items })
    }

    fn reference(&self, items: &[RawItem]) -> Result<Ari, DecodeError> {
        // [org, model, type, obj]
        // [org, model, type, obj, params]     (fifth item is an array)
        // [org, model, rev, type, obj]
        // [org, model, rev, type, obj, params]
        let with_rev = match items.len() {
            4 => false,
            5 => !matches!(items[4], RawItem::Array(_)),
            6 => true,
            _ => return Err(shape("reference arity")),
        };

        let org = idseg(&items[0]).ok_or_else(|| shape("reference org"))?;
        let model = idseg(&items[1]).ok_or_else(|| shape("reference model"))?;
        let mut ix = 2;
        let rev = if with_rev {
            ix += 1;
            match &items[2] {
                RawItem::Text(text) => Some(text.clone()),
                RawItem::Null => None,
                _ => return Err(shape("reference revision")),
            }
        } else {
            None
        };

        let type_id = match &items[ix] {
            RawItem::Text(name) => AriType::from_name(name),
            other => other
                .as_int()
                .and_then(|code| i64::try_from(code).ok())
                .and_then(AriType::from_code),
        }
        .filter(|t| t.is_object())
        .ok_or_else(|| shape("reference object type"))?;

        let obj = idseg(&items[ix + 1]).ok_or_else(|| shape("reference object id"))?;

        let params = match items.get(ix + 2) {
            None => None,
            Some(RawItem::Array(subs)) => Some(
                subs.iter()
                    .map(|sub| self.item_to_ari(sub))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(_) => return Err(shape("reference params")),
        };

        let ident = Identity {
            org: Some(org),
            model: Some(model),
            rev,
            type_id: Some(type_id),
            obj: Some(obj),
        };
        Ok(Ari::Reference(Box::new(Reference { ident, params })))
    }
}

fn shape(what: &'static str) -> DecodeError {
    DecodeError::new(DecodeErrorKind::Shape(what), 0)
}

/// Map a raw item to an untyped primitive value.
fn primitive_value(item: &RawItem) -> Option<Value> {
    match item {
        RawItem::Uint(_) | RawItem::Nint(_) => item.as_int().map(Value::Int),
        RawItem::Bytes(data) => Some(Value::Bytes(data.clone())),
        RawItem::Text(text) => Some(Value::Text(text.clone())),
        RawItem::Bool(b) => Some(Value::Bool(*b)),
        RawItem::Null => Some(Value::Null),
        RawItem::Undefined => Some(Value::Undefined),
        RawItem::Float(v) => Some(Value::Real(*v)),
        _ => None,
    }
}

/// An identifier segment item: integer enum or symbolic text.
fn idseg(item: &RawItem) -> Option<IdSegment> {
    match item {
        RawItem::Text(text) => Some(IdSegment::Name(text.clone())),
        other => other
            .as_int()
            .and_then(|n| i64::try_from(n).ok())
            .map(IdSegment::Num),
    }
}

/// A time scalar item: integer seconds or `[exponent, mantissa]`.
fn timeval(item: &RawItem) -> Result<TimeVal, DecodeError> {
    if let Some(secs) = item.as_int() {
        return i64::try_from(secs)
            .ok()
            .and_then(TimeVal::from_secs)
            .ok_or_else(|| DecodeError::new(DecodeErrorKind::BadTimeValue, 0));
    }
    if let RawItem::Array(pair) = item {
        if pair.len() == 2 {
            let exp = pair[0].as_int().and_then(|n| i64::try_from(n).ok());
            let mant = pair[1].as_int().and_then(|n| i64::try_from(n).ok());
            if let (Some(exp), Some(mant)) = (exp, mant) {
                return TimeVal::from_decfrac(exp, mant)
                    .ok_or_else(|| DecodeError::new(DecodeErrorKind::BadTimeValue, 0));
            }
        }
    }
    Err(DecodeError::new(DecodeErrorKind::BadTimeValue, 0))
}

/// Re-encode a raw item verbatim (for opaque tag passthrough).
fn write_raw(w: &mut Writer, item: &RawItem) {
    match item {
        RawItem::Uint(n) => w.head(0, *n),
        RawItem::Nint(n) => w.head(1, *n),
        RawItem::Bytes(data) => w.bytes(data),
        RawItem::Text(text) => w.text(text),
        RawItem::Array(items) => {
            w.array(items.len());
            for sub in items {
                write_raw(w, sub);
            }
        }
        RawItem::Map(entries) => {
            w.map(entries.len());
            for (key, value) in entries {
                write_raw(w, key);
                write_raw(w, value);
            }
        }
        RawItem::Tag(n, inner) => {
            w.head(6, *n);
            write_raw(w, inner);
        }
        RawItem::Bool(b) => w.bool(*b),
        RawItem::Null => w.null(),
        RawItem::Undefined => w.undefined(),
        RawItem::Float(v) => w.float(*v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::encode;

    fn hex(data: &str) -> Vec<u8> {
        (0..data.len())
            .step_by(2)
            .map(|ix| u8::from_str_radix(&data[ix..ix + 2], 16).unwrap())
            .collect()
    }

    fn loopback(data: &str) {
        let ari = decode(&hex(data)).expect(data);
        let bytes = encode(&ari).expect(data);
        let upper: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
        assert_eq!(upper, data, "loopback of {data}");
    }

    #[test]
    fn test_loopback_vectors() {
        for data in [
            "F7",
            "F6",
            "F5",
            "F4",
            "8200F6",
            "8201F4",
            "8201F5",
            "82040A",
            "820429",
            "82041864",
            "82051864",
            "82061864",
            "82071864",
            "1904D2",
            "626869",
            "686869207468657265",
            "426869",
            "8208F94900",
            "8208FB4024333333333333",
            "8208F97E00",
            "8209F97C00",
            "8209F9FC00",
            "820A626869",
            "820B426869",
            "820E626869",
            "820E01",
            "820C1A2B450625",
            "820F410A",
            "820F4BA164746573748203F94480",
            "821180",
            "8211816161",
            "821183616161626163",
            "821182F6820417",
            "821182F6821183F7820417821180",
            "8212A0",
            "8212A303F50A626869626F6804",
            "82138403010203",
            "82138703010203040506",
            "82138100",
            "82138101",
            "821481F6",
            "8214821904D2846474657374647465737422626869",
            "850202220481626869",
        ] {
            loopback(data);
        }
    }

    #[test]
    fn test_loopback_rptset() {
        // [21, [1234, 1000, [0, //test/test/CTRL/hi, null, 3, h'6869']]]
        let data = [
            "8215", "83", "1904D2", "1903E8", "85", "00", "84", "6474657374", "6474657374",
            "22", "626869", "F6", "03", "426869",
        ]
        .concat();
        loopback(&data);
    }

    #[test]
    fn test_invalid_items() {
        for data in [
            "",
            "80",       // empty array
            "A0",       // bare map
            "8120",     // 1-array
            "820001",   // null typed with int
            "820101",   // bool typed with int
            "820220",   // byte negative
            "8202190100", // byte overflow
            "82043A80000000", // int32 underflow
            "82041A80000000", // int32 overflow
            "820520",   // uint negative
            "82051B0000000100000000", // uint32 overflow
            "82061B8000000000000000", // vast overflow
            "820720",   // uvast negative
            "8208FBC7EFFFFFE091FF3D", // real32 range
            "8208FB47EFFFFFE091FF3D", // real32 range
            "8212A182040AF5", // typed AM key
            "821386030102030405", // ragged table
            "8213816474657374", // non-integer column count
            "821380",   // table without column count
            "82148120", // negative nonce
            "82158264746573741A2B450625", // text nonce
            "8364746573740A6474686174", // literal type in reference
            "0001",     // trailing byte
        ] {
            assert!(decode(&hex(data)).is_err(), "expected failure for {data}");
        }
    }

    #[test]
    fn test_duplicate_map_keys_rejected() {
        // {1: "a", 1: "b"}
        let err = decode(&hex("8212A2016161016162")).unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::Invariant(crate::ari::InvariantError::DuplicateMapKey)
        );
    }

    #[test]
    fn test_reference_shapes() {
        // [org, model, type, obj]
        let ari = decode(&hex("8402022204")).unwrap();
        let re = ari.as_reference().unwrap();
        assert_eq!(re.ident.org, Some(IdSegment::Num(2)));
        assert_eq!(re.ident.type_id, Some(AriType::Ctrl));
        assert_eq!(re.params, None);

        // with revision
        let ari = decode(&hex("85647465737464746573746431323334216474686174")).unwrap();
        let re = ari.as_reference().unwrap();
        assert_eq!(re.ident.rev.as_deref(), Some("1234"));

        // with params
        let ari = decode(&hex("850202220481626869")).unwrap();
        assert_eq!(ari.as_reference().unwrap().params.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_tag_handling() {
        // tag 1 around an int
        let data = hex("C11A2B450625");
        assert!(decode(&data).is_err());
        let lenient = Decoder::new(DecodeOptions { allow_unknown_tags: true });
        let ari = lenient.decode(&data).unwrap();
        let lit = ari.as_literal().unwrap();
        assert_eq!(lit.type_id, Some(AriType::Cbor));
        assert_eq!(lit.value, Value::Bytes(data));
    }

    #[test]
    fn test_int_widens_to_declared_real() {
        let ari = decode(&hex("820801")).unwrap();
        assert_eq!(ari.as_literal().unwrap().value, Value::Real(1.0));
    }
}
