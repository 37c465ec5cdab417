//! ARI to CBOR encoding.

use super::raw::Writer;
use super::EncodeError;
use crate::ari::{
    Ari, AriMap, ExecSet, Literal, Reference, Report, RptSet, Table, TimeVal, Value,
};

/// Preferences for binary encoding variations.
#[derive(Clone, Copy, Debug, Default)]
pub struct EncodeOptions {
    /// Sort AM entries by their encoded key bytes instead of insertion
    /// order. Off by default; insertion order is canonical.
    pub sort_map_keys: bool,
}

/// Binary-form encoder.
///
/// Deterministic: identical input and options produce identical bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

/// Encode one ARI with default options.
///
/// # Errors
///
/// [`EncodeError`] for values with no binary form.
pub fn encode(ari: &Ari) -> Result<Vec<u8>, EncodeError> {
    Encoder::default().encode(ari)
}

impl Encoder {
    /// Create an encoder with explicit options.
    #[must_use]
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// Encode one ARI to one CBOR data item.
    ///
    /// # Errors
    ///
    /// [`EncodeError`] for values with no binary form (relative or
    /// namespace-only references).
    pub fn encode(&self, ari: &Ari) -> Result<Vec<u8>, EncodeError> {
        let mut w = Writer::new();
        self.write_ari(&mut w, ari)?;
        Ok(w.into_bytes())
    }

    fn write_ari(&self, w: &mut Writer, ari: &Ari) -> Result<(), EncodeError> {
        match ari {
            Ari::Literal(lit) => self.write_literal(w, lit),
            Ari::Reference(re) => self.write_reference(w, re),
        }
    }

    fn write_literal(&self, w: &mut Writer, lit: &Literal) -> Result<(), EncodeError> {
        if let Some(type_id) = lit.type_id {
            w.array(2);
            w.int(i128::from(type_id.code()));
        }
        self.write_value(w, &lit.value)
    }

    fn write_value(&self, w: &mut Writer, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Undefined => w.undefined(),
            Value::Null => w.null(),
            Value::Bool(b) => w.bool(*b),
            Value::Int(n) => w.int(*n),
            Value::Real(v) => w.float(*v),
            Value::Text(s) => w.text(s),
            Value::Bytes(b) => w.bytes(b),
            Value::TypeRef(t) => w.int(i128::from(t.code())),
            Value::Tp(tv) | Value::Td(tv) => write_timeval(w, *tv),
            Value::List(items) => {
                w.array(items.len());
                for item in items {
                    self.write_ari(w, item)?;
                }
            }
            Value::Map(map) => self.write_map(w, map)?,
            Value::Table(table) => self.write_table(w, table)?,
            Value::ExecSet(es) => self.write_execset(w, es)?,
            Value::RptSet(rs) => self.write_rptset(w, rs)?,
        }
        Ok(())
    }

    fn write_map(&self, w: &mut Writer, map: &AriMap) -> Result<(), EncodeError> {
        w.map(map.len());
        if self.options.sort_map_keys {
            let mut entries: Vec<(Vec<u8>, &Ari)> = Vec::with_capacity(map.len());
            for (key, value) in map.iter() {
                let mut kw = Writer::new();
                self.write_ari(&mut kw, key)?;
                entries.push((kw.into_bytes(), value));
            }
            entries.sort_by(|a, b| (a.0.len(), &a.0).cmp(&(b.0.len(), &b.0)));
            for (key_bytes, value) in entries {
                w.raw(&key_bytes);
                self.write_ari(w, value)?;
            }
        } else {
            for (key, value) in map.iter() {
                self.write_ari(w, key)?;
                self.write_ari(w, value)?;
            }
        }
        Ok(())
    }

    fn write_table(&self, w: &mut Writer, table: &Table) -> Result<(), EncodeError> {
        w.array(1 + table.cells().len());
        w.int(table.cols() as i128);
        for cell in table.cells() {
            self.write_ari(w, cell)?;
        }
        Ok(())
    }

    fn write_execset(&self, w: &mut Writer, es: &ExecSet) -> Result<(), EncodeError> {
        w.array(1 + es.targets.len());
        self.write_value(w, &es.nonce.value)?;
        for target in &es.targets {
            self.write_ari(w, target)?;
        }
        Ok(())
    }

    fn write_rptset(&self, w: &mut Writer, rs: &RptSet) -> Result<(), EncodeError> {
        w.array(2 + rs.reports.len());
        self.write_value(w, &rs.nonce.value)?;
        write_timeval(w, rs.ref_time);
        for report in &rs.reports {
            self.write_report(w, report)?;
        }
        Ok(())
    }

    fn write_report(&self, w: &mut Writer, report: &Report) -> Result<(), EncodeError> {
        w.array(2 + report.items.len());
        write_timeval(w, report.rel_time);
        self.write_ari(w, &report.source)?;
        for item in &report.items {
            self.write_ari(w, item)?;
        }
        Ok(())
    }

    fn write_reference(&self, w: &mut Writer, re: &Reference) -> Result<(), EncodeError> {
        let ident = &re.ident;
        let (Some(org), Some(model), Some(type_id), Some(obj)) =
            (&ident.org, &ident.model, ident.type_id, &ident.obj)
        else {
            return Err(EncodeError::PartialReference);
        };
        let len = 4 + usize::from(ident.rev.is_some()) + usize::from(re.params.is_some());
        w.array(len);
        write_idseg(w, org);
        write_idseg(w, model);
        if let Some(rev) = &ident.rev {
            w.text(rev);
        }
        w.int(i128::from(type_id.code()));
        write_idseg(w, obj);
        if let Some(params) = &re.params {
            w.array(params.len());
            for param in params {
                self.write_ari(w, param)?;
            }
        }
        Ok(())
    }
}

fn write_idseg(w: &mut Writer, seg: &crate::ari::IdSegment) {
    match seg {
        crate::ari::IdSegment::Name(name) => w.text(name),
        crate::ari::IdSegment::Num(num) => w.int(i128::from(*num)),
    }
}

/// Time scalar wire form: bare integer seconds when whole, else a
/// `[exponent, mantissa]` decimal fraction.
fn write_timeval(w: &mut Writer, tv: TimeVal) {
    let df = tv.to_decfrac();
    if df.exp == 0 {
        w.int(i128::from(df.mant));
    } else {
        w.array(2);
        w.int(i128::from(df.exp));
        w.int(i128::from(df.mant));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text;

    fn enc_hex(input: &str) -> String {
        let ari = text::decode(input).unwrap();
        let bytes = encode(&ari).unwrap();
        bytes.iter().map(|b| format!("{b:02X}")).collect()
    }

    #[test]
    fn test_specials() {
        assert_eq!(enc_hex("undefined"), "F7");
        assert_eq!(enc_hex("null"), "F6");
        assert_eq!(enc_hex("/NULL/null"), "8200F6");
        assert_eq!(enc_hex("true"), "F5");
        assert_eq!(enc_hex("/BOOL/true"), "8201F5");
    }

    #[test]
    fn test_typed_int() {
        assert_eq!(enc_hex("/INT/-7"), "820426");
        assert_eq!(enc_hex("/INT/100"), "82041864");
        assert_eq!(enc_hex("/UINT/100"), "82051864");
        assert_eq!(enc_hex("/VAST/100"), "82061864");
        assert_eq!(enc_hex("/UVAST/100"), "82071864");
    }

    #[test]
    fn test_reals() {
        assert_eq!(enc_hex("/REAL64/10.0"), "8209F94900");
        assert_eq!(enc_hex("/REAL64/10.1"), "8209FB4024333333333333");
        assert_eq!(enc_hex("/REAL64/NaN"), "8209F97E00");
        assert_eq!(enc_hex("/REAL64/Infinity"), "8209F97C00");
        assert_eq!(enc_hex("/REAL64/-Infinity"), "8209F9FC00");
    }

    #[test]
    fn test_strings() {
        assert_eq!(enc_hex("hi"), "626869");
        assert_eq!(enc_hex("%27hi%27"), "426869");
        assert_eq!(enc_hex("/TEXTSTR/hi"), "820A626869");
        assert_eq!(enc_hex("/BYTESTR/h%276869%27"), "820B426869");
    }

    #[test]
    fn test_times() {
        // 725812773 seconds from the epoch
        assert_eq!(enc_hex("/TP/725812773"), "820C1A2B450625");
        assert_eq!(enc_hex("/TD/18"), "820D12");
        assert_eq!(enc_hex("/TD/-18"), "820D31");
        // 12.34 seconds → [-2, 1234]
        assert_eq!(enc_hex("/TD/12.34"), "820D82211904D2");
    }

    #[test]
    fn test_containers() {
        assert_eq!(enc_hex("/AC/()"), "821180");
        assert_eq!(enc_hex("/AC/(a)"), "8211816161");
        assert_eq!(enc_hex("/AC/(null,/INT/23)"), "821182F6820417");
        assert_eq!(enc_hex("/AM/()"), "8212A0");
        assert_eq!(enc_hex("/AM/(3=true,10=hi,oh=4)"), "8212A303F50A626869626F6804");
        assert_eq!(enc_hex("/TBL/c=3;(1,2,3)"), "82138403010203");
        assert_eq!(enc_hex("/TBL/c=0;"), "82138100");
    }

    #[test]
    fn test_execset() {
        assert_eq!(enc_hex("/EXECSET/n=null;()"), "821481F6");
        assert_eq!(
            enc_hex("/EXECSET/n=1234;(//test/test/CTRL/hi)"),
            "8214821904D2846474657374647465737422626869"
        );
    }

    #[test]
    fn test_reference() {
        assert_eq!(enc_hex("//2/2/CTRL/4(hi)"), "850202220481626869");
        assert_eq!(
            enc_hex("//test/test/CTRL/that(//2/2/IDENT/34)"),
            "856474657374647465737422647468617481840202201822"
        );
        assert_eq!(
            enc_hex("//test/test@1234/CONST/that"),
            "85647465737464746573746431323334216474686174"
        );
    }

    #[test]
    fn test_partial_reference_unencodable() {
        let ari = text::decode("./VAR/hello").unwrap();
        assert_eq!(encode(&ari), Err(EncodeError::PartialReference));
        let ari = text::decode("//org/model").unwrap();
        assert_eq!(encode(&ari), Err(EncodeError::PartialReference));
    }

    #[test]
    fn test_sorted_maps_option() {
        let ari = text::decode("/AM/(10=1,3=2)").unwrap();
        let canonical = encode(&ari).unwrap();
        let sorted = Encoder::new(EncodeOptions { sort_map_keys: true }).encode(&ari).unwrap();
        assert_ne!(canonical, sorted);
        assert_eq!(sorted, encode(&text::decode("/AM/(3=2,10=1)").unwrap()).unwrap());
    }
}
