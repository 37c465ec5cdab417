//! Canonical formatter for the ARI text form.

use super::escape;
use super::prim;
use crate::ari::{
    Ari, AriMap, AriType, ExecSet, Literal, Reference, Report, RptSet, Table, TimeBase, TimeVal,
    Value,
};
use crate::cbor::FloatBits;
use core::fmt;
use std::fmt::Write as _;

/// Where the `ari:` scheme prefix is emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemePrefix {
    /// On every output.
    Always,
    /// Only on object references.
    #[default]
    ReferenceOnly,
    /// Never.
    Never,
}

/// Integer rendering base.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntBase {
    /// Decimal (canonical).
    #[default]
    Decimal,
    /// Binary with `0b` prefix.
    Binary,
    /// Hexadecimal with `0x` prefix.
    Hex,
}

/// Real number rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FloatForm {
    /// Shortest round-trip form (canonical).
    #[default]
    Shortest,
    /// Fixed-point with six fractional digits.
    Fixed,
    /// Scientific notation with six fractional digits.
    Scientific,
    /// Raw CBOR float payload in `0fx…` form.
    RawHex,
}

/// Preferences for text encoding variations.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Scheme prefix emission.
    pub scheme_prefix: SchemePrefix,
    /// Integer base.
    pub int_base: IntBase,
    /// Real number form.
    pub float_form: FloatForm,
    /// Permit identifier-shaped text to be emitted unquoted.
    pub text_identity: bool,
    /// Emit times in calendar/duration text rather than numeric seconds.
    pub time_text: bool,
    /// Emit embedded CBOR in `<<…>>` diagnostic form.
    pub cbor_diag: bool,
    /// Epoch for timepoint rendering.
    pub time_base: TimeBase,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::canonical()
    }
}

impl EncodeOptions {
    /// The canonical option set.
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            scheme_prefix: SchemePrefix::ReferenceOnly,
            int_base: IntBase::Decimal,
            float_form: FloatForm::Shortest,
            text_identity: true,
            time_text: true,
            cbor_diag: false,
            time_base: TimeBase::default(),
        }
    }
}

/// Text-form encoder.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    /// Create an encoder with explicit options.
    #[must_use]
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// Encode one ARI to its text form.
    #[must_use]
    pub fn encode(&self, ari: &Ari) -> String {
        let mut out = String::new();
        self.write_ari(&mut out, ari, true);
        out
    }

    fn write_ari(&self, out: &mut String, ari: &Ari, top: bool) {
        match ari {
            Ari::Literal(lit) => {
                if top && self.options.scheme_prefix == SchemePrefix::Always {
                    out.push_str("ari:");
                }
                self.write_literal(out, lit);
            }
            Ari::Reference(re) => {
                if top && self.options.scheme_prefix != SchemePrefix::Never {
                    out.push_str("ari:");
                }
                self.write_reference(out, re);
            }
        }
    }

    fn write_literal(&self, out: &mut String, lit: &Literal) {
        if let Some(type_id) = lit.type_id {
            out.push('/');
            out.push_str(type_id.name());
            out.push('/');
        }
        self.write_value(out, lit.type_id, &lit.value);
    }

    fn write_value(&self, out: &mut String, type_id: Option<AriType>, value: &Value) {
        match value {
            Value::Undefined => out.push_str("undefined"),
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Int(n) => self.write_int(out, *n),
            Value::Real(v) => self.write_real(out, *v),
            Value::Text(s) => match type_id {
                // label text is identifier-shaped and stays raw
                Some(AriType::Label) => out.push_str(s),
                _ => self.write_text(out, s),
            },
            Value::Bytes(b) => match type_id {
                Some(AriType::Cbor) if self.options.cbor_diag => {
                    let mut diag = String::from("<<");
                    diag.push_str(&crate::cbor::to_diag(b).unwrap_or_default());
                    diag.push_str(">>");
                    escape::percent_encode(&diag, out);
                }
                _ => write_bytes(out, b),
            },
            Value::TypeRef(t) => out.push_str(t.name()),
            Value::Tp(tv) => self.write_timepoint(out, *tv),
            Value::Td(tv) => self.write_timeperiod(out, *tv),
            Value::List(items) => self.write_list(out, items),
            Value::Map(map) => self.write_map(out, map),
            Value::Table(table) => self.write_table(out, table),
            Value::ExecSet(es) => self.write_execset(out, es),
            Value::RptSet(rs) => self.write_rptset(out, rs),
        }
    }

    fn write_int(&self, out: &mut String, n: i128) {
        let mag = n.unsigned_abs();
        match self.options.int_base {
            IntBase::Decimal => {
                let _ = write!(out, "{n}");
            }
            IntBase::Binary => {
                if n < 0 {
                    out.push('-');
                }
                let _ = write!(out, "0b{mag:b}");
            }
            IntBase::Hex => {
                if n < 0 {
                    out.push('-');
                }
                let _ = write!(out, "0x{mag:x}");
            }
        }
    }

    fn write_real(&self, out: &mut String, v: f64) {
        if self.options.float_form == FloatForm::RawHex {
            // raw form covers the non-finite values too
            out.push_str("0fx");
            match crate::cbor::shortest_float(v) {
                FloatBits::Half(bits) => escape::encode_hex(&bits.to_be_bytes(), out),
                FloatBits::Single(bits) => escape::encode_hex(&bits.to_be_bytes(), out),
                FloatBits::Double(bits) => escape::encode_hex(&bits.to_be_bytes(), out),
            }
            return;
        }
        if v.is_nan() {
            out.push_str("NaN");
            return;
        }
        if v.is_infinite() {
            if v < 0.0 {
                out.push('-');
            }
            out.push_str("Infinity");
            return;
        }
        match self.options.float_form {
            FloatForm::Shortest => {
                let _ = write!(out, "{v:?}");
            }
            FloatForm::Fixed => {
                let _ = write!(out, "{v:.6}");
            }
            FloatForm::Scientific => {
                let text = format!("{v:.6e}");
                match text.split_once('e') {
                    Some((mant, exp)) => {
                        let exp: i32 = exp.parse().unwrap_or(0);
                        let _ = write!(out, "{mant}e{exp:+03}");
                    }
                    None => out.push_str(&text),
                }
            }
            FloatForm::RawHex => unreachable!("handled above"),
        }
    }

    fn write_text(&self, out: &mut String, s: &str) {
        if self.options.text_identity && prim::is_plain_text(s) {
            out.push_str(s);
            return;
        }
        let mut quoted = String::with_capacity(s.len() + 2);
        quoted.push('"');
        escape::escape_quoted(s, &mut quoted);
        quoted.push('"');
        escape::percent_encode(&quoted, out);
    }

    fn write_timepoint(&self, out: &mut String, tv: TimeVal) {
        if self.options.time_text {
            if let Some(at) = self.options.time_base.datetime(tv) {
                let date = at.format("%Y%m%dT%H%M%S");
                let _ = write!(out, "{date}");
                let (_, frac) = tv.split();
                if frac != 0 {
                    let _ = write!(out, ".{frac:06}");
                }
                out.push('Z');
                return;
            }
        }
        write_numeric_seconds(out, tv);
    }

    fn write_timeperiod(&self, out: &mut String, tv: TimeVal) {
        if !self.options.time_text {
            write_numeric_seconds(out, tv);
            return;
        }
        let neg = tv.usec() < 0;
        let mag = TimeVal::from_usec(tv.usec().saturating_abs());
        let (total_secs, mut usec) = mag.split();
        let days = total_secs / 86_400;
        let mut secs = total_secs % 86_400;
        let hours = secs / 3_600;
        secs %= 3_600;
        let minutes = secs / 60;
        secs %= 60;

        let mut pad = 6u32;
        while usec != 0 && usec % 10 == 0 {
            usec /= 10;
            pad -= 1;
        }

        if neg {
            out.push('-');
        }
        out.push('P');
        if days != 0 {
            let _ = write!(out, "{days}D");
        }
        out.push('T');
        if hours != 0 {
            let _ = write!(out, "{hours}H");
        }
        if minutes != 0 {
            let _ = write!(out, "{minutes}M");
        }
        if usec != 0 {
            let _ = write!(out, "{secs}.{usec:0>width$}S", width = pad as usize);
        } else if secs != 0 {
            let _ = write!(out, "{secs}S");
        }
    }

    fn write_list(&self, out: &mut String, items: &[Ari]) {
        out.push('(');
        for (ix, item) in items.iter().enumerate() {
            if ix > 0 {
                out.push(',');
            }
            self.write_ari(out, item, false);
        }
        out.push(')');
    }

    fn write_map(&self, out: &mut String, map: &AriMap) {
        out.push('(');
        for (ix, (key, value)) in map.iter().enumerate() {
            if ix > 0 {
                out.push(',');
            }
            self.write_ari(out, key, false);
            out.push('=');
            self.write_ari(out, value, false);
        }
        out.push(')');
    }

    fn write_table(&self, out: &mut String, table: &Table) {
        let _ = write!(out, "c={};", table.cols());
        for row in table.iter_rows() {
            self.write_list(out, row);
        }
    }

    fn write_execset(&self, out: &mut String, es: &ExecSet) {
        out.push_str("n=");
        self.write_value(out, None, &es.nonce.value);
        out.push(';');
        self.write_list(out, &es.targets);
    }

    fn write_rptset(&self, out: &mut String, rs: &RptSet) {
        out.push_str("n=");
        self.write_value(out, None, &rs.nonce.value);
        out.push_str(";r=");
        self.write_timepoint(out, rs.ref_time);
        out.push(';');
        for (ix, report) in rs.reports.iter().enumerate() {
            if ix > 0 {
                out.push(';');
            }
            self.write_report(out, report);
        }
    }

    fn write_report(&self, out: &mut String, report: &Report) {
        out.push_str("(t=");
        self.write_timeperiod(out, report.rel_time);
        out.push_str(";s=");
        self.write_ari(out, &report.source, false);
        out.push(';');
        self.write_list(out, &report.items);
        out.push(')');
    }

    fn write_reference(&self, out: &mut String, re: &Reference) {
        let ident = &re.ident;
        match (&ident.org, &ident.model) {
            (Some(org), Some(model)) => {
                let _ = write!(out, "//{org}/{model}");
                if let Some(rev) = &ident.rev {
                    let _ = write!(out, "@{rev}");
                }
            }
            (None, Some(model)) => {
                let _ = write!(out, "../{model}");
            }
            _ => out.push('.'),
        }
        if let (Some(type_id), Some(obj)) = (&ident.type_id, &ident.obj) {
            let _ = write!(out, "/{}/{obj}", type_id.name());
            if let Some(params) = &re.params {
                self.write_list(out, params);
            }
        }
    }
}

/// Write a byte string in the canonical `h'…'` form.
fn write_bytes(out: &mut String, data: &[u8]) {
    let mut text = String::with_capacity(data.len() * 2 + 3);
    text.push_str("h'");
    escape::encode_hex(data, &mut text);
    text.push('\'');
    escape::percent_encode(&text, out);
}

/// Numeric seconds with six fractional digits.
fn write_numeric_seconds(out: &mut String, tv: TimeVal) {
    let neg = tv.usec() < 0;
    let mag = tv.usec().saturating_abs();
    if neg {
        out.push('-');
    }
    let _ = write!(out, "{}.{:06}", mag / 1_000_000, mag % 1_000_000);
}

impl fmt::Display for Ari {
    /// Canonical text form with default options.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Encoder::new(EncodeOptions::canonical()).encode(self);
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::decode;

    fn canon(input: &str) -> String {
        Encoder::new(EncodeOptions::canonical()).encode(&decode(input).unwrap())
    }

    #[test]
    fn test_literal_loopback() {
        // (input, expected canonical output)
        let cases = [
            ("undefined", "undefined"),
            ("null", "null"),
            ("/NULL/null", "/NULL/null"),
            ("true", "true"),
            ("ari:true", "true"),
            ("/BOOL/true", "/BOOL/true"),
            ("/1/true", "/BOOL/true"),
            ("0", "0"),
            ("-100", "-100"),
            ("0x10", "16"),
            ("0b100", "4"),
            ("/VAST/0xa", "/VAST/10"),
            ("/VAST/-0xa", "/VAST/-10"),
            ("ari:/INT/10", "/INT/10"),
            ("0.0", "0.0"),
            ("1e3", "1000.0"),
            ("0fx63d0", "1000.0"),
            ("-0fx63d0", "-1000.0"),
            ("0fx447a0000", "1000.0"),
            ("0fx408f400000000000", "1000.0"),
            ("/REAL64/NaN", "/REAL64/NaN"),
            ("/REAL64/Infinity", "/REAL64/Infinity"),
            ("/REAL64/-Infinity", "/REAL64/-Infinity"),
            ("/REAL64/0.01", "/REAL64/0.01"),
            ("/REAL64/1e2", "/REAL64/100.0"),
            ("/REAL64/1.25e2", "/REAL64/125.0"),
            ("/REAL64/1e25", "/REAL64/1e25"),
            ("hi", "hi"),
            ("%22hi%20there%22", "%22hi%20there%22"),
            ("%22hi%5C%22oh%22", "%22hi%5C%22oh%22"),
            ("/TEXTSTR/hi", "/TEXTSTR/hi"),
            ("%27hi%27", "h%276869%27"),
            ("/BYTESTR/%27hi%27", "/BYTESTR/h%276869%27"),
            ("h%27666F6F626172%27", "h%27666f6f626172%27"),
            ("b32%27MZXW6YTBOI%27", "h%27666f6f626172%27"),
            ("b64%27Zm9vYmFy%27", "h%27666f6f626172%27"),
            ("/TP/20230102T030405Z", "/TP/20230102T030405Z"),
            ("/TP/2023-01-02T03:04:05Z", "/TP/20230102T030405Z"),
            ("/TP/20230102T030405.250000Z", "/TP/20230102T030405.250000Z"),
            ("/TP/725943845.0", "/TP/20230102T030405Z"),
            ("/TD/PT3H", "/TD/PT3H"),
            ("/TD/+PT3H", "/TD/PT3H"),
            ("/TD/-PT3H", "/TD/-PT3H"),
            ("/TD/PT10.001S", "/TD/PT10.001S"),
            ("/TD/PT10.250000S", "/TD/PT10.25S"),
            ("/TD/P1DT10.25S", "/TD/P1DT10.25S"),
            ("/TD/100", "/TD/PT1M40S"),
            ("/TD/1.5", "/TD/PT1.5S"),
            ("/LABEL/test", "/LABEL/test"),
            ("/LABEL/null", "/LABEL/null"),
            ("/LABEL/undefined", "/LABEL/undefined"),
            (
                "/CBOR/h%27a164746573748203f94480%27",
                "/CBOR/h%27a164746573748203f94480%27",
            ),
            ("/AC/()", "/AC/()"),
            ("/AC/(1,2)", "/AC/(1,2)"),
            ("/AC/(1,/UVAST/2)", "/AC/(1,/UVAST/2)"),
            ("/AM/()", "/AM/()"),
            ("/AM/(1=1,2=3)", "/AM/(1=1,2=3)"),
            ("/AM/(a=1,b=3)", "/AM/(a=1,b=3)"),
            ("/TBL/c=3;", "/TBL/c=3;"),
            ("/TBL/c=3;(1,2,3)(a,b,c)", "/TBL/c=3;(1,2,3)(a,b,c)"),
            (
                "/EXECSET/n=null;(//adm/mod/CTRL/name)",
                "/EXECSET/n=null;(//adm/mod/CTRL/name)",
            ),
            (
                "/EXECSET/n=1234;(//adm/mod/CTRL/name)",
                "/EXECSET/n=1234;(//adm/mod/CTRL/name)",
            ),
            (
                "/EXECSET/n=h%276869%27;(//adm/mod/CTRL/name)",
                "/EXECSET/n=h%276869%27;(//adm/mod/CTRL/name)",
            ),
            (
                "/RPTSET/n=null;r=20240102T030405Z;(t=PT;s=//adm/mod/CTRL/name;(null))",
                "/RPTSET/n=null;r=20240102T030405Z;(t=PT;s=//adm/mod/CTRL/name;(null))",
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(canon(input), expected, "for input {input:?}");
        }
    }

    #[test]
    fn test_reference_loopback() {
        let cases = [
            "ari://65536/65536",
            "ari://org/model/VAR/hello",
            "ari://!namespace/model/VAR/hello",
            "ari://org/model/VAR/hello()",
            "ari://org/model/VAR/hello(/INT/10)",
            "ari://org/model/VAR/hello(//other/mod/CONST/hi)",
            "ari://namespace/model@2020-01-01/VAR/hello",
            "ari://0/0/CTRL/0",
            "ari:./VAR/hello",
            "ari://bp-agent/mod/CTRL/reset_all_counts()",
        ];
        for text in cases {
            assert_eq!(canon(text), text, "for input {text:?}");
        }
    }

    #[test]
    fn test_option_variations() {
        let cases: [(&str, EncodeOptions, &str); 8] = [
            (
                "1000",
                EncodeOptions { int_base: IntBase::Binary, ..EncodeOptions::canonical() },
                "0b1111101000",
            ),
            (
                "1000",
                EncodeOptions { int_base: IntBase::Hex, ..EncodeOptions::canonical() },
                "0x3e8",
            ),
            (
                "/TP/20230102T030405Z",
                EncodeOptions { time_text: false, ..EncodeOptions::canonical() },
                "/TP/725943845.000000",
            ),
            (
                "/TD/PT3H",
                EncodeOptions { time_text: false, ..EncodeOptions::canonical() },
                "/TD/10800.000000",
            ),
            (
                "1e3",
                EncodeOptions { float_form: FloatForm::Fixed, ..EncodeOptions::canonical() },
                "1000.000000",
            ),
            (
                "1e3",
                EncodeOptions { float_form: FloatForm::Scientific, ..EncodeOptions::canonical() },
                "1.000000e+03",
            ),
            (
                "1e3",
                EncodeOptions { float_form: FloatForm::RawHex, ..EncodeOptions::canonical() },
                "0fx63d0",
            ),
            (
                "hi",
                EncodeOptions { text_identity: false, ..EncodeOptions::canonical() },
                "%22hi%22",
            ),
        ];
        for (input, options, expected) in cases {
            let ari = decode(input).unwrap();
            let text = Encoder::new(options).encode(&ari);
            assert_eq!(text, expected, "for input {input:?}");
            // the alternate form re-decodes to an equal value
            let again = decode(&text).unwrap();
            if !matches!(again.as_literal().map(|l| &l.value), Some(Value::Real(v)) if v.is_nan())
            {
                assert_eq!(again, ari, "re-decode of {text:?}");
            }
        }
    }

    #[test]
    fn test_scheme_prefix_modes() {
        let lit = decode("/INT/10").unwrap();
        let re = decode("//org/model/VAR/x").unwrap();
        let always = Encoder::new(EncodeOptions {
            scheme_prefix: SchemePrefix::Always,
            ..EncodeOptions::canonical()
        });
        let never = Encoder::new(EncodeOptions {
            scheme_prefix: SchemePrefix::Never,
            ..EncodeOptions::canonical()
        });
        assert_eq!(always.encode(&lit), "ari:/INT/10");
        assert_eq!(never.encode(&re), "//org/model/VAR/x");
    }
}
