//! Recursive-descent parser for the ARI text form.

use super::lexer::{self, Spanned, Token};
use super::prim;
use super::{ParseError, ParseErrorKind};
use crate::ari::{
    Ari, AriMap, AriType, ExecSet, Identity, IdSegment, Literal, Reference, Report, RptSet, Table,
    TimeBase, TimeVal, Value,
};
use std::collections::BTreeMap;

/// Text-form decoder.
///
/// Reentrant; one call consumes exactly one ARI and requires the input to
/// end there.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    /// Epoch for timepoint segments.
    pub time_base: TimeBase,
}

/// Decode one ARI from text with the default time base.
///
/// # Errors
///
/// [`ParseError`] with the byte position of the failure.
pub fn decode(input: &str) -> Result<Ari, ParseError> {
    Decoder::default().decode(input)
}

impl Decoder {
    /// Decode one ARI from text.
    ///
    /// # Errors
    ///
    /// [`ParseError`] with the byte position of the failure.
    pub fn decode(&self, input: &str) -> Result<Ari, ParseError> {
        let body = lexer::strip_scheme(input.trim());
        let tokens = lexer::tokenize(body)?;
        let mut parser = Parser { tokens, pos: 0, time_base: self.time_base };
        let ari = parser.parse_ari()?;
        if parser.pos < parser.tokens.len() {
            return Err(parser.err_here(ParseErrorKind::TrailingInput));
        }
        Ok(ari)
    }
}

/// A collected `key=value;` structure pair value.
enum StructVal {
    Seg(String, usize),
    Lit(Literal, usize),
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    time_base: TimeBase,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|s| &s.token)
    }

    fn here(&self) -> usize {
        self.tokens.get(self.pos).map_or_else(
            || self.tokens.last().map_or(0, |s| s.pos + 1),
            |s| s.pos,
        )
    }

    fn err_here(&self, kind: ParseErrorKind) -> ParseError {
        ParseError { kind, pos: self.here() }
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, token: &Token, what: &'static str) -> Result<(), ParseError> {
        match self.advance() {
            Some(got) if got.token == *token => Ok(()),
            Some(got) => Err(ParseError { kind: ParseErrorKind::Expected(what), pos: got.pos }),
            None => Err(self.err_here(ParseErrorKind::UnexpectedEnd)),
        }
    }

    fn expect_seg(&mut self, what: &'static str) -> Result<(String, usize), ParseError> {
        match self.advance() {
            Some(Spanned { token: Token::Seg(seg), pos }) => Ok((seg, pos)),
            Some(got) => Err(ParseError { kind: ParseErrorKind::Expected(what), pos: got.pos }),
            None => Err(self.err_here(ParseErrorKind::UnexpectedEnd)),
        }
    }

    /// Parse exactly one ARI from the token stream.
    fn parse_ari(&mut self) -> Result<Ari, ParseError> {
        match self.peek() {
            Some(Token::Slash) => {
                if self.peek_at(1) == Some(&Token::Slash) {
                    self.parse_absolute_ref()
                } else {
                    self.parse_typed_literal()
                }
            }
            Some(Token::Seg(seg)) if matches!(seg.as_str(), "." | "..") => {
                if self.peek_at(1) == Some(&Token::Slash) {
                    self.parse_relative_ref()
                } else {
                    self.parse_primitive()
                }
            }
            Some(Token::Seg(_)) => self.parse_primitive(),
            Some(_) => Err(self.err_here(ParseErrorKind::Expected("ARI"))),
            None => Err(self.err_here(ParseErrorKind::UnexpectedEnd)),
        }
    }

    fn parse_primitive(&mut self) -> Result<Ari, ParseError> {
        let (seg, pos) = self.expect_seg("value segment")?;
        match prim::parse_primitive(&seg) {
            Some(Ok(value)) => Ok(Ari::Literal(Literal::untyped(value))),
            Some(Err(err)) => Err(ParseError { kind: ParseErrorKind::Escape(err), pos }),
            None => Err(ParseError { kind: ParseErrorKind::InvalidValue(seg), pos }),
        }
    }

    // === Typed literals ===

    fn parse_typed_literal(&mut self) -> Result<Ari, ParseError> {
        self.expect(&Token::Slash, "/")?;
        let (type_seg, type_pos) = self.expect_seg("literal type")?;
        let type_id = prim::parse_type(&type_seg).filter(|t| t.is_literal()).ok_or(
            ParseError { kind: ParseErrorKind::InvalidType(type_seg), pos: type_pos },
        )?;
        if type_id == AriType::Null && self.peek() != Some(&Token::Slash) {
            // `/NULL` alone is an input alias for the null value
            return Ok(Ari::null());
        }
        self.expect(&Token::Slash, "/")?;

        let value = match type_id {
            AriType::Ac => Value::List(self.parse_list_body()?),
            AriType::Am => Value::Map(self.parse_map_body()?),
            AriType::Tbl => self.parse_table_body()?,
            AriType::Execset => self.parse_execset_body()?,
            AriType::Rptset => self.parse_rptset_body()?,
            _ => {
                let (seg, pos) = self.expect_seg("literal value")?;
                prim::parse_typed_value(type_id, &seg, &self.time_base)
                    .ok_or(ParseError { kind: ParseErrorKind::InvalidValue(seg), pos })?
            }
        };
        let lit = Literal::typed(type_id, value)
            .map_err(|err| ParseError { kind: err.into(), pos: self.here() })?;
        Ok(Ari::Literal(lit))
    }

    /// `( ari , ari , … )` with an empty form.
    fn parse_list_body(&mut self) -> Result<Vec<Ari>, ParseError> {
        self.expect(&Token::LParen, "(")?;
        let mut items = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.parse_ari()?);
            match self.advance() {
                Some(Spanned { token: Token::Comma, .. }) => {}
                Some(Spanned { token: Token::RParen, .. }) => break,
                Some(got) => {
                    return Err(ParseError {
                        kind: ParseErrorKind::Expected(", or )"),
                        pos: got.pos,
                    })
                }
                None => return Err(self.err_here(ParseErrorKind::UnexpectedEnd)),
            }
        }
        Ok(items)
    }

    /// `( k = v , … )` with an empty form.
    fn parse_map_body(&mut self) -> Result<AriMap, ParseError> {
        self.expect(&Token::LParen, "(")?;
        let mut map = AriMap::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(map);
        }
        loop {
            let key_pos = self.here();
            let key = self.parse_ari()?;
            self.expect(&Token::Eq, "=")?;
            let value = self.parse_ari()?;
            map.insert(key, value)
                .map_err(|err| ParseError { kind: err.into(), pos: key_pos })?;
            match self.advance() {
                Some(Spanned { token: Token::Comma, .. }) => {}
                Some(Spanned { token: Token::RParen, .. }) => break,
                Some(got) => {
                    return Err(ParseError {
                        kind: ParseErrorKind::Expected(", or )"),
                        pos: got.pos,
                    })
                }
                None => return Err(self.err_here(ParseErrorKind::UnexpectedEnd)),
            }
        }
        Ok(map)
    }

    /// Collect leading `key=value;` pairs. Keys fold to lower case.
    fn parse_struct_pairs(&mut self) -> Result<BTreeMap<String, StructVal>, ParseError> {
        let mut pairs = BTreeMap::new();
        while let (Some(Token::Seg(_)), Some(Token::Eq)) = (self.peek(), self.peek_at(1)) {
            let (key, key_pos) = self.expect_seg("structure key")?;
            if !prim::is_identity(&key) {
                return Err(ParseError {
                    kind: ParseErrorKind::InvalidValue(key),
                    pos: key_pos,
                });
            }
            self.expect(&Token::Eq, "=")?;
            let val = match self.peek() {
                Some(Token::Slash) => {
                    let pos = self.here();
                    let ari = self.parse_typed_literal()?;
                    let Ari::Literal(lit) = ari else { unreachable!() };
                    StructVal::Lit(lit, pos)
                }
                _ => {
                    let (seg, pos) = self.expect_seg("structure value")?;
                    StructVal::Seg(seg, pos)
                }
            };
            self.expect(&Token::Semi, ";")?;
            pairs.insert(key.to_lowercase(), val);
        }
        Ok(pairs)
    }

    fn parse_table_body(&mut self) -> Result<Value, ParseError> {
        let pairs = self.parse_struct_pairs()?;
        let cols = match pairs.get("c") {
            Some(StructVal::Seg(seg, pos)) => prim::parse_int(seg)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or(ParseError {
                    kind: ParseErrorKind::InvalidValue(seg.clone()),
                    pos: *pos,
                })?,
            Some(StructVal::Lit(lit, pos)) => match lit.value {
                Value::Int(n) => usize::try_from(n).map_err(|_| ParseError {
                    kind: ParseErrorKind::InvalidValue(n.to_string()),
                    pos: *pos,
                })?,
                _ => {
                    return Err(ParseError {
                        kind: ParseErrorKind::MissingStructKey("c"),
                        pos: *pos,
                    })
                }
            },
            None => return Err(self.err_here(ParseErrorKind::MissingStructKey("c"))),
        };
        let mut cells = Vec::new();
        while self.peek() == Some(&Token::LParen) {
            let row_pos = self.here();
            let row = self.parse_list_body()?;
            if row.len() != cols {
                return Err(ParseError {
                    kind: ParseErrorKind::Invariant(crate::ari::InvariantError::TableShape),
                    pos: row_pos,
                });
            }
            cells.extend(row);
        }
        let table = Table::new(cols, cells)
            .map_err(|err| self.err_here(err.into()))?;
        Ok(Value::Table(table))
    }

    fn parse_execset_body(&mut self) -> Result<Value, ParseError> {
        let pairs = self.parse_struct_pairs()?;
        let nonce = self.take_nonce(&pairs)?;
        let targets = self.parse_list_body()?;
        let es = ExecSet::new(nonce, targets).map_err(|err| self.err_here(err.into()))?;
        Ok(Value::ExecSet(es))
    }

    fn parse_rptset_body(&mut self) -> Result<Value, ParseError> {
        let pairs = self.parse_struct_pairs()?;
        let nonce = self.take_nonce(&pairs)?;
        let ref_time = match pairs.get("r") {
            Some(StructVal::Seg(seg, pos)) => self.time_seg(seg, *pos, true)?,
            Some(StructVal::Lit(lit, pos)) => match lit.value {
                Value::Tp(tv) => tv,
                _ => {
                    return Err(ParseError {
                        kind: ParseErrorKind::InvalidValue("r".into()),
                        pos: *pos,
                    })
                }
            },
            None => return Err(self.err_here(ParseErrorKind::MissingStructKey("r"))),
        };
        let mut reports = vec![self.parse_report()?];
        while self.peek() == Some(&Token::Semi) {
            self.advance();
            reports.push(self.parse_report()?);
        }
        let rs = RptSet::new(nonce, ref_time, reports)
            .map_err(|err| self.err_here(err.into()))?;
        Ok(Value::RptSet(rs))
    }

    /// `( t=<td>; s=<ari>; ( items… ) )`
    fn parse_report(&mut self) -> Result<Report, ParseError> {
        self.expect(&Token::LParen, "(")?;
        let (t_key, t_pos) = self.expect_seg("t key")?;
        if !t_key.eq_ignore_ascii_case("t") {
            return Err(ParseError { kind: ParseErrorKind::MissingStructKey("t"), pos: t_pos });
        }
        self.expect(&Token::Eq, "=")?;
        let rel_time = match self.peek() {
            Some(Token::Slash) => {
                let pos = self.here();
                let ari = self.parse_typed_literal()?;
                match ari.as_literal().map(|l| &l.value) {
                    Some(Value::Td(tv)) => *tv,
                    _ => {
                        return Err(ParseError {
                            kind: ParseErrorKind::InvalidValue("t".into()),
                            pos,
                        })
                    }
                }
            }
            _ => {
                let (seg, pos) = self.expect_seg("timeperiod")?;
                self.time_seg(&seg, pos, false)?
            }
        };
        self.expect(&Token::Semi, ";")?;
        let (s_key, s_pos) = self.expect_seg("s key")?;
        if !s_key.eq_ignore_ascii_case("s") {
            return Err(ParseError { kind: ParseErrorKind::MissingStructKey("s"), pos: s_pos });
        }
        self.expect(&Token::Eq, "=")?;
        let source = self.parse_ari()?;
        self.expect(&Token::Semi, ";")?;
        let items = self.parse_list_body()?;
        self.expect(&Token::RParen, ")")?;
        Ok(Report { rel_time, source, items })
    }

    fn take_nonce(
        &self,
        pairs: &BTreeMap<String, StructVal>,
    ) -> Result<Literal, ParseError> {
        let value = match pairs.get("n") {
            None => Value::Null,
            Some(StructVal::Seg(seg, pos)) => match prim::parse_primitive(seg) {
                Some(Ok(v @ (Value::Null | Value::Int(_) | Value::Bytes(_)))) => v,
                _ => {
                    return Err(ParseError {
                        kind: ParseErrorKind::InvalidValue(seg.clone()),
                        pos: *pos,
                    })
                }
            },
            Some(StructVal::Lit(lit, _)) => lit.value.clone(),
        };
        Ok(Literal::untyped(value))
    }

    /// Interpret a time segment: calendar/duration text or numeric seconds.
    fn time_seg(&self, seg: &str, pos: usize, point: bool) -> Result<TimeVal, ParseError> {
        let parsed = if point {
            prim::parse_timepoint(seg, &self.time_base)
        } else {
            prim::parse_timeperiod(seg)
        };
        parsed
            .or_else(|| {
                prim::parse_typed_value(
                    if point { AriType::Tp } else { AriType::Td },
                    seg,
                    &self.time_base,
                )
                .map(|v| match v {
                    Value::Tp(tv) | Value::Td(tv) => tv,
                    _ => TimeVal::from_usec(0),
                })
            })
            .ok_or(ParseError { kind: ParseErrorKind::InvalidValue(seg.into()), pos })
    }

    // === Object references ===

    fn parse_absolute_ref(&mut self) -> Result<Ari, ParseError> {
        self.expect(&Token::Slash, "/")?;
        self.expect(&Token::Slash, "/")?;
        let (org_seg, org_pos) = self.expect_seg("organization")?;
        let org = prim::parse_idsegment(&org_seg).ok_or(ParseError {
            kind: ParseErrorKind::InvalidValue(org_seg),
            pos: org_pos,
        })?;
        self.expect(&Token::Slash, "/")?;
        let (model_seg, model_pos) = self.expect_seg("model")?;
        let (model, rev) = split_model_rev(&model_seg).ok_or(ParseError {
            kind: ParseErrorKind::InvalidValue(model_seg.clone()),
            pos: model_pos,
        })?;

        let mut ident = Identity {
            org: Some(org),
            model: Some(model),
            rev,
            type_id: None,
            obj: None,
        };

        if self.peek() != Some(&Token::Slash) {
            // namespace-only reference
            return Ok(Ari::reference(ident));
        }
        if !matches!(self.peek_at(1), Some(Token::Seg(_))) {
            // namespace-only with trailing slash
            self.advance();
            return Ok(Ari::reference(ident));
        }
        self.advance();

        let (type_id, obj) = self.parse_type_and_obj()?;
        ident.type_id = Some(type_id);
        ident.obj = Some(obj);
        let params = self.parse_opt_params()?;
        Ok(Ari::Reference(Box::new(Reference { ident, params })))
    }

    fn parse_relative_ref(&mut self) -> Result<Ari, ParseError> {
        let (dots, _) = self.expect_seg("relative path")?;
        self.expect(&Token::Slash, "/")?;
        let model = if dots == ".." {
            let (model_seg, model_pos) = self.expect_seg("model")?;
            let (model, _rev) = split_model_rev(&model_seg).ok_or(ParseError {
                kind: ParseErrorKind::InvalidValue(model_seg.clone()),
                pos: model_pos,
            })?;
            self.expect(&Token::Slash, "/")?;
            Some(model)
        } else {
            None
        };
        let (type_id, obj) = self.parse_type_and_obj()?;
        let ident = Identity {
            org: None,
            model,
            rev: None,
            type_id: Some(type_id),
            obj: Some(obj),
        };
        let params = self.parse_opt_params()?;
        Ok(Ari::Reference(Box::new(Reference { ident, params })))
    }

    fn parse_type_and_obj(&mut self) -> Result<(AriType, IdSegment), ParseError> {
        let (type_seg, type_pos) = self.expect_seg("object type")?;
        let type_id = prim::parse_type(&type_seg).filter(|t| t.is_object()).ok_or(
            ParseError {
                kind: ParseErrorKind::InvalidObjectType(type_seg),
                pos: type_pos,
            },
        )?;
        self.expect(&Token::Slash, "/")?;
        let (obj_seg, obj_pos) = self.expect_seg("object name")?;
        let obj = prim::parse_idsegment(&obj_seg).ok_or(ParseError {
            kind: ParseErrorKind::InvalidValue(obj_seg),
            pos: obj_pos,
        })?;
        Ok((type_id, obj))
    }

    fn parse_opt_params(&mut self) -> Result<Option<Vec<Ari>>, ParseError> {
        if self.peek() != Some(&Token::LParen) {
            return Ok(None);
        }
        // reject the named form early for a better position
        if self.peek_at(2) == Some(&Token::Eq) {
            return Err(self.err_here(ParseErrorKind::NamedParams));
        }
        Ok(Some(self.parse_list_body()?))
    }
}

/// Split a model segment at its optional `@revision` suffix.
fn split_model_rev(seg: &str) -> Option<(IdSegment, Option<String>)> {
    match seg.split_once('@') {
        Some((model, rev)) if !rev.is_empty() => {
            Some((prim::parse_idsegment(model)?, Some(rev.to_string())))
        }
        Some(_) => None,
        None => Some((prim::parse_idsegment(seg)?, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untyped_primitives() {
        assert_eq!(decode("undefined").unwrap(), Ari::undefined());
        assert_eq!(decode("null").unwrap(), Ari::null());
        assert_eq!(decode("ari:true").unwrap(), Ari::from(true));
        assert_eq!(decode("10").unwrap(), Ari::from(10i64));
        assert_eq!(decode("hi").unwrap(), Ari::from("hi"));
    }

    #[test]
    fn test_typed_scalar() {
        let ari = decode("/INT/10").unwrap();
        let lit = ari.as_literal().unwrap();
        assert_eq!(lit.type_id, Some(AriType::Int));
        assert_eq!(lit.value, Value::Int(10));
    }

    #[test]
    fn test_typed_by_code() {
        let ari = decode("/1/true").unwrap();
        assert_eq!(ari.as_literal().unwrap().type_id, Some(AriType::Bool));
    }

    #[test]
    fn test_bool_mismatch() {
        assert!(decode("/BOOL/10").is_err());
        assert!(decode("/INT/\"hi\"").is_err());
        assert!(decode("/TEXTSTR/3").is_err());
    }

    #[test]
    fn test_container_literals() {
        let ari = decode("/AC/(1,2)").unwrap();
        let lit = ari.as_literal().unwrap();
        assert_eq!(lit.value, Value::List(vec![Ari::from(1i64), Ari::from(2i64)]));

        let ari = decode("/AM/(1=1,2=3)").unwrap();
        let Value::Map(map) = &ari.as_literal().unwrap().value else { panic!() };
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_duplicate_map_key() {
        let err = decode("/AM/(1=a,1=b)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DuplicateMapKey);
    }

    #[test]
    fn test_table() {
        let ari = decode("/TBL/c=3;(1,2,3)(a,b,c)").unwrap();
        let Value::Table(table) = &ari.as_literal().unwrap().value else { panic!() };
        assert_eq!(table.cols(), 3);
        assert_eq!(table.rows(), 2);

        assert!(decode("/TBL/c=1;(1,2)").is_err());
        assert!(decode("/TBL/").is_err());
    }

    #[test]
    fn test_execset() {
        let ari = decode("/EXECSET/n=1234;(//adm/mod/CTRL/name)").unwrap();
        let Value::ExecSet(es) = &ari.as_literal().unwrap().value else { panic!() };
        assert_eq!(es.nonce.value, Value::Int(1234));
        assert_eq!(es.targets.len(), 1);
    }

    #[test]
    fn test_rptset() {
        let text = "/RPTSET/n=null;r=20240102T030405Z;(t=PT;s=//adm/mod/CTRL/name;(null))";
        let ari = decode(text).unwrap();
        let Value::RptSet(rs) = &ari.as_literal().unwrap().value else { panic!() };
        assert_eq!(rs.reports.len(), 1);
        assert_eq!(rs.reports[0].rel_time, TimeVal::from_usec(0));
        assert_eq!(rs.reports[0].items, vec![Ari::null()]);
    }

    #[test]
    fn test_reference_forms() {
        let ari = decode("ari://org/model/VAR/hello").unwrap();
        let re = ari.as_reference().unwrap();
        assert_eq!(re.ident.org, Some(IdSegment::Name("org".into())));
        assert_eq!(re.ident.type_id, Some(AriType::Var));
        assert_eq!(re.params, None);

        let ari = decode("ari://org/model/VAR/hello()").unwrap();
        assert_eq!(ari.as_reference().unwrap().params, Some(vec![]));

        let ari = decode("ari://org/model/VAR/hello(/INT/10)").unwrap();
        assert_eq!(ari.as_reference().unwrap().params.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_reference_revision() {
        let ari = decode("//org/model@2020-01-01/VAR/hello").unwrap();
        assert_eq!(ari.as_reference().unwrap().ident.rev.as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn test_namespace_only() {
        let ari = decode("//65536/65536").unwrap();
        let re = ari.as_reference().unwrap();
        assert_eq!(re.ident.model, Some(IdSegment::Num(65536)));
        assert_eq!(re.ident.type_id, None);

        let with_slash = decode("//org/model/").unwrap();
        assert!(with_slash.as_reference().unwrap().ident.obj.is_none());
    }

    #[test]
    fn test_relative_refs() {
        let ari = decode("ari:./VAR/hello").unwrap();
        let re = ari.as_reference().unwrap();
        assert_eq!(re.ident.org, None);
        assert_eq!(re.ident.model, None);
        assert_eq!(re.ident.obj, Some(IdSegment::Name("hello".into())));

        let ari = decode("../model/EDD/x").unwrap();
        assert_eq!(ari.as_reference().unwrap().ident.model, Some(IdSegment::Name("model".into())));

        assert!(decode("ari://./EDD/hello").is_err());
    }

    #[test]
    fn test_numeric_object_id() {
        // `!` forces the numeric reading of an object id
        let ari = decode("//ietf/amp-agent/CTRL/!12").unwrap();
        assert_eq!(ari.as_reference().unwrap().ident.obj, Some(IdSegment::Num(12)));
        let ari = decode("//ietf/amp-agent/CTRL/12").unwrap();
        assert_eq!(ari.as_reference().unwrap().ident.obj, Some(IdSegment::Num(12)));
    }

    #[test]
    fn test_literal_type_in_ref_position() {
        assert!(decode("//org/model/TEXTSTR/hello").is_err());
    }

    #[test]
    fn test_object_type_in_literal_position() {
        assert!(decode("/CTRL/foo").is_err());
    }

    #[test]
    fn test_trailing_input() {
        let err = decode("ari:hello there").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingInput);
        assert!(decode("//ns/mod/EDD/hello((").is_err());
    }

    #[test]
    fn test_nested_params() {
        let text = "//amp-agent/mod/CTRL/gen_rpts(/AC/(//bpsec/mod/CONST/source_report(%22ipn%3A1.1%22)),/AC/())";
        let ari = decode(text).unwrap();
        let re = ari.as_reference().unwrap();
        assert_eq!(re.ident.obj, Some(IdSegment::Name("gen_rpts".into())));
        let params = re.params.as_ref().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].as_literal().unwrap().type_id, Some(AriType::Ac));
    }
}
