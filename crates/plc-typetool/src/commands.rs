//! Subcommand implementations.
//!
//! Each command returns a report that renders either as plain text
//! ([`fmt::Display`]) or as JSON ([`Serialize`]).

use std::fmt;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use plc_common::config::{CastPolicy, DatatypeConfig};
use plc_datatypes::dynamic::typed_literal_prefix;
use plc_datatypes::{
    cast_value, is_castable, limits_summary, parse_type_name, validate_connection, AnyValue, Castability, DataTypeId,
    LimitsSummary, StringDictionary, WireCodec,
};

/// Output of a subcommand.
pub trait Report: Serialize + fmt::Display {}

impl<T: Serialize + fmt::Display> Report for T {}

/// Resolve a type name given on the command line.
pub fn parse_type_arg(name: &str) -> Result<DataTypeId, String> {
    DataTypeId::from_name(name).ok_or_else(|| format!("unknown type name: {name}"))
}

/// `castable FROM TO`.
#[derive(Debug, Serialize)]
pub struct CastabilityReport {
    from: DataTypeId,
    to: DataTypeId,
    castability: Castability,
    allowed_on_connection: bool,
}

impl fmt::Display for CastabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.castability)?;
        if self.castability.is_allowed() && !self.allowed_on_connection {
            write!(f, " (explicit cast required on connections)")?;
        }
        Ok(())
    }
}

pub fn castable(from: DataTypeId, to: DataTypeId, config: &DatatypeConfig) -> CastabilityReport {
    let castability = is_castable(from, to);
    let allowed_on_connection = validate_connection(from, to, config.connections.cast_policy).is_ok();
    CastabilityReport {
        from,
        to,
        castability,
        allowed_on_connection,
    }
}

/// `cast LITERAL TO`.
#[derive(Debug, Serialize)]
pub struct CastReport {
    from: DataTypeId,
    to: DataTypeId,
    castability: Castability,
    source: String,
    result: String,
}

impl fmt::Display for CastReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {} ({})", self.source, self.result, self.castability)
    }
}

pub fn cast(literal: &str, to: DataTypeId, explicit: bool, config: &DatatypeConfig) -> Result<CastReport> {
    let source = AnyValue::parse_typed(literal).with_context(|| format!("invalid literal {literal:?}"))?;
    let from = source.data_type_id();
    let policy = if explicit {
        CastPolicy::AllowExplicit
    } else {
        config.connections.cast_policy
    };
    let castability = validate_connection(from, to, policy).with_context(|| format!("cannot cast {from} to {to}"))?;
    let result = cast_value(source.as_dyn(), to)?;
    debug!(%from, %to, ?castability, "cast literal");
    Ok(CastReport {
        from,
        to,
        castability,
        source: source.to_string(),
        result: result.to_string(),
    })
}

/// `info TYPE`.
#[derive(Debug, Serialize)]
pub struct TypeInfo {
    name: &'static str,
    code: u16,
    class: String,
    bit_width: u32,
    iec_memory_size: usize,
    literal_prefix: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limits: Option<LimitsSummary>,
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (code {}, {})", self.name, self.code, self.class)?;
        writeln!(f, "  bit width:       {}", self.bit_width)?;
        write!(f, "  iec memory size: {}", self.iec_memory_size)?;
        if let Some(limits) = &self.limits {
            writeln!(f)?;
            writeln!(f, "  min:             {}", limits.min)?;
            writeln!(f, "  max:             {}", limits.max)?;
            writeln!(f, "  lowest:          {}", limits.lowest)?;
            writeln!(f, "  epsilon:         {}", limits.epsilon)?;
            write!(f, "  digits10:        {}", limits.digits10)?;
        }
        Ok(())
    }
}

pub fn type_info(type_id: DataTypeId) -> TypeInfo {
    TypeInfo {
        name: type_id.name(),
        code: type_id.code(),
        class: format!("{:?}", type_id.class()),
        bit_width: type_id.bit_width(),
        iec_memory_size: type_id.iec_memory_size(),
        literal_prefix: typed_literal_prefix(type_id),
        limits: limits_summary(type_id),
    }
}

/// `encode LITERAL` and `decode HEX`.
#[derive(Debug, Serialize)]
pub struct WireReport {
    type_id: DataTypeId,
    value: String,
    bytes: String,
}

impl fmt::Display for WireReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.value, self.bytes)
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

fn from_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).with_context(|| format!("invalid hex byte {:?}", &digits[i..i + 2])))
        .collect()
}

pub fn encode(literal: &str, config: &DatatypeConfig) -> Result<WireReport> {
    let value = AnyValue::parse_typed(literal).with_context(|| format!("invalid literal {literal:?}"))?;
    let codec = WireCodec::from(&config.wire);
    let mut out = vec![0u8; codec.encoded_size(value.as_dyn())?];
    let len = codec.encode(value.as_dyn(), &mut out)?;
    info!(type_id = %value.data_type_id(), len, "encoded");
    Ok(WireReport {
        type_id: value.data_type_id(),
        value: value.to_string(),
        bytes: to_hex(&out[..len]),
    })
}

pub fn decode(hex: &str, config: &DatatypeConfig) -> Result<WireReport> {
    let bytes = from_hex(hex)?;
    let codec = WireCodec::from(&config.wire);
    let (value, len) = codec.decode(&bytes).context("cannot decode input")?;
    if len != bytes.len() {
        bail!("{} trailing bytes after value", bytes.len() - len);
    }
    Ok(WireReport {
        type_id: value.data_type_id(),
        value: value.to_string(),
        bytes: to_hex(&bytes),
    })
}

/// `name TEXT`.
#[derive(Debug, Serialize)]
pub struct NameReport {
    qualifier: Option<String>,
    simple: String,
    builtin: Option<DataTypeId>,
    literal: Option<String>,
}

impl fmt::Display for NameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{qualifier} :: {}", self.simple)?,
            None => write!(f, "{}", self.simple)?,
        }
        match self.builtin {
            Some(id) => write!(f, " (built-in {id})")?,
            None => write!(f, " (user type)")?,
        }
        if let Some(literal) = &self.literal {
            write!(f, " literal {literal:?}")?;
        }
        Ok(())
    }
}

pub fn type_name(text: &str) -> Result<NameReport> {
    let mut dictionary = StringDictionary::new();
    let parsed = parse_type_name(text, &mut dictionary)?;
    let builtin = match parsed.id {
        plc_datatypes::TypeNameId::Builtin(id) => Some(id),
        plc_datatypes::TypeNameId::Interned(_) => None,
    };
    Ok(NameReport {
        qualifier: parsed.qualifier.map(str::to_owned),
        simple: parsed.simple.to_owned(),
        builtin,
        literal: parsed.literal.map(str::to_owned),
    })
}
