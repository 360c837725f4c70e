//! Field mapping on top of the grouped message structure.
//!
//! The tokenizer and grouper only know about blocks, fields and values.
//! Turning those into business attributes depends on the report type, so it
//! is done by [`ReportMapper`]s registered per report type in a
//! [`MapperRegistry`]. The registry finds the report type at a known
//! level/block/field location and dispatches to the matching mapper.
//!
//! The conversion helpers here are pure functions over a single group. Their
//! errors name the level, block and field of the group they failed on.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use memchr::memchr;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::grouper::{Group, GroupItems};
use crate::item::Item;

/// A currency amount such as `EUR1.234,56`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Amount {
    /// ISO 4217 currency code.
    pub currency: String,
    pub value: Decimal,
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.value)
    }
}

/// A mapped attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    Text(String),
    Decimal(Decimal),
    Amount(Amount),
}

/// Attributes extracted from one message, by name.
pub type Record = BTreeMap<String, FieldValue>;

/// A mapped message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub report_type: String,
    pub record: Record,
}

/// Maps the groups of one report type to attributes.
pub trait ReportMapper: Send + Sync {
    /// The report type this mapper handles.
    fn report_type(&self) -> &str;

    /// Extract the attributes of one message.
    fn map(&self, groups: &[Group]) -> Result<Record>;
}

/// Where the report type of a message is found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub level: usize,
    pub block: u64,
    pub field: Option<String>,
}

impl Locator {
    pub fn new(level: usize, block: u64, field: Option<&str>) -> Self {
        Self {
            level,
            block,
            field: field.map(str::to_string),
        }
    }

    /// First group of `groups` at this location.
    pub fn find<'g>(&self, groups: &'g [Group]) -> Option<&'g Group> {
        groups
            .iter()
            .find(|group| group.is_at(self.level, self.block, self.field.as_deref()))
    }
}

type Identifier = Box<dyn Fn(&Group) -> Option<String> + Send + Sync>;

/// Report mappers keyed by report type.
pub struct MapperRegistry {
    locator: Locator,
    identify: Identifier,
    mappers: HashMap<String, Box<dyn ReportMapper>>,
}

impl MapperRegistry {
    /// Registry reading the report type from the first value at `locator`.
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            identify: Box::new(|group| {
                group
                    .first_value()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            }),
            mappers: HashMap::new(),
        }
    }

    /// Replace the function that derives the report type from the located group.
    pub fn with_identifier<F>(mut self, identify: F) -> Self
    where
        F: Fn(&Group) -> Option<String> + Send + Sync + 'static,
    {
        self.identify = Box::new(identify);
        self
    }

    /// Register a mapper, replacing any mapper for the same report type.
    pub fn register<M: ReportMapper + 'static>(&mut self, mapper: M) {
        self.mappers.insert(mapper.report_type().to_string(), Box::new(mapper));
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Report type of one message.
    pub fn report_type(&self, groups: &[Group]) -> Result<String> {
        self.locator
            .find(groups)
            .and_then(|group| (self.identify)(group))
            .ok_or_else(|| Error::MissingReportType {
                level: self.locator.level,
                block: self.locator.block,
                field: self.locator.field.clone(),
            })
    }

    /// Map the groups of one message with the mapper for its report type.
    pub fn map_message(&self, groups: &[Group]) -> Result<Report> {
        let report_type = self.report_type(groups)?;
        let mapper = self
            .mappers
            .get(&report_type)
            .ok_or_else(|| Error::UnknownReportType(report_type.clone()))?;
        debug!(%report_type, groups = groups.len(), "mapping report");
        let record = mapper.map(groups)?;
        Ok(Report { report_type, record })
    }

    /// Map every message of an item stream.
    pub fn map_messages<'r, I>(&'r self, items: I) -> impl Iterator<Item = Result<Report>> + 'r
    where
        I: Iterator<Item = Result<Item>> + 'r,
    {
        items
            .messages()
            .map(move |groups| groups.and_then(|groups| self.map_message(&groups)))
    }
}

impl fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut report_types: Vec<&String> = self.mappers.keys().collect();
        report_types.sort();
        f.debug_struct("MapperRegistry")
            .field("locator", &self.locator)
            .field("report_types", &report_types)
            .finish()
    }
}

/// Message type from an application header such as `O5981519...` or `I103BANK...`.
pub fn message_type(group: &Group) -> Option<String> {
    let value = group.first_value()?;
    let mut chars = value.chars();
    match chars.next() {
        Some('I' | 'O') => {}
        _ => return None,
    }
    let digits: String = chars.take(3).collect();
    (digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

/// Error naming the group a conversion failed on.
pub fn mapping_error(group: &Group, message: impl Into<String>) -> Error {
    Error::Mapping {
        level: group.level,
        block: group.block.unwrap_or_default(),
        field: group.field.clone(),
        message: message.into(),
    }
}

/// Split a `:NAME//VALUE` value of `group` into name and value.
pub fn named_value(group: &Group, text: &str) -> Result<(String, String)> {
    text.strip_prefix(':')
        .and_then(|rest| rest.split_once("//"))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| mapping_error(group, format!("value {:?} must have the form ':NAME//VALUE'", text)))
}

/// Transaction detail entries of `group`: `/NAME value` segments.
///
/// A line may hold several segments and must start with `/`. A line
/// consisting of `-` ends the text block and is skipped.
pub fn detail_entries(group: &Group) -> Result<Vec<(String, String)>> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for line in &group.values {
        if line == "-" || line.is_empty() {
            continue;
        }
        if !line.starts_with('/') {
            return Err(mapping_error(group, format!("detail {:?} must start with '/'", line)));
        }
        for segment in line.split('/').filter(|segment| !segment.trim().is_empty()) {
            let segment = segment.trim();
            let (name, value) = segment.split_once(' ').unwrap_or((segment, ""));
            entries.push((name.to_string(), value.trim().to_string()));
        }
    }
    Ok(entries)
}

/// Parse a decimal number with either `,` or `.` as decimal separator.
///
/// When both separators occur, whichever comes first is the thousands
/// separator: `123,456.78` and `123.456,78` are both 123456.78. A single
/// kind of separator is the decimal separator: `123,45` is 123.45. A
/// trailing separator as in `1234,` is allowed.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut normalized = match (memchr(b',', bytes), memchr(b'.', bytes)) {
        (Some(comma), Some(dot)) if comma < dot => text.replace(',', ""),
        (Some(_), Some(_)) => text.replace('.', "").replace(',', "."),
        (Some(_), None) => text.replace(',', "."),
        _ => text.to_string(),
    };
    if normalized.ends_with('.') {
        normalized.push('0');
    }
    Decimal::from_str(&normalized).ok()
}

/// Parse an amount: a 3-letter currency code followed by a decimal number.
pub fn parse_amount(group: &Group, text: &str) -> Result<Amount> {
    let text = text.trim();
    let (currency, number) = match text.get(..3) {
        Some(currency) if currency.bytes().all(|b| b.is_ascii_uppercase()) => (currency, &text[3..]),
        _ => {
            return Err(mapping_error(
                group,
                format!("amount {:?} must start with a 3-letter currency code", text),
            ))
        }
    };
    let value = parse_decimal(number)
        .ok_or_else(|| mapping_error(group, format!("amount {:?} must have a decimal number", text)))?;
    Ok(Amount {
        currency: currency.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn decimal(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    fn group(values: &[&str]) -> Group {
        Group::new(1, Some(4), Some("32A"), values)
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("123,45"), Some(decimal("123.45")));
        assert_eq!(parse_decimal("123,456.78"), Some(decimal("123456.78")));
        assert_eq!(parse_decimal("123.456,78"), Some(decimal("123456.78")));
        assert_eq!(parse_decimal("123.45"), Some(decimal("123.45")));
        assert_eq!(parse_decimal("1234,"), Some(decimal("1234")));
        assert_eq!(parse_decimal("42"), Some(decimal("42")));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_parse_amount() {
        let g = group(&[]);
        assert_eq!(
            parse_amount(&g, "EUR1.234,56").unwrap(),
            Amount { currency: "EUR".into(), value: decimal("1234.56") }
        );
        assert_eq!(parse_amount(&g, "USD100,").unwrap().value, decimal("100"));

        let error = parse_amount(&g, "eu1,0").unwrap_err();
        assert!(matches!(error, Error::Mapping { block: 4, ref field, .. } if field.as_deref() == Some("32A")));
        assert!(parse_amount(&g, "EUR").is_err());
        assert!(parse_amount(&g, "€").is_err());
    }

    #[test]
    fn test_named_value() {
        let g = group(&[]);
        assert_eq!(
            named_value(&g, ":SETT//20120131").unwrap(),
            ("SETT".to_string(), "20120131".to_string())
        );
        assert!(named_value(&g, "SETT//20120131").is_err());
        assert!(named_value(&g, ":SETT/20120131").is_err());
        assert!(named_value(&g, "://x").is_err());
    }

    #[test]
    fn test_detail_entries() {
        let g = group(&["/TREF XXXX", "/NOIM 000000/NOII 1", "-"]);
        assert_eq!(
            detail_entries(&g).unwrap(),
            vec![
                ("TREF".to_string(), "XXXX".to_string()),
                ("NOIM".to_string(), "000000".to_string()),
                ("NOII".to_string(), "1".to_string()),
            ]
        );
        assert!(detail_entries(&group(&["orphan"])).is_err());

        let error = detail_entries(&group(&["/NOII 1", "23"])).unwrap_err();
        assert!(matches!(error, Error::Mapping { ref message, .. } if message.contains("\"23\"")));
    }

    #[test]
    fn test_message_type() {
        let header = Group::new(1, Some(2), None, &["O5981519051128XXXX"]);
        assert_eq!(message_type(&header).as_deref(), Some("598"));
        assert_eq!(message_type(&Group::new(1, Some(2), None, &["X598"])), None);
        assert_eq!(message_type(&Group::new(1, Some(2), None, &["I1"])), None);
    }

    struct Echo;

    impl ReportMapper for Echo {
        fn report_type(&self) -> &str {
            "echo"
        }

        fn map(&self, groups: &[Group]) -> Result<Record> {
            let mut record = Record::new();
            record.insert("groups".into(), FieldValue::Decimal(Decimal::from(groups.len())));
            Ok(record)
        }
    }

    #[test]
    fn test_registry_dispatch() {
        let mut registry = MapperRegistry::new(Locator::new(1, 1, None));
        registry.register(Echo);

        let groups = vec![Group::new(1, Some(1), None, &[" echo "]), group(&["x"])];
        let report = registry.map_message(&groups).unwrap();
        assert_eq!(report.report_type, "echo");
        assert_eq!(report.record["groups"], FieldValue::Decimal(Decimal::from(2)));

        let unknown = vec![Group::new(1, Some(1), None, &["other"])];
        assert!(matches!(registry.map_message(&unknown), Err(Error::UnknownReportType(t)) if t == "other"));

        let missing = vec![group(&["x"])];
        assert!(matches!(
            registry.map_message(&missing),
            Err(Error::MissingReportType { block: 1, .. })
        ));
        assert_eq!(
            format!("{:?}", registry),
            "MapperRegistry { locator: Locator { level: 1, block: 1, field: None }, report_types: [\"echo\"] }"
        );
    }
}
