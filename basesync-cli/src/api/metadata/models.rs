//! Airtable schema models
//!
//! The same types describe both sides of a reconciliation: the source schema
//! read from a schema file, and the destination schema fetched from a live base.
//! Fields are (de)serialized through a flat wire shape so that the schema-file
//! format (`"options": ["Open", "Closed"]`, top-level `precision`, ...) and the
//! Airtable meta API format (`"options": { "choices": [...] }`) both parse.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// A named collection of tables, as supplied by the caller or fetched from a base
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    /// Base name used when provisioning a new base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Workspace the base is created in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
}

/// Airtable table definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    /// Store-assigned identifier (e.g., "tblXXXXXXXXXXXXXX"), absent in schema files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Airtable field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawField", into = "RawField")]
pub struct FieldDefinition {
    /// Store-assigned identifier (e.g., "fldXXXXXXXXXXXXXX"), absent in schema files
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub field_type: FieldType,
}

/// Field data types in Airtable, with the options each type carries
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    SingleLineText,
    MultilineText,
    RichText,
    Email,
    Url,
    PhoneNumber,
    Checkbox,
    Date,
    DateTime,
    Attachments,
    SingleSelect {
        choices: Option<Vec<SelectChoice>>,
    },
    MultipleSelects {
        choices: Option<Vec<SelectChoice>>,
    },
    Number {
        precision: Option<u8>,
    },
    Currency {
        precision: Option<u8>,
    },
    Percent {
        precision: Option<u8>,
    },
    MultipleRecordLinks {
        linked_table_id: Option<String>,
        prefers_single_record_link: bool,
    },
    Formula {
        formula: Option<String>,
    },
    /// Rollup configuration is passed through to the API untouched
    Rollup {
        config: Option<Value>,
    },
    /// Any type tag this crate does not model explicitly
    Other(String),
}

/// A choice of a single/multiple select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectChoice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectChoice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }
}

impl FieldType {
    /// Build a field type from its Airtable tag without any options
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "singleLineText" => Self::SingleLineText,
            "multilineText" => Self::MultilineText,
            "richText" => Self::RichText,
            "email" => Self::Email,
            "url" => Self::Url,
            "phoneNumber" => Self::PhoneNumber,
            "checkbox" => Self::Checkbox,
            "date" => Self::Date,
            "dateTime" => Self::DateTime,
            "multipleAttachments" => Self::Attachments,
            "singleSelect" => Self::SingleSelect { choices: None },
            "multipleSelects" => Self::MultipleSelects { choices: None },
            "number" => Self::Number { precision: None },
            "currency" => Self::Currency { precision: None },
            "percent" => Self::Percent { precision: None },
            "multipleRecordLinks" => Self::MultipleRecordLinks {
                linked_table_id: None,
                prefers_single_record_link: false,
            },
            "formula" => Self::Formula { formula: None },
            "rollup" => Self::Rollup { config: None },
            other => Self::Other(other.to_string()),
        }
    }

    /// The Airtable type tag (e.g., "singleSelect")
    pub fn tag(&self) -> &str {
        match self {
            Self::SingleLineText => "singleLineText",
            Self::MultilineText => "multilineText",
            Self::RichText => "richText",
            Self::Email => "email",
            Self::Url => "url",
            Self::PhoneNumber => "phoneNumber",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Attachments => "multipleAttachments",
            Self::SingleSelect { .. } => "singleSelect",
            Self::MultipleSelects { .. } => "multipleSelects",
            Self::Number { .. } => "number",
            Self::Currency { .. } => "currency",
            Self::Percent { .. } => "percent",
            Self::MultipleRecordLinks { .. } => "multipleRecordLinks",
            Self::Formula { .. } => "formula",
            Self::Rollup { .. } => "rollup",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            field_type,
        }
    }
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            fields,
        }
    }

    /// Why this table cannot be created as-is, if anything stops it
    pub fn creation_problem(&self) -> Option<String> {
        if self.fields.is_empty() {
            Some(format!("table '{}' defines no fields", self.name))
        } else {
            None
        }
    }

    /// Find a field by name, ignoring case
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        let wanted = name.to_lowercase();
        self.fields.iter().find(|f| f.name.to_lowercase() == wanted)
    }
}

impl SchemaDefinition {
    /// Find a table by name, ignoring case
    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        let wanted = name.to_lowercase();
        self.tables.iter().find(|t| t.name.to_lowercase() == wanted)
    }

    /// Total number of fields across all tables
    pub fn field_count(&self) -> usize {
        self.tables.iter().map(|t| t.fields.len()).sum()
    }

    /// Check that the schema can be used as a reconciliation source.
    ///
    /// Returns every problem found rather than stopping at the first one.
    /// Names are compared lower-cased, the same way reconciliation matches them.
    /// Empty schemas and tables without fields are accepted here: they only
    /// matter once a table has to be created (see [`TableDefinition::creation_problem`]).
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        let mut table_names: HashMap<String, usize> = HashMap::new();
        for (idx, table) in self.tables.iter().enumerate() {
            if table.name.trim().is_empty() {
                problems.push(format!("table #{} has an empty name", idx + 1));
                continue;
            }
            *table_names.entry(table.name.to_lowercase()).or_default() += 1;

            let mut field_names: HashMap<String, usize> = HashMap::new();
            for (field_idx, field) in table.fields.iter().enumerate() {
                if field.name.trim().is_empty() {
                    problems.push(format!(
                        "field #{} of table '{}' has an empty name",
                        field_idx + 1,
                        table.name
                    ));
                    continue;
                }
                *field_names.entry(field.name.to_lowercase()).or_default() += 1;
            }

            let mut duplicates: Vec<_> = field_names
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(name, _)| name)
                .collect();
            duplicates.sort();
            for name in duplicates {
                problems.push(format!(
                    "table '{}' defines field '{}' more than once",
                    table.name, name
                ));
            }
        }

        let mut duplicates: Vec<_> = table_names
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect();
        duplicates.sort();
        for name in duplicates {
            problems.push(format!("table '{}' is defined more than once", name));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// Flat wire shape shared by schema files and the Airtable meta API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Select choices (schema file) or a type-specific options object (meta API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prefers_single_record_link: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rollup: Option<Value>,
}

/// A select choice is either a bare name or a `{name, color}` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawChoice {
    Name(String),
    Choice { name: String, color: Option<String> },
}

impl From<RawChoice> for SelectChoice {
    fn from(raw: RawChoice) -> Self {
        match raw {
            RawChoice::Name(name) => SelectChoice { name, color: None },
            RawChoice::Choice { name, color } => SelectChoice { name, color },
        }
    }
}

impl RawField {
    /// Look up a key inside an options object (meta API shape)
    fn option(&self, key: &str) -> Option<&Value> {
        self.options.as_ref().and_then(|o| o.as_object()).and_then(|o| o.get(key))
    }

    fn choices(&self) -> Result<Option<Vec<SelectChoice>>, String> {
        let list = match &self.options {
            None => return Ok(None),
            Some(Value::Array(_)) => self.options.clone(),
            Some(Value::Object(_)) => self.option("choices").cloned(),
            Some(other) => {
                return Err(format!(
                    "field '{}': select options must be a list or an object, got {}",
                    self.name, other
                ));
            }
        };

        match list {
            None => Ok(None),
            Some(value) => serde_json::from_value::<Vec<RawChoice>>(value)
                .map(|raw| Some(raw.into_iter().map(SelectChoice::from).collect()))
                .map_err(|e| format!("field '{}': invalid select choices: {}", self.name, e)),
        }
    }

    fn precision(&self) -> Result<Option<u8>, String> {
        if self.precision.is_some() {
            return Ok(self.precision);
        }
        match self.option("precision").and_then(Value::as_u64) {
            None => Ok(None),
            Some(p) => u8::try_from(p)
                .map(Some)
                .map_err(|_| format!("field '{}': precision {} is out of range", self.name, p)),
        }
    }
}

impl TryFrom<RawField> for FieldDefinition {
    type Error = String;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        if raw.field_type.trim().is_empty() {
            return Err(format!("field '{}' has an empty type", raw.name));
        }

        let field_type = match FieldType::from_tag(&raw.field_type) {
            FieldType::SingleSelect { .. } => FieldType::SingleSelect {
                choices: raw.choices()?,
            },
            FieldType::MultipleSelects { .. } => FieldType::MultipleSelects {
                choices: raw.choices()?,
            },
            FieldType::Number { .. } => FieldType::Number {
                precision: raw.precision()?,
            },
            FieldType::Currency { .. } => FieldType::Currency {
                precision: raw.precision()?,
            },
            FieldType::Percent { .. } => FieldType::Percent {
                precision: raw.precision()?,
            },
            FieldType::MultipleRecordLinks { .. } => FieldType::MultipleRecordLinks {
                linked_table_id: raw.linked_table_id.clone().or_else(|| {
                    raw.option("linkedTableId")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                }),
                prefers_single_record_link: raw
                    .prefers_single_record_link
                    .or_else(|| raw.option("prefersSingleRecordLink").and_then(Value::as_bool))
                    .unwrap_or(false),
            },
            FieldType::Formula { .. } => FieldType::Formula {
                formula: raw.formula.clone().or_else(|| {
                    raw.option("formula")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                }),
            },
            FieldType::Rollup { .. } => FieldType::Rollup {
                config: raw.rollup.clone().or_else(|| raw.options.clone()),
            },
            plain => plain,
        };

        Ok(FieldDefinition {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            field_type,
        })
    }
}

impl From<FieldDefinition> for RawField {
    fn from(field: FieldDefinition) -> Self {
        let mut raw = RawField {
            id: field.id,
            name: field.name,
            field_type: field.field_type.tag().to_string(),
            description: field.description,
            ..Default::default()
        };

        match field.field_type {
            FieldType::SingleSelect { choices } | FieldType::MultipleSelects { choices } => {
                raw.options = choices.map(|choices| {
                    Value::Array(
                        choices
                            .into_iter()
                            .map(|c| {
                                let mut obj = Map::new();
                                obj.insert("name".to_string(), Value::String(c.name));
                                if let Some(color) = c.color {
                                    obj.insert("color".to_string(), Value::String(color));
                                }
                                Value::Object(obj)
                            })
                            .collect(),
                    )
                });
            }
            FieldType::Number { precision }
            | FieldType::Currency { precision }
            | FieldType::Percent { precision } => raw.precision = precision,
            FieldType::MultipleRecordLinks {
                linked_table_id,
                prefers_single_record_link,
            } => {
                raw.linked_table_id = linked_table_id;
                raw.prefers_single_record_link = Some(prefers_single_record_link);
            }
            FieldType::Formula { formula } => raw.formula = formula,
            FieldType::Rollup { config } => raw.rollup = config,
            _ => {}
        }

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_field(value: Value) -> FieldDefinition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_schema_file_select_choices() {
        let field = parse_field(json!({
            "name": "Status",
            "type": "singleSelect",
            "options": ["Open", {"name": "Closed", "color": "redLight2"}]
        }));

        assert_eq!(
            field.field_type,
            FieldType::SingleSelect {
                choices: Some(vec![
                    SelectChoice::new("Open"),
                    SelectChoice {
                        name: "Closed".to_string(),
                        color: Some("redLight2".to_string()),
                    },
                ])
            }
        );
    }

    #[test]
    fn test_parse_meta_api_options_object() {
        let field = parse_field(json!({
            "id": "fld123",
            "name": "Tags",
            "type": "multipleSelects",
            "options": {"choices": [{"id": "sel1", "name": "vip", "color": "blueLight2"}]}
        }));

        assert_eq!(field.id.as_deref(), Some("fld123"));
        match field.field_type {
            FieldType::MultipleSelects { choices: Some(choices) } => {
                assert_eq!(choices.len(), 1);
                assert_eq!(choices[0].name, "vip");
            }
            other => panic!("unexpected field type: {:?}", other),
        }
    }

    #[test]
    fn test_parse_precision_and_links() {
        let amount = parse_field(json!({"name": "Amount", "type": "currency", "precision": 2}));
        assert_eq!(amount.field_type, FieldType::Currency { precision: Some(2) });

        let remote = parse_field(json!({"name": "Rate", "type": "percent", "options": {"precision": 1}}));
        assert_eq!(remote.field_type, FieldType::Percent { precision: Some(1) });

        let link = parse_field(json!({
            "name": "Owner",
            "type": "multipleRecordLinks",
            "linkedTableId": "tblOwners",
            "prefersSingleRecordLink": true
        }));
        assert_eq!(
            link.field_type,
            FieldType::MultipleRecordLinks {
                linked_table_id: Some("tblOwners".to_string()),
                prefers_single_record_link: true,
            }
        );
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let field = parse_field(json!({"name": "Barcode", "type": "barcode"}));
        assert_eq!(field.field_type, FieldType::Other("barcode".to_string()));
        assert_eq!(field.field_type.tag(), "barcode");
    }

    #[test]
    fn test_invalid_choices_rejected() {
        let result: Result<FieldDefinition, _> = serde_json::from_value(json!({
            "name": "Status",
            "type": "singleSelect",
            "options": "Open"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_field_serializes_back_to_schema_file_shape() {
        let field = FieldDefinition::new(
            "Total",
            FieldType::Formula {
                formula: Some("{Amount} * 2".to_string()),
            },
        );
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value, json!({"name": "Total", "type": "formula", "formula": "{Amount} * 2"}));

        let parsed: FieldDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, field);
    }

    #[test]
    fn test_validate_accepts_clean_schema() {
        let schema = SchemaDefinition {
            tables: vec![TableDefinition::new(
                "Accounts",
                vec![FieldDefinition::new("Name", FieldType::SingleLineText)],
            )],
            ..Default::default()
        };
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_case_insensitive_duplicates() {
        let schema = SchemaDefinition {
            tables: vec![
                TableDefinition::new(
                    "Accounts",
                    vec![
                        FieldDefinition::new("Name", FieldType::SingleLineText),
                        FieldDefinition::new("NAME", FieldType::Email),
                    ],
                ),
                TableDefinition::new(
                    "accounts",
                    vec![FieldDefinition::new("Name", FieldType::SingleLineText)],
                ),
            ],
            ..Default::default()
        };

        let problems = schema.validate().unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("field 'name' more than once")));
        assert!(problems.iter().any(|p| p.contains("table 'accounts' is defined more than once")));
    }

    #[test]
    fn test_validate_accepts_empty_schema_and_fieldless_table() {
        assert!(SchemaDefinition::default().validate().is_ok());

        let schema = SchemaDefinition {
            tables: vec![TableDefinition::new("Accounts", vec![])],
            ..Default::default()
        };
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let schema = SchemaDefinition {
            tables: vec![
                TableDefinition::new(" ", vec![]),
                TableDefinition::new(
                    "Accounts",
                    vec![FieldDefinition::new("", FieldType::SingleLineText)],
                ),
            ],
            ..Default::default()
        };

        let problems = schema.validate().unwrap_err();
        assert_eq!(
            problems,
            vec![
                "table #1 has an empty name".to_string(),
                "field #1 of table 'Accounts' has an empty name".to_string(),
            ]
        );
    }

    #[test]
    fn test_creation_problem() {
        let empty = TableDefinition::new("Accounts", vec![]);
        assert_eq!(
            empty.creation_problem().as_deref(),
            Some("table 'Accounts' defines no fields")
        );

        let table = TableDefinition::new(
            "Accounts",
            vec![FieldDefinition::new("Name", FieldType::SingleLineText)],
        );
        assert!(table.creation_problem().is_none());
    }

    #[test]
    fn test_parse_meta_api_rollup_options() {
        let field = parse_field(json!({
            "id": "fldSum",
            "name": "Sum",
            "type": "rollup",
            "options": {"fieldIdInLinkedTable": "fldAmount", "recordLinkFieldId": "fldDeals"}
        }));

        assert_eq!(
            field.field_type,
            FieldType::Rollup {
                config: Some(json!({"fieldIdInLinkedTable": "fldAmount", "recordLinkFieldId": "fldDeals"}))
            }
        );
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let schema = SchemaDefinition {
            tables: vec![TableDefinition::new(
                "Accounts",
                vec![FieldDefinition::new("Email", FieldType::Email)],
            )],
            ..Default::default()
        };

        let table = schema.table("accounts").unwrap();
        assert!(table.field("EMAIL").is_some());
        assert!(schema.table("contacts").is_none());
        assert_eq!(schema.field_count(), 1);
    }
}
