use serde::{Deserialize, Serialize};

use crate::field::{FieldId, FieldSchema};

/// Role of a construction token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Plain,
    Field,
}

/// One piece of the human-readable spec title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionToken {
    pub string: String,
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<FieldId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
}

/// Descriptive metadata of a spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecMeta {
    pub description: String,
    pub construction: Vec<ConstructionToken>,
    pub labels: AxisLabels,
}

/// Assembles [`SpecMeta`] from text and field tokens
///
/// The description is the tokens joined by spaces.
#[derive(Debug, Default)]
pub struct SpecMetaBuilder {
    tokens: Vec<ConstructionToken>,
    labels: AxisLabels,
}

impl SpecMetaBuilder {
    pub fn new() -> Self {
        SpecMetaBuilder::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.tokens.push(ConstructionToken {
            string: text.into(),
            kind: TokenKind::Plain,
            field_id: None,
        });
        self
    }

    pub fn field(mut self, field: &FieldSchema) -> Self {
        self.tokens.push(ConstructionToken {
            string: field.name.clone(),
            kind: TokenKind::Field,
            field_id: Some(field.id),
        });
        self
    }

    /// Field tokens joined by `sep`, e.g. `a, b and c`
    pub fn fields(mut self, fields: &[&FieldSchema]) -> Self {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                let sep = if i + 1 == fields.len() { "and" } else { "," };
                self = self.text(sep);
            }
            self = self.field(field);
        }
        self
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.labels = AxisLabels {
            x: x.into(),
            y: y.into(),
        };
        self
    }

    pub fn build(self) -> SpecMeta {
        let description = self
            .tokens
            .iter()
            .map(|t| t.string.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .replace(" ,", ",");
        SpecMeta {
            description,
            construction: self.tokens,
            labels: self.labels,
        }
    }
}
