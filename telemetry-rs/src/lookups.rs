use serde_json::{Map, Value};

use crate::errors::LookupFailure;
use crate::fields::{FieldName, MISSING};
use crate::types::Config;
use crate::utils::render_value;

/// How one output field is read out of a lookup response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extract {
    /// The response is malformed without this key.
    Required(&'static str),
    /// Absent or blank values render as [`MISSING`].
    Optional(&'static str),
    /// `"<name> (<code>)"`, degrading to whichever half is present.
    NameWithCode {
        name: &'static str,
        code: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub field: FieldName,
    pub extract: Extract,
}

impl FieldMapping {
    pub fn new(field: FieldName, extract: Extract) -> Self {
        Self { field, extract }
    }
}

/// One request to one endpoint, and the fields it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLookup {
    pub name: &'static str,
    pub endpoint: String,
    pub fields: Vec<FieldMapping>,
}

impl RemoteLookup {
    pub fn ipv4(endpoint: impl Into<String>) -> Self {
        Self {
            name: "ipv4",
            endpoint: endpoint.into(),
            fields: vec![FieldMapping::new(FieldName::Ipv4, Extract::Required("ip"))],
        }
    }

    pub fn ipv6(endpoint: impl Into<String>) -> Self {
        Self {
            name: "ipv6",
            endpoint: endpoint.into(),
            fields: vec![FieldMapping::new(FieldName::Ipv6, Extract::Required("ip"))],
        }
    }

    pub fn geo(endpoint: impl Into<String>) -> Self {
        use Extract::Optional;
        Self {
            name: "geo",
            endpoint: endpoint.into(),
            fields: vec![
                FieldMapping::new(FieldName::Isp, Optional("org")),
                FieldMapping::new(FieldName::Asn, Optional("asn")),
                FieldMapping::new(FieldName::City, Optional("city")),
                FieldMapping::new(FieldName::Region, Optional("region")),
                FieldMapping::new(
                    FieldName::Country,
                    Extract::NameWithCode {
                        name: "country_name",
                        code: "country_code",
                    },
                ),
                FieldMapping::new(FieldName::Latitude, Optional("latitude")),
                FieldMapping::new(FieldName::Longitude, Optional("longitude")),
                FieldMapping::new(FieldName::Timezone, Optional("timezone")),
            ],
        }
    }

    /// The IPv4, IPv6 and geolocation lookups at the configured endpoints.
    pub fn standard(config: &Config) -> Vec<Self> {
        vec![
            Self::ipv4(&config.ipv4_endpoint),
            Self::ipv6(&config.ipv6_endpoint),
            Self::geo(&config.geo_endpoint),
        ]
    }

    pub fn targets(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.fields.iter().map(|m| m.field)
    }

    /// Maps a response record onto this lookup's fields. All or nothing: a
    /// missing required key fails the whole lookup.
    pub fn map_record(
        &self,
        record: &Map<String, Value>,
    ) -> Result<Vec<(FieldName, String)>, LookupFailure> {
        self.fields
            .iter()
            .map(|mapping| {
                let value = match mapping.extract {
                    Extract::Required(key) => record.get(key).and_then(render_value).ok_or_else(
                        || LookupFailure::Malformed(format!("missing required key `{key}`")),
                    )?,
                    Extract::Optional(key) => record
                        .get(key)
                        .and_then(render_value)
                        .unwrap_or_else(|| MISSING.to_string()),
                    Extract::NameWithCode { name, code } => {
                        let name = record.get(name).and_then(render_value);
                        let code = record.get(code).and_then(render_value);
                        match (name, code) {
                            (Some(name), Some(code)) => format!("{name} ({code})"),
                            (Some(only), None) | (None, Some(only)) => only,
                            (None, None) => MISSING.to_string(),
                        }
                    }
                };
                Ok((mapping.field, value))
            })
            .collect()
    }

    /// Every field of this lookup set to its fallback.
    pub fn fallbacks(&self) -> Vec<(FieldName, String)> {
        self.targets()
            .map(|field| (field, field.fallback().to_string()))
            .collect()
    }
}
