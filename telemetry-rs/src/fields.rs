use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::errors::TelemetryError;

/// Placeholder for geolocation keys the lookup endpoint left out.
pub const MISSING: &str = "—";

/// Which collaborator produced a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    Network,
    Local,
}

/// Every field a snapshot can carry. Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Ipv4,
    Ipv6,
    Isp,
    Asn,
    City,
    Region,
    Country,
    Latitude,
    Longitude,
    Timezone,
    Os,
    OsDetail,
    BrowserName,
    Platform,
    Arch,
    Browser,
    Screen,
    PixelRatio,
    Locale,
    NetworkType,
    Username,
    LanguageCode,
    Premium,
    ColorScheme,
    AppPlatform,
}

impl FieldName {
    pub const NETWORK: [FieldName; 10] = [
        FieldName::Ipv4,
        FieldName::Ipv6,
        FieldName::Isp,
        FieldName::Asn,
        FieldName::City,
        FieldName::Region,
        FieldName::Country,
        FieldName::Latitude,
        FieldName::Longitude,
        FieldName::Timezone,
    ];

    pub const DEVICE: [FieldName; 10] = [
        FieldName::Os,
        FieldName::OsDetail,
        FieldName::BrowserName,
        FieldName::Platform,
        FieldName::Arch,
        FieldName::Browser,
        FieldName::Screen,
        FieldName::PixelRatio,
        FieldName::Locale,
        FieldName::NetworkType,
    ];

    pub const MINI_APP: [FieldName; 5] = [
        FieldName::Username,
        FieldName::LanguageCode,
        FieldName::Premium,
        FieldName::ColorScheme,
        FieldName::AppPlatform,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Ipv4 => "ipv4",
            FieldName::Ipv6 => "ipv6",
            FieldName::Isp => "isp",
            FieldName::Asn => "asn",
            FieldName::City => "city",
            FieldName::Region => "region",
            FieldName::Country => "country",
            FieldName::Latitude => "latitude",
            FieldName::Longitude => "longitude",
            FieldName::Timezone => "timezone",
            FieldName::Os => "os",
            FieldName::OsDetail => "os_detail",
            FieldName::BrowserName => "browser_name",
            FieldName::Platform => "platform",
            FieldName::Arch => "arch",
            FieldName::Browser => "browser",
            FieldName::Screen => "screen",
            FieldName::PixelRatio => "pixel_ratio",
            FieldName::Locale => "locale",
            FieldName::NetworkType => "network_type",
            FieldName::Username => "username",
            FieldName::LanguageCode => "language_code",
            FieldName::Premium => "premium",
            FieldName::ColorScheme => "color_scheme",
            FieldName::AppPlatform => "app_platform",
        }
    }

    /// Text shown when the value could not be observed.
    pub fn fallback(self) -> &'static str {
        match self {
            FieldName::Ipv4 => "Unavailable",
            FieldName::Ipv6 => "Not supported",
            FieldName::Isp
            | FieldName::Asn
            | FieldName::City
            | FieldName::Region
            | FieldName::Country
            | FieldName::Latitude
            | FieldName::Longitude
            | FieldName::Timezone => MISSING,
            FieldName::Os => "Other",
            FieldName::NetworkType => "unknown",
            FieldName::Premium => "No",
            _ => "Unknown",
        }
    }

    pub fn source(self) -> FieldSource {
        if Self::NETWORK.contains(&self) {
            FieldSource::Network
        } else {
            FieldSource::Local
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NETWORK
            .iter()
            .chain(Self::DEVICE.iter())
            .chain(Self::MINI_APP.iter())
            .copied()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| TelemetryError::UnknownField(s.to_string()))
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The declared field set of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldName>,
}

impl Schema {
    /// Network lookups plus device introspection.
    pub fn standard() -> Self {
        let mut fields = FieldName::NETWORK.to_vec();
        fields.extend(FieldName::DEVICE);
        Self { fields }
    }

    /// The standard set plus the mini-app profile fields.
    pub fn mini_app() -> Self {
        let mut schema = Self::standard();
        schema.fields.extend(FieldName::MINI_APP);
        schema
    }

    pub fn custom(fields: impl IntoIterator<Item = FieldName>) -> Self {
        let mut fields: Vec<FieldName> = fields.into_iter().collect();
        fields.sort();
        fields.dedup();
        Self { fields }
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.fields.binary_search(&field).is_ok()
    }

    pub fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::standard()
    }
}
