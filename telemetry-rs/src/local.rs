use crate::fields::FieldName;
use crate::host::{DeviceInfo, MiniAppContext};

/// Reads every local field out of the host's device and mini-app facts.
/// Pure: the same input always yields the same values.
pub fn introspect(
    device: &DeviceInfo,
    mini_app: Option<&MiniAppContext>,
) -> Vec<(FieldName, String)> {
    let ua = non_blank(device.user_agent.as_deref());
    let parser = woothee::parser::Parser::new();
    let parsed = ua.and_then(|ua| parser.parse(ua));

    let os = match ua {
        Some(ua) if ua.contains("Windows") => "Windows".to_string(),
        _ => FieldName::Os.fallback().to_string(),
    };

    let os_detail = parsed
        .as_ref()
        .filter(|p| p.os != woothee::woothee::VALUE_UNKNOWN)
        .map(|p| join_version(&p.os, &p.os_version));

    let browser_name = parsed
        .as_ref()
        .filter(|p| p.name != woothee::woothee::VALUE_UNKNOWN)
        .map(|p| join_version(&p.name, &p.version));

    let screen = match (device.screen_width, device.screen_height) {
        (Some(w), Some(h)) => Some(format!("{w} × {h}")),
        _ => None,
    };

    let mut values = vec![
        (FieldName::Os, Some(os)),
        (FieldName::OsDetail, os_detail),
        (FieldName::BrowserName, browser_name),
        (FieldName::Platform, owned(device.platform.as_deref())),
        (FieldName::Arch, owned(device.architecture.as_deref())),
        (FieldName::Browser, ua.map(str::to_string)),
        (FieldName::Screen, screen),
        (
            FieldName::PixelRatio,
            device
                .pixel_ratio
                .filter(|r| r.is_finite() && *r > 0.0)
                .map(format_ratio),
        ),
        (FieldName::Locale, owned(device.locale.as_deref())),
        (FieldName::NetworkType, owned(device.network_type.as_deref())),
    ];

    let app = mini_app.cloned().unwrap_or_default();
    values.extend([
        (FieldName::Username, owned(app.username.as_deref())),
        (FieldName::LanguageCode, owned(app.language_code.as_deref())),
        (FieldName::Premium, Some(if app.is_premium { "Yes" } else { "No" }.to_string())),
        (FieldName::ColorScheme, owned(app.color_scheme.as_deref())),
        (FieldName::AppPlatform, owned(app.platform.as_deref())),
    ]);

    values
        .into_iter()
        .map(|(field, value)| (field, value.unwrap_or_else(|| field.fallback().to_string())))
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

fn join_version(name: &str, version: &str) -> String {
    if version.is_empty() || version == woothee::woothee::VALUE_UNKNOWN {
        name.to_string()
    } else {
        format!("{name} {version}")
    }
}

/// Integral ratios print without a fraction, the way browsers report them.
fn format_ratio(ratio: f64) -> String {
    if ratio.fract() == 0.0 {
        format!("{ratio:.0}")
    } else {
        ratio.to_string()
    }
}
