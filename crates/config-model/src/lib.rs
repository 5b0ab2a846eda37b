//! Persisted per-user slideshow settings.
//!
//! The settings file is small JSON written by the slideshow on exit and read
//! back on the next start. Every field is optional: a missing key means "use
//! whatever the previous save recorded", which is what [`Settings::merge_missing_from`]
//! implements.

use std::fmt;
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    /// Folder the user last picked as the browsing root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,
    /// Folders selected for the show, in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    /// Dwell time on a still, in milliseconds.
    #[serde(
        rename = "AdvanceTime",
        deserialize_with = "lenient::millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub advance_time_ms: Option<u64>,
    /// Cross-fade duration, in milliseconds.
    #[serde(
        rename = "FadeTime",
        deserialize_with = "lenient::millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub fade_time_ms: Option<u64>,
    #[serde(
        deserialize_with = "lenient::flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_metadata: Option<bool>,
}

impl Settings {
    /// Fill every field this instance leaves unset from `existing`.
    pub fn merge_missing_from(&mut self, existing: &Settings) {
        if self.root_path.as_deref().is_none_or(str::is_empty) {
            self.root_path = existing.root_path.clone();
        }
        if self.paths.is_empty() {
            self.paths = existing.paths.clone();
        }
        if self.advance_time_ms.is_none() {
            self.advance_time_ms = existing.advance_time_ms;
        }
        if self.fade_time_ms.is_none() {
            self.fade_time_ms = existing.fade_time_ms;
        }
        if self.show_metadata.is_none() {
            self.show_metadata = existing.show_metadata;
        }
    }

    pub fn advance_time(&self) -> Option<Duration> {
        self.advance_time_ms.map(Duration::from_millis)
    }

    pub fn fade_time(&self) -> Option<Duration> {
        self.fade_time_ms.map(Duration::from_millis)
    }

    /// Folders to show: the explicit selection, else the root path alone.
    pub fn selected_paths(&self) -> Vec<String> {
        if !self.paths.is_empty() {
            return self.paths.clone();
        }
        self.root_path
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.paths.iter().all(|p| !p.trim().is_empty()),
            "settings paths must not contain empty entries"
        );
        if let Some(ms) = self.advance_time_ms {
            ensure!(ms > 0, "AdvanceTime must be greater than zero");
        }
        Ok(())
    }
}

mod lenient {
    use super::*;

    /// Accepts `3000`, `"3000"` or `null`. Garbage strings become `None`
    /// rather than failing the whole file.
    pub fn millis<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MillisVisitor;

        impl<'de> Visitor<'de> for MillisVisitor {
            type Value = Option<u64>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a millisecond count as a number or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Some(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(u64::try_from(v).ok())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if v.is_finite() && v >= 0.0 {
                    Ok(Some(v as u64))
                } else {
                    Ok(None)
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(v.trim().parse::<u64>().ok())
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }
        }

        deserializer.deserialize_any(MillisVisitor)
    }

    /// Accepts booleans, `"true"`/`"false"` in any case, and integers where
    /// non-zero means `true`.
    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagVisitor;

        impl<'de> Visitor<'de> for FlagVisitor {
            type Value = Option<bool>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean, \"true\"/\"false\", or an integer")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Some(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Some(v != 0))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Some(v != 0))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                let trimmed = v.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Some(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Some(false))
                } else {
                    Ok(trimmed.parse::<i64>().ok().map(|n| n != 0))
                }
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}
