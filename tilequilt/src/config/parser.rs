//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::raster::{ColorKey, ColorKeySet};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [quilt] section
    if let Some(section) = ini.section(Some("quilt")) {
        if let Some(v) = non_empty(section.get("indir")) {
            config.quilt.indir = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("outdir")) {
            config.quilt.outdir = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("archive_pattern")) {
            if !v.contains("{}") {
                return Err(invalid(
                    "quilt",
                    "archive_pattern",
                    v,
                    "must contain '{}' where the panel name goes",
                ));
            }
            config.quilt.archive_pattern = v.to_string();
        }
        if let Some(v) = section.get("flip_y") {
            config.quilt.flip_y = parse_bool(v);
        }
        if let Some(v) = section.get("merge") {
            config.quilt.merge = parse_bool(v);
        }
        if let Some(v) = non_empty(section.get("metadata_units")) {
            config.quilt.metadata_units = v
                .parse()
                .map_err(|reason: String| invalid("quilt", "metadata_units", v, &reason))?;
        }
        if let Some(v) = section.get("color_keys") {
            let keys = parse_list::<ColorKey>(v)
                .map_err(|reason| invalid("quilt", "color_keys", v, &reason))?;
            config.quilt.color_keys = ColorKeySet::new(keys);
        }
        if let Some(v) = section.get("empty_tile_sizes") {
            config.quilt.empty_tile_sizes = parse_list::<usize>(v).map_err(|_| {
                invalid(
                    "quilt",
                    "empty_tile_sizes",
                    v,
                    "expected comma separated byte counts",
                )
            })?;
        }
        if let Some(v) = section.get("legacy_min_zoom") {
            config.quilt.legacy_min_zoom = v
                .trim()
                .parse()
                .map_err(|_| invalid("quilt", "legacy_min_zoom", v, "must be a zoom level (0-31)"))?;
        }
        if let Some(v) = section.get("workers") {
            config.quilt.workers = match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("quilt", "workers", v, "must be a positive integer")),
            };
        }
        if let Some(v) = section.get("panels") {
            let panels: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            if !panels.is_empty() {
                config.quilt.panels = panels;
            }
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("directory")) {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a comma separated list; blank entries are ignored.
fn parse_list<T>(value: &str) -> Result<Vec<T>, String>
where
    T: FromStr,
    T::Err: ToString,
{
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(|e| e.to_string()))
        .collect()
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quilt::MetadataMode;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        let config = parse("").unwrap();
        assert!(config.quilt.flip_y);
        assert_eq!(config.quilt.empty_tile_sizes, vec![190]);
        assert_eq!(config.quilt.workers, 1);
    }

    #[test]
    fn test_full_quilt_section() {
        let config = parse(
            "[quilt]
indir = /data/in
outdir = /data/out
archive_pattern = {}.mbtiles
flip_y = no
merge = off
metadata_units = metric
color_keys = #ffffff,#F0F0F0
empty_tile_sizes = 190, 103
legacy_min_zoom = 10
workers = 4
panels = 20c, 21

[logging]
directory = /var/log/quilt
file = run.log
",
        )
        .unwrap();

        let q = &config.quilt;
        assert_eq!(q.indir, PathBuf::from("/data/in"));
        assert_eq!(q.outdir, PathBuf::from("/data/out"));
        assert_eq!(q.archive_pattern, "{}.mbtiles");
        assert!(!q.flip_y);
        assert!(!q.merge);
        assert_eq!(q.metadata_units, MetadataMode::Metric);
        assert_eq!(q.color_keys.len(), 2);
        assert!(q.color_keys.contains([0xf0, 0xf0, 0xf0]));
        assert_eq!(q.empty_tile_sizes, vec![190, 103]);
        assert_eq!(q.legacy_min_zoom, 10);
        assert_eq!(q.workers, 4);
        assert_eq!(q.panels, vec!["20c", "21"]);
        assert_eq!(config.logging.directory, PathBuf::from("/var/log/quilt"));
        assert_eq!(config.logging.file, "run.log");
    }

    #[test]
    fn test_empty_color_keys_disables_masking() {
        let config = parse("[quilt]\ncolor_keys =\n").unwrap();
        assert!(config.quilt.color_keys.is_empty());
    }

    #[test]
    fn test_invalid_color_key() {
        let err = parse("[quilt]\ncolor_keys = #fff\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "quilt");
                assert_eq!(key, "color_keys");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_metadata_units() {
        let err = parse("[quilt]\nmetadata_units = fathoms\n").unwrap_err();
        assert!(err.to_string().contains("quilt.metadata_units"));
    }

    #[test]
    fn test_legacy_metadata_alias() {
        let config = parse("[quilt]\nmetadata_units = oldFormatMBTiles\n").unwrap();
        assert_eq!(config.quilt.metadata_units, MetadataMode::LegacyLookup);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(parse("[quilt]\nworkers = 0\n").is_err());
        assert!(parse("[quilt]\nworkers = many\n").is_err());
    }

    #[test]
    fn test_archive_pattern_needs_placeholder() {
        assert!(parse("[quilt]\narchive_pattern = charts.mbtiles\n").is_err());
    }

    #[test]
    fn test_empty_tile_sizes_rejects_garbage() {
        assert!(parse("[quilt]\nempty_tile_sizes = 190, tiny\n").is_err());
    }

    #[test]
    fn test_parse_bool_values() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" yes "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("off"));
    }

    #[test]
    fn test_expand_tilde_plain_path() {
        assert_eq!(expand_tilde("/tmp/x"), PathBuf::from("/tmp/x"));
    }
}
