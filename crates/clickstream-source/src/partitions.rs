use std::path::Path;

/// Partition values encoded in hive-style `key=value` path segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HivePartitions {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub hour: Option<i32>,
}

impl HivePartitions {
    pub fn from_path(path: &Path) -> Self {
        let mut partitions = Self::default();

        for component in path.components() {
            let Some(segment) = component.as_os_str().to_str() else {
                continue;
            };
            let Some((key, raw_value)) = segment.split_once('=') else {
                continue;
            };
            let Ok(value) = raw_value.trim().parse::<i32>() else {
                continue;
            };

            match key.trim().to_ascii_lowercase().as_str() {
                "year" => partitions.year = Some(value),
                "month" => partitions.month = Some(value),
                "day" => partitions.day = Some(value),
                "hour" => partitions.hour = Some(value),
                _ => {}
            }
        }

        partitions
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
