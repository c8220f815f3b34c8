//! Save path construction.
//!
//! Images land under `{loc}/{class_dir}/{loc}#{stamp}.{ext}`, where the
//! location code comes from the lane description (or a configured default),
//! the class directory from the vehicle class id, and the stamp from the
//! passing timestamp (or a content hash when the timestamp is absent).

use rand::Rng;
use std::path::PathBuf;

use crate::detail::VehicleDetail;

/// Builds relative save paths from vehicle details.
#[derive(Debug, Clone)]
pub struct PathDirector {
    file_extension: String,
    default_location_code: String,
}

impl PathDirector {
    pub fn new(file_extension: impl Into<String>, default_location_code: impl Into<String>) -> Self {
        Self {
            file_extension: file_extension.into(),
            default_location_code: default_location_code.into(),
        }
    }

    /// Relative path the image for this vehicle should be written to.
    ///
    /// The image bytes only matter when the detail has no timestamp; they
    /// seed the fallback stamp so two such images never collide.
    pub fn save_path(&self, detail: &VehicleDetail, image: &[u8]) -> PathBuf {
        let class_dir = match detail.ucid {
            Some(ucid) => {
                resolve_ucid(ucid).unwrap_or_else(|| format!("undefined_{}", ucid))
            }
            None => "undefined_unknown".to_string(),
        };

        let mut location = match &detail.lane_description {
            // The site name is the trailing comma-field of the description.
            Some(description) => description
                .rsplit(',')
                .next()
                .unwrap_or(description)
                .trim()
                .to_string(),
            None => self.default_location_code.clone(),
        };
        if let Some(lane) = &detail.lane {
            location.push('_');
            location.push_str(lane);
        }

        let stamp = match &detail.timestamp {
            Some(timestamp) => compact_timestamp(timestamp),
            None => fallback_stamp(image),
        };

        PathBuf::from(&location)
            .join(class_dir)
            .join(format!("{}#{}.{}", location, stamp, self.file_extension))
    }
}

/// Directory name for a vehicle class id; `None` for unknown classes.
pub fn resolve_ucid(ucid: i64) -> Option<String> {
    let class = match ucid {
        1 | 3 | 4 => "car",
        2 | 31 | 34 | 35 | 51 | 55 | 56 => "van",
        27 | 28 | 36 | 44 | 57 => "bus",
        30 => "motorbike",
        5 => "lighttruck",
        // There are lighttrucks among these too; without image data there
        // is no way to differentiate.
        6 | 9 | 10 | 11 | 13 | 18 | 19 | 20 | 21 | 22 | 23 | 24 | 25 | 26 | 29 | 32 | 38 | 39
        | 40 | 41 | 42 | 43 | 50 | 52 | 53 | 54 | 60 | 61 | 63 | 64 | 65 | 66 | 67 | 68 | 70
        | 71 | 72 | 79 | 403 | 611 | 612 | 613 | 614 | 615 => "truck",
        _ => return None,
    };
    Some(format!("{}_{}", class, ucid))
}

/// Random two-letter location code for sites without a lane description.
pub fn random_location_code() -> String {
    random_lowercase(2)
}

/// Filename-safe rendition of the API timestamp: separators stripped, the
/// timezone suffix cut at the last `+`, sub-millisecond digits dropped.
fn compact_timestamp(timestamp: &str) -> String {
    let stripped: String = timestamp
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect();
    let head = match stripped.rfind('+') {
        Some(idx) => &stripped[..idx],
        None => stripped.as_str(),
    };
    // Drop the last three characters, not bytes; timestamps are not
    // guaranteed ASCII.
    let cut = head
        .char_indices()
        .rev()
        .nth(2)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    head[..cut].to_string()
}

/// Stamp for details without a timestamp: content hash prefix plus a random
/// suffix.
fn fallback_stamp(image: &[u8]) -> String {
    let digest = format!("{:x}", md5::compute(image));
    format!("{}{}", &digest[..6], random_lowercase(6))
}

fn random_lowercase(count: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::VehicleDetail;

    fn detail() -> VehicleDetail {
        VehicleDetail {
            images: vec![],
            timestamp: Some("2023-04-01T10:02:03.123456+02:00".to_string()),
            ucid: Some(3),
            lane: Some("L1".to_string()),
            lane_description: Some("Site 4, brno".to_string()),
        }
    }

    #[test]
    fn full_detail_builds_location_class_and_stamp() {
        let director = PathDirector::new("jpg", "xx");
        let path = director.save_path(&detail(), b"img");
        assert_eq!(
            path,
            PathBuf::from("brno_L1/car_3/brno_L1#20230401T100203.123.jpg")
        );
    }

    #[test]
    fn missing_description_falls_back_to_the_default_code() {
        let director = PathDirector::new("jpg", "xx");
        let mut d = detail();
        d.lane_description = None;
        d.lane = None;
        let path = director.save_path(&d, b"img");
        assert!(path.starts_with("xx"));
    }

    #[test]
    fn unknown_ucid_lands_in_an_undefined_directory() {
        let director = PathDirector::new("jpg", "xx");
        let mut d = detail();
        d.ucid = Some(999);
        assert!(director
            .save_path(&d, b"img")
            .to_string_lossy()
            .contains("undefined_999"));

        d.ucid = None;
        assert!(director
            .save_path(&d, b"img")
            .to_string_lossy()
            .contains("undefined_unknown"));
    }

    #[test]
    fn multibyte_timestamp_tail_is_dropped_whole() {
        let director = PathDirector::new("jpg", "xx");
        let mut d = detail();
        d.timestamp = Some("2023-04-01T10:02:03.4µs".to_string());
        // The trailing "4µs" spans four bytes but three characters.
        let path = director.save_path(&d, b"img");
        assert_eq!(
            path,
            PathBuf::from("brno_L1/car_3/brno_L1#20230401T100203..jpg")
        );
    }

    #[test]
    fn short_timestamp_compacts_to_an_empty_stamp() {
        let director = PathDirector::new("jpg", "xx");
        let mut d = detail();
        d.timestamp = Some("ab".to_string());
        let path = director.save_path(&d, b"img");
        assert_eq!(path, PathBuf::from("brno_L1/car_3/brno_L1#.jpg"));
    }

    #[test]
    fn missing_timestamp_uses_the_content_hash_fallback() {
        let director = PathDirector::new("jpg", "xx");
        let mut d = detail();
        d.timestamp = None;
        let name = director
            .save_path(&d, b"img")
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        // 6 hash chars + 6 random letters between the '#' and the extension.
        let stamp = name
            .split('#')
            .nth(1)
            .unwrap()
            .strip_suffix(".jpg")
            .unwrap()
            .to_string();
        assert_eq!(stamp.len(), 12);
    }

    #[test]
    fn ucid_classes_resolve_to_their_groups() {
        assert_eq!(resolve_ucid(1).as_deref(), Some("car_1"));
        assert_eq!(resolve_ucid(5).as_deref(), Some("lighttruck_5"));
        assert_eq!(resolve_ucid(30).as_deref(), Some("motorbike_30"));
        assert_eq!(resolve_ucid(615).as_deref(), Some("truck_615"));
        assert_eq!(resolve_ucid(7), None);
    }

    #[test]
    fn random_location_code_is_two_lowercase_letters() {
        let code = random_location_code();
        assert_eq!(code.len(), 2);
        assert!(code.chars().all(|c| c.is_ascii_lowercase()));
    }
}
