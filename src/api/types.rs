//! Wire types of the upstream JSON responses.
//!
//! Numeric identifiers arrive as JSON numbers on some endpoints and as strings on
//! others, sometimes within the same response, so they go through [`flex`].

use std::collections::HashMap;

use serde::Deserialize;

/// The `{errno, data}` envelope shared by the identity and listing endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub errno: i64,
    pub data: Option<T>,
}

/// Minimal view used to read `errno` from any body.
#[derive(Debug, Deserialize)]
pub(crate) struct Errno {
    #[serde(default)]
    pub errno: i64,
}

/// `data` of the identity endpoint.
#[derive(Debug, Deserialize)]
pub struct SyncData {
    #[serde(default, deserialize_with = "flex::string")]
    pub user_id: String,
}

/// Body of the session-key endpoint. Not wrapped in `data`.
#[derive(Debug, Deserialize)]
pub struct UserReport {
    pub errno: i64,
    /// Encrypted session key.
    #[serde(default, deserialize_with = "flex::text")]
    pub uinfo: String,
}

/// `data` of the share listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub list: Vec<ListItem>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, deserialize_with = "flex::string")]
    pub uk: String,
    #[serde(default, deserialize_with = "flex::string")]
    pub shareid: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub seckey: String,
}

/// One entry of a listing page.
#[derive(Debug, Deserialize)]
pub struct ListItem {
    #[serde(deserialize_with = "flex::string")]
    pub fs_id: String,
    #[serde(default, deserialize_with = "flex::int")]
    pub isdir: i64,
    #[serde(default, deserialize_with = "flex::text")]
    pub path: String,
    #[serde(default, deserialize_with = "flex::text")]
    pub server_filename: String,
    #[serde(default, deserialize_with = "flex::int")]
    pub server_mtime: i64,
    #[serde(default, deserialize_with = "flex::int")]
    pub server_ctime: i64,
    #[serde(default, deserialize_with = "flex::int")]
    pub size: i64,
    #[serde(default, deserialize_with = "flex::text")]
    pub md5: String,
    #[serde(default, deserialize_with = "flex::thumbs")]
    pub thumbs: HashMap<String, String>,
}

/// Body of the share download endpoint. Not wrapped in `data`.
#[derive(Debug, Deserialize)]
pub struct DownloadLinkResult {
    pub errno: i64,
    #[serde(default)]
    pub list: Vec<DownloadListItem>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadListItem {
    #[serde(default, deserialize_with = "flex::text")]
    pub dlink: String,
}

/// Number-or-numeric-string deserializers.
pub mod flex {
    use std::collections::HashMap;
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};
    use serde::Deserialize;

    struct Numeric;

    impl<'de> Visitor<'de> for Numeric {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            if v.fract() == 0.0 && v.is_finite() {
                Ok(format!("{}", v as i64))
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            let v = v.trim();
            if v.is_empty() || v.parse::<i64>().is_ok() || v.parse::<u64>().is_ok() {
                Ok(v.to_string())
            } else {
                Err(E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    /// Decimal string; `null` and `""` become empty.
    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(Numeric)
    }

    /// Signed integer; `null` and `""` become zero.
    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = deserializer.deserialize_any(Numeric)?;
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse::<i64>().map_err(de::Error::custom)
    }

    /// String field; `null` becomes empty.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Thumbnail map; upstream sends `[]` instead of `{}` for entries without previews.
    pub fn thumbs<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<String, String>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Thumbs {
            Map(HashMap<String, serde_json::Value>),
            Other(serde_json::Value),
        }

        Ok(match Thumbs::deserialize(deserializer)? {
            Thumbs::Map(map) => map
                .into_iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                .collect(),
            Thumbs::Other(_) => HashMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_user_id_number_or_string() {
        let n: Envelope<SyncData> =
            serde_json::from_str(r#"{"errno":0,"data":{"user_id":123456}}"#).unwrap();
        let s: Envelope<SyncData> =
            serde_json::from_str(r#"{"errno":0,"data":{"user_id":"123456"}}"#).unwrap();
        assert_eq!(n.data.unwrap().user_id, "123456");
        assert_eq!(s.data.unwrap().user_id, "123456");
    }

    #[test]
    fn test_list_item_tolerates_mixed_encodings() {
        let item: ListItem = serde_json::from_str(
            r#"{"fs_id":"987654321012","isdir":"1","path":"/s/a","server_filename":"a",
                "server_mtime":1700000000,"server_ctime":"1690000000","size":"0",
                "md5":"","thumbs":[]}"#,
        )
        .unwrap();
        assert_eq!(item.fs_id, "987654321012");
        assert_eq!(item.isdir, 1);
        assert_eq!(item.server_mtime, 1_700_000_000);
        assert_eq!(item.server_ctime, 1_690_000_000);
        assert!(item.thumbs.is_empty());
    }

    #[test]
    fn test_list_data_share_ids() {
        let data: ListData = serde_json::from_str(
            r#"{"list":[],"has_more":false,"uk":1100123,"shareid":"5566","seckey":"a-b~"}"#,
        )
        .unwrap();
        assert_eq!(data.uk, "1100123");
        assert_eq!(data.shareid, "5566");
    }

    #[test]
    fn test_null_strings_decode_as_empty() {
        let item: ListItem = serde_json::from_str(
            r#"{"fs_id":1,"isdir":0,"path":null,"server_filename":null,"md5":null}"#,
        )
        .unwrap();
        assert_eq!(item.path, "");
        assert_eq!(item.server_filename, "");
        assert_eq!(item.md5, "");

        let report: UserReport = serde_json::from_str(r#"{"errno":0,"uinfo":null}"#).unwrap();
        assert_eq!(report.uinfo, "");
        let data: ListData = serde_json::from_str(r#"{"seckey":null}"#).unwrap();
        assert_eq!(data.seckey, "");
        let link: DownloadListItem = serde_json::from_str(r#"{"dlink":null}"#).unwrap();
        assert_eq!(link.dlink, "");
    }

    #[test]
    fn test_flex_rejects_non_numeric() {
        let res: Result<SyncData, _> = serde_json::from_str(r#"{"user_id":"abc"}"#);
        assert!(res.is_err());
    }
}
