// Controller response types
//
// Only the fields the exporters need are modeled. The controller is
// inconsistent about field presence (wired clients have no signal data,
// some clients never report a hostname), so every field defaults, whether
// the key is absent or sent as `null`.

use serde::{Deserialize, Deserializer, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Station-list response envelope.
///
/// ```json
/// { "meta": { "rc": "ok" }, "data": [...] }
/// ```
///
/// Everything besides `data` is controller metadata and is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct StationList {
    #[serde(default)]
    pub data: Vec<Station>,
}

// ── Station ──────────────────────────────────────────────────────────

/// A connected client device from `stat/sta`.
///
/// Rebuilt from scratch on every fetch. The MAC address is the only natural
/// key; nothing else survives between fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Station {
    #[serde(deserialize_with = "null_as_default")]
    pub mac: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hostname: String,
    /// Seconds since the station last connected.
    #[serde(deserialize_with = "null_as_default")]
    pub uptime: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub network: String,
    /// Unix seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub last_seen: i64,
    /// Vendor name resolved by the controller from the MAC's OUI.
    #[serde(rename = "oui", deserialize_with = "null_as_default")]
    pub manufacturer: String,
    #[serde(rename = "is_wired", deserialize_with = "null_as_default")]
    pub wired: bool,
}

/// `null` decodes like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_controller_fields() {
        let json = r#"{
            "meta": { "rc": "ok" },
            "data": [{
                "_id": "5f1",
                "mac": "aa:bb:cc:dd:ee:ff",
                "ip": "10.0.0.12",
                "hostname": "laptop",
                "uptime": 3600,
                "network": "LAN",
                "last_seen": 1700000000,
                "oui": "Apple",
                "is_wired": false,
                "signal": -61
            }]
        }"#;

        let list: StationList = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(list.data.len(), 1);
        let sta = &list.data[0];
        assert_eq!(sta.mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(sta.manufacturer, "Apple");
        assert_eq!(sta.uptime, 3600);
        assert_eq!(sta.last_seen, 1_700_000_000);
        assert!(!sta.wired);
    }

    #[test]
    fn missing_fields_default() {
        let list: StationList =
            serde_json::from_str(r#"{"data":[{"mac":"11:22:33:44:55:66","is_wired":true}]}"#)
                .unwrap_or_else(|e| panic!("{e}"));
        let sta = &list.data[0];
        assert_eq!(sta.hostname, "");
        assert_eq!(sta.ip, "");
        assert_eq!(sta.uptime, 0);
        assert!(sta.wired);
    }

    #[test]
    fn null_fields_default() {
        let list: StationList = serde_json::from_str(
            r#"{"data":[{"mac":"aa","hostname":null,"ip":null,"uptime":null,
                "network":"LAN","last_seen":null,"oui":null,"is_wired":null}]}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let sta = &list.data[0];
        assert_eq!(sta.mac, "aa");
        assert_eq!(sta.network, "LAN");
        assert_eq!(sta.hostname, "");
        assert_eq!(sta.manufacturer, "");
        assert_eq!(sta.uptime, 0);
        assert_eq!(sta.last_seen, 0);
        assert!(!sta.wired);
    }
}
