//! Property records accepted by the browser's tab methods, carried in the
//! `props` field of a request.  Absent fields are never serialized.

use crate::tab::TabId;
use serde::{Deserialize, Serialize};

/// Arguments to the `create` method.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_in_reader_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discarded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
}

/// Arguments to the `update` method.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_replace: Option<bool>,
    #[serde(rename = "successorId", skip_serializing_if = "Option::is_none")]
    pub successor_id: Option<TabId>,
}

/// Arguments to the `duplicate` method.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Arguments to the `move` method.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<u32>,
    pub index: u32,
}

/// Arguments to the `reload` method.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReloadProperties {
    #[serde(default)]
    pub bypass_cache: bool,
}

#[cfg(test)]
mod tests {
    use super::{MoveProperties, UpdateProperties};

    #[test]
    fn update_props_skip_absent_fields() {
        let props = UpdateProperties {
            active: Some(true),
            ..UpdateProperties::default()
        };
        let json = serde_json::to_string(&props).expect("props should encode");
        assert_eq!(r#"{"active":true}"#, json);
    }

    #[test]
    fn move_props_always_carry_index() {
        let props = MoveProperties {
            window_id: None,
            index: 0,
        };
        let json = serde_json::to_string(&props).expect("props should encode");
        assert_eq!(r#"{"index":0}"#, json);
    }
}
