use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::num::NonZeroU32;

/// Identifies a browser tab.  Assigned by the browser, and stable for the
/// tab's lifetime.  Never zero: the wire decoder rejects a zero id.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Hash, PartialEq, Eq)]
#[serde(transparent)]
pub struct TabId(pub NonZeroU32);

impl TabId {
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }
}

impl Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TabId(")?;
        self.0.fmt(f)?;
        f.write_str(")")?;

        Ok(())
    }
}

/// One browser tab, exactly as it comes over the wire.  The browser omits
/// most fields freely, so everything except the id carries a default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    #[serde(default)]
    pub window_id: u32,
    #[serde(default)]
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub last_accessed: u64,
    #[serde(default)]
    pub audible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted_info: Option<MutedInfo>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub discarded: bool,
    #[serde(default)]
    pub incognito: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_store_id: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub is_article: bool,
    #[serde(default)]
    pub is_in_reader_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharing_state: Option<SharingState>,
    #[serde(default)]
    pub attention: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successor_tab_id: Option<TabId>,
}

impl Tab {
    /// An empty tab record with the given id.  Mostly useful in tests; real
    /// records come from the browser.
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            window_id: 0,
            index: 0,
            opener_tab_id: None,
            highlighted: false,
            active: false,
            pinned: false,
            last_accessed: 0,
            audible: false,
            muted_info: None,
            url: String::new(),
            title: String::new(),
            fav_icon_url: None,
            status: String::new(),
            discarded: false,
            incognito: false,
            width: None,
            height: None,
            session_id: None,
            cookie_store_id: None,
            hidden: false,
            is_article: false,
            is_in_reader_mode: false,
            sharing_state: None,
            attention: false,
            successor_tab_id: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MutedInfo {
    #[serde(default)]
    pub muted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharingState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    #[serde(default)]
    pub camera: bool,
    #[serde(default)]
    pub microphone: bool,
}

/// A sparse patch for one tab.  An absent field means "leave the attribute
/// alone"; a present field overwrites it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attention: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discarded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_article: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted_info: Option<MutedInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharing_state: Option<SharingState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
