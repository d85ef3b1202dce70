//! Tree fragment returned to browsing clients.
//!
//! The JSON shape is consumed verbatim by the browser tree widget:
//! `{ "id": string, "text": string, "children": bool | [ViewNode], "icon": string }`.

use serde::{Deserialize, Serialize};

/// One node of a browse tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewNode {
    /// Node identifier.
    pub id: String,
    /// Display label.
    pub text: String,
    /// Expansion state or expanded children.
    pub children: ViewChildren,
    /// Icon category followed by badges, space separated.
    pub icon: String,
}

/// The `children` field: a boolean sentinel or the expanded list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewChildren {
    /// `true` means "expandable, not yet expanded"; `false` means "leaf".
    Flag(bool),
    /// Children projected in name order.
    Expanded(Vec<ViewNode>),
}

impl ViewChildren {
    /// The expanded children, if any.
    pub fn expanded(&self) -> Option<&[ViewNode]> {
        match self {
            Self::Expanded(children) => Some(children),
            Self::Flag(_) => None,
        }
    }
}

impl ViewNode {
    /// Whether the icon carries `badge`.
    pub fn has_badge(&self, badge: &str) -> bool {
        self.icon.split_whitespace().skip(1).any(|b| b == badge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let view = ViewNode {
            id: "1".into(),
            text: "Radiology".into(),
            icon: "folder".into(),
            children: ViewChildren::Expanded(vec![ViewNode {
                id: "2".into(),
                text: "scan.dcm".into(),
                icon: "dicom available notimported".into(),
                children: ViewChildren::Flag(false),
            }]),
        };

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": "1",
                "text": "Radiology",
                "icon": "folder",
                "children": [
                    {"id": "2", "text": "scan.dcm", "icon": "dicom available notimported", "children": false}
                ]
            })
        );
    }

    #[test]
    fn test_badges() {
        let view = ViewNode {
            id: "2".into(),
            text: "scan.dcm".into(),
            icon: "dicom unavailable imported".into(),
            children: ViewChildren::Flag(false),
        };
        assert!(view.has_badge("unavailable"));
        assert!(view.has_badge("imported"));
        assert!(!view.has_badge("dicom"));
    }
}
