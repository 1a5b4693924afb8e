use serde::Serialize;

use stratus_core::Record;

pub const COLOR_GOOD: &str = "good";
pub const COLOR_DANGER: &str = "danger";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// One colored message block in the classic attachment format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
}

/// One good-colored attachment per record, fields in record order.
pub fn results_attachments(records: &[Record]) -> Vec<Attachment> {
    records
        .iter()
        .map(|record| Attachment {
            color: COLOR_GOOD,
            title: None,
            text: None,
            fields: record
                .fields()
                .map(|(name, value)| AttachmentField {
                    title: name.to_owned(),
                    value: value.to_owned(),
                    short: true,
                })
                .collect(),
        })
        .collect()
}

pub fn error_attachment(error_title: &str, detail: &str) -> Attachment {
    Attachment {
        color: COLOR_DANGER,
        title: Some(error_title.to_owned()),
        text: Some(detail.to_owned()),
        fields: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use stratus_core::Record;

    use super::{error_attachment, results_attachments, COLOR_DANGER, COLOR_GOOD};

    #[test]
    fn records_map_to_good_attachments_in_field_order() {
        let records = vec![
            Record::new().with("Type", "A").with("TTL", "300").with("Value", "1.2.3.4"),
            Record::new().with("Name", "web-1").with("Region", "us-east-1"),
        ];

        let attachments = results_attachments(&records);
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].color, COLOR_GOOD);
        let titles: Vec<&str> =
            attachments[0].fields.iter().map(|field| field.title.as_str()).collect();
        assert_eq!(titles, vec!["Type", "TTL", "Value"]);
        assert!(attachments[0].fields.iter().all(|field| field.short));
    }

    #[test]
    fn error_attachment_is_danger_colored() {
        let attachment = error_attachment("Not found", "web-42");
        assert_eq!(attachment.color, COLOR_DANGER);
        assert_eq!(attachment.title.as_deref(), Some("Not found"));
        assert_eq!(attachment.text.as_deref(), Some("web-42"));
        assert!(attachment.fields.is_empty());
    }

    #[test]
    fn empty_fields_are_not_serialized() {
        let json = serde_json::to_string(&error_attachment("Oops", "detail")).expect("serialize");
        assert!(!json.contains("\"fields\""));
    }
}
