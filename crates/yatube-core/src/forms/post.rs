//! Post and comment forms.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

use super::image::INVALID_IMAGE;
use super::{Choice, FieldKind, FieldSchema, FormErrors, FormSchema, ImageUpload, not_blank};
use crate::domain::{Group, Post};

pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Submitted post fields. `group` is the raw choice value; empty means none.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    pub group: Option<String>,
}

/// A post form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<i64>,
}

impl PostForm {
    pub fn schema(groups: &[Group]) -> FormSchema {
        let choices = groups
            .iter()
            .map(|g| Choice {
                value: g.id.to_string(),
                label: g.title.clone(),
            })
            .collect();

        FormSchema::new(vec![
            FieldSchema::new("text", FieldKind::Text, "Post text").help("Text of the new post"),
            FieldSchema::new("group", FieldKind::Choice, "Group")
                .optional()
                .help("Group the post will belong to")
                .with_choices(choices),
            FieldSchema::new("image", FieldKind::Image, "Image").optional(),
        ])
    }

    /// Form pre-filled from an existing post, for the edit page.
    pub fn initial(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
        }
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert("text".to_string(), self.text.clone());
        values.insert("group".to_string(), self.group.clone().unwrap_or_default());
        values
    }

    /// Validate against the available groups and the optional upload.
    pub fn clean(
        &self,
        groups: &[Group],
        image: Option<&ImageUpload>,
    ) -> Result<CleanPost, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        if let Some(upload) = image.filter(|u| !u.is_empty()) {
            if upload.kind().is_none() {
                errors.add("image", INVALID_IMAGE);
            }
        }

        errors.into_result(CleanPost {
            text: self.text.clone(),
            group_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

impl CommentForm {
    pub fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSchema::new("text", FieldKind::Text, "Comment text").help("Text of the comment"),
        ])
    }

    pub fn clean(&self) -> Result<String, FormErrors> {
        self.validate().map_err(FormErrors::from)?;
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Group> {
        vec![Group {
            id: 1,
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: None,
        }]
    }

    fn form(text: &str, group: Option<&str>) -> PostForm {
        PostForm {
            text: text.to_string(),
            group: group.map(str::to_string),
        }
    }

    #[test]
    fn test_schema_declares_text_and_group_choice() {
        let schema = PostForm::schema(&groups());
        let text = schema.field("text").unwrap();
        assert_eq!(text.kind, FieldKind::Text);
        assert!(text.required);
        assert_eq!(text.help_text, Some("Text of the new post"));

        let group = schema.field("group").unwrap();
        assert_eq!(group.kind, FieldKind::Choice);
        assert!(!group.required);
        assert_eq!(group.choices[0].value, "1");
        assert_eq!(group.choices[0].label, "Cats");
    }

    #[test]
    fn test_clean_accepts_valid_post() {
        let clean = form("Hello", Some("1")).clean(&groups(), None).unwrap();
        assert_eq!(clean.group_id, Some(1));

        let clean = form("Hello", Some("")).clean(&groups(), None).unwrap();
        assert_eq!(clean.group_id, None);
    }

    #[test]
    fn test_clean_rejects_blank_text_and_unknown_group() {
        let errors = form("  ", Some("42")).clean(&groups(), None).unwrap_err();
        assert!(errors.contains("text"));
        assert_eq!(errors.get("group").unwrap()[0], INVALID_CHOICE);

        let errors = form("ok", Some("cats")).clean(&groups(), None).unwrap_err();
        assert!(errors.contains("group"));
    }

    #[test]
    fn test_clean_rejects_non_image_upload() {
        let upload = ImageUpload::new("notes.txt", b"just text".to_vec());
        let errors = form("ok", None).clean(&groups(), Some(&upload)).unwrap_err();
        assert_eq!(errors.get("image").unwrap()[0], INVALID_IMAGE);

        let empty = ImageUpload::new("", Vec::new());
        assert!(form("ok", None).clean(&groups(), Some(&empty)).is_ok());
    }

    #[test]
    fn test_comment_form() {
        let ok = CommentForm {
            text: "Nice".to_string(),
        };
        assert_eq!(ok.clean().unwrap(), "Nice");

        let blank = CommentForm {
            text: " ".to_string(),
        };
        assert!(blank.clean().unwrap_err().contains("text"));
    }
}
